//! Query controller: the observable state machine over [`NewsClient`].
//!
//! The controller owns the stored [`QueryFilters`], the [`QueryState`]
//! snapshot renderers read, and the sequencing of requests. Every operation
//! follows the same transitions:
//!
//! ```text
//! Idle/Ready/Errored --(fetch|search|update_filters|load_more|retry)--> Loading
//! Loading --(client returned a page)--> Ready    (replace, or append for load_more)
//! Loading --(client returned an error)--> Errored (articles kept, error set)
//! ```
//!
//! Operations take `&self`, so callers may start a new one while another is
//! in flight. Each request is numbered; a response is applied only if no
//! newer request has been issued since, so the most recently *requested*
//! operation wins regardless of which response lands last.

use crate::api::{HttpTransport, NewsClient, Transport};
use crate::models::{FilterUpdate, QueryFilters, QueryState, has_more};
use itertools::Itertools;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, instrument};

/// Mutable intent shared by the operations.
#[derive(Debug)]
struct Session {
    filters: QueryFilters,
    /// Set while the last issued request was a load-more that has not
    /// succeeded yet, so `retry` appends instead of replacing.
    pending_append: bool,
}

pub struct NewsQueryController<T = HttpTransport> {
    client: NewsClient<T>,
    state: watch::Sender<QueryState>,
    session: Mutex<Session>,
    issued: AtomicU64,
}

impl<T: Transport> NewsQueryController<T> {
    pub fn new(client: NewsClient<T>) -> Self {
        Self::with_filters(client, QueryFilters::default())
    }

    /// Start with `filters` stored; nothing is fetched until an operation runs.
    pub fn with_filters(client: NewsClient<T>, filters: QueryFilters) -> Self {
        Self {
            client,
            state: watch::Sender::new(QueryState::default()),
            session: Mutex::new(Session {
                filters,
                pending_append: false,
            }),
            issued: AtomicU64::new(0),
        }
    }

    pub fn client(&self) -> &NewsClient<T> {
        &self.client
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> QueryState {
        self.state.borrow().clone()
    }

    /// Observe every snapshot transition.
    pub fn subscribe(&self) -> watch::Receiver<QueryState> {
        self.state.subscribe()
    }

    /// The stored filters.
    pub async fn filters(&self) -> QueryFilters {
        self.session.lock().await.filters.clone()
    }

    /// Browse top headlines.
    ///
    /// Merges `update` into the stored filters, drops any active query, and
    /// starts from page 1 unless `update` names a page. Replaces the articles.
    pub async fn fetch(&self, update: FilterUpdate) {
        let (filters, seq) = self
            .store(|stored| {
                let mut filters = first_page(stored.merge(&update), &update);
                filters.query = None;
                filters
            })
            .await;
        self.run(filters, false, seq).await;
    }

    /// Search by free text.
    ///
    /// A blank `query` is not searched: it delegates to [`Self::fetch`],
    /// which also clears any stored query. Replaces the articles.
    pub async fn search(&self, query: &str, update: FilterUpdate) {
        if query.trim().is_empty() {
            debug!("Blank search query; fetching headlines instead");
            return self.fetch(update).await;
        }
        let (filters, seq) = self
            .store(|stored| {
                let merged = stored.merge(&update).merge(&FilterUpdate::query(query));
                first_page(merged, &update)
            })
            .await;
        self.run(filters, false, seq).await;
    }

    /// Merge `update` and re-query in whichever mode the merged filters
    /// select: search when they carry a query, headlines otherwise.
    pub async fn update_filters(&self, update: FilterUpdate) {
        let (filters, seq) = self
            .store(|stored| first_page(stored.merge(&update), &update))
            .await;
        self.run(filters, false, seq).await;
    }

    /// Fetch the next page in the current mode and append it.
    ///
    /// Does nothing while a request is in flight or when no more pages exist.
    pub async fn load_more(&self) {
        let current = self.snapshot();
        if current.loading || !current.has_more {
            debug!(
                loading = current.loading,
                has_more = current.has_more,
                "load_more ignored"
            );
            return;
        }

        let (filters, seq) = {
            let mut session = self.session.lock().await;
            session.filters.page = current.current_page + 1;
            session.pending_append = true;
            (session.filters.clone(), self.next_seq())
        };
        self.run(filters, true, seq).await;
    }

    /// Replay the last request with the stored filters, unchanged.
    pub async fn retry(&self) {
        let (filters, append, seq) = {
            let session = self.session.lock().await;
            (session.filters.clone(), session.pending_append, self.next_seq())
        };
        info!(search = filters.is_search(), append, "Retrying last request");
        self.run(filters, append, seq).await;
    }

    /// Replace the stored filters and number the request that will carry
    /// them. Both happen under the session lock, so request order always
    /// matches store order.
    async fn store(&self, f: impl FnOnce(&QueryFilters) -> QueryFilters) -> (QueryFilters, u64) {
        let mut session = self.session.lock().await;
        let filters = f(&session.filters);
        session.filters = filters;
        session.pending_append = false;
        (session.filters.clone(), self.next_seq())
    }

    /// Claim the next request number. Call with the session lock held.
    fn next_seq(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    #[instrument(
        level = "info",
        skip_all,
        fields(seq = seq, search = filters.is_search(), page = filters.page, append = append)
    )]
    async fn run(&self, filters: QueryFilters, append: bool, seq: u64) {
        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });

        let result = match filters.search_query() {
            Some(query) => self.client.search_articles(query, &filters).await,
            None => self.client.fetch_headlines(&filters).await,
        };

        let latest = self.issued.load(Ordering::SeqCst);
        if seq != latest {
            debug!(seq, latest, "Discarding response superseded by a newer request");
            return;
        }

        match result {
            Ok(response) => {
                let received = response.articles.len();
                self.state.send_modify(|state| {
                    state.articles = if append {
                        std::mem::take(&mut state.articles)
                            .into_iter()
                            .chain(response.articles)
                            .unique_by(|a| a.id.clone())
                            .collect()
                    } else {
                        response.articles
                    };
                    state.total_results = response.total_results;
                    state.current_page = filters.page;
                    state.has_more =
                        has_more(filters.page, filters.page_size, response.total_results);
                    state.loading = false;
                    state.error = None;
                });
                if append {
                    self.session.lock().await.pending_append = false;
                }
                let state = self.state.borrow();
                info!(
                    received,
                    shown = state.articles.len(),
                    total = state.total_results,
                    has_more = state.has_more,
                    "Query settled"
                );
            }
            Err(e) => {
                let action = if filters.is_search() { "search" } else { "fetch" };
                error!(error = %e, "Query failed; keeping previous articles");
                self.state.send_modify(|state| {
                    state.loading = false;
                    state.error = Some(format!("Failed to {action} news: {e}"));
                });
            }
        }
    }
}

/// Reset to page 1 unless the update asked for a specific page.
fn first_page(mut filters: QueryFilters, update: &FilterUpdate) -> QueryFilters {
    if update.page.is_none() {
        filters.page = 1;
    }
    filters
}
