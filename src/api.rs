//! GNews API client with normalization and mock-data fallback.
//!
//! This module is the only place that talks to the news provider. It builds
//! requests for the two provider operations, turns the provider's response
//! shape into canonical [`Article`]s, and answers from the canned dataset in
//! [`crate::mock`] whenever it cannot get a usable response.
//!
//! # Architecture
//!
//! - [`Transport`]: Minimal async GET abstraction so tests can script replies
//! - [`HttpTransport`]: `reqwest`-backed transport with a request timeout
//! - [`NewsClient`]: Request building, normalization, and fallback
//!
//! # Fallback Policy
//!
//! | Situation | Result |
//! |-----------|--------|
//! | No API key configured | Mock articles, no network call |
//! | Transport error | Mock articles, warning logged |
//! | Non-2xx status | Mock articles, warning logged |
//! | Body is not the expected JSON shape | `Err(NewsError::Malformed)` |

use crate::config::Config;
use crate::error::{NewsError, Result};
use crate::mock::mock_articles;
use crate::models::{Article, Category, FilterUpdate, NewsResponse, QueryFilters, Source};
use crate::utils::truncate_for_log;
use chrono::{DateTime, Utc};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Matches the provider's trailing "[1234 chars]" truncation marker.
static TRUNCATION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\[\+?\d+ chars\]\s*$").expect("truncation marker regex"));

/// Raw reply from a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    /// Canonical reason phrase for `status`, possibly empty.
    pub reason: String,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Async HTTP GET, abstracted so the client can be driven without a network.
pub trait Transport {
    /// Fetch `url` and return its status and body.
    ///
    /// Errors are reserved for failures to get any response at all; a
    /// non-2xx status is still `Ok`.
    async fn get(&self, url: &Url) -> Result<TransportResponse>;
}

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<TransportResponse> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok(TransportResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

/// GNews response envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GNewsResponse {
    total_articles: Option<u64>,
    articles: Option<Vec<GNewsArticle>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GNewsArticle {
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    url: Option<String>,
    image: Option<String>,
    published_at: Option<String>,
    source: Option<GNewsSource>,
}

#[derive(Debug, Deserialize)]
struct GNewsSource {
    name: Option<String>,
}

/// Client for the GNews "top headlines" and "search" operations.
///
/// Neither operation fails because of the network: see the module docs for
/// the fallback table. The client holds no query state; the only thing it
/// mutates is the counter used to mint ids for articles without a URL.
pub struct NewsClient<T = HttpTransport> {
    transport: T,
    config: Config,
    fallback_ids: AtomicU64,
}

impl<T> fmt::Debug for NewsClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsClient")
            .field("base_url", &self.config.base_url)
            .field("has_api_key", &self.config.api_key().is_some())
            .finish()
    }
}

impl NewsClient<HttpTransport> {
    /// Build a client with the default HTTP transport.
    pub fn from_config(config: Config) -> Result<Self> {
        let transport = HttpTransport::new(Duration::from_secs(config.request_timeout_secs))?;
        Ok(Self::new(transport, config))
    }
}

impl<T: Transport> NewsClient<T> {
    pub fn new(transport: T, config: Config) -> Self {
        Self {
            transport,
            config,
            fallback_ids: AtomicU64::new(0),
        }
    }

    /// True when no API key is configured and every answer comes from the
    /// mock dataset.
    pub fn is_offline(&self) -> bool {
        self.config.api_key().is_none()
    }

    /// Fetch top headlines (browse mode).
    ///
    /// Sends `country` (falling back to the configured default), `category`
    /// unless unset or general, `lang` when set, `max` and `page`. Articles
    /// are tagged with the requested category.
    ///
    /// # Arguments
    ///
    /// * `filters` - Category, country, language and paging for the request;
    ///   any query is ignored
    ///
    /// # Returns
    ///
    /// One page of normalized articles. Offline, or when the provider can't
    /// be reached or answers with a non-2xx status, the page comes from the
    /// mock dataset instead. Fails only on a malformed body or a bad base URL.
    #[instrument(
        level = "info",
        skip_all,
        fields(category = ?filters.category, page = filters.page)
    )]
    pub async fn fetch_headlines(&self, filters: &QueryFilters) -> Result<NewsResponse> {
        let Some(token) = self.config.api_key() else {
            debug!("No API key configured; serving mock headlines");
            return Ok(mock_articles(filters));
        };

        let category = filters.category.filter(Category::is_filter);
        let country = filters
            .country
            .as_deref()
            .unwrap_or(&self.config.default_country)
            .to_lowercase();

        let mut url = self.endpoint("top-headlines")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("token", token);
            query.append_pair("country", &country);
            if let Some(category) = category {
                query.append_pair("category", category.as_str());
            }
            if let Some(language) = &filters.language {
                query.append_pair("lang", language);
            }
            query.append_pair("max", &filters.page_size.to_string());
            query.append_pair("page", &filters.page.to_string());
        }

        let mut response = self.request(&url, filters).await?;
        if let Some(category) = category {
            for article in &mut response.articles {
                article.category.get_or_insert(category);
            }
        }
        Ok(response)
    }

    /// Search articles by free text (search mode).
    ///
    /// `query` must not be blank; callers route blank queries to
    /// [`NewsClient::fetch_headlines`] instead.
    ///
    /// # Arguments
    ///
    /// * `query` - Free-text search term
    /// * `filters` - Language and paging; category and country are not sent
    ///
    /// # Returns
    ///
    /// One page of matching articles, with the same fallback rules as
    /// [`NewsClient::fetch_headlines`].
    #[instrument(level = "info", skip_all, fields(query = %query, page = filters.page))]
    pub async fn search_articles(
        &self,
        query: &str,
        filters: &QueryFilters,
    ) -> Result<NewsResponse> {
        let filters = filters.merge(&FilterUpdate::query(query));

        let Some(token) = self.config.api_key() else {
            debug!("No API key configured; serving mock search results");
            return Ok(mock_articles(&filters));
        };

        let mut url = self.endpoint("search")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("token", token);
            pairs.append_pair("q", query);
            if let Some(language) = &filters.language {
                pairs.append_pair("lang", language);
            }
            pairs.append_pair("max", &filters.page_size.to_string());
            pairs.append_pair("page", &filters.page.to_string());
        }

        self.request(&url, &filters).await
    }

    fn endpoint(&self, operation: &str) -> Result<Url> {
        let mut url = Url::parse(&self.config.base_url)?;
        url.path_segments_mut()
            .map_err(|_| {
                NewsError::Config(format!(
                    "base_url cannot be a base: {}",
                    self.config.base_url
                ))
            })?
            .pop_if_empty()
            .push(operation);
        Ok(url)
    }

    /// Send the request; on transport or status failure, answer from the
    /// mock dataset with the same filters.
    async fn request(&self, url: &Url, filters: &QueryFilters) -> Result<NewsResponse> {
        let t0 = Instant::now();
        let body = match self.send(url).await {
            Ok(body) => body,
            Err(e) => {
                warn!(
                    endpoint = url.path(),
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    error = %e,
                    "GNews request failed; serving mock articles"
                );
                return Ok(mock_articles(filters));
            }
        };

        let response = self.normalize(&body)?;
        info!(
            endpoint = url.path(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            count = response.articles.len(),
            total = response.total_results,
            "Fetched articles from GNews"
        );
        Ok(response)
    }

    async fn send(&self, url: &Url) -> Result<String> {
        let response = self.transport.get(url).await?;
        if !response.is_success() {
            return Err(NewsError::Status {
                status: response.status,
                message: response.reason,
            });
        }
        Ok(response.body)
    }

    /// Turn a GNews response body into canonical articles.
    ///
    /// Duplicate ids within the response are dropped, keeping the first.
    ///
    /// # Returns
    ///
    /// The articles and the provider's `totalArticles`, or
    /// [`NewsError::Malformed`] if the body is not the GNews shape.
    pub fn normalize(&self, body: &str) -> Result<NewsResponse> {
        let raw: GNewsResponse = serde_json::from_str(body).map_err(|e| {
            NewsError::Malformed(format!(
                "unexpected GNews response ({e}): {}",
                truncate_for_log(body, 200)
            ))
        })?;

        let articles: Vec<Article> = raw
            .articles
            .unwrap_or_default()
            .into_iter()
            .map(|a| self.normalize_article(a))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .unique_by(|a| a.id.clone())
            .collect();

        Ok(NewsResponse {
            articles,
            total_results: raw.total_articles.unwrap_or(0),
        })
    }

    fn normalize_article(&self, raw: GNewsArticle) -> Result<Article> {
        let url = raw.url.unwrap_or_default();
        let id = if url.is_empty() {
            self.next_fallback_id()
        } else {
            url.clone()
        };

        let published_at = match raw.published_at.as_deref() {
            Some(ts) => DateTime::parse_from_rfc3339(ts)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| NewsError::Malformed(format!("invalid publishedAt {ts:?}: {e}")))?,
            None => Utc::now(),
        };

        let source_name = raw
            .source
            .and_then(|s| s.name)
            .filter(|n| !n.trim().is_empty());

        Ok(Article {
            id,
            title: raw.title.unwrap_or_default(),
            description: raw.description.unwrap_or_default(),
            content: strip_truncation_marker(&raw.content.unwrap_or_default()),
            url,
            image_url: raw.image.filter(|i| !i.trim().is_empty()),
            published_at,
            source: Source {
                id: None,
                name: source_name.clone().unwrap_or_else(|| "Unknown".to_string()),
            },
            author: source_name,
            category: None,
        })
    }

    /// Mint an id for an article without a URL. Unique within the process,
    /// only meant as a display key.
    fn next_fallback_id(&self) -> String {
        let n = self.fallback_ids.fetch_add(1, Ordering::Relaxed) % 1_000_000_000 + 1;
        format!("gnews-{n}-{}", Utc::now().timestamp_millis())
    }
}

fn strip_truncation_marker(content: &str) -> String {
    TRUNCATION_MARKER.replace(content, "").into_owned()
}


#[cfg(test)]
mod tests {
    use super::fake::{FakeTransport, Reply, gnews_body, online_config};
    use super::*;

    fn query_map(url: &Url) -> Vec<(String, String)> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[tokio::test]
    async fn test_offline_headlines_use_mock_without_requests() {
        let client = NewsClient::new(FakeTransport::default(), Config::default());
        assert!(client.is_offline());

        let response = client.fetch_headlines(&QueryFilters::default()).await.unwrap();
        assert_eq!(response.articles.len(), 6);
        assert_eq!(response.total_results, 6);
        assert!(client.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_offline_search_finds_space_article() {
        let client = NewsClient::new(FakeTransport::default(), Config::default());
        let response = client
            .search_articles("space", &QueryFilters::default())
            .await
            .unwrap();
        assert_eq!(response.articles.len(), 1);
        assert_eq!(response.articles[0].id, "4");
        assert_eq!(response.total_results, 1);
    }

    #[tokio::test]
    async fn test_headlines_request_parameters() {
        let transport = FakeTransport::new([Reply::ok(gnews_body(0, &[]))]);
        let client = NewsClient::new(transport, online_config());
        let filters = QueryFilters {
            category: Some(Category::Sports),
            country: Some("GB".to_string()),
            language: Some("en".to_string()),
            page: 2,
            ..QueryFilters::default()
        };

        client.fetch_headlines(&filters).await.unwrap();

        let requests = client.transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path(), "/api/v4/top-headlines");
        assert_eq!(
            query_map(&requests[0]),
            vec![
                ("token".to_string(), "test-token".to_string()),
                ("country".to_string(), "gb".to_string()),
                ("category".to_string(), "sports".to_string()),
                ("lang".to_string(), "en".to_string()),
                ("max".to_string(), "12".to_string()),
                ("page".to_string(), "2".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_headlines_omit_general_category_and_default_country() {
        let transport = FakeTransport::new([Reply::ok(gnews_body(0, &[]))]);
        let client = NewsClient::new(transport, online_config());
        let filters = QueryFilters {
            category: Some(Category::General),
            ..QueryFilters::default()
        };

        client.fetch_headlines(&filters).await.unwrap();

        let params = query_map(&client.transport.requests()[0]);
        assert!(params.iter().all(|(k, _)| k != "category"));
        assert!(params.contains(&("country".to_string(), "us".to_string())));
    }

    #[tokio::test]
    async fn test_search_request_parameters() {
        let transport = FakeTransport::new([Reply::ok(gnews_body(0, &[]))]);
        let client = NewsClient::new(transport, online_config());

        client
            .search_articles("mars rover", &QueryFilters::default())
            .await
            .unwrap();

        let request = &client.transport.requests()[0];
        assert_eq!(request.path(), "/api/v4/search");
        let params = query_map(request);
        assert!(params.contains(&("q".to_string(), "mars rover".to_string())));
        assert!(params.iter().all(|(k, _)| k != "country" && k != "lang"));
    }

    #[tokio::test]
    async fn test_headlines_normalize_and_tag_category() {
        let body = gnews_body(
            40,
            &[
                ("First", "https://a.example.com/1"),
                ("Second", "https://a.example.com/2"),
            ],
        );
        let transport = FakeTransport::new([Reply::ok(body)]);
        let client = NewsClient::new(transport, online_config());
        let filters = QueryFilters {
            category: Some(Category::Science),
            ..QueryFilters::default()
        };

        let response = client.fetch_headlines(&filters).await.unwrap();

        assert_eq!(response.total_results, 40);
        assert_eq!(response.articles.len(), 2);
        let first = &response.articles[0];
        assert_eq!(first.id, "https://a.example.com/1");
        assert_eq!(first.content, "First in depth...");
        assert_eq!(first.source.name, "Wire");
        assert_eq!(first.author.as_deref(), Some("Wire"));
        assert_eq!(first.category, Some(Category::Science));
        assert_eq!(first.published_at.to_rfc3339(), "2025-05-06T10:00:00+00:00");
    }

    #[tokio::test]
    async fn test_error_status_falls_back_to_mock() {
        let transport = FakeTransport::new([Reply::status(500, "oops")]);
        let client = NewsClient::new(transport, online_config());

        let response = client.fetch_headlines(&QueryFilters::default()).await.unwrap();
        assert_eq!(response.total_results, 6);
        assert_eq!(response.articles[0].id, "1");
    }

    #[tokio::test]
    async fn test_transport_error_falls_back_to_mock_search() {
        let transport = FakeTransport::new([Reply::unreachable()]);
        let client = NewsClient::new(transport, online_config());

        let response = client
            .search_articles("film", &QueryFilters::default())
            .await
            .unwrap();
        assert_eq!(response.articles.len(), 1);
        assert_eq!(response.articles[0].id, "6");
    }

    #[tokio::test]
    async fn test_malformed_body_is_an_error() {
        let transport = FakeTransport::new([Reply::ok("<html>rate limited</html>")]);
        let client = NewsClient::new(transport, online_config());

        let err = client.fetch_headlines(&QueryFilters::default()).await.unwrap_err();
        assert!(matches!(err, NewsError::Malformed(_)));
    }

    #[test]
    fn test_normalize_fills_missing_fields() {
        let client = NewsClient::new(FakeTransport::default(), online_config());
        let response = client
            .normalize(r#"{"articles":[{"title":"Only a title"}]}"#)
            .unwrap();

        assert_eq!(response.total_results, 0);
        let article = &response.articles[0];
        assert!(article.id.starts_with("gnews-1-"));
        assert_eq!(article.title, "Only a title");
        assert_eq!(article.description, "");
        assert_eq!(article.url, "");
        assert_eq!(article.image_url, None);
        assert_eq!(article.source.name, "Unknown");
        assert_eq!(article.author, None);
    }

    #[test]
    fn test_normalize_generated_ids_are_unique() {
        let client = NewsClient::new(FakeTransport::default(), online_config());
        let response = client
            .normalize(r#"{"articles":[{"title":"a"},{"title":"b"},{"title":"c"}]}"#)
            .unwrap();
        let ids: Vec<&str> = response.articles.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids.iter().unique().count(), 3);
    }

    #[test]
    fn test_normalize_drops_duplicate_urls() {
        let client = NewsClient::new(FakeTransport::default(), online_config());
        let body = gnews_body(
            3,
            &[("One", "https://x/1"), ("Again", "https://x/1"), ("Two", "https://x/2")],
        );
        let response = client.normalize(&body).unwrap();
        let titles: Vec<&str> = response.articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["One", "Two"]);
    }

    #[test]
    fn test_normalize_rejects_bad_timestamp() {
        let client = NewsClient::new(FakeTransport::default(), online_config());
        let err = client
            .normalize(r#"{"articles":[{"title":"t","publishedAt":"yesterday"}]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("invalid publishedAt"));
    }

    #[test]
    fn test_normalize_accepts_null_articles() {
        let client = NewsClient::new(FakeTransport::default(), online_config());
        let response = client.normalize(r#"{"totalArticles":0,"articles":null}"#).unwrap();
        assert!(response.articles.is_empty());
    }

    #[test]
    fn test_strip_truncation_marker() {
        assert_eq!(strip_truncation_marker("Body text... [2045 chars]"), "Body text...");
        assert_eq!(strip_truncation_marker("Body text… [+99 chars]"), "Body text…");
        assert_eq!(strip_truncation_marker("No marker here"), "No marker here");
    }
}
