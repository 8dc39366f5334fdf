//! Data models for articles, query filters, and the observable query state.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Article`]: Canonical article produced by normalization or the mock dataset
//! - [`Category`]: The closed set of news categories
//! - [`QueryFilters`] / [`FilterUpdate`]: The stored search intent and partial changes to it
//! - [`NewsResponse`]: One page of results as returned by the client
//! - [`QueryState`]: The snapshot exposed to renderers
//!
//! Serialized field names use camelCase to match the JSON output consumed by
//! front ends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default number of articles requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// A news category.
///
/// `General` means "no category filter": it is never sent upstream and never
/// narrows the mock dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    General,
    Business,
    Entertainment,
    Health,
    Science,
    Sports,
    Technology,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::General,
        Category::Business,
        Category::Entertainment,
        Category::Health,
        Category::Science,
        Category::Sports,
        Category::Technology,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Business => "business",
            Category::Entertainment => "entertainment",
            Category::Health => "health",
            Category::Science => "science",
            Category::Sports => "sports",
            Category::Technology => "technology",
        }
    }

    /// Whether this category narrows results at all.
    pub fn is_filter(&self) -> bool {
        !matches!(self, Category::General)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outlet an article came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Provider-assigned id, when the provider has one.
    pub id: Option<String>,
    /// Display name of the outlet.
    pub name: String,
}

/// A canonical news article.
///
/// Built once, either by normalizing a provider response or from the mock
/// dataset, and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Stable identifier: the article URL, or a generated token when the
    /// provider gave none. Unique within one result set.
    pub id: String,
    pub title: String,
    pub description: String,
    /// Body text, with the provider's truncation marker removed.
    pub content: String,
    pub url: String,
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,
    pub source: Source,
    pub author: Option<String>,
    pub category: Option<Category>,
}

impl Article {
    /// Case-insensitive substring match against title, description, or content.
    ///
    /// `needle` must already be lowercase.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.content.to_lowercase().contains(needle)
    }
}

/// The stored search/browse intent.
///
/// A present `query` means search mode; absent means browse mode. The
/// constructor and [`QueryFilters::merge`] keep `query` either `None` or
/// non-blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryFilters {
    pub category: Option<Category>,
    pub country: Option<String>,
    pub language: Option<String>,
    pub query: Option<String>,
    pub page_size: u32,
    /// 1-indexed.
    pub page: u32,
}

impl Default for QueryFilters {
    fn default() -> Self {
        Self {
            category: None,
            country: None,
            language: None,
            query: None,
            page_size: DEFAULT_PAGE_SIZE,
            page: 1,
        }
    }
}

impl QueryFilters {
    /// Apply `update` on top of these filters, last write wins per key.
    ///
    /// An empty query clears the query; `Category::General` clears the
    /// category; empty country/language strings clear those keys. Page and
    /// page size never drop below 1.
    pub fn merge(&self, update: &FilterUpdate) -> QueryFilters {
        let mut merged = self.clone();
        if let Some(category) = update.category {
            merged.category = category.is_filter().then_some(category);
        }
        if let Some(country) = &update.country {
            merged.country = non_blank(country);
        }
        if let Some(language) = &update.language {
            merged.language = non_blank(language);
        }
        if let Some(query) = &update.query {
            merged.query = non_blank(query);
        }
        if let Some(page_size) = update.page_size {
            merged.page_size = page_size.max(1);
        }
        if let Some(page) = update.page {
            merged.page = page.max(1);
        }
        merged
    }

    /// The active search term, if in search mode.
    pub fn search_query(&self) -> Option<&str> {
        self.query.as_deref().filter(|q| !q.trim().is_empty())
    }

    pub fn is_search(&self) -> bool {
        self.search_query().is_some()
    }
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// A partial set of filters. `None` leaves the stored value as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterUpdate {
    pub category: Option<Category>,
    pub country: Option<String>,
    pub language: Option<String>,
    pub query: Option<String>,
    pub page_size: Option<u32>,
    pub page: Option<u32>,
}

impl FilterUpdate {
    pub fn category(category: Category) -> Self {
        Self {
            category: Some(category),
            ..Self::default()
        }
    }

    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsResponse {
    pub articles: Vec<Article>,
    /// Total matches reported by the provider; may exceed `articles.len()`.
    pub total_results: u64,
}

/// The controller's externally observable snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryState {
    pub articles: Vec<Article>,
    pub loading: bool,
    pub error: Option<String>,
    pub total_results: u64,
    pub current_page: u32,
    pub has_more: bool,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            articles: Vec::new(),
            loading: false,
            error: None,
            total_results: 0,
            current_page: 1,
            has_more: false,
        }
    }
}

/// Whether pages beyond `page` exist.
pub fn has_more(page: u32, page_size: u32, total_results: u64) -> bool {
    u64::from(page) * u64::from(page_size) < total_results
}
