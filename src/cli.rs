//! Command-line interface definitions for News Query.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Provider settings can come from flags, environment variables, or a YAML
//! config file; flags and environment win over the file.

use crate::config::Config;
use crate::models::{Category, FilterUpdate};
use crate::outputs::text::{Layout, Sort};
use clap::Parser;

/// Command-line arguments for the News Query application.
///
/// # Examples
///
/// ```sh
/// # Top headlines from the offline dataset (no API key set)
/// news_query
///
/// # Search, three pages deep, one line per article, oldest first
/// GNEWS_API_KEY=... news_query -q "climate" --pages 3 -l compact -s oldest
///
/// # Sports headlines for the UK, saved as JSON
/// news_query -c sports --country gb -j ./out/sports.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Free-text search; leave empty to browse top headlines
    #[arg(short, long)]
    pub query: Option<String>,

    /// Restrict results to one category
    #[arg(short, long, value_enum)]
    pub category: Option<Category>,

    /// Two-letter country code for headlines
    #[arg(long)]
    pub country: Option<String>,

    /// Two-letter language code
    #[arg(long)]
    pub language: Option<String>,

    /// Articles per page
    #[arg(long, default_value_t = 12, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub page_size: u32,

    /// Number of pages to load ("load more" after the first)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub pages: u32,

    /// How to print the articles
    #[arg(short, long, value_enum, default_value_t = Layout::Grid)]
    pub layout: Layout,

    /// Order of the printed articles by publication time
    #[arg(short, long, value_enum, default_value_t = Sort::Newest)]
    pub sort: Sort,

    /// Print the full detail view of the Nth article (1-based)
    #[arg(long)]
    pub detail: Option<usize>,

    /// Write the final snapshot as JSON to this path
    #[arg(short, long)]
    pub json_output: Option<String>,

    /// Optional path to a config.yaml file
    #[arg(long)]
    pub config: Option<String>,

    /// GNews API key; without one, articles come from the built-in dataset
    #[arg(long, env = "GNEWS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Country used when --country is not given
    #[arg(long, env = "DEFAULT_COUNTRY")]
    pub default_country: Option<String>,

    /// GNews API base URL
    #[arg(long, env = "GNEWS_BASE_URL")]
    pub base_url: Option<String>,
}

impl Cli {
    /// Overlay flag and environment values on a loaded config.
    pub fn apply_to(&self, mut config: Config) -> Config {
        if let Some(api_key) = &self.api_key {
            config.api_key = Some(api_key.clone());
        }
        if let Some(country) = &self.default_country {
            config.default_country = country.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        config
    }

    /// The filters for the first request, minus the query.
    pub fn filter_update(&self) -> FilterUpdate {
        FilterUpdate {
            category: self.category,
            country: self.country.clone(),
            language: self.language.clone(),
            query: None,
            page_size: Some(self.page_size),
            page: Some(1),
        }
    }
}
