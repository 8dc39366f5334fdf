//! Terminal rendering of query snapshots.
//!
//! Three layouts mirror the ways a reader skims news:
//!
//! | Layout | Shape |
//! |--------|-------|
//! | `grid` | Featured first article, then numbered cards |
//! | `list` | Title, description, and a meta line per article |
//! | `compact` | One line per article |
//!
//! Articles can be ordered by [`Sort`] before they are laid out. Sorting
//! works on a copy; the snapshot keeps the order the provider returned.
//!
//! Rendering is pure: the caller passes `now` so relative times are stable
//! in tests.

use crate::models::{Article, QueryState};
use crate::utils::{time_ago, truncate_chars};
use chrono::{DateTime, Utc};
use std::fmt::Write;

const TITLE_WIDTH: usize = 80;
const SUMMARY_WIDTH: usize = 140;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Layout {
    #[default]
    Grid,
    List,
    Compact,
}

/// Display order of articles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Sort {
    /// Most recently published first
    #[default]
    Newest,
    /// Oldest first
    Oldest,
    /// Provider relevance; there is no score, so this is newest first
    Relevance,
}

impl Sort {
    /// Order `articles` by publication time, ties keeping their input order.
    pub fn apply(self, articles: &mut [Article]) {
        match self {
            Sort::Newest | Sort::Relevance => {
                articles.sort_by(|a, b| b.published_at.cmp(&a.published_at))
            }
            Sort::Oldest => articles.sort_by_key(|a| a.published_at),
        }
    }
}

/// Render the snapshot with status banners and a footer.
///
/// # Arguments
///
/// * `state` - The snapshot to show; it is not reordered
/// * `layout` - Grid, list, or compact body
/// * `sort` - Order of the articles in the body
/// * `now` - Reference time for "N hours ago"
///
/// # Returns
///
/// The rendered text, ending in a newline.
pub fn render(state: &QueryState, layout: Layout, sort: Sort, now: DateTime<Utc>) -> String {
    let mut out = String::new();

    if let Some(error) = &state.error {
        let _ = writeln!(out, "! {error}");
        let _ = writeln!(out);
    }
    if state.articles.is_empty() {
        out.push_str(if state.loading {
            "Loading latest news...\n"
        } else {
            "No articles found.\n"
        });
        return out;
    }

    let mut articles = state.articles.clone();
    sort.apply(&mut articles);
    match layout {
        Layout::Grid => render_grid(&mut out, &articles, now),
        Layout::List => render_list(&mut out, &articles, now),
        Layout::Compact => render_compact(&mut out, &articles, now),
    }

    let _ = writeln!(out);
    let _ = write!(
        out,
        "Showing {} of {} articles (page {})",
        state.articles.len(),
        state.total_results,
        state.current_page
    );
    if state.has_more {
        out.push_str(" - more available");
    }
    if state.loading {
        out.push_str(" - loading...");
    }
    out.push('\n');
    out
}

fn meta_line(article: &Article, now: DateTime<Utc>) -> String {
    let mut meta = format!(
        "{} · {}",
        article.source.name,
        time_ago(article.published_at, now)
    );
    if let Some(category) = article.category.filter(|c| c.is_filter()) {
        let _ = write!(meta, " · {category}");
    }
    meta
}

fn render_grid(out: &mut String, articles: &[Article], now: DateTime<Utc>) {
    let (featured, rest) = match articles.split_first() {
        Some(split) => split,
        None => return,
    };

    let _ = writeln!(out, "★ {}", featured.title);
    let _ = writeln!(out, "  {}", meta_line(featured, now));
    if !featured.description.is_empty() {
        let _ = writeln!(out, "  {}", featured.description);
    }

    for (i, article) in rest.iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "[{}] {}",
            i + 2,
            truncate_chars(&article.title, TITLE_WIDTH)
        );
        let _ = writeln!(out, "    {}", meta_line(article, now));
        if !article.description.is_empty() {
            let _ = writeln!(
                out,
                "    {}",
                truncate_chars(&article.description, SUMMARY_WIDTH)
            );
        }
    }
}

fn render_list(out: &mut String, articles: &[Article], now: DateTime<Utc>) {
    for (i, article) in articles.iter().enumerate() {
        if i > 0 {
            let _ = writeln!(out);
        }
        let _ = writeln!(out, "{}. {}", i + 1, article.title);
        if !article.description.is_empty() {
            let _ = writeln!(
                out,
                "   {}",
                truncate_chars(&article.description, SUMMARY_WIDTH)
            );
        }
        let _ = writeln!(out, "   {}", meta_line(article, now));
    }
}

fn render_compact(out: &mut String, articles: &[Article], now: DateTime<Utc>) {
    for (i, article) in articles.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {:<16} {:<20} {}",
            i + 1,
            time_ago(article.published_at, now),
            truncate_chars(&article.source.name, 20),
            truncate_chars(&article.title, TITLE_WIDTH)
        );
    }
}

/// Full view of one article: headline, byline, date, body, and link.
///
/// The byline names the author only when it differs from the source.
pub fn render_detail(article: &Article, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", article.title);
    let rule = "=".repeat(article.title.chars().count().min(TITLE_WIDTH));
    let _ = writeln!(out, "{rule}");

    let byline = match article.author.as_deref() {
        Some(author) if author != article.source.name => {
            format!("By {author} · {}", article.source.name)
        }
        _ => article.source.name.clone(),
    };
    let _ = writeln!(out, "{byline}");
    let _ = writeln!(
        out,
        "{} ({})",
        article.published_at.format("%B %-d, %Y at %-I:%M %p"),
        time_ago(article.published_at, now)
    );
    if let Some(category) = article.category {
        let _ = writeln!(out, "Category: {category}");
    }
    if let Some(image) = &article.image_url {
        let _ = writeln!(out, "Image: {image}");
    }

    for block in [&article.description, &article.content] {
        if !block.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "{block}");
        }
    }

    if !article.url.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Read the full article: {}", article.url);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::mock_articles;
    use crate::models::{Category, QueryFilters, Source};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 6, 12, 0, 0).unwrap()
    }

    fn article(id: &str, title: &str, hours_ago: i64) -> Article {
        Article {
            id: id.to_string(),
            title: title.to_string(),
            description: format!("{title} described"),
            content: format!("{title} body"),
            url: format!("https://example.com/{id}"),
            image_url: None,
            published_at: now() - chrono::Duration::hours(hours_ago),
            source: Source {
                id: None,
                name: "Wire".to_string(),
            },
            author: Some("Ada Reporter".to_string()),
            category: Some(Category::Sports),
        }
    }

    fn state(articles: Vec<Article>, total: u64, has_more: bool) -> QueryState {
        QueryState {
            articles,
            total_results: total,
            has_more,
            ..QueryState::default()
        }
    }

    #[test]
    fn test_empty_states() {
        let loading = QueryState {
            loading: true,
            ..QueryState::default()
        };
        assert_eq!(
            render(&loading, Layout::Grid, Sort::Newest, now()),
            "Loading latest news...\n"
        );
        assert_eq!(
            render(&QueryState::default(), Layout::List, Sort::Oldest, now()),
            "No articles found.\n"
        );
    }

    #[test]
    fn test_error_banner_keeps_articles() {
        let mut snapshot = state(vec![article("a", "Kept", 1)], 1, false);
        snapshot.error = Some("Failed to fetch news: boom".to_string());

        let out = render(&snapshot, Layout::Compact, Sort::Newest, now());
        assert!(out.starts_with("! Failed to fetch news: boom\n"));
        assert!(out.contains("Kept"));
    }

    #[test]
    fn test_grid_features_first_article() {
        let snapshot = state(
            vec![article("a", "Lead story", 1), article("b", "Second story", 3)],
            10,
            true,
        );
        let out = render(&snapshot, Layout::Grid, Sort::Newest, now());

        assert!(out.starts_with("★ Lead story\n  Wire · 1 hour ago · sports\n"));
        assert!(out.contains("[2] Second story\n    Wire · 3 hours ago · sports\n"));
        assert!(out.ends_with("Showing 2 of 10 articles (page 1) - more available\n"));
    }

    #[test]
    fn test_list_layout() {
        let snapshot = state(vec![article("a", "Only", 2)], 1, false);
        let out = render(&snapshot, Layout::List, Sort::Newest, now());
        assert_eq!(
            out,
            "1. Only\n   Only described\n   Wire · 2 hours ago · sports\n\n\
             Showing 1 of 1 articles (page 1)\n"
        );
    }

    #[test]
    fn test_compact_one_line_per_article() {
        let response = mock_articles(&QueryFilters::default());
        let snapshot = state(response.articles, response.total_results, false);
        let out = render(&snapshot, Layout::Compact, Sort::Newest, now());
        // six article lines, a blank line, and the footer
        assert_eq!(out.lines().count(), 8);
        assert!(out.lines().nth(3).unwrap().contains("Space Exploration Mission"));
    }

    #[test]
    fn test_detail_view() {
        let out = render_detail(&article("a", "Deep dive", 26), now());
        assert!(out.starts_with("Deep dive\n=========\nBy Ada Reporter · Wire\n"));
        assert!(out.contains("May 5, 2025 at 10:00 AM (1 day ago)"));
        assert!(out.contains("Category: sports"));
        assert!(out.contains("Deep dive body"));
        assert!(out.ends_with("Read the full article: https://example.com/a\n"));
    }

    #[test]
    fn test_detail_byline_without_distinct_author() {
        let mut a = article("a", "Wire copy", 1);
        a.author = Some("Wire".to_string());
        let out = render_detail(&a, now());
        assert!(out.lines().nth(2) == Some("Wire"));
    }

    fn titles(out: &str) -> Vec<&str> {
        out.lines()
            .filter(|line| line.starts_with(|c: char| c.is_ascii_digit()))
            .filter_map(|line| line.split_once(". "))
            .map(|(_, title)| title)
            .collect()
    }

    fn shuffled() -> QueryState {
        state(
            vec![
                article("b", "Middle", 5),
                article("c", "Oldest", 30),
                article("a", "Newest", 1),
            ],
            3,
            false,
        )
    }

    #[test]
    fn test_sort_newest_first() {
        let snapshot = shuffled();
        let out = render(&snapshot, Layout::List, Sort::Newest, now());

        assert_eq!(titles(&out), vec!["Newest", "Middle", "Oldest"]);
        let kept: Vec<&str> = snapshot.articles.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(kept, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_sort_oldest_first() {
        let out = render(&shuffled(), Layout::List, Sort::Oldest, now());
        assert_eq!(titles(&out), vec!["Oldest", "Middle", "Newest"]);
    }

    #[test]
    fn test_sort_relevance_is_newest_first() {
        let out = render(&shuffled(), Layout::List, Sort::Relevance, now());
        assert_eq!(titles(&out), vec!["Newest", "Middle", "Oldest"]);

        let grid = render(&shuffled(), Layout::Grid, Sort::Relevance, now());
        assert!(grid.starts_with("★ Newest\n"));
    }

    #[test]
    fn test_sort_keeps_ties_in_input_order() {
        let snapshot = state(
            vec![article("x", "First", 2), article("y", "Second", 2)],
            2,
            false,
        );
        for sort in [Sort::Newest, Sort::Oldest, Sort::Relevance] {
            let out = render(&snapshot, Layout::List, sort, now());
            assert_eq!(titles(&out), vec!["First", "Second"]);
        }
    }
}
