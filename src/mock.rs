//! Canned articles served when no API key is configured or the provider fails.
//!
//! The dataset covers every filtering category once. Publication times are
//! offsets from the first time the dataset is touched, so repeated calls in
//! one process return identical articles.

use crate::models::{Article, NewsResponse, QueryFilters, Source};
use chrono::{Duration, Utc};
use once_cell::sync::Lazy;
use tracing::debug;

static MOCK_ARTICLES: Lazy<Vec<Article>> = Lazy::new(|| {
    use crate::models::Category::*;

    let now = Utc::now();
    let article = |id: &str,
                   title: &str,
                   description: &str,
                   content: &str,
                   slug: &str,
                   image: &str,
                   minutes_ago: i64,
                   (source_id, source_name): (&str, &str),
                   author: &str,
                   category| Article {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        content: content.to_string(),
        url: format!("https://example.com/{slug}"),
        image_url: Some(format!("https://images.unsplash.com/{image}?w=400")),
        published_at: now - Duration::minutes(minutes_ago),
        source: Source {
            id: Some(source_id.to_string()),
            name: source_name.to_string(),
        },
        author: Some(author.to_string()),
        category: Some(category),
    };

    vec![
        article(
            "1",
            "Breaking: Major Technological Breakthrough Announced",
            "Scientists have made a groundbreaking discovery that could revolutionize the field of artificial intelligence and machine learning.",
            "In a stunning announcement today, researchers at leading universities have unveiled a new approach to artificial intelligence that promises to accelerate progress in the field by orders of magnitude...",
            "tech-breakthrough",
            "photo-1518709268805-4e9042af2176",
            30,
            ("tech-news", "Tech News Daily"),
            "Sarah Johnson",
            Technology,
        ),
        article(
            "2",
            "Global Markets Show Strong Recovery Signs",
            "Stock markets worldwide are experiencing significant gains as economic indicators point to a robust recovery.",
            "Financial analysts are optimistic about the current market trends, with major indices showing consistent upward movement over the past quarter...",
            "markets-recovery",
            "photo-1611974789855-9c2a0a7236a3",
            2 * 60,
            ("financial-times", "Financial Times"),
            "Michael Chen",
            Business,
        ),
        article(
            "3",
            "New Study Reveals Surprising Health Benefits",
            "Recent research shows that regular exercise combined with proper nutrition can significantly improve mental health.",
            "A comprehensive study involving thousands of participants has revealed compelling evidence linking physical activity with improved cognitive function...",
            "health-study",
            "photo-1559757148-5c350d0d3c56",
            4 * 60,
            ("health-journal", "Health Journal"),
            "Dr. Emily Rodriguez",
            Health,
        ),
        article(
            "4",
            "Space Exploration Mission Successfully Launched",
            "NASA's latest mission to explore deep space has been successfully launched, marking a new era in space exploration.",
            "The spacecraft, carrying advanced scientific instruments, is now on its journey to study distant planets and gather crucial data about our universe...",
            "space-mission",
            "photo-1446776653964-20c1d3a81b06",
            6 * 60,
            ("space-news", "Space News"),
            "Dr. James Wilson",
            Science,
        ),
        article(
            "5",
            "Championship Game Ends in Dramatic Fashion",
            "The final match of the season delivered an unforgettable conclusion with last-minute heroics.",
            "Sports fans around the world witnessed an incredible display of athletic prowess as the underdog team staged a remarkable comeback...",
            "championship-game",
            "photo-1461896836934-ffe607ba8211",
            8 * 60,
            ("sports-central", "Sports Central"),
            "Tom Anderson",
            Sports,
        ),
        article(
            "6",
            "Award-Winning Film Premieres to Critical Acclaim",
            "The latest blockbuster has received universal praise from critics and audiences alike.",
            "Film critics are calling it a masterpiece, with the director's unique vision and the cast's outstanding performances creating a cinematic experience...",
            "film-premiere",
            "photo-1489599795568-5fe0b6c49c63",
            12 * 60,
            ("entertainment-weekly", "Entertainment Weekly"),
            "Lisa Park",
            Entertainment,
        ),
    ]
});

/// Filter and paginate the canned dataset.
///
/// Filters apply in order: category (unless unset or general), then a
/// case-insensitive query match on title, description, or content, then the
/// page slice `[(page-1)*size, page*size)`.
///
/// # Returns
///
/// The page of matching articles, with `total_results` set to the filtered
/// count before pagination. A page past the end is empty, not an error.
pub fn mock_articles(filters: &QueryFilters) -> NewsResponse {
    let category = filters.category.filter(|c| c.is_filter());
    let needle = filters.search_query().map(str::to_lowercase);

    let filtered: Vec<&Article> = MOCK_ARTICLES
        .iter()
        .filter(|a| category.is_none_or(|c| a.category == Some(c)))
        .filter(|a| needle.as_deref().is_none_or(|n| a.matches_lowercase(n)))
        .collect();

    let page_size = filters.page_size.max(1) as usize;
    let start = (filters.page.max(1) as usize - 1).saturating_mul(page_size);
    let articles: Vec<Article> = filtered
        .iter()
        .skip(start)
        .take(page_size)
        .map(|a| (*a).clone())
        .collect();

    debug!(
        ?category,
        query = ?needle,
        page = filters.page,
        page_size,
        matched = filtered.len(),
        returned = articles.len(),
        "Served mock articles"
    );

    NewsResponse {
        articles,
        total_results: filtered.len() as u64,
    }
}
