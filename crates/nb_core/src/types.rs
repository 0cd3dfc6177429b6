use serde::{Deserialize, Serialize};

/// Raw fields scraped from one story in a search-results listing, before
/// any date filtering or text analysis has happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSnippet {
    pub title: String,
    /// Byline text as rendered by the site, e.g. "March 10, 2024 | 4:12pm".
    pub date_text: String,
    pub description: String,
    pub image_url: Option<String>,
}

/// One qualifying article, filtered and annotated. Immutable once built;
/// ownership moves to the export sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    pub description: String,
    /// Canonical "Month D, YYYY" rendering of the publish date.
    pub date: String,
    /// Empty string when the story carried no image.
    pub image_filename: String,
    pub money_present: bool,
    /// "Title: {n}; Description: {m}" occurrence summary.
    pub phrase_counts: String,
}

/// Everything produced from scanning a single listing page.
#[derive(Debug, Clone)]
pub struct PageResult {
    pub records: Vec<ArticleRecord>,
    /// True iff the page produced at least one record and the scan never
    /// hit an out-of-window date, i.e. pagination may continue.
    pub advance: bool,
}
