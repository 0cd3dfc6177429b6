use std::path::Path;

use chrono::NaiveDate;
use nb_core::{ArticleRecord, Error, FileFetcher, PageResult, RawSnippet, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::date_window::{render_date, DateWindow};
use crate::text::{count_phrase, has_money_mention};

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z]+\s\d{1,2},\s\d{4}").expect("date pattern is valid"));

/// Deterministic image filename for the article at `position` (1-based)
/// on page `page_index`.
pub fn image_filename(page_index: u32, position: usize) -> String {
    format!("page({page_index})_image-news({position}).png")
}

/// Finds the first "Month D, YYYY" substring in a byline, parses it and
/// re-renders it canonically.
fn canonical_date(date_text: &str) -> Result<String> {
    let raw = DATE_RE
        .find(date_text)
        .ok_or_else(|| Error::Extraction(format!("no date found in {date_text:?}")))?
        .as_str();
    let parsed = NaiveDate::parse_from_str(raw, "%B %d, %Y")
        .map_err(|e| Error::Extraction(format!("unparseable date {raw:?}: {e}")))?;
    Ok(render_date(parsed))
}

/// Scans one page's snippets, newest-first, into filtered and annotated
/// records.
///
/// The scan stops at the first snippet whose date falls outside the window;
/// later snippets are not examined. Images are downloaded as they are
/// encountered and a download failure fails the extraction. `advance` is
/// true only when at least one record was produced and the scan never hit
/// an out-of-window date.
pub async fn extract_page(
    snippets: &[RawSnippet],
    window: &DateWindow,
    phrase: &str,
    page_index: u32,
    fetcher: &dyn FileFetcher,
    image_dir: &Path,
) -> Result<PageResult> {
    let mut records = Vec::new();
    let mut stopped = false;

    for (i, snippet) in snippets.iter().enumerate() {
        let position = i + 1;
        let date = canonical_date(&snippet.date_text)?;

        if !window.contains_str(&date) {
            debug!("date {date} is outside the window, stopping page {page_index} scan");
            stopped = true;
            break;
        }

        let image_filename = match &snippet.image_url {
            Some(url) => {
                let filename = image_filename(page_index, position);
                fetcher.download(url, &image_dir.join(&filename)).await?;
                filename
            }
            None => String::new(),
        };

        let money_present =
            has_money_mention(&snippet.title) || has_money_mention(&snippet.description);
        let phrase_counts = format!(
            "Title: {}; Description: {}",
            count_phrase(&snippet.title, phrase),
            count_phrase(&snippet.description, phrase),
        );

        records.push(ArticleRecord {
            title: snippet.title.clone(),
            description: snippet.description.clone(),
            date,
            image_filename,
            money_present,
            phrase_counts,
        });
    }

    let advance = !records.is_empty() && !stopped;
    Ok(PageResult { records, advance })
}
