use std::path::PathBuf;

use async_trait::async_trait;
use nb_core::{Error, ExportSink, FileFetcher, RawSnippet, Result};
use tracing::info;

use crate::date_window::DateWindow;
use crate::extract::extract_page;

/// A paged listing of search results. One page of snippets is materialized
/// at a time; `next_page` asks the listing to materialize the next batch.
#[async_trait]
pub trait NewsListing: Send + Sync {
    /// Raw snippets of the currently materialized page
    async fn snippets(&self) -> Result<Vec<RawSnippet>>;

    /// Materialize the next page; Ok(false) when the listing is exhausted
    async fn next_page(&self) -> Result<bool>;
}

/// Drives the page-by-page walk: extract, export, decide whether to
/// continue. Strictly sequential; a page is only requested after the prior
/// page has been fully processed and exported.
pub struct PaginationController<'a> {
    listing: &'a dyn NewsListing,
    fetcher: &'a dyn FileFetcher,
    sink: &'a dyn ExportSink,
    window: &'a DateWindow,
    phrase: &'a str,
    image_dir: PathBuf,
}

impl<'a> PaginationController<'a> {
    pub fn new(
        listing: &'a dyn NewsListing,
        fetcher: &'a dyn FileFetcher,
        sink: &'a dyn ExportSink,
        window: &'a DateWindow,
        phrase: &'a str,
        image_dir: PathBuf,
    ) -> Self {
        Self {
            listing,
            fetcher,
            sink,
            window,
            phrase,
            image_dir,
        }
    }

    /// Walks the listing from page 1 until the window is exhausted or the
    /// listing runs out of pages. Returns the total number of records
    /// exported. A vanished load-more control counts as exhaustion, not an
    /// error.
    pub async fn run(&self) -> Result<usize> {
        let mut page_index = 1u32;
        let mut total = 0usize;

        loop {
            let snippets = self.listing.snippets().await?;
            let page = extract_page(
                &snippets,
                self.window,
                self.phrase,
                page_index,
                self.fetcher,
                &self.image_dir,
            )
            .await?;

            if page.records.is_empty() {
                // Nothing qualified; never send an empty page to the sink.
                info!("page {page_index} produced no records, skipping export");
            } else {
                total += page.records.len();
                info!(
                    "page {page_index} exported with {} records",
                    page.records.len()
                );
                self.sink.write_page(page_index, &page.records).await?;
            }

            if !page.advance {
                info!("oldest in-window date reached on page {page_index}");
                break;
            }

            match self.listing.next_page().await {
                Ok(true) => page_index += 1,
                Ok(false) => {
                    info!("listing exhausted after page {page_index}");
                    break;
                }
                Err(Error::ElementMissing(locator)) => {
                    info!("load-more control {locator} disappeared after page {page_index}");
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Mutex;

    use chrono::NaiveDate;
    use nb_export::MemorySink;

    struct NullFetcher;

    #[async_trait]
    impl FileFetcher for NullFetcher {
        async fn download(&self, _url: &str, _dest: &Path) -> Result<()> {
            Ok(())
        }
    }

    struct FakeListing {
        pages: Vec<Vec<RawSnippet>>,
        cursor: Mutex<usize>,
        /// When set, next_page fails with this locator as ElementMissing.
        vanish_on_next: bool,
    }

    impl FakeListing {
        fn new(pages: Vec<Vec<RawSnippet>>) -> Self {
            Self {
                pages,
                cursor: Mutex::new(0),
                vanish_on_next: false,
            }
        }
    }

    #[async_trait]
    impl NewsListing for FakeListing {
        async fn snippets(&self) -> Result<Vec<RawSnippet>> {
            let cursor = *self.cursor.lock().unwrap();
            Ok(self.pages.get(cursor).cloned().unwrap_or_default())
        }

        async fn next_page(&self) -> Result<bool> {
            if self.vanish_on_next {
                return Err(Error::ElementMissing("a.load-more".to_string()));
            }
            let mut cursor = self.cursor.lock().unwrap();
            if *cursor + 1 < self.pages.len() {
                *cursor += 1;
                Ok(true)
            } else {
                Ok(false)
            }
        }
    }

    fn snippet(title: &str, date_text: &str) -> RawSnippet {
        RawSnippet {
            title: title.to_string(),
            date_text: date_text.to_string(),
            description: format!("about {title}"),
            image_url: None,
        }
    }

    fn march_window() -> DateWindow {
        DateWindow::build(0, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_two_page_walk_stops_on_out_of_window_page() {
        // Page 1: ten March articles. Page 2 opens with February, so it
        // yields zero records and is never exported.
        let page1: Vec<_> = (1..=10)
            .map(|d| snippet(&format!("story {d}"), &format!("March {d}, 2024")))
            .collect();
        let page2 = vec![
            snippet("old one", "February 27, 2024"),
            snippet("older", "February 26, 2024"),
        ];
        let listing = FakeListing::new(vec![page1, page2]);
        let sink = MemorySink::new();
        let window = march_window();

        let controller = PaginationController::new(
            &listing,
            &NullFetcher,
            &sink,
            &window,
            "story",
            PathBuf::from("/tmp"),
        );
        let total = controller.run().await.unwrap();

        assert_eq!(total, 10);
        let pages = sink.pages().await;
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].0, 1);
        assert_eq!(pages[0].1.len(), 10);
    }

    #[tokio::test]
    async fn test_partial_page_exports_then_stops() {
        let page1 = vec![
            snippet("a", "March 10, 2024"),
            snippet("b", "February 28, 2024"),
        ];
        let listing = FakeListing::new(vec![page1, vec![snippet("never", "March 1, 2024")]]);
        let sink = MemorySink::new();
        let window = march_window();

        let controller = PaginationController::new(
            &listing,
            &NullFetcher,
            &sink,
            &window,
            "a",
            PathBuf::from("/tmp"),
        );
        let total = controller.run().await.unwrap();

        // The March record on page 1 is exported; the stop decision keeps
        // page 2 from ever being requested.
        assert_eq!(total, 1);
        assert_eq!(sink.pages().await.len(), 1);
        assert_eq!(*listing.cursor.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_exhausted_listing_stops_cleanly() {
        let listing = FakeListing::new(vec![vec![
            snippet("a", "March 10, 2024"),
            snippet("b", "March 9, 2024"),
        ]]);
        let sink = MemorySink::new();
        let window = march_window();

        let controller = PaginationController::new(
            &listing,
            &NullFetcher,
            &sink,
            &window,
            "a",
            PathBuf::from("/tmp"),
        );
        let total = controller.run().await.unwrap();

        assert_eq!(total, 2);
        assert_eq!(sink.pages().await.len(), 1);
    }

    #[tokio::test]
    async fn test_vanished_load_more_is_graceful() {
        let mut listing = FakeListing::new(vec![vec![snippet("a", "March 10, 2024")]]);
        listing.vanish_on_next = true;
        let sink = MemorySink::new();
        let window = march_window();

        let controller = PaginationController::new(
            &listing,
            &NullFetcher,
            &sink,
            &window,
            "a",
            PathBuf::from("/tmp"),
        );

        assert_eq!(controller.run().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_empty_first_page_exports_nothing() {
        let listing = FakeListing::new(vec![vec![]]);
        let sink = MemorySink::new();
        let window = march_window();

        let controller = PaginationController::new(
            &listing,
            &NullFetcher,
            &sink,
            &window,
            "a",
            PathBuf::from("/tmp"),
        );

        assert_eq!(controller.run().await.unwrap(), 0);
        assert!(sink.pages().await.is_empty());
    }
}
