use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nb_core::{BrowserDriver, Error, RawSnippet, Result};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::pagination::NewsListing;
use crate::snippet::parse_snippets;

/// How the listing advances past the first page of results. The two
/// historical pipelines differed only here, so the difference is a strategy
/// parameter instead of a second type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationStrategy {
    /// Read the reported page count from the results heading and stop after
    /// that many pages, even if the load-more control is still present.
    ByReportedCount,
    /// Click the load-more control until it disappears.
    ByLoadMore,
}

/// Locators and toggles for one news site's search UI. All locators are CSS.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub base_url: String,
    /// Consent/cookie button dismissed on open when present.
    pub consent: Option<String>,
    pub search_toggle: String,
    pub search_input: String,
    pub search_submit: String,
    pub results_container: String,
    pub story: String,
    /// Marker element rendered when the search matched nothing. The two
    /// historical pipelines keyed off different markers; configure per site.
    pub no_results_marker: String,
    pub sort_newest: String,
    pub sections_heading: String,
    pub section_all: String,
    /// CSS template for one section link; `{}` is replaced by the name.
    pub section_link: String,
    pub load_more: String,
    pub page_count: String,
    pub pagination: PaginationStrategy,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nypost.com/".to_string(),
            consent: Some("button.consent-banner__allow-all".to_string()),
            search_toggle: "button.site-header__search-toggle".to_string(),
            search_input: "input#search-input-header".to_string(),
            search_submit: "button.search__submit".to_string(),
            results_container: "div.search-results__stories".to_string(),
            story: "div.search-results__story".to_string(),
            no_results_marker: "h2.search-results__none-found".to_string(),
            sort_newest: "ul.search-results__sort li a.sort-newest".to_string(),
            sections_heading: "nav.interior-menu h3.interior-menu__heading".to_string(),
            section_all: "ul.interior-menu__nav li a.section-all".to_string(),
            section_link: "ul.interior-menu__nav li a[data-section=\"{}\"]".to_string(),
            load_more: "a.search-results__see-more".to_string(),
            page_count: "h2.search-results__heading em".to_string(),
            pagination: PaginationStrategy::ByLoadMore,
        }
    }
}

/// Drives one search session against a live browser: open the site, run the
/// phrase search, apply the newest-first sort and section filters, then act
/// as the paged listing the pagination controller walks.
pub struct NewsSearch {
    browser: Arc<dyn BrowserDriver>,
    config: SiteConfig,
    /// Pages still allowed under `ByReportedCount`; None until the count is
    /// read, and always None under `ByLoadMore`.
    pages_left: Mutex<Option<u32>>,
}

impl NewsSearch {
    pub fn new(browser: Arc<dyn BrowserDriver>, config: SiteConfig) -> Self {
        Self {
            browser,
            config,
            pages_left: Mutex::new(None),
        }
    }

    /// Opens the site and dismisses the consent popup when it shows up.
    pub async fn open(&self) -> Result<()> {
        self.browser.navigate(&self.config.base_url).await?;
        if let Some(consent) = &self.config.consent {
            if self.browser.is_enabled(consent).await? {
                self.browser.click(consent).await?;
            }
        }
        self.browser
            .wait_visible(&self.config.search_toggle, Duration::from_secs(20))
            .await
    }

    /// Submits the phrase search. `NoResultsFound` when the site reports no
    /// matching stories or the results never render.
    pub async fn search(&self, phrase: &str) -> Result<()> {
        self.browser
            .wait_visible(&self.config.search_toggle, Duration::from_secs(3))
            .await?;
        self.browser.click(&self.config.search_toggle).await?;
        self.browser
            .type_text(&self.config.search_input, phrase)
            .await?;
        self.browser.click(&self.config.search_submit).await?;
        info!("submitted search for {phrase:?}");

        let rendered = self
            .browser
            .wait_visible(&self.config.results_container, Duration::from_secs(20))
            .await;
        let none_found = self
            .browser
            .is_visible(&self.config.no_results_marker)
            .await?;
        if rendered.is_err() || none_found {
            return Err(Error::NoResultsFound(format!(
                "no news found for the phrase {phrase:?}"
            )));
        }

        if self.config.pagination == PaginationStrategy::ByReportedCount {
            let limit = self.read_page_count().await?;
            info!("site reports {limit} result pages");
            *self.pages_left.lock().await = Some(limit);
        }

        Ok(())
    }

    /// Applies the newest-first sort so the early-stop scan sees dates in
    /// descending order.
    pub async fn sort_newest(&self) -> Result<()> {
        let sort = &self.config.sort_newest;
        self.browser.scroll_into_view(sort).await?;
        self.browser
            .wait_enabled(sort, Duration::from_secs(10))
            .await?;
        self.browser.click(sort).await?;
        Ok(())
    }

    /// Applies section filters. An empty list selects "All". Sections the
    /// site does not offer are logged and skipped, not fatal.
    pub async fn select_sections(&self, sections: &[String]) -> Result<()> {
        let heading = &self.config.sections_heading;
        self.browser
            .wait_enabled(heading, Duration::from_secs(10))
            .await?;
        self.browser.scroll_into_view(heading).await?;

        if sections.is_empty() {
            self.browser
                .wait_enabled(&self.config.section_all, Duration::from_secs(10))
                .await?;
            self.browser.click(&self.config.section_all).await?;
            return Ok(());
        }

        for section in sections {
            self.click_section(section).await?;
        }
        Ok(())
    }

    async fn click_section(&self, section: &str) -> Result<()> {
        let link = self.config.section_link.replace("{}", section);
        let present = self.browser.is_visible(&link).await? || self.browser.is_enabled(&link).await?;
        if !present {
            warn!("section {section:?} is not available, skipping");
            return Ok(());
        }
        self.browser
            .scroll_into_view(&self.config.sections_heading)
            .await?;
        self.browser
            .wait_enabled(&link, Duration::from_secs(10))
            .await?;
        self.browser.click(&link).await?;
        Ok(())
    }

    async fn read_page_count(&self) -> Result<u32> {
        let raw = self.browser.get_text(&self.config.page_count).await?;
        let digits = raw.replace(',', "");
        digits.trim().parse::<u32>().map_err(|_| {
            Error::Extraction(format!("result-count heading {raw:?} is not a number"))
        })
    }
}

#[async_trait]
impl NewsListing for NewsSearch {
    async fn snippets(&self) -> Result<Vec<RawSnippet>> {
        // Scroll every story into view first so lazily loaded thumbnails
        // have real URLs by the time the HTML is read.
        let count = self.browser.count_elements(&self.config.story).await?;
        for i in 0..count {
            self.browser
                .scroll_into_view_nth(&self.config.story, i)
                .await?;
        }

        let html = self
            .browser
            .outer_html(&self.config.results_container)
            .await?;
        parse_snippets(&html)
    }

    async fn next_page(&self) -> Result<bool> {
        if self.config.pagination == PaginationStrategy::ByReportedCount {
            let mut left = self.pages_left.lock().await;
            match left.as_mut() {
                Some(n) if *n > 1 => *n -= 1,
                _ => return Ok(false),
            }
        }

        let more = &self.config.load_more;
        if !self.browser.is_visible(more).await? {
            return Ok(false);
        }
        self.browser.scroll_into_view(more).await?;
        match self.browser.wait_enabled(more, Duration::from_secs(10)).await {
            Ok(()) => {}
            Err(Error::ElementMissing(_)) => return Ok(false),
            Err(e) => return Err(e),
        }
        self.browser.click(more).await?;
        self.browser
            .wait_visible(&self.config.results_container, Duration::from_secs(20))
            .await?;
        Ok(true)
    }
}
