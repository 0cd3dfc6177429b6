use std::path::Path;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams,
};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures_util::StreamExt;
use nb_core::{BrowserDriver, Error, Result};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

fn cdp_err(e: chromiumoxide::error::CdpError) -> Error {
    Error::Browser(e.to_string())
}

/// Quote a locator for safe embedding inside an evaluated script.
fn js_quote(locator: &str) -> String {
    serde_json::to_string(locator).unwrap_or_else(|_| "\"\"".to_string())
}

/// Chrome DevTools Protocol session implementing the browser capability
/// surface over a single page. Locators are CSS selectors.
pub struct CdpDriver {
    browser: Mutex<Browser>,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl CdpDriver {
    /// Launches a Chrome instance and opens a blank page.
    pub async fn launch(headless: bool) -> Result<Self> {
        let mut config = BrowserConfig::builder()
            .window_size(1280, 1024)
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-blink-features=AutomationControlled");
        if !headless {
            config = config.with_head();
        }
        let config = config.build().map_err(Error::Browser)?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(cdp_err)?;
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });
        let page = browser.new_page("about:blank").await.map_err(cdp_err)?;

        Ok(Self {
            browser: Mutex::new(browser),
            page,
            handler_task,
        })
    }

    /// Shuts the browser down. Safe to call once the run is over, success
    /// or failure.
    pub async fn close(&self) -> Result<()> {
        self.browser.lock().await.close().await.map_err(cdp_err)?;
        self.handler_task.abort();
        Ok(())
    }

    async fn find(&self, locator: &str) -> Result<Element> {
        self.page
            .find_element(locator)
            .await
            .map_err(|_| Error::ElementMissing(locator.to_string()))
    }

    async fn eval<T: serde::de::DeserializeOwned>(&self, script: String) -> Result<T> {
        self.page
            .evaluate(script)
            .await
            .map_err(cdp_err)?
            .into_value()
            .map_err(|e| Error::Browser(e.to_string()))
    }
}

#[async_trait]
impl BrowserDriver for CdpDriver {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.page.goto(url).await.map_err(cdp_err)?;
        self.page.wait_for_navigation().await.map_err(cdp_err)?;
        debug!("navigated to {url}");
        Ok(())
    }

    async fn count_elements(&self, locator: &str) -> Result<usize> {
        let script = format!(
            "document.querySelectorAll({}).length",
            js_quote(locator)
        );
        self.eval(script).await
    }

    async fn get_text(&self, locator: &str) -> Result<String> {
        let text = self
            .find(locator)
            .await?
            .inner_text()
            .await
            .map_err(cdp_err)?;
        Ok(text.unwrap_or_default())
    }

    async fn get_attribute(&self, locator: &str, name: &str) -> Result<Option<String>> {
        self.find(locator)
            .await?
            .attribute(name)
            .await
            .map_err(cdp_err)
    }

    async fn outer_html(&self, locator: &str) -> Result<String> {
        let script = format!(
            "(() => {{ const el = document.querySelector({}); return el ? el.outerHTML : null; }})()",
            js_quote(locator)
        );
        let html: Option<String> = self.eval(script).await?;
        html.ok_or_else(|| Error::ElementMissing(locator.to_string()))
    }

    async fn click(&self, locator: &str) -> Result<()> {
        let element = self.find(locator).await?;
        element.scroll_into_view().await.map_err(cdp_err)?;
        element.click().await.map_err(cdp_err)?;
        Ok(())
    }

    async fn type_text(&self, locator: &str, text: &str) -> Result<()> {
        let element = self.find(locator).await?;
        element.click().await.map_err(cdp_err)?;
        element.type_str(text).await.map_err(cdp_err)?;
        Ok(())
    }

    async fn scroll_into_view(&self, locator: &str) -> Result<()> {
        self.find(locator)
            .await?
            .scroll_into_view()
            .await
            .map_err(cdp_err)?;
        Ok(())
    }

    async fn scroll_into_view_nth(&self, locator: &str, index: usize) -> Result<()> {
        let script = format!(
            "(() => {{ const el = document.querySelectorAll({})[{index}]; if (el) el.scrollIntoView(); return !!el; }})()",
            js_quote(locator)
        );
        let found: bool = self.eval(script).await?;
        if found {
            Ok(())
        } else {
            Err(Error::ElementMissing(format!("{locator} [{index}]")))
        }
    }

    async fn wait_visible(&self, locator: &str, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.is_visible(locator).await? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(Error::ElementMissing(format!(
                    "{locator} not visible within {timeout:?}"
                )));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn wait_enabled(&self, locator: &str, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.is_enabled(locator).await? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(Error::ElementMissing(format!(
                    "{locator} not enabled within {timeout:?}"
                )));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn is_visible(&self, locator: &str) -> Result<bool> {
        let script = format!(
            "(() => {{ const el = document.querySelector({}); return !!el && el.offsetParent !== null; }})()",
            js_quote(locator)
        );
        self.eval(script).await
    }

    async fn is_enabled(&self, locator: &str) -> Result<bool> {
        let script = format!(
            "(() => {{ const el = document.querySelector({}); return !!el && !el.disabled; }})()",
            js_quote(locator)
        );
        self.eval(script).await
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let bytes = self.page.screenshot(params).await.map_err(cdp_err)?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }
}
