use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::Result;

/// Capability surface of the live browser session. Every call is a blocking
/// black box from the pipeline's point of view: it either succeeds or fails
/// before extraction continues. Elements that cannot be located surface as
/// `Error::ElementMissing` so callers can tell "gone" apart from "broken".
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Navigate the session to the given URL and wait for the load to settle
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Number of elements currently matching the locator
    async fn count_elements(&self, locator: &str) -> Result<usize>;

    /// Visible text of the first element matching the locator
    async fn get_text(&self, locator: &str) -> Result<String>;

    /// Attribute value of the first element matching the locator
    async fn get_attribute(&self, locator: &str, name: &str) -> Result<Option<String>>;

    /// Outer HTML of the first element matching the locator
    async fn outer_html(&self, locator: &str) -> Result<String>;

    /// Click the first element matching the locator
    async fn click(&self, locator: &str) -> Result<()>;

    /// Type text into the first element matching the locator
    async fn type_text(&self, locator: &str, text: &str) -> Result<()>;

    async fn scroll_into_view(&self, locator: &str) -> Result<()>;

    /// Scroll the element at `index` (0-based) among all elements matching
    /// the locator into view. `ElementMissing` when fewer elements match.
    async fn scroll_into_view_nth(&self, locator: &str, index: usize) -> Result<()>;

    /// Block until the element is visible, or fail with `ElementMissing`
    /// once the timeout elapses
    async fn wait_visible(&self, locator: &str, timeout: Duration) -> Result<()>;

    /// Block until the element is enabled, or fail with `ElementMissing`
    /// once the timeout elapses
    async fn wait_enabled(&self, locator: &str, timeout: Duration) -> Result<()>;

    /// False, not an error, when the element is absent
    async fn is_visible(&self, locator: &str) -> Result<bool>;

    /// False, not an error, when the element is absent
    async fn is_enabled(&self, locator: &str) -> Result<bool>;

    /// Capture a PNG screenshot of the current page
    async fn screenshot(&self, path: &Path) -> Result<()>;
}
