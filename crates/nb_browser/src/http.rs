use std::path::Path;

use async_trait::async_trait;
use nb_core::{Error, FileFetcher, Result};
use tracing::debug;
use url::Url;

/// Downloads files over HTTP with a shared reqwest client.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileFetcher for HttpFetcher {
    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let url =
            Url::parse(url).map_err(|e| Error::Extraction(format!("bad image URL {url:?}: {e}")))?;
        let response = self.client.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        tokio::fs::write(dest, &bytes).await?;
        debug!("downloaded {} bytes to {}", bytes.len(), dest.display());
        Ok(())
    }
}
