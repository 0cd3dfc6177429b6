use std::path::Path;

use async_trait::async_trait;

use crate::Result;

/// Downloads a single remote file to a local path. Failures propagate to the
/// caller; there is no retry policy at this layer.
#[async_trait]
pub trait FileFetcher: Send + Sync {
    async fn download(&self, url: &str, dest: &Path) -> Result<()>;
}
