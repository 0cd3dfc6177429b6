use async_trait::async_trait;
use nb_core::{ArticleRecord, ExportSink, Result};
use tokio::sync::RwLock;

/// Keeps exported pages in memory. Used by tests to assert what the
/// pipeline decided to persist without touching the filesystem.
#[derive(Default)]
pub struct MemorySink {
    pages: RwLock<Vec<(u32, Vec<ArticleRecord>)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn pages(&self) -> Vec<(u32, Vec<ArticleRecord>)> {
        self.pages.read().await.clone()
    }
}

#[async_trait]
impl ExportSink for MemorySink {
    async fn write_page(&self, page_index: u32, records: &[ArticleRecord]) -> Result<()> {
        self.pages
            .write()
            .await
            .push((page_index, records.to_vec()));
        Ok(())
    }
}
