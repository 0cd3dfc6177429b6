use async_trait::async_trait;

use crate::types::ArticleRecord;
use crate::Result;

/// Persists one page's worth of records. Callers guarantee that pages arrive
/// in ascending page order and that a page yielding zero records is never
/// sent, so sinks never write empty artifacts.
#[async_trait]
pub trait ExportSink: Send + Sync {
    async fn write_page(&self, page_index: u32, records: &[ArticleRecord]) -> Result<()>;
}
