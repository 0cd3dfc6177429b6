pub mod browser;
pub mod error;
pub mod export;
pub mod fetch;
pub mod types;
pub mod workitem;

pub use browser::BrowserDriver;
pub use error::Error;
pub use export::ExportSink;
pub use fetch::FileFetcher;
pub use types::{ArticleRecord, PageResult, RawSnippet};
pub use workitem::WorkItem;

pub type Result<T> = std::result::Result<T, Error>;
