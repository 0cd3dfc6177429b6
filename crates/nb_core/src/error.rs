use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no results found: {0}")]
    NoResultsFound(String),

    #[error("element missing: {0}")]
    ElementMissing(String),

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("export error: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("external error: {0}")]
    External(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
