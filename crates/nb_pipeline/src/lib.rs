pub mod date_window;
pub mod extract;
pub mod pagination;
pub mod site;
pub mod snippet;
pub mod text;

pub use date_window::DateWindow;
pub use extract::extract_page;
pub use pagination::{NewsListing, PaginationController};
pub use site::{NewsSearch, PaginationStrategy, SiteConfig};

pub mod prelude {
    pub use super::date_window::DateWindow;
    pub use super::pagination::{NewsListing, PaginationController};
    pub use nb_core::{ArticleRecord, Error, PageResult, RawSnippet, Result};
}
