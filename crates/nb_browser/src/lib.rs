pub mod cdp;
pub mod http;

pub use cdp::CdpDriver;
pub use http::HttpFetcher;
