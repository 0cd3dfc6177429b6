pub mod archive;
pub mod memory;
pub mod xlsx;

pub use archive::archive_images;
pub use memory::MemorySink;
pub use xlsx::XlsxSink;
