pub mod aggregator;
pub mod artists;
pub mod config;
pub mod decode;
pub mod genre;
pub mod model;
pub mod sources;
pub mod text;

pub use aggregator::MetadataAggregator;
pub use artists::ArtistNameSplitter;
pub use model::{Catalog, ExtractedMetadata, FileDescriptor};

/// Audio file extensions the metadata sources handle
pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp3"];

/// Application name for XDG paths
pub const APP_NAME: &str = "songmeta";
