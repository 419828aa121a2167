pub mod duration;
pub mod tags;

use serde::Deserialize;

use crate::model::{Catalog, ExtractedMetadata, FileDescriptor};

pub use duration::DurationSource;
pub use tags::{TagMetadataSource, TypeMatchPolicy};

/// Which metadata source to run, as named in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Tags,
    Duration,
}

/// The closed set of metadata sources the aggregator can run.
pub enum MetadataSource {
    Tags(TagMetadataSource),
    Duration(DurationSource),
}

impl MetadataSource {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tags(_) => "tags",
            Self::Duration(_) => "duration",
        }
    }

    pub fn is_applicable_for_file(&self, file: &FileDescriptor) -> bool {
        match self {
            Self::Tags(source) => source.is_applicable_for_file(file),
            Self::Duration(source) => source.is_applicable_for_file(file),
        }
    }

    /// Run the source. Never fails: problems are logged and yield a partial result.
    pub async fn analyse(
        &self,
        file: &FileDescriptor,
        buffer: &[u8],
        catalog: &Catalog,
    ) -> ExtractedMetadata {
        match self {
            Self::Tags(source) => source.analyse(file, buffer, catalog).await,
            Self::Duration(source) => source.analyse(file, buffer).await,
        }
    }
}

impl From<TagMetadataSource> for MetadataSource {
    fn from(source: TagMetadataSource) -> Self {
        Self::Tags(source)
    }
}

impl From<DurationSource> for MetadataSource {
    fn from(source: DurationSource) -> Self {
        Self::Duration(source)
    }
}
