use std::sync::Arc;

use crate::artists::ArtistNameSplitter;
use crate::config::AppConfig;
use crate::decode::{LoftyDurationDecoder, LoftyTagDecoder};
use crate::model::{Catalog, ExtractedMetadata, FileDescriptor};
use crate::sources::{DurationSource, MetadataSource, SourceKind, TagMetadataSource};

/// Runs every applicable source over one file and folds their results
/// together, later sources overriding earlier scalars.
pub struct MetadataAggregator {
    sources: Vec<MetadataSource>,
}

impl MetadataAggregator {
    pub fn new(sources: Vec<MetadataSource>) -> Self {
        Self { sources }
    }

    /// Lofty-backed sources in the order the config lists them.
    pub fn from_config(config: &AppConfig) -> Self {
        let sources = config
            .sources
            .iter()
            .map(|kind| match kind {
                SourceKind::Tags => MetadataSource::Tags(
                    TagMetadataSource::new(
                        Arc::new(LoftyTagDecoder),
                        ArtistNameSplitter::new(&config.known_artists),
                    )
                    .with_genre_threshold(config.genre_similarity_threshold)
                    .with_type_match(config.type_match)
                    .with_spaced_hyphen(config.prefer_spaced_hyphen),
                ),
                SourceKind::Duration => {
                    MetadataSource::Duration(DurationSource::new(Arc::new(LoftyDurationDecoder)))
                }
            })
            .collect();
        Self::new(sources)
    }

    pub fn sources(&self) -> &[MetadataSource] {
        &self.sources
    }

    /// Sources run one after another in registration order. Each one is
    /// infallible, so a failing decoder only costs that source's fields.
    pub async fn analyse(
        &self,
        file: &FileDescriptor,
        buffer: &[u8],
        catalog: &Catalog,
    ) -> ExtractedMetadata {
        let mut merged = ExtractedMetadata::default();
        for source in &self.sources {
            if !source.is_applicable_for_file(file) {
                log::debug!(
                    "Skipping {} source for {}",
                    source.name(),
                    file.original_filename
                );
                continue;
            }
            let partial = source.analyse(file, buffer, catalog).await;
            log::trace!("{} source result: {:?}", source.name(), partial);
            merged.merge(partial);
        }
        merged
    }
}
