use std::sync::Arc;

use crate::decode::DurationDecoder;
use crate::model::{ExtractedMetadata, FileDescriptor};

/// Reports the playing time, rounded up to whole seconds.
pub struct DurationSource {
    decoder: Arc<dyn DurationDecoder>,
}

impl DurationSource {
    pub fn new(decoder: Arc<dyn DurationDecoder>) -> Self {
        Self { decoder }
    }

    pub fn is_applicable_for_file(&self, file: &FileDescriptor) -> bool {
        file.is_mp3()
    }

    pub async fn analyse(&self, file: &FileDescriptor, buffer: &[u8]) -> ExtractedMetadata {
        match self.decoder.duration_secs(buffer).await {
            Ok(secs) if secs.is_finite() && secs > 0.0 => ExtractedMetadata {
                duration: Some(secs.ceil() as u64),
                ..Default::default()
            },
            Ok(secs) => {
                log::warn!(
                    "Unusable duration {} for {}",
                    secs,
                    file.original_filename
                );
                ExtractedMetadata::default()
            }
            Err(e) => {
                log::warn!(
                    "Could not read duration of {}: {}",
                    file.original_filename,
                    e
                );
                ExtractedMetadata::default()
            }
        }
    }
}
