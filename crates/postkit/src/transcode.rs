//! Video transcoding collaborator
//!
//! Booru posts can carry webm videos that messaging clients will not play
//! inline. When conversion is enabled the resolver hands the webm to a
//! [`Transcoder`] and attaches the resulting file instead. Conversion is
//! best effort: any failure falls back to the original locator.

use crate::error::ResolveError;
use crate::types::{MediaItem, MediaKind, Site};
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

/// Converts a remote video into a playable local file
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Convert `source_url`, keyed by the post it belongs to
    async fn convert(&self, source_url: &str, site: Site, id: &str)
        -> Result<PathBuf, ResolveError>;
}

/// Process-wide choice of what to do with webm attachments
#[derive(Clone, Default)]
pub struct VideoPolicy {
    transcoder: Option<Arc<dyn Transcoder>>,
}

impl fmt::Debug for VideoPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoPolicy")
            .field("converts", &self.converts())
            .finish()
    }
}

impl VideoPolicy {
    /// Always expose the original webm locator
    pub fn passthrough() -> Self {
        Self { transcoder: None }
    }

    /// Convert webm videos through `transcoder`
    pub fn convert_with(transcoder: Arc<dyn Transcoder>) -> Self {
        Self {
            transcoder: Some(transcoder),
        }
    }

    /// True when conversion is attempted
    pub fn converts(&self) -> bool {
        self.transcoder.is_some()
    }

    /// Attachment for a webm video at `locator`
    ///
    /// Yields a `video_file` when conversion succeeds and a `video`
    /// pointing at the original otherwise.
    pub async fn webm_attachment(&self, locator: &str, site: Site, id: &str) -> MediaItem {
        let Some(transcoder) = &self.transcoder else {
            return MediaItem::new(locator, MediaKind::Video);
        };

        match transcoder.convert(locator, site, id).await {
            Ok(path) => MediaItem::new(path.display().to_string(), MediaKind::VideoFile),
            Err(e) => {
                warn!(%site, id, error = %e, "Couldn't convert webm, using original video");
                MediaItem::new(locator, MediaKind::Video)
            }
        }
    }
}
