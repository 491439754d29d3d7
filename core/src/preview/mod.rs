//! File preview classification and dispatch.
//!
//! Classification is a pure, total function of a file's lowercase extension.
//! Dispatch produces the data each rendering strategy needs: a URL for
//! images, an opened [`MediaSession`] for videos, the fetched body for text,
//! and a marker for everything else.

pub mod media;

use std::sync::Arc;

use url::Url;

use crate::client::StorageApi;
use crate::errors::ClientError;
use crate::path;
use media::{MediaBackend, MediaSession};

/// Rendering strategy for one file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    Image,
    Video,
    Text,
    Unsupported,
}

impl PreviewKind {
    /// Classify a file name by the substring after its last `.`, lowercased.
    ///
    /// Total: every name maps to exactly one kind, names without an
    /// extension to [`Unsupported`](PreviewKind::Unsupported).
    pub fn classify(file_name: &str) -> Self {
        let Some((_, ext)) = file_name.rsplit_once('.') else {
            return Self::Unsupported;
        };
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "webp" => Self::Image,
            "mp4" | "mov" | "avi" | "mkv" => Self::Video,
            "txt" | "md" | "json" | "xml" | "log" => Self::Text,
            _ => Self::Unsupported,
        }
    }
}

/// A preview ready for the rendering layer.
pub enum Preview {
    /// Render the image at `url` (cached fetch, placeholder while pending).
    Image { url: Url },
    /// An opened streaming playback session; the owner must close it.
    Video(MediaSession),
    /// The raw body, rendered as plain text without parsing or truncation.
    Text { body: String },
    /// No preview strategy; the caller emits a transient notification.
    Unsupported { file_name: String },
}

/// Dispatches a file of the current directory to its preview strategy.
pub struct PreviewDispatcher {
    api: Arc<dyn StorageApi>,
    media: Arc<dyn MediaBackend>,
}

impl PreviewDispatcher {
    pub fn new(api: Arc<dyn StorageApi>, media: Arc<dyn MediaBackend>) -> Self {
        Self { api, media }
    }

    /// Open a preview for `file_name` inside `parent_path`.
    ///
    /// Only the text strategy fetches here; media initialization runs
    /// asynchronously inside the returned session, and image fetching is
    /// the renderer's concern. A text fetch failure propagates as the
    /// caller's transient notice.
    pub async fn open(&self, parent_path: &str, file_name: &str) -> Result<Preview, ClientError> {
        let target = path::join(parent_path, file_name);
        match PreviewKind::classify(file_name) {
            PreviewKind::Image => Ok(Preview::Image {
                url: self.api.download_url(&target)?,
            }),
            PreviewKind::Video => {
                let url = self.api.download_url(&target)?;
                Ok(Preview::Video(MediaSession::open(
                    Arc::clone(&self.media),
                    url.to_string(),
                )))
            }
            PreviewKind::Text => Ok(Preview::Text {
                body: self.api.fetch_text(&target).await?,
            }),
            PreviewKind::Unsupported => Ok(Preview::Unsupported {
                file_name: file_name.to_string(),
            }),
        }
    }
}
