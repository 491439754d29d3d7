//! Remote directory client for the shelf storage backend.
//!
//! The backend is an HTTP service exposing `/list`, `/create_folder`,
//! `/upload`, `/download` and `/delete`. This module defines the typed
//! client seam ([`StorageApi`]) and the reqwest implementation
//! ([`http::HttpStorageClient`]). The client is stateless: every call takes
//! the joined virtual path and performs one round trip.

pub mod http;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::ClientError;

pub use http::HttpStorageClient;

/// Placeholder label for listing entries the backend returned without a name.
pub const UNNAMED_ENTRY: &str = "(unnamed)";

fn unnamed_entry() -> String {
    UNNAMED_ENTRY.to_string()
}

/// One entry of a directory listing.
///
/// The backend's JSON shape is dynamic: either field may be absent. Defaults
/// are applied here, at the deserialization boundary, so consumers never see
/// a partial entry — a missing `name` becomes [`UNNAMED_ENTRY`], a missing
/// `is_dir` means a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    #[serde(default = "unnamed_entry")]
    pub name: String,
    #[serde(default)]
    pub is_dir: bool,
}

/// Payload for an upload, polymorphic over where the bytes live.
///
/// Source devices either keep picked files in memory (`Bytes`) or expose a
/// local filesystem path (`LocalFile`). Exactly one multipart part named
/// `file` is sent either way.
#[derive(Debug, Clone)]
pub enum UploadSource {
    /// An in-memory buffer with an explicit file name.
    Bytes { file_name: String, data: Vec<u8> },
    /// A file on the local device, read at upload time.
    LocalFile { path: PathBuf },
}

impl UploadSource {
    /// The file name sent as the multipart part's `filename`.
    pub fn file_name(&self) -> String {
        match self {
            Self::Bytes { file_name, .. } => file_name.clone(),
            Self::LocalFile { path } => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "file".to_string()),
        }
    }
}

/// Typed client seam for the storage backend.
///
/// All paths are joined virtual paths (`""` for the root). Implementations
/// translate HTTP outcomes into [`ClientError`] values; nothing here retries
/// or queues. Uses `#[async_trait]` for dyn compatibility so the navigation
/// controller can be driven against a fake in tests.
#[async_trait::async_trait]
pub trait StorageApi: Send + Sync {
    /// List the entries of the given virtual directory.
    async fn list(&self, path: &str) -> Result<Vec<FileEntry>, ClientError>;

    /// Create a folder at the given joined virtual path.
    async fn create_folder(&self, path: &str) -> Result<(), ClientError>;

    /// Upload one file into the given virtual directory.
    async fn upload(&self, path: &str, source: UploadSource) -> Result<(), ClientError>;

    /// Fetch a file's body as text (text preview path).
    async fn fetch_text(&self, path: &str) -> Result<String, ClientError>;

    /// Delete the entry at the given joined virtual path.
    async fn delete(&self, path: &str) -> Result<(), ClientError>;

    /// Build the download URL for the given joined virtual path.
    ///
    /// Does not fetch anything; the URL is handed to an external launch
    /// mechanism (browser, media player).
    fn download_url(&self, path: &str) -> Result<Url, ClientError>;
}
