//! Unified error types for the shelf-core crate.
//!
//! Every remote failure is surfaced as an `Err` value to the caller, which
//! renders it as a transient notice. No error here is fatal: each one leaves
//! the engine in its prior consistent state (old listing, old path).

use thiserror::Error;

/// Errors from virtual path manipulation.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PathError {
    /// The segment is empty or contains a path separator.
    #[error("Invalid path segment: {0:?}")]
    InvalidSegment(String),
}

/// Errors from remote storage operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The backend answered with a non-2xx status.
    ///
    /// `detail` carries the response body for operations where the backend
    /// reports a reason (folder creation), otherwise the status text.
    #[error("Backend returned {status}: {detail}")]
    Http { status: u16, detail: String },

    /// The request never produced a response (connection, DNS, timeout).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered 2xx but the body was not in the expected shape.
    #[error("Unexpected response body: {0}")]
    BadBody(String),

    /// A request URL could not be built from the backend base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Reading a local upload source failed.
    #[error("Upload source error: {0}")]
    Source(#[from] std::io::Error),
}

/// Errors from opening a streaming media preview.
#[derive(Error, Debug)]
pub enum MediaError {
    /// The media source could not be opened or prepared for playback.
    #[error("Media initialization failed: {0}")]
    InitFailed(String),
}

/// Top-level error for navigation operations that touch both the path stack
/// and the remote client.
#[derive(Error, Debug)]
pub enum BrowseError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Client(#[from] ClientError),
}
