//! Virtual path stack for the browsing session.
//!
//! The current directory inside the managed storage tree is modeled as an
//! ordered stack of path segments. The root is the empty stack; joining the
//! segments with `/` yields the canonical virtual path sent to the backend.

use crate::errors::PathError;

/// Separator used between virtual path segments.
pub const SEPARATOR: char = '/';

/// Join a parent virtual path with an entry name.
///
/// At the root (`parent` empty) the joined path is just the name; otherwise
/// the two are joined with `/`. This is the path convention for every remote
/// operation that targets an entry inside the current directory.
pub fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}{SEPARATOR}{name}")
    }
}

/// Stack of path segments describing the current virtual directory.
///
/// Invariant: every segment is non-empty and contains no separator. A failed
/// [`push`](VirtualPath::push) leaves the stack unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VirtualPath {
    segments: Vec<String>,
}

impl VirtualPath {
    /// Create an empty path (the storage root).
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the path is at the storage root.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments below the root.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Append a segment (enter a folder).
    pub fn push(&mut self, segment: &str) -> Result<(), PathError> {
        if segment.is_empty() || segment.contains(SEPARATOR) {
            return Err(PathError::InvalidSegment(segment.to_string()));
        }
        self.segments.push(segment.to_string());
        Ok(())
    }

    /// Remove the last segment (go up one level).
    ///
    /// Returns `None` when already at the root; callers that need to
    /// distinguish "already at root" check the return value.
    pub fn pop(&mut self) -> Option<String> {
        self.segments.pop()
    }

    /// The canonical virtual path: segments joined with `/`, `""` at root.
    pub fn as_path(&self) -> String {
        self.segments.join("/")
    }

    /// Join the current path with an entry name (see [`join`]).
    pub fn join_name(&self, name: &str) -> String {
        join(&self.as_path(), name)
    }
}
