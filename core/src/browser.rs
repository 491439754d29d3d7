//! Navigation controller for one browsing session.
//!
//! A [`Browser`] owns the virtual path stack and the current listing
//! snapshot. It is an explicit session object: create one per view, there is
//! no ambient/global instance. All mutation goes through its methods, and
//! every remote mutation (create, upload, delete) is followed by a fresh,
//! fully-authoritative refetch of the current directory rather than an
//! incremental patch.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::client::{FileEntry, StorageApi, UploadSource};
use crate::errors::{BrowseError, ClientError};
use crate::path::VirtualPath;

/// Whether a listing fetch is in flight.
///
/// At most one fetch is outstanding from the session's own perspective, but
/// overlapping fetches started by rapid navigation are not guarded against:
/// the last response to arrive wins, even if it belongs to a stale path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserStatus {
    Idle,
    Loading,
}

/// Navigation state for one browsing session against one backend.
pub struct Browser {
    api: Arc<dyn StorageApi>,
    path: VirtualPath,
    entries: Vec<FileEntry>,
    status: BrowserStatus,
}

impl Browser {
    /// Create a session at the root with an empty listing.
    ///
    /// Call [`initialize`](Browser::initialize) to load the root listing.
    pub fn new(api: Arc<dyn StorageApi>) -> Self {
        Self {
            api,
            path: VirtualPath::new(),
            entries: Vec::new(),
            status: BrowserStatus::Idle,
        }
    }

    /// The current virtual path (`""` at the root).
    pub fn current_path(&self) -> String {
        self.path.as_path()
    }

    /// Whether the session is at the storage root.
    pub fn is_at_root(&self) -> bool {
        self.path.is_root()
    }

    /// The current listing snapshot.
    ///
    /// After a failed fetch this still holds the previous (now stale)
    /// listing, which belongs to the old path until a fetch succeeds.
    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn status(&self) -> BrowserStatus {
        self.status
    }

    /// Reset to the root and fetch its listing.
    pub async fn initialize(&mut self) -> Result<(), ClientError> {
        self.path = VirtualPath::new();
        self.fetch().await
    }

    /// Enter a folder of the current listing and fetch its contents.
    ///
    /// Navigation commits before the fetch: on fetch failure the pushed
    /// segment remains and the stale listing is kept, so callers recover
    /// with [`go_up`](Browser::go_up) or [`refresh`](Browser::refresh).
    pub async fn enter_folder(&mut self, name: &str) -> Result<(), BrowseError> {
        self.path.push(name)?;
        self.fetch().await?;
        Ok(())
    }

    /// Go up one level and fetch. No-op (no fetch, no error) at the root.
    pub async fn go_up(&mut self) -> Result<(), ClientError> {
        if self.path.pop().is_none() {
            return Ok(());
        }
        self.fetch().await
    }

    /// Refetch the current directory without touching the path.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        self.fetch().await
    }

    /// Create a folder inside the current directory, then refetch.
    pub async fn create_folder(&mut self, name: &str) -> Result<(), ClientError> {
        let target = self.path.join_name(name);
        self.api.create_folder(&target).await?;
        self.refresh().await
    }

    /// Delete an entry of the current directory, then refetch.
    pub async fn delete_entry(&mut self, name: &str) -> Result<(), ClientError> {
        let target = self.path.join_name(name);
        self.api.delete(&target).await?;
        self.refresh().await
    }

    /// Upload a file into the current directory, then refetch.
    pub async fn upload(&mut self, source: UploadSource) -> Result<(), ClientError> {
        self.api.upload(&self.current_path(), source).await?;
        self.refresh().await
    }

    /// Fetch the listing for the current path.
    ///
    /// On success the listing is replaced wholesale; no entry identity
    /// persists across fetches. On failure the previous listing is kept
    /// untouched and the error is returned for a transient notice.
    async fn fetch(&mut self) -> Result<(), ClientError> {
        let path = self.current_path();
        self.status = BrowserStatus::Loading;
        debug!(%path, "fetching listing");
        let result = self.api.list(&path).await;
        self.status = BrowserStatus::Idle;
        match result {
            Ok(entries) => {
                self.entries = entries;
                Ok(())
            }
            Err(e) => {
                warn!(%path, error = %e, "listing fetch failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::errors::PathError;
    use url::Url;

    /// In-memory backend recording every call it receives.
    #[derive(Default)]
    struct FakeApi {
        listings: Mutex<HashMap<String, Vec<FileEntry>>>,
        fail_list_with: Mutex<Option<u16>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeApi {
        fn with_listing(path: &str, entries: Vec<FileEntry>) -> Arc<Self> {
            let api = Self::default();
            api.listings
                .lock()
                .unwrap()
                .insert(path.to_string(), entries);
            Arc::new(api)
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    fn entry(name: &str, is_dir: bool) -> FileEntry {
        FileEntry {
            name: name.to_string(),
            is_dir,
        }
    }

    #[async_trait::async_trait]
    impl StorageApi for FakeApi {
        async fn list(&self, path: &str) -> Result<Vec<FileEntry>, ClientError> {
            self.record(format!("list {path}"));
            if let Some(status) = *self.fail_list_with.lock().unwrap() {
                return Err(ClientError::Http {
                    status,
                    detail: "fetch failed".into(),
                });
            }
            Ok(self
                .listings
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .unwrap_or_default())
        }

        async fn create_folder(&self, path: &str) -> Result<(), ClientError> {
            self.record(format!("create_folder {path}"));
            Ok(())
        }

        async fn upload(&self, path: &str, source: UploadSource) -> Result<(), ClientError> {
            self.record(format!("upload {path} {}", source.file_name()));
            Ok(())
        }

        async fn fetch_text(&self, path: &str) -> Result<String, ClientError> {
            self.record(format!("fetch_text {path}"));
            Ok(String::new())
        }

        async fn delete(&self, path: &str) -> Result<(), ClientError> {
            self.record(format!("delete {path}"));
            Ok(())
        }

        fn download_url(&self, path: &str) -> Result<Url, ClientError> {
            Ok(Url::parse(&format!("http://fake/download?path={path}")).unwrap())
        }
    }

    #[tokio::test]
    async fn initialize_loads_the_root_listing() {
        let api = FakeApi::with_listing("", vec![entry("docs", true), entry("a.txt", false)]);
        let mut browser = Browser::new(api.clone());

        browser.initialize().await.unwrap();
        assert_eq!(browser.status(), BrowserStatus::Idle);
        assert_eq!(browser.current_path(), "");
        assert_eq!(
            browser.entries(),
            &[entry("docs", true), entry("a.txt", false)]
        );
        assert_eq!(api.calls(), vec!["list "]);
    }

    #[tokio::test]
    async fn enter_folder_replaces_the_listing() {
        let api = FakeApi::with_listing(
            "docs",
            vec![entry("report.txt", false), entry("img", true)],
        );
        let mut browser = Browser::new(api.clone());
        browser.initialize().await.unwrap();

        browser.enter_folder("docs").await.unwrap();
        assert_eq!(browser.current_path(), "docs");
        assert_eq!(browser.status(), BrowserStatus::Idle);
        assert_eq!(
            browser.entries(),
            &[entry("report.txt", false), entry("img", true)]
        );
    }

    #[tokio::test]
    async fn failed_enter_keeps_segment_and_stale_listing() {
        let api = FakeApi::with_listing("", vec![entry("docs", true)]);
        let mut browser = Browser::new(api.clone());
        browser.initialize().await.unwrap();

        *api.fail_list_with.lock().unwrap() = Some(404);
        let err = browser.enter_folder("docs").await.unwrap_err();
        assert!(matches!(
            err,
            BrowseError::Client(ClientError::Http { status: 404, .. })
        ));

        // Navigation already committed; the listing still belongs to the
        // old path until a fetch succeeds.
        assert_eq!(browser.current_path(), "docs");
        assert_eq!(browser.entries(), &[entry("docs", true)]);
        assert_eq!(browser.status(), BrowserStatus::Idle);
    }

    #[tokio::test]
    async fn enter_folder_rejects_invalid_segment_without_fetching() {
        let api = Arc::new(FakeApi::default());
        let mut browser = Browser::new(api.clone());

        let err = browser.enter_folder("a/b").await.unwrap_err();
        assert!(matches!(
            err,
            BrowseError::Path(PathError::InvalidSegment(_))
        ));
        assert_eq!(browser.current_path(), "");
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn enter_then_go_up_restores_the_path() {
        let api = Arc::new(FakeApi::default());
        let mut browser = Browser::new(api.clone());
        browser.initialize().await.unwrap();

        let before = browser.current_path();
        browser.enter_folder("a").await.unwrap();
        browser.go_up().await.unwrap();
        assert_eq!(browser.current_path(), before);
    }

    #[tokio::test]
    async fn go_up_at_root_issues_no_fetch() {
        let api = Arc::new(FakeApi::default());
        let mut browser = Browser::new(api.clone());

        browser.go_up().await.unwrap();
        assert_eq!(browser.current_path(), "");
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn delete_joins_the_path_and_refetches_once() {
        let api = Arc::new(FakeApi::default());
        let mut browser = Browser::new(api.clone());
        browser.initialize().await.unwrap();
        browser.enter_folder("docs").await.unwrap();

        browser.delete_entry("old.txt").await.unwrap();
        assert_eq!(
            api.calls(),
            vec!["list ", "list docs", "delete docs/old.txt", "list docs"]
        );
    }

    #[tokio::test]
    async fn create_folder_at_root_uses_bare_name() {
        let api = Arc::new(FakeApi::default());
        let mut browser = Browser::new(api.clone());

        browser.create_folder("newdir").await.unwrap();
        assert_eq!(api.calls(), vec!["create_folder newdir", "list "]);
    }

    #[tokio::test]
    async fn upload_targets_the_current_directory() {
        let api = Arc::new(FakeApi::default());
        let mut browser = Browser::new(api.clone());
        browser.enter_folder("snaps").await.unwrap();

        browser
            .upload(UploadSource::Bytes {
                file_name: "photo.png".into(),
                data: vec![0xFF],
            })
            .await
            .unwrap();
        assert_eq!(
            api.calls(),
            vec!["list snaps", "upload snaps photo.png", "list snaps"]
        );
    }
}
