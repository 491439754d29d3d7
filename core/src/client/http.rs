//! reqwest implementation of the storage backend client.

use reqwest::multipart;
use tracing::debug;
use url::Url;

use super::{FileEntry, StorageApi, UploadSource};
use crate::errors::ClientError;

/// HTTP client for the shelf storage backend.
///
/// Holds the backend base URL and a connection-pooling [`reqwest::Client`].
/// Stateless beyond the pool: every method takes the joined virtual path and
/// performs one round trip. Joined paths go into the query string as-is;
/// any percent-encoding of reserved characters is left to the URL layer and
/// undone by the backend.
pub struct HttpStorageClient {
    base: Url,
    http: reqwest::Client,
}

impl HttpStorageClient {
    /// Create a client for the backend at `base` (e.g. `http://127.0.0.1:3000`).
    pub fn new(mut base: Url) -> Self {
        // Url::join treats a path without a trailing slash as a file and
        // would drop its last segment.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self {
            base,
            http: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, name: &str) -> Result<Url, ClientError> {
        self.base
            .join(name)
            .map_err(|e| ClientError::InvalidUrl(format!("{}{}: {}", self.base, name, e)))
    }

    /// Endpoint with `path` as a query parameter, omitted at the root.
    fn endpoint_for(&self, name: &str, path: &str) -> Result<Url, ClientError> {
        let mut url = self.endpoint(name)?;
        if !path.is_empty() {
            url.set_query(Some(&format!("path={path}")));
        }
        Ok(url)
    }
}

#[async_trait::async_trait]
impl StorageApi for HttpStorageClient {
    async fn list(&self, path: &str) -> Result<Vec<FileEntry>, ClientError> {
        let url = self.endpoint_for("list", path)?;
        debug!(%url, "listing directory");
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Http {
                status: status.as_u16(),
                detail: status.to_string(),
            });
        }
        resp.json::<Vec<FileEntry>>()
            .await
            .map_err(|e| ClientError::BadBody(e.to_string()))
    }

    async fn create_folder(&self, path: &str) -> Result<(), ClientError> {
        let url = self.endpoint("create_folder")?;
        debug!(%url, path, "creating folder");
        let resp = self
            .http
            .post(url)
            .json(&serde_json::json!({ "path": path }))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            // The backend reports the reason (e.g. "already exists") in the body.
            let detail = resp.text().await.unwrap_or_else(|_| status.to_string());
            return Err(ClientError::Http {
                status: status.as_u16(),
                detail,
            });
        }
        Ok(())
    }

    async fn upload(&self, path: &str, source: UploadSource) -> Result<(), ClientError> {
        let url = self.endpoint_for("upload", path)?;
        let file_name = source.file_name();
        debug!(%url, %file_name, "uploading file");

        let data = match source {
            UploadSource::Bytes { data, .. } => data,
            UploadSource::LocalFile { path } => tokio::fs::read(&path).await?,
        };
        let form =
            multipart::Form::new().part("file", multipart::Part::bytes(data).file_name(file_name));

        let resp = self.http.post(url).multipart(form).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Http {
                status: status.as_u16(),
                detail: status.to_string(),
            });
        }
        Ok(())
    }

    async fn fetch_text(&self, path: &str) -> Result<String, ClientError> {
        let url = self.download_url(path)?;
        debug!(%url, "fetching text body");
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Http {
                status: status.as_u16(),
                detail: status.to_string(),
            });
        }
        Ok(resp.text().await?)
    }

    async fn delete(&self, path: &str) -> Result<(), ClientError> {
        let url = self.endpoint_for("delete", path)?;
        debug!(%url, "deleting entry");
        let resp = self.http.delete(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Http {
                status: status.as_u16(),
                detail: status.to_string(),
            });
        }
        Ok(())
    }

    fn download_url(&self, path: &str) -> Result<Url, ClientError> {
        // `path` is required here even at the root.
        let mut url = self.endpoint("download")?;
        url.set_query(Some(&format!("path={path}")));
        Ok(url)
    }
}
