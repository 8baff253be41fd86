use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bumble_core::{Account, ImageItem};
use bumble_processing::{
    is_image_filename, prepare_in_background, rename_for_output, CompressionSettings,
};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::backend::{BackendKind, RemoteTarget};
use crate::keys::{account_dir, upload_name, upload_path};
use crate::traits::{ImageStore, SavedImage, StorageError, StorageResult, UploadFile};

const ACCEPT: &str = "application/vnd.github+json";

/// One entry of a contents-API directory listing.
#[derive(Debug, Deserialize)]
struct ContentEntry {
    name: String,
    #[serde(default)]
    download_url: Option<String>,
}

/// A directory yields an array; a file path yields a single object, which
/// lists as nothing.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    Directory(Vec<ContentEntry>),
    Other(serde::de::IgnoredAny),
}

#[derive(Debug, Serialize)]
struct CreateFileRequest<'a> {
    message: String,
    content: String,
    branch: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateFileResponse {
    content: Option<ContentEntry>,
}

/// Images stored as files in a GitHub repository, through the REST contents API.
#[derive(Clone)]
pub struct GitHubImageStore {
    client: Client,
    api_url: String,
    target: RemoteTarget,
    compression: CompressionSettings,
    precheck_bytes: usize,
}

impl GitHubImageStore {
    /// # Arguments
    /// * `api_url` - API root, e.g. "https://api.github.com"
    /// * `precheck_bytes` - files above this size are prepared before upload
    pub fn new(
        client: Client,
        api_url: impl Into<String>,
        target: RemoteTarget,
        compression: CompressionSettings,
        precheck_bytes: usize,
    ) -> Self {
        GitHubImageStore {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            target,
            compression,
            precheck_bytes,
        }
    }

    pub fn target(&self) -> &RemoteTarget {
        &self.target
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_url,
            self.target.owner,
            self.target.repo,
            urlencoding::encode(path)
        )
    }

    /// Bytes and name to upload, after the size pre-check.
    async fn payload(&self, file: &UploadFile) -> StorageResult<(bytes::Bytes, String)> {
        if file.len() <= self.precheck_bytes {
            return Ok((file.data.clone(), file.name.clone()));
        }
        tracing::debug!(
            file = %file.name,
            size_bytes = file.len(),
            precheck_bytes = self.precheck_bytes,
            "Preparing oversized image before upload"
        );
        let prepared = prepare_in_background(file.data.clone(), self.compression).await?;
        let name = rename_for_output(&file.name, &prepared);
        Ok((prepared.data, name))
    }
}

#[async_trait]
impl ImageStore for GitHubImageStore {
    async fn list(&self, account: Account) -> StorageResult<Vec<ImageItem>> {
        let path = account_dir(account);
        let url = self.contents_url(&path);
        let start = std::time::Instant::now();

        // Listing is always anonymous, even when a token is configured.
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, ACCEPT)
            .query(&[("r", chrono::Utc::now().timestamp_millis().to_string())])
            .send()
            .await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            tracing::debug!(account = %account, path = %path, "Remote image folder not found yet");
            return Ok(Vec::new());
        }
        if !status.is_success() {
            tracing::warn!(
                account = %account,
                path = %path,
                status = status.as_u16(),
                "GitHub list error"
            );
            return Err(StorageError::RemoteList {
                status: status.as_u16(),
            });
        }

        let items: Vec<ImageItem> = match response.json::<ContentsResponse>().await? {
            ContentsResponse::Directory(entries) => entries
                .into_iter()
                .filter(|entry| is_image_filename(&entry.name))
                .filter_map(|entry| entry.download_url)
                .map(|url| ImageItem::Remote { url })
                .collect(),
            ContentsResponse::Other(_) => Vec::new(),
        };

        tracing::info!(
            account = %account,
            owner = %self.target.owner,
            repo = %self.target.repo,
            count = items.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "GitHub list successful"
        );
        Ok(items)
    }

    async fn save(&self, account: Account, file: &UploadFile) -> StorageResult<SavedImage> {
        let token = self.target.token.as_deref().ok_or_else(|| {
            StorageError::ConfigError("GitHub token not configured".to_string())
        })?;
        let start = std::time::Instant::now();

        let (data, name) = self.payload(file).await?;
        let safe_name = upload_name(chrono::Utc::now().timestamp_millis(), &name);
        let path = upload_path(account, &safe_name);

        let body = CreateFileRequest {
            message: format!("chore: add {} image {}", account, safe_name),
            content: STANDARD.encode(&data),
            branch: &self.target.branch,
        };

        let response = self
            .client
            .put(self.contents_url(&path))
            .header(reqwest::header::ACCEPT, ACCEPT)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!(
                account = %account,
                path = %path,
                status = status.as_u16(),
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "GitHub upload failed"
            );
            return Err(StorageError::RemoteSave {
                status: status.as_u16(),
                body,
            });
        }

        let reference = response
            .json::<CreateFileResponse>()
            .await
            .ok()
            .and_then(|created| created.content)
            .and_then(|entry| entry.download_url);

        tracing::info!(
            account = %account,
            path = %path,
            branch = %self.target.branch,
            size_bytes = data.len(),
            original_bytes = file.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "GitHub upload successful"
        );

        Ok(SavedImage {
            key: path,
            reference,
        })
    }

    fn backend_kind(&self) -> BackendKind {
        BackendKind::Remote
    }
}
