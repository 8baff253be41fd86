//! Persistence gateway: one `list`/`save` surface over both backends.
//!
//! The repository config is re-read from the key/value store on every
//! operation and resolved into a [`Backend`], so a settings change applies to
//! the next call without any cached state.

use bumble_core::constants::REPO_CONFIG_KEY;
use bumble_core::{Account, AppConfig, CompressionConfig, ImageItem, RepoConfig};
use bumble_processing::CompressionSettings;
use reqwest::Client;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::backend::{Backend, BackendKind};
use crate::factory::{create_store, StoreContext};
use crate::kv::{write_json, KeyValueStore};
use crate::traits::{SavedImage, StorageError, StorageResult, UploadFile};

/// Outcome of a sequential upload batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTally {
    pub ok: usize,
    pub fail: usize,
    pub backend: BackendKind,
    /// Names of the files that failed, in batch order.
    pub failed_files: Vec<String>,
}

impl UploadTally {
    fn new(backend: BackendKind) -> Self {
        UploadTally {
            ok: 0,
            fail: 0,
            backend,
            failed_files: Vec::new(),
        }
    }

    fn record(&mut self, account: Account, name: &str, result: StorageResult<SavedImage>) {
        match result {
            Ok(saved) => {
                tracing::debug!(file = %name, key = %saved.key, "Saved upload");
                self.ok += 1;
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    account = %account,
                    file = %name,
                    backend = %self.backend,
                    "Upload failed"
                );
                self.fail += 1;
                self.failed_files.push(name.to_string());
            }
        }
    }

    fn finish(&self, account: Account) {
        tracing::info!(
            account = %account,
            backend = %self.backend,
            ok = self.ok,
            fail = self.fail,
            "Upload batch finished"
        );
    }
}

impl Display for UploadTally {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.backend {
            BackendKind::Remote => write!(f, "Uploaded {} file(s) to GitHub.", self.ok)?,
            BackendKind::Local => write!(
                f,
                "Saved {} locally (no GitHub token configured).",
                self.ok
            )?,
        }
        if self.fail > 0 {
            write!(f, " {} failed.", self.fail)?;
        }
        Ok(())
    }
}

pub struct PersistenceGateway {
    ctx: StoreContext,
    pages_url: Option<String>,
}

impl PersistenceGateway {
    /// Build a gateway with an HTTP client configured from `config`.
    pub fn new(kv: Arc<dyn KeyValueStore>, config: &AppConfig) -> StorageResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .user_agent(concat!("bumble-lite/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StorageError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(
            kv,
            client,
            &config.github_api_url,
            &config.compression,
            config.pages_url.clone(),
        ))
    }

    pub fn with_client(
        kv: Arc<dyn KeyValueStore>,
        client: Client,
        api_url: &str,
        compression: &CompressionConfig,
        pages_url: Option<String>,
    ) -> Self {
        PersistenceGateway {
            ctx: StoreContext {
                kv,
                client,
                api_url: api_url.trim_end_matches('/').to_string(),
                compression: CompressionSettings::from(compression),
                precheck_bytes: compression.precheck_bytes,
            },
            pages_url,
        }
    }

    pub fn kv(&self) -> &Arc<dyn KeyValueStore> {
        &self.ctx.kv
    }

    /// Current repository config; absent or unreadable records fall back to
    /// the inferred default.
    pub async fn repo_config(&self) -> StorageResult<RepoConfig> {
        let stored = self.ctx.kv.get(REPO_CONFIG_KEY).await?;
        Ok(RepoConfig::load(stored.as_deref(), self.pages_url.as_deref()))
    }

    pub async fn set_repo_config(&self, config: &RepoConfig) -> StorageResult<()> {
        write_json(self.ctx.kv.as_ref(), REPO_CONFIG_KEY, config).await?;
        tracing::info!(config = ?config.redacted(), "Repository settings saved");
        Ok(())
    }

    pub async fn list_backend(&self) -> StorageResult<Backend> {
        Ok(Backend::for_list(&self.repo_config().await?))
    }

    pub async fn save_backend(&self) -> StorageResult<Backend> {
        Ok(Backend::for_save(&self.repo_config().await?))
    }

    /// Items in `account`'s namespace from whichever backend is configured.
    pub async fn list(&self, account: Account) -> StorageResult<Vec<ImageItem>> {
        let backend = self.list_backend().await?;
        tracing::debug!(account = %account, backend = %backend.kind(), "Listing images");
        create_store(&backend, &self.ctx).list(account).await
    }

    pub async fn save(&self, account: Account, file: &UploadFile) -> StorageResult<SavedImage> {
        let backend = self.save_backend().await?;
        create_store(&backend, &self.ctx).save(account, file).await
    }

    /// Save `files` one at a time. A failed file is logged and counted; the
    /// rest of the batch still runs.
    pub async fn save_batch(
        &self,
        account: Account,
        files: &[UploadFile],
    ) -> StorageResult<UploadTally> {
        let backend = self.save_backend().await?;
        let store = create_store(&backend, &self.ctx);
        let mut tally = UploadTally::new(backend.kind());

        for file in files {
            let result = store.save(account, file).await;
            tally.record(account, &file.name, result);
        }

        tally.finish(account);
        Ok(tally)
    }

    /// Like [`save_batch`](Self::save_batch), reading each file from disk just
    /// before saving it. An unreadable file counts as a failure.
    pub async fn save_paths(
        &self,
        account: Account,
        paths: &[PathBuf],
    ) -> StorageResult<UploadTally> {
        let backend = self.save_backend().await?;
        let store = create_store(&backend, &self.ctx);
        let mut tally = UploadTally::new(backend.kind());

        for path in paths {
            let result = match UploadFile::from_path(path).await {
                Ok(file) => store.save(account, &file).await,
                Err(e) => Err(e),
            };
            tally.record(account, &path.display().to_string(), result);
        }

        tally.finish(account);
        Ok(tally)
    }
}
