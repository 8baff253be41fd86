//! Configuration module
//!
//! Process-level settings read from the environment (and an optional `.env`
//! file). The repository settings edited by the user live in
//! [`RepoConfig`](crate::RepoConfig) and are persisted in the key/value store
//! instead.

use std::env;
use std::path::PathBuf;

use crate::constants::GITHUB_API_URL;

const STORE_PATH: &str = "bumble-lite.json";
const HTTP_TIMEOUT_SECS: u64 = 60;
const UPLOAD_PRECHECK_BYTES: usize = 1024 * 1024;
const UPLOAD_MAX_BYTES: usize = 900 * 1024;
const UPLOAD_MAX_DIMENSION: u32 = 1920;
const UPLOAD_QUALITY: f32 = 0.8;
const UPLOAD_QUALITY_STEP: f32 = 0.1;
const UPLOAD_MIN_QUALITY: f32 = 0.1;

/// Image intake settings for remote uploads.
#[derive(Clone, Debug, PartialEq)]
pub struct CompressionConfig {
    /// Files larger than this are run through the preparation pipeline.
    pub precheck_bytes: usize,
    /// Byte budget the pipeline tries to reach.
    pub max_size_bytes: usize,
    pub max_dimension: u32,
    pub initial_quality: f32,
    pub quality_step: f32,
    pub min_quality: f32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        CompressionConfig {
            precheck_bytes: UPLOAD_PRECHECK_BYTES,
            max_size_bytes: UPLOAD_MAX_BYTES,
            max_dimension: UPLOAD_MAX_DIMENSION,
            initial_quality: UPLOAD_QUALITY,
            quality_step: UPLOAD_QUALITY_STEP,
            min_quality: UPLOAD_MIN_QUALITY,
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// File backing the local key/value store.
    pub store_path: PathBuf,
    pub github_api_url: String,
    /// GitHub Pages URL the owner/repo defaults are inferred from.
    pub pages_url: Option<String>,
    pub http_timeout_secs: u64,
    pub compression: CompressionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            store_path: PathBuf::from(STORE_PATH),
            github_api_url: GITHUB_API_URL.to_string(),
            pages_url: None,
            http_timeout_secs: HTTP_TIMEOUT_SECS,
            compression: CompressionConfig::default(),
        }
    }
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let compression = CompressionConfig {
            precheck_bytes: parse_or("BUMBLE_UPLOAD_PRECHECK_BYTES", UPLOAD_PRECHECK_BYTES),
            max_size_bytes: parse_or("BUMBLE_UPLOAD_MAX_BYTES", UPLOAD_MAX_BYTES),
            max_dimension: parse_or("BUMBLE_UPLOAD_MAX_DIMENSION", UPLOAD_MAX_DIMENSION),
            initial_quality: parse_or("BUMBLE_UPLOAD_QUALITY", UPLOAD_QUALITY),
            quality_step: UPLOAD_QUALITY_STEP,
            min_quality: UPLOAD_MIN_QUALITY,
        };

        let config = AppConfig {
            store_path: env::var("BUMBLE_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(STORE_PATH)),
            github_api_url: env::var("BUMBLE_GITHUB_API_URL")
                .ok()
                .filter(|url| !url.trim().is_empty())
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|| GITHUB_API_URL.to_string()),
            pages_url: env::var("BUMBLE_PAGES_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            http_timeout_secs: parse_or("BUMBLE_HTTP_TIMEOUT_SECS", HTTP_TIMEOUT_SECS),
            compression,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let c = &self.compression;
        if c.max_size_bytes == 0 {
            return Err(anyhow::anyhow!("BUMBLE_UPLOAD_MAX_BYTES must be greater than 0"));
        }
        if c.max_dimension == 0 {
            return Err(anyhow::anyhow!(
                "BUMBLE_UPLOAD_MAX_DIMENSION must be greater than 0"
            ));
        }
        if !(c.initial_quality > 0.0 && c.initial_quality <= 1.0) {
            return Err(anyhow::anyhow!(
                "BUMBLE_UPLOAD_QUALITY must be in (0, 1], got {}",
                c.initial_quality
            ));
        }
        if self.http_timeout_secs == 0 {
            return Err(anyhow::anyhow!("BUMBLE_HTTP_TIMEOUT_SECS must be greater than 0"));
        }
        Ok(())
    }
}
