//! Bumble Core Library
//!
//! This crate provides the domain models, configuration and shared constants
//! used by every bumble-lite component.

pub mod config;
pub mod constants;
pub mod models;
pub mod repo_config;

// Re-export commonly used types
pub use config::{AppConfig, CompressionConfig};
pub use models::{Account, ImageItem, LikeKind, ParseAccountError, Session};
pub use repo_config::RepoConfig;
