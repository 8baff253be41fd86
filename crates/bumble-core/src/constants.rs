//! Storage keys and well-known values shared across crates.
//!
//! The key names match the layout written by earlier releases so existing
//! stores keep loading.

/// Key holding the persisted [`Session`](crate::Session).
pub const SESSION_KEY: &str = "bumbleLiteSession";

/// Key holding the persisted [`RepoConfig`](crate::RepoConfig).
pub const REPO_CONFIG_KEY: &str = "ghRepoCfg";

/// Default GitHub REST API root.
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Branch used when the configured one is blank.
pub const DEFAULT_BRANCH: &str = "main";

/// Top-level directory holding every account's uploads in the remote repository.
pub const IMAGES_DIR: &str = "images";

/// Key of the local image record for an account.
pub fn local_images_key(account: &str) -> String {
    format!("localImages_{}", account)
}

/// Key of the like set for an account.
pub fn likes_key(account: &str) -> String {
    format!("likes_{}", account)
}

/// Key of the super-like set for an account.
pub fn super_likes_key(account: &str) -> String {
    format!("superLikes_{}", account)
}
