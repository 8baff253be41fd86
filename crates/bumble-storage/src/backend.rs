//! Backend selection.
//!
//! The repository config is turned into a [`Backend`] once per operation.
//! Listing only needs a repository; saving also needs a token.

use bumble_core::RepoConfig;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Storage backend types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Remote,
    Local,
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            BackendKind::Remote => write!(f, "github"),
            BackendKind::Local => write!(f, "local"),
        }
    }
}

/// Repository coordinates for the GitHub backend.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub token: Option<String>,
}

impl std::fmt::Debug for RemoteTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("RemoteTarget")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl RemoteTarget {
    fn from_config(config: &RepoConfig) -> Self {
        RemoteTarget {
            owner: config.owner.trim().to_string(),
            repo: config.repo.trim().to_string(),
            branch: config.branch().to_string(),
            token: config
                .has_token()
                .then(|| config.token.trim().to_string()),
        }
    }
}

/// Backend resolved for one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Remote(RemoteTarget),
    Local,
}

impl Backend {
    /// Backend for listing: remote as soon as owner and repository are set.
    pub fn for_list(config: &RepoConfig) -> Self {
        if config.has_repository() {
            Backend::Remote(RemoteTarget::from_config(config))
        } else {
            Backend::Local
        }
    }

    /// Backend for saving: remote only with owner, repository and token.
    pub fn for_save(config: &RepoConfig) -> Self {
        if config.has_repository() && config.has_token() {
            Backend::Remote(RemoteTarget::from_config(config))
        } else {
            Backend::Local
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Remote(_) => BackendKind::Remote,
            Backend::Local => BackendKind::Local,
        }
    }
}
