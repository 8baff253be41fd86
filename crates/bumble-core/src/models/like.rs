use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::constants::{likes_key, super_likes_key};

/// Which per-account reaction set an action records into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeKind {
    Like,
    SuperLike,
}

impl LikeKind {
    /// Storage key of this set for `account`.
    pub fn storage_key(self, account: &str) -> String {
        match self {
            LikeKind::Like => likes_key(account),
            LikeKind::SuperLike => super_likes_key(account),
        }
    }
}

impl Display for LikeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            LikeKind::Like => write!(f, "like"),
            LikeKind::SuperLike => write!(f, "super-like"),
        }
    }
}
