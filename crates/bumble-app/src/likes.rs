//! Per-account like and super-like sets.

use bumble_core::{Account, LikeKind};
use bumble_storage::kv::{read_json, write_json};
use bumble_storage::{KeyValueStore, StorageResult};
use std::sync::Arc;

/// Reaction sets persisted as JSON arrays of image references.
///
/// Sets only grow and never hold the same reference twice.
#[derive(Clone)]
pub struct LikeBook {
    kv: Arc<dyn KeyValueStore>,
}

impl LikeBook {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        LikeBook { kv }
    }

    pub async fn list(&self, account: Account, kind: LikeKind) -> StorageResult<Vec<String>> {
        let key = kind.storage_key(account.as_str());
        Ok(read_json::<Vec<String>>(self.kv.as_ref(), &key)
            .await?
            .unwrap_or_default())
    }

    /// Add `reference` to the set. Returns `false` if it was already there.
    pub async fn record(
        &self,
        account: Account,
        kind: LikeKind,
        reference: &str,
    ) -> StorageResult<bool> {
        let key = kind.storage_key(account.as_str());
        let mut set = self.list(account, kind).await?;
        if set.iter().any(|existing| existing == reference) {
            return Ok(false);
        }
        set.push(reference.to_string());
        write_json(self.kv.as_ref(), &key, &set).await?;
        Ok(true)
    }

    pub async fn contains(
        &self,
        account: Account,
        kind: LikeKind,
        reference: &str,
    ) -> StorageResult<bool> {
        Ok(self
            .list(account, kind)
            .await?
            .iter()
            .any(|existing| existing == reference))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumble_storage::MemoryStore;

    #[tokio::test]
    async fn recording_twice_keeps_one_entry() {
        let book = LikeBook::new(Arc::new(MemoryStore::new()));
        assert!(book.record(Account::Hardik, LikeKind::Like, "u1").await.unwrap());
        assert!(!book.record(Account::Hardik, LikeKind::Like, "u1").await.unwrap());
        assert!(book.record(Account::Hardik, LikeKind::Like, "u2").await.unwrap());
        assert_eq!(
            book.list(Account::Hardik, LikeKind::Like).await.unwrap(),
            ["u1", "u2"]
        );
    }

    #[tokio::test]
    async fn sets_are_separate_per_kind_and_account() {
        let book = LikeBook::new(Arc::new(MemoryStore::new()));
        book.record(Account::Hardik, LikeKind::SuperLike, "u1").await.unwrap();

        assert!(book.contains(Account::Hardik, LikeKind::SuperLike, "u1").await.unwrap());
        assert!(!book.contains(Account::Hardik, LikeKind::Like, "u1").await.unwrap());
        assert!(book.list(Account::Ananya, LikeKind::SuperLike).await.unwrap().is_empty());
    }
}
