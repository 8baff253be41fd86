//! Session persistence.

use bumble_core::constants::SESSION_KEY;
use bumble_core::{Account, Session};
use bumble_storage::kv::write_json;
use bumble_storage::{KeyValueStore, StorageResult};

/// Stored session, if one exists and names a known account.
pub async fn load(kv: &dyn KeyValueStore) -> StorageResult<Option<Session>> {
    let stored = kv.get(SESSION_KEY).await?;
    Ok(stored.as_deref().and_then(Session::from_stored))
}

pub async fn start(kv: &dyn KeyValueStore, me: Account) -> StorageResult<Session> {
    let session = Session::start(me);
    write_json(kv, SESSION_KEY, &session).await?;
    Ok(session)
}

pub async fn clear(kv: &dyn KeyValueStore) -> StorageResult<()> {
    kv.remove(SESSION_KEY).await
}
