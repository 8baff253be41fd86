//! Bumble Storage Library
//!
//! Persistence for bumble-lite: a durable key/value store, the [`ImageStore`]
//! capability with a local and a GitHub-backed implementation, and the
//! [`PersistenceGateway`] that picks between them per operation.
//!
//! # Remote layout
//!
//! Uploads land in the configured repository under `images/{account}/`, named
//! `{millis}-{sanitized original name}`. See the `keys` module.

pub mod backend;
pub mod factory;
pub mod gateway;
pub mod github;
pub mod keys;
pub mod kv;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use backend::{Backend, BackendKind, RemoteTarget};
pub use factory::{create_store, StoreContext};
pub use gateway::{PersistenceGateway, UploadTally};
pub use github::GitHubImageStore;
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use local::LocalImageStore;
pub use traits::{ImageStore, SavedImage, StorageError, StorageResult, UploadFile};
