use bumble_processing::CompressionSettings;
use reqwest::Client;
use std::sync::Arc;

use crate::backend::Backend;
use crate::github::GitHubImageStore;
use crate::kv::KeyValueStore;
use crate::local::LocalImageStore;
use crate::traits::ImageStore;

/// Shared handles every backend is built from.
#[derive(Clone)]
pub struct StoreContext {
    pub kv: Arc<dyn KeyValueStore>,
    pub client: Client,
    pub api_url: String,
    pub compression: CompressionSettings,
    pub precheck_bytes: usize,
}

/// Create the image store for a resolved backend
pub fn create_store(backend: &Backend, ctx: &StoreContext) -> Arc<dyn ImageStore> {
    match backend {
        Backend::Remote(target) => Arc::new(GitHubImageStore::new(
            ctx.client.clone(),
            ctx.api_url.clone(),
            target.clone(),
            ctx.compression,
            ctx.precheck_bytes,
        )),
        Backend::Local => Arc::new(LocalImageStore::new(ctx.kv.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendKind, RemoteTarget};
    use crate::kv::MemoryStore;

    fn context() -> StoreContext {
        StoreContext {
            kv: Arc::new(MemoryStore::new()),
            client: Client::new(),
            api_url: "http://localhost:1".to_string(),
            compression: CompressionSettings::default(),
            precheck_bytes: 1024,
        }
    }

    #[test]
    fn creates_store_matching_backend() {
        let ctx = context();
        assert_eq!(create_store(&Backend::Local, &ctx).backend_kind(), BackendKind::Local);

        let remote = Backend::Remote(RemoteTarget {
            owner: "o".to_string(),
            repo: "r".to_string(),
            branch: "main".to_string(),
            token: None,
        });
        assert_eq!(create_store(&remote, &ctx).backend_kind(), BackendKind::Remote);
    }
}
