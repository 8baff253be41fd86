use async_trait::async_trait;
use bumble_core::constants::local_images_key;
use bumble_core::{Account, ImageItem};
use bumble_processing::{guess_mime_type, to_data_url};
use std::sync::Arc;

use crate::backend::BackendKind;
use crate::kv::{read_json, write_json, KeyValueStore};
use crate::traits::{ImageStore, SavedImage, StorageResult, UploadFile};

/// Images embedded as data URLs in the key/value store.
///
/// Each account has one record holding an array of data URLs; saving appends
/// the full file. No size limit is enforced.
#[derive(Clone)]
pub struct LocalImageStore {
    kv: Arc<dyn KeyValueStore>,
}

impl LocalImageStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        LocalImageStore { kv }
    }

    async fn load(&self, key: &str) -> StorageResult<Vec<String>> {
        Ok(read_json::<Vec<String>>(self.kv.as_ref(), key)
            .await?
            .unwrap_or_default())
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn list(&self, account: Account) -> StorageResult<Vec<ImageItem>> {
        let key = local_images_key(account.as_str());
        let items = self
            .load(&key)
            .await?
            .into_iter()
            .map(|data_url| ImageItem::Local { data_url })
            .collect::<Vec<_>>();

        tracing::debug!(account = %account, count = items.len(), "Listed local images");
        Ok(items)
    }

    async fn save(&self, account: Account, file: &UploadFile) -> StorageResult<SavedImage> {
        let key = local_images_key(account.as_str());
        let start = std::time::Instant::now();

        let mime_type = guess_mime_type(&file.data, &file.name);
        let data_url = to_data_url(mime_type, &file.data);

        let mut record = self.load(&key).await?;
        record.push(data_url.clone());
        write_json(self.kv.as_ref(), &key, &record).await?;

        tracing::info!(
            account = %account,
            key = %key,
            file = %file.name,
            size_bytes = file.len(),
            count = record.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local image save successful"
        );

        Ok(SavedImage {
            key,
            reference: Some(data_url),
        })
    }

    fn backend_kind(&self) -> BackendKind {
        BackendKind::Local
    }
}
