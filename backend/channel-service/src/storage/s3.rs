use async_trait::async_trait;
use s3_utils::S3Operations;
use tracing::{debug, warn};

use super::{discard_scratch, public_id_from_url, AssetError, AssetStore, LocalAsset, StoredAsset};

/// S3-backed asset store
#[derive(Clone)]
pub struct S3AssetStore {
    ops: S3Operations,
}

impl S3AssetStore {
    pub fn new(ops: S3Operations) -> Self {
        Self { ops }
    }

    async fn upload(&self, asset: &LocalAsset) -> Result<StoredAsset, AssetError> {
        let key = self.ops.config().object_key(&asset.object_name());
        let url = self
            .ops
            .upload_path(&key, &asset.path, &asset.content_type())
            .await
            .map_err(|e| AssetError::Upload(e.to_string()))?;

        Ok(StoredAsset {
            public_id: public_id_from_url(&url).unwrap_or_else(|| key.clone()),
            url,
            kind: asset.kind(),
            duration: None,
        })
    }
}

#[async_trait]
impl AssetStore for S3AssetStore {
    async fn store(&self, asset: LocalAsset) -> Result<StoredAsset, AssetError> {
        let result = self.upload(&asset).await;
        discard_scratch(&asset).await;

        if let Err(e) = &result {
            warn!(file = %asset.original_name, error = %e, "S3 upload failed");
        }
        result
    }

    async fn remove(&self, url: &str) -> Result<(), AssetError> {
        let Some(key) = self.ops.config().key_from_url(url) else {
            debug!(url = %url, "Not an object in this bucket, nothing to remove");
            return Ok(());
        };

        self.ops
            .delete_file(&key)
            .await
            .map_err(|e| AssetError::Remove(e.to_string()))
    }
}
