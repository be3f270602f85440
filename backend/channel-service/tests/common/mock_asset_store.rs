//! Recording AssetStore for integration tests
//!
//! Keeps the set of live asset URLs in memory and can be told to fail the
//! next upload or every removal of a given URL.

use async_trait::async_trait;
use channel_service::storage::{AssetError, AssetKind, AssetStore, LocalAsset, StoredAsset};
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Default)]
pub struct RecordingAssetStore {
    live: Mutex<HashSet<String>>,
    fail_uploads_of: Mutex<HashSet<String>>,
    fail_removals_of: Mutex<HashSet<String>>,
}

impl RecordingAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an existing URL as live, e.g. for seeded records
    pub fn preload(&self, url: &str) {
        self.live.lock().unwrap().insert(url.to_string());
    }

    /// Fail uploads of files with this original name
    pub fn fail_upload_of(&self, original_name: &str) {
        self.fail_uploads_of
            .lock()
            .unwrap()
            .insert(original_name.to_string());
    }

    pub fn fail_removal_of(&self, url: &str) {
        self.fail_removals_of.lock().unwrap().insert(url.to_string());
    }

    pub fn is_live(&self, url: &str) -> bool {
        self.live.lock().unwrap().contains(url)
    }

    pub fn live_count(&self) -> usize {
        self.live.lock().unwrap().len()
    }
}

#[async_trait]
impl AssetStore for RecordingAssetStore {
    async fn store(&self, asset: LocalAsset) -> Result<StoredAsset, AssetError> {
        let _ = tokio::fs::remove_file(&asset.path).await;

        if self
            .fail_uploads_of
            .lock()
            .unwrap()
            .contains(&asset.original_name)
        {
            return Err(AssetError::Upload(format!(
                "injected failure for {}",
                asset.original_name
            )));
        }

        let kind = asset.kind();
        let object_name = asset.object_name();
        let url = format!("https://assets.test/{}", object_name);
        self.live.lock().unwrap().insert(url.clone());

        Ok(StoredAsset {
            url,
            public_id: object_name,
            kind,
            duration: (kind == AssetKind::Video).then_some(12.5),
        })
    }

    async fn remove(&self, url: &str) -> Result<(), AssetError> {
        if self.fail_removals_of.lock().unwrap().contains(url) {
            return Err(AssetError::Remove(format!("injected failure for {}", url)));
        }
        self.live.lock().unwrap().remove(url);
        Ok(())
    }
}
