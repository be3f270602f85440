use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use super::{discard_scratch, public_id_from_url, AssetError, AssetStore, LocalAsset, StoredAsset};

/// Filesystem-backed asset store for development
#[derive(Debug, Clone)]
pub struct LocalAssetStore {
    root: PathBuf,
    base_url: String,
}

impl LocalAssetStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Relative object name for a URL served by this store
    fn object_name(&self, url: &str) -> Option<PathBuf> {
        let rest = url.strip_prefix(&self.base_url)?.strip_prefix('/')?;
        let rest = rest.split(['?', '#']).next()?;
        if rest.is_empty() {
            return None;
        }

        let name = PathBuf::from(rest);
        // Only plain relative segments resolve inside the root
        name.components()
            .all(|c| matches!(c, Component::Normal(_)))
            .then_some(name)
    }

    async fn copy_in(&self, asset: &LocalAsset) -> Result<StoredAsset, AssetError> {
        let name = asset.object_name();
        let target = self.root.join(&name);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(&asset.path, &target).await?;

        let url = format!("{}/{}", self.base_url, name);
        debug!(path = %target.display(), url = %url, "Stored asset on local disk");

        Ok(StoredAsset {
            public_id: public_id_from_url(&url).unwrap_or_default(),
            url,
            kind: asset.kind(),
            duration: None,
        })
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn store(&self, asset: LocalAsset) -> Result<StoredAsset, AssetError> {
        let result = self.copy_in(&asset).await;
        discard_scratch(&asset).await;
        result
    }

    async fn remove(&self, url: &str) -> Result<(), AssetError> {
        let Some(name) = self.object_name(url) else {
            debug!(url = %url, "Not a local asset URL, nothing to remove");
            return Ok(());
        };

        match tokio::fs::remove_file(self.root.join(&name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AssetError::Remove(e.to_string())),
        }
    }
}
