//! Object storage for video media and thumbnails.
//!
//! Uploads arrive as multipart files spooled to a scratch directory
//! ([`LocalAsset`]). An [`AssetStore`] moves them to durable storage and
//! hands back a public URL. The scratch file is discarded after every upload
//! attempt, successful or not.

pub mod local;
pub mod s3;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use local::LocalAssetStore;
pub use s3::S3AssetStore;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Asset upload failed: {0}")]
    Upload(String),

    #[error("Asset removal failed: {0}")]
    Remove(String),

    #[error("Asset I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Resource class of a stored asset, derived from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Video,
    Raw,
    Image,
}

impl AssetKind {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("mp4") | Some("mkv") | Some("mov") | Some("avi") => AssetKind::Video,
            Some("mp3") | Some("wav") => AssetKind::Raw,
            _ => AssetKind::Image,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Video => "video",
            AssetKind::Raw => "raw",
            AssetKind::Image => "image",
        }
    }
}

/// A file received from the client, waiting in the scratch directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAsset {
    pub path: PathBuf,
    pub original_name: String,
}

impl LocalAsset {
    pub fn new(path: impl Into<PathBuf>, original_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            original_name: original_name.into(),
        }
    }

    pub fn kind(&self) -> AssetKind {
        AssetKind::from_path(Path::new(&self.original_name))
    }

    /// Lower-cased extension of the original file name, if any
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }

    /// Object name for durable storage: `<kind>/<uuid>[.<ext>]`
    pub fn object_name(&self) -> String {
        let id = uuid::Uuid::new_v4();
        match self.extension() {
            Some(ext) => format!("{}/{}.{}", self.kind().as_str(), id, ext),
            None => format!("{}/{}", self.kind().as_str(), id),
        }
    }

    pub fn content_type(&self) -> String {
        mime_guess::from_path(&self.original_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAsset {
    pub url: String,
    pub public_id: String,
    pub kind: AssetKind,
    /// Seconds, when the store can derive it
    pub duration: Option<f64>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Upload a scratch file. The scratch file is gone afterwards either way.
    async fn store(&self, asset: LocalAsset) -> Result<StoredAsset, AssetError>;

    /// Remove an asset by URL. Unknown or foreign URLs are a no-op.
    async fn remove(&self, url: &str) -> Result<(), AssetError>;
}

/// Delete a scratch file, ignoring a file that is already gone
pub(crate) async fn discard_scratch(asset: &LocalAsset) {
    if let Err(e) = tokio::fs::remove_file(&asset.path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %asset.path.display(), error = %e, "Failed to discard scratch file");
        }
    }
}

/// Last path segment of a URL without its extension
pub fn public_id_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next()?;
    let segment = path.rsplit('/').next()?;
    let id = match segment.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => segment,
    };
    (!id.is_empty()).then(|| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_kind_from_extension() {
        assert_eq!(AssetKind::from_path(Path::new("clip.MP4")), AssetKind::Video);
        assert_eq!(AssetKind::from_path(Path::new("clip.mkv")), AssetKind::Video);
        assert_eq!(AssetKind::from_path(Path::new("song.wav")), AssetKind::Raw);
        assert_eq!(AssetKind::from_path(Path::new("cover.png")), AssetKind::Image);
        assert_eq!(AssetKind::from_path(Path::new("no_extension")), AssetKind::Image);
    }

    #[test]
    fn test_object_name_keeps_kind_and_extension() {
        let asset = LocalAsset::new("/tmp/upload-1", "Holiday.MOV");
        let name = asset.object_name();
        assert!(name.starts_with("video/"));
        assert!(name.ends_with(".mov"));
    }

    #[test]
    fn test_content_type_guess() {
        assert_eq!(LocalAsset::new("/tmp/a", "a.png").content_type(), "image/png");
        assert_eq!(
            LocalAsset::new("/tmp/b", "b").content_type(),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_public_id_from_url() {
        assert_eq!(
            public_id_from_url("https://cdn.example.com/image/abc.png?v=1").as_deref(),
            Some("abc")
        );
        assert_eq!(public_id_from_url("https://cdn.example.com/").as_deref(), None);
    }
}
