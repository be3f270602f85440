/// Multipart form reader
///
/// File parts are spooled into the upload directory and handed to the
/// services as [`LocalAsset`]s; text parts are collected as strings.
use actix_multipart::Multipart;
use futures_util::stream::StreamExt;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::storage::{discard_scratch, LocalAsset};

const MAX_FILE_BYTES: usize = 512 * 1024 * 1024;
const MAX_TEXT_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub dir: PathBuf,
}

impl UploadSettings {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, LocalAsset>,
}

impl MultipartForm {
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    pub fn take_file(&mut self, name: &str) -> Option<LocalAsset> {
        self.files.remove(name)
    }

    /// Delete every file part nobody took
    pub async fn discard_files(self) {
        for asset in self.files.values() {
            discard_scratch(asset).await;
        }
    }

    async fn insert_file(&mut self, name: String, asset: LocalAsset) {
        if let Some(previous) = self.files.insert(name, asset) {
            discard_scratch(&previous).await;
        }
    }
}

pub async fn read_multipart(mut payload: Multipart, settings: &UploadSettings) -> Result<MultipartForm> {
    let mut form = MultipartForm::default();
    match read_parts(&mut payload, settings, &mut form).await {
        Ok(()) => Ok(form),
        Err(e) => {
            form.discard_files().await;
            Err(e)
        }
    }
}

async fn read_parts(payload: &mut Multipart, settings: &UploadSettings, form: &mut MultipartForm) -> Result<()> {
    tokio::fs::create_dir_all(&settings.dir)
        .await
        .map_err(|e| AppError::ExternalStore(format!("upload directory unavailable: {e}")))?;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| AppError::validation(format!("Malformed multipart body: {e}")))?;

        let (name, filename) = match field.content_disposition() {
            Some(cd) => (
                cd.get_name().map(str::to_string),
                cd.get_filename().map(str::to_string),
            ),
            None => (None, None),
        };
        let Some(name) = name else {
            continue;
        };

        match filename {
            Some(filename) => {
                let path = settings.dir.join(Uuid::new_v4().to_string());
                let asset = LocalAsset::new(path, filename);
                if let Err(e) = spool(&mut field, &asset).await {
                    discard_scratch(&asset).await;
                    return Err(e);
                }
                form.insert_file(name, asset).await;
            }
            None => {
                let mut body = Vec::new();
                while let Some(chunk) = field.next().await {
                    let chunk = chunk.map_err(|e| AppError::validation(format!("Malformed multipart body: {e}")))?;
                    body.extend_from_slice(&chunk);
                    if body.len() > MAX_TEXT_BYTES {
                        return Err(AppError::validation(format!("Field '{name}' is too large")));
                    }
                }
                form.fields.insert(name, String::from_utf8_lossy(&body).into_owned());
            }
        }
    }
    Ok(())
}

async fn spool(field: &mut actix_multipart::Field, asset: &LocalAsset) -> Result<()> {
    let io_err = |e: std::io::Error| AppError::ExternalStore(format!("failed to spool upload: {e}"));

    let mut file = tokio::fs::File::create(&asset.path).await.map_err(io_err)?;
    let mut written = 0usize;

    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| AppError::validation(format!("Malformed multipart body: {e}")))?;
        written += chunk.len();
        if written > MAX_FILE_BYTES {
            return Err(AppError::validation(format!(
                "'{}' exceeds the upload limit",
                asset.original_name
            )));
        }
        file.write_all(&chunk).await.map_err(io_err)?;
    }

    file.flush().await.map_err(io_err)?;
    Ok(())
}
