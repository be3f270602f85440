/// S3 object operations for media upload and removal
use crate::config::S3Config;
use crate::S3Error;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct S3Operations {
    client: Arc<Client>,
    config: S3Config,
}

impl S3Operations {
    pub fn new(client: Arc<Client>, config: S3Config) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &S3Config {
        &self.config
    }

    /// Upload bytes to S3, returning the public URL
    pub async fn upload_file(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<String, S3Error> {
        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await?;

        debug!(bucket = %self.config.bucket, key = %key, "Uploaded object");
        Ok(self.config.object_url(key))
    }

    /// Upload a local file to S3, returning the public URL
    pub async fn upload_path(
        &self,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> Result<String, S3Error> {
        let body = tokio::fs::read(path).await?;
        self.upload_file(key, body, content_type).await
    }

    /// Delete an object from S3
    pub async fn delete_file(&self, key: &str) -> Result<(), S3Error> {
        self.client
            .delete_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await?;

        debug!(bucket = %self.config.bucket, key = %key, "Deleted object");
        Ok(())
    }
}
