use async_trait::async_trait;
use aws_sdk_s3::{primitives::ByteStream, types::ObjectCannedAcl};
use std::path::Path;
use tracing::{debug, info};

#[cfg(test)]
use mockall::automock;

use super::multipart::{choose_strategy, upload_multipart, UploadStrategy};
use super::{S3Client, StoreError};

/// The three backend operations a deployment needs.
///
/// Implemented by [`S3Client`] for real runs and by `MockObjectStore` in tests.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `body` under `key` with a private ACL
    async fn put_object(&self, key: &str, body: &[u8]) -> Result<(), StoreError>;

    /// Remove the object stored under `key`
    async fn delete_object(&self, key: &str) -> Result<(), StoreError>;

    /// Upload a local file under `key`, returning the number of bytes sent
    async fn upload_file(
        &self,
        local_path: &Path,
        key: &str,
        content_type: &str,
    ) -> Result<u64, StoreError>;
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn put_object(&self, key: &str, body: &[u8]) -> Result<(), StoreError> {
        self.client()
            .put_object()
            .bucket(self.bucket())
            .key(key)
            .body(ByteStream::from(body.to_vec()))
            .acl(ObjectCannedAcl::Private)
            .send()
            .await
            .map_err(|e| StoreError::from_sdk(self.bucket(), e))?;

        debug!("Put s3://{}/{}", self.bucket(), key);
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<(), StoreError> {
        self.client()
            .delete_object()
            .bucket(self.bucket())
            .key(key)
            .send()
            .await
            .map_err(|e| StoreError::from_sdk(self.bucket(), e))?;

        debug!("Deleted s3://{}/{}", self.bucket(), key);
        Ok(())
    }

    async fn upload_file(
        &self,
        local_path: &Path,
        key: &str,
        content_type: &str,
    ) -> Result<u64, StoreError> {
        let metadata = tokio::fs::metadata(local_path).await?;
        if !metadata.is_file() {
            return Err(StoreError::NotAFile {
                path: local_path.to_path_buf(),
            });
        }
        let file_size = metadata.len();

        if let UploadStrategy::Multipart { part_size, parts } = choose_strategy(file_size) {
            info!(
                "Using multipart upload for large file: {} ({} bytes, {} parts)",
                key, file_size, parts
            );
            upload_multipart(
                self.client(),
                self.bucket(),
                key,
                local_path,
                content_type,
                part_size,
            )
            .await?;
            return Ok(file_size);
        }

        // Create ByteStream from file
        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| StoreError::Io(std::io::Error::other(e)))?;

        self.client()
            .put_object()
            .bucket(self.bucket())
            .key(key)
            .body(body)
            .content_length(file_size as i64)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StoreError::from_sdk(self.bucket(), e))?;

        debug!(
            "Uploaded {} -> s3://{}/{} ({} bytes)",
            local_path.display(),
            self.bucket(),
            key,
            file_size
        );
        Ok(file_size)
    }
}
