use aws_sdk_s3::{
    primitives::ByteStream,
    types::{CompletedMultipartUpload, CompletedPart},
    Client,
};
use std::path::Path;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

use super::StoreError;

// Threshold for using multipart upload (100MB)
pub const MULTIPART_THRESHOLD: u64 = 100 * 1024 * 1024;

// Size of each part (10MB) - AWS minimum is 5MB
pub const PART_SIZE: u64 = 10 * 1024 * 1024;

// AWS maximum number of parts per upload
pub const MAX_PARTS: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStrategy {
    /// One PutObject call
    Single,
    /// Multipart upload with `parts` parts of `part_size` bytes (last one shorter)
    Multipart { part_size: u64, parts: u64 },
}

/// Pick single or multipart upload for a file of `file_size` bytes.
///
/// Part size grows past [`PART_SIZE`] when needed to stay within [`MAX_PARTS`].
pub fn choose_strategy(file_size: u64) -> UploadStrategy {
    if file_size < MULTIPART_THRESHOLD {
        return UploadStrategy::Single;
    }

    let part_size = PART_SIZE.max(file_size.div_ceil(MAX_PARTS));
    UploadStrategy::Multipart {
        part_size,
        parts: file_size.div_ceil(part_size),
    }
}

/// Upload a large file using S3 multipart upload
///
/// Content-Type is set when the upload is created. If any part fails the
/// upload is aborted.
pub async fn upload_multipart(
    client: &Client,
    bucket: &str,
    s3_key: &str,
    local_path: &Path,
    content_type: &str,
    part_size: u64,
) -> Result<(), StoreError> {
    let multipart = client
        .create_multipart_upload()
        .bucket(bucket)
        .key(s3_key)
        .content_type(content_type)
        .send()
        .await
        .map_err(|e| StoreError::from_sdk(bucket, e))?;

    let upload_id = multipart.upload_id().ok_or_else(|| StoreError::Backend {
        message: format!("No upload ID returned from S3 for {}", s3_key),
    })?;

    debug!("Multipart upload initiated with ID: {}", upload_id);

    let uploaded = upload_parts(client, bucket, s3_key, upload_id, local_path, part_size).await;
    let parts = match uploaded {
        Ok(parts) => parts,
        Err(e) => {
            let aborted = abort_multipart_upload(client, bucket, s3_key, upload_id).await;
            if let Err(abort_err) = aborted {
                warn!("Failed to abort multipart upload {}: {}", upload_id, abort_err);
            }
            return Err(e);
        }
    };

    debug!(
        "All {} parts uploaded, completing multipart upload",
        parts.len()
    );

    let completed_multipart = CompletedMultipartUpload::builder()
        .set_parts(Some(parts))
        .build();

    client
        .complete_multipart_upload()
        .bucket(bucket)
        .key(s3_key)
        .upload_id(upload_id)
        .multipart_upload(completed_multipart)
        .send()
        .await
        .map_err(|e| StoreError::from_sdk(bucket, e))?;

    info!(
        "Completed multipart upload: {} -> s3://{}/{}",
        local_path.display(),
        bucket,
        s3_key
    );

    Ok(())
}

async fn upload_parts(
    client: &Client,
    bucket: &str,
    s3_key: &str,
    upload_id: &str,
    local_path: &Path,
    part_size: u64,
) -> Result<Vec<CompletedPart>, StoreError> {
    let mut file = tokio::fs::File::open(local_path).await?;
    let mut parts = Vec::new();
    let mut part_number = 1i32;

    loop {
        let mut buffer = Vec::with_capacity(part_size as usize);
        let bytes_read = (&mut file).take(part_size).read_to_end(&mut buffer).await?;

        if bytes_read == 0 {
            break; // EOF
        }

        debug!("Uploading part {} ({} bytes)", part_number, bytes_read);

        let part_result = client
            .upload_part()
            .bucket(bucket)
            .key(s3_key)
            .upload_id(upload_id)
            .part_number(part_number)
            .body(ByteStream::from(buffer))
            .send()
            .await
            .map_err(|e| StoreError::from_sdk(bucket, e))?;

        parts.push(
            CompletedPart::builder()
                .part_number(part_number)
                .e_tag(part_result.e_tag().unwrap_or_default())
                .build(),
        );

        part_number += 1;
    }

    Ok(parts)
}

async fn abort_multipart_upload(
    client: &Client,
    bucket: &str,
    s3_key: &str,
    upload_id: &str,
) -> Result<(), StoreError> {
    client
        .abort_multipart_upload()
        .bucket(bucket)
        .key(s3_key)
        .upload_id(upload_id)
        .send()
        .await
        .map_err(|e| StoreError::from_sdk(bucket, e))?;

    debug!("Aborted multipart upload {}", upload_id);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_files_use_single_put() {
        assert_eq!(choose_strategy(0), UploadStrategy::Single);
        assert_eq!(choose_strategy(4096), UploadStrategy::Single);
        assert_eq!(
            choose_strategy(MULTIPART_THRESHOLD - 1),
            UploadStrategy::Single
        );
    }

    #[test]
    fn test_large_files_use_multipart() {
        assert_eq!(
            choose_strategy(MULTIPART_THRESHOLD),
            UploadStrategy::Multipart {
                part_size: PART_SIZE,
                parts: 10
            }
        );
        assert_eq!(
            choose_strategy(MULTIPART_THRESHOLD + 1),
            UploadStrategy::Multipart {
                part_size: PART_SIZE,
                parts: 11
            }
        );

        // Beyond the 5GB single PUT limit
        let six_gb = 6 * 1024 * 1024 * 1024;
        assert_eq!(
            choose_strategy(six_gb),
            UploadStrategy::Multipart {
                part_size: PART_SIZE,
                parts: 615
            }
        );
    }

    #[test]
    fn test_part_size_grows_to_respect_part_limit() {
        let huge = 200 * 1024 * 1024 * 1024; // 200GB
        match choose_strategy(huge) {
            UploadStrategy::Multipart { part_size, parts } => {
                assert!(part_size > PART_SIZE);
                assert!(parts <= MAX_PARTS);
                assert!(part_size * parts >= huge);
            }
            UploadStrategy::Single => panic!("expected multipart"),
        }
    }
}
