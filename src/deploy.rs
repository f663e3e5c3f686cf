use indicatif::ProgressBar;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::error::DeployError;
use crate::probe::{check_permissions, ProbeOutcome};
use crate::s3::{detect_content_type, ObjectStore};

/// A directory entry paired with the object it will become
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedUpload {
    pub path: PathBuf,
    pub key: String,
    pub content_type: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedObject {
    pub key: String,
    pub content_type: &'static str,
    pub bytes: u64,
}

#[derive(Debug, Clone, Default)]
pub struct DeployOptions {
    /// Treat an access-denied permission check as a hard failure
    pub strict_permissions: bool,
}

#[derive(Debug, Clone)]
pub struct DeploySummary {
    pub probe: ProbeOutcome,
    pub uploaded: Vec<UploadedObject>,
}

impl DeploySummary {
    pub fn total_bytes(&self) -> u64 {
        self.uploaded.iter().map(|o| o.bytes).sum()
    }
}

/// List the immediate entries of `dir` and resolve their keys and content types.
///
/// Entries are not filtered by type, so subdirectories are planned too and
/// will fail at upload time. Ordered by file name. A missing `dir` plans
/// nothing; file names that aren't valid UTF-8 are rejected since they can't
/// become object keys without loss.
pub fn plan_uploads(dir: &Path) -> Result<Vec<PlannedUpload>, DeployError> {
    let mut plan = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if is_missing_root(&e) => {
                warn!("Site directory {} does not exist, nothing to upload", dir.display());
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(DeployError::Listing {
                    path: dir.to_path_buf(),
                    source,
                });
            }
        };

        let path = entry.into_path();
        let key = match path.file_name() {
            Some(name) => name
                .to_str()
                .ok_or_else(|| DeployError::InvalidFileName { path: path.clone() })?
                .to_string(),
            None => continue,
        };
        let content_type = detect_content_type(&path);

        plan.push(PlannedUpload {
            path,
            key,
            content_type,
        });
    }

    Ok(plan)
}

fn is_missing_root(err: &walkdir::Error) -> bool {
    err.depth() == 0 && err.io_error().map(|e| e.kind()) == Some(ErrorKind::NotFound)
}

/// Upload planned entries in order, stopping at the first failure
pub async fn upload_planned<S>(
    store: &S,
    plan: &[PlannedUpload],
    pb: Option<&ProgressBar>,
) -> Result<Vec<UploadedObject>, DeployError>
where
    S: ObjectStore + ?Sized,
{
    let mut uploaded = Vec::with_capacity(plan.len());

    for item in plan {
        info!(
            "Uploading {} with Content-Type: {}...",
            item.key, item.content_type
        );
        if let Some(pb) = pb {
            pb.set_message(format!("{} ({})", item.key, item.content_type));
        }

        match store
            .upload_file(&item.path, &item.key, item.content_type)
            .await
        {
            Ok(bytes) => {
                info!("Successfully uploaded {}", item.key);
                uploaded.push(UploadedObject {
                    key: item.key.clone(),
                    content_type: item.content_type,
                    bytes,
                });
                if let Some(pb) = pb {
                    pb.inc(1);
                }
            }
            Err(source) => {
                error!("Failed to upload {}: {}", item.key, source);
                return Err(DeployError::Upload {
                    key: item.key.clone(),
                    source,
                    completed: uploaded,
                });
            }
        }
    }

    Ok(uploaded)
}

/// Check permissions, then publish every entry of `site_dir`
pub async fn deploy<S>(
    store: &S,
    site_dir: &Path,
    options: &DeployOptions,
    pb: Option<&ProgressBar>,
) -> Result<DeploySummary, DeployError>
where
    S: ObjectStore + ?Sized,
{
    let probe = check_permissions(store)
        .await
        .map_err(DeployError::PermissionCheck)?;

    if let ProbeOutcome::Denied { bucket, message } = &probe {
        if options.strict_permissions {
            return Err(DeployError::PermissionDenied {
                bucket: bucket.clone(),
                message: message.clone(),
            });
        }
        warn!("Continuing with uploads despite denied permission check");
    } else {
        info!("Permissions check passed. Starting file uploads...");
    }

    let plan = plan_uploads(site_dir)?;
    if let Some(pb) = pb {
        pb.set_length(plan.len() as u64);
    }

    let uploaded = upload_planned(store, &plan, pb).await?;

    Ok(DeploySummary { probe, uploaded })
}
