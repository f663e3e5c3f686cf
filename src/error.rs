use std::path::PathBuf;
use thiserror::Error;

use crate::deploy::UploadedObject;
use crate::s3::StoreError;

/// Hard failures that end a deployment run
#[derive(Error, Debug)]
pub enum DeployError {
    /// The canary write/delete failed for a reason other than access denial
    #[error("Permission check failed: {0}")]
    PermissionCheck(#[source] StoreError),

    /// Access was denied during the canary write/delete and strict mode is on
    #[error("Permission check failed: access denied for bucket '{bucket}'")]
    PermissionDenied { bucket: String, message: String },

    /// The site directory could not be listed
    #[error("Failed to list {}: {source}", path.display())]
    Listing {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A file name is not valid UTF-8 and can't be used as an object key
    #[error("File name is not valid UTF-8: {}", path.display())]
    InvalidFileName { path: PathBuf },

    /// An upload failed; entries after it were not attempted
    #[error("Failed to upload {key}: {source}")]
    Upload {
        key: String,
        #[source]
        source: StoreError,
        /// Uploads that finished before the failure
        completed: Vec<UploadedObject>,
    },
}

impl DeployError {
    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            Self::PermissionCheck(source) | Self::Upload { source, .. } => {
                format!("{}\n\n{}", self, source.user_message())
            }
            Self::PermissionDenied { bucket, message } => StoreError::AccessDenied {
                bucket: bucket.clone(),
                message: message.clone(),
            }
            .user_message(),
            Self::InvalidFileName { .. } => {
                format!("{}\n\nPossible solutions:\n  1. Rename the file to a UTF-8 name", self)
            }
            Self::Listing { path, .. } => {
                format!(
                    "{}\n\nPossible solutions:\n  \
                     1. Check the site directory exists: ls -la {}\n  \
                     2. Point at another directory with --dir or SITE_DIR",
                    self,
                    path.display()
                )
            }
        }
    }
}
