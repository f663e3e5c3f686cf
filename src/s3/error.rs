use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use std::path::PathBuf;
use thiserror::Error;

/// Service error code S3 returns when credentials lack the needed permission
pub const ACCESS_DENIED_CODE: &str = "AccessDenied";

/// Errors raised by the object store
#[derive(Error, Debug)]
pub enum StoreError {
    /// S3 access denied
    #[error("S3 access denied for bucket '{bucket}': {message}")]
    AccessDenied { bucket: String, message: String },

    /// Any other failure reported by the backend
    #[error("S3 error: {message}")]
    Backend { message: String },

    /// Upload source is a directory or some other non-regular entry
    #[error("Not a regular file: {}", path.display())]
    NotAFile { path: PathBuf },

    /// IO error wrapper
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Classify a failed SDK call by its service error code
    pub fn from_sdk<E, R>(bucket: &str, error: SdkError<E, R>) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + 'static,
        R: std::fmt::Debug,
    {
        let code = error.code().map(str::to_owned);
        Self::from_code(bucket, code.as_deref(), DisplayErrorContext(&error).to_string())
    }

    /// Map an error code to the access-denied or generic backend variant
    pub fn from_code(bucket: &str, code: Option<&str>, message: String) -> Self {
        match code {
            Some(ACCESS_DENIED_CODE) => Self::AccessDenied {
                bucket: bucket.to_string(),
                message,
            },
            _ => Self::Backend { message },
        }
    }

    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }

    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            Self::AccessDenied { bucket, message } => {
                format!(
                    "Access denied for bucket '{}': {}\n\nPossible solutions:\n  \
                     1. Check your AWS credentials: aws sts get-caller-identity\n  \
                     2. Verify s3:PutObject and s3:DeleteObject on the bucket for your IAM user/role\n  \
                     3. Ensure bucket exists: aws s3 ls s3://{}\n  \
                     4. Check AWS_REGION in .env matches bucket region",
                    bucket, message, bucket
                )
            }
            Self::NotAFile { path } => {
                format!(
                    "Not a regular file: {}\n\nPossible solutions:\n  \
                     1. Only the top level of the site directory is published\n  \
                     2. Move or remove subdirectories: ls -la {}",
                    path.display(),
                    path.parent().unwrap_or(path).display()
                )
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_denied_code_is_distinguished() {
        let err = StoreError::from_code("site", Some("AccessDenied"), "denied".into());
        assert!(err.is_access_denied());
        assert!(err.to_string().contains("bucket 'site'"));
    }

    #[test]
    fn test_other_codes_are_generic() {
        for code in [Some("NoSuchBucket"), Some("InternalError"), Some("accessdenied"), None] {
            let err = StoreError::from_code("site", code, "boom".into());
            assert!(!err.is_access_denied(), "{:?} should be generic", code);
            assert_eq!(err.to_string(), "S3 error: boom");
        }
    }

    #[test]
    fn test_user_message_suggestions() {
        let err = StoreError::AccessDenied {
            bucket: "site".into(),
            message: "nope".into(),
        };
        let msg = err.user_message();
        assert!(msg.contains("aws s3 ls s3://site"));

        let err = StoreError::NotAFile {
            path: PathBuf::from("website/assets"),
        };
        assert!(err.user_message().contains("ls -la website"));
    }
}
