pub mod config;
pub mod deploy;
pub mod error;
pub mod probe;
pub mod s3;

pub use config::Config;
pub use deploy::{
    deploy, plan_uploads, upload_planned, DeployOptions, DeploySummary, PlannedUpload,
    UploadedObject,
};
pub use error::DeployError;
pub use probe::{check_permissions, ProbeOutcome};
pub use s3::{detect_content_type, ObjectStore, S3Client, StoreError};
