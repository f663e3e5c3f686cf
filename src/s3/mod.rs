pub mod client;
pub mod content_type;
pub mod error;
pub mod multipart;
pub mod store;

pub use client::S3Client;
pub use content_type::{detect_content_type, DEFAULT_CONTENT_TYPE};
pub use error::StoreError;
pub use multipart::{choose_strategy, UploadStrategy, MULTIPART_THRESHOLD};
pub use store::ObjectStore;

#[cfg(test)]
pub use store::MockObjectStore;
