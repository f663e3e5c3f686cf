//! Pre-flight permission check.
//!
//! Writes a small canary object and deletes it again so missing credentials
//! or bucket policies surface before any site file is touched.

use tracing::{info, warn};

use crate::s3::{ObjectStore, StoreError};

/// Key of the canary object
pub const PROBE_KEY: &str = "permission_check.txt";

/// Body of the canary object
pub const PROBE_BODY: &[u8] = b"test";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Canary was written and removed
    Passed,
    /// The backend answered AccessDenied to the put or the delete
    Denied { bucket: String, message: String },
}

impl ProbeOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// Put then delete the canary object.
///
/// An access-denied answer is an outcome, not an error: the caller decides
/// whether to keep going. Every other backend failure is returned as `Err`.
pub async fn check_permissions<S>(store: &S) -> Result<ProbeOutcome, StoreError>
where
    S: ObjectStore + ?Sized,
{
    info!("Starting permissions check...");

    match put_and_delete(store).await {
        Ok(()) => {
            info!("Permission check passed: able to write to the bucket");
            Ok(ProbeOutcome::Passed)
        }
        Err(StoreError::AccessDenied { bucket, message }) => {
            warn!("Permission check failed: Access Denied ({})", message);
            Ok(ProbeOutcome::Denied { bucket, message })
        }
        Err(e) => Err(e),
    }
}

async fn put_and_delete<S>(store: &S) -> Result<(), StoreError>
where
    S: ObjectStore + ?Sized,
{
    store.put_object(PROBE_KEY, PROBE_BODY).await?;
    store.delete_object(PROBE_KEY).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::s3::MockObjectStore;
    use mockall::Sequence;

    fn denied() -> StoreError {
        StoreError::AccessDenied {
            bucket: "site".into(),
            message: "Access Denied".into(),
        }
    }

    #[tokio::test]
    async fn test_probe_writes_then_deletes_canary() {
        let mut store = MockObjectStore::new();
        let mut seq = Sequence::new();

        store
            .expect_put_object()
            .withf(|key, body| key == PROBE_KEY && body == b"test")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        store
            .expect_delete_object()
            .withf(|key| key == PROBE_KEY)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let outcome = check_permissions(&store).await.unwrap();
        assert_eq!(outcome, ProbeOutcome::Passed);
    }

    #[tokio::test]
    async fn test_probe_put_denied_is_an_outcome() {
        let mut store = MockObjectStore::new();
        store
            .expect_put_object()
            .times(1)
            .returning(|_, _| Err(denied()));
        store.expect_delete_object().never();

        let outcome = check_permissions(&store).await.unwrap();
        assert!(matches!(outcome, ProbeOutcome::Denied { ref bucket, .. } if bucket == "site"));
        assert!(!outcome.is_passed());
    }

    #[tokio::test]
    async fn test_probe_delete_denied_is_an_outcome() {
        let mut store = MockObjectStore::new();
        store.expect_put_object().returning(|_, _| Ok(()));
        store
            .expect_delete_object()
            .times(1)
            .returning(|_| Err(denied()));

        let outcome = check_permissions(&store).await.unwrap();
        assert!(!outcome.is_passed());
    }

    #[tokio::test]
    async fn test_probe_other_failure_is_an_error() {
        let mut store = MockObjectStore::new();
        store.expect_put_object().returning(|_, _| {
            Err(StoreError::Backend {
                message: "NoSuchBucket".into(),
            })
        });
        store.expect_delete_object().never();

        let err = check_permissions(&store).await.unwrap_err();
        assert!(matches!(err, StoreError::Backend { .. }));
    }
}
