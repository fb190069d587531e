//! Seams between submission logic and the outside world
//!
//! - `ObjectStore`: where submission bytes go (S3 in production)
//! - `CredentialProvider`: where signing credentials come from
//! - `Clock`: what time it is
//!
//! Real implementations live in `s3`, `credentials` and here (`SystemClock`);
//! in-memory fakes for tests live in the `fakes` module.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::error::{CredentialsError, StorageError};

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Static signing credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    /// Attach a temporary session token
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }
}

// Secrets stay out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Source of signing credentials.
pub trait CredentialProvider: Send + Sync {
    /// Resolve credentials, or explain why none are available.
    fn credentials(&self) -> std::result::Result<Credentials, CredentialsError>;
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// The system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

// ---------------------------------------------------------------------------
// ObjectStore
// ---------------------------------------------------------------------------

/// A single object write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObjectRequest {
    pub bucket: String,
    pub key: String,
    pub content_type: String,
    /// User metadata, sent as `x-amz-meta-<name>` headers
    pub metadata: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

/// Remote blob store addressed by bucket and key.
///
/// Guarantees:
/// - `put_object` either stores the whole body under the key or fails.
/// - No retries happen inside the store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write one object using the supplied credentials.
    async fn put_object(
        &self,
        credentials: &Credentials,
        request: PutObjectRequest,
    ) -> StorageResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_redacts_secrets() {
        let creds = Credentials::new("AKIDEXAMPLE", "super-secret").with_session_token("tok");
        let rendered = format!("{:?}", creds);

        assert!(rendered.contains("AKIDEXAMPLE"));
        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("\"tok\""));
    }
}
