//! In-memory fakes for the storage seams (testing only)
//!
//! Provides `MemoryObjectStore`, `FixedClock`, `StaticCredentials` and
//! `NoCredentials`, which satisfy the trait contracts without network or
//! system-clock access.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::error::{CredentialsError, StorageError};
use crate::storage::*;

// ---------------------------------------------------------------------------
// MemoryObjectStore
// ---------------------------------------------------------------------------

/// In-memory object store keyed by `(bucket, key)`.
///
/// Every call is recorded, including ones that were told to fail.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<(String, String), PutObjectRequest>>,
    calls: Mutex<Vec<PutObjectRequest>>,
    fail_with: Mutex<Option<(u16, String)>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent put fail with an S3-style service error.
    pub fn failing(status: u16, code: impl Into<String>) -> Self {
        let store = Self::default();
        *store.fail_with.lock().unwrap() = Some((status, code.into()));
        store
    }

    /// Number of `put_object` calls so far.
    pub fn put_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// The stored object, if any.
    pub fn get(&self, bucket: &str, key: &str) -> Option<PutObjectRequest> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// All stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .lock()
            .unwrap()
            .keys()
            .map(|(_, key)| key.clone())
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_object(
        &self,
        _credentials: &Credentials,
        request: PutObjectRequest,
    ) -> StorageResult<()> {
        self.calls.lock().unwrap().push(request.clone());

        if let Some((status, code)) = self.fail_with.lock().unwrap().clone() {
            return Err(StorageError::Service {
                status,
                message: format!("simulated {}", code),
                code,
            });
        }

        let mut objects = self.objects.lock().unwrap();
        objects.insert((request.bucket.clone(), request.key.clone()), request);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FixedClock
// ---------------------------------------------------------------------------

/// Clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Local>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Credential providers
// ---------------------------------------------------------------------------

/// Always returns the same credentials.
#[derive(Debug, Clone)]
pub struct StaticCredentials(pub Credentials);

impl StaticCredentials {
    pub fn example() -> Self {
        StaticCredentials(Credentials::new(
            "AKIDEXAMPLE",
            "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
        ))
    }
}

impl CredentialProvider for StaticCredentials {
    fn credentials(&self) -> std::result::Result<Credentials, CredentialsError> {
        Ok(self.0.clone())
    }
}

/// Never finds credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialProvider for NoCredentials {
    fn credentials(&self) -> std::result::Result<Credentials, CredentialsError> {
        Err(CredentialsError::NotFound)
    }
}
