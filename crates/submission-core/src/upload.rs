//! Submission upload
//!
//! Names the submission, resolves credentials and hands the file to the
//! object store. One attempt, no retries.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{error, info, instrument};

use crate::config::StoreConfig;
use crate::credentials::EnvCredentialProvider;
use crate::error::{StorageError, UploadError};
use crate::s3::S3ObjectStore;
use crate::storage::{Clock, CredentialProvider, ObjectStore, PutObjectRequest, SystemClock};
use crate::submission::SubmissionMetadata;

/// Content type attached to every submission
pub const CONTENT_TYPE: &str = "application/json";

/// What was stored, on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub bucket: String,
    pub key: String,
    pub submission: SubmissionMetadata,
    pub object_metadata: BTreeMap<String, String>,
}

impl UploadReceipt {
    /// `s3://bucket/key`
    pub fn uri(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}

/// Uploads validated answer files.
pub struct Uploader {
    config: StoreConfig,
    store: Arc<dyn ObjectStore>,
    credentials: Arc<dyn CredentialProvider>,
    clock: Arc<dyn Clock>,
}

impl Uploader {
    pub fn new(
        config: StoreConfig,
        store: Arc<dyn ObjectStore>,
        credentials: Arc<dyn CredentialProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Uploader {
            config,
            store,
            credentials,
            clock,
        }
    }

    /// Real S3 store, environment credentials, system clock.
    pub fn from_config(config: StoreConfig) -> Result<Self, StorageError> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let store = S3ObjectStore::new(config.clone())?.with_clock(clock.clone());
        Ok(Self::new(
            config,
            Arc::new(store),
            Arc::new(EnvCredentialProvider::new()),
            clock,
        ))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Upload `path` for `team_name`, optionally tagged.
    ///
    /// Every failure is logged here with its own message before being
    /// returned.
    #[instrument(skip(self), fields(bucket = %self.config.bucket))]
    pub async fn upload(
        &self,
        path: &Path,
        team_name: Option<&str>,
        tag: Option<&str>,
    ) -> Result<UploadReceipt, UploadError> {
        let result = self.try_upload(path, team_name, tag).await;
        if let Err(err) = &result {
            error!("{}", err);
        }
        result
    }

    /// Same as [`upload`](Self::upload), collapsed to a success flag.
    pub async fn submit(&self, path: &Path, team_name: Option<&str>, tag: Option<&str>) -> bool {
        self.upload(path, team_name, tag).await.is_ok()
    }

    async fn try_upload(
        &self,
        path: &Path,
        team_name: Option<&str>,
        tag: Option<&str>,
    ) -> Result<UploadReceipt, UploadError> {
        let tag = tag.filter(|t| !t.is_empty());
        let now = self.clock.now();
        let submission = SubmissionMetadata::new(team_name.unwrap_or_default(), tag, &now)
            .ok_or(UploadError::MissingTeamName)?;

        let credentials = self.credentials.credentials()?;

        let key = submission.object_key(&self.config.prefix);
        let object_metadata = submission.object_metadata();
        let body = std::fs::read(path)
            .map_err(|e| UploadError::Unexpected(format!("{}: {}", path.display(), e)))?;

        info!(
            "Uploading {} to s3://{}/{}",
            path.display(),
            self.config.bucket,
            key
        );

        self.store
            .put_object(
                &credentials,
                PutObjectRequest {
                    bucket: self.config.bucket.clone(),
                    key: key.clone(),
                    content_type: CONTENT_TYPE.to_string(),
                    metadata: object_metadata.clone(),
                    body,
                },
            )
            .await?;

        let receipt = UploadReceipt {
            bucket: self.config.bucket.clone(),
            key,
            submission,
            object_metadata,
        };
        info!("Successfully uploaded to {}", receipt.uri());
        Ok(receipt)
    }
}
