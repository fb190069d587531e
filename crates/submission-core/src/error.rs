//! Error types for submission-core

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by an [`ObjectStore`](crate::storage::ObjectStore) backend
#[derive(Error, Debug)]
pub enum StorageError {
    /// The storage service answered with a non-success status
    #[error("{code}: {message} (HTTP {status})")]
    Service {
        status: u16,
        code: String,
        message: String,
    },

    /// The request never produced a response
    #[error("transport failure: {0}")]
    Transport(String),

    /// The request could not be built (bad header value, bad URL, ...)
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        StorageError::Transport(err.to_string())
    }
}

/// Errors raised while discovering credentials
#[derive(Error, Debug)]
pub enum CredentialsError {
    /// No source in the discovery chain produced credentials
    #[error("no credentials found in environment or shared credentials file")]
    NotFound,

    /// A shared credentials file exists but the profile is incomplete
    #[error("profile '{profile}' in {path} is missing {field}")]
    IncompleteProfile {
        path: PathBuf,
        profile: String,
        field: &'static str,
    },

    /// IO error while reading the shared credentials file
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by [`Uploader::upload`](crate::upload::Uploader::upload)
#[derive(Error, Debug)]
pub enum UploadError {
    /// Team name was empty or absent
    #[error("Team name is required for submission")]
    MissingTeamName,

    /// Credential discovery came up empty
    #[error("AWS credentials not found. Please configure your AWS credentials.")]
    MissingCredentials(#[source] CredentialsError),

    /// The object store rejected the request
    #[error("AWS error: {0}")]
    Service(String),

    /// Anything else: unreadable file, transport failure, bad request
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl From<StorageError> for UploadError {
    fn from(err: StorageError) -> Self {
        match &err {
            StorageError::Service { .. } => UploadError::Service(err.to_string()),
            _ => UploadError::Unexpected(err.to_string()),
        }
    }
}

impl From<CredentialsError> for UploadError {
    fn from(err: CredentialsError) -> Self {
        UploadError::MissingCredentials(err)
    }
}

/// Errors raised while reading [`StoreConfig`](crate::config::StoreConfig) from the environment
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An override variable was set to an unusable value
    #[error("{var} is set but invalid: {reason}")]
    InvalidVar { var: &'static str, reason: String },
}
