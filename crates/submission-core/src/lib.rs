//! Submission-Core: answer-file validation and upload for the hackathon platform
//!
//! A submission is a JSONL file of answer records. This crate checks the file
//! against the answer schema and stores it in the results bucket under a
//! team-scoped, timestamped key.
//!
//! ## Key Components
//!
//! - `validate_file`: line-by-line schema and duplicate checks
//! - `SubmissionMetadata`: team/tag normalization and object-key naming
//! - `Uploader`: credential lookup plus a single signed `PUT`
//! - `ObjectStore` / `CredentialProvider` / `Clock`: seams, with in-memory
//!   fakes in the `fakes` module

pub mod config;
pub mod credentials;
mod error;
pub mod fakes;
pub mod s3;
pub mod sigv4;
pub mod storage;
pub mod submission;
pub mod telemetry;
pub mod upload;
pub mod validate;

pub use config::StoreConfig;
pub use credentials::EnvCredentialProvider;
pub use error::{ConfigError, CredentialsError, StorageError, UploadError};
pub use s3::S3ObjectStore;
pub use storage::{
    Clock, CredentialProvider, Credentials, ObjectStore, PutObjectRequest, StorageResult,
    SystemClock,
};
pub use submission::{sanitize, SubmissionMetadata};
pub use telemetry::init_tracing;
pub use upload::{UploadReceipt, Uploader};
pub use validate::{validate_file, validate_str, ValidationIssue, ValidationResult};
