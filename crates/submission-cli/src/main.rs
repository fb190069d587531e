//! Hackathon answer upload CLI
//!
//! The `upload-answers` command validates a JSONL answer file and submits it
//! to the results bucket.
//!
//! ## Outcomes
//!
//! - validation fails: errors are logged, exit code 1
//! - `--validate-only`: confirmation printed, exit code 0, nothing uploaded
//! - upload attempted: exit code 0 on success, 1 on failure

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use submission_core::{validate_file, StoreConfig, UploadReceipt, Uploader};
use tracing::{error, info, Level};

#[derive(Parser, Debug)]
#[command(name = "upload-answers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Upload hackathon answers to S3", long_about = None)]
struct Cli {
    /// Path to the JSONL file to upload
    file: PathBuf,

    /// Team name for the submission (required)
    #[arg(long)]
    team_name: String,

    /// Optional tag to distinguish different submissions (e.g., model name)
    #[arg(long)]
    tag: Option<String>,

    /// Only validate the file, do not upload
    #[arg(long)]
    validate_only: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

/// Terminal state of one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    ValidationFailed,
    Validated,
    Uploaded,
    UploadFailed,
}

impl Outcome {
    fn exit_code(self) -> ExitCode {
        match self {
            Outcome::Validated | Outcome::Uploaded => ExitCode::SUCCESS,
            Outcome::ValidationFailed | Outcome::UploadFailed => ExitCode::FAILURE,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    submission_core::init_tracing(cli.json, level);

    let config = StoreConfig::from_env().context("Invalid storage configuration")?;
    let uploader = Uploader::from_config(config).context("Failed to create S3 client")?;

    Ok(run(&cli, &uploader).await.exit_code())
}

async fn run(cli: &Cli, uploader: &Uploader) -> Outcome {
    info!("Validating file: {}", cli.file.display());
    let result = validate_file(&cli.file);

    if !result.is_valid() {
        error!("File validation failed:");
        for message in result.errors() {
            error!("  - {}", message);
        }
        return Outcome::ValidationFailed;
    }

    info!("✓ File validation passed");

    if cli.validate_only {
        println!("✓ File is valid and ready for upload");
        return Outcome::Validated;
    }

    match uploader
        .upload(&cli.file, Some(&cli.team_name), cli.tag.as_deref())
        .await
    {
        Ok(receipt) => {
            println!("✓ Upload successful!");
            for line in upload_summary(cli, &receipt) {
                println!("  {}", line);
            }
            Outcome::Uploaded
        }
        Err(_) => {
            println!("✗ Upload failed!");
            Outcome::UploadFailed
        }
    }
}

/// Lines printed under the success banner. An empty tag is not shown.
fn upload_summary(cli: &Cli, receipt: &UploadReceipt) -> Vec<String> {
    let mut lines = vec![
        format!("File: {}", cli.file.display()),
        format!("Bucket: s3://{}", receipt.bucket),
        format!("Team: {}", cli.team_name),
    ];
    if let Some(tag) = cli.tag.as_deref().filter(|t| !t.is_empty()) {
        lines.push(format!("Tag: {}", tag));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use submission_core::fakes::{MemoryObjectStore, NoCredentials, StaticCredentials};
    use submission_core::{CredentialProvider, SystemClock};
    use tempfile::TempDir;

    const VALID: &str = "{\"question\":\"Q1\",\"options\":\"o\",\"answer_letter\":\"A\"}\n\
                         {\"question\":\"Q2\",\"options\":\"o\",\"answer_letter\":\"B\"}\n";

    fn write(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("answers.jsonl");
        std::fs::write(&path, content).unwrap();
        path
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("upload-answers").chain(args.iter().copied())).unwrap()
    }

    fn uploader(store: Arc<MemoryObjectStore>, creds: Arc<dyn CredentialProvider>) -> Uploader {
        Uploader::new(StoreConfig::default(), store, creds, Arc::new(SystemClock))
    }

    #[test]
    fn test_team_name_is_required() {
        let err = Cli::try_parse_from(["upload-answers", "answers.jsonl"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_parse_all_flags() {
        let cli = parse(&[
            "answers.jsonl",
            "--team-name",
            "blue team",
            "--tag",
            "gpt-4",
            "--validate-only",
        ]);
        assert_eq!(cli.file, PathBuf::from("answers.jsonl"));
        assert_eq!(cli.team_name, "blue team");
        assert_eq!(cli.tag.as_deref(), Some("gpt-4"));
        assert!(cli.validate_only);
        assert!(!cli.json);
    }

    #[tokio::test]
    async fn test_validate_only_never_uploads() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, VALID);
        let store = Arc::new(MemoryObjectStore::new());
        let up = uploader(store.clone(), Arc::new(StaticCredentials::example()));

        let cli = parse(&[path.to_str().unwrap(), "--team-name", "red", "--validate-only"]);
        let outcome = run(&cli, &up).await;

        assert_eq!(outcome, Outcome::Validated);
        assert_eq!(store.put_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_file_exits_nonzero_without_upload() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "{\"question\":\"Q1\",\"options\":\"o\",\"answer_letter\":\"F\"}\n");
        let store = Arc::new(MemoryObjectStore::new());
        let up = uploader(store.clone(), Arc::new(StaticCredentials::example()));

        let cli = parse(&[path.to_str().unwrap(), "--team-name", "red"]);
        let outcome = run(&cli, &up).await;

        assert_eq!(outcome, Outcome::ValidationFailed);
        assert_eq!(store.put_count(), 0);
    }

    #[tokio::test]
    async fn test_valid_file_is_uploaded() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, VALID);
        let store = Arc::new(MemoryObjectStore::new());
        let up = uploader(store.clone(), Arc::new(StaticCredentials::example()));

        let cli = parse(&[path.to_str().unwrap(), "--team-name", "red", "--tag", "run 1"]);
        let outcome = run(&cli, &up).await;

        assert_eq!(outcome, Outcome::Uploaded);
        assert_eq!(store.put_count(), 1);
        let keys = store.keys();
        assert!(keys[0].starts_with("/Red/run_1_"));
        assert!(keys[0].ends_with(".jsonl"));
    }

    #[tokio::test]
    async fn test_upload_failure_exits_nonzero() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, VALID);
        let store = Arc::new(MemoryObjectStore::new());
        let up = uploader(store.clone(), Arc::new(NoCredentials));

        let cli = parse(&[path.to_str().unwrap(), "--team-name", "red"]);
        let outcome = run(&cli, &up).await;

        assert_eq!(outcome, Outcome::UploadFailed);
        assert_eq!(store.put_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_tag_is_treated_as_absent() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, VALID);
        let store = Arc::new(MemoryObjectStore::new());
        let up = uploader(store.clone(), Arc::new(StaticCredentials::example()));

        let cli = parse(&[path.to_str().unwrap(), "--team-name", "red", "--tag", ""]);
        let receipt = up
            .upload(&cli.file, Some(&cli.team_name), cli.tag.as_deref())
            .await
            .unwrap();

        assert!(receipt.key.starts_with("/Red/submission_"));
        let lines = upload_summary(&cli, &receipt);
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| !l.starts_with("Tag:")));
    }

    #[tokio::test]
    async fn test_summary_shows_tag() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, VALID);
        let store = Arc::new(MemoryObjectStore::new());
        let up = uploader(store.clone(), Arc::new(StaticCredentials::example()));

        let cli = parse(&[path.to_str().unwrap(), "--team-name", "red", "--tag", "gpt-4"]);
        let receipt = up
            .upload(&cli.file, Some(&cli.team_name), cli.tag.as_deref())
            .await
            .unwrap();

        let lines = upload_summary(&cli, &receipt);
        assert_eq!(lines.last().map(String::as_str), Some("Tag: gpt-4"));
        assert_eq!(
            lines[1],
            "Bucket: s3://709747128509-hackathon-results"
        );
    }
}
