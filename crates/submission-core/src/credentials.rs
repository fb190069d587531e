//! Credential discovery
//!
//! Resolution order:
//! 1. `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` (/ `AWS_SESSION_TOKEN`)
//! 2. Shared credentials file: `AWS_SHARED_CREDENTIALS_FILE`, else
//!    `~/.aws/credentials`, profile `AWS_PROFILE` (default: "default")

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::CredentialsError;
use crate::storage::{CredentialProvider, Credentials};

const DEFAULT_PROFILE: &str = "default";

/// Provider that walks the standard environment chain on every call.
#[derive(Debug, Clone, Default)]
pub struct EnvCredentialProvider {
    /// Overrides `AWS_SHARED_CREDENTIALS_FILE` and the home-directory default
    credentials_file: Option<PathBuf>,
    /// Overrides `AWS_PROFILE`
    profile: Option<String>,
}

impl EnvCredentialProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the shared credentials from a specific file
    pub fn with_credentials_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_file = Some(path.into());
        self
    }

    /// Use a specific profile from the shared credentials file
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Same chain as [`credentials`](CredentialProvider::credentials) with an
    /// injectable variable source.
    pub fn resolve_with<F>(&self, lookup: F) -> std::result::Result<Credentials, CredentialsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let (Some(key), Some(secret)) = (var("AWS_ACCESS_KEY_ID"), var("AWS_SECRET_ACCESS_KEY")) {
            debug!("Using credentials from environment variables");
            let creds = Credentials::new(key, secret);
            return Ok(match var("AWS_SESSION_TOKEN") {
                Some(token) => creds.with_session_token(token),
                None => creds,
            });
        }

        let path = match &self.credentials_file {
            Some(path) => Some(path.clone()),
            None => var("AWS_SHARED_CREDENTIALS_FILE").map(PathBuf::from).or_else(|| {
                directories::BaseDirs::new()
                    .map(|dirs| dirs.home_dir().join(".aws").join("credentials"))
            }),
        };
        let Some(path) = path else {
            return Err(CredentialsError::NotFound);
        };
        if !path.exists() {
            debug!(path = %path.display(), "No shared credentials file");
            return Err(CredentialsError::NotFound);
        }

        let profile = self
            .profile
            .clone()
            .or_else(|| var("AWS_PROFILE"))
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string());
        let creds = load_profile(&path, &profile)?;
        debug!(path = %path.display(), profile = %profile, "Using shared credentials file");
        Ok(creds)
    }
}

impl CredentialProvider for EnvCredentialProvider {
    fn credentials(&self) -> std::result::Result<Credentials, CredentialsError> {
        self.resolve_with(|var| std::env::var(var).ok())
    }
}

/// Load `profile` from an INI-style shared credentials file.
pub fn load_profile(path: &Path, profile: &str) -> std::result::Result<Credentials, CredentialsError> {
    let text = std::fs::read_to_string(path).map_err(|source| CredentialsError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let sections = parse_ini(&text);
    let Some(section) = sections.get(profile) else {
        return Err(CredentialsError::NotFound);
    };

    let field = |name: &'static str| {
        section
            .get(name)
            .filter(|v| !v.is_empty())
            .cloned()
            .ok_or_else(|| CredentialsError::IncompleteProfile {
                path: path.to_path_buf(),
                profile: profile.to_string(),
                field: name,
            })
    };

    let mut creds = Credentials::new(field("aws_access_key_id")?, field("aws_secret_access_key")?);
    if let Some(token) = section.get("aws_session_token").filter(|v| !v.is_empty()) {
        creds = creds.with_session_token(token.clone());
    }
    Ok(creds)
}

/// Section name -> (key -> value). Keys are lower-cased; `#`/`;` start comments.
fn parse_ini(text: &str) -> HashMap<String, HashMap<String, String>> {
    let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let name = name.trim().to_string();
            sections.entry(name.clone()).or_default();
            current = Some(name);
            continue;
        }
        if let (Some(section), Some((key, value))) = (&current, line.split_once('=')) {
            sections
                .entry(section.clone())
                .or_default()
                .insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    sections
}
