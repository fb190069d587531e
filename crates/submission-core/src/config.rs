//! Destination configuration
//!
//! The results bucket and root prefix are fixed for the hackathon; the
//! environment can override them for staging or S3-compatible test servers.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Results bucket for hackathon submissions
pub const DEFAULT_BUCKET: &str = "709747128509-hackathon-results";

/// Root prefix prepended to every object key
pub const DEFAULT_PREFIX: &str = "/";

/// Region used when neither `AWS_REGION` nor `AWS_DEFAULT_REGION` is set
pub const DEFAULT_REGION: &str = "us-east-1";

/// Where submissions are stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Bucket name
    pub bucket: String,
    /// Prefix prepended verbatim to every key
    pub prefix: String,
    /// AWS region used for signing and the default endpoint
    pub region: String,
    /// Custom endpoint (path-style addressing); `None` means AWS S3
    pub endpoint: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            bucket: DEFAULT_BUCKET.to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
            region: DEFAULT_REGION.to_string(),
            endpoint: None,
        }
    }
}

impl StoreConfig {
    /// Create from environment variables
    ///
    /// Reads:
    /// - HACKATHON_S3_BUCKET (optional, default: the results bucket)
    /// - HACKATHON_S3_PREFIX (optional, default: "/")
    /// - HACKATHON_S3_ENDPOINT (optional, must start with http:// or https://)
    /// - AWS_REGION, then AWS_DEFAULT_REGION (optional, default: "us-east-1")
    pub fn from_env() -> std::result::Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> std::result::Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let bucket = non_empty("HACKATHON_S3_BUCKET").unwrap_or(defaults.bucket);
        let prefix = lookup("HACKATHON_S3_PREFIX").unwrap_or(defaults.prefix);
        let region = non_empty("AWS_REGION")
            .or_else(|| non_empty("AWS_DEFAULT_REGION"))
            .unwrap_or(defaults.region);

        let endpoint = match non_empty("HACKATHON_S3_ENDPOINT") {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
                Some(url.trim_end_matches('/').to_string())
            }
            Some(url) => {
                return Err(ConfigError::InvalidVar {
                    var: "HACKATHON_S3_ENDPOINT",
                    reason: format!("'{}' is not an http(s) URL", url),
                })
            }
            None => None,
        };

        Ok(StoreConfig {
            bucket,
            prefix,
            region,
            endpoint,
        })
    }

    /// Set custom endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set custom region
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }
}
