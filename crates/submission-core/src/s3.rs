//! S3 object store
//!
//! Single-request `PUT Object` over HTTPS, signed with SigV4. Virtual-hosted
//! addressing against AWS, path-style addressing against a custom endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::error::StorageError;
use crate::sigv4::{self, SigningInput};
use crate::storage::{Clock, Credentials, ObjectStore, PutObjectRequest, StorageResult, SystemClock};

const SERVICE: &str = "s3";

/// `ObjectStore` backed by Amazon S3 (or anything speaking its API)
pub struct S3ObjectStore {
    config: StoreConfig,
    http_client: reqwest::Client,
    clock: Arc<dyn Clock>,
}

impl S3ObjectStore {
    /// Create a new S3 store
    pub fn new(config: StoreConfig) -> StorageResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("upload-answers/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(S3ObjectStore {
            config,
            http_client,
            clock: Arc::new(SystemClock),
        })
    }

    /// Use a specific clock for request signing
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Host, canonical path and full URL for `bucket`/`key`.
    fn locate(&self, bucket: &str, key: &str) -> (String, String, String) {
        let encoded_key = sigv4::uri_encode_path(key);
        match &self.config.endpoint {
            Some(endpoint) => {
                let (scheme, rest) = endpoint
                    .split_once("://")
                    .unwrap_or(("https", endpoint.as_str()));
                // Only the authority is the Host; any base path goes in front of the bucket.
                let (authority, base_path) = match rest.find('/') {
                    Some(idx) => (&rest[..idx], rest[idx..].trim_end_matches('/')),
                    None => (rest, ""),
                };
                let path = format!("{}/{}/{}", base_path, bucket, encoded_key);
                let url = format!("{}://{}{}", scheme, authority, path);
                (authority.to_string(), path, url)
            }
            None => {
                let host = format!("{}.s3.{}.amazonaws.com", bucket, self.config.region);
                let path = format!("/{}", encoded_key);
                let url = format!("https://{}{}", host, path);
                (host, path, url)
            }
        }
    }
}

/// Headers to sign for a `PUT`, in insertion order.
fn put_headers(
    host: &str,
    request: &PutObjectRequest,
    credentials: &Credentials,
    payload_sha256: &str,
    amz_date: &str,
) -> Vec<(String, String)> {
    let mut headers = vec![
        ("host".to_string(), host.to_string()),
        ("content-type".to_string(), request.content_type.clone()),
        ("x-amz-content-sha256".to_string(), payload_sha256.to_string()),
        ("x-amz-date".to_string(), amz_date.to_string()),
    ];
    if let Some(token) = &credentials.session_token {
        headers.push(("x-amz-security-token".to_string(), token.clone()));
    }
    for (name, value) in &request.metadata {
        headers.push((format!("x-amz-meta-{}", name.to_ascii_lowercase()), value.clone()));
    }
    headers
}

fn to_header_map(headers: &[(String, String)]) -> StorageResult<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        // reqwest derives Host from the URL.
        if name == "host" {
            continue;
        }
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| StorageError::InvalidRequest(format!("header {}: {}", name, e)))?;
        let header_value = HeaderValue::from_bytes(value.as_bytes())
            .map_err(|e| StorageError::InvalidRequest(format!("header {}: {}", name, e)))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

/// Pull `<Code>` and `<Message>` out of an S3 XML error body.
fn parse_error_body(body: &str) -> (Option<String>, Option<String>) {
    let tag = |name: &str| {
        let open = format!("<{}>", name);
        let close = format!("</{}>", name);
        let start = body.find(&open)? + open.len();
        let end = body[start..].find(&close)? + start;
        Some(body[start..end].to_string())
    };
    (tag("Code"), tag("Message"))
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(
        &self,
        credentials: &Credentials,
        request: PutObjectRequest,
    ) -> StorageResult<()> {
        let (host, path, url) = self.locate(&request.bucket, &request.key);
        let now = self.clock.now().with_timezone(&Utc);
        let payload_sha256 = sigv4::sha256_hex(&request.body);
        let amz_date = sigv4::amz_date(&now);

        let headers = put_headers(&host, &request, credentials, &payload_sha256, &amz_date);
        let authorization = sigv4::authorization(
            credentials,
            &SigningInput {
                method: "PUT",
                canonical_uri: &path,
                headers: &headers,
                payload_sha256: &payload_sha256,
                region: &self.config.region,
                service: SERVICE,
            },
            &now,
        );

        let mut header_map = to_header_map(&headers)?;
        header_map.insert(
            reqwest::header::AUTHORIZATION,
            HeaderValue::from_str(&authorization)
                .map_err(|e| StorageError::InvalidRequest(e.to_string()))?,
        );

        debug!(url = %url, bytes = request.body.len(), "PUT object");
        let response = self
            .http_client
            .put(&url)
            .headers(header_map)
            .body(request.body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!(bucket = %request.bucket, key = %request.key, "Object stored");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let (code, message) = parse_error_body(&body);
        warn!(status = status.as_u16(), "S3 rejected PUT");
        Err(StorageError::Service {
            status: status.as_u16(),
            code: code.unwrap_or_else(|| status.as_str().to_string()),
            message: message
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_default(),
        })
    }
}
