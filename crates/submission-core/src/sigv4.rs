//! AWS Signature Version 4 for single S3 requests
//!
//! Only what a header-signed `PUT` without query parameters needs.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::storage::Credentials;

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// A request about to be signed.
///
/// `headers` must already contain every header to sign (including `host`,
/// `x-amz-date` and `x-amz-content-sha256`); names are lower-cased here.
#[derive(Debug, Clone)]
pub struct SigningInput<'a> {
    pub method: &'a str,
    /// Already URI-encoded path, starting with `/`
    pub canonical_uri: &'a str,
    pub headers: &'a [(String, String)],
    pub payload_sha256: &'a str,
    pub region: &'a str,
    pub service: &'a str,
}

/// Hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// `20250314T092653Z`
pub fn amz_date(at: &DateTime<Utc>) -> String {
    at.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Percent-encode a key for the canonical URI, keeping `/`.
pub fn uri_encode_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for byte in path.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{:02X}", other)),
        }
    }
    out
}

fn hmac(key: &[u8], data: &str) -> Vec<u8> {
    // HMAC accepts keys of any length.
    let mut mac = HmacSha256::new_from_slice(key).expect("hmac key of any size");
    mac.update(data.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

/// Derive the per-day signing key.
pub fn signing_key(secret: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac(format!("AWS4{}", secret).as_bytes(), date);
    let k_region = hmac(&k_date, region);
    let k_service = hmac(&k_region, service);
    hmac(&k_service, "aws4_request")
}

/// Trim the value and collapse each inner run of whitespace to one space.
fn trim_all(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn canonical_headers(headers: &[(String, String)]) -> (String, String) {
    let mut normalized: Vec<(String, String)> = headers
        .iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), trim_all(value)))
        .collect();
    normalized.sort();

    let canonical = normalized
        .iter()
        .map(|(name, value)| format!("{}:{}\n", name, value))
        .collect::<String>();
    let signed = normalized
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";");
    (canonical, signed)
}

/// Canonical request and the signed-headers list.
pub fn canonical_request(input: &SigningInput<'_>) -> (String, String) {
    let (headers, signed) = canonical_headers(input.headers);
    let request = format!(
        "{}\n{}\n\n{}\n{}\n{}",
        input.method, input.canonical_uri, headers, signed, input.payload_sha256
    );
    (request, signed)
}

/// Value for the `Authorization` header.
pub fn authorization(credentials: &Credentials, input: &SigningInput<'_>, at: &DateTime<Utc>) -> String {
    let date = at.format("%Y%m%d").to_string();
    let scope = format!("{}/{}/{}/aws4_request", date, input.region, input.service);
    let (request, signed_headers) = canonical_request(input);

    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        amz_date(at),
        scope,
        sha256_hex(request.as_bytes())
    );
    let key = signing_key(
        &credentials.secret_access_key,
        &date,
        input.region,
        input.service,
    );
    let signature = hex::encode(hmac(&key, &string_to_sign));

    format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        ALGORITHM, credentials.access_key_id, scope, signed_headers, signature
    )
}
