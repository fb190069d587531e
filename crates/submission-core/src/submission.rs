//! Submission metadata and destination key construction

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{DateTime, TimeZone};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// `strftime` pattern for submission timestamps (`20250314_092653`).
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Filename stem used when no tag is given.
pub const DEFAULT_STEM: &str = "submission";

/// Metadata `tag` value used when no tag is given.
pub const DEFAULT_TAG: &str = "default";

/// Value of the `file_type` metadata entry.
pub const FILE_TYPE: &str = "hackathon_answers";

static UNSAFE_KEY_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9_-]").expect("static pattern"));

/// Everything needed to name and label one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionMetadata {
    /// Team name with its first character upper-cased
    pub team_name: String,
    pub tag: Option<String>,
    /// Formatted with [`TIMESTAMP_FORMAT`]
    pub timestamp: String,
}

impl SubmissionMetadata {
    /// Build metadata for `team_name` at `now`.
    ///
    /// Returns `None` when the team name is empty. An empty tag counts as no tag.
    pub fn new<Tz>(team_name: &str, tag: Option<&str>, now: &DateTime<Tz>) -> Option<Self>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        if team_name.is_empty() {
            return None;
        }
        Some(Self {
            team_name: capitalize_first(team_name),
            tag: tag.filter(|t| !t.is_empty()).map(str::to_string),
            timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
        })
    }

    /// `<prefix><team>/<tag or "submission">_<timestamp>.jsonl`, sanitized.
    pub fn object_key(&self, prefix: &str) -> String {
        let stem = self
            .tag
            .as_deref()
            .map(sanitize)
            .unwrap_or_else(|| DEFAULT_STEM.to_string());
        format!(
            "{}{}/{}_{}.jsonl",
            prefix,
            sanitize(&self.team_name),
            stem,
            self.timestamp
        )
    }

    /// User metadata attached to the stored object.
    pub fn object_metadata(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("team_name".to_string(), self.team_name.clone()),
            (
                "tag".to_string(),
                self.tag.clone().unwrap_or_else(|| DEFAULT_TAG.to_string()),
            ),
            ("submission_time".to_string(), self.timestamp.clone()),
            ("file_type".to_string(), FILE_TYPE.to_string()),
        ])
    }
}

/// Replace every character outside `[A-Za-z0-9_-]` with `_`.
pub fn sanitize(value: &str) -> String {
    UNSAFE_KEY_CHARS.replace_all(value, "_").into_owned()
}

/// Upper-case the first character, leaving the rest untouched.
pub fn capitalize_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn at_pi_day() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap()
    }

    #[test]
    fn test_capitalize_first() {
        assert_eq!(capitalize_first("blue team"), "Blue team");
        assert_eq!(capitalize_first("RED"), "RED");
        assert_eq!(capitalize_first("ßigma"), "SSigma");
        assert_eq!(capitalize_first(""), "");
    }

    #[test]
    fn test_sanitize_replaces_each_char() {
        assert_eq!(sanitize("gpt-4!"), "gpt-4_");
        assert_eq!(sanitize("a b/c.d"), "a_b_c_d");
        assert_eq!(sanitize("ok_Name-1"), "ok_Name-1");
        assert_eq!(sanitize("é"), "_");
    }

    #[test]
    fn test_empty_team_name_rejected() {
        assert!(SubmissionMetadata::new("", None, &at_pi_day()).is_none());
    }

    #[test]
    fn test_key_without_tag() {
        let meta = SubmissionMetadata::new("blue team", None, &at_pi_day()).unwrap();
        assert_eq!(meta.timestamp, "20250314_092653");
        assert_eq!(
            meta.object_key("/"),
            "/Blue_team/submission_20250314_092653.jsonl"
        );
    }

    #[test]
    fn test_empty_tag_is_no_tag() {
        let meta = SubmissionMetadata::new("red", Some(""), &at_pi_day()).unwrap();
        assert_eq!(meta.tag, None);
        assert_eq!(meta.object_key("/"), "/Red/submission_20250314_092653.jsonl");
        assert_eq!(meta.object_metadata()["tag"], "default");
    }

    #[test]
    fn test_key_with_tag() {
        let meta = SubmissionMetadata::new("red", Some("gpt-4!"), &at_pi_day()).unwrap();
        assert_eq!(
            meta.object_key("/"),
            "/Red/gpt-4__20250314_092653.jsonl"
        );
    }

    #[test]
    fn test_metadata_keeps_unsanitized_team_name() {
        let meta = SubmissionMetadata::new("blue team", None, &at_pi_day()).unwrap();
        let md = meta.object_metadata();

        assert_eq!(md["team_name"], "Blue team");
        assert_eq!(md["tag"], "default");
        assert_eq!(md["submission_time"], "20250314_092653");
        assert_eq!(md["file_type"], "hackathon_answers");
    }

    #[test]
    fn test_metadata_keeps_raw_tag() {
        let meta = SubmissionMetadata::new("red", Some("gpt-4!"), &at_pi_day()).unwrap();
        assert_eq!(meta.object_metadata()["tag"], "gpt-4!");
    }
}
