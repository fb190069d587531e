//! Answer-file validation
//!
//! An answer file is JSONL: one JSON object per non-blank line, each carrying
//! `question`, `options` and `answer_letter`. [`validate_file`] scans every
//! line and collects all problems instead of stopping at the first one.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// Fields every answer record must carry, in reporting order.
pub const REQUIRED_FIELDS: [&str; 3] = ["question", "options", "answer_letter"];

// Anchored at the start only, so "Because" passes.
static ANSWER_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ABCDE]").expect("static pattern"));

/// A single problem found in an answer file.
///
/// `Display` renders the exact message shown to participants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// Path does not exist
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Path exists but could not be read as UTF-8 text
    #[error("Error reading file: {reason}")]
    Unreadable { reason: String },

    /// No lines, or nothing but blank lines
    #[error("File is empty")]
    Empty,

    /// Line is not a JSON object
    #[error("Line {line}: Invalid JSON - {reason}")]
    InvalidJson { line: usize, reason: String },

    /// `question` + `options` repeats an earlier line
    #[error("Line {line}: Question already seen, only the first instance of each question is evaluated")]
    DuplicateQuestion { line: usize },

    /// A required field is absent
    #[error("Line {line}: Missing required field '{field}'")]
    MissingField { line: usize, field: &'static str },

    /// `answer_letter` is present but not a string
    #[error("Line {line}: answer_letter must be a string")]
    AnswerLetterNotString { line: usize },

    /// `answer_letter` does not start with A-E
    #[error("Line {line}: answer_letter must be in format [A|B|C|D|E], got: {value}")]
    MalformedAnswerLetter { line: usize, value: String },
}

impl ValidationIssue {
    /// 1-based line number, if the issue belongs to a line.
    pub fn line(&self) -> Option<usize> {
        match self {
            ValidationIssue::InvalidJson { line, .. }
            | ValidationIssue::DuplicateQuestion { line }
            | ValidationIssue::MissingField { line, .. }
            | ValidationIssue::AnswerLetterNotString { line }
            | ValidationIssue::MalformedAnswerLetter { line, .. } => Some(*line),
            ValidationIssue::FileNotFound { .. }
            | ValidationIssue::Unreadable { .. }
            | ValidationIssue::Empty => None,
        }
    }
}

/// Outcome of validating one answer file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    /// Issues in the order they were found
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    fn fatal(issue: ValidationIssue) -> Self {
        ValidationResult {
            issues: vec![issue],
        }
    }

    /// True iff no issue was found.
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Human-readable messages, one per issue.
    pub fn errors(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }
}

/// Validate the answer file at `path`.
pub fn validate_file(path: &Path) -> ValidationResult {
    if !path.exists() {
        return ValidationResult::fatal(ValidationIssue::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            return ValidationResult::fatal(ValidationIssue::Unreadable {
                reason: err.to_string(),
            })
        }
    };

    validate_str(&content)
}

/// Validate JSONL content already in memory.
pub fn validate_str(content: &str) -> ValidationResult {
    if content.lines().all(|line| line.trim().is_empty()) {
        return ValidationResult::fatal(ValidationIssue::Empty);
    }

    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }

        let record = match parse_record(trimmed) {
            Ok(record) => record,
            Err(reason) => {
                issues.push(ValidationIssue::InvalidJson { line, reason });
                continue;
            }
        };

        let key = composite_key(&record);
        if let Some(key) = &key {
            if seen.contains(key) {
                issues.push(ValidationIssue::DuplicateQuestion { line });
                continue;
            }
        }

        check_record(line, &record, &mut issues);

        if let Some(key) = key {
            seen.insert(key);
        }
    }

    debug!(
        issues = issues.len(),
        unique_questions = seen.len(),
        "Validated answer content"
    );

    ValidationResult { issues }
}

fn parse_record(line: &str) -> std::result::Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(line) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("expected a JSON object".to_string()),
        Err(err) => Err(err.to_string()),
    }
}

fn check_record(line: usize, record: &Map<String, Value>, issues: &mut Vec<ValidationIssue>) {
    for field in REQUIRED_FIELDS {
        if !record.contains_key(field) {
            issues.push(ValidationIssue::MissingField { line, field });
        }
    }

    match record.get("answer_letter") {
        None => {}
        Some(Value::String(letter)) => {
            if !ANSWER_LETTER.is_match(letter) {
                issues.push(ValidationIssue::MalformedAnswerLetter {
                    line,
                    value: letter.clone(),
                });
            }
        }
        Some(_) => issues.push(ValidationIssue::AnswerLetterNotString { line }),
    }
}

/// `question` followed by `options`, or `None` when either is missing.
///
/// Strings contribute their text; any other JSON value contributes its
/// compact serialization.
fn composite_key(record: &Map<String, Value>) -> Option<String> {
    let question = record.get("question")?;
    let options = record.get("options")?;
    Some(format!("{}{}", flatten(question), flatten(options)))
}

fn flatten(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(question: &str, options: &str, letter: &str) -> String {
        serde_json::json!({
            "question": question,
            "options": options,
            "answer_letter": letter,
        })
        .to_string()
    }

    #[test]
    fn test_valid_content_has_no_issues() {
        let content = [
            record("Q1", "A) x B) y", "A"),
            record("Q2", "A) x B) y", "B"),
            record("Q3", "A) x B) y", "E"),
        ]
        .join("\n");

        let result = validate_str(&content);
        assert!(result.is_valid());
        assert!(result.errors().is_empty());
    }

    #[test]
    fn test_only_blank_lines_is_empty() {
        let result = validate_str("\n   \n\t\n");
        assert_eq!(result.issues, vec![ValidationIssue::Empty]);
        assert_eq!(result.errors(), vec!["File is empty".to_string()]);
    }

    #[test]
    fn test_blank_lines_count_towards_line_numbers() {
        let content = format!("{}\n\n{}", record("Q1", "o", "A"), record("Q2", "o", "F"));
        let result = validate_str(&content);
        assert_eq!(
            result.errors(),
            vec!["Line 3: answer_letter must be in format [A|B|C|D|E], got: F".to_string()]
        );
    }

    #[test]
    fn test_answer_letter_f_is_single_issue() {
        let content = format!("{}\n{}", record("Q1", "o", "A"), record("Q2", "o", "F"));
        let result = validate_str(&content);
        assert!(!result.is_valid());
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].line(), Some(2));
    }

    #[test]
    fn test_answer_letter_prefix_match_is_loose() {
        let result = validate_str(&record("Q1", "o", "Because"));
        assert!(result.is_valid());

        let result = validate_str(&record("Q1", "o", "a"));
        assert!(!result.is_valid());
    }

    #[test]
    fn test_answer_letter_must_be_string() {
        let line = r#"{"question": "Q", "options": "o", "answer_letter": 1}"#;
        let result = validate_str(line);
        assert_eq!(
            result.issues,
            vec![ValidationIssue::AnswerLetterNotString { line: 1 }]
        );
    }

    #[test]
    fn test_missing_fields_each_reported() {
        let result = validate_str(r#"{"question": "Q"}"#);
        assert_eq!(
            result.errors(),
            vec![
                "Line 1: Missing required field 'options'".to_string(),
                "Line 1: Missing required field 'answer_letter'".to_string(),
            ]
        );
    }

    #[test]
    fn test_invalid_json_continues_scan() {
        let content = format!("{{not json\n{}\n[1, 2]", record("Q1", "o", "Z"));
        let result = validate_str(&content);
        let errors = result.errors();

        assert_eq!(errors.len(), 3);
        assert!(errors[0].starts_with("Line 1: Invalid JSON - "));
        assert_eq!(
            errors[1],
            "Line 2: answer_letter must be in format [A|B|C|D|E], got: Z"
        );
        assert_eq!(errors[2], "Line 3: Invalid JSON - expected a JSON object");
    }

    #[test]
    fn test_duplicate_reported_on_second_occurrence_only() {
        let content = [
            record("Q1", "o", "A"),
            record("Q1", "o", "B"),
            record("Q1", "o", "C"),
        ]
        .join("\n");

        let result = validate_str(&content);
        assert_eq!(
            result.issues,
            vec![
                ValidationIssue::DuplicateQuestion { line: 2 },
                ValidationIssue::DuplicateQuestion { line: 3 },
            ]
        );
    }

    #[test]
    fn test_duplicate_skips_field_checks() {
        let content = format!("{}\n{}", record("Q1", "o", "A"), record("Q1", "o", "F"));
        let result = validate_str(&content);
        assert_eq!(
            result.issues,
            vec![ValidationIssue::DuplicateQuestion { line: 2 }]
        );
    }

    #[test]
    fn test_invalid_record_still_marks_question_seen() {
        let content = format!("{}\n{}", record("Q1", "o", "F"), record("Q1", "o", "A"));
        let result = validate_str(&content);
        assert_eq!(result.issues.len(), 2);
        assert_eq!(
            result.issues[1],
            ValidationIssue::DuplicateQuestion { line: 2 }
        );
    }

    #[test]
    fn test_same_question_different_options_is_not_duplicate() {
        let content = format!("{}\n{}", record("Q1", "o1", "A"), record("Q1", "o2", "A"));
        assert!(validate_str(&content).is_valid());
    }

    #[test]
    fn test_array_options_form_composite_key() {
        let content = [
            r#"{"question": "Q", "options": ["x", "y"], "answer_letter": "A"}"#,
            r#"{"question": "Q", "options": ["x", "y"], "answer_letter": "B", "extra": 1}"#,
        ]
        .join("\n");

        let result = validate_str(&content);
        assert_eq!(
            result.issues,
            vec![ValidationIssue::DuplicateQuestion { line: 2 }]
        );
    }

    #[test]
    fn test_missing_file() {
        let result = validate_file(Path::new("/definitely/not/here.jsonl"));
        assert_eq!(result.issues.len(), 1);
        assert!(matches!(
            result.issues[0],
            ValidationIssue::FileNotFound { .. }
        ));
    }
}
