//! Candidate extraction: projects a raw `ScoreResult` into a `CandidateRecord`.
//!
//! The scorer does not fix where a candidate's identity lives. Each locator
//! below knows one shape; they are tried in order and the first one that finds
//! an object is used, even if that object lacks a name or email.

use serde_json::{Map, Value};

use crate::models::evaluation::CandidateRecord;

pub const UNKNOWN_NAME: &str = "Unknown";
pub const NO_EMAIL: &str = "No email provided";

const PERSONAL_INFO: &str = "Personal Information";

type Locator = fn(&Value) -> Option<&Map<String, Value>>;

/// Ordered identity locators. Order matters: the first hit wins.
const LOCATORS: &[(&str, Locator)] = &[
    ("personal_information", personal_information),
    ("nested_resume", nested_resume),
    ("snake_case_personal_information", snake_case_personal_information),
    ("root", root),
];

fn personal_information(data: &Value) -> Option<&Map<String, Value>> {
    data.get(PERSONAL_INFO)?.as_object()
}

fn nested_resume(data: &Value) -> Option<&Map<String, Value>> {
    data.get("resume")?.get(PERSONAL_INFO)?.as_object()
}

fn snake_case_personal_information(data: &Value) -> Option<&Map<String, Value>> {
    data.get("Personal_Information")?.as_object()
}

fn root(data: &Value) -> Option<&Map<String, Value>> {
    data.as_object()
}

/// Extracts `{name, email, score}` from a scorer result. Never fails; absent
/// or malformed fields fall back to defaults.
pub fn extract_candidate(data: &Value) -> CandidateRecord {
    let identity = LOCATORS
        .iter()
        .find_map(|(label, locate)| locate(data).map(|found| (*label, found)));

    let (name, email) = match identity {
        Some((label, info)) => {
            tracing::debug!(locator = label, "Located candidate identity");
            (
                first_text(info, &["Name", "name"]).unwrap_or(UNKNOWN_NAME),
                first_text(info, &["Email", "email"]).unwrap_or(NO_EMAIL),
            )
        }
        None => (UNKNOWN_NAME, NO_EMAIL),
    };

    CandidateRecord {
        name: name.to_string(),
        email: email.to_string(),
        score: overall_match(data),
    }
}

/// First non-empty string among `keys`.
fn first_text<'a>(info: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| info.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// `overallMatch` as a finite number. Numeric strings (optionally ending in
/// `%`) are accepted; everything else is 0.
pub fn overall_match(data: &Value) -> f64 {
    let score = match data.get("overallMatch") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').trim_end().parse::<f64>().ok(),
        _ => None,
    };

    score.filter(|s| s.is_finite()).unwrap_or(0.0)
}
