//! Heuristic structuring used when the model is unavailable or returns garbage.
//!
//! Only the name, email and phone are recovered; every other field keeps its
//! default. Pure and infallible.

use std::sync::LazyLock;

use regex::Regex;

use crate::ingest::models::{ParsedResume, PersonalInfo};

/// Word boundaries are ASCII-only: an accented letter does not glue onto the address.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u:\b)[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}(?-u:\b)")
        .expect("email pattern is a valid regex")
});

/// Optional country code, then North American 3-3-4 grouping. ASCII digits only.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\+?[0-9]{1,3}[\s-]?)?\(?[0-9]{3}\)?[\s-]?[0-9]{3}[\s-]?[0-9]{4}")
        .expect("phone pattern is a valid regex")
});

pub fn fallback_structure(text: &str) -> ParsedResume {
    let name = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string();

    ParsedResume {
        personal_info: PersonalInfo {
            name,
            email: extract_email(text).unwrap_or_default(),
            phone: extract_phone(text).unwrap_or_default(),
            ..PersonalInfo::default()
        },
        ..ParsedResume::default()
    }
}

pub fn extract_email(text: &str) -> Option<String> {
    EMAIL_RE.find(text).map(|m| m.as_str().to_string())
}

pub fn extract_phone(text: &str) -> Option<String> {
    PHONE_RE.find(text).map(|m| m.as_str().to_string())
}
