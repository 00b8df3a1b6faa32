//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

pub mod error;

use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static FORBIDDEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-!@#$%&*<>?_{}\[\]()]|[0-9]").unwrap());

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_REGEX.replace_all(text.trim(), " ").to_string()
}

/// Key used for case-insensitive name tables (trimmed, lowercased)
pub fn normalize_key(text: &str) -> String {
    normalize_whitespace(text).to_lowercase()
}

/// Check whether a raw location string is worth sending to the geocoder.
///
/// Strings carrying digits or any of `-!@#$%&*<>?_{}[]()` are NLP extraction
/// noise ("H5N8", "Southern Ontario (IP2)") and are rejected.
pub fn is_processable_location(location: &str) -> bool {
    !location.trim().is_empty() && !FORBIDDEN_REGEX.is_match(location)
}
