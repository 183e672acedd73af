//! Input checks every handler runs before building a request body.

use crate::domain::error::{MemctlError, MemctlResult};

/// Longest memory content the service accepts, in characters
pub const MAX_CONTENT_LENGTH: usize = 32_000;

/// Largest page size a list/search may ask for
pub const MAX_LIMIT: u32 = 1000;

/// Relation kinds the service understands
pub const RELATION_TYPES: &[&str] = &[
    "related_to",
    "supports",
    "contradicts",
    "supersedes",
    "derived_from",
    "part_of",
];

pub fn content(text: &str) -> MemctlResult<&str> {
    if text.trim().is_empty() {
        return Err(MemctlError::validation("Content must not be empty"));
    }
    let length = text.chars().count();
    if length > MAX_CONTENT_LENGTH {
        return Err(MemctlError::validation(format!(
            "Content exceeds max length ({} > {} characters)",
            length, MAX_CONTENT_LENGTH
        )));
    }
    Ok(text)
}

pub fn importance(raw: &str) -> MemctlResult<f64> {
    unit_interval("Importance", raw)
}

/// Relation weight, same range as importance
pub fn weight(raw: &str) -> MemctlResult<f64> {
    unit_interval("Weight", raw)
}

pub fn limit(raw: &str) -> MemctlResult<u32> {
    match raw.trim().parse::<u32>() {
        Ok(value) if (1..=MAX_LIMIT).contains(&value) => Ok(value),
        _ => Err(MemctlError::validation(format!(
            "Limit must be an integer between 1 and {}, got '{}'",
            MAX_LIMIT, raw
        ))),
    }
}

pub fn offset(raw: &str) -> MemctlResult<u32> {
    raw.trim().parse::<u32>().map_err(|_| {
        MemctlError::validation(format!("Offset must be a non-negative integer, got '{}'", raw))
    })
}

/// Minimum similarity score for search results
pub fn min_score(raw: &str) -> MemctlResult<f64> {
    unit_interval("Minimum score", raw)
}

pub fn relation_type(raw: &str) -> MemctlResult<&str> {
    if RELATION_TYPES.contains(&raw) {
        Ok(raw)
    } else {
        Err(MemctlError::validation(format!(
            "Invalid relation type '{}' (expected one of: {})",
            raw,
            RELATION_TYPES.join(", ")
        )))
    }
}

/// Comma-separated tag list; blanks are dropped
pub fn tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Watch-mode interval in seconds
pub fn interval(raw: &str) -> MemctlResult<u64> {
    match raw.trim().parse::<u64>() {
        Ok(seconds) if seconds > 0 => Ok(seconds),
        _ => Err(MemctlError::validation(format!(
            "Interval must be a positive number of seconds, got '{}'",
            raw
        ))),
    }
}

fn unit_interval(label: &str, raw: &str) -> MemctlResult<f64> {
    match raw.trim().parse::<f64>() {
        Ok(value) if (0.0..=1.0).contains(&value) => Ok(value),
        _ => Err(MemctlError::validation(format!(
            "{} must be a number between 0 and 1, got '{}'",
            label, raw
        ))),
    }
}
