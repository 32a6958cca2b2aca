//! Internal helpers for input validation.
//!
//! These utilities are **not** part of the public API. They centralize the
//! trimming rules so every entity enforces the same invariants.

use crate::{EngineError, ResultEngine};

/// Trim a required name; empty after trimming is rejected.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim a required free-text field other than a name.
pub(crate) fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Empty optional text is stored as NULL.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Page slugs are lowercase ASCII words joined by `-`.
pub(crate) fn normalize_slug(value: &str) -> ResultEngine<String> {
    let slug = value.trim().to_ascii_lowercase();
    let valid = !slug.is_empty()
        && slug.len() <= 64
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !valid {
        return Err(EngineError::InvalidInput(format!("invalid page slug: {value}")));
    }
    Ok(slug)
}

pub(crate) fn require_non_negative(value: i32, label: &str) -> ResultEngine<i32> {
    if value < 0 {
        return Err(EngineError::InvalidAmount(format!("{label} must be >= 0")));
    }
    Ok(value)
}
