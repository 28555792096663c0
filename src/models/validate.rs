//! Boundary checks shared by the request types.

use crate::error::AppError;

/// Trimmed, non-empty string of at least `min_len` characters.
pub fn required(field: &str, value: &str, min_len: usize) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", field)));
    }
    if trimmed.chars().count() < min_len {
        return Err(AppError::Validation(format!(
            "{} must be at least {} characters long",
            field, min_len
        )));
    }
    Ok(trimmed.to_string())
}

pub fn optional_non_empty(field: &str, value: Option<String>) -> Result<Option<String>, AppError> {
    value.map(|v| required(field, &v, 1)).transpose()
}

pub fn bounded(field: &str, value: Option<String>, max_len: usize) -> Result<Option<String>, AppError> {
    match value {
        Some(v) if v.chars().count() > max_len => Err(AppError::Validation(format!(
            "{} must be at most {} characters long",
            field, max_len
        ))),
        other => Ok(other),
    }
}
