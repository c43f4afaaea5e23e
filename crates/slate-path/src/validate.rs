//! Validation of paths arriving from JSON.

use serde_json::Value;
use thiserror::Error;

use crate::types::Path;

/// Maximum allowed path depth.
const MAX_PATH_LENGTH: usize = 256;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("path must be an array of integers")]
    InvalidPath,
    #[error("path is deeper than {MAX_PATH_LENGTH} levels")]
    PathTooLong,
    #[error("path step {0} is not a non-negative integer")]
    InvalidPathStep(usize),
    #[error("path string {0:?} is malformed")]
    InvalidPathString(String),
}

/// Validate a JSON value as a path and convert it.
///
/// # Errors
///
/// Returns an error if:
/// - The value is not an array
/// - Any step is not a non-negative integer
/// - The path exceeds the maximum depth (256 steps)
///
/// # Example
///
/// ```
/// use slate_path::validate_path;
/// use serde_json::json;
///
/// assert_eq!(validate_path(&json!([0, 3])).unwrap(), vec![0, 3]);
/// validate_path(&json!([0, -1])).unwrap_err();
/// validate_path(&json!("0,1")).unwrap_err();
/// ```
pub fn validate_path(value: &Value) -> Result<Path, ValidationError> {
    let steps = value.as_array().ok_or(ValidationError::InvalidPath)?;
    if steps.len() > MAX_PATH_LENGTH {
        return Err(ValidationError::PathTooLong);
    }
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            step.as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or(ValidationError::InvalidPathStep(i))
        })
        .collect()
}

/// Encode a path as a JSON array.
pub fn path_to_json(path: &[usize]) -> Value {
    Value::Array(path.iter().map(|&step| Value::from(step)).collect())
}
