//! Parameter constraints for transformation tasks.
//!
//! A task that violates one of its constraints rejects the whole link; there
//! is no partial application. Checks run in field declaration order, so the
//! reported field is always the first offending one.

use std::fmt::Display;
use thiserror::Error;

/// A task parameter failed its declared range, enum or shape constraint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{task}.{field}: {message}")]
pub struct ValidationError {
    pub task: &'static str,
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(task: &'static str, field: &'static str, message: impl Into<String>) -> Self {
        Self {
            task,
            field,
            message: message.into(),
        }
    }
}

pub(crate) type Checked = Result<(), ValidationError>;

/// `value` (if set) must lie within `[min, max]`.
pub(crate) fn in_range<T>(
    task: &'static str,
    field: &'static str,
    value: Option<T>,
    min: T,
    max: T,
) -> Checked
where
    T: PartialOrd + Display + Copy,
{
    match value {
        Some(v) if v < min || v > max => Err(ValidationError::new(
            task,
            field,
            format!("{v} is out of range [{min}, {max}]"),
        )),
        _ => Ok(()),
    }
}

/// Every element of `values` (if set) must lie within `[min, max]`.
pub(crate) fn all_in_range<T>(
    task: &'static str,
    field: &'static str,
    values: Option<&[T]>,
    min: T,
    max: T,
) -> Checked
where
    T: PartialOrd + Display + Copy,
{
    values
        .unwrap_or_default()
        .iter()
        .try_for_each(|v| in_range(task, field, Some(*v), min, max))
}

pub(crate) fn required<T>(task: &'static str, field: &'static str, value: &Option<T>) -> Checked {
    match value {
        Some(_) => Ok(()),
        None => Err(ValidationError::new(task, field, "is required")),
    }
}

pub(crate) fn non_empty<T>(task: &'static str, field: &'static str, value: Option<&[T]>) -> Checked {
    match value {
        Some([]) => Err(ValidationError::new(task, field, "must not be empty")),
        _ => Ok(()),
    }
}
