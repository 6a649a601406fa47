use crate::transform::ValidationError;
use std::fmt;
use thiserror::Error;

pub type PictureResult<T> = Result<T, PictureError>;

/// Everything that can make [`build_picture_tree`](crate::build_picture_tree) fail.
///
/// No variant is ever recovered internally: one invalid field invalidates
/// the whole call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PictureError {
    #[error("file handle must be a string or a {{srcHandle, apiKey}} storage alias: {0}")]
    InvalidIdentifier(String),
    #[error("invalid option combination: {0}")]
    InvalidOptionCombination(Combination),
    #[error("invalid resolution descriptor `{0}` (expected a width, `<n>w` or `<n>x`)")]
    InvalidResolution(String),
    #[error("invalid width `{0}` (expected a pixel length such as `768px`)")]
    InvalidWidth(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl PictureError {
    pub fn invalid_identifier(msg: impl Into<String>) -> Self {
        Self::InvalidIdentifier(msg.into())
    }
}

/// The illegal `resolutions` / `sizes` / `width` combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combination {
    /// Width descriptors (`320w` or bare numbers) without any `sizes`.
    WidthDescriptorsWithoutSizes,
    /// Pixel densities (`2x`) together with `sizes`.
    DensityWithSizes,
    /// Pixel densities (`2x`) without a static `width`.
    DensityWithoutWidth,
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::WidthDescriptorsWithoutSizes => {
                "you must specify at least one size to use width descriptors"
            }
            Self::DensityWithSizes => "sizes cannot be combined with pixel densities",
            Self::DensityWithoutWidth => "you must specify a width to use pixel densities",
        };
        f.write_str(msg)
    }
}

impl From<Combination> for PictureError {
    fn from(c: Combination) -> Self {
        Self::InvalidOptionCombination(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combination_messages_name_the_rule() {
        let err = PictureError::from(Combination::DensityWithoutWidth);
        assert!(err.to_string().contains("invalid option combination"));
        assert!(err.to_string().contains("width"));
    }

    #[test]
    fn validation_error_is_transparent() {
        let err = PictureError::from(ValidationError::new("blur", "amount", "100 is out of range [2, 20]"));
        assert_eq!(err.to_string(), "blur.amount: 100 is out of range [2, 20]");
    }
}
