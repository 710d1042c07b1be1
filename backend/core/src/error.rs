use thiserror::Error;

/// Top-level error type for the wakit core helpers.
///
/// The content resolver itself is total and never produces one of these;
/// absent content is reported as `None`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid literal pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}
