//! Error types for page-flow

use thiserror::Error;

/// Result type alias using PaginationError
pub type Result<T> = std::result::Result<T, PaginationError>;

/// Errors raised at the configuration boundary.
///
/// Geometry math never fails: degenerate inputs are handled as policy
/// branches (for example a non-positive writable height is one page).
#[derive(Debug, Error)]
pub enum PaginationError {
    /// Format name that is not one of the supported paper sizes
    #[error("Unknown page format: {0:?}")]
    UnknownFormat(String),

    /// Orientation name other than portrait/landscape
    #[error("Unknown page orientation: {0:?}")]
    UnknownOrientation(String),

    /// Custom page dimensions that are negative or not finite
    #[error("Invalid page dimensions: {width}x{height}")]
    InvalidDimensions { width: f64, height: f64 },

    /// Options payload that could not be parsed
    #[error("Invalid pagination options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}
