//! Core error types for countdown-core.
//!
//! Almost every "error-like" condition in this library degrades to a defined
//! value instead of failing: redundant `start`/`pause`/`stop` calls are
//! no-ops, out-of-range precision is clamped, and ticks delivered after the
//! timer was cancelled are discarded. What remains is input validation, which
//! happens once at construction or reconfiguration time.

use thiserror::Error;

/// Core error type for countdown-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The target date could not be parsed as an instant.
    #[error("invalid date input '{input}': {message}")]
    InvalidDate { input: String, message: String },

    /// A configuration field failed validation.
    #[error("invalid configuration value for '{field}': {message}")]
    InvalidConfig { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
