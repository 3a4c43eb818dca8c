//! Error types for the raycast culling system
//!
//! This module defines the error types returned by registration,
//! configuration validation, and pipeline construction.

use std::fmt;
use crate::culling::ObjectId;

/// Result type for culling operations
pub type Result<T> = std::result::Result<T, Error>;

/// Culling errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Registration attempted while the registry is full
    CapacityExceeded {
        /// Configured registry capacity
        max_objects: usize,
    },

    /// An object with this identifier is already registered
    DuplicateIdentifier(ObjectId),

    /// Malformed sampler, partition, or pipeline configuration
    InvalidConfiguration(String),

    /// Malformed density bias curve
    InvalidCurve(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::CapacityExceeded { max_objects } => {
                write!(f, "Capacity exceeded: registry is limited to {} objects", max_objects)
            }
            Error::DuplicateIdentifier(id) => write!(f, "Duplicate identifier: {}", id),
            Error::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::InvalidCurve(msg) => write!(f, "Invalid bias curve: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an error and build an `Error::InvalidConfiguration` from it
///
/// # Example
///
/// ```ignore
/// return Err(engine_err!("raycull::Sampler", "grid has {} points", 0));
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::raycull::Error::InvalidConfiguration(message)
    }};
}

/// Log an error and return early with `Error::InvalidConfiguration`
///
/// # Example
///
/// ```ignore
/// if batch_size == 0 {
///     engine_bail!("raycull::Culler", "batch_size must be at least 1");
/// }
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
