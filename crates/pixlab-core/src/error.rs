//! Error types for pixlab operations.
//!
//! Every failure the engine can produce is a deterministic input fault found
//! during validation, before any pixel is computed. Nothing is retried and no
//! operation is ever partially applied.
//!
//! # Overview
//!
//! - [`Error::InvalidImage`] - malformed or empty buffer
//! - [`Error::InvalidParameter`] - missing, mistyped or out-of-range parameter
//! - [`Error::UnknownOperation`] - name not in the catalogue
//! - [`Error::UnsupportedOperation`] - operation incompatible with the channel layout
//! - [`Error::DimensionMismatch`] - multi-buffer operation with different shapes
//!
//! # Usage
//!
//! ```rust
//! use pixlab_core::{Error, Result};
//!
//! fn check_threshold(threshold: f32) -> Result<()> {
//!     if !(0.0..=1.0).contains(&threshold) {
//!         return Err(Error::invalid_parameter("binarize", "threshold", "a number in [0, 1]"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_threshold(1.5).is_err());
//! ```

use thiserror::Error;

use crate::Shape;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while validating buffers and operation requests.
///
/// Each variant carries enough structure (operation name, offending
/// parameter, expected constraint) to build a precise user-facing message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The buffer is empty, has the wrong sample count, an unknown channel
    /// tag, or a sample outside `[0, 1]`.
    #[error("invalid image: {reason}")]
    InvalidImage {
        /// What was wrong with the buffer
        reason: String,
    },

    /// A parameter is missing, has the wrong type or violates its bounds.
    #[error("invalid parameter '{parameter}' for {operation}: expected {expected}")]
    InvalidParameter {
        /// Canonical operation name
        operation: String,
        /// Offending parameter key
        parameter: String,
        /// Human-readable constraint
        expected: String,
    },

    /// The operation name is not in the catalogue.
    #[error("unknown operation: {operation}")]
    UnknownOperation {
        /// Name as received
        operation: String,
    },

    /// The operation cannot run on this buffer's channel layout.
    #[error("{operation} is not supported here: {reason}")]
    UnsupportedOperation {
        /// Canonical operation name
        operation: String,
        /// Why the input is incompatible
        reason: String,
    },

    /// Two buffers taking part in one operation have different shapes.
    #[error("dimension mismatch in {operation}: {expected} vs {got}")]
    DimensionMismatch {
        /// Canonical operation name
        operation: String,
        /// Shape of the primary buffer
        expected: Shape,
        /// Shape of the other buffer
        got: Shape,
    },
}

impl Error {
    /// Creates an [`Error::InvalidImage`] error.
    #[inline]
    pub fn invalid_image(reason: impl Into<String>) -> Self {
        Self::InvalidImage {
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::InvalidParameter`] error.
    #[inline]
    pub fn invalid_parameter(
        operation: impl Into<String>,
        parameter: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            operation: operation.into(),
            parameter: parameter.into(),
            expected: expected.into(),
        }
    }

    /// Creates an [`Error::UnknownOperation`] error.
    #[inline]
    pub fn unknown_operation(operation: impl Into<String>) -> Self {
        Self::UnknownOperation {
            operation: operation.into(),
        }
    }

    /// Creates an [`Error::UnsupportedOperation`] error.
    #[inline]
    pub fn unsupported(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::DimensionMismatch`] error.
    #[inline]
    pub fn dimension_mismatch(operation: impl Into<String>, expected: Shape, got: Shape) -> Self {
        Self::DimensionMismatch {
            operation: operation.into(),
            expected,
            got,
        }
    }

    /// Returns the operation name this error refers to, if any.
    pub fn operation(&self) -> Option<&str> {
        match self {
            Self::InvalidImage { .. } => None,
            Self::InvalidParameter { operation, .. }
            | Self::UnknownOperation { operation }
            | Self::UnsupportedOperation { operation, .. }
            | Self::DimensionMismatch { operation, .. } => Some(operation),
        }
    }

    /// Returns `true` for parameter validation failures.
    #[inline]
    pub fn is_parameter_error(&self) -> bool {
        matches!(self, Self::InvalidParameter { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChannelLayout;

    #[test]
    fn test_invalid_parameter_message() {
        let err = Error::invalid_parameter("brightness", "factor", "a number in [-1, 1]");
        let msg = err.to_string();
        assert!(msg.contains("factor"));
        assert!(msg.contains("brightness"));
        assert!(msg.contains("[-1, 1]"));
        assert!(err.is_parameter_error());
        assert_eq!(err.operation(), Some("brightness"));
    }

    #[test]
    fn test_dimension_mismatch_message() {
        let a = Shape::new(4, 4, ChannelLayout::Rgb);
        let b = Shape::new(2, 3, ChannelLayout::Rgb);
        let msg = Error::dimension_mismatch("merge", a, b).to_string();
        assert!(msg.contains("4x4x3"));
        assert!(msg.contains("2x3x3"));
    }

    #[test]
    fn test_invalid_image_has_no_operation() {
        assert_eq!(Error::invalid_image("empty").operation(), None);
    }
}
