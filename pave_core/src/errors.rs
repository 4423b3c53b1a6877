//! # Error Types
//!
//! Structured error types for pave_core. Validation problems are fatal to the
//! call that raised them; backend problems are recoverable through the
//! analytical fallback and are annotated on the result rather than swallowed.
//!
//! ## Example
//!
//! ```rust
//! use pave_core::errors::{PaveError, PaveResult};
//!
//! fn validate_pressure(pressure_mpa: f64) -> PaveResult<()> {
//!     if pressure_mpa <= 0.0 {
//!         return Err(PaveError::invalid_input(
//!             "pressure_mpa",
//!             pressure_mpa.to_string(),
//!             "Contact pressure must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for pave_core operations
pub type PaveResult<T> = Result<T, PaveError>;

/// Structured error type for the design engine.
///
/// Each variant provides specific context about what went wrong, enabling
/// programmatic handling (retry with fallback, surface to the operator, etc.).
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum PaveError {
    /// An input value is invalid (out of range, malformed structure, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// Material not found in the requested library
    #[error("Material not found: {material_name}")]
    MaterialNotFound { material_name: String },

    /// Rigorous backend missing or unloadable - recoverable via fallback
    #[error("Rigorous backend unavailable: {reason}")]
    BackendUnavailable { reason: String },

    /// Rigorous backend ran but reported failure - recoverable via fallback
    #[error("Rigorous backend failed (code {code}): {reason}")]
    BackendComputation { code: i32, reason: String },

    /// Batch entry skipped because the batch was cancelled
    #[error("Calculation cancelled before structure {index}")]
    Cancelled { index: usize },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PaveError {
    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        PaveError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MaterialNotFound error
    pub fn material_not_found(material_name: impl Into<String>) -> Self {
        PaveError::MaterialNotFound {
            material_name: material_name.into(),
        }
    }

    /// Create a BackendUnavailable error
    pub fn backend_unavailable(reason: impl Into<String>) -> Self {
        PaveError::BackendUnavailable {
            reason: reason.into(),
        }
    }

    /// Create a BackendComputation error
    pub fn backend_computation(code: i32, reason: impl Into<String>) -> Self {
        PaveError::BackendComputation {
            code,
            reason: reason.into(),
        }
    }

    /// Check if this error is recoverable by retrying with the analytical
    /// fallback backend. Validation errors never are.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PaveError::BackendUnavailable { .. } | PaveError::BackendComputation { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            PaveError::InvalidInput { .. } => "INVALID_INPUT",
            PaveError::MaterialNotFound { .. } => "MATERIAL_NOT_FOUND",
            PaveError::BackendUnavailable { .. } => "BACKEND_UNAVAILABLE",
            PaveError::BackendComputation { .. } => "BACKEND_COMPUTATION",
            PaveError::Cancelled { .. } => "CANCELLED",
            PaveError::SerializationError { .. } => "SERIALIZATION_ERROR",
            PaveError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}
