//! Error types for lathe.
//!
//! Construction and operator failures are reported through [`MeshError`].
//! Deserialization never produces an error: it returns `None` so callers can
//! move on to their next fallback tier.

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh construction and enrichment.
#[derive(Error, Debug)]
pub enum MeshError {
    /// A face references a vertex index past the end of the vertex buffer.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A flat buffer does not hold whole 3-tuples.
    #[error("buffer `{name}` has length {len}, which is not a multiple of 3")]
    MalformedBuffer {
        /// Buffer name.
        name: &'static str,
        /// Actual length.
        len: usize,
    },

    /// An operator moved a vertex to a NaN or infinite position.
    #[error("vertex {vertex} has a non-finite position")]
    NonFinitePosition {
        /// The offending vertex index.
        vertex: usize,
    },

    /// A user-supplied operator reported a failure.
    #[error("operator `{name}` failed: {message}")]
    OperatorFailed {
        /// Operator name.
        name: String,
        /// Failure description.
        message: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },

    /// JSON encoding of a document failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create an operator failure error.
    pub fn operator_failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        MeshError::OperatorFailed {
            name: name.into(),
            message: message.into(),
        }
    }
}
