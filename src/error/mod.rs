//! Error types for ir2onnx
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Main error type for IR-to-ONNX export operations
#[derive(Error, Debug)]
pub enum ExportError {
    /// A required literal attribute is absent from a source operator
    #[error("Operator '{op}' is missing required attribute '{attr}'")]
    MissingAttribute {
        /// Source operator kind
        op: String,
        /// Attribute name
        attr: String,
    },

    /// No cast path exists between two data types
    #[error("No cast path from {from:?} to {to:?}")]
    UnsupportedCast {
        /// Source data type
        from: crate::proto::tensor_proto::DataType,
        /// Requested data type
        to: crate::proto::tensor_proto::DataType,
    },

    /// Data type outside the supported tensor domain
    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(i32),

    /// Source operator kind has no registered mapper
    #[error("Operator '{0}' has no registered mapper")]
    UnsupportedOperator(String),

    /// Requested opset is below the floor the graph requires
    #[error("Requested opset {requested} is below the minimum {required} required by the graph")]
    OpsetTooLow {
        /// Minimum opset the graph's operators demand
        required: i64,
        /// Opset the caller asked for
        requested: i64,
    },

    /// Missing required field on a source operator
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Malformed source graph
    #[error("Invalid graph: {0}")]
    InvalidGraph(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Protobuf decode error
    #[error("Protobuf decode error: {0}")]
    ProtoDecode(#[from] prost::DecodeError),

    /// Protobuf encode error
    #[error("Protobuf encode error: {0}")]
    ProtoEncode(#[from] prost::EncodeError),
}

/// Result type alias for export operations
pub type ExportResult<T> = Result<T, ExportError>;
