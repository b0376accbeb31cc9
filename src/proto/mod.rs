//! ONNX Protocol Buffer types
//!
//! The `onnx` submodule is checked-in `prost` output for the subset of the
//! ONNX proto this crate produces. Helper methods for these types live in
//! the `extensions` submodule.

/// Generated ONNX protobuf types
#[allow(missing_docs)]
#[allow(clippy::all)]
pub mod onnx;

// Commonly used types, re-exported at module level
pub use onnx::{
    AttributeProto, GraphProto, ModelProto, NodeProto, OperatorSetIdProto, TensorProto,
    TensorShapeProto, TypeProto, ValueInfoProto,
};

// Submodules holding the nested enum and oneof types
pub use onnx::attribute_proto;
pub use onnx::tensor_proto;
pub use onnx::tensor_shape_proto;
pub use onnx::type_proto;

/// Extension methods for ONNX protobuf types
pub mod extensions;
