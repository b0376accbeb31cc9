//! # ir2onnx
//!
//! Source-IR to ONNX graph translator with quantization-aware graph
//! surgery.
//!
//! The crate lowers an already-parsed source model graph into an ONNX
//! `ModelProto`, one operator at a time, picking for each operator the
//! lowering strategy valid for the requested opset and inserting dtype
//! coercions where the target backend needs them. After translation, a
//! deployment-policy pass can strip quantize/dequantize instrumentation
//! from the produced graph and persist the collected scales to a range
//! table.
//!
//! ## Features
//!
//! - **Opset dispatch**: per-instance minimum-version computation and
//!   version-dependent lowering, one mapper per source operator kind
//! - **Graph surgery**: consumer-indexed edge splicing over stable node
//!   indices, used by the quantize/dequantize fusion pass
//! - **Range-table export**: per-tensor quantization scales persisted for
//!   offline deployment tooling
//!
//! ## Example
//!
//! ```ignore
//! use ir2onnx::prelude::*;
//!
//! let registry = MapperRegistry::with_builtins();
//! let translator = GraphTranslator::new(&registry);
//! let model = translator.translate(&source_graph, &TranslateOptions::default())?;
//! save_model(&model, "model.onnx")?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod emitter;
pub mod error;
pub mod graph;
pub mod io;
pub mod ir;
pub mod mapper;
pub mod proto;
pub mod quantize;
pub mod tensor;
pub mod translate;

// ============================================================================
// Prelude module for convenient imports
// ============================================================================

/// Prelude module - import commonly used types with `use ir2onnx::prelude::*`
pub mod prelude {
    pub use crate::emitter::GraphEmitter;
    pub use crate::error::{ExportError, ExportResult};
    pub use crate::graph::OnnxGraph;
    pub use crate::io::{load_model, save_model};
    pub use crate::ir::{AttrValue, SourceGraph, SourceOp, TensorInfo};
    pub use crate::mapper::{MapperRegistry, OpMapper};
    pub use crate::proto::onnx::*;
    pub use crate::quantize::{process_quantize_model, QuantizeInfo, QuantizeInfoMap};
    pub use crate::translate::{GraphTranslator, TranslateOptions};
}

// ============================================================================
// Crate-level re-exports
// ============================================================================

pub use error::{ExportError, ExportResult};
pub use translate::{GraphTranslator, TranslateOptions};

// ============================================================================
// Version information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Minimum target opset the built-in mappers can lower to
pub const SUPPORTED_OPSET_MIN: i64 = 7;
/// Maximum target opset the built-in mappers are validated against
pub const SUPPORTED_OPSET_MAX: i64 = 13;
