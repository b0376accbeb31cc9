//! Source-framework IR
//!
//! The data model handed to this crate by the (out-of-scope) model
//! ingestion step: an ordered stream of operator instances with named
//! input/output slots and literal attributes. Mappers read this and
//! nothing else about the source framework.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::error::{ExportError, ExportResult};
use crate::proto::tensor_proto::DataType;
use crate::proto::TensorProto;

/// A tensor reference in the source graph: name, element type, shape.
///
/// Symbolic dimensions are encoded as -1, matching the ONNX value-info
/// convention.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorInfo {
    /// Tensor name, globally unique within the source graph
    pub name: String,
    /// Element data type
    pub dtype: DataType,
    /// Shape dimensions
    pub shape: Vec<i64>,
}

impl TensorInfo {
    /// Create a new tensor reference
    pub fn new(name: impl Into<String>, dtype: DataType, shape: &[i64]) -> Self {
        Self {
            name: name.into(),
            dtype,
            shape: shape.to_vec(),
        }
    }
}

/// A literal attribute value attached to a source operator
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// 32-bit float
    Float(f32),
    /// 64-bit integer
    Int(i64),
    /// Boolean flag
    Bool(bool),
    /// Float list
    Floats(Vec<f32>),
    /// Integer list
    Ints(Vec<i64>),
    /// UTF-8 string
    Str(String),
}

/// One operator instance from the source IR
///
/// Inputs and outputs are named slots; a slot may carry zero tensors (an
/// omitted optional operand), one, or several. Attributes carry the
/// compile-time literal operands.
#[derive(Debug, Clone, Default)]
pub struct SourceOp {
    kind: String,
    inputs: IndexMap<String, Vec<TensorInfo>>,
    outputs: IndexMap<String, Vec<TensorInfo>>,
    attrs: FxHashMap<String, AttrValue>,
}

impl SourceOp {
    /// Create an operator of the given kind with no operands yet
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }

    /// Operator kind tag
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Add a tensor to a named input slot (builder style)
    pub fn with_input(mut self, slot: &str, tensor: TensorInfo) -> Self {
        self.inputs.entry(slot.to_string()).or_default().push(tensor);
        self
    }

    /// Add a tensor to a named output slot (builder style)
    pub fn with_output(mut self, slot: &str, tensor: TensorInfo) -> Self {
        self.outputs
            .entry(slot.to_string())
            .or_default()
            .push(tensor);
        self
    }

    /// Set a literal attribute (builder style)
    pub fn with_attr(mut self, name: &str, value: AttrValue) -> Self {
        self.attrs.insert(name.to_string(), value);
        self
    }

    /// True if the named input slot holds at least one tensor
    pub fn has_input(&self, slot: &str) -> bool {
        self.inputs.get(slot).map(|v| !v.is_empty()).unwrap_or(false)
    }

    /// First tensor of a required input slot
    pub fn input(&self, slot: &str) -> ExportResult<&TensorInfo> {
        self.inputs
            .get(slot)
            .and_then(|v| v.first())
            .ok_or_else(|| ExportError::MissingField(format!("{}.{}", self.kind, slot)))
    }

    /// First tensor of a required output slot
    pub fn output(&self, slot: &str) -> ExportResult<&TensorInfo> {
        self.outputs
            .get(slot)
            .and_then(|v| v.first())
            .ok_or_else(|| ExportError::MissingField(format!("{}.{}", self.kind, slot)))
    }

    /// Look up a literal attribute
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    /// Float attribute, if present
    pub fn attr_f(&self, name: &str) -> Option<f32> {
        match self.attrs.get(name) {
            Some(AttrValue::Float(v)) => Some(*v),
            Some(AttrValue::Int(v)) => Some(*v as f32),
            _ => None,
        }
    }

    /// Integer attribute, if present
    pub fn attr_i(&self, name: &str) -> Option<i64> {
        match self.attrs.get(name) {
            Some(AttrValue::Int(v)) => Some(*v),
            Some(AttrValue::Bool(v)) => Some(*v as i64),
            _ => None,
        }
    }

    /// Float-list attribute, if present
    pub fn attr_floats(&self, name: &str) -> Option<&[f32]> {
        match self.attrs.get(name) {
            Some(AttrValue::Floats(v)) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Integer-list attribute, if present
    pub fn attr_ints(&self, name: &str) -> Option<&[i64]> {
        match self.attrs.get(name) {
            Some(AttrValue::Ints(v)) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Float attribute that the lowering cannot proceed without
    pub fn required_attr_f(&self, name: &str) -> ExportResult<f32> {
        self.attr_f(name).ok_or_else(|| ExportError::MissingAttribute {
            op: self.kind.clone(),
            attr: name.to_string(),
        })
    }
}

/// The whole source model graph, ready for translation
#[derive(Debug, Clone, Default)]
pub struct SourceGraph {
    /// Operator instances in topological order
    pub ops: Vec<SourceOp>,
    /// Graph-level inputs
    pub inputs: Vec<TensorInfo>,
    /// Graph-level outputs
    pub outputs: Vec<TensorInfo>,
    /// Trained parameters, already converted to ONNX tensors by the
    /// ingestion step
    pub parameters: Vec<TensorProto>,
}

impl SourceGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }
}
