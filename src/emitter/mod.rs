//! ONNX node emission
//!
//! `GraphEmitter` is the single sink mappers write into: it constructs
//! target-IR nodes with generated names, materializes constants, inserts
//! dtype coercions, and accumulates per-tensor quantization metadata for
//! the rewrite pass to export later.

use rustc_hash::FxHashMap;

use crate::error::{ExportError, ExportResult};
use crate::proto::tensor_proto::DataType;
use crate::proto::{AttributeProto, NodeProto, TensorProto};
use crate::quantize::{QuantizeInfo, QuantizeInfoMap};
use crate::tensor::is_castable;

/// A literal operand value destined for a constant tensor
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    /// Floating-point literal
    F32(f32),
    /// Integer literal
    I64(i64),
}

impl From<f32> for Literal {
    fn from(v: f32) -> Self {
        Literal::F32(v)
    }
}

impl From<i64> for Literal {
    fn from(v: i64) -> Self {
        Literal::I64(v)
    }
}

/// Node sink for one translation run
#[derive(Debug)]
pub struct GraphEmitter {
    target_opset: i64,
    nodes: Vec<NodeProto>,
    name_counters: FxHashMap<String, u64>,
    quantize_info: QuantizeInfoMap,
}

impl GraphEmitter {
    /// Create an emitter targeting the given opset version
    pub fn new(target_opset: i64) -> Self {
        Self {
            target_opset,
            nodes: Vec::new(),
            name_counters: FxHashMap::default(),
            quantize_info: QuantizeInfoMap::default(),
        }
    }

    /// The opset version this run lowers to
    pub fn opset(&self) -> i64 {
        self.target_opset
    }

    /// Nodes emitted so far, in emission order
    pub fn nodes(&self) -> &[NodeProto] {
        &self.nodes
    }

    /// Quantization metadata recorded so far
    pub fn quantize_info(&self) -> &QuantizeInfoMap {
        &self.quantize_info
    }

    /// Consume the emitter, yielding the node list and the metadata ledger
    pub fn finish(self) -> (Vec<NodeProto>, QuantizeInfoMap) {
        (self.nodes, self.quantize_info)
    }

    /// Record quantization parameters for a tensor
    ///
    /// Later records for the same tensor win; mappers re-emitting a tensor
    /// are expected to carry the same parameters.
    pub fn record_quantize_info(&mut self, tensor: &str, info: QuantizeInfo) {
        self.quantize_info.insert(tensor.to_string(), info);
    }

    fn fresh_node_name(&mut self, op_type: &str) -> String {
        let counter = self.name_counters.entry(op_type.to_string()).or_insert(0);
        let name = format!("{}_{}", op_type, counter);
        *counter += 1;
        name
    }

    /// Emit a node with a generated name and a single generated output
    pub fn make_node(&mut self, op_type: &str, inputs: &[&str]) -> &mut NodeProto {
        let name = self.fresh_node_name(op_type);
        let output = format!("{}_out0", name);
        self.push_node(op_type, inputs, &[&output], name)
    }

    /// Emit a node with a generated name and the given output names
    pub fn make_node_with_outputs(
        &mut self,
        op_type: &str,
        inputs: &[&str],
        outputs: &[&str],
    ) -> &mut NodeProto {
        let name = self.fresh_node_name(op_type);
        self.push_node(op_type, inputs, outputs, name)
    }

    fn push_node(
        &mut self,
        op_type: &str,
        inputs: &[&str],
        outputs: &[&str],
        name: String,
    ) -> &mut NodeProto {
        self.nodes.push(NodeProto {
            op_type: op_type.to_string(),
            input: inputs.iter().map(|s| s.to_string()).collect(),
            output: outputs.iter().map(|s| s.to_string()).collect(),
            name,
            ..Default::default()
        });
        self.nodes.last_mut().unwrap()
    }

    /// Materialize a literal as a `Constant` node, returning its output name
    ///
    /// The constant tensor is filled with `value` repeated over `shape`.
    pub fn make_constant(
        &mut self,
        shape: &[i64],
        dtype: DataType,
        value: impl Into<Literal>,
    ) -> ExportResult<String> {
        let tensor = fill_tensor(shape, dtype, value.into())?;
        let node = self.make_node("Constant", &[]);
        node.attribute.push(AttributeProto::new_tensor("value", tensor));
        Ok(node.output[0].clone())
    }

    /// Materialize an explicit float vector as a `Constant` node
    pub fn make_float_constant(&mut self, shape: &[i64], values: Vec<f32>) -> String {
        let tensor = TensorProto {
            dims: shape.to_vec(),
            data_type: DataType::Float as i32,
            float_data: values,
            ..Default::default()
        };
        let node = self.make_node("Constant", &[]);
        node.attribute.push(AttributeProto::new_tensor("value", tensor));
        node.output[0].clone()
    }

    /// Materialize an explicit signed 8-bit vector as a `Constant` node
    pub fn make_int8_constant(&mut self, shape: &[i64], values: Vec<i64>) -> String {
        let tensor = TensorProto {
            dims: shape.to_vec(),
            data_type: DataType::Int8 as i32,
            int32_data: values.into_iter().map(|v| v as i32).collect(),
            ..Default::default()
        };
        let node = self.make_node("Constant", &[]);
        node.attribute.push(AttributeProto::new_tensor("value", tensor));
        node.output[0].clone()
    }

    /// Cast a tensor to another dtype, returning the casted tensor's name
    ///
    /// No node is emitted when `from == to`; the input name passes through.
    pub fn auto_cast(
        &mut self,
        name: &str,
        from: DataType,
        to: DataType,
    ) -> ExportResult<String> {
        if from == to {
            return Ok(name.to_string());
        }
        check_cast_path(from, to)?;
        let node = self.make_node("Cast", &[name]);
        node.attribute.push(AttributeProto::new_int("to", to as i64));
        Ok(node.output[0].clone())
    }

    /// Cast a tensor into an explicitly named output
    ///
    /// Used to bind a declared output name to the tail of a coercion chain.
    pub fn cast_into(
        &mut self,
        input: &str,
        output: &str,
        from: DataType,
        to: DataType,
    ) -> ExportResult<()> {
        check_cast_path(from, to)?;
        let node = self.make_node_with_outputs("Cast", &[input], &[output]);
        node.attribute.push(AttributeProto::new_int("to", to as i64));
        Ok(())
    }

    /// Emit a clip over literal bounds in the form the target opset allows
    ///
    /// Below opset 11 the bounds ride as attributes; from 11 on they become
    /// constant tensor operands. Non-float inputs are coerced through FLOAT
    /// and back, since the tensor-operand form is float-only on the target
    /// backends.
    pub fn clip(
        &mut self,
        input: &str,
        output: &str,
        min: f32,
        max: f32,
        dtype: DataType,
    ) -> ExportResult<()> {
        let needs_cast = dtype != DataType::Float;
        let work_input = if needs_cast {
            self.auto_cast(input, dtype, DataType::Float)?
        } else {
            input.to_string()
        };

        let clip_output = if needs_cast {
            let node = if self.target_opset < 11 {
                let node = self.make_node("Clip", &[&work_input]);
                node.attribute.push(AttributeProto::new_float("min", min));
                node.attribute.push(AttributeProto::new_float("max", max));
                node
            } else {
                let min_name = self.make_constant(&[1], DataType::Float, min)?;
                let max_name = self.make_constant(&[1], DataType::Float, max)?;
                self.make_node("Clip", &[&work_input, &min_name, &max_name])
            };
            node.output[0].clone()
        } else if self.target_opset < 11 {
            let node = self.make_node_with_outputs("Clip", &[&work_input], &[output]);
            node.attribute.push(AttributeProto::new_float("min", min));
            node.attribute.push(AttributeProto::new_float("max", max));
            return Ok(());
        } else {
            let min_name = self.make_constant(&[1], DataType::Float, min)?;
            let max_name = self.make_constant(&[1], DataType::Float, max)?;
            self.make_node_with_outputs("Clip", &[&work_input, &min_name, &max_name], &[output]);
            return Ok(());
        };

        self.cast_into(&clip_output, output, DataType::Float, dtype)
    }
}

fn check_cast_path(from: DataType, to: DataType) -> ExportResult<()> {
    if is_castable(from) && is_castable(to) {
        Ok(())
    } else {
        Err(ExportError::UnsupportedCast { from, to })
    }
}

fn fill_tensor(shape: &[i64], dtype: DataType, value: Literal) -> ExportResult<TensorProto> {
    let numel: i64 = shape.iter().product::<i64>().max(1);
    let numel = numel as usize;

    let mut tensor = TensorProto {
        dims: shape.to_vec(),
        data_type: dtype as i32,
        ..Default::default()
    };

    let as_f64 = match value {
        Literal::F32(v) => v as f64,
        Literal::I64(v) => v as f64,
    };
    let as_i64 = match value {
        Literal::F32(v) => v as i64,
        Literal::I64(v) => v,
    };

    match dtype {
        DataType::Float => tensor.float_data = vec![as_f64 as f32; numel],
        DataType::Double => tensor.double_data = vec![as_f64; numel],
        DataType::Int64 => tensor.int64_data = vec![as_i64; numel],
        DataType::Int32
        | DataType::Int16
        | DataType::Int8
        | DataType::Uint16
        | DataType::Uint8
        | DataType::Bool => tensor.int32_data = vec![as_i64 as i32; numel],
        DataType::Uint32 | DataType::Uint64 => {
            tensor.uint64_data = vec![as_i64.max(0) as u64; numel]
        }
        _ => return Err(ExportError::UnsupportedDataType(dtype as i32)),
    }

    Ok(tensor)
}
