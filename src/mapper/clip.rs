//! Clip lowering
//!
//! The bounds of a source clip may arrive as literal attributes or as
//! runtime tensors, independently of each other. Tensor-valued bounds only
//! exist from opset 11 on; literal bounds lower to the attribute form at
//! opset 7. The tensor-operand form is float-only on the target backends,
//! so non-float operands are coerced through FLOAT and back.

use crate::emitter::GraphEmitter;
use crate::error::ExportResult;
use crate::ir::SourceOp;
use crate::proto::tensor_proto::DataType;

use super::OpMapper;

/// Mapper for the source `clip` operator
#[derive(Debug, Default)]
pub struct ClipMapper;

impl OpMapper for ClipMapper {
    fn min_opset(&self, op: &SourceOp) -> i64 {
        if op.has_input("Max") || op.has_input("Min") {
            11
        } else {
            7
        }
    }

    fn lower(&self, op: &SourceOp, emitter: &mut GraphEmitter) -> ExportResult<()> {
        let input = op.input("X")?.clone();
        let output = op.output("Out")?.clone();

        let has_max_tensor = op.has_input("Max");
        let has_min_tensor = op.has_input("Min");

        if !has_max_tensor && !has_min_tensor {
            let max_val = op.required_attr_f("max")?;
            let min_val = op.required_attr_f("min")?;
            return emitter.clip(&input.name, &output.name, min_val, max_val, input.dtype);
        }

        // Tensor-operand form. Each bound resolves independently to either
        // a casted tensor or a materialized constant; all three operands
        // share one working dtype.
        let mut dtype = input.dtype;
        let mut input_name = input.name.clone();
        let mut dtype_converted = false;
        if dtype != DataType::Float {
            input_name = emitter.auto_cast(&input.name, dtype, DataType::Float)?;
            dtype_converted = true;
            dtype = DataType::Float;
        }

        let min_name = if has_min_tensor {
            let min = op.input("Min")?;
            emitter.auto_cast(&min.name, min.dtype, dtype)?
        } else {
            let min_val = op.required_attr_f("min")?;
            emitter.make_constant(&[1], dtype, min_val)?
        };

        let max_name = if has_max_tensor {
            let max = op.input("Max")?;
            emitter.auto_cast(&max.name, max.dtype, dtype)?
        } else {
            let max_val = op.required_attr_f("max")?;
            emitter.make_constant(&[1], dtype, max_val)?
        };

        if dtype_converted {
            let node = emitter.make_node("Clip", &[&input_name, &min_name, &max_name]);
            let clip_output = node.output[0].clone();
            emitter.cast_into(&clip_output, &output.name, DataType::Float, output.dtype)
        } else {
            emitter.make_node_with_outputs(
                "Clip",
                &[&input_name, &min_name, &max_name],
                &[&output.name],
            );
            Ok(())
        }
    }
}
