//! Quantize / dequantize lowerings
//!
//! These mappers emit the QuantizeLinear / DequantizeLinear marker pairs
//! and record each tensor's scale in the emitter's ledger; the rewrite
//! pass consumes that ledger when the deployment policy strips the markers
//! again. Scales are already in ONNX convention (real = scale * quantized).

use crate::emitter::GraphEmitter;
use crate::error::{ExportError, ExportResult};
use crate::ir::SourceOp;
use crate::quantize::QuantizeInfo;

use super::OpMapper;

fn scale_params(op: &SourceOp) -> ExportResult<(Vec<f32>, Vec<i64>)> {
    let scale = op
        .attr_floats("scale")
        .map(|s| s.to_vec())
        .ok_or_else(|| ExportError::MissingAttribute {
            op: op.kind().to_string(),
            attr: "scale".to_string(),
        })?;
    let zero_point = op
        .attr_ints("zero_point")
        .map(|z| z.to_vec())
        .unwrap_or_else(|| vec![0; scale.len()]);
    Ok((scale, zero_point))
}

fn params_opset_floor(op: &SourceOp) -> i64 {
    // Per-channel parameters need the axis-aware form
    match op.attr_floats("scale") {
        Some(scale) if scale.len() > 1 => 13,
        _ => 10,
    }
}

/// Mapper for the source `quantize_linear` operator
#[derive(Debug, Default)]
pub struct QuantizeLinearMapper;

impl OpMapper for QuantizeLinearMapper {
    fn min_opset(&self, op: &SourceOp) -> i64 {
        params_opset_floor(op)
    }

    fn lower(&self, op: &SourceOp, emitter: &mut GraphEmitter) -> ExportResult<()> {
        let input = op.input("X")?.clone();
        let output = op.output("Y")?.clone();
        let (scale, zero_point) = scale_params(op)?;

        let dims = [scale.len() as i64];
        let shape: &[i64] = if scale.len() == 1 { &[] } else { &dims };
        let scale_name = emitter.make_float_constant(shape, scale.clone());
        let zp_name = emitter.make_int8_constant(shape, zero_point.clone());

        emitter.make_node_with_outputs(
            "QuantizeLinear",
            &[&input.name, &scale_name, &zp_name],
            &[&output.name],
        );
        emitter.record_quantize_info(&output.name, QuantizeInfo::new(scale, zero_point));
        Ok(())
    }
}

/// Mapper for the source `dequantize_linear` operator
#[derive(Debug, Default)]
pub struct DequantizeLinearMapper;

impl OpMapper for DequantizeLinearMapper {
    fn min_opset(&self, op: &SourceOp) -> i64 {
        params_opset_floor(op)
    }

    fn lower(&self, op: &SourceOp, emitter: &mut GraphEmitter) -> ExportResult<()> {
        let input = op.input("X")?.clone();
        let output = op.output("Y")?.clone();
        let (scale, zero_point) = scale_params(op)?;

        let dims = [scale.len() as i64];
        let shape: &[i64] = if scale.len() == 1 { &[] } else { &dims };
        let scale_name = emitter.make_float_constant(shape, scale.clone());
        let zp_name = emitter.make_int8_constant(shape, zero_point.clone());

        emitter.make_node_with_outputs(
            "DequantizeLinear",
            &[&input.name, &scale_name, &zp_name],
            &[&output.name],
        );
        // The quantized tensor is this node's input; keep its record keyed
        // consistently with the producing quantize op.
        emitter.record_quantize_info(&input.name, QuantizeInfo::new(scale, zero_point));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{AttrValue, TensorInfo};
    use crate::proto::tensor_proto::DataType;

    fn quantize_op(scale: Vec<f32>) -> SourceOp {
        SourceOp::new("quantize_linear")
            .with_input("X", TensorInfo::new("p", DataType::Float, &[1, 8]))
            .with_output("Y", TensorInfo::new("q1", DataType::Int8, &[1, 8]))
            .with_attr("scale", AttrValue::Floats(scale))
    }

    #[test]
    fn test_min_opset_per_tensor_vs_per_channel() {
        assert_eq!(QuantizeLinearMapper.min_opset(&quantize_op(vec![0.05])), 10);
        assert_eq!(
            QuantizeLinearMapper.min_opset(&quantize_op(vec![0.05, 0.1])),
            13
        );
    }

    #[test]
    fn test_quantize_emits_pair_inputs_and_records_scale() {
        let mut emitter = GraphEmitter::new(13);
        QuantizeLinearMapper
            .lower(&quantize_op(vec![0.05]), &mut emitter)
            .unwrap();

        let kinds: Vec<&str> = emitter.nodes().iter().map(|n| n.op_type.as_str()).collect();
        assert_eq!(kinds, vec!["Constant", "Constant", "QuantizeLinear"]);

        let q = emitter.nodes().last().unwrap();
        assert_eq!(q.input[0], "p");
        assert_eq!(q.output[0], "q1");

        let info = &emitter.quantize_info()["q1"];
        assert_eq!(info.scale, vec![0.05]);
        assert!(info.is_per_tensor());
    }

    #[test]
    fn test_quantize_missing_scale_fails() {
        let op = SourceOp::new("quantize_linear")
            .with_input("X", TensorInfo::new("p", DataType::Float, &[1]))
            .with_output("Y", TensorInfo::new("q1", DataType::Int8, &[1]));

        let mut emitter = GraphEmitter::new(13);
        let err = QuantizeLinearMapper.lower(&op, &mut emitter).unwrap_err();
        assert!(matches!(err, ExportError::MissingAttribute { .. }));
    }

    #[test]
    fn test_dequantize_records_under_quantized_input() {
        let op = SourceOp::new("dequantize_linear")
            .with_input("X", TensorInfo::new("q1", DataType::Int8, &[1, 8]))
            .with_output("Y", TensorInfo::new("dq1", DataType::Float, &[1, 8]))
            .with_attr("scale", AttrValue::Floats(vec![0.05]));

        let mut emitter = GraphEmitter::new(13);
        DequantizeLinearMapper.lower(&op, &mut emitter).unwrap();

        assert!(emitter.quantize_info().contains_key("q1"));
        let dq = emitter.nodes().last().unwrap();
        assert_eq!(dq.op_type, "DequantizeLinear");
        assert_eq!(dq.output[0], "dq1");
    }

    #[test]
    fn test_per_channel_constant_shape() {
        let mut emitter = GraphEmitter::new(13);
        QuantizeLinearMapper
            .lower(&quantize_op(vec![0.05, 0.1]), &mut emitter)
            .unwrap();

        let scale_const = &emitter.nodes()[0];
        let tensor = scale_const.attribute[0].t.as_ref().unwrap();
        assert_eq!(tensor.dims, vec![2]);
        assert_eq!(tensor.float_data, vec![0.05, 0.1]);
    }
}
