//! Activation lowerings
//!
//! Straight one-node mappings; no version dispatch needed at the floor
//! this crate supports.

use crate::emitter::GraphEmitter;
use crate::error::ExportResult;
use crate::ir::SourceOp;
use crate::proto::AttributeProto;

use super::OpMapper;

/// Mapper for the source `relu` operator
#[derive(Debug, Default)]
pub struct ReluMapper;

impl OpMapper for ReluMapper {
    fn min_opset(&self, _op: &SourceOp) -> i64 {
        7
    }

    fn lower(&self, op: &SourceOp, emitter: &mut GraphEmitter) -> ExportResult<()> {
        let input = op.input("X")?;
        let output = op.output("Out")?;
        emitter.make_node_with_outputs("Relu", &[&input.name], &[&output.name]);
        Ok(())
    }
}

/// Mapper for the source `leaky_relu` operator
#[derive(Debug, Default)]
pub struct LeakyReluMapper;

impl OpMapper for LeakyReluMapper {
    fn min_opset(&self, _op: &SourceOp) -> i64 {
        7
    }

    fn lower(&self, op: &SourceOp, emitter: &mut GraphEmitter) -> ExportResult<()> {
        let input = op.input("X")?;
        let output = op.output("Out")?;
        let alpha = op.attr_f("alpha").unwrap_or(0.01);

        let node = emitter.make_node_with_outputs("LeakyRelu", &[&input.name], &[&output.name]);
        node.attribute.push(AttributeProto::new_float("alpha", alpha));
        Ok(())
    }
}
