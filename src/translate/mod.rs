//! Translation pipeline
//!
//! Drives one deterministic pass over the source operator stream: resolve
//! the effective target opset, lower every operator through the registry
//! into a single emitter, assemble the target graph, and hand it to the
//! quantization rewrite pass before wrapping it into a `ModelProto`.

use crate::emitter::GraphEmitter;
use crate::error::{ExportError, ExportResult};
use crate::graph::OnnxGraph;
use crate::ir::SourceGraph;
use crate::mapper::MapperRegistry;
use crate::proto::extensions::make_tensor_value_info;
use crate::proto::{ModelProto, OperatorSetIdProto};
use crate::quantize::process_quantize_model;

/// IR version stamped on produced models; pairs with the supported opsets
const ONNX_IR_VERSION: i64 = 7;

/// Knobs for one translation run
#[derive(Debug, Clone)]
pub struct TranslateOptions {
    /// Requested target opset; raised to the graph's floor when
    /// `auto_upgrade_opset` is set
    pub opset_version: i64,
    /// Raise the opset instead of failing when the request is too low
    pub auto_upgrade_opset: bool,
    /// Deployment-target identifier steering the quantization policy
    pub deploy_backend: String,
    /// Name stamped on the produced graph
    pub graph_name: String,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            opset_version: crate::SUPPORTED_OPSET_MIN,
            auto_upgrade_opset: true,
            deploy_backend: "onnxruntime".to_string(),
            graph_name: "ir2onnx_graph".to_string(),
        }
    }
}

/// One-shot source-graph to ONNX translator
pub struct GraphTranslator<'a> {
    registry: &'a MapperRegistry,
}

impl<'a> GraphTranslator<'a> {
    /// Create a translator over an already-built registry
    pub fn new(registry: &'a MapperRegistry) -> Self {
        Self { registry }
    }

    /// Minimum opset the whole graph can be lowered to
    ///
    /// The maximum over all per-instance floors. Fails on the first
    /// operator kind without a registered mapper.
    pub fn min_opset(&self, graph: &SourceGraph) -> ExportResult<i64> {
        let mut floor = crate::SUPPORTED_OPSET_MIN;
        for op in &graph.ops {
            let mapper = self
                .registry
                .get(op.kind())
                .ok_or_else(|| ExportError::UnsupportedOperator(op.kind().to_string()))?;
            floor = floor.max(mapper.min_opset(op));
        }
        Ok(floor)
    }

    /// Translate the source graph into an ONNX model
    pub fn translate(
        &self,
        graph: &SourceGraph,
        options: &TranslateOptions,
    ) -> ExportResult<ModelProto> {
        let floor = self.min_opset(graph)?;
        let opset = if options.opset_version >= floor {
            options.opset_version
        } else if options.auto_upgrade_opset {
            log::warn!(
                "requested opset {} is below the minimum {} required by the graph, raising",
                options.opset_version,
                floor
            );
            floor
        } else {
            return Err(ExportError::OpsetTooLow {
                required: floor,
                requested: options.opset_version,
            });
        };

        let mut emitter = GraphEmitter::new(opset);
        for op in &graph.ops {
            let mapper = self
                .registry
                .get(op.kind())
                .ok_or_else(|| ExportError::UnsupportedOperator(op.kind().to_string()))?;
            mapper.lower(op, &mut emitter)?;
        }
        let (nodes, quantize_info) = emitter.finish();

        let mut onnx_graph = OnnxGraph {
            nodes,
            initializers: graph.parameters.clone(),
            inputs: graph
                .inputs
                .iter()
                .map(|t| make_tensor_value_info(&t.name, t.dtype as i32, &t.shape))
                .collect(),
            outputs: graph
                .outputs
                .iter()
                .map(|t| make_tensor_value_info(&t.name, t.dtype as i32, &t.shape))
                .collect(),
        };

        process_quantize_model(&mut onnx_graph, &quantize_info, &options.deploy_backend);

        Ok(ModelProto {
            ir_version: ONNX_IR_VERSION,
            producer_name: "ir2onnx".to_string(),
            producer_version: crate::VERSION.to_string(),
            opset_import: vec![OperatorSetIdProto {
                domain: String::new(),
                version: opset,
            }],
            graph: Some(onnx_graph.into_graph_proto(&options.graph_name)),
            ..Default::default()
        })
    }
}
