//! Quantization rewrite pass
//!
//! Decides whether the translated graph is quantization-aware and, for the
//! generic deployment policy, strips quantize/dequantize instrumentation:
//! adjacent QuantizeLinear → DequantizeLinear pairs are fused away and the
//! recorded scales are persisted to a side-channel range table so offline
//! tooling can recover the quantization boundaries.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use indexmap::IndexMap;

use crate::graph::{
    build_consumer_index, remove_node_by_name, replace_input_of_all_nodes, NodeArena, OnnxGraph,
};
use crate::proto::NodeProto;

/// Operator kind marking a quantization boundary entry
pub const QUANTIZE_OP: &str = "QuantizeLinear";
/// Operator kind marking a quantization boundary exit
pub const DEQUANTIZE_OP: &str = "DequantizeLinear";
/// Deployment-target identifier selecting the generic rewrite policy
pub const GENERIC_BACKEND: &str = "others";
/// Well-known relative path of the exported range table
pub const MAX_RANGE_FILE: &str = "max_range.txt";

/// Per-tensor quantization parameters recorded during translation
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizeInfo {
    /// Scale factor(s); one value for per-tensor, several for per-channel
    pub scale: Vec<f32>,
    /// Zero point(s), parallel to `scale`
    pub zero_point: Vec<i64>,
}

impl QuantizeInfo {
    /// Parameters with explicit scale and zero-point vectors
    pub fn new(scale: Vec<f32>, zero_point: Vec<i64>) -> Self {
        Self { scale, zero_point }
    }

    /// Single-scale (per-tensor) parameters
    pub fn per_tensor(scale: f32, zero_point: i64) -> Self {
        Self {
            scale: vec![scale],
            zero_point: vec![zero_point],
        }
    }

    /// True when the record carries exactly one scale value
    pub fn is_per_tensor(&self) -> bool {
        self.scale.len() == 1
    }
}

/// Tensor name → quantization parameters, insertion order preserved
pub type QuantizeInfoMap = IndexMap<String, QuantizeInfo>;

/// True iff any node carries a quantize or dequantize marker kind
pub fn is_quantized(nodes: &[NodeProto]) -> bool {
    nodes
        .iter()
        .any(|n| n.op_type == QUANTIZE_OP || n.op_type == DEQUANTIZE_OP)
}

/// Apply the deployment policy for `deploy_backend` to a finished graph
///
/// Non-quantized graphs pass through untouched with no file I/O. The
/// generic policy rewrites in place and writes the range table to
/// [`MAX_RANGE_FILE`]; unrecognized backend identifiers leave the graph
/// intact so external policies can claim them.
pub fn process_quantize_model(
    graph: &mut OnnxGraph,
    quantize_info: &QuantizeInfoMap,
    deploy_backend: &str,
) {
    process_with_report(graph, quantize_info, deploy_backend, Path::new(MAX_RANGE_FILE));
}

/// Same as [`process_quantize_model`] with an explicit range-table path
pub fn process_with_report(
    graph: &mut OnnxGraph,
    quantize_info: &QuantizeInfoMap,
    deploy_backend: &str,
    report_path: &Path,
) {
    if !is_quantized(&graph.nodes) {
        return;
    }
    log::debug!(
        "quantized model detected, applying deploy backend policy '{}'",
        deploy_backend
    );

    match deploy_backend {
        GENERIC_BACKEND => {
            remove_all_quantize_ops(graph);
            if let Err(err) = export_max_range(quantize_info, report_path) {
                // The in-memory rewrite stands; losing the side file is
                // recoverable offline.
                log::warn!(
                    "failed to write quantize range table to {}: {}",
                    report_path.display(),
                    err
                );
            }
        }
        other => {
            log::debug!(
                "no quantize rewrite policy for deploy backend '{}', graph left as-is",
                other
            );
        }
    }
}

/// Fuse away every immediately-adjacent quantize → dequantize pair
///
/// A pair qualifies only when the quantize node's sole output has exactly
/// one recorded consumer and that consumer is a dequantize node. Fan-out,
/// zero consumers, or a non-dequantize consumer leave the quantize node in
/// place. Surviving consumers of the dequantize output are reconnected to
/// the quantize node's input tensor.
pub fn remove_all_quantize_ops(graph: &mut OnnxGraph) {
    let mut arena = NodeArena::from_nodes(std::mem::take(&mut graph.nodes));
    let index = build_consumer_index(&arena);

    let candidates: Vec<_> = arena
        .iter()
        .filter(|(_, node)| node.op_type == QUANTIZE_OP)
        .map(|(id, _)| id)
        .collect();

    for id in candidates {
        let Some(quantize) = arena.get(id) else {
            continue;
        };
        let Some(output) = quantize.first_output() else {
            continue;
        };

        let consumers = index.get(output).map(|c| c.as_slice()).unwrap_or(&[]);
        let [consumer_id] = consumers else {
            continue;
        };
        let Some(dequantize) = arena.get(*consumer_id) else {
            continue;
        };
        if dequantize.op_type != DEQUANTIZE_OP {
            continue;
        }
        let (Some(input_name), Some(output_name)) =
            (quantize.first_input(), dequantize.first_output())
        else {
            continue;
        };

        let input_name = input_name.to_string();
        let output_name = output_name.to_string();
        let quantize_name = quantize.name.clone();
        let dequantize_name = dequantize.name.clone();

        remove_node_by_name(&mut arena, &index, &quantize_name);
        remove_node_by_name(&mut arena, &index, &dequantize_name);
        replace_input_of_all_nodes(&mut arena, &index, &output_name, &input_name);
    }

    graph.nodes = arena.into_nodes();
}

/// Write the range table: one `tensor: scale*127` line per per-tensor entry
///
/// Per-channel records (more than one scale value) are skipped. Any
/// existing file at `path` is overwritten.
pub fn export_max_range(quantize_info: &QuantizeInfoMap, path: &Path) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    for (name, info) in quantize_info {
        if info.is_per_tensor() {
            writeln!(writer, "{}: {}", name, info.scale[0] * 127.0)?;
        }
    }

    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::extensions::make_node;

    fn report_path(tag: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("ir2onnx_{}_{}.txt", std::process::id(), tag))
    }

    fn qdq_graph() -> OnnxGraph {
        OnnxGraph {
            nodes: vec![
                make_node("Conv", &["x", "w"], &["p"], "producer_0"),
                make_node("QuantizeLinear", &["p", "s", "zp"], &["q1"], "quant_0"),
                make_node("DequantizeLinear", &["q1", "s", "zp"], &["dq1"], "dequant_0"),
                make_node("Relu", &["dq1"], &["y"], "consumer_0"),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_is_quantized() {
        assert!(is_quantized(&qdq_graph().nodes));
        assert!(!is_quantized(&[make_node("Relu", &["x"], &["y"], "r")]));
    }

    #[test]
    fn test_fuse_adjacent_pair() {
        let mut graph = qdq_graph();
        remove_all_quantize_ops(&mut graph);

        let kinds: Vec<&str> = graph.nodes.iter().map(|n| n.op_type.as_str()).collect();
        assert_eq!(kinds, vec!["Conv", "Relu"]);
        // Consumer reconnected straight to the producer output
        assert_eq!(graph.nodes[1].input, vec!["p"]);
    }

    #[test]
    fn test_fanout_disqualifies_fusion() {
        let mut graph = qdq_graph();
        // Second consumer of the quantize output
        graph
            .nodes
            .push(make_node("Identity", &["q1"], &["z"], "extra_0"));

        remove_all_quantize_ops(&mut graph);
        assert!(is_quantized(&graph.nodes));
        assert_eq!(graph.nodes.len(), 5);
    }

    #[test]
    fn test_unconsumed_quantize_kept() {
        let mut graph = OnnxGraph {
            nodes: vec![
                make_node("Conv", &["x", "w"], &["p"], "producer_0"),
                make_node("QuantizeLinear", &["p", "s", "zp"], &["q1"], "quant_0"),
            ],
            ..Default::default()
        };
        remove_all_quantize_ops(&mut graph);
        assert_eq!(graph.nodes.len(), 2);
    }

    #[test]
    fn test_non_dequantize_consumer_kept() {
        let mut graph = OnnxGraph {
            nodes: vec![
                make_node("QuantizeLinear", &["p", "s", "zp"], &["q1"], "quant_0"),
                make_node("Relu", &["q1"], &["y"], "relu_0"),
            ],
            ..Default::default()
        };
        remove_all_quantize_ops(&mut graph);
        assert_eq!(graph.nodes.len(), 2);
    }

    #[test]
    fn test_chained_pairs_both_fused() {
        let mut graph = OnnxGraph {
            nodes: vec![
                make_node("Conv", &["x", "w"], &["p"], "producer_0"),
                make_node("QuantizeLinear", &["p", "s", "zp"], &["q1"], "quant_0"),
                make_node("DequantizeLinear", &["q1", "s", "zp"], &["dq1"], "dequant_0"),
                make_node("QuantizeLinear", &["dq1", "s", "zp"], &["q2"], "quant_1"),
                make_node("DequantizeLinear", &["q2", "s", "zp"], &["dq2"], "dequant_1"),
                make_node("Relu", &["dq2"], &["y"], "consumer_0"),
            ],
            ..Default::default()
        };
        remove_all_quantize_ops(&mut graph);

        let kinds: Vec<&str> = graph.nodes.iter().map(|n| n.op_type.as_str()).collect();
        assert_eq!(kinds, vec!["Conv", "Relu"]);
        assert_eq!(graph.nodes[1].input, vec!["p"]);
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let mut graph = qdq_graph();
        remove_all_quantize_ops(&mut graph);
        let once = graph.nodes.clone();

        remove_all_quantize_ops(&mut graph);
        assert_eq!(graph.nodes, once);
    }

    #[test]
    fn test_generic_policy_scenario() {
        let mut graph = qdq_graph();
        let mut info = QuantizeInfoMap::default();
        info.insert("q1".to_string(), QuantizeInfo::per_tensor(0.05, 0));

        let path = report_path("scenario");
        process_with_report(&mut graph, &info, GENERIC_BACKEND, &path);

        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.nodes[1].input, vec!["p"]);

        let report = std::fs::read_to_string(&path).unwrap();
        assert_eq!(report, "q1: 6.35\n");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_per_channel_scales_skipped_in_report() {
        let mut info = QuantizeInfoMap::default();
        info.insert(
            "w".to_string(),
            QuantizeInfo::new(vec![0.1, 0.2], vec![0, 0]),
        );
        info.insert("q1".to_string(), QuantizeInfo::per_tensor(0.05, 0));

        let path = report_path("per_channel");
        export_max_range(&info, &path).unwrap();

        let report = std::fs::read_to_string(&path).unwrap();
        assert_eq!(report, "q1: 6.35\n");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_non_quantized_graph_untouched_no_io() {
        let mut graph = OnnxGraph {
            nodes: vec![make_node("Relu", &["x"], &["y"], "relu_0")],
            ..Default::default()
        };
        let before = graph.nodes.clone();
        let info = QuantizeInfoMap::default();

        let path = report_path("untouched");
        process_with_report(&mut graph, &info, GENERIC_BACKEND, &path);

        assert_eq!(graph.nodes, before);
        assert!(!path.exists());
    }

    #[test]
    fn test_unrecognized_backend_passes_through() {
        let mut graph = qdq_graph();
        let before = graph.nodes.clone();
        let info = QuantizeInfoMap::default();

        let path = report_path("backend");
        process_with_report(&mut graph, &info, "tensorrt", &path);

        assert_eq!(graph.nodes, before);
        assert!(!path.exists());
    }
}
