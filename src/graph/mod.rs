//! Target-graph containers and surgery primitives
//!
//! `OnnxGraph` is the produced graph during and after translation. For the
//! rewrite phase its node list is loaded into a `NodeArena` (stable-index
//! storage), indexed with a `ConsumerIndex`, and mutated through the edge
//! splicer in `mutators`.

pub mod arena;
pub mod maps;
pub mod mutators;

pub use arena::{NodeArena, NodeId};
pub use maps::{build_consumer_index, ConsumerIndex};
pub use mutators::{remove_node_by_name, replace_input_of_all_nodes};

use crate::proto::{GraphProto, NodeProto, TensorProto, ValueInfoProto};

/// The produced target-IR graph, prior to protobuf wrapping
///
/// Every non-empty input name referenced by a node is produced by a graph
/// input, an initializer, or another node's output.
#[derive(Debug, Clone, Default)]
pub struct OnnxGraph {
    /// Nodes in topological (emission) order
    pub nodes: Vec<NodeProto>,
    /// Trained parameters
    pub initializers: Vec<TensorProto>,
    /// Graph input descriptors
    pub inputs: Vec<ValueInfoProto>,
    /// Graph output descriptors
    pub outputs: Vec<ValueInfoProto>,
}

impl OnnxGraph {
    /// Wrap into a `GraphProto` with the given name
    pub fn into_graph_proto(self, name: &str) -> GraphProto {
        GraphProto {
            node: self.nodes,
            name: name.to_string(),
            initializer: self.initializers,
            input: self.inputs,
            output: self.outputs,
            ..Default::default()
        }
    }
}
