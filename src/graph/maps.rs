//! Consumer indexing
//!
//! Maps every tensor name to the nodes that consume it as an input. The
//! index is derived from the arena and rebuildable at any time; the arena's
//! node input lists remain the source of truth.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::arena::{NodeArena, NodeId};

/// Tensor name → consumer node ids, in graph order
///
/// SmallVec optimized for the common case of 1-4 consumers.
pub type ConsumerIndex = FxHashMap<String, SmallVec<[NodeId; 4]>>;

/// Build the consumer index over all live nodes
///
/// A tensor name absent from the index simply has no recorded consumers;
/// empty input slots (omitted optional operands) are skipped.
pub fn build_consumer_index(arena: &NodeArena) -> ConsumerIndex {
    let mut index: ConsumerIndex = FxHashMap::default();

    for (id, node) in arena.iter() {
        for input in &node.input {
            if !input.is_empty() {
                index.entry(input.clone()).or_default().push(id);
            }
        }
    }

    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::extensions::make_node;

    #[test]
    fn test_build_consumer_index() {
        let arena = NodeArena::from_nodes(vec![
            make_node("Conv", &["x", "w"], &["a"], "conv_0"),
            make_node("Add", &["a", "a"], &["b"], "add_0"),
            make_node("Mul", &["a", "b"], &["y"], "mul_0"),
        ]);
        let index = build_consumer_index(&arena);

        // add_0 appears twice for "a": once per referencing slot
        assert_eq!(index["a"].as_slice(), &[1usize, 1, 2][..]);
        assert_eq!(index["b"].as_slice(), &[2usize][..]);
        assert_eq!(index["x"].as_slice(), &[0usize][..]);
        assert!(index.get("y").is_none());
    }

    #[test]
    fn test_empty_inputs_skipped() {
        let arena = NodeArena::from_nodes(vec![make_node(
            "Clip",
            &["x", "", "max"],
            &["y"],
            "clip_0",
        )]);
        let index = build_consumer_index(&arena);

        assert!(index.get("").is_none());
        assert_eq!(index["x"].as_slice(), &[0usize][..]);
        assert_eq!(index["max"].as_slice(), &[0usize][..]);
    }
}
