//! Edge splicing
//!
//! Destructive-but-edge-consistent graph mutation: removing a node splices
//! its consumers onto its first input, and input rewrites go through the
//! consumer index so only recorded consumers are touched. Callers rebuild
//! the index after structural changes if they need fresh lookups on the
//! same names.

use super::arena::NodeArena;
use super::maps::ConsumerIndex;

/// Remove the named node and splice its consumers onto its first input
///
/// Every node recorded as consuming the removed node's first output is
/// rewritten to reference its first input instead. A name that matches no
/// live node is a silent no-op. Eligible nodes have exactly one first
/// input and one first output; a malformed node is tombstoned without
/// splicing.
pub fn remove_node_by_name(arena: &mut NodeArena, index: &ConsumerIndex, name: &str) {
    let Some(id) = arena.find_by_name(name) else {
        return;
    };
    let Some(node) = arena.remove(id) else {
        return;
    };

    match (node.first_input(), node.first_output()) {
        (Some(input_name), Some(output_name))
            if !input_name.is_empty() && !output_name.is_empty() =>
        {
            replace_input_of_all_nodes(arena, index, output_name, input_name);
        }
        _ => {}
    }
}

/// Rewrite every indexed consumer of `old_name` to reference `new_name`
///
/// Each occurrence of `old_name` among a recorded consumer's inputs is
/// rewritten in place, preserving slot order and multiplicity. Tombstoned
/// consumers are skipped; nodes the index never recorded are untouched.
pub fn replace_input_of_all_nodes(
    arena: &mut NodeArena,
    index: &ConsumerIndex,
    old_name: &str,
    new_name: &str,
) {
    let Some(consumers) = index.get(old_name) else {
        return;
    };

    for &id in consumers {
        if let Some(node) = arena.get_mut(id) {
            for input in &mut node.input {
                if input == old_name {
                    *input = new_name.to_string();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::maps::build_consumer_index;
    use crate::proto::extensions::make_node;

    #[test]
    fn test_remove_splices_consumers() {
        let mut arena = NodeArena::from_nodes(vec![
            make_node("Conv", &["x", "w"], &["a"], "conv_0"),
            make_node("Identity", &["a"], &["b"], "id_0"),
            make_node("Relu", &["b"], &["y"], "relu_0"),
        ]);
        let index = build_consumer_index(&arena);

        remove_node_by_name(&mut arena, &index, "id_0");

        assert_eq!(arena.live_count(), 2);
        let relu = arena.get(2).unwrap();
        assert_eq!(relu.input[0], "a");
    }

    #[test]
    fn test_remove_missing_node_is_noop() {
        let mut arena = NodeArena::from_nodes(vec![make_node("Relu", &["x"], &["y"], "relu_0")]);
        let index = build_consumer_index(&arena);

        remove_node_by_name(&mut arena, &index, "absent");
        assert_eq!(arena.live_count(), 1);
    }

    #[test]
    fn test_replace_preserves_slots_and_multiplicity() {
        // a feeds B, C, D; B references it in two slots
        let mut arena = NodeArena::from_nodes(vec![
            make_node("Producer", &["x"], &["a"], "p_0"),
            make_node("Add", &["a", "a"], &["b"], "b_0"),
            make_node("Mul", &["c", "a"], &["d"], "c_0"),
            make_node("Relu", &["a"], &["e"], "d_0"),
            make_node("Neg", &["other"], &["f"], "e_0"),
        ]);
        let index = build_consumer_index(&arena);

        replace_input_of_all_nodes(&mut arena, &index, "a", "X");

        assert_eq!(arena.get(1).unwrap().input, vec!["X", "X"]);
        assert_eq!(arena.get(2).unwrap().input, vec!["c", "X"]);
        assert_eq!(arena.get(3).unwrap().input, vec!["X"]);
        // Unrelated node untouched
        assert_eq!(arena.get(4).unwrap().input, vec!["other"]);
    }

    #[test]
    fn test_replace_unindexed_name_is_noop() {
        let mut arena = NodeArena::from_nodes(vec![make_node("Relu", &["x"], &["y"], "relu_0")]);
        let index = build_consumer_index(&arena);

        replace_input_of_all_nodes(&mut arena, &index, "nope", "X");
        assert_eq!(arena.get(0).unwrap().input, vec!["x"]);
    }

    #[test]
    fn test_replace_skips_tombstoned_consumers() {
        let mut arena = NodeArena::from_nodes(vec![
            make_node("Producer", &["x"], &["a"], "p_0"),
            make_node("Relu", &["a"], &["y"], "r_0"),
        ]);
        let index = build_consumer_index(&arena);

        arena.remove(1);
        // Stale index entry for "a" still lists the removed node
        replace_input_of_all_nodes(&mut arena, &index, "a", "X");
        assert_eq!(arena.live_count(), 1);
    }
}
