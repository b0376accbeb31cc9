//! Stable-index node storage
//!
//! During graph surgery, nodes are addressed by their position in the
//! original node list. Removal tombstones the slot instead of shifting
//! later entries, so a `NodeId` handed out by the consumer index stays
//! valid for the whole pass.

use crate::proto::NodeProto;

/// Stable index of a node within an arena
pub type NodeId = usize;

/// Node storage with tombstone removal
#[derive(Debug, Clone, Default)]
pub struct NodeArena {
    slots: Vec<Option<NodeProto>>,
}

impl NodeArena {
    /// Load a node list into the arena, preserving order
    pub fn from_nodes(nodes: Vec<NodeProto>) -> Self {
        Self {
            slots: nodes.into_iter().map(Some).collect(),
        }
    }

    /// Get a live node
    pub fn get(&self, id: NodeId) -> Option<&NodeProto> {
        self.slots.get(id).and_then(|slot| slot.as_ref())
    }

    /// Get a live node mutably
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeProto> {
        self.slots.get_mut(id).and_then(|slot| slot.as_mut())
    }

    /// Tombstone a node, returning it
    pub fn remove(&mut self, id: NodeId) -> Option<NodeProto> {
        self.slots.get_mut(id).and_then(|slot| slot.take())
    }

    /// Iterate live nodes in original order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &NodeProto)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.as_ref().map(|node| (id, node)))
    }

    /// Find a live node by its node name
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.iter().find(|(_, node)| node.name == name).map(|(id, _)| id)
    }

    /// Number of live nodes
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Collapse back into a node list, dropping tombstones
    pub fn into_nodes(self) -> Vec<NodeProto> {
        self.slots.into_iter().flatten().collect()
    }
}
