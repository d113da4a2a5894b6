//! Checkbox selection with ancestor/descendant propagation.
//!
//! Selecting walks toward the root; unselecting clears the subtree and then
//! releases ancestors that no longer have a selected child. The root is never
//! selected. Invalid targets are no-ops.

use tracing::{instrument, trace};

use crate::node::NodeId;
use crate::store::NodeStore;

/// Nodes whose selected flag flipped, in the order they flipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionChange {
    /// New value of the flag for every node in `nodes`
    pub checked: bool,
    pub nodes: Vec<NodeId>,
}

impl SelectionChange {
    fn new(checked: bool) -> Self {
        Self {
            checked,
            nodes: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }
}

pub trait Selection {
    /// Select `id` and every unselected ancestor below the root.
    fn select_toward_root(&mut self, id: NodeId) -> SelectionChange;

    /// Unselect every descendant of `id`, then `id` itself and each ancestor
    /// left without a selected child.
    fn unselect_with_children(&mut self, id: NodeId) -> SelectionChange;

    /// What a click does: unselect a selected node, select an unselected one.
    fn toggle(&mut self, id: NodeId) -> SelectionChange;
}

impl<P> Selection for NodeStore<P> {
    #[instrument(level = "debug", skip(self))]
    fn select_toward_root(&mut self, id: NodeId) -> SelectionChange {
        let mut change = SelectionChange::new(true);
        let mut current = Some(id);

        // stops at the root or at the first node that is already selected
        while let Some(node_id) = current {
            if !self.set_selected(node_id, true) {
                break;
            }
            change.nodes.push(node_id);
            current = self.node(node_id).and_then(|n| n.parent);
        }
        trace!(changed = change.nodes.len(), "selected");
        change
    }

    #[instrument(level = "debug", skip(self))]
    fn unselect_with_children(&mut self, id: NodeId) -> SelectionChange {
        let mut change = SelectionChange::new(false);
        if id.is_root() || !self.contains(id) {
            return change;
        }

        for descendant in self.descendants(id) {
            if self.set_selected(descendant, false) {
                change.nodes.push(descendant);
            }
        }

        let mut current = Some(id);
        while let Some(node_id) = current {
            let release = !node_id.is_root()
                && self.node(node_id).is_some_and(|n| n.is_selected())
                && !self.has_selected_children(node_id);
            if !release {
                break;
            }
            self.set_selected(node_id, false);
            change.nodes.push(node_id);
            current = self.node(node_id).and_then(|n| n.parent);
        }
        trace!(changed = change.nodes.len(), "unselected");
        change
    }

    fn toggle(&mut self, id: NodeId) -> SelectionChange {
        let selected = match self.get_node(id) {
            Some(node) => node.is_selected(),
            None => return SelectionChange::default(),
        };
        if selected {
            self.unselect_with_children(id)
        } else {
            self.select_toward_root(id)
        }
    }
}
