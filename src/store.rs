//! Node store: owns the tree, hands out identities and keeps the lookup
//! indices (by id, by path, by parent path) in step with every mutation.

use std::collections::HashMap;

use generational_arena::{Arena, Index};
use itertools::Itertools;
use tracing::{debug, instrument, warn};

use crate::config::PathSettings;
use crate::errors::{TreeError, TreeResult};
use crate::events::{Observers, ParentPathIndex, StoreEvent, SubscriptionId};
use crate::node::{CheckState, Item, Node, NodeId};
use crate::selection::Selection;

#[derive(Debug)]
pub struct NodeStore<P> {
    arena: Arena<Node<P>>,
    root: Index,
    by_id: HashMap<NodeId, Index>,
    by_path: HashMap<String, NodeId>,
    by_parent_path: ParentPathIndex,
    /// Next item identity; never rewinds
    next_id: u64,
    paths: PathSettings,
    observers: Observers<P>,
}

impl<P> Default for NodeStore<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> NodeStore<P> {
    pub fn new() -> Self {
        Self::with_paths(PathSettings::default())
    }

    pub fn with_paths(paths: PathSettings) -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(Node::root());
        let mut by_id = HashMap::new();
        by_id.insert(NodeId::Root, root);

        Self {
            arena,
            root,
            by_id,
            by_path: HashMap::new(),
            by_parent_path: ParentPathIndex::new(),
            next_id: 0,
            paths,
            observers: Observers::new(),
        }
    }

    /// Store populated from `items`, without notifying anyone.
    pub fn from_items(items: impl IntoIterator<Item = Item<P>>) -> Self {
        let mut store = Self::new();
        store.index(items);
        store
    }

    pub fn path_settings(&self) -> &PathSettings {
        &self.paths
    }

    // ---------------------------------------------------------------
    // Events
    // ---------------------------------------------------------------

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&StoreEvent<'_, P>) + 'static,
    {
        self.observers.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    // ---------------------------------------------------------------
    // Lookup
    // ---------------------------------------------------------------

    /// Node for an item identity. The root is not addressable this way.
    pub fn get_node(&self, id: NodeId) -> Option<&Node<P>> {
        if id.is_root() {
            return None;
        }
        self.node(id)
    }

    pub fn root(&self) -> &Node<P> {
        &self.arena[self.root]
    }

    /// Any live node, root included.
    pub fn node(&self, id: NodeId) -> Option<&Node<P>> {
        self.by_id.get(&id).and_then(|&idx| self.arena.get(idx))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<P>> {
        match self.by_id.get(&id) {
            Some(&idx) => self.arena.get_mut(idx),
            None => None,
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn find_by_path(&self, path: &str) -> Option<NodeId> {
        self.by_path.get(path).copied()
    }

    pub fn children_of_path(&self, parent_path: &str) -> &[NodeId] {
        self.by_parent_path
            .get(parent_path)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent_path_index(&self) -> &ParentPathIndex {
        &self.by_parent_path
    }

    /// Number of nodes, root excluded.
    pub fn len(&self) -> usize {
        self.by_id.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every node currently selected, ordered by identity.
    pub fn selected_nodes(&self) -> Vec<&Node<P>> {
        self.by_id
            .iter()
            .filter_map(|(_, &idx)| self.arena.get(idx))
            .filter(|node| node.selected)
            .sorted_by_key(|node| node.id)
            .collect()
    }

    // ---------------------------------------------------------------
    // Derived properties
    // ---------------------------------------------------------------

    /// Names from the top-level ancestor down to the node, root excluded.
    pub fn path(&self, id: NodeId) -> Option<String> {
        let node = self.node(id)?;
        let mut names = vec![node.name.as_str()];
        let mut current = node.parent;
        while let Some(parent) = current.and_then(|p| self.node(p)) {
            if parent.is_root() {
                break;
            }
            names.push(parent.name.as_str());
            current = parent.parent;
        }
        Some(names.into_iter().rev().join(&self.paths.separator))
    }

    /// Path of the parent, or the root key for top-level nodes.
    pub fn parent_path(&self, id: NodeId) -> Option<String> {
        let parent = self.node(id)?.parent?;
        self.parent_key(parent)
    }

    fn parent_key(&self, parent: NodeId) -> Option<String> {
        if parent.is_root() {
            Some(self.paths.root_key.clone())
        } else {
            self.path(parent)
        }
    }

    /// Ancestors from the parent up to and including the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut ancestors = Vec::new();
        let mut current = self.node(id).and_then(|n| n.parent);
        while let Some(parent_id) = current {
            ancestors.push(parent_id);
            current = self.node(parent_id).and_then(|n| n.parent);
        }
        ancestors
    }

    /// Descendants in pre-order, the node itself excluded.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = match self.node(id) {
            Some(node) => node.children.iter().rev().copied().collect(),
            None => return result,
        };
        while let Some(current) = stack.pop() {
            if let Some(node) = self.node(current) {
                result.push(current);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        result
    }

    pub fn has_selected_children(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|node| {
            node.children
                .iter()
                .any(|&c| self.node(c).is_some_and(|child| child.selected))
        })
    }

    /// False for nodes without children.
    pub fn has_all_selected_children(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|node| {
            !node.children.is_empty()
                && node
                    .children
                    .iter()
                    .all(|&c| self.node(c).is_some_and(|child| child.selected))
        })
    }

    pub fn check_state(&self, id: NodeId) -> Option<CheckState> {
        let node = self.node(id)?;
        let state = if !node.selected {
            CheckState::Unchecked
        } else if self.has_selected_children(id) && !self.has_all_selected_children(id) {
            CheckState::Partial
        } else {
            CheckState::Checked
        };
        Some(state)
    }

    // ---------------------------------------------------------------
    // Flags
    // ---------------------------------------------------------------

    pub fn mark_loaded(&mut self, id: NodeId) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.loaded = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_children_loaded(&mut self, id: NodeId) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.children_loaded = true;
                true
            }
            None => false,
        }
    }

    /// Flips the selected flag; returns whether it changed. The root is never selected.
    pub(crate) fn set_selected(&mut self, id: NodeId, selected: bool) -> bool {
        if id.is_root() {
            return false;
        }
        match self.node_mut(id) {
            Some(node) if node.selected != selected => {
                node.selected = selected;
                true
            }
            _ => false,
        }
    }

    // ---------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------

    /// Replace the whole tree with one built from `items`.
    ///
    /// Identities keep counting from where the previous tree stopped.
    /// Descriptors whose path is already taken are skipped with their
    /// subtrees. That includes a top-level name equal to the root key, and a
    /// name containing the separator that spells an existing nested path
    /// (`"a/b"` next to `a` with child `b`): the later one loses.
    #[instrument(level = "debug", skip_all)]
    pub fn index(&mut self, items: impl IntoIterator<Item = Item<P>>) -> Vec<NodeId> {
        self.arena.clear();
        self.by_id.clear();
        self.by_path.clear();
        self.by_parent_path.clear();
        self.root = self.arena.insert(Node::root());
        self.by_id.insert(NodeId::Root, self.root);

        let mut top_level = Vec::new();
        for item in items {
            match self.insert_item(NodeId::Root, item) {
                Ok(id) => top_level.push(id),
                Err(e) => warn!("skipping item: {}", e),
            }
        }
        debug!(nodes = self.len(), "reindexed");

        self.observers
            .emit(&StoreEvent::Reindexed(&self.by_parent_path));
        top_level
    }

    /// Add `item` (and its nested children) under `parent`.
    #[instrument(level = "debug", skip(self, item), fields(name = %item.name))]
    pub fn try_add_node(&mut self, parent: NodeId, item: Item<P>) -> TreeResult<NodeId> {
        if !self.contains(parent) {
            return Err(TreeError::InvalidParent(parent));
        }
        let id = self.insert_item(parent, item)?;

        if let Some(&idx) = self.by_id.get(&id) {
            self.observers.emit(&StoreEvent::Added(&self.arena[idx]));
        }
        Ok(id)
    }

    /// [`try_add_node`](Self::try_add_node) with errors absorbed into `None`.
    pub fn add_node(&mut self, parent: NodeId, item: Item<P>) -> Option<NodeId> {
        self.try_add_node(parent, item)
            .map_err(|e| debug!("add_node ignored: {}", e))
            .ok()
    }

    /// Remove a node and its whole subtree.
    ///
    /// `Removed` is emitted while the subtree is still linked. Removing the
    /// root empties the tree but keeps the root itself.
    #[instrument(level = "debug", skip(self, reference))]
    pub fn try_remove_node(&mut self, reference: impl Into<NodeId>) -> TreeResult<()> {
        let id = reference.into();
        let idx = *self
            .by_id
            .get(&id)
            .ok_or(TreeError::InvalidReference(id))?;

        self.observers.emit(&StoreEvent::Removed(&self.arena[idx]));

        let mut doomed = self.descendants(id);
        if !id.is_root() {
            doomed.insert(0, id);
        }

        // Index keys first, while parent links still resolve
        let keys: Vec<(NodeId, Option<String>, Option<String>)> = doomed
            .iter()
            .map(|&d| (d, self.path(d), self.parent_path(d)))
            .collect();
        for (d, path, parent_path) in keys {
            if let Some(path) = path {
                self.by_path.remove(&path);
            }
            if let Some(parent_path) = parent_path {
                if let Some(siblings) = self.by_parent_path.get_mut(&parent_path) {
                    siblings.retain(|&s| s != d);
                    if siblings.is_empty() {
                        self.by_parent_path.remove(&parent_path);
                    }
                }
            }
        }

        if id.is_root() {
            self.arena[idx].children.clear();
        } else if let Some(parent) = self.arena[idx].parent {
            if let Some(parent_node) = self.node_mut(parent) {
                parent_node.children.retain(|&c| c != id);
            }
        }

        for d in doomed {
            if let Some(slot) = self.by_id.remove(&d) {
                self.arena.remove(slot);
            }
        }
        debug!(%id, remaining = self.len(), "removed");
        Ok(())
    }

    /// [`try_remove_node`](Self::try_remove_node) with errors absorbed into `false`.
    pub fn remove_node(&mut self, reference: impl Into<NodeId>) -> bool {
        self.try_remove_node(reference)
            .map_err(|e| debug!("remove_node ignored: {}", e))
            .is_ok()
    }

    /// Materialize `item` under `parent` in pre-order, assigning identities as
    /// nodes are created. Nested duplicates are skipped with their subtrees.
    #[instrument(level = "trace", skip(self, item))]
    fn insert_item(&mut self, parent: NodeId, item: Item<P>) -> TreeResult<NodeId> {
        let top = self.link(parent, item.name, item.payload, item.selected)?;

        let mut stack: Vec<(NodeId, Item<P>)> =
            item.children.into_iter().rev().map(|c| (top, c)).collect();
        while let Some((parent_id, child)) = stack.pop() {
            match self.link(parent_id, child.name, child.payload, child.selected) {
                Ok(id) => stack.extend(child.children.into_iter().rev().map(|c| (id, c))),
                Err(e) => warn!("skipping nested item: {}", e),
            }
        }
        Ok(top)
    }

    /// Create one node, link it under `parent` and record it in every index.
    fn link(&mut self, parent: NodeId, name: String, payload: P, selected: bool) -> TreeResult<NodeId> {
        let parent_path = self
            .parent_key(parent)
            .ok_or(TreeError::InvalidParent(parent))?;
        let path = if parent.is_root() {
            name.clone()
        } else {
            format!("{}{}{}", parent_path, self.paths.separator, name)
        };
        // the root key names the top level in the parent-path index
        if path == self.paths.root_key {
            return Err(TreeError::DuplicatePath(path));
        }
        if let Some(&existing) = self.by_path.get(&path) {
            let sep = &self.paths.separator;
            let spans_levels = name.contains(sep.as_str())
                || self
                    .node(existing)
                    .is_some_and(|n| n.name.contains(sep.as_str()));
            if spans_levels {
                warn!(%path, separator = %sep, "name containing the separator collides with a nested path");
            }
            return Err(TreeError::DuplicatePath(path));
        }

        let id = NodeId::Item(self.next_id);
        self.next_id += 1;

        let idx = self.arena.insert(Node::new(id, name, payload, Some(parent)));
        self.by_id.insert(id, idx);
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.push(id);
        }
        self.by_path.insert(path, id);
        self.by_parent_path.entry(parent_path).or_default().push(id);

        if selected {
            self.select_toward_root(id);
        }
        Ok(id)
    }
}
