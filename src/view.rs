//! Drives a [`NodeRenderer`] over a [`NodeStore`] the way a lazy checkbox tree
//! widget does: top level rendered up front, children rendered the first time
//! a branch is opened, and only rendered checkboxes reported back on a click.

use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::events::{StoreEvent, SubscriptionId};
use crate::node::{Item, Node, NodeId};
use crate::render::NodeRenderer;
use crate::selection::{Selection, SelectionChange};
use crate::store::NodeStore;

type ChangeHandler<P> = Box<dyn FnMut(&NodeStore<P>)>;

pub struct TreeView<P, R> {
    store: NodeStore<P>,
    renderer: R,
    expanded: HashSet<NodeId>,
    on_change: Option<ChangeHandler<P>>,
}

impl<P, R> TreeView<P, R>
where
    R: NodeRenderer<P>,
{
    /// Wraps `store` and renders its top level.
    pub fn new(store: NodeStore<P>, renderer: R) -> Self {
        let mut view = Self {
            store,
            renderer,
            expanded: HashSet::new(),
            on_change: None,
        };
        view.render_root();
        view
    }

    pub fn store(&self) -> &NodeStore<P> {
        &self.store
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_store(self) -> NodeStore<P> {
        self.store
    }

    /// Called after every click, add and remove.
    pub fn on_change<F>(&mut self, handler: F)
    where
        F: FnMut(&NodeStore<P>) + 'static,
    {
        self.on_change = Some(Box::new(handler));
    }

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&StoreEvent<'_, P>) + 'static,
    {
        self.store.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    fn changed(&mut self) {
        if let Some(handler) = self.on_change.as_mut() {
            handler(&self.store);
        }
    }

    /// Render the children of the root.
    pub fn render_root(&mut self) -> Vec<R::Output> {
        self.render_children(NodeId::Root).unwrap_or_default()
    }

    /// Render the children of `id`, marking each of them loaded and `id`
    /// children-loaded. `None` if `id` does not exist.
    #[instrument(level = "trace", skip(self))]
    pub fn render_children(&mut self, id: NodeId) -> Option<Vec<R::Output>> {
        let children = self.store.node(id)?.children().to_vec();
        for &child in &children {
            self.store.mark_loaded(child);
        }
        self.store.mark_children_loaded(id);

        let output = children
            .iter()
            .filter_map(|&child| self.store.node(child))
            .map(|node| self.render_one(node))
            .collect();
        Some(output)
    }

    /// Render the line of `id` itself, e.g. after it was opened or closed.
    pub fn render_node(&self, id: NodeId) -> Option<R::Output> {
        self.store.get_node(id).map(|node| self.render_one(node))
    }

    fn render_one(&self, node: &Node<P>) -> R::Output {
        if self.expanded.contains(&node.id()) {
            self.renderer.render_expanded(&self.store, node)
        } else {
            self.renderer.render(&self.store, node)
        }
    }

    /// Toggle a branch open or closed. Children are rendered on the first
    /// open only; later calls return `None`.
    pub fn open_node(&mut self, id: NodeId) -> Option<Vec<R::Output>> {
        let children_loaded = self.store.get_node(id)?.is_children_loaded();
        let rendered = if children_loaded {
            None
        } else {
            self.render_children(id)
        };

        if !self.expanded.remove(&id) {
            self.expanded.insert(id);
        }
        rendered
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.expanded.contains(&id)
    }

    /// Toggle the selection of `id`. The returned change only lists nodes
    /// that have been rendered, i.e. checkboxes that need syncing. Unknown
    /// ids leave the store alone and do not fire the change handler.
    #[instrument(level = "debug", skip(self))]
    pub fn click(&mut self, id: NodeId) -> SelectionChange {
        if self.store.get_node(id).is_none() {
            debug!("click on unknown node ignored");
            return SelectionChange::default();
        }
        let mut change = self.store.toggle(id);
        change
            .nodes
            .retain(|&n| self.store.node(n).is_some_and(|node| node.is_loaded()));
        debug!(checked = change.checked, visible = change.nodes.len(), "click");
        self.changed();
        change
    }

    /// Add through the store. When the parent's children are already on
    /// screen they are rendered again and returned.
    pub fn add_node(&mut self, parent: NodeId, item: Item<P>) -> Option<(NodeId, Option<Vec<R::Output>>)> {
        let id = self.store.add_node(parent, item)?;
        let parent_loaded = self
            .store
            .node(parent)
            .is_some_and(|node| node.is_children_loaded());
        let rendered = if parent_loaded {
            self.render_children(parent)
        } else {
            None
        };
        self.changed();
        Some((id, rendered))
    }

    /// Unselect `id` with its children (releasing ancestors), then remove it.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        if !self.store.contains(id) {
            return false;
        }
        self.store.unselect_with_children(id);
        let removed = self.store.remove_node(id);

        let store = &self.store;
        self.expanded.retain(|&e| store.contains(e));
        self.changed();
        removed
    }

    /// Rebuild the store from `items` and render the new top level.
    pub fn reindex(&mut self, items: impl IntoIterator<Item = Item<P>>) -> Vec<R::Output> {
        self.store.index(items);
        self.expanded.clear();
        self.render_root()
    }
}
