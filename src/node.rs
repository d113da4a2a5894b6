use std::fmt;

use serde::Deserialize;

use crate::errors::{TreeError, TreeResult};

/// Identity of a node in a [`NodeStore`](crate::store::NodeStore).
///
/// The root is a sentinel and never counts as a selectable node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId {
    Root,
    Item(u64),
}

impl NodeId {
    pub fn is_root(&self) -> bool {
        matches!(self, NodeId::Root)
    }

    /// Numeric identity, `None` for the root.
    pub fn number(&self) -> Option<u64> {
        match self {
            NodeId::Root => None,
            NodeId::Item(n) => Some(*n),
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Root => write!(f, "root"),
            NodeId::Item(n) => write!(f, "{}", n),
        }
    }
}

impl From<u64> for NodeId {
    fn from(n: u64) -> Self {
        NodeId::Item(n)
    }
}

impl<P> From<&Node<P>> for NodeId {
    fn from(node: &Node<P>) -> Self {
        node.id
    }
}

/// Tree node owned by the store.
///
/// Links are stored as identities; the store keeps `parent` and the parent's
/// `children` in agreement.
#[derive(Debug, Clone)]
pub struct Node<P> {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) payload: Option<P>,
    pub(crate) selected: bool,
    pub(crate) loaded: bool,
    pub(crate) children_loaded: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl<P> Node<P> {
    pub(crate) fn new(id: NodeId, name: String, payload: P, parent: Option<NodeId>) -> Self {
        Self {
            id,
            name,
            payload: Some(payload),
            selected: false,
            loaded: false,
            children_loaded: false,
            parent,
            children: Vec::new(),
        }
    }

    pub(crate) fn root() -> Self {
        Self {
            id: NodeId::Root,
            name: String::new(),
            payload: None,
            selected: false,
            loaded: false,
            children_loaded: false,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Associated data, `None` only for the root.
    pub fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.id.is_root()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Rendered at least once.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Children materialized for display.
    pub fn is_children_loaded(&self) -> bool {
        self.children_loaded
    }
}

/// Checkbox state derived from a node and its direct children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Unchecked,
    /// Selected, with some but not all children selected
    Partial,
    Checked,
}

/// Descriptor consumed by `index` and `add_node`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Item<P> {
    pub name: String,
    pub payload: P,
    #[serde(default = "Vec::new")]
    pub children: Vec<Item<P>>,
    /// Initially selected; applied toward the root on creation, not stored
    #[serde(default)]
    pub selected: bool,
}

impl<P> Item<P> {
    pub fn new(name: impl Into<String>, payload: P) -> Self {
        Self {
            name: name.into(),
            payload,
            children: Vec::new(),
            selected: false,
        }
    }

    pub fn with_children(mut self, children: Vec<Item<P>>) -> Self {
        self.children = children;
        self
    }

    pub fn child(mut self, child: Item<P>) -> Self {
        self.children.push(child);
        self
    }

    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }
}

impl Item<()> {
    /// Item without payload.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, ())
    }
}

/// Top-level descriptor document: `[[items]]` tables with nested `[[items.children]]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ItemList<P> {
    #[serde(default = "Vec::new")]
    pub items: Vec<Item<P>>,
}

impl<P> ItemList<P>
where
    P: for<'de> Deserialize<'de>,
{
    pub fn from_toml_str(content: &str) -> TreeResult<Self> {
        toml::from_str(content).map_err(|e| TreeError::Parse(e.to_string()))
    }
}

impl<P> IntoIterator for ItemList<P> {
    type Item = Item<P>;
    type IntoIter = std::vec::IntoIter<Item<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
