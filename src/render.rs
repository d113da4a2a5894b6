//! Display side of the tree: a renderer turns one node into something a view
//! can show, and `TreeNodeConvert` dumps a whole store as a `termtree`.

use std::fmt;

use colored::Colorize;
use termtree::Tree;
use tracing::instrument;

use crate::config::RenderSettings;
use crate::node::{CheckState, Node, NodeId};
use crate::store::NodeStore;

/// Produces the display representation of a single node.
pub trait NodeRenderer<P> {
    type Output;

    fn render(&self, store: &NodeStore<P>, node: &Node<P>) -> Self::Output;

    /// Render a branch that is currently open.
    fn render_expanded(&self, store: &NodeStore<P>, node: &Node<P>) -> Self::Output {
        self.render(store, node)
    }
}

/// One checkbox line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNode {
    pub id: NodeId,
    pub label: String,
    pub state: CheckState,
    /// Has children that can be opened
    pub expandable: bool,
    line: String,
}

impl fmt::Display for RenderedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.line)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextRenderer {
    settings: RenderSettings,
}

impl TextRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }
}

/// Checkbox glyph for a state, coloured if configured.
pub fn checkbox(settings: &RenderSettings, state: CheckState) -> String {
    let glyph = match state {
        CheckState::Checked => &settings.checked,
        CheckState::Partial => &settings.partial,
        CheckState::Unchecked => &settings.unchecked,
    };
    if !settings.color {
        return glyph.clone();
    }
    match state {
        CheckState::Checked => glyph.green().to_string(),
        CheckState::Partial => glyph.yellow().to_string(),
        CheckState::Unchecked => glyph.to_string(),
    }
}

impl TextRenderer {
    fn line<P>(&self, store: &NodeStore<P>, node: &Node<P>, expanded: bool) -> RenderedNode {
        let state = store.check_state(node.id()).unwrap_or(CheckState::Unchecked);
        let expandable = !node.is_leaf();
        let marker = match (expandable, expanded) {
            (false, _) => " ",
            (true, true) => self.settings.expanded.as_str(),
            (true, false) => self.settings.collapsed.as_str(),
        };
        let line = format!(
            "{} {} {}",
            marker,
            checkbox(&self.settings, state),
            node.name()
        );

        RenderedNode {
            id: node.id(),
            label: node.name().to_string(),
            state,
            expandable,
            line,
        }
    }
}

impl<P> NodeRenderer<P> for TextRenderer {
    type Output = RenderedNode;

    fn render(&self, store: &NodeStore<P>, node: &Node<P>) -> RenderedNode {
        self.line(store, node, false)
    }

    fn render_expanded(&self, store: &NodeStore<P>, node: &Node<P>) -> RenderedNode {
        self.line(store, node, true)
    }
}

pub trait TreeNodeConvert {
    fn to_tree_string(&self, settings: &RenderSettings) -> Tree<String>;
}

impl<P> TreeNodeConvert for NodeStore<P> {
    #[instrument(level = "debug", skip_all)]
    fn to_tree_string(&self, settings: &RenderSettings) -> Tree<String> {
        fn build_tree<P>(
            store: &NodeStore<P>,
            settings: &RenderSettings,
            node: &Node<P>,
            parent_tree: &mut Tree<String>,
        ) {
            for &child_id in node.children() {
                if let Some(child) = store.node(child_id) {
                    let state = store.check_state(child_id).unwrap_or(CheckState::Unchecked);
                    let marker = if child.is_leaf() {
                        String::new()
                    } else {
                        format!("{} ", settings.expanded)
                    };
                    let mut child_tree = Tree::new(format!(
                        "{}{} {}",
                        marker,
                        checkbox(settings, state),
                        child.name()
                    ));
                    build_tree(store, settings, child, &mut child_tree);
                    parent_tree.push(child_tree);
                }
            }
        }

        let root = self.root();
        let mut tree = Tree::new(self.path_settings().root_key.clone());
        build_tree(self, settings, root, &mut tree);
        tree
    }
}
