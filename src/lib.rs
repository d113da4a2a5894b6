//! Hierarchical checkbox tree.
//!
//! [`NodeStore`] owns the nodes, assigns identities and keeps the path
//! indices current; [`Selection`] propagates checkbox state toward the root
//! on select and through the subtree on unselect. [`TreeView`] drives a
//! [`NodeRenderer`] over a store with lazy, open-on-demand rendering.
//!
//! ```
//! use checktree::{Item, NodeStore, Selection};
//!
//! let mut store = NodeStore::from_items(vec![Item::named("a").child(Item::named("b"))]);
//! let b = store.find_by_path("a/b").unwrap();
//! store.toggle(b);
//! assert_eq!(store.selected_nodes().len(), 2);
//! ```

pub mod config;
pub mod errors;
pub mod events;
pub mod node;
pub mod render;
pub mod selection;
pub mod store;
pub mod util;
pub mod view;

pub use config::Settings;
pub use errors::{TreeError, TreeResult};
pub use events::{StoreEvent, SubscriptionId};
pub use node::{CheckState, Item, ItemList, Node, NodeId};
pub use render::{NodeRenderer, RenderedNode, TextRenderer, TreeNodeConvert};
pub use selection::{Selection, SelectionChange};
pub use store::NodeStore;
pub use view::TreeView;
