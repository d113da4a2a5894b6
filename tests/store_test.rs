//! Structural behaviour of NodeStore: indexing, add, remove, identities, events.

use std::cell::RefCell;
use std::rc::Rc;

use rstest::{fixture, rstest};

use checktree::util::testing;
use checktree::{Item, NodeId, NodeStore, Selection, StoreEvent, TreeError};

#[fixture]
fn store() -> NodeStore<u32> {
    testing::init_test_setup();
    NodeStore::from_items(vec![
        Item::new("a", 1)
            .child(Item::new("b", 2).child(Item::new("c", 3)))
            .child(Item::new("d", 4)),
        Item::new("e", 5),
    ])
}

// ============================================================
// Indexing
// ============================================================

#[test]
fn given_nested_item_when_indexing_then_builds_parent_child_link() {
    testing::init_test_setup();
    let store: NodeStore<()> =
        NodeStore::from_items(vec![Item::named("a").child(Item::named("b"))]);

    assert_eq!(store.len(), 2);
    let a = store.find_by_path("a").unwrap();
    let b = store.find_by_path("a/b").unwrap();
    assert_eq!(store.get_node(b).unwrap().parent(), Some(a));
    assert_eq!(store.get_node(a).unwrap().children(), &[b]);
    assert_eq!(store.path(b).unwrap(), "a/b");
    assert_eq!(store.get_node(a).unwrap().parent(), Some(NodeId::Root));
}

#[rstest]
fn given_store_when_walking_then_links_agree_both_ways(store: NodeStore<u32>) {
    for id in store.descendants(NodeId::Root) {
        let node = store.get_node(id).unwrap();
        let parent = store.node(node.parent().unwrap()).unwrap();
        assert!(parent.children().contains(&id), "{} missing from parent", id);
        for &child in node.children() {
            assert_eq!(store.get_node(child).unwrap().parent(), Some(id));
        }
    }
}

#[rstest]
fn given_store_when_reading_payloads_then_preserved(store: NodeStore<u32>) {
    let c = store.find_by_path("a/b/c").unwrap();
    assert_eq!(store.get_node(c).unwrap().payload(), Some(&3));
    assert_eq!(store.root().payload(), None);
}

#[rstest]
fn given_store_when_reindexing_then_emits_parent_path_index(mut store: NodeStore<u32>) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    store.subscribe(move |event| {
        if let StoreEvent::Reindexed(index) = event {
            log.borrow_mut().push(index.keys().cloned().collect::<Vec<_>>());
        }
    });

    store.index(vec![Item::new("x", 0).child(Item::new("y", 0))]);

    assert_eq!(*seen.borrow(), vec![vec!["root".to_string(), "x".to_string()]]);
}

// ============================================================
// Add
// ============================================================

#[rstest]
fn given_invalid_parent_when_adding_then_noop(mut store: NodeStore<u32>) {
    let before = store.len();

    assert_eq!(store.add_node(NodeId::Item(999), Item::new("x", 0)), None);
    assert_eq!(
        store.try_add_node(NodeId::Item(999), Item::new("x", 0)),
        Err(TreeError::InvalidParent(NodeId::Item(999)))
    );
    assert_eq!(store.len(), before);
}

#[rstest]
fn given_nested_descriptor_when_adding_then_subtree_created_and_event_fired(
    mut store: NodeStore<u32>,
) {
    let added = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&added);
    store.subscribe(move |event| {
        if let StoreEvent::Added(node) = event {
            log.borrow_mut().push((node.id(), node.children().len()));
        }
    });
    let d = store.find_by_path("a/d").unwrap();

    let x = store
        .add_node(d, Item::new("x", 10).child(Item::new("y", 11)))
        .unwrap();

    assert_eq!(x, NodeId::Item(5));
    assert_eq!(store.find_by_path("a/d/x/y"), Some(NodeId::Item(6)));
    assert_eq!(*added.borrow(), vec![(x, 1)]);
}

#[rstest]
fn given_selected_descriptor_when_adding_then_selects_toward_root(mut store: NodeStore<u32>) {
    let b = store.find_by_path("a/b").unwrap();

    let x = store.add_node(b, Item::new("x", 0).selected()).unwrap();

    let selected: Vec<NodeId> = store.selected_nodes().iter().map(|n| n.id()).collect();
    assert_eq!(selected, vec![NodeId::Item(0), b, x]);
}

// ============================================================
// Remove
// ============================================================

#[rstest]
fn given_selected_node_when_removing_then_gone_everywhere(mut store: NodeStore<u32>) {
    let x = store.add_node(NodeId::Root, Item::new("x", 0)).unwrap();
    store.select_toward_root(x);
    let snapshot = store.get_node(x).unwrap().clone();

    assert!(store.remove_node(&snapshot));

    assert!(store.get_node(x).is_none());
    assert!(!store.root().children().contains(&x));
    assert!(store.selected_nodes().iter().all(|n| n.id() != x));
    assert!(store.find_by_path("x").is_none());
}

#[rstest]
fn given_unknown_reference_when_removing_then_false(mut store: NodeStore<u32>) {
    assert!(!store.remove_node(NodeId::Item(999)));
    assert_eq!(
        store.try_remove_node(42u64),
        Err(TreeError::InvalidReference(NodeId::Item(42)))
    );
    assert_eq!(store.len(), 5);
}

#[rstest]
fn given_branch_when_removing_then_no_dangling_index_entries(mut store: NodeStore<u32>) {
    let a = store.find_by_path("a").unwrap();
    let events = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&events);
    store.subscribe(move |event| log.borrow_mut().push(event.name()));

    assert!(store.remove_node(a));

    assert_eq!(store.len(), 1);
    for id in 0..4 {
        assert!(store.get_node(NodeId::Item(id)).is_none());
    }
    let keys: Vec<&String> = store.parent_path_index().keys().collect();
    assert_eq!(keys, vec!["root"]);
    assert_eq!(store.children_of_path("root"), &[NodeId::Item(4)]);
    assert_eq!(*events.borrow(), vec!["removed"]);
}

// ============================================================
// Identities
// ============================================================

#[rstest]
fn given_removals_when_adding_then_identities_never_reused(mut store: NodeStore<u32>) {
    let mut seen: Vec<NodeId> = store.descendants(NodeId::Root);

    for round in 0..3 {
        let id = store
            .add_node(NodeId::Root, Item::new(format!("n{}", round), 0))
            .unwrap();
        assert!(!seen.contains(&id), "identity {} reused", id);
        seen.push(id);
        store.remove_node(id);
    }
    store.index(vec![Item::new("fresh", 0)]);
    let fresh = store.find_by_path("fresh").unwrap();
    assert!(!seen.contains(&fresh));
}

#[rstest]
fn given_subscription_when_unsubscribed_then_not_notified(mut store: NodeStore<u32>) {
    let count = Rc::new(RefCell::new(0));
    let c = Rc::clone(&count);
    let sub = store.subscribe(move |_| *c.borrow_mut() += 1);

    store.add_node(NodeId::Root, Item::new("x", 0));
    assert!(store.unsubscribe(sub));
    store.add_node(NodeId::Root, Item::new("y", 0));

    assert_eq!(*count.borrow(), 1);
}
