//! Identifier assignment: root gets 0, children scan the whole tree.

use std::collections::HashSet;

use rstest::{fixture, rstest};

use gatetree::domain::{IdPolicy, NodeRef, NodeSpec, TreeArena};
use gatetree::util::testing;

type Tree = TreeArena<Option<&'static str>, i32>;

fn id_of(tree: &Tree, node: NodeRef) -> u64 {
    tree.get(node).unwrap().id()
}

fn leaf(tree: &mut Tree, name: &str, parent: NodeRef) -> NodeRef {
    tree.create(NodeSpec::new(None, name, []).parent(parent)).unwrap()
}

// root
// ├── c1
// │   └── g1
// └── c2
struct Sample {
    tree: Tree,
    root: NodeRef,
    c1: NodeRef,
    c2: NodeRef,
    g1: NodeRef,
}

#[fixture]
fn sample() -> Sample {
    testing::init_test_setup();
    let mut tree = Tree::new();
    let root = tree.create(NodeSpec::new(None, "root", [])).unwrap();
    let c1 = leaf(&mut tree, "c1", root);
    let c2 = leaf(&mut tree, "c2", root);
    let g1 = leaf(&mut tree, "g1", c1);
    Sample {
        tree,
        root,
        c1,
        c2,
        g1,
    }
}

// ============================================================
// Scan policy
// ============================================================

#[rstest]
fn given_scenario_tree_when_building_then_ids_follow_insertion(sample: Sample) {
    let Sample {
        tree,
        root,
        c1,
        c2,
        g1,
    } = sample;
    assert_eq!(id_of(&tree, root), 0);
    assert_eq!(id_of(&tree, c1), 1);
    assert_eq!(id_of(&tree, c2), 2);
    // grandchild sees c2 although it is not a sibling
    assert_eq!(id_of(&tree, g1), 3);
}

#[rstest]
fn given_parentless_nodes_when_created_then_each_is_root_with_zero() {
    let mut tree = Tree::new();
    let a = tree.create(NodeSpec::new(None, "a", [])).unwrap();
    let b = tree.create(NodeSpec::new(Some("or"), "b", [])).unwrap();
    assert_eq!(id_of(&tree, a), 0);
    assert_eq!(id_of(&tree, b), 0);
    assert_eq!(tree.roots().len(), 2);
}

#[rstest]
#[case(1)]
#[case(5)]
#[case(40)]
fn given_n_nodes_under_root_when_inserted_then_ids_are_contiguous(#[case] n: u64) {
    let mut tree = Tree::new();
    let root = tree.create(NodeSpec::new(None, "root", [])).unwrap();
    let mut parent = root;
    for i in 1..n {
        // alternate between flat and nested insertion
        let target = if i % 2 == 0 { root } else { parent };
        parent = leaf(&mut tree, &format!("n{i}"), target);
    }

    let ids: HashSet<u64> = tree
        .subtree(root)
        .unwrap()
        .map(|(_, node)| node.id())
        .collect();
    assert_eq!(ids, (0..n).collect::<HashSet<u64>>());
}

#[rstest]
fn given_every_tree_built_by_construction_then_non_root_ids_are_unique_and_positive(
    sample: Sample,
) {
    let Sample { mut tree, root, .. } = sample;
    let extra = leaf(&mut tree, "extra", root);
    leaf(&mut tree, "deep", extra);

    let non_root: Vec<u64> = tree
        .descendants(root)
        .unwrap()
        .map(|(_, n)| n.id())
        .collect();
    assert!(non_root.iter().all(|&id| id > 0));
    let unique: HashSet<u64> = non_root.iter().copied().collect();
    assert_eq!(unique.len(), non_root.len());
}

#[rstest]
fn given_detached_node_holding_max_when_inserting_then_freed_range_is_reused(sample: Sample) {
    let Sample {
        mut tree,
        root,
        c2,
        g1,
        ..
    } = sample;
    // g1 (3) is the maximum; after dropping it the next id falls back to 3
    tree.detach(g1).unwrap();
    let next = leaf(&mut tree, "c3", root);
    assert_eq!(id_of(&tree, next), 3);

    // detaching c2 (2) does not lower the maximum held by c3 (3)
    tree.detach(c2).unwrap();
    let after = leaf(&mut tree, "c4", root);
    assert_eq!(id_of(&tree, after), 4);
}

#[rstest]
fn given_removed_subtree_when_inserting_then_next_id_uses_remaining_max(sample: Sample) {
    let Sample {
        mut tree, root, c1, ..
    } = sample;
    // removes c1 (1) and g1 (3); c2 (2) remains
    assert_eq!(tree.remove(c1).unwrap(), 2);
    let next = leaf(&mut tree, "c5", root);
    assert_eq!(id_of(&tree, next), 3);
}

#[rstest]
fn given_bulk_children_when_creating_then_their_ids_are_kept_and_counted() {
    let mut tree = Tree::new();
    let root = tree.create(NodeSpec::new(None, "root", [])).unwrap();
    let a = leaf(&mut tree, "a", root);
    let b = leaf(&mut tree, "b", root);

    // a and b move below the new node; the new node still scans them
    let group = tree
        .create(NodeSpec::new(None, "group", []).parent(root).children([a, b]))
        .unwrap();
    assert_eq!(id_of(&tree, group), 3);
    assert_eq!(id_of(&tree, a), 1);
    assert_eq!(tree.children(root).unwrap(), &[group]);
    assert_eq!(tree.children(group).unwrap(), &[a, b]);
}

#[rstest]
fn given_children_from_other_tree_when_creating_then_their_subtree_is_scanned() {
    let mut tree = Tree::new();
    let other = tree.create(NodeSpec::new(None, "other", [])).unwrap();
    let mut deep = other;
    for i in 0..6 {
        deep = leaf(&mut tree, &format!("o{i}"), deep);
    }
    let first = tree.children(other).unwrap()[0];

    let root = tree.create(NodeSpec::new(None, "root", [])).unwrap();
    let node = tree
        .create(NodeSpec::new(None, "n", []).parent(root).children([first]))
        .unwrap();
    assert_eq!(id_of(&tree, node), id_of(&tree, deep) + 1);
    assert!(tree.is_leaf(other).unwrap());
}

#[rstest]
fn given_parent_in_small_subtree_when_creating_then_scan_starts_at_root(sample: Sample) {
    let Sample { mut tree, g1, .. } = sample;
    let below_g1 = leaf(&mut tree, "g1a", g1);
    assert_eq!(id_of(&tree, below_g1), 4);
}

#[rstest]
fn given_ids_when_searching_then_find_by_id_resolves_nodes(sample: Sample) {
    let Sample { tree, root, c2, .. } = sample;
    assert_eq!(tree.find_by_id(root, 2).unwrap(), Some(c2));
    assert_eq!(tree.find_by_id(root, 99).unwrap(), None);
}

// ============================================================
// Counter policy
// ============================================================

#[rstest]
fn given_counter_policy_when_ids_are_freed_then_they_are_never_reused() {
    let mut tree = Tree::new().with_id_policy(IdPolicy::Counter);
    let root = tree.create(NodeSpec::new(None, "root", [])).unwrap();
    let a = leaf(&mut tree, "a", root);
    let b = leaf(&mut tree, "b", root);
    assert_eq!((id_of(&tree, a), id_of(&tree, b)), (1, 2));

    tree.remove(b).unwrap();
    let c = leaf(&mut tree, "c", root);
    assert_eq!(id_of(&tree, c), 3);
}

#[rstest]
fn given_counter_policy_when_building_scenario_then_ids_match_scan() {
    let mut tree = Tree::new().with_id_policy(IdPolicy::Counter);
    let root = tree.create(NodeSpec::new(None, "root", [])).unwrap();
    let c1 = leaf(&mut tree, "c1", root);
    let c2 = leaf(&mut tree, "c2", root);
    let g1 = leaf(&mut tree, "g1", c1);
    let ids: Vec<u64> = [root, c1, c2, g1].iter().map(|&n| id_of(&tree, n)).collect();
    assert_eq!(ids, vec![0, 1, 2, 3]);
}
