extern crate std;

use std::{ops::Range, prelude::v1::*};

use proptest::prelude::*;

use crate::{
    lexicon::Word,
    model::{self, TestNode},
};

use super::*;

fn key_of(ptr: NonNull<TestNode>) -> u32 {
    unsafe { ptr.as_ref().key }
}

fn children(node: &TestNode) -> (Option<u32>, Option<u32>) {
    (
        node.links.left().ok().map(key_of),
        node.links.right().ok().map(key_of),
    )
}

fn tree_of(keys: &[u32]) -> AvlTree<TestNode> {
    let mut tree = AvlTree::new();

    for &key in keys {
        assert!(tree.push(TestNode::new(key)).is_ok(), "{key} already present");
        tree.assert_invariants();
    }

    tree
}

fn push_find_all(keys: &[u32]) {
    let mut tree: AvlTree<TestNode> = AvlTree::new();
    let mut pushed = Vec::with_capacity(keys.len());

    for &key in keys {
        let node = TestNode::new(key);
        pushed.push((key, &*node as *const TestNode));

        assert!(tree.push(node).is_ok(), "{key} already present");
        tree.assert_invariants();
    }

    assert_eq!(tree.len(), keys.len());

    for (key, ptr) in pushed {
        let node = tree.find(&key).expect("item not found");
        assert_eq!(node.key(), &key);
        assert!(core::ptr::eq(&*node, ptr), "{key} was relocated");
    }
}

#[test]
fn zero_elems_find() {
    push_find_all(&[]);
}

#[test]
fn single_elem_find() {
    push_find_all(&[0]);
}

#[test]
fn two_elems_find() {
    push_find_all(&[0, 1]);
    push_find_all(&[1, 0]);
}

#[test]
fn three_elems_find() {
    push_find_all(&[0, 1, 2]);
    push_find_all(&[0, 2, 1]);
    push_find_all(&[1, 0, 2]);
    push_find_all(&[1, 2, 0]);
    push_find_all(&[2, 0, 1]);
    push_find_all(&[2, 1, 0]);
}

#[test]
fn four_elems_find() {
    push_find_all(&[0, 1, 2, 3]);
    push_find_all(&[0, 1, 3, 2]);
    push_find_all(&[0, 2, 1, 3]);
    push_find_all(&[0, 2, 3, 1]);
    push_find_all(&[0, 3, 1, 2]);
    push_find_all(&[0, 3, 2, 1]);

    push_find_all(&[1, 0, 2, 3]);
    push_find_all(&[1, 0, 3, 2]);
    push_find_all(&[1, 2, 0, 3]);
    push_find_all(&[1, 2, 3, 0]);
    push_find_all(&[1, 3, 0, 2]);
    push_find_all(&[1, 3, 2, 0]);

    push_find_all(&[2, 0, 1, 3]);
    push_find_all(&[2, 0, 3, 1]);
    push_find_all(&[2, 1, 0, 3]);
    push_find_all(&[2, 1, 3, 0]);
    push_find_all(&[2, 3, 0, 1]);
    push_find_all(&[2, 3, 1, 0]);

    push_find_all(&[3, 0, 1, 2]);
    push_find_all(&[3, 0, 2, 1]);
    push_find_all(&[3, 1, 0, 2]);
    push_find_all(&[3, 1, 2, 0]);
    push_find_all(&[3, 2, 0, 1]);
    push_find_all(&[3, 2, 1, 0]);
}

#[test]
fn balanced_push_needs_no_rotation() {
    let tree = tree_of(&[1, 0, 2]);
    let root = tree.root().unwrap();

    assert_eq!(root.key, 1);
    assert_eq!(children(&root), (Some(0), Some(2)));
    assert_eq!(tree.height(), 1);
}

#[test]
fn ascending_pushes_rotate() {
    let tree = tree_of(&[0, 1, 2]);
    let root = tree.root().unwrap();

    assert_eq!(root.key, 1);
    assert_eq!(children(&root), (Some(0), Some(2)));
    assert_eq!(tree.height(), 1);
}

#[test]
fn zigzag_pushes_rotate_twice() {
    for keys in [[2, 0, 1], [0, 2, 1]] {
        let tree = tree_of(&keys);
        let root = tree.root().unwrap();

        assert_eq!(root.key, 1, "{keys:?}");
        assert_eq!(children(&root), (Some(0), Some(2)), "{keys:?}");
    }
}

#[test]
fn ascending_run_stays_logarithmic() {
    let keys: Vec<u32> = (0..1023).collect();
    let tree = tree_of(&keys);

    // A perfectly balanced tree of 2^10 - 1 nodes.
    assert_eq!(tree.height(), 9);
    assert!(tree.iter().map(|node| node.key).eq(keys.iter().copied()));
}

#[test]
fn string_keys() {
    let mut tree: AvlTree<Word> = AvlTree::new();

    for name in ["b", "a", "c"] {
        tree.push(Word::new(name).unwrap()).unwrap();
    }
    tree.assert_invariants();

    assert_eq!(tree.root().map(|word| word.get_ref().name()), Some("b"));
    assert_eq!(tree.height(), 1);
    assert_eq!(tree.find("c").map(|word| word.get_ref().name()), Ok("c"));
    assert_eq!(tree.find("z").map(|word| word.get_ref().name()), Err(Error::NotFound));
}

#[test]
fn find_in_empty_tree() {
    let tree: AvlTree<TestNode> = AvlTree::new();

    assert!(tree.is_empty());
    assert_eq!(tree.height(), -1);
    assert!(tree.root().is_none());
    assert_eq!(tree.find(&0).map(|node| node.key), Err(Error::NotFound));
    assert!(tree.first().is_none());
    assert!(tree.last().is_none());
}

#[test]
fn find_stops_at_missing_child() {
    // 0 has a right child only, and 2 is a leaf.
    let tree = tree_of(&[0, 2]);

    assert_eq!(children(&tree.root().unwrap()), (None, Some(2)));
    assert_eq!(tree.find(&1).map(|node| node.key), Err(Error::NotFound));
    assert_eq!(tree.find(&3).map(|node| node.key), Err(Error::NotFound));
    assert!(!tree.contains_key(&1));
    assert!(tree.contains_key(&2));
}

#[test]
fn duplicate_push_refers_to_existing() {
    let mut tree = tree_of(&[5, 3, 8]);
    let existing: *const TestNode = &*tree.find(&3).unwrap();

    let err = tree.push(TestNode::new(3)).unwrap_err();
    assert_eq!(err.existing().key, 3);
    assert!(core::ptr::eq(&*err.existing(), existing));
    assert_eq!(std::format!("{err}"), "node already exists: 3");

    let rejected = err.into_rejected();
    assert_eq!(rejected.key, 3);
    assert!(!core::ptr::eq(&*rejected, existing));
    assert!(!rejected.links.has_left() && !rejected.links.has_right());

    assert_eq!(tree.len(), 3);
    tree.assert_invariants();

    assert_eq!(
        tree.push(TestNode::new(8)).map_err(Error::from),
        Err(Error::AlreadyExists)
    );
}

#[test]
fn push_clears_stale_links() {
    let mut stale = TestNode::new(7);
    let mut dangling = TestNode::new(99);
    stale
        .links
        .set_left(Some(NonNull::from(&mut *dangling)))
        .unwrap();

    let mut tree = tree_of(&[4]);
    tree.push(stale).unwrap();
    tree.assert_invariants();

    assert_eq!(tree.len(), 2);
    assert!(tree.find(&7).unwrap().links.is_leaf());
}

#[test]
fn first_last_and_iter() {
    let tree = tree_of(&[4, 9, 1, 7, 3]);

    assert_eq!(tree.first().map(|node| node.key), Some(1));
    assert_eq!(tree.last().map(|node| node.key), Some(9));

    let iter = tree.iter();
    assert_eq!(iter.len(), 5);
    assert_eq!(iter.map(|node| node.key).collect::<Vec<_>>(), [1, 3, 4, 7, 9]);
    assert_eq!((&tree).into_iter().count(), 5);
    assert_eq!(std::format!("{tree:?}"), "{1, 3, 4, 7, 9}");
}

#[test]
fn for_each_mut_visits_parents_first() {
    let mut tree = tree_of(&[0, 1, 2, 3, 4, 5, 6]);
    let mut visited = Vec::new();
    tree.for_each_mut(|node| visited.push(node.key));

    assert_eq!(visited, [3, 1, 0, 2, 5, 4, 6]);
}

#[test]
fn find_mut_and_clear() {
    let mut tree = tree_of(&[2, 1, 3]);
    assert_eq!(tree.find_mut(&1).map(|node| node.key), Ok(1));

    tree.clear();
    assert!(tree.is_empty());
    tree.assert_invariants();

    // The tree is reusable after clearing.
    tree.push(TestNode::new(1)).unwrap();
    assert_eq!(tree.len(), 1);
}

#[test]
fn dotgraph() {
    let mut out = String::new();
    AvlTree::<TestNode>::new().dotgraph("empty", &mut out).unwrap();
    assert_eq!(out, "digraph \"graph-empty\" {}");

    let tree = tree_of(&[1, 0, 2]);
    let mut out = String::new();
    tree.dotgraph("t", &mut out).unwrap();

    assert!(out.contains("\"grapht-1\" [label=\"1:1\"]"), "{out}");
    assert!(out.contains("\"grapht-0\" [label=\"0:0\"]"), "{out}");
    assert!(out.contains("\"grapht-1\" -> \"grapht-2\";"), "{out}");
    assert!(out.ends_with(" }\n}"), "{out}");
}

#[test]
fn dotgraph_escapes_keys() {
    let mut tree: AvlTree<Word> = AvlTree::new();
    tree.push(Word::new("say \"hi\"").unwrap()).unwrap();
    tree.push(Word::new("a\\b").unwrap()).unwrap();

    let mut out = String::new();
    tree.dotgraph("w", &mut out).unwrap();

    assert!(
        out.contains("\"graphw-say \\\"hi\\\"\" [label=\"say \\\"hi\\\":1\"]"),
        "{out}"
    );
    assert!(out.contains("-> \"graphw-a\\\\b\";"), "{out}");
}

#[cfg(miri)]
const FUZZ_RANGE: Range<usize> = 0..10;

#[cfg(not(miri))]
const FUZZ_RANGE: Range<usize> = 0..1000;

proptest::proptest! {
    #![proptest_config(ProptestConfig {
        max_shrink_iters: 65536,
        .. ProptestConfig::default()
    })]

    #[test]
    fn btree_equivalence(ops in proptest::collection::vec(model::op_strategy(), FUZZ_RANGE)) {
        model::run_btree_equivalence(ops);
    }

    #[test]
    fn queue_equivalence(ops in proptest::collection::vec(model::queue_op_strategy(), FUZZ_RANGE)) {
        model::run_queue_equivalence(ops);
    }
}
