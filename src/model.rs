extern crate std;

use std::{
    collections::{BTreeSet, VecDeque},
    pin::Pin,
    prelude::v1::*,
    ptr::NonNull,
};

use arbitrary::Arbitrary;
use cordyceps::Linked;
use proptest::strategy::{Just, Strategy};

use crate::{list, merge_sort, AvlTree, Links, Queue, TreeNode, Weighted};

#[derive(Debug)]
#[repr(C)]
pub struct TestNode {
    pub links: Links<TestNode>,
    pub key: u32,
}

impl TestNode {
    pub fn new(key: u32) -> Box<TestNode> {
        Box::new(TestNode {
            links: Links::new(),
            key,
        })
    }
}

unsafe impl Linked<Links<TestNode>> for TestNode {
    type Handle = Box<TestNode>;

    fn into_ptr(r: Self::Handle) -> NonNull<Self> {
        NonNull::from(Box::leak(r))
    }

    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        unsafe { Box::from_raw(ptr.as_ptr()) }
    }

    unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<TestNode>> {
        // SAFETY: Self is #[repr(C)] and `links` is first field
        ptr.cast()
    }
}

impl TreeNode<Links<TestNode>> for TestNode {
    type Key = u32;

    fn key(&self) -> &Self::Key {
        &self.key
    }
}

/// A queue element carrying a weight, and an id recording its original position.
#[derive(Debug)]
#[repr(C)]
pub struct TestItem {
    pub links: list::Links<TestItem>,
    pub id: usize,
    pub weight: u32,
}

impl TestItem {
    pub fn new(id: usize, weight: u32) -> Box<TestItem> {
        Box::new(TestItem {
            links: list::Links::new(),
            id,
            weight,
        })
    }

    pub fn set_weight(self: Pin<&mut Self>, weight: u32) {
        // SAFETY: Pinning is not structural for `weight`.
        unsafe { self.get_unchecked_mut().weight = weight };
    }
}

unsafe impl Linked<list::Links<TestItem>> for TestItem {
    type Handle = Box<TestItem>;

    fn into_ptr(r: Self::Handle) -> NonNull<Self> {
        NonNull::from(Box::leak(r))
    }

    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        unsafe { Box::from_raw(ptr.as_ptr()) }
    }

    unsafe fn links(ptr: NonNull<Self>) -> NonNull<list::Links<TestItem>> {
        // SAFETY: Self is #[repr(C)] and `links` is first field
        ptr.cast()
    }
}

impl Weighted for TestItem {
    type Weight = u32;

    fn weight(&self) -> u32 {
        self.weight
    }
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum ItemValue {
    Index(usize),
    Random(u32),
}

proptest::prop_compose! {
    fn index_strategy()(
        index in 0usize..1000,
    ) -> ItemValue {
        ItemValue::Index(index)
    }
}

proptest::prop_compose! {
    fn random_strategy()(
        random in 0u32..1000,
    ) -> ItemValue {
        ItemValue::Random(random)
    }
}

fn value_strategy() -> impl Strategy<Value = ItemValue> {
    proptest::prop_oneof![index_strategy(), random_strategy()]
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum Op {
    Push(ItemValue),
    Find(ItemValue),
    First,
    Last,
}

impl Op {
    fn finalize(self, sorted: &[u32]) -> FinalOp {
        fn get_value(v: &[u32], i: ItemValue) -> u32 {
            match i {
                ItemValue::Index(idx) => {
                    if v.is_empty() {
                        idx as u32
                    } else {
                        v[idx % v.len()]
                    }
                }
                ItemValue::Random(v) => v,
            }
        }

        match self {
            Op::Push(item) => FinalOp::Push(get_value(sorted, item)),
            Op::Find(item) => FinalOp::Find(get_value(sorted, item)),
            Op::First => FinalOp::First,
            Op::Last => FinalOp::Last,
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum FinalOp {
    Push(u32),
    Find(u32),
    First,
    Last,
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        value_strategy().prop_map(Op::Push),
        value_strategy().prop_map(Op::Find),
        Just(Op::First),
        Just(Op::Last),
    ]
}

pub fn run_btree_equivalence(ops: Vec<Op>) {
    let mut sorted_values = Vec::with_capacity(ops.len());
    let mut btree = BTreeSet::new();
    let mut avl: AvlTree<TestNode> = AvlTree::new();

    fn insert_sorted(v: &mut Vec<u32>, value: u32) {
        if let Err(idx) = v.binary_search(&value) {
            v.insert(idx, value);
        }
    }

    #[inline]
    fn ref_key(node: Pin<&TestNode>) -> &u32 {
        &node.get_ref().key
    }

    for (op_id, op) in ops.into_iter().enumerate() {
        let final_op = op.finalize(&sorted_values);

        match final_op {
            FinalOp::Push(value) => {
                insert_sorted(&mut sorted_values, value);

                let from_btree = if btree.insert(value) {
                    None
                } else {
                    Some(value)
                };

                let from_avl = match avl.push(TestNode::new(value)) {
                    Ok(()) => None,
                    Err(exists) => {
                        let (existing, rejected) = exists.into_parts();
                        assert_eq!(existing.key, rejected.key);
                        assert!(!core::ptr::eq(&*existing, &*rejected));
                        Some(rejected.key)
                    }
                };

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {op:?}");
            }

            FinalOp::Find(value) => {
                let from_btree = btree.get(&value);
                let from_avl = avl.find(&value).ok().map(ref_key);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {op:?}");
                assert_eq!(avl.contains_key(&value), from_btree.is_some());
            }

            FinalOp::First => {
                let from_btree = btree.first();
                let from_avl = avl.first().map(ref_key);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {op:?}");
            }

            FinalOp::Last => {
                let from_btree = btree.last();
                let from_avl = avl.last().map(ref_key);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {op:?}");
            }
        }

        avl.assert_invariants();
        assert_eq!(btree.len(), avl.len());
        assert!(btree.iter().eq(avl.iter().map(|node| &node.key)));
    }
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum QueueOp {
    Push(u8),
    Pop,
    Peek,
    Sort,
}

pub fn queue_op_strategy() -> impl Strategy<Value = QueueOp> {
    proptest::prop_oneof![
        (0u8..16).prop_map(QueueOp::Push),
        Just(QueueOp::Pop),
        Just(QueueOp::Peek),
        Just(QueueOp::Sort),
    ]
}

pub fn run_queue_equivalence(ops: Vec<QueueOp>) {
    let mut deque = VecDeque::new();
    let mut queue: Queue<TestItem> = Queue::new();

    for (op_id, op) in ops.into_iter().enumerate() {
        match op {
            QueueOp::Push(weight) => {
                deque.push_back((op_id, u32::from(weight)));
                queue.push(TestItem::new(op_id, weight.into()));
            }

            QueueOp::Pop => {
                let from_deque = deque.pop_front();
                let from_queue = queue.pop().ok().map(|item| (item.id, item.weight));

                assert_eq!(from_deque, from_queue, "QueueOp #{op_id}: {op:?}");
            }

            QueueOp::Peek => {
                let from_deque = deque.front().copied();
                let from_queue = queue.peek().ok().map(|item| (item.id, item.weight));

                assert_eq!(from_deque, from_queue, "QueueOp #{op_id}: {op:?}");
            }

            QueueOp::Sort => {
                queue.sort();

                // Ties are not ordered stably, so the model is rebuilt from the queue after
                // checking that the weights agree.
                let mut weights: Vec<u32> = deque.iter().map(|&(_, weight)| weight).collect();
                weights.sort_unstable_by(|a, b| b.cmp(a));
                assert!(queue.iter().map(|item| item.weight).eq(weights));

                deque = queue.iter().map(|item| (item.id, item.weight)).collect();
            }
        }

        assert_eq!(deque.len(), queue.len());
        assert_eq!(deque.is_empty(), queue.is_empty());
        assert_eq!(deque.len() == 1, queue.is_singleton());
        assert!(deque
            .iter()
            .copied()
            .eq(queue.iter().map(|item| (item.id, item.weight))));
    }
}

pub fn run_sort_model(weights: Vec<u32>) {
    let queue: Queue<TestItem> = weights
        .iter()
        .enumerate()
        .map(|(id, &weight)| TestItem::new(id, weight))
        .collect();

    let sorted = merge_sort(queue);
    assert_eq!(sorted.len(), weights.len());

    let out: Vec<(usize, u32)> = sorted.iter().map(|item| (item.id, item.weight)).collect();

    // Output is non-increasing.
    assert!(out.windows(2).all(|w| w[0].1 >= w[1].1), "{out:?}");

    // Output is a permutation of the input.
    let mut ids: Vec<usize> = out.iter().map(|&(id, _)| id).collect();
    ids.sort_unstable();
    assert!(ids.iter().copied().eq(0..weights.len()));
    assert!(out.iter().all(|&(id, weight)| weights[id] == weight));
}
