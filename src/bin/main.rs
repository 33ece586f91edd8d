use std::ptr::NonNull;

use cordyceps::Linked;
use cordyceps_avl::{
    lexicon::{Entry, Lexicon, Sentence},
    list, AvlTree, Error, Links, Queue, TreeNode, Weighted,
};

#[derive(Debug)]
#[repr(C)]
struct TestNode {
    links: Links<TestNode>,
    key: u32,
}

impl TestNode {
    fn new(key: u32) -> Box<TestNode> {
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

#[derive(Debug)]
#[repr(C)]
struct Score {
    links: list::Links<Score>,
    name: &'static str,
    points: u32,
}

unsafe impl Linked<list::Links<Score>> for Score {
    type Handle = Box<Score>;

    fn into_ptr(r: Self::Handle) -> NonNull<Self> {
        NonNull::from(Box::leak(r))
    }

    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        unsafe { Box::from_raw(ptr.as_ptr()) }
    }

    unsafe fn links(ptr: NonNull<Self>) -> NonNull<list::Links<Score>> {
        // SAFETY: Self is #[repr(C)] and `links` is first field
        ptr.cast()
    }
}

impl Weighted for Score {
    type Weight = u32;

    fn weight(&self) -> u32 {
        self.points
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut tree: AvlTree<TestNode> = AvlTree::new();

    for key in [2, 0, 3, 4, 5, 1, 6] {
        tree.push(TestNode::new(key)).map_err(Error::from)?;
        tree.assert_invariants();
        println!("{:?}", tree.iter().map(|node| node.key).collect::<Vec<_>>());
    }

    if let Err(exists) = tree.push(TestNode::new(4)) {
        println!("{exists}");
    }

    let mut graph = String::new();
    tree.dotgraph("demo", &mut graph)?;
    println!("{graph}");
    drop(tree);

    let mut scores: Queue<Score> = [("ann", 3), ("bob", 7), ("cid", 3), ("dee", 9)]
        .into_iter()
        .map(|(name, points)| {
            Box::new(Score {
                links: list::Links::new(),
                name,
                points,
            })
        })
        .collect();
    scores.sort();
    for score in &scores {
        println!("{}: {}", score.name, score.points);
    }

    let mut sentence: Sentence = Queue::new();
    for (word, tag) in [
        ("the", "DT"),
        ("old", "JJ"),
        ("man", "NN"),
        ("the", "DT"),
        ("boats", "NNS"),
        ("old", "NN"),
        ("old", "NN"),
    ] {
        sentence.push(Entry::new(word, tag)?);
    }

    let mut lexicon = Lexicon::new();
    lexicon.learn(&mut sentence)?;
    lexicon.sort();

    for word in ["the", "old", "man", "boats", "sea"] {
        println!("{word}: {}", lexicon.guess(word));
    }

    Ok(())
}
