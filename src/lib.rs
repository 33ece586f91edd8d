//! An intrusive AVL tree, together with the intrusive singly-linked list and FIFO queue it is used
//! alongside, and a merge sort expressed purely through queue operations.
//!
//! Elements embed their own link slots and implement [`cordyceps::Linked`] once per link kind
//! they participate in: [`Links`] for the tree, [`list::Links`] for lists and queues. Containers
//! own their elements through [`Linked::Handle`], typically a `Box`.

// Conventions used in comments are the ones introduced in `node.rs`: `h(x)` is the height of `x`,
// with absent subtrees at height -1 and leaves at height 0.
//
// The fundamental invariants of the tree are:
// 1. For every node `x`, all keys in the left subtree of `x` order before the key of `x`, and all
//    keys in the right subtree order after it.
// 2. For every node `x`, `|h(left(x)) - h(right(x))| <= 1`.
// 3. The height cached in the links of `x` equals `h(x)`.
//
// There are no parent pointers. Insertion is recursive, and each ancestor of the new leaf is
// rebalanced as the recursion unwinds, its parent relinking whatever subtree root comes back.

use core::{borrow::Borrow, cmp::Ordering, fmt, pin::Pin, ptr::NonNull};

use cordyceps::Linked;

mod debug;
mod error;
mod iter;
pub mod lexicon;
pub mod list;
mod node;
pub mod queue;
pub mod sort;
pub mod sync;

#[cfg(any(test, feature = "model"))]
pub mod model;

#[cfg(test)]
mod tests;

pub use error::{AlreadyExists, Error};
pub use iter::Iter;
pub use node::Links;
pub use queue::Queue;
pub use sort::{merge_sort, Weighted};

use node::{Dir, Link};

pub trait TreeNode<L>: Linked<L> {
    type Key: Ord + fmt::Debug;

    fn key(&self) -> &Self::Key;
}

/// An intrusive AVL tree.
///
/// Elements are never removed individually; they are released when the tree is cleared or
/// dropped.
pub struct AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    root: Link<T>,
    len: usize,
}

// SAFETY: the tree uniquely owns its elements.
unsafe impl<T> Send for AvlTree<T> where T: TreeNode<Links<T>> + ?Sized + Send {}
unsafe impl<T> Sync for AvlTree<T> where T: TreeNode<Links<T>> + ?Sized + Sync {}

impl<T> AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    /// Returns a new empty tree.
    pub const fn new() -> AvlTree<T> {
        AvlTree { root: None, len: 0 }
    }

    /// Returns `true` if the tree contains no elements.
    pub const fn is_empty(&self) -> bool {
        let empty = self.len() == 0;

        if cfg!(debug_assertions) {
            // Can't use assert_eq!() in const fn.
            assert!(empty == self.root.is_none());
        }

        empty
    }

    /// Returns the number of elements in the tree.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns the height of the tree, or -1 if it is empty.
    pub fn height(&self) -> i8 {
        unsafe { node::height(self.root) }
    }

    /// Returns the root element of the tree.
    pub fn root(&self) -> Option<Pin<&T>> {
        self.root
            .map(|root| unsafe { Pin::new_unchecked(root.as_ref()) })
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        let Some(root) = self.root else {
            assert_eq!(self.len, 0);
            return;
        };

        let count = unsafe { self.assert_invariants_at(root, None, None) };
        assert_eq!(count, self.len, "element count does not match `len`");
    }

    // Checks the subtree rooted at `node`, whose keys must lie strictly between `lower` and
    // `upper`. Returns the number of elements in the subtree.
    #[allow(clippy::only_used_in_recursion)]
    unsafe fn assert_invariants_at(
        &self,
        node: NonNull<T>,
        lower: Option<&T::Key>,
        upper: Option<&T::Key>,
    ) -> usize {
        unsafe {
            let key = node.as_ref().key();
            let links = T::links(node).as_ref();

            // Ensure keys are ordered.
            if let Some(lower) = lower {
                assert!(lower < key, "{lower:?} must order before {key:?}");
            }
            if let Some(upper) = upper {
                assert!(key < upper, "{key:?} must order before {upper:?}");
            }

            let mut count = 1;
            if let Some(left) = links.child(Dir::Left) {
                count += self.assert_invariants_at(left, lower, Some(key));
            }
            if let Some(right) = links.child(Dir::Right) {
                count += self.assert_invariants_at(right, Some(key), upper);
            }

            // Ensure the cached height is accurate and the node is balanced.
            let left_height = node::height(links.child(Dir::Left));
            let right_height = node::height(links.child(Dir::Right));
            assert_eq!(links.height(), 1 + left_height.max(right_height));
            assert!(
                (left_height - right_height).abs() <= 1,
                "{key:?} is unbalanced: {left_height} vs {right_height}"
            );

            count
        }
    }

    /// Returns a reference to the node corresponding to `key`.
    ///
    /// The search gives up as soon as it reaches a leaf, or an absent child, without a match.
    pub fn find<Q>(&self, key: &Q) -> Result<Pin<&T>, Error>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let ptr = self.find_raw(key)?;
        unsafe { Ok(Pin::new_unchecked(ptr.as_ref())) }
    }

    /// Returns a pinned mutable reference to the node corresponding to `key`.
    ///
    /// The key of the node must not be modified through this reference.
    pub fn find_mut<Q>(&mut self, key: &Q) -> Result<Pin<&mut T>, Error>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut ptr = self.find_raw(key)?;
        unsafe { Ok(Pin::new_unchecked(ptr.as_mut())) }
    }

    /// Returns `true` if the tree contains a node corresponding to `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_raw(key).is_ok()
    }

    fn find_raw<Q>(&self, key: &Q) -> Result<NonNull<T>, Error>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cur = self.root.ok_or(Error::NotFound)?;

        loop {
            unsafe {
                let links = T::links(cur).as_ref();

                cur = match key.cmp(cur.as_ref().key().borrow()) {
                    Ordering::Equal => return Ok(cur),
                    _ if links.is_leaf() => return Err(Error::NotFound),
                    Ordering::Less => links.left()?,
                    Ordering::Greater => links.right()?,
                };
            }
        }
    }

    /// Returns the minimum element of the tree.
    pub fn first(&self) -> Option<Pin<&T>> {
        self.extreme(Dir::Left)
    }

    /// Returns the maximum element of the tree.
    pub fn last(&self) -> Option<Pin<&T>> {
        self.extreme(Dir::Right)
    }

    fn extreme(&self, dir: Dir) -> Option<Pin<&T>> {
        let mut cur = self.root?;

        unsafe {
            while let Some(child) = T::links(cur).as_ref().child(dir) {
                cur = child;
            }

            Some(Pin::new_unchecked(cur.as_ref()))
        }
    }

    /// Returns an iterator over the elements of the tree in key order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Inserts an item into the tree.
    ///
    /// If the tree already contains an element with the same key, the item is not inserted and
    /// the returned error refers to the existing element, so that the caller may update it
    /// instead.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn push(&mut self, item: T::Handle) -> Result<(), AlreadyExists<'_, T>> {
        let ptr = T::into_ptr(item);
        unsafe { T::links(ptr).as_mut().clear() };

        let pushed = match self.root {
            // Tree is empty. Set `item` as the root.
            None => Ok(ptr),
            Some(root) => unsafe { Self::push_at(root, ptr) },
        };

        match pushed {
            Ok(root) => {
                self.root = Some(root);
                self.len += 1;

                let key = unsafe { ptr.as_ref().key() };
                tracing::trace!(?key, len = self.len, "pushed node");
                Ok(())
            }

            Err(existing) => {
                let key = unsafe { existing.as_ref().key() };
                tracing::debug!(?key, "rejected duplicate key");

                let rejected = unsafe { T::from_ptr(ptr) };
                Err(AlreadyExists::new(self, existing, rejected))
            }
        }
    }

    // Inserts the detached node `ptr` into the subtree rooted at `pin`, returning the new root of
    // the subtree.
    //
    // If the subtree already contains a node with the same key, that node is returned as the
    // error and the subtree is left untouched.
    unsafe fn push_at(pin: NonNull<T>, ptr: NonNull<T>) -> Result<NonNull<T>, NonNull<T>> {
        unsafe {
            let dir = match ptr.as_ref().key().cmp(pin.as_ref().key()) {
                Ordering::Less => Dir::Left,
                Ordering::Equal => return Err(pin),
                Ordering::Greater => Dir::Right,
            };

            let child = match T::links(pin).as_ref().child(dir) {
                // Descend.
                Some(child) => Self::push_at(child, ptr)?,

                // Set `ptr` as child.
                None => ptr,
            };

            T::links(pin).as_mut().set_child(dir, Some(child));
            node::update_height(pin);

            Ok(node::balance(pin))
        }
    }

    /// Calls `f` on every element of the tree, parents before their children.
    ///
    /// The keys of the elements must not be modified by `f`.
    pub fn for_each_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(Pin<&mut T>),
    {
        let mut pending = Vec::with_capacity(self.height().max(0) as usize + 1);
        pending.extend(self.root);

        while let Some(mut cur) = pending.pop() {
            unsafe {
                // Right first, so that the left subtree is visited first.
                pending.extend(T::links(cur).as_ref().child(Dir::Right));
                pending.extend(T::links(cur).as_ref().child(Dir::Left));

                f(Pin::new_unchecked(cur.as_mut()));
            }
        }
    }

    /// Clears the tree, dropping all elements.
    pub fn clear(&mut self) {
        let mut pending: Vec<NonNull<T>> = self.root.take().into_iter().collect();

        while let Some(cur) = pending.pop() {
            unsafe {
                let links = T::links(cur).as_mut();
                pending.extend(links.unlink_left());
                pending.extend(links.unlink_right());

                // Drop the node.
                drop(T::from_ptr(cur));
                self.len -= 1;
            }
        }

        debug_assert!(self.root.is_none());
        debug_assert_eq!(self.len(), 0);
    }
}

impl<T> Default for AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T> fmt::Debug for AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(T::key)).finish()
    }
}

impl<'tree, T> IntoIterator for &'tree AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    type Item = &'tree T;
    type IntoIter = Iter<'tree, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
