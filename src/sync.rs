//! Lock-guarded wrappers for sharing trees and queues between threads.
//!
//! A push into an [`AvlTree`] rewires several nodes across a chain of rotations, and a queue
//! operation updates both of its ends. Each wrapper therefore holds one lock over the whole
//! container, and every operation runs as a single critical section.

use core::{borrow::Borrow, pin::Pin};

use cordyceps::Linked;
use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{list, AvlTree, Error, Links, Queue, TreeNode};

/// An [`AvlTree`] behind a reader-writer lock.
///
/// Lookups share the read lock; insertions, including every rotation they trigger, hold the
/// write lock.
pub struct SharedTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    tree: RwLock<AvlTree<T>>,
}

impl<T> SharedTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    /// Returns a new empty shared tree.
    pub const fn new() -> Self {
        Self {
            tree: parking_lot::const_rwlock(AvlTree::new()),
        }
    }

    /// Returns the number of elements in the tree.
    pub fn len(&self) -> usize {
        self.tree.read().len()
    }

    /// Returns `true` if the tree contains no elements.
    pub fn is_empty(&self) -> bool {
        self.tree.read().is_empty()
    }

    /// Inserts `item`, or hands it to `merge` together with the element already present under
    /// the same key.
    ///
    /// Returns `true` if `item` was inserted. `merge` runs while the write lock is held.
    pub fn push_or_merge<F>(&self, item: T::Handle, merge: F) -> bool
    where
        F: FnOnce(Pin<&mut T>, T::Handle),
    {
        let mut tree = self.tree.write();

        match tree.push(item) {
            Ok(()) => true,
            Err(exists) => {
                let (existing, rejected) = exists.into_parts();
                merge(existing, rejected);
                false
            }
        }
    }

    /// Looks up `key` under the read lock and applies `f` to the element found.
    pub fn find_map<Q, F, R>(&self, key: &Q, f: F) -> Result<R, Error>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
        F: FnOnce(Pin<&T>) -> R,
    {
        let tree = self.tree.read();
        let node = tree.find(key)?;
        Ok(f(node))
    }

    /// Locks the tree for shared reading.
    pub fn read(&self) -> RwLockReadGuard<'_, AvlTree<T>> {
        self.tree.read()
    }

    /// Locks the tree for exclusive writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, AvlTree<T>> {
        self.tree.write()
    }

    /// Consumes the lock, returning the tree.
    pub fn into_inner(self) -> AvlTree<T> {
        self.tree.into_inner()
    }
}

impl<T> Default for SharedTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<AvlTree<T>> for SharedTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn from(tree: AvlTree<T>) -> Self {
        Self {
            tree: RwLock::new(tree),
        }
    }
}

/// A [`Queue`] behind a mutex.
pub struct SharedQueue<T>
where
    T: Linked<list::Links<T>> + ?Sized,
{
    queue: Mutex<Queue<T>>,
}

impl<T> SharedQueue<T>
where
    T: Linked<list::Links<T>> + ?Sized,
{
    /// Returns a new empty shared queue.
    pub const fn new() -> Self {
        Self {
            queue: parking_lot::const_mutex(Queue::new()),
        }
    }

    /// Appends an element at the tail of the queue.
    pub fn push(&self, item: T::Handle) {
        self.queue.lock().push(item);
    }

    /// Removes and returns the element at the head of the queue.
    pub fn pop(&self) -> Result<T::Handle, Error> {
        self.queue.lock().pop()
    }

    /// Returns the number of elements in the queue.
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Returns `true` if the queue contains no elements.
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Takes every element out of the queue, leaving it empty.
    pub fn take(&self) -> Queue<T> {
        core::mem::take(&mut *self.queue.lock())
    }

    /// Consumes the lock, returning the queue.
    pub fn into_inner(self) -> Queue<T> {
        self.queue.into_inner()
    }
}

impl<T> Default for SharedQueue<T>
where
    T: Linked<list::Links<T>> + ?Sized,
{
    fn default() -> Self {
        Self::new()
    }
}
