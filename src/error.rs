use core::{fmt, marker::PhantomData, pin::Pin, ptr::NonNull};

use thiserror::Error;

use crate::{AvlTree, Links, TreeNode};

/// Failures reported by the trees, lists and queues of this crate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// A lookup missed, or an absent child or successor was accessed.
    #[error("no such element")]
    NotFound,

    /// A node with an equal key is already present in the tree.
    #[error("node already exists")]
    AlreadyExists,

    /// A link was set to an absent target. Clearing a link requires the matching unlink method.
    #[error("cannot link to an absent target, use the unlink method instead")]
    InvalidArgument,

    /// `pop` or `peek` was called on an empty queue.
    #[error("container is empty")]
    EmptyContainer,
}

/// The error returned by [`AvlTree::push`] when the tree already holds a node with the same key.
///
/// The error keeps the tree mutably borrowed and points at the node that was already present, so
/// the caller can merge data into it without a second lookup. The rejected item is handed back
/// rather than dropped.
pub struct AlreadyExists<'tree, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    existing: NonNull<T>,
    rejected: T::Handle,
    _tree: PhantomData<&'tree mut AvlTree<T>>,
}

impl<'tree, T> AlreadyExists<'tree, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    pub(crate) fn new(
        _tree: &'tree mut AvlTree<T>,
        existing: NonNull<T>,
        rejected: T::Handle,
    ) -> Self {
        AlreadyExists {
            existing,
            rejected,
            _tree: PhantomData,
        }
    }

    /// Returns a reference to the node already present in the tree.
    pub fn existing(&self) -> Pin<&T> {
        // SAFETY: the tree is mutably borrowed for `'tree` and the node is owned by it.
        unsafe { Pin::new_unchecked(self.existing.as_ref()) }
    }

    /// Returns a pinned mutable reference to the node already present in the tree.
    ///
    /// The key of the node must not be modified through this reference.
    pub fn existing_mut(&mut self) -> Pin<&mut T> {
        // SAFETY: the tree is mutably borrowed for `'tree`, and nodes are pinned by contract with
        // `Linked`.
        unsafe { Pin::new_unchecked(self.existing.as_mut()) }
    }

    /// Converts the error into a reference to the existing node, dropping the rejected item.
    pub fn into_existing(self) -> Pin<&'tree mut T> {
        self.into_parts().0
    }

    /// Converts the error into the rejected item.
    pub fn into_rejected(self) -> T::Handle {
        self.rejected
    }

    /// Splits the error into the existing node and the rejected item.
    pub fn into_parts(self) -> (Pin<&'tree mut T>, T::Handle) {
        let AlreadyExists {
            mut existing,
            rejected,
            ..
        } = self;

        // SAFETY: see `existing_mut`; the returned reference inherits the tree borrow.
        let existing = unsafe { Pin::new_unchecked(existing.as_mut()) };
        (existing, rejected)
    }
}

impl<T> fmt::Debug for AlreadyExists<'_, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlreadyExists")
            .field("key", self.existing().get_ref().key())
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Display for AlreadyExists<'_, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "node already exists: {:?}",
            self.existing().get_ref().key()
        )
    }
}

impl<T> std::error::Error for AlreadyExists<'_, T> where T: TreeNode<Links<T>> + ?Sized {}

impl<T> From<AlreadyExists<'_, T>> for Error
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn from(_: AlreadyExists<'_, T>) -> Self {
        Error::AlreadyExists
    }
}
