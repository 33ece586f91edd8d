// Conventions used in comments:
// - The height of a node `x` is denoted `h(x)`. An absent child has height -1 and a leaf has
//   height 0, so `h(x) = 1 + max(h(left(x)), h(right(x)))`.
// - The balance factor of `x` is `h(left(x)) - h(right(x))`.
//
// The fundamental invariant of an AVL tree is that every balance factor is -1, 0 or 1.
//
// Insertion adds a single leaf, which changes the height of each ancestor by at most one. Thus
// after an insertion, and before rebalancing, every balance factor along the insertion path lies
// in -2..=2, and a single or double rotation at the lowest node with factor ±2 restores the
// invariant for that subtree.

use core::{cell::UnsafeCell, cmp, fmt, marker::PhantomPinned, mem, ops::Not, ptr::NonNull};

use crate::{Error, TreeNode};

/// The child links of an AVL tree node.
///
/// A type stored in an [`AvlTree`](crate::AvlTree) embeds a `Links` value and exposes it through
/// [`cordyceps::Linked`].
pub struct Links<T: ?Sized> {
    inner: UnsafeCell<LinksInner<T>>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Dir {
    Left = 0,
    Right = 1,
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

#[repr(C)]
struct LinksInner<T: ?Sized> {
    children: [Link<T>; 2],
    height: i8,
    _unpin: PhantomPinned,
}

pub(crate) type Link<T> = Option<NonNull<T>>;

// SAFETY: `Links` is only mutated through `&mut` access to the owning tree.
unsafe impl<T: ?Sized + Send> Send for Links<T> {}
unsafe impl<T: ?Sized + Sync> Sync for Links<T> {}

impl<T: ?Sized> Links<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: UnsafeCell::new(LinksInner {
                children: [None; 2],
                height: 0,
                _unpin: PhantomPinned,
            }),
        }
    }

    /// Returns `true` if the node has a left child.
    #[inline]
    pub fn has_left(&self) -> bool {
        self.child(Dir::Left).is_some()
    }

    /// Returns `true` if the node has a right child.
    #[inline]
    pub fn has_right(&self) -> bool {
        self.child(Dir::Right).is_some()
    }

    /// Returns `true` if the node has no children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        !self.has_left() && !self.has_right()
    }

    /// Returns the left child, or [`Error::NotFound`] if there is none.
    #[inline]
    pub fn left(&self) -> Result<NonNull<T>, Error> {
        self.child(Dir::Left).ok_or(Error::NotFound)
    }

    /// Returns the right child, or [`Error::NotFound`] if there is none.
    #[inline]
    pub fn right(&self) -> Result<NonNull<T>, Error> {
        self.child(Dir::Right).ok_or(Error::NotFound)
    }

    /// Links `target` as the left child.
    ///
    /// Fails with [`Error::InvalidArgument`] if `target` is `None`; use
    /// [`unlink_left`](Self::unlink_left) to clear the link.
    pub fn set_left(&mut self, target: Option<NonNull<T>>) -> Result<(), Error> {
        let target = target.ok_or(Error::InvalidArgument)?;
        self.set_child(Dir::Left, Some(target));
        Ok(())
    }

    /// Links `target` as the right child.
    ///
    /// Fails with [`Error::InvalidArgument`] if `target` is `None`; use
    /// [`unlink_right`](Self::unlink_right) to clear the link.
    pub fn set_right(&mut self, target: Option<NonNull<T>>) -> Result<(), Error> {
        let target = target.ok_or(Error::InvalidArgument)?;
        self.set_child(Dir::Right, Some(target));
        Ok(())
    }

    /// Clears the left link, returning the former child.
    pub fn unlink_left(&mut self) -> Option<NonNull<T>> {
        self.set_child(Dir::Left, None)
    }

    /// Clears the right link, returning the former child.
    pub fn unlink_right(&mut self) -> Option<NonNull<T>> {
        self.set_child(Dir::Right, None)
    }

    /// Returns the cached height of the subtree rooted at this node.
    #[inline]
    pub fn height(&self) -> i8 {
        unsafe { (*self.inner.get()).height }
    }

    #[inline]
    pub(crate) fn child(&self, dir: Dir) -> Link<T> {
        unsafe { (*self.inner.get()).children[dir as usize] }
    }

    #[inline]
    pub(crate) fn set_child(&mut self, dir: Dir, child: Link<T>) -> Link<T> {
        mem::replace(&mut self.inner.get_mut().children[dir as usize], child)
    }

    #[inline]
    fn set_height(&mut self, height: i8) {
        self.inner.get_mut().height = height;
    }

    /// Resets the links to those of a detached leaf.
    #[inline]
    pub(crate) fn clear(&mut self) {
        let inner = self.inner.get_mut();
        inner.children = [None; 2];
        inner.height = 0;
    }
}

impl<T: ?Sized> Default for Links<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Links<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Links")
            .field("left", &self.child(Dir::Left))
            .field("right", &self.child(Dir::Right))
            .field("height", &self.height())
            .finish()
    }
}

/// Returns the cached height of the subtree rooted at `node`, or -1 for an absent subtree.
#[inline]
pub(crate) unsafe fn height<T>(node: Link<T>) -> i8
where
    T: TreeNode<Links<T>> + ?Sized,
{
    node.map(|n| unsafe { T::links(n).as_ref().height() })
        .unwrap_or(-1)
}

/// Recomputes the height of `node` from the cached heights of its children.
#[inline]
pub(crate) unsafe fn update_height<T>(node: NonNull<T>)
where
    T: TreeNode<Links<T>> + ?Sized,
{
    unsafe {
        let links = T::links(node).as_mut();
        let left = height(links.child(Dir::Left));
        let right = height(links.child(Dir::Right));
        links.set_height(1 + cmp::max(left, right));
    }
}

// Rotates the subtree rooted at `node` in direction `dir`, returning the new subtree root.
//
// The `!dir` child of `node` (the pivot) moves up, `node` becomes the pivot's `dir` child, and the
// pivot's former `dir` child moves across to become the `!dir` child of `node`. Heights of `node`
// and the pivot are refreshed; heights above the subtree are left to the caller.
//
// # Safety
//
// `node` must be a tree node whose `!dir` child is present. The caller must replace its reference
// to `node` with the returned pointer.
unsafe fn rotate<T>(node: NonNull<T>, dir: Dir) -> NonNull<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    unsafe {
        let Some(pivot) = T::links(node).as_ref().child(!dir) else {
            unreachable!("rotation pivot must be present");
        };

        let across = T::links(pivot).as_ref().child(dir);
        T::links(node).as_mut().set_child(!dir, across);
        T::links(pivot).as_mut().set_child(dir, Some(node));

        update_height(node);
        update_height(pivot);

        tracing::trace!(?dir, key = ?pivot.as_ref().key(), "rotated subtree");

        pivot
    }
}

/// Rotates the subtree rooted at `node` to the left, returning the new subtree root.
///
/// # Safety
///
/// `node` must have a right child, and the caller must replace its reference to `node` with the
/// returned pointer.
#[inline]
pub(crate) unsafe fn rotate_left<T>(node: NonNull<T>) -> NonNull<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    unsafe { rotate(node, Dir::Left) }
}

/// Rotates the subtree rooted at `node` to the right, returning the new subtree root.
///
/// # Safety
///
/// `node` must have a left child, and the caller must replace its reference to `node` with the
/// returned pointer.
#[inline]
pub(crate) unsafe fn rotate_right<T>(node: NonNull<T>) -> NonNull<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    unsafe { rotate(node, Dir::Right) }
}

/// Restores the AVL invariant at `node`, returning the root of the (possibly rotated) subtree.
///
/// Only balance factors of magnitude 2 are corrected. This suffices when `balance` is applied
/// bottom-up along the path of a single insertion.
///
/// # Safety
///
/// The subtrees of `node` must satisfy the AVL invariant, with correct cached heights. The caller
/// must replace its reference to `node` with the returned pointer.
pub(crate) unsafe fn balance<T>(node: NonNull<T>) -> NonNull<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    unsafe {
        let left = T::links(node).as_ref().child(Dir::Left);
        let right = T::links(node).as_ref().child(Dir::Right);

        match height(left) - height(right) {
            2 => {
                let Some(l) = left else {
                    unreachable!("a left-heavy node has a left child");
                };

                let l_links = T::links(l).as_ref();
                if height(l_links.child(Dir::Right)) > height(l_links.child(Dir::Left)) {
                    let l = rotate_left(l);
                    T::links(node).as_mut().set_child(Dir::Left, Some(l));
                }

                rotate_right(node)
            }

            -2 => {
                let Some(r) = right else {
                    unreachable!("a right-heavy node has a right child");
                };

                let r_links = T::links(r).as_ref();
                if height(r_links.child(Dir::Left)) > height(r_links.child(Dir::Right)) {
                    let r = rotate_right(r);
                    T::links(node).as_mut().set_child(Dir::Right, Some(r));
                }

                rotate_left(node)
            }

            _ => node,
        }
    }
}
