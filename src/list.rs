//! Singly-linked list links.
//!
//! A [`Links`] value holds the forward link of one list element. It carries no payload; the
//! element type embeds it and implements [`cordyceps::Linked`] to expose it. Lists built from
//! these links are walked front to back only, and an element detached from its list (for
//! example by [`Queue::pop`](crate::Queue::pop)) cannot be used to revisit its former position.

use core::{cell::UnsafeCell, fmt, marker::PhantomPinned, mem, ptr::NonNull};

use crate::Error;

/// The forward link of a singly-linked list element.
pub struct Links<T: ?Sized> {
    inner: UnsafeCell<LinksInner<T>>,
}

struct LinksInner<T: ?Sized> {
    next: Option<NonNull<T>>,
    _unpin: PhantomPinned,
}

// SAFETY: `Links` is only mutated through `&mut` access to the owning list.
unsafe impl<T: ?Sized + Send> Send for Links<T> {}
unsafe impl<T: ?Sized + Sync> Sync for Links<T> {}

impl<T: ?Sized> Links<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: UnsafeCell::new(LinksInner {
                next: None,
                _unpin: PhantomPinned,
            }),
        }
    }

    /// Returns `true` if an element is linked after this one.
    #[inline]
    pub fn has_next(&self) -> bool {
        self.raw_next().is_some()
    }

    /// Returns the element linked after this one, or [`Error::NotFound`] if there is none.
    #[inline]
    pub fn next(&self) -> Result<NonNull<T>, Error> {
        self.raw_next().ok_or(Error::NotFound)
    }

    /// Links `target` after this element.
    ///
    /// Fails with [`Error::InvalidArgument`] if `target` is `None`; use
    /// [`unlink_next`](Self::unlink_next) to clear the link.
    pub fn set_next(&mut self, target: Option<NonNull<T>>) -> Result<(), Error> {
        let target = target.ok_or(Error::InvalidArgument)?;
        self.replace_next(Some(target));
        Ok(())
    }

    /// Clears the forward link, returning the former successor.
    pub fn unlink_next(&mut self) -> Option<NonNull<T>> {
        self.replace_next(None)
    }

    #[inline]
    pub(crate) fn raw_next(&self) -> Option<NonNull<T>> {
        unsafe { (*self.inner.get()).next }
    }

    #[inline]
    pub(crate) fn replace_next(&mut self, next: Option<NonNull<T>>) -> Option<NonNull<T>> {
        mem::replace(&mut self.inner.get_mut().next, next)
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
            .field("next", &self.raw_next())
            .finish()
    }
}
