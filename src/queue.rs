//! An intrusive FIFO queue built on [`list::Links`](crate::list::Links).

use core::{fmt, marker::PhantomData, mem, pin::Pin, ptr::NonNull};

use cordyceps::Linked;

use crate::{list::Links, sort, Error, Weighted};

/// An intrusive first-in, first-out queue.
///
/// Elements are appended at the tail and removed at the head, both in _O(1)_ time. The queue
/// owns its elements through [`Linked::Handle`] and returns them fully unlinked on
/// [`pop`](Queue::pop).
pub struct Queue<T>
where
    T: Linked<Links<T>> + ?Sized,
{
    head: Option<NonNull<T>>,
    tail: Option<NonNull<T>>,
    len: usize,
}

// SAFETY: the queue uniquely owns its elements.
unsafe impl<T> Send for Queue<T> where T: Linked<Links<T>> + ?Sized + Send {}
unsafe impl<T> Sync for Queue<T> where T: Linked<Links<T>> + ?Sized + Sync {}

impl<T> Queue<T>
where
    T: Linked<Links<T>> + ?Sized,
{
    /// Returns a new empty queue.
    pub const fn new() -> Queue<T> {
        Queue {
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Returns `true` if the queue contains no elements.
    pub const fn is_empty(&self) -> bool {
        let empty = self.head.is_none();

        if cfg!(debug_assertions) {
            assert!(empty == (self.len == 0));
        }

        empty
    }

    /// Returns `true` if the queue contains exactly one element.
    pub fn is_singleton(&self) -> bool {
        !self.is_empty() && self.head == self.tail
    }

    /// Returns the number of elements in the queue.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Appends an element at the tail of the queue.
    pub fn push(&mut self, item: T::Handle) {
        let ptr = T::into_ptr(item);

        unsafe {
            T::links(ptr).as_mut().unlink_next();

            match self.tail {
                Some(tail) => {
                    T::links(tail).as_mut().replace_next(Some(ptr));
                }

                // Queue is empty. `item` becomes both head and tail.
                None => self.head = Some(ptr),
            }
        }

        self.tail = Some(ptr);
        self.len += 1;
    }

    /// Removes and returns the element at the head of the queue.
    ///
    /// Fails with [`Error::EmptyContainer`] if the queue is empty.
    pub fn pop(&mut self) -> Result<T::Handle, Error> {
        let head = self.head.ok_or(Error::EmptyContainer)?;

        unsafe {
            self.head = T::links(head).as_mut().unlink_next();
            if self.head.is_none() {
                self.tail = None;
            }

            self.len -= 1;
            Ok(T::from_ptr(head))
        }
    }

    /// Returns a reference to the element at the head of the queue.
    ///
    /// Fails with [`Error::EmptyContainer`] if the queue is empty.
    pub fn peek(&self) -> Result<Pin<&T>, Error> {
        let head = self.head.ok_or(Error::EmptyContainer)?;
        unsafe { Ok(Pin::new_unchecked(head.as_ref())) }
    }

    /// Returns a pinned mutable reference to the element at the head of the queue.
    ///
    /// Fails with [`Error::EmptyContainer`] if the queue is empty.
    pub fn peek_mut(&mut self) -> Result<Pin<&mut T>, Error> {
        let mut head = self.head.ok_or(Error::EmptyContainer)?;
        unsafe { Ok(Pin::new_unchecked(head.as_mut())) }
    }

    /// Returns an iterator over the elements of the queue, from head to tail.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            cur: self.head,
            len: self.len,
            _queue: PhantomData,
        }
    }

    /// Returns an iterator over pinned mutable references to the elements of the queue, from
    /// head to tail.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            cur: self.head,
            len: self.len,
            _queue: PhantomData,
        }
    }

    /// Sorts the queue by non-increasing weight, using [`merge_sort`](crate::merge_sort).
    pub fn sort(&mut self)
    where
        T: Weighted,
    {
        let queue = mem::take(self);
        *self = sort::merge_sort(queue);
    }

    /// Removes and drops every element of the queue.
    pub fn clear(&mut self) {
        while let Ok(item) = self.pop() {
            drop(item);
        }
    }
}

impl<T> Default for Queue<T>
where
    T: Linked<Links<T>> + ?Sized,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Queue<T>
where
    T: Linked<Links<T>> + ?Sized,
{
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T> fmt::Debug for Queue<T>
where
    T: Linked<Links<T>> + fmt::Debug + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Extend<T::Handle> for Queue<T>
where
    T: Linked<Links<T>> + ?Sized,
{
    fn extend<I: IntoIterator<Item = T::Handle>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}

impl<T> FromIterator<T::Handle> for Queue<T>
where
    T: Linked<Links<T>> + ?Sized,
{
    fn from_iter<I: IntoIterator<Item = T::Handle>>(iter: I) -> Self {
        let mut queue = Queue::new();
        queue.extend(iter);
        queue
    }
}

impl<'queue, T> IntoIterator for &'queue Queue<T>
where
    T: Linked<Links<T>> + ?Sized,
{
    type Item = &'queue T;
    type IntoIter = Iter<'queue, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the elements of a [`Queue`].
pub struct Iter<'queue, T: Linked<Links<T>> + ?Sized> {
    cur: Option<NonNull<T>>,
    len: usize,
    _queue: PhantomData<&'queue Queue<T>>,
}

impl<'queue, T: Linked<Links<T>> + ?Sized> Iterator for Iter<'queue, T> {
    type Item = &'queue T;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.cur?;

        unsafe {
            self.cur = T::links(cur).as_ref().next().ok();
            self.len -= 1;

            Some(cur.as_ref())
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'queue, T: Linked<Links<T>> + ?Sized> ExactSizeIterator for Iter<'queue, T> {}

/// An iterator over pinned mutable references to the elements of a [`Queue`].
pub struct IterMut<'queue, T: Linked<Links<T>> + ?Sized> {
    cur: Option<NonNull<T>>,
    len: usize,
    _queue: PhantomData<&'queue mut Queue<T>>,
}

impl<'queue, T: Linked<Links<T>> + ?Sized> Iterator for IterMut<'queue, T> {
    type Item = Pin<&'queue mut T>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut cur = self.cur?;

        unsafe {
            self.cur = T::links(cur).as_ref().next().ok();
            self.len -= 1;

            Some(Pin::new_unchecked(cur.as_mut()))
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'queue, T: Linked<Links<T>> + ?Sized> ExactSizeIterator for IterMut<'queue, T> {}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::prelude::v1::*;

    use super::*;
    use crate::model::TestItem;

    fn weights(queue: &Queue<TestItem>) -> Vec<u32> {
        queue.iter().map(|item| item.weight).collect()
    }

    #[test]
    fn empty() {
        let mut queue: Queue<TestItem> = Queue::new();

        assert!(queue.is_empty());
        assert!(!queue.is_singleton());
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.pop().err(), Some(Error::EmptyContainer));
        assert_eq!(queue.peek().err(), Some(Error::EmptyContainer));
        assert_eq!(queue.peek_mut().err(), Some(Error::EmptyContainer));
    }

    #[test]
    fn fifo_order() {
        let mut queue: Queue<TestItem> = Queue::new();
        assert!(queue.is_empty());

        queue.push(TestItem::new(0, 10));
        assert!(queue.is_singleton());
        queue.push(TestItem::new(1, 20));
        assert!(!queue.is_singleton());
        queue.push(TestItem::new(2, 30));
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.peek().unwrap().id, 0);
        assert_eq!(queue.pop().unwrap().id, 0);
        assert_eq!(queue.pop().unwrap().id, 1);
        assert!(queue.is_singleton());
        assert_eq!(queue.pop().unwrap().id, 2);

        assert!(queue.is_empty());
        assert_eq!(queue.pop().err(), Some(Error::EmptyContainer));
    }

    #[test]
    fn popped_items_are_unlinked() {
        let mut queue: Queue<TestItem> = (0..3).map(|id| TestItem::new(id, 0)).collect();

        let first = queue.pop().unwrap();
        assert!(!first.links.has_next());
        assert_eq!(first.links.next().err(), Some(Error::NotFound));

        // A popped item can be pushed again, landing at the tail.
        queue.push(first);
        let ids: Vec<usize> = queue.iter().map(|item| item.id).collect();
        assert_eq!(ids, [1, 2, 0]);
    }

    #[test]
    fn push_after_drain() {
        let mut queue: Queue<TestItem> = Queue::new();

        queue.push(TestItem::new(0, 1));
        queue.pop().unwrap();
        assert!(queue.is_empty());

        queue.push(TestItem::new(1, 2));
        queue.push(TestItem::new(2, 3));
        assert_eq!(weights(&queue), [2, 3]);
    }

    #[test]
    fn peek_mut_updates_head() {
        let mut queue: Queue<TestItem> = (0..2).map(|id| TestItem::new(id, 1)).collect();

        queue.peek_mut().unwrap().set_weight(5);
        for item in queue.iter_mut().skip(1) {
            item.set_weight(7);
        }

        assert_eq!(weights(&queue), [5, 7]);
    }

    #[test]
    fn sort_in_place() {
        let mut queue: Queue<TestItem> = [3, 1, 2]
            .into_iter()
            .enumerate()
            .map(|(id, weight)| TestItem::new(id, weight))
            .collect();

        queue.sort();

        assert_eq!(weights(&queue), [3, 2, 1]);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn clear_drops_everything() {
        let mut queue: Queue<TestItem> = (0..100).map(|id| TestItem::new(id, 0)).collect();
        assert_eq!(queue.iter().len(), 100);

        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.iter().next().map(|item| item.id), None);
    }
}
