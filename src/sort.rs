//! Merge sort over [`Queue`]s.
//!
//! The sort never indexes by position: every access goes through [`Queue::push`],
//! [`Queue::pop`], [`Queue::peek`] and [`Queue::is_empty`], so it needs no more than a FIFO.

use cordyceps::Linked;

use crate::{list::Links, Queue};

/// An element ordered by a weight, such as an occurrence count.
pub trait Weighted {
    type Weight: Ord;

    fn weight(&self) -> Self::Weight;
}

/// Sorts `queue` by non-increasing weight.
///
/// The queue is split by dealing its elements alternately into two halves, each half is sorted
/// recursively, and the sorted halves are merged. When the heads of both halves have equal
/// weights, the head of the second half is taken first, so the output is deterministic but the
/// sort is not stable.
///
/// This operation completes in _O(n log(n))_ time.
pub fn merge_sort<T>(mut queue: Queue<T>) -> Queue<T>
where
    T: Linked<Links<T>> + Weighted + ?Sized,
{
    if queue.is_empty() || queue.is_singleton() {
        return queue;
    }

    tracing::trace!(len = queue.len(), "sorting queue");

    let mut left = Queue::new();
    let mut right = Queue::new();

    let mut to_left = true;
    while let Ok(item) = queue.pop() {
        if to_left {
            left.push(item);
        } else {
            right.push(item);
        }

        to_left = !to_left;
    }

    merge(merge_sort(left), merge_sort(right))
}

// Merges two queues sorted by non-increasing weight into one.
fn merge<T>(mut left: Queue<T>, mut right: Queue<T>) -> Queue<T>
where
    T: Linked<Links<T>> + Weighted + ?Sized,
{
    let mut merged = Queue::new();

    loop {
        let take_left = match (left.peek(), right.peek()) {
            (Err(_), Err(_)) => break,
            (Ok(_), Err(_)) => true,
            (Err(_), Ok(_)) => false,
            // Ties go to `right`.
            (Ok(l), Ok(r)) => l.weight() > r.weight(),
        };

        let source = if take_left { &mut left } else { &mut right };
        if let Ok(item) = source.pop() {
            merged.push(item);
        }
    }

    merged
}
