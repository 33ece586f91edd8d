use core::{marker::PhantomData, ptr::NonNull};

use crate::{AvlTree, Dir, Link, Links, TreeNode};

/// An iterator over the elements of an [`AvlTree`], in key order.
pub struct Iter<'tree, T: TreeNode<Links<T>> + ?Sized> {
    // The nodes whose left subtree has been exhausted but which have not been yielded yet. The
    // next node to yield is on top.
    ancestors: Vec<NonNull<T>>,

    len: usize,
    _tree: PhantomData<&'tree AvlTree<T>>,
}

impl<'tree, T: TreeNode<Links<T>> + ?Sized> Iter<'tree, T> {
    pub(crate) fn new(tree: &'tree AvlTree<T>) -> Self {
        let capacity = tree.height().max(0) as usize + 1;

        let mut iter = Iter {
            ancestors: Vec::with_capacity(capacity),
            len: tree.len(),
            _tree: PhantomData,
        };

        iter.descend_left(tree.root);
        iter
    }

    // Upon entering a new subtree, stack the path to its minimum element.
    fn descend_left(&mut self, mut opt_cur: Link<T>) {
        while let Some(cur) = opt_cur {
            self.ancestors.push(cur);
            opt_cur = unsafe { T::links(cur).as_ref().child(Dir::Left) };
        }
    }
}

impl<'tree, T: TreeNode<Links<T>> + ?Sized> Iterator for Iter<'tree, T> {
    type Item = &'tree T;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.ancestors.pop()?;

        // The left subtree of `cur` has been exhausted, so its right subtree is up next.
        self.descend_left(unsafe { T::links(cur).as_ref().child(Dir::Right) });
        self.len -= 1;

        Some(unsafe { cur.as_ref() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'tree, T: TreeNode<Links<T>> + ?Sized> ExactSizeIterator for Iter<'tree, T> {}
