use core::ptr::NonNull;
use std::{collections::VecDeque, fmt, fmt::Write as _};

use crate::{node::Dir, AvlTree, Links, TreeNode};

impl<T> AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
    T::Key: fmt::Display,
{
    /// Writes the tree as a Graphviz digraph, one rank per level, labelling each node
    /// `key:height`.
    ///
    /// Quotes and backslashes in keys are escaped.
    pub fn dotgraph<W>(&self, name: &str, mut w: W) -> fmt::Result
    where
        W: fmt::Write,
    {
        let Some(root) = self.root else {
            return write!(w, "digraph \"graph-{name}\" {{}}");
        };

        enum Item<T: ?Sized> {
            Node(NonNull<T>),
            Missing(u32),
        }

        let mut queue = VecDeque::new();
        queue.push_back(Item::Node(root));

        write!(
            w,
            "digraph \"graph-{name}\" {{\n subgraph \"subgraph-{name}\" {{"
        )?;

        let mut missing = 0;
        let mut edges = String::new();

        while !queue.is_empty() {
            write!(w, "{{rank=same; ")?;

            let level: Vec<_> = queue.drain(..).collect();
            for item in level {
                let node = match item {
                    Item::Node(node) => node,
                    Item::Missing(id) => {
                        write!(w, "\"graph{name}-missing{id}\" [shape=point]; ")?;
                        continue;
                    }
                };

                let (key, links) = unsafe { (node.as_ref().key(), T::links(node).as_ref()) };
                let key = Escaped(key);
                write!(
                    w,
                    "\"graph{name}-{key}\" [label=\"{key}:{}\"]; ",
                    links.height()
                )?;

                for dir in [Dir::Left, Dir::Right] {
                    match links.child(dir) {
                        Some(child) => {
                            let child_key = Escaped(unsafe { child.as_ref().key() });
                            queue.push_back(Item::Node(child));
                            writeln!(
                                edges,
                                "\"graph{name}-{key}\" -> \"graph{name}-{child_key}\";"
                            )?;
                        }
                        None => {
                            queue.push_back(Item::Missing(missing));
                            writeln!(
                                edges,
                                "\"graph{name}-{key}\" -> \"graph{name}-missing{missing}\";"
                            )?;
                            missing += 1;
                        }
                    }
                }
            }

            writeln!(w, "}}")?;
        }

        w.write_str(&edges)?;

        w.write_str(" }\n}")
    }
}

// Displays a value with `"` and `\` escaped, for use inside a quoted DOT identifier.
struct Escaped<'a, K: ?Sized>(&'a K);

impl<K: fmt::Display + ?Sized> fmt::Display for Escaped<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct Escaper<'a, 'b>(&'a mut fmt::Formatter<'b>);

        impl fmt::Write for Escaper<'_, '_> {
            fn write_str(&mut self, s: &str) -> fmt::Result {
                for c in s.chars() {
                    if matches!(c, '"' | '\\') {
                        self.0.write_char('\\')?;
                    }
                    self.0.write_char(c)?;
                }
                Ok(())
            }
        }

        write!(Escaper(f), "{}", self.0)
    }
}
