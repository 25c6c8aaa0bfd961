// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View-tree access for group registration.
//!
//! The engine never owns the host's view tree. Registration only needs to know
//! whether a node exists and, for `deep` registration, what its children are.

use alloc::vec::Vec;
use core::hash::{BuildHasher, Hash};

use hashbrown::HashMap;

/// Read access to the host's view tree.
///
/// Hosts can implement this over a box tree, an ECS, a DOM mirror or anything else
/// that can enumerate children.
pub trait ViewTree<K> {
    /// Returns `true` if `node` is part of the tree.
    fn contains(&self, node: &K) -> bool;

    /// Direct children of `node`, in document order.
    fn children(&self, node: &K) -> impl Iterator<Item = K> + '_;
}

/// Adjacency map: every node is a key, mapped to its children.
impl<K: Clone + Eq + Hash, S: BuildHasher> ViewTree<K> for HashMap<K, Vec<K>, S> {
    fn contains(&self, node: &K) -> bool {
        self.contains_key(node)
    }

    fn children(&self, node: &K) -> impl Iterator<Item = K> + '_ {
        self.get(node).into_iter().flatten().cloned()
    }
}

/// A node, or a (possibly nested) collection of nodes, to register.
///
/// ```
/// use understory_gesture::NodeSelection;
///
/// let nested = NodeSelection::Many(vec![
///     NodeSelection::Node(1_u32),
///     NodeSelection::from(vec![2_u32, 3]),
/// ]);
/// assert_eq!(nested.flatten(), vec![1, 2, 3]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeSelection<K> {
    /// A single node.
    Node(K),
    /// A sequence of selections.
    Many(Vec<Self>),
}

impl<K> NodeSelection<K> {
    /// All nodes in depth-first order.
    pub fn flatten(self) -> Vec<K> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(self, out: &mut Vec<K>) {
        match self {
            Self::Node(n) => out.push(n),
            Self::Many(items) => {
                for item in items {
                    item.flatten_into(out);
                }
            }
        }
    }
}

impl<K> From<K> for NodeSelection<K> {
    fn from(node: K) -> Self {
        Self::Node(node)
    }
}

impl<K> From<Vec<K>> for NodeSelection<K> {
    fn from(nodes: Vec<K>) -> Self {
        Self::Many(nodes.into_iter().map(Self::Node).collect())
    }
}

impl<K: Clone> From<&[K]> for NodeSelection<K> {
    fn from(nodes: &[K]) -> Self {
        Self::Many(nodes.iter().cloned().map(Self::Node).collect())
    }
}

/// Expand `roots` with every descendant, depth-first, skipping duplicates.
pub(crate) fn collect_nodes<K, T>(tree: &T, roots: Vec<K>, deep: bool) -> Vec<K>
where
    K: Clone + Eq + Hash,
    T: ViewTree<K> + ?Sized,
{
    let mut seen = hashbrown::HashSet::new();
    let mut out = Vec::new();
    let mut stack: Vec<K> = Vec::new();
    for root in roots {
        stack.push(root);
        while let Some(node) = stack.pop() {
            if !seen.insert(node.clone()) {
                continue;
            }
            if deep {
                let mut children: Vec<K> = tree.children(&node).collect();
                children.reverse();
                stack.extend(children);
            }
            out.push(node);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn tree() -> HashMap<u32, Vec<u32>> {
        let mut t = HashMap::new();
        t.insert(1, vec![2, 3]);
        t.insert(2, vec![4]);
        t.insert(3, vec![]);
        t.insert(4, vec![]);
        t
    }

    #[test]
    fn deep_collection_walks_descendants_in_order() {
        assert_eq!(collect_nodes(&tree(), vec![1], true), vec![1, 2, 4, 3]);
    }

    #[test]
    fn shallow_collection_keeps_roots_only() {
        assert_eq!(collect_nodes(&tree(), vec![1, 3], false), vec![1, 3]);
    }

    #[test]
    fn overlapping_roots_are_deduplicated() {
        assert_eq!(collect_nodes(&tree(), vec![2, 1], true), vec![2, 4, 1, 3]);
    }

    #[test]
    fn nested_selections_flatten_depth_first() {
        let inner = NodeSelection::Many(vec![NodeSelection::Node(2), NodeSelection::Node(3)]);
        let outer = NodeSelection::Many(vec![inner, NodeSelection::Node(4)]);
        assert_eq!(outer.flatten(), vec![2, 3, 4]);
    }

    #[test]
    fn map_tree_reports_membership() {
        let t = tree();
        assert!(t.contains(&4));
        assert!(!t.contains(&9));
        assert_eq!(t.children(&9).count(), 0);
    }
}
