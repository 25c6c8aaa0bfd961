// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Group registry: membership index, listener tables and parent links.
//!
//! Membership is a bidirectional index (`node → group` and `group → nodes`); a node
//! belongs to at most one group. Every group carries one listener list per
//! [`ListenerKind`], all present from creation.
//!
//! Bubbling is resolved here: the listeners for a key on a group are its own list
//! followed by the same key's listeners on its parent, transitively.

use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::{HashMap, HashSet};
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::dispatch::Listener;
use crate::error::GroupError;
use crate::tree::{NodeSelection, ViewTree, collect_nodes};
use crate::types::{GroupId, ListenerKind};

/// Options for registering nodes with a group.
///
/// ```
/// use understory_gesture::GroupOptions;
///
/// let opts = GroupOptions::default();
/// assert!(opts.deep && !opts.overwrite && opts.parent.is_none());
///
/// let opts = GroupOptions::default().shallow().overwrite();
/// assert!(!opts.deep && opts.overwrite);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GroupOptions {
    /// Also register every descendant of the given nodes.
    pub deep: bool,
    /// Move nodes that already belong to another group instead of failing.
    pub overwrite: bool,
    /// Parent group that receives bubbled gestures. Only used at creation.
    pub parent: Option<GroupId>,
}

impl Default for GroupOptions {
    fn default() -> Self {
        Self {
            deep: true,
            overwrite: false,
            parent: None,
        }
    }
}

impl GroupOptions {
    /// Register only the listed nodes, not their descendants.
    #[must_use]
    pub fn shallow(mut self) -> Self {
        self.deep = false;
        self
    }

    /// Take nodes away from their current group.
    #[must_use]
    pub fn overwrite(mut self) -> Self {
        self.overwrite = true;
        self
    }

    /// Bubble gestures to `parent`.
    #[must_use]
    pub fn with_parent(mut self, parent: GroupId) -> Self {
        self.parent = Some(parent);
        self
    }
}

struct GroupRecord<K> {
    members: HashSet<K>,
    parent: Option<GroupId>,
    listeners: [Vec<Listener<K>>; ListenerKind::COUNT],
}

impl<K> GroupRecord<K> {
    fn new(parent: Option<GroupId>) -> Self {
        Self {
            members: HashSet::new(),
            parent,
            listeners: core::array::from_fn(|_| Vec::new()),
        }
    }
}

/// Registry of groups, owned by the engine.
pub(crate) struct GroupRegistry<K> {
    groups: HashMap<GroupId, GroupRecord<K>>,
    owners: HashMap<K, GroupId>,
    rng: StdRng,
}

impl<K> core::fmt::Debug for GroupRegistry<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GroupRegistry")
            .field("groups", &self.groups.len())
            .field("nodes", &self.owners.len())
            .finish_non_exhaustive()
    }
}

impl<K: Clone + Eq + Hash> GroupRegistry<K> {
    pub(crate) fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            groups: HashMap::new(),
            owners: HashMap::new(),
            rng,
        }
    }

    /// Sample ids until one is not in use.
    fn fresh_id(&mut self) -> GroupId {
        loop {
            let bytes = core::array::from_fn(|_| self.rng.sample(Alphanumeric));
            let id = GroupId::from_ascii(bytes);
            if !self.groups.contains_key(&id) {
                return id;
            }
        }
    }

    pub(crate) fn create<T: ViewTree<K> + ?Sized>(
        &mut self,
        tree: &T,
        nodes: NodeSelection<K>,
        options: GroupOptions,
    ) -> Result<GroupId, GroupError<K>> {
        if let Some(parent) = options.parent
            && !self.groups.contains_key(&parent)
        {
            return Err(GroupError::UnknownGroup(parent));
        }
        let nodes = collect_nodes(tree, nodes.flatten(), options.deep);
        self.validate(tree, &nodes, None, options.overwrite)?;

        let id = self.fresh_id();
        self.groups.insert(id, GroupRecord::new(options.parent));
        self.tag(id, nodes);
        log::debug!("created gesture group {id} (parent: {:?})", options.parent);
        Ok(id)
    }

    pub(crate) fn add<T: ViewTree<K> + ?Sized>(
        &mut self,
        id: GroupId,
        tree: &T,
        nodes: NodeSelection<K>,
        options: GroupOptions,
    ) -> Result<(), GroupError<K>> {
        if !self.groups.contains_key(&id) {
            return Err(GroupError::UnknownGroup(id));
        }
        let nodes = collect_nodes(tree, nodes.flatten(), options.deep);
        self.validate(tree, &nodes, Some(id), options.overwrite)?;
        self.tag(id, nodes);
        Ok(())
    }

    /// Check every node before any is tagged.
    fn validate<T: ViewTree<K> + ?Sized>(
        &self,
        tree: &T,
        nodes: &[K],
        target: Option<GroupId>,
        overwrite: bool,
    ) -> Result<(), GroupError<K>> {
        for node in nodes {
            if !tree.contains(node) {
                return Err(GroupError::NotANode(node.clone()));
            }
            if let Some(&owner) = self.owners.get(node)
                && Some(owner) != target
                && !overwrite
            {
                return Err(GroupError::AlreadyGrouped {
                    node: node.clone(),
                    owner,
                });
            }
        }
        Ok(())
    }

    fn tag(&mut self, id: GroupId, nodes: Vec<K>) {
        for node in nodes {
            if let Some(previous) = self.owners.insert(node.clone(), id)
                && previous != id
                && let Some(record) = self.groups.get_mut(&previous)
            {
                record.members.remove(&node);
            }
            if let Some(record) = self.groups.get_mut(&id) {
                record.members.insert(node);
            }
        }
    }

    /// Untag the listed nodes that belong to `id`; returns how many were removed.
    pub(crate) fn remove<T: ViewTree<K> + ?Sized>(
        &mut self,
        id: GroupId,
        tree: &T,
        nodes: NodeSelection<K>,
        deep: bool,
    ) -> usize {
        let Some(record) = self.groups.get_mut(&id) else {
            return 0;
        };
        let mut removed = 0;
        for node in collect_nodes(tree, nodes.flatten(), deep) {
            if self.owners.get(&node) == Some(&id) {
                self.owners.remove(&node);
                record.members.remove(&node);
                removed += 1;
            }
        }
        removed
    }

    /// Drop a group, untag its members and re-link its children to its parent.
    pub(crate) fn destroy(&mut self, id: GroupId) -> bool {
        let Some(record) = self.groups.remove(&id) else {
            return false;
        };
        for node in &record.members {
            self.owners.remove(node);
        }
        for child in self.groups.values_mut() {
            if child.parent == Some(id) {
                child.parent = record.parent;
            }
        }
        log::debug!("destroyed gesture group {id}");
        true
    }

    pub(crate) fn add_listener(
        &mut self,
        id: GroupId,
        kind: ListenerKind,
        listener: Listener<K>,
    ) -> Result<(), GroupError<K>> {
        let record = self
            .groups
            .get_mut(&id)
            .ok_or(GroupError::UnknownGroup(id))?;
        record.listeners[kind.index()].push(listener);
        Ok(())
    }

    /// Remove every registration of `listener` on `id`, under any key.
    pub(crate) fn remove_listener(&mut self, id: GroupId, listener: &Listener<K>) -> bool {
        let Some(record) = self.groups.get_mut(&id) else {
            return false;
        };
        let mut removed = false;
        for list in &mut record.listeners {
            let before = list.len();
            list.retain(|l| !l.same(listener));
            removed |= list.len() != before;
        }
        removed
    }

    /// Listeners for `kinds` on `id`, each key followed by its ancestors' lists.
    pub(crate) fn resolve(&self, id: GroupId, kinds: &[ListenerKind]) -> Vec<Listener<K>> {
        let mut out = Vec::new();
        for kind in kinds {
            let mut current = Some(id);
            while let Some(group) = current {
                let Some(record) = self.groups.get(&group) else {
                    log::warn!("gesture group {group} is no longer registered");
                    break;
                };
                out.extend(record.listeners[kind.index()].iter().cloned());
                current = record.parent;
            }
        }
        out
    }

    pub(crate) fn group_of(&self, node: &K) -> Option<GroupId> {
        self.owners.get(node).copied()
    }

    pub(crate) fn contains(&self, id: GroupId) -> bool {
        self.groups.contains_key(&id)
    }

    pub(crate) fn parent(&self, id: GroupId) -> Option<GroupId> {
        self.groups.get(&id).and_then(|r| r.parent)
    }

    pub(crate) fn members(&self, id: GroupId) -> Option<&HashSet<K>> {
        self.groups.get(&id).map(|r| &r.members)
    }

    pub(crate) fn ids(&self) -> impl Iterator<Item = GroupId> + '_ {
        self.groups.keys().copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.groups.len()
    }
}
