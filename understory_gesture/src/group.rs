// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Group handles.
//!
//! A [`Group`] is a thin, copyable handle around a [`GroupId`]. Every operation
//! borrows the [`GestureEngine`] that owns the registry, so handles never go stale
//! in a way that could corrupt state: operations on a destroyed group report
//! [`GroupError::UnknownGroup`] or do nothing.

use core::fmt;
use core::hash::Hash;

use hashbrown::HashSet;

use crate::dispatch::Listener;
use crate::engine::GestureEngine;
use crate::error::GroupError;
use crate::input::PointerInput;
use crate::registry::GroupOptions;
use crate::tree::{NodeSelection, ViewTree};
use crate::types::{GestureEvent, GroupId, ListenerKind};

/// Handle to a registered gesture group.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Group {
    id: GroupId,
}

impl Group {
    /// Register a group over `nodes` (and their descendants unless `options` is shallow).
    ///
    /// Fails without side effects if any node is missing from `tree`, or already
    /// belongs to another group and `options.overwrite` is not set.
    pub fn new<K, T>(
        engine: &mut GestureEngine<K>,
        tree: &T,
        nodes: impl Into<NodeSelection<K>>,
        options: GroupOptions,
    ) -> Result<Self, GroupError<K>>
    where
        K: Clone + Eq + Hash + fmt::Debug,
        T: ViewTree<K> + ?Sized,
    {
        engine
            .create_group(tree, nodes, options)
            .map(|id| Self { id })
    }

    /// Handle for an existing id. The group is not required to be registered.
    pub fn from_id(id: GroupId) -> Self {
        Self { id }
    }

    /// The group's id.
    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Add nodes under the same validation as [`Group::new`].
    pub fn add_element<K, T>(
        &self,
        engine: &mut GestureEngine<K>,
        tree: &T,
        nodes: impl Into<NodeSelection<K>>,
        options: GroupOptions,
    ) -> Result<(), GroupError<K>>
    where
        K: Clone + Eq + Hash + fmt::Debug,
        T: ViewTree<K> + ?Sized,
    {
        engine.add_elements(self.id, tree, nodes, options)
    }

    /// Remove nodes from this group; returns how many were untagged.
    pub fn remove_element<K, T>(
        &self,
        engine: &mut GestureEngine<K>,
        tree: &T,
        nodes: impl Into<NodeSelection<K>>,
        deep: bool,
    ) -> usize
    where
        K: Clone + Eq + Hash + fmt::Debug,
        T: ViewTree<K> + ?Sized,
    {
        engine.remove_elements(self.id, tree, nodes, deep)
    }

    /// Unregister the group.
    pub fn destroy<K>(self, engine: &mut GestureEngine<K>) -> bool
    where
        K: Clone + Eq + Hash + fmt::Debug,
    {
        engine.destroy_group(self.id)
    }

    /// Register a listener for `kind`; keep the returned handle to remove it later.
    pub fn add_gesture_listener<K>(
        &self,
        engine: &mut GestureEngine<K>,
        kind: ListenerKind,
        callback: impl Fn(&PointerInput<K>, &GestureEvent) + 'static,
    ) -> Result<Listener<K>, GroupError<K>>
    where
        K: Clone + Eq + Hash + fmt::Debug,
    {
        engine.add_listener(self.id, kind, callback)
    }

    /// Register a listener by key name, e.g. `"move"` or `"doubleclick"`.
    ///
    /// Unknown names fail with [`GroupError::UnknownGestureType`].
    pub fn add_gesture_listener_named<K>(
        &self,
        engine: &mut GestureEngine<K>,
        kind: &str,
        callback: impl Fn(&PointerInput<K>, &GestureEvent) + 'static,
    ) -> Result<Listener<K>, GroupError<K>>
    where
        K: Clone + Eq + Hash + fmt::Debug,
    {
        engine.add_listener_named(self.id, kind, callback)
    }

    /// Remove a listener from every key it was registered under.
    pub fn remove_listener<K>(&self, engine: &mut GestureEngine<K>, listener: &Listener<K>) -> bool
    where
        K: Clone + Eq + Hash + fmt::Debug,
    {
        engine.remove_listener(self.id, listener)
    }

    /// Current members, or `None` once destroyed.
    pub fn members<'a, K>(&self, engine: &'a GestureEngine<K>) -> Option<&'a HashSet<K>>
    where
        K: Clone + Eq + Hash + fmt::Debug,
    {
        engine.members(self.id)
    }

    /// Parent group, if any.
    pub fn parent<K>(&self, engine: &GestureEngine<K>) -> Option<Self>
    where
        K: Clone + Eq + Hash + fmt::Debug,
    {
        engine.parent(self.id).map(Self::from_id)
    }
}

impl From<Group> for GroupId {
    fn from(group: Group) -> Self {
        group.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use alloc::vec;
    use alloc::vec::Vec;
    use hashbrown::HashMap;

    fn tree() -> HashMap<u32, Vec<u32>> {
        let mut t = HashMap::new();
        t.insert(1, vec![2, 3]);
        t.insert(2, vec![]);
        t.insert(3, vec![]);
        t.insert(9, vec![]);
        t
    }

    #[test]
    fn handle_round_trips_through_engine() {
        let tree = tree();
        let mut engine = GestureEngine::with_config(EngineConfig::default().with_seed(3));
        let group = Group::new(&mut engine, &tree, 1_u32, GroupOptions::default()).unwrap();
        assert_eq!(group.members(&engine).map(HashSet::len), Some(3));

        group
            .add_element(&mut engine, &tree, 9_u32, GroupOptions::default())
            .unwrap();
        assert_eq!(engine.group_of(&9), Some(group.id()));

        assert_eq!(group.remove_element(&mut engine, &tree, 1_u32, false), 1);
        assert_eq!(engine.group_of(&1), None);
        assert_eq!(engine.group_of(&2), Some(group.id()));

        assert!(group.destroy(&mut engine));
        assert_eq!(engine.group_of(&2), None);
        assert_eq!(group.members(&engine), None);
    }

    #[test]
    fn named_listener_rejects_unknown_key() {
        let tree = tree();
        let mut engine = GestureEngine::with_config(EngineConfig::default().with_seed(3));
        let group = Group::new(&mut engine, &tree, 9_u32, GroupOptions::default()).unwrap();
        let err = group
            .add_gesture_listener_named(&mut engine, "swipe", |_, _| {})
            .unwrap_err();
        assert_eq!(err, GroupError::UnknownGestureType("swipe".into()));

        let l = group
            .add_gesture_listener_named(&mut engine, "doubletap", |_, _| {})
            .unwrap();
        assert!(group.remove_listener(&mut engine, &l));
        assert!(!group.remove_listener(&mut engine, &l));
    }

    #[test]
    fn child_handle_reports_parent() {
        let tree = tree();
        let mut engine = GestureEngine::with_config(EngineConfig::default().with_seed(3));
        let shallow = GroupOptions::default().shallow();
        let outer = Group::new(&mut engine, &tree, 1_u32, shallow).unwrap();
        let inner = Group::new(
            &mut engine,
            &tree,
            2_u32,
            GroupOptions::default().with_parent(outer.id()),
        )
        .unwrap();
        assert_eq!(inner.parent(&engine), Some(outer));
        assert_eq!(outer.parent(&engine), None);
    }
}
