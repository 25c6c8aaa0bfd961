// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registration errors.

use alloc::string::String;
use core::fmt;

use crate::types::{GroupId, UnknownListenerKind};

/// Error returned by group registration and listener APIs.
///
/// Registration is all-or-nothing: when an error is returned, no node has been
/// tagged and the registry is unchanged.
#[derive(Clone, PartialEq, Eq)]
pub enum GroupError<K> {
    /// The node is not part of the view tree.
    NotANode(K),
    /// The node already belongs to another group and `overwrite` was not set.
    AlreadyGrouped {
        /// The conflicting node.
        node: K,
        /// Its current group.
        owner: GroupId,
    },
    /// The group (or requested parent group) is not registered.
    UnknownGroup(GroupId),
    /// The listener key is not one of the known gesture types.
    UnknownGestureType(String),
}

impl<K: fmt::Debug> fmt::Debug for GroupError<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotANode(node) => f.debug_tuple("NotANode").field(node).finish(),
            Self::AlreadyGrouped { node, owner } => f
                .debug_struct("AlreadyGrouped")
                .field("node", node)
                .field("owner", owner)
                .finish(),
            Self::UnknownGroup(id) => f.debug_tuple("UnknownGroup").field(id).finish(),
            Self::UnknownGestureType(name) => {
                f.debug_tuple("UnknownGestureType").field(name).finish()
            }
        }
    }
}

impl<K: fmt::Debug> fmt::Display for GroupError<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotANode(node) => write!(f, "{node:?} is not a node of the view tree"),
            Self::AlreadyGrouped { node, owner } => {
                write!(f, "{node:?} already belongs to group {owner}")
            }
            Self::UnknownGroup(id) => write!(f, "group {id} is not registered"),
            Self::UnknownGestureType(name) => write!(f, "unknown gesture type `{name}`"),
        }
    }
}

impl<K: fmt::Debug> core::error::Error for GroupError<K> {}

impl<K> From<UnknownListenerKind> for GroupError<K> {
    fn from(err: UnknownListenerKind) -> Self {
        Self::UnknownGestureType(err.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn display_names_the_owner() {
        let owner = GroupId::parse("AAAAAAAAAA").unwrap();
        let err = GroupError::AlreadyGrouped { node: 3_u32, owner };
        assert_eq!(err.to_string(), "3 already belongs to group AAAAAAAAAA");
    }

    #[test]
    fn unknown_listener_kind_converts() {
        let err: GroupError<u32> = UnknownListenerKind("swipe".into()).into();
        assert_eq!(err, GroupError::UnknownGestureType("swipe".into()));
        assert_eq!(err.to_string(), "unknown gesture type `swipe`");
    }
}
