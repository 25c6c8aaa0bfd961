// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_gesture --heading-base-level=0

//! Understory Gesture: pointer and touch gesture recognition for grouped UI nodes.
//!
//! Applications register **groups** of view-tree nodes, attach listeners to them,
//! and feed raw mouse and touch input into a [`GestureEngine`]. The engine runs one
//! recognition session at a time and reports:
//!
//! - **Moves** (`mousemove`, `touchmove`): the pointer left a dead zone around the
//!   press point. The direction (up, right, down, left) is decided once and sticks.
//! - **Taps and clicks**: a release that never left the dead zone.
//! - **Double taps and double clicks**: a second tap/click on the same group within
//!   a short window.
//! - **Pinches**: two or more touch contacts, tracked by their centroid.
//!
//! Gestures bubble from a group to its parent group, so an outer container can
//! observe what happens inside nested regions.
//!
//! ## Modules
//!
//! - [`engine`]: the recognition state machine and public entry points.
//! - [`group`]: [`Group`] handles and membership operations.
//! - [`types`]: gesture, direction and listener-key enums, and [`GestureEvent`].
//! - [`input`]: raw mouse and touch input records.
//! - [`tree`]: the [`ViewTree`] trait the engine uses to walk descendants.
//! - [`config`]: dead zone, double-tap window and dispatch policy.
//!
//! ## Listener keys
//!
//! A gesture is delivered to every key that covers it, most general first. A
//! `doubletap` is delivered to `all`, then `doubletap`, `double`, `tap` and `single`.
//! Within a key, the group's own listeners run before its ancestors'.
//!
//! ## Listener execution
//!
//! Listeners are posted to a queue and run after the engine has finished its own
//! state changes for an input. A panicking listener is logged with [`log`] and the
//! remaining listeners still run.
//!
//! ## Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use hashbrown::HashMap;
//! use kurbo::Point;
//! use understory_gesture::{
//!     GestureEngine, GestureType, Group, GroupOptions, InputPhase, ListenerKind,
//!     MouseButtons, MouseInput,
//! };
//!
//! // 1 contains 2; 2 contains 3.
//! let mut tree: HashMap<u32, Vec<u32>> = HashMap::new();
//! tree.insert(1, vec![2]);
//! tree.insert(2, vec![3]);
//! tree.insert(3, vec![]);
//!
//! let mut engine = GestureEngine::new();
//! let shallow = GroupOptions::default().shallow();
//! let outer = Group::new(&mut engine, &tree, 1_u32, shallow).unwrap();
//! let inner = Group::new(
//!     &mut engine,
//!     &tree,
//!     2_u32,
//!     GroupOptions::default().with_parent(outer.id()),
//! )
//! .unwrap();
//!
//! let log = Rc::new(RefCell::new(Vec::new()));
//! for (name, group) in [("inner", inner), ("outer", outer)] {
//!     let log = log.clone();
//!     group
//!         .add_gesture_listener(&mut engine, ListenerKind::Click, move |_, ev| {
//!             log.borrow_mut().push((name, ev.gesture_type()));
//!         })
//!         .unwrap();
//! }
//!
//! // Node 3 joined `inner` because groups are deep by default.
//! let click = |phase, t| {
//!     MouseInput::new(phase, 3_u32, Point::new(4.0, 4.0), MouseButtons::PRIMARY, t)
//! };
//! engine.handle(click(InputPhase::Down, 0.0));
//! engine.handle(click(InputPhase::Up, 60.0));
//!
//! assert_eq!(
//!     *log.borrow(),
//!     vec![("inner", GestureType::Click), ("outer", GestureType::Click)]
//! );
//! ```
//!
//! ## `std` Support
//!
//! This crate requires `std`. Listeners are isolated with `std::panic::catch_unwind`,
//! and unseeded group ids are drawn from an entropy-seeded `rand::rngs::StdRng`.

extern crate alloc;

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod group;
pub mod input;
pub mod registry;
pub mod session;
pub mod tree;
pub mod types;

pub use config::{DEFAULT_DEADZONE, DOUBLE_TAP_WINDOW_MS, DispatchPolicy, EngineConfig};
pub use dispatch::Listener;
pub use engine::{GestureEngine, Progress};
pub use error::GroupError;
pub use geometry::Speed;
pub use group::Group;
pub use input::{
    InputKind, InputPhase, MouseButtons, MouseInput, PointerInput, TouchInput, TouchPoint,
    TouchPoints,
};
pub use registry::GroupOptions;
pub use session::{FinalizedSession, GestureSession};
pub use tree::{NodeSelection, ViewTree};
pub use types::{
    Direction, GROUP_ID_LEN, GestureEvent, GestureType, GroupId, ListenerKind, UnknownListenerKind,
};
