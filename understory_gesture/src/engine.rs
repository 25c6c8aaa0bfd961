// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The recognition state machine.
//!
//! ## States
//!
//! `Idle → Active → {Pinch | Tap/Click | Double} → Idle`. At most one session is
//! live per engine; a press while a session is live does not start another.
//!
//! ## Entry points
//!
//! - [`GestureEngine::start`]: a press on a grouped node opens a session.
//! - [`GestureEngine::update`]: every move tick, and once more (flagged final) on release.
//! - [`GestureEngine::end`]: the release. Finishes the session unless contacts remain.
//! - [`GestureEngine::handle`]: routes an input to the above and runs posted listeners.
//!
//! ## Classification
//!
//! - Two or more touch contacts make a pinch, tracked by their centroid. A pinch
//!   stays a pinch until the last finger lifts.
//! - Otherwise the pointer is tracked from the press point; the first tick leaving
//!   the dead zone resolves a direction (never revised) and makes the session a move.
//! - A release with no resolved direction is a tap or click, upgraded to a double
//!   when the previous session on the same group was a single tap/click of the same
//!   kind released at most [`EngineConfig::double_tap_window_ms`] earlier.
//!
//! ## Minimal example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use hashbrown::HashMap;
//! use kurbo::Point;
//! use understory_gesture::{
//!     GestureEngine, GroupOptions, InputPhase, ListenerKind, MouseButtons, MouseInput,
//! };
//!
//! let mut tree: HashMap<u32, Vec<u32>> = HashMap::new();
//! tree.insert(1, vec![]);
//!
//! let mut engine = GestureEngine::new();
//! let group = engine.create_group(&tree, 1_u32, GroupOptions::default()).unwrap();
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = seen.clone();
//! engine
//!     .add_listener(group, ListenerKind::All, move |_, ev| {
//!         sink.borrow_mut().push((ev.gesture_type(), ev.direction()));
//!     })
//!     .unwrap();
//!
//! let mouse = |phase, y, t| {
//!     MouseInput::new(phase, 1_u32, Point::new(100.0, y), MouseButtons::PRIMARY, t)
//! };
//! engine.handle(mouse(InputPhase::Down, 100.0, 0.0));
//! engine.handle(mouse(InputPhase::Move, 80.0, 16.0));
//! engine.handle(mouse(InputPhase::Up, 80.0, 32.0));
//!
//! use understory_gesture::{Direction, GestureType};
//! assert_eq!(*seen.borrow(), vec![(GestureType::MouseMove, Some(Direction::Up))]);
//! ```

use alloc::rc::Rc;
use core::fmt;
use core::hash::Hash;

use hashbrown::HashSet;
use kurbo::Point;

use crate::config::{DispatchPolicy, EngineConfig};
use crate::dispatch::{Listener, TaskQueue};
use crate::error::GroupError;
use crate::geometry::centroid;
use crate::input::{InputKind, InputPhase, PointerInput, TouchInput};
use crate::registry::{GroupOptions, GroupRegistry};
use crate::session::{FinalizedSession, GestureSession};
use crate::tree::{NodeSelection, ViewTree};
use crate::types::{GestureEvent, GestureType, GroupId, ListenerKind};

/// Result of feeding an input to a live session.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Progress {
    /// The session is complete (only reported for final ticks).
    Finished,
    /// The session continues; keep feeding move input.
    Pending,
}

/// Gesture recognizer owning the group registry and the live session.
///
/// Construct one per application and pass it by `&mut` to every
/// [`Group`](crate::Group) operation.
pub struct GestureEngine<K> {
    config: EngineConfig,
    registry: GroupRegistry<K>,
    session: Option<GestureSession<K>>,
    last_finalized: Option<FinalizedSession>,
    queue: TaskQueue<K>,
}

impl<K: fmt::Debug> fmt::Debug for GestureEngine<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureEngine")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("session", &self.session)
            .field("last_finalized", &self.last_finalized)
            .field("pending_tasks", &self.queue.len())
            .finish()
    }
}

impl<K: Clone + Eq + Hash + fmt::Debug> Default for GestureEngine<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Eq + Hash + fmt::Debug> GestureEngine<K> {
    /// An engine with the default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// An engine with a custom configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            registry: GroupRegistry::new(config.seed),
            config,
            session: None,
            last_finalized: None,
            queue: TaskQueue::default(),
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // --- registration -------------------------------------------------------------

    /// Register a new group over `nodes`.
    ///
    /// Every node is validated before any is tagged; on error nothing changes.
    pub fn create_group<T: ViewTree<K> + ?Sized>(
        &mut self,
        tree: &T,
        nodes: impl Into<NodeSelection<K>>,
        options: GroupOptions,
    ) -> Result<GroupId, GroupError<K>> {
        self.registry.create(tree, nodes.into(), options)
    }

    /// Add nodes to an existing group. `options.parent` is ignored.
    pub fn add_elements<T: ViewTree<K> + ?Sized>(
        &mut self,
        group: GroupId,
        tree: &T,
        nodes: impl Into<NodeSelection<K>>,
        options: GroupOptions,
    ) -> Result<(), GroupError<K>> {
        self.registry.add(group, tree, nodes.into(), options)
    }

    /// Remove nodes (and their descendants if `deep`) from `group`.
    ///
    /// Nodes that do not belong to `group` are ignored. Returns how many were removed.
    pub fn remove_elements<T: ViewTree<K> + ?Sized>(
        &mut self,
        group: GroupId,
        tree: &T,
        nodes: impl Into<NodeSelection<K>>,
        deep: bool,
    ) -> usize {
        self.registry.remove(group, tree, nodes.into(), deep)
    }

    /// Unregister `group` and untag its members.
    ///
    /// Child groups survive and bubble to the destroyed group's parent instead.
    pub fn destroy_group(&mut self, group: GroupId) -> bool {
        self.registry.destroy(group)
    }

    /// Append a listener for `kind` on `group` and return its handle.
    pub fn add_listener(
        &mut self,
        group: GroupId,
        kind: ListenerKind,
        callback: impl Fn(&PointerInput<K>, &GestureEvent) + 'static,
    ) -> Result<Listener<K>, GroupError<K>> {
        let listener = Listener::new(callback);
        self.add_listener_handle(group, kind, listener.clone())?;
        Ok(listener)
    }

    /// Append an existing listener handle for `kind` on `group`.
    pub fn add_listener_handle(
        &mut self,
        group: GroupId,
        kind: ListenerKind,
        listener: Listener<K>,
    ) -> Result<(), GroupError<K>> {
        self.registry.add_listener(group, kind, listener)
    }

    /// Like [`add_listener`](Self::add_listener) with the key given by name, e.g. `"doubletap"`.
    pub fn add_listener_named(
        &mut self,
        group: GroupId,
        kind: &str,
        callback: impl Fn(&PointerInput<K>, &GestureEvent) + 'static,
    ) -> Result<Listener<K>, GroupError<K>> {
        let kind: ListenerKind = kind.parse()?;
        self.add_listener(group, kind, callback)
    }

    /// Remove `listener` from every key of `group`. Returns `false` if it was not found.
    pub fn remove_listener(&mut self, group: GroupId, listener: &Listener<K>) -> bool {
        self.registry.remove_listener(group, listener)
    }

    /// Group a node belongs to.
    pub fn group_of(&self, node: &K) -> Option<GroupId> {
        self.registry.group_of(node)
    }

    /// Members of `group`, or `None` if it is not registered.
    pub fn members(&self, group: GroupId) -> Option<&HashSet<K>> {
        self.registry.members(group)
    }

    /// Parent of `group`, if any.
    pub fn parent(&self, group: GroupId) -> Option<GroupId> {
        self.registry.parent(group)
    }

    /// Returns `true` if `group` is registered.
    pub fn contains_group(&self, group: GroupId) -> bool {
        self.registry.contains(group)
    }

    /// Every registered group, in no particular order.
    pub fn groups(&self) -> impl Iterator<Item = GroupId> + '_ {
        self.registry.ids()
    }

    /// Number of registered groups.
    pub fn group_count(&self) -> usize {
        self.registry.len()
    }

    // --- recognition --------------------------------------------------------------

    /// The live session, if any.
    pub fn session(&self) -> Option<&GestureSession<K>> {
        self.session.as_ref()
    }

    /// Returns `true` while a session is live.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// The most recently finished session.
    pub fn last_finalized(&self) -> Option<&FinalizedSession> {
        self.last_finalized.as_ref()
    }

    /// Route `input` by phase, then run posted listeners and honor stop requests.
    ///
    /// A touch start while a touch session is live (a second finger landing) is
    /// treated as a move tick so a pinch can begin immediately.
    pub fn handle(&mut self, input: impl Into<PointerInput<K>>) {
        let input = Rc::new(input.into());
        match input.phase() {
            InputPhase::Down => {
                let second_finger = input.kind() == InputKind::Touch
                    && self
                        .session
                        .as_ref()
                        .is_some_and(|s| s.input_kind == InputKind::Touch);
                if second_finger {
                    self.update_shared(&input, false);
                } else {
                    self.start_shared(&input);
                }
            }
            InputPhase::Move => {
                self.update_shared(&input, false);
            }
            InputPhase::Up => {
                self.end_shared(&input);
            }
        }
        self.run_pending();
    }

    /// Open a session for a press. Returns `false` if the input was ignored.
    ///
    /// Listeners posted by the session are not run until [`run_pending`](Self::run_pending).
    pub fn start(&mut self, input: impl Into<PointerInput<K>>) -> bool {
        self.start_shared(&Rc::new(input.into()))
    }

    /// Feed a move tick (or, with `is_final`, a release) to the live session.
    ///
    /// Returns `None` if there is no live session of the input's kind.
    pub fn update(
        &mut self,
        input: impl Into<PointerInput<K>>,
        is_final: bool,
    ) -> Option<Progress> {
        self.update_shared(&Rc::new(input.into()), is_final)
    }

    /// Feed a release to the live session, finishing it unless contacts remain.
    pub fn end(&mut self, input: impl Into<PointerInput<K>>) -> Option<Progress> {
        self.end_shared(&Rc::new(input.into()))
    }

    /// Run posted listeners, then synthesize a release for any stop request.
    ///
    /// Returns the number of listeners that panicked.
    pub fn run_pending(&mut self) -> usize {
        let mut failed = 0;
        loop {
            failed += self.queue.drain();
            let Some(session) = &self.session else {
                break;
            };
            if !session.stop.take_request() {
                break;
            }
            log::debug!("stopping session on group {} on request", session.group_id);
            let release = Rc::new(session.synthetic_release());
            self.end_shared(&release);
        }
        failed
    }

    fn start_shared(&mut self, input: &Rc<PointerInput<K>>) -> bool {
        if let Some(live) = &self.session {
            log::debug!(
                "ignoring {} press: session already live on group {}",
                input.kind(),
                live.group_id
            );
            return false;
        }
        let (position, primary_touch) = match &**input {
            PointerInput::Mouse(m) if m.synthetic => {
                log::debug!("ignoring synthetic mouse press");
                return false;
            }
            PointerInput::Mouse(m) => (m.position, None),
            PointerInput::Touch(t) => {
                let [contact] = t.touches.as_slice() else {
                    log::debug!("ignoring touch start with {} contacts", t.touches.len());
                    return false;
                };
                (contact.position, Some(contact.id))
            }
        };
        let Some(group_id) = self.registry.group_of(input.target()) else {
            log::trace!("press on ungrouped node {:?}", input.target());
            return false;
        };
        log::debug!("{} session started on group {group_id}", input.kind());
        self.session = Some(GestureSession::new(
            group_id,
            input.clone(),
            position,
            primary_touch,
        ));
        true
    }

    fn end_shared(&mut self, input: &Rc<PointerInput<K>>) -> Option<Progress> {
        let session = self.session.as_mut()?;
        if session.input_kind != input.kind() {
            return None;
        }
        if !session.ended {
            session.ended = true;
            session.stop.disarm();
        }
        let progress = self.update_shared(input, true)?;
        if progress == Progress::Finished
            && let Some(done) = self.session.take()
        {
            log::debug!(
                "session on group {} finished as {:?}",
                done.group_id,
                done.gesture_type
            );
            self.last_finalized = Some(FinalizedSession {
                group_id: done.group_id,
                input_kind: done.input_kind,
                gesture_type: done.gesture_type,
                released_at: input.timestamp(),
            });
        }
        Some(progress)
    }

    fn update_shared(&mut self, input: &Rc<PointerInput<K>>, is_final: bool) -> Option<Progress> {
        let continuous = self.config.dispatch == DispatchPolicy::Continuous;
        let deadzone = self.config.deadzone;
        let window = self.config.double_tap_window_ms;
        let previous = self.last_finalized;

        let session = self.session.as_mut()?;
        if session.input_kind != input.kind() {
            log::trace!(
                "ignoring {} input during {} session",
                input.kind(),
                session.input_kind
            );
            return None;
        }
        let timestamp = input.timestamp();

        let (event, progress) = match &**input {
            PointerInput::Touch(t) => {
                let contacts = t.merged_contacts();
                if contacts.len() >= 2 || session.gesture_type == Some(GestureType::Pinch) {
                    track_pinch(session, t, is_final, continuous, deadzone)
                } else {
                    let position = session
                        .primary_touch
                        .and_then(|id| t.contact(id))
                        .or_else(|| contacts.first().copied())
                        .map_or(session.last_position, |c| c.position);
                    track_pointer(
                        session,
                        position,
                        timestamp,
                        is_final,
                        continuous,
                        deadzone,
                        window,
                        previous.as_ref(),
                    )
                }
            }
            PointerInput::Mouse(m) => {
                session.buttons = m.buttons;
                track_pointer(
                    session,
                    m.position,
                    timestamp,
                    is_final,
                    continuous,
                    deadzone,
                    window,
                    previous.as_ref(),
                )
            }
        };
        session.last = input.clone();
        log::trace!(
            "tick on group {}: type {:?}, direction {:?}, displacement {:?}",
            session.group_id,
            session.gesture_type,
            session.direction,
            session.displacement
        );

        if let Some(event) = event {
            let listeners = self
                .registry
                .resolve(event.group_id(), event.gesture_type().listener_kinds());
            self.queue.post(listeners, input, event);
        }
        Some(progress)
    }
}

/// Pinch tick: track the centroid of every contact.
fn track_pinch<K>(
    session: &mut GestureSession<K>,
    input: &TouchInput<K>,
    is_final: bool,
    continuous: bool,
    deadzone: f64,
) -> (Option<GestureEvent>, Progress) {
    let contacts = input.merged_contacts();
    let positions = contacts.iter().map(|c| c.position);
    let center = centroid(positions).unwrap_or(session.last_position);
    let became_pinch = session.gesture_type != Some(GestureType::Pinch);
    if became_pinch {
        session.gesture_type = Some(GestureType::Pinch);
        session.rebase(center, input.timestamp);
    } else {
        session.track(center, input.timestamp, deadzone);
    }
    let progress = if is_final && input.touches.is_empty() {
        Progress::Finished
    } else {
        Progress::Pending
    };
    let dispatch = became_pinch || continuous;
    let finished = progress == Progress::Finished;
    let pinch = GestureType::Pinch;
    let event = dispatch.then(|| session.snapshot(pinch, finished));
    (event, progress)
}

/// Mouse or single-contact tick: movement, or a tap/click on a release that
/// never left the dead zone.
fn track_pointer<K>(
    session: &mut GestureSession<K>,
    position: Point,
    timestamp: f64,
    is_final: bool,
    continuous: bool,
    deadzone: f64,
    window: f64,
    previous: Option<&FinalizedSession>,
) -> (Option<GestureEvent>, Progress) {
    let resolved = session.track(position, timestamp, deadzone);
    let progress = if is_final {
        Progress::Finished
    } else {
        Progress::Pending
    };

    if session.direction.is_none() {
        if !is_final {
            return (None, progress);
        }
        let kind = session.input_kind;
        let single = GestureType::single(kind);
        let is_double = previous.is_some_and(|prev| {
            prev.group_id == session.group_id
                && prev.input_kind == kind
                && prev.gesture_type == Some(single)
                && timestamp >= prev.released_at
                && timestamp - prev.released_at <= window
        });
        let discrete = if is_double {
            GestureType::double(kind)
        } else {
            single
        };
        session.gesture_type = Some(discrete);
        return (Some(session.snapshot(discrete, true)), progress);
    }

    let movement = GestureType::movement(session.input_kind);
    session.gesture_type = Some(movement);
    let dispatch = resolved || continuous;
    let event = dispatch.then(|| session.snapshot(movement, is_final));
    (event, progress)
}
