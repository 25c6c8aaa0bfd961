// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! State of the single live gesture session.
//!
//! A session spans one continuous interaction, from the first qualifying press to
//! the release. It tracks positions the way a drag tracker does (origin, last
//! position, deltas) and layers gesture classification on top.

use alloc::rc::Rc;

use kurbo::{Point, Vec2};

use crate::geometry::{Speed, direction, displacement, speed};
use crate::input::{
    InputKind, InputPhase, MouseButtons, MouseInput, PointerInput, TouchInput, TouchPoints,
};
use crate::types::{Direction, GestureEvent, GestureType, GroupId, StopSignal};

/// The live gesture session.
#[derive(Debug)]
pub struct GestureSession<K> {
    pub(crate) group_id: GroupId,
    pub(crate) input_kind: InputKind,
    pub(crate) gesture_type: Option<GestureType>,
    pub(crate) initial: Rc<PointerInput<K>>,
    pub(crate) last: Rc<PointerInput<K>>,
    pub(crate) primary_touch: Option<u64>,
    pub(crate) origin: Point,
    pub(crate) last_position: Point,
    pub(crate) last_timestamp: f64,
    pub(crate) displacement: Vec2,
    pub(crate) direction: Option<Direction>,
    pub(crate) speed: Option<Speed>,
    pub(crate) buttons: MouseButtons,
    pub(crate) dispatched: bool,
    pub(crate) ended: bool,
    pub(crate) stop: Rc<StopSignal>,
}

impl<K> GestureSession<K> {
    pub(crate) fn new(
        group_id: GroupId,
        input: Rc<PointerInput<K>>,
        position: Point,
        primary_touch: Option<u64>,
    ) -> Self {
        let buttons = match &*input {
            PointerInput::Mouse(m) => m.buttons,
            PointerInput::Touch(_) => MouseButtons::empty(),
        };
        Self {
            group_id,
            input_kind: input.kind(),
            gesture_type: None,
            last_timestamp: input.timestamp(),
            initial: input.clone(),
            last: input,
            primary_touch,
            origin: position,
            last_position: position,
            displacement: Vec2::ZERO,
            direction: None,
            speed: None,
            buttons,
            dispatched: false,
            ended: false,
            stop: StopSignal::armed(),
        }
    }

    /// Group the session started on.
    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    /// Device kind driving the session.
    pub fn input_kind(&self) -> InputKind {
        self.input_kind
    }

    /// Gesture type, or `None` while still pending.
    pub fn gesture_type(&self) -> Option<GestureType> {
        self.gesture_type
    }

    /// The press that started the session.
    pub fn initial_input(&self) -> &PointerInput<K> {
        &self.initial
    }

    /// The most recent input processed.
    pub fn last_input(&self) -> &PointerInput<K> {
        &self.last
    }

    /// Displacement from the origin (the press point, or the centroid where a pinch began).
    pub fn displacement(&self) -> Vec2 {
        self.displacement
    }

    /// Resolved direction; sticky once set.
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Latest speed estimate.
    pub fn speed(&self) -> Option<Speed> {
        self.speed
    }

    /// Buttons held on the last mouse tick.
    pub fn buttons(&self) -> MouseButtons {
        self.buttons
    }

    /// Whether a gesture has been dispatched for this session.
    pub fn has_dispatched(&self) -> bool {
        self.dispatched
    }

    /// Whether release processing has begun.
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Move to `position` at `timestamp`: update displacement, speed and direction.
    ///
    /// Returns `true` if this call resolved the direction. Speed keeps its previous
    /// value when no time elapsed since the last tick.
    pub(crate) fn track(&mut self, position: Point, timestamp: f64, deadzone: f64) -> bool {
        let delta = position - self.last_position;
        if let Some(s) = speed(delta, timestamp - self.last_timestamp) {
            self.speed = Some(s);
        }
        self.displacement = displacement(position, self.origin);
        self.last_position = position;
        self.last_timestamp = timestamp;
        if self.direction.is_none() {
            self.direction = direction(self.displacement, deadzone);
            return self.direction.is_some();
        }
        false
    }

    /// Restart position tracking at `position`, keeping the resolved direction.
    pub(crate) fn rebase(&mut self, position: Point, timestamp: f64) {
        self.origin = position;
        self.last_position = position;
        self.last_timestamp = timestamp;
        self.displacement = Vec2::ZERO;
    }

    /// Build the listener snapshot for `gesture_type` and mark the session as dispatched.
    pub(crate) fn snapshot(&mut self, gesture_type: GestureType, is_final: bool) -> GestureEvent {
        let start = !self.dispatched;
        self.dispatched = true;
        let movement = !gesture_type.is_discrete();
        GestureEvent {
            group_id: self.group_id,
            gesture_type,
            input_kind: self.input_kind,
            direction: self.direction.filter(|_| movement),
            displacement: movement.then_some(self.displacement),
            speed: self.speed.filter(|_| movement),
            position: movement.then_some(self.last_position),
            mouse_buttons: (self.input_kind == InputKind::Mouse).then_some(self.buttons),
            start_of_movement: movement.then_some(start),
            end_of_movement: movement.then_some(is_final),
            stop: self.stop.clone(),
        }
    }
}

impl<K: Clone> GestureSession<K> {
    /// A release of the session's kind at the last known position, used to honor
    /// stop requests.
    pub(crate) fn synthetic_release(&self) -> PointerInput<K> {
        match &*self.last {
            PointerInput::Mouse(m) => PointerInput::Mouse(MouseInput {
                phase: InputPhase::Up,
                target: m.target.clone(),
                position: m.position,
                buttons: MouseButtons::empty(),
                timestamp: m.timestamp,
                synthetic: true,
            }),
            PointerInput::Touch(t) => PointerInput::Touch(TouchInput {
                phase: InputPhase::Up,
                target: t.target.clone(),
                touches: TouchPoints::new(),
                changed_touches: t.merged_contacts(),
                timestamp: t.timestamp,
            }),
        }
    }
}

/// What is remembered of a finished session, for double tap/click detection.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FinalizedSession {
    /// Group the session ran on.
    pub group_id: GroupId,
    /// Device kind.
    pub input_kind: InputKind,
    /// Final gesture type, if one was resolved.
    pub gesture_type: Option<GestureType>,
    /// Timestamp of the release that finished the session.
    pub released_at: f64,
}
