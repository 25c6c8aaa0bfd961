// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types: group identifiers, gesture types, listener keys and emitted events.

use alloc::rc::Rc;
use alloc::string::String;
use core::cell::Cell;
use core::fmt;
use core::str::FromStr;

use kurbo::{Point, Vec2};

use crate::geometry::Speed;
use crate::input::{InputKind, MouseButtons};

/// Length of a [`GroupId`] in characters.
pub const GROUP_ID_LEN: usize = 10;

/// Opaque identifier of a registered group.
///
/// Ten ASCII alphanumeric characters, unique among the groups currently registered
/// with a [`GestureEngine`](crate::GestureEngine).
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId([u8; GROUP_ID_LEN]);

impl GroupId {
    /// Caller guarantees every byte is ASCII alphanumeric.
    pub(crate) const fn from_ascii(bytes: [u8; GROUP_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse an identifier from its string form.
    ///
    /// Returns `None` unless `s` is exactly ten ASCII alphanumeric characters.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let bytes: [u8; GROUP_ID_LEN] = s.as_bytes().try_into().ok()?;
        bytes
            .iter()
            .all(u8::is_ascii_alphanumeric)
            .then_some(Self(bytes))
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Only ever constructed from ASCII alphanumerics.
        core::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl fmt::Debug for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("GroupId").field(&self.as_str()).finish()
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Direction of a movement gesture, resolved once per session.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Negative y beyond the dead zone.
    Up,
    /// Positive x beyond the dead zone.
    Right,
    /// Positive y beyond the dead zone.
    Down,
    /// Negative x beyond the dead zone.
    Left,
}

impl Direction {
    /// Lowercase name: `"up"`, `"right"`, `"down"` or `"left"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Right => "right",
            Self::Down => "down",
            Self::Left => "left",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A resolved gesture type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GestureType {
    /// Mouse drag with a resolved direction.
    MouseMove,
    /// Single-finger drag with a resolved direction.
    TouchMove,
    /// Two or more contacts, tracked by their centroid.
    Pinch,
    /// Mouse press and release without leaving the dead zone.
    Click,
    /// Touch and release without leaving the dead zone.
    Tap,
    /// A click following a click on the same group within the double-tap window.
    DoubleClick,
    /// A tap following a tap on the same group within the double-tap window.
    DoubleTap,
}

impl GestureType {
    /// Name used in the listener table, e.g. `"doubletap"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MouseMove => "mousemove",
            Self::TouchMove => "touchmove",
            Self::Pinch => "pinch",
            Self::Click => "click",
            Self::Tap => "tap",
            Self::DoubleClick => "doubleclick",
            Self::DoubleTap => "doubletap",
        }
    }

    /// The movement type for an input kind.
    #[must_use]
    pub const fn movement(kind: InputKind) -> Self {
        match kind {
            InputKind::Mouse => Self::MouseMove,
            InputKind::Touch => Self::TouchMove,
        }
    }

    /// The single tap/click type for an input kind.
    #[must_use]
    pub const fn single(kind: InputKind) -> Self {
        match kind {
            InputKind::Mouse => Self::Click,
            InputKind::Touch => Self::Tap,
        }
    }

    /// The double tap/click type for an input kind.
    #[must_use]
    pub const fn double(kind: InputKind) -> Self {
        match kind {
            InputKind::Mouse => Self::DoubleClick,
            InputKind::Touch => Self::DoubleTap,
        }
    }

    /// Returns `true` for tap, click and their double variants.
    #[must_use]
    pub const fn is_discrete(self) -> bool {
        matches!(
            self,
            Self::Click | Self::Tap | Self::DoubleClick | Self::DoubleTap
        )
    }

    /// Listener keys notified for this type, in firing order.
    ///
    /// `All` comes first, then the type's own key, then every alias key that
    /// subsumes it (a double tap is also a `double`, a `tap` and a `single`).
    #[must_use]
    pub const fn listener_kinds(self) -> &'static [ListenerKind] {
        use ListenerKind as L;
        match self {
            Self::MouseMove => &[L::All, L::MouseMove, L::Move],
            Self::TouchMove => &[L::All, L::TouchMove, L::Move],
            Self::Pinch => &[L::All, L::Pinch],
            Self::Click => &[L::All, L::Click, L::Single],
            Self::Tap => &[L::All, L::Tap, L::Single],
            Self::DoubleClick => &[L::All, L::DoubleClick, L::Double, L::Click, L::Single],
            Self::DoubleTap => &[L::All, L::DoubleTap, L::Double, L::Tap, L::Single],
        }
    }
}

impl fmt::Display for GestureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Key under which a listener is registered on a group.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    /// Every gesture.
    All,
    /// Mouse or touch movement.
    Move,
    /// Mouse movement only.
    MouseMove,
    /// Touch movement only.
    TouchMove,
    /// Pinch.
    Pinch,
    /// Any single or double tap/click.
    Single,
    /// Clicks, including double clicks.
    Click,
    /// Taps, including double taps.
    Tap,
    /// Double clicks and double taps.
    Double,
    /// Double clicks only.
    DoubleClick,
    /// Double taps only.
    DoubleTap,
}

impl ListenerKind {
    /// Number of listener keys.
    pub const COUNT: usize = 11;

    /// Every listener key, in declaration order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::All,
        Self::Move,
        Self::MouseMove,
        Self::TouchMove,
        Self::Pinch,
        Self::Single,
        Self::Click,
        Self::Tap,
        Self::Double,
        Self::DoubleClick,
        Self::DoubleTap,
    ];

    /// Dense index in `0..COUNT`.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lowercase key name, e.g. `"doubleclick"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Move => "move",
            Self::MouseMove => "mousemove",
            Self::TouchMove => "touchmove",
            Self::Pinch => "pinch",
            Self::Single => "single",
            Self::Click => "click",
            Self::Tap => "tap",
            Self::Double => "double",
            Self::DoubleClick => "doubleclick",
            Self::DoubleTap => "doubletap",
        }
    }
}

impl fmt::Display for ListenerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Error returned when parsing an unknown listener key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownListenerKind(pub String);

impl fmt::Display for UnknownListenerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown gesture type `{}`", self.0)
    }
}

impl core::error::Error for UnknownListenerKind {}

impl FromStr for ListenerKind {
    type Err = UnknownListenerKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownListenerKind(s.into()))
    }
}

/// Shared stop-request state between a live session and the events it emitted.
#[derive(Debug, Default)]
pub(crate) struct StopSignal {
    armed: Cell<bool>,
    requested: Cell<bool>,
}

impl StopSignal {
    pub(crate) fn armed() -> Rc<Self> {
        Rc::new(Self {
            armed: Cell::new(true),
            requested: Cell::new(false),
        })
    }

    /// Make the capability inert; returns whether a request was pending.
    pub(crate) fn disarm(&self) -> bool {
        self.armed.set(false);
        self.requested.replace(false)
    }

    pub(crate) fn take_request(&self) -> bool {
        self.armed.get() && self.requested.replace(false)
    }

    fn request(&self) -> bool {
        if self.armed.get() {
            self.requested.set(true);
            true
        } else {
            false
        }
    }
}

/// Snapshot of a gesture handed to listeners.
///
/// Movement fields are present for move and pinch types; the start/end flags are
/// absent for taps and clicks. Mouse buttons are present for mouse input only.
#[derive(Clone, Debug)]
pub struct GestureEvent {
    pub(crate) group_id: GroupId,
    pub(crate) gesture_type: GestureType,
    pub(crate) input_kind: InputKind,
    pub(crate) direction: Option<Direction>,
    pub(crate) displacement: Option<Vec2>,
    pub(crate) speed: Option<Speed>,
    pub(crate) position: Option<Point>,
    pub(crate) mouse_buttons: Option<MouseButtons>,
    pub(crate) start_of_movement: Option<bool>,
    pub(crate) end_of_movement: Option<bool>,
    pub(crate) stop: Rc<StopSignal>,
}

impl GestureEvent {
    /// Group of the node the session started on.
    #[must_use]
    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    /// Resolved gesture type.
    #[must_use]
    pub fn gesture_type(&self) -> GestureType {
        self.gesture_type
    }

    /// Mouse or touch.
    #[must_use]
    pub fn input_kind(&self) -> InputKind {
        self.input_kind
    }

    /// Sticky direction of the session, if one has been resolved.
    #[must_use]
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Displacement from the session origin (pinches use the centroid).
    #[must_use]
    pub fn displacement(&self) -> Option<Vec2> {
        self.displacement
    }

    /// Latest speed estimate.
    #[must_use]
    pub fn speed(&self) -> Option<Speed> {
        self.speed
    }

    /// Current pointer position, or the contact centroid for pinches.
    #[must_use]
    pub fn position(&self) -> Option<Point> {
        self.position
    }

    /// Buttons held during this tick (mouse input only).
    #[must_use]
    pub fn mouse_buttons(&self) -> Option<MouseButtons> {
        self.mouse_buttons
    }

    /// Whether this is the first dispatch of the session.
    #[must_use]
    pub fn start_of_movement(&self) -> Option<bool> {
        self.start_of_movement
    }

    /// Whether this dispatch comes from the release.
    #[must_use]
    pub fn end_of_movement(&self) -> Option<bool> {
        self.end_of_movement
    }

    /// Ask the engine to end the current session as if the pointer was released.
    ///
    /// Returns `false` and does nothing once the release has started processing.
    pub fn stop_movement(&self) -> bool {
        self.stop.request()
    }
}
