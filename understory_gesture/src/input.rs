// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw pointer input fed into the engine by the host.
//!
//! The host translates its platform events (DOM, winit, Android...) into
//! [`PointerInput`] values. Touch start/move/end map onto [`InputPhase::Down`],
//! [`InputPhase::Move`] and [`InputPhase::Up`].
//!
//! Timestamps are in milliseconds on any monotonic clock; only differences matter.

use kurbo::Point;
use smallvec::SmallVec;

/// Kind of device a session is driven by.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InputKind {
    /// Mouse or pen reported as mouse.
    Mouse,
    /// Touch contacts.
    Touch,
}

impl InputKind {
    /// `"mouse"` or `"touch"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mouse => "mouse",
            Self::Touch => "touch",
        }
    }
}

impl core::fmt::Display for InputKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Phase of a raw input event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InputPhase {
    /// Mouse down or touch start.
    Down,
    /// Mouse move or touch move.
    Move,
    /// Mouse up or touch end.
    Up,
}

bitflags::bitflags! {
    /// Mouse buttons held during an event, in the DOM `buttons` bit layout.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MouseButtons: u8 {
        /// Usually the left button.
        const PRIMARY   = 0b0000_0001;
        /// Usually the right button.
        const SECONDARY = 0b0000_0010;
        /// Usually the wheel button.
        const AUXILIARY = 0b0000_0100;
        /// Usually "browser back".
        const FOURTH    = 0b0000_1000;
        /// Usually "browser forward".
        const FIFTH     = 0b0001_0000;
    }
}

impl MouseButtons {
    /// Primary button held.
    #[must_use]
    pub const fn primary(self) -> bool {
        self.contains(Self::PRIMARY)
    }

    /// Secondary button held.
    #[must_use]
    pub const fn secondary(self) -> bool {
        self.contains(Self::SECONDARY)
    }

    /// Auxiliary button held.
    #[must_use]
    pub const fn auxiliary(self) -> bool {
        self.contains(Self::AUXILIARY)
    }

    /// Fourth button held.
    #[must_use]
    pub const fn fourth(self) -> bool {
        self.contains(Self::FOURTH)
    }

    /// Fifth button held.
    #[must_use]
    pub const fn fifth(self) -> bool {
        self.contains(Self::FIFTH)
    }
}

/// A mouse event.
#[derive(Clone, Debug, PartialEq)]
pub struct MouseInput<K> {
    /// Down, move or up.
    pub phase: InputPhase,
    /// Node the event was delivered to.
    pub target: K,
    /// Pointer position.
    pub position: Point,
    /// Buttons held after this event.
    pub buttons: MouseButtons,
    /// Event time in milliseconds.
    pub timestamp: f64,
    /// Compatibility event a platform emits after a touch; never starts a session.
    pub synthetic: bool,
}

impl<K> MouseInput<K> {
    /// A non-synthetic mouse event.
    pub fn new(
        phase: InputPhase,
        target: K,
        position: Point,
        buttons: MouseButtons,
        timestamp: f64,
    ) -> Self {
        Self {
            phase,
            target,
            position,
            buttons,
            timestamp,
            synthetic: false,
        }
    }
}

/// One touch contact.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TouchPoint {
    /// Platform contact identifier, stable while the finger is down.
    pub id: u64,
    /// Contact position.
    pub position: Point,
}

impl TouchPoint {
    /// Convenience constructor.
    pub fn new(id: u64, x: f64, y: f64) -> Self {
        Self {
            id,
            position: Point::new(x, y),
        }
    }
}

/// Inline storage for contact lists; two fingers cover every supported gesture.
pub type TouchPoints = SmallVec<[TouchPoint; 2]>;

/// A touch event.
#[derive(Clone, Debug, PartialEq)]
pub struct TouchInput<K> {
    /// Start, move or end.
    pub phase: InputPhase,
    /// Node the event was delivered to.
    pub target: K,
    /// Contacts still down after this event.
    pub touches: TouchPoints,
    /// Contacts that changed in this event, including lifted ones.
    pub changed_touches: TouchPoints,
    /// Event time in milliseconds.
    pub timestamp: f64,
}

impl<K> TouchInput<K> {
    /// Contacts from `touches` and `changed_touches`, merged by id.
    ///
    /// A finger lifted in this event only appears in `changed_touches`; merging keeps
    /// its final position. When both lists carry an id, the `touches` entry wins.
    pub fn merged_contacts(&self) -> TouchPoints {
        let mut merged = self.touches.clone();
        for changed in &self.changed_touches {
            if !merged.iter().any(|t| t.id == changed.id) {
                merged.push(*changed);
            }
        }
        merged
    }

    /// Look up a contact by id, preferring `touches` over `changed_touches`.
    pub fn contact(&self, id: u64) -> Option<TouchPoint> {
        self.touches
            .iter()
            .chain(&self.changed_touches)
            .find(|t| t.id == id)
            .copied()
    }
}

/// A raw input event of either kind.
#[derive(Clone, Debug, PartialEq)]
pub enum PointerInput<K> {
    /// Mouse event.
    Mouse(MouseInput<K>),
    /// Touch event.
    Touch(TouchInput<K>),
}

impl<K> PointerInput<K> {
    /// Device kind.
    pub fn kind(&self) -> InputKind {
        match self {
            Self::Mouse(_) => InputKind::Mouse,
            Self::Touch(_) => InputKind::Touch,
        }
    }

    /// Event phase.
    pub fn phase(&self) -> InputPhase {
        match self {
            Self::Mouse(m) => m.phase,
            Self::Touch(t) => t.phase,
        }
    }

    /// Node the event was delivered to.
    pub fn target(&self) -> &K {
        match self {
            Self::Mouse(m) => &m.target,
            Self::Touch(t) => &t.target,
        }
    }

    /// Event time in milliseconds.
    pub fn timestamp(&self) -> f64 {
        match self {
            Self::Mouse(m) => m.timestamp,
            Self::Touch(t) => t.timestamp,
        }
    }
}

impl<K> From<MouseInput<K>> for PointerInput<K> {
    fn from(m: MouseInput<K>) -> Self {
        Self::Mouse(m)
    }
}

impl<K> From<TouchInput<K>> for PointerInput<K> {
    fn from(t: TouchInput<K>) -> Self {
        Self::Touch(t)
    }
}
