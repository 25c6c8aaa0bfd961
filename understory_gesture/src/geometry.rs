// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry and timing helpers: displacement, direction, speed and centroids.
//!
//! These are pure functions over [`kurbo`] types. The recognizer calls them on every
//! tick, but they are public so hosts can reproduce the same classification.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::{Point, Vec2};
//! use understory_gesture::geometry::{direction, displacement, speed};
//! use understory_gesture::Direction;
//!
//! let d = displacement(Point::new(100.0, 80.0), Point::new(100.0, 100.0));
//! assert_eq!(d, Vec2::new(0.0, -20.0));
//! assert_eq!(direction(d, 5.0), Some(Direction::Up));
//!
//! let s = speed(Vec2::new(3.0, 4.0), 1.0).unwrap();
//! assert_eq!(s.magnitude, 5.0);
//!
//! // Equal timestamps never divide.
//! assert!(speed(Vec2::new(3.0, 4.0), 0.0).is_none());
//! ```

use kurbo::{Point, Vec2};

use crate::types::Direction;

/// Per-axis speed in coordinate units per millisecond, plus its Euclidean norm.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Speed {
    /// Horizontal speed.
    pub x: f64,
    /// Vertical speed.
    pub y: f64,
    /// Euclidean norm of `x` and `y`.
    pub magnitude: f64,
}

/// Displacement from `initial` to `current`.
#[must_use]
#[inline]
pub fn displacement(current: Point, initial: Point) -> Vec2 {
    current - initial
}

/// Classify a displacement into one of four directions.
///
/// Half-planes are checked in a fixed order: up, right, down, left. The first one
/// the vector falls into beyond `deadzone` wins. Returns `None` while the vector is
/// still inside the dead zone on every axis.
#[must_use]
pub fn direction(displacement: Vec2, deadzone: f64) -> Option<Direction> {
    if displacement.y < -deadzone {
        Some(Direction::Up)
    } else if displacement.x > deadzone {
        Some(Direction::Right)
    } else if displacement.y > deadzone {
        Some(Direction::Down)
    } else if displacement.x < -deadzone {
        Some(Direction::Left)
    } else {
        None
    }
}

/// Speed of a movement `delta` that took `delta_ms` milliseconds.
///
/// Returns `None` when the elapsed time is zero, negative or not finite, in which
/// case callers keep their previous speed.
#[must_use]
pub fn speed(delta: Vec2, delta_ms: f64) -> Option<Speed> {
    if !(delta_ms.is_finite() && delta_ms > 0.0) {
        return None;
    }
    let x = delta.x / delta_ms;
    let y = delta.y / delta_ms;
    Some(Speed {
        x,
        y,
        magnitude: x.hypot(y),
    })
}

/// Mean position of `points`, or `None` if there are none.
#[must_use]
pub fn centroid(points: impl IntoIterator<Item = Point>) -> Option<Point> {
    let mut sum = Vec2::ZERO;
    let mut count = 0_u32;
    for p in points {
        sum += p.to_vec2();
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some((sum / f64::from(count)).to_point())
    }
}
