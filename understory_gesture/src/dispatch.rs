// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Listener dispatch: post invocations to a queue, then drain them in isolation.
//!
//! The engine finishes its own bookkeeping for an input before any listener runs.
//! Each posted invocation is a separate task:
//!
//! - Tasks run in the order they were posted (registration order within a key).
//! - A panicking listener is caught and logged; later tasks still run.
//! - Listeners only see shared references and cannot corrupt session state.
//!
//! ## Minimal example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use understory_gesture::Listener;
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = seen.clone();
//! let a: Listener<u32> = Listener::new(move |_input, ev| {
//!     sink.borrow_mut().push(ev.gesture_type());
//! });
//! let b = a.clone();
//!
//! // Clones share identity; removal compares by identity.
//! assert!(a.same(&b));
//! # let _ = seen;
//! ```

use alloc::collections::VecDeque;
use alloc::rc::Rc;
use core::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::input::PointerInput;
use crate::types::GestureEvent;

type Callback<K> = dyn Fn(&PointerInput<K>, &GestureEvent);

/// A gesture listener: a shared callback with reference identity.
///
/// Keep a clone of the listener you register if you want to remove it later;
/// removal matches by identity, not by behavior.
pub struct Listener<K> {
    callback: Rc<Callback<K>>,
}

impl<K> Listener<K> {
    /// Wrap a callback.
    pub fn new(callback: impl Fn(&PointerInput<K>, &GestureEvent) + 'static) -> Self {
        Self {
            callback: Rc::new(callback),
        }
    }

    /// Returns `true` if both handles refer to the same callback.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        core::ptr::addr_eq(Rc::as_ptr(&self.callback), Rc::as_ptr(&other.callback))
    }

    /// Invoke the callback directly.
    pub fn call(&self, input: &PointerInput<K>, event: &GestureEvent) {
        (self.callback)(input, event);
    }
}

impl<K> Clone for Listener<K> {
    fn clone(&self) -> Self {
        Self {
            callback: self.callback.clone(),
        }
    }
}

impl<K> fmt::Debug for Listener<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener")
            .field(&Rc::as_ptr(&self.callback).cast::<()>())
            .finish()
    }
}

/// One posted listener invocation.
#[derive(Debug)]
struct Task<K> {
    listener: Listener<K>,
    input: Rc<PointerInput<K>>,
    event: Rc<GestureEvent>,
}

/// FIFO of posted listener invocations.
#[derive(Debug)]
pub(crate) struct TaskQueue<K> {
    tasks: VecDeque<Task<K>>,
}

impl<K> Default for TaskQueue<K> {
    fn default() -> Self {
        Self {
            tasks: VecDeque::new(),
        }
    }
}

impl<K> TaskQueue<K> {
    /// Post one invocation per listener, sharing the input and event snapshot.
    pub(crate) fn post(
        &mut self,
        listeners: impl IntoIterator<Item = Listener<K>>,
        input: &Rc<PointerInput<K>>,
        event: GestureEvent,
    ) {
        let event = Rc::new(event);
        for listener in listeners {
            self.tasks.push_back(Task {
                listener,
                input: input.clone(),
                event: event.clone(),
            });
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Run every pending task; returns the number of tasks that panicked.
    pub(crate) fn drain(&mut self) -> usize {
        let mut failed = 0;
        while let Some(task) = self.tasks.pop_front() {
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                task.listener.call(&task.input, &task.event);
            }));
            if outcome.is_err() {
                failed += 1;
                log::warn!(
                    "gesture listener panicked while handling {} for group {}",
                    task.event.gesture_type(),
                    task.event.group_id()
                );
            }
        }
        failed
    }
}
