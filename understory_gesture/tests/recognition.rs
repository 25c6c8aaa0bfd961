// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for gesture recognition through `GestureEngine::handle`.
//!
//! These drive whole sessions from raw input and check what listeners observe:
//! classification, sticky direction, double detection and stop requests.

use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::HashMap;
use kurbo::{Point, Vec2};
use smallvec::smallvec;
use understory_gesture::{
    Direction, DispatchPolicy, EngineConfig, GestureEngine, GestureEvent, GestureType, GroupId,
    GroupOptions, InputKind, InputPhase, ListenerKind, MouseButtons, MouseInput, Progress,
    TouchInput, TouchPoint, TouchPoints,
};

const N: u32 = 7;

type Log = Rc<RefCell<Vec<GestureEvent>>>;

fn engine_with(config: EngineConfig) -> (GestureEngine<u32>, GroupId) {
    let mut tree: HashMap<u32, Vec<u32>> = HashMap::new();
    tree.insert(N, vec![]);
    let mut engine = GestureEngine::with_config(config.with_seed(0xfeed));
    let id = engine
        .create_group(&tree, N, GroupOptions::default().shallow())
        .unwrap();
    (engine, id)
}

fn listen(engine: &mut GestureEngine<u32>, id: GroupId, kind: ListenerKind) -> Log {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    engine
        .add_listener(id, kind, move |_, ev| sink.borrow_mut().push(ev.clone()))
        .unwrap();
    log
}

fn mouse(phase: InputPhase, x: f64, y: f64, t: f64) -> MouseInput<u32> {
    let buttons = match phase {
        InputPhase::Up => MouseButtons::empty(),
        _ => MouseButtons::PRIMARY,
    };
    MouseInput::new(phase, N, Point::new(x, y), buttons, t)
}

fn touch(
    phase: InputPhase,
    touches: TouchPoints,
    changed: TouchPoints,
    t: f64,
) -> TouchInput<u32> {
    TouchInput {
        phase,
        target: N,
        touches,
        changed_touches: changed,
        timestamp: t,
    }
}

fn types(log: &Log) -> Vec<GestureType> {
    log.borrow()
        .iter()
        .map(GestureEvent::gesture_type)
        .collect()
}

fn continuous() -> EngineConfig {
    EngineConfig {
        dispatch: DispatchPolicy::Continuous,
        ..EngineConfig::default()
    }
}

#[test]
fn drag_up_then_click_then_double_click() {
    let (mut engine, id) = engine_with(EngineConfig::default());
    let moves = listen(&mut engine, id, ListenerKind::Move);
    let all = listen(&mut engine, id, ListenerKind::All);

    engine.handle(mouse(InputPhase::Down, 100.0, 100.0, 0.0));
    engine.handle(mouse(InputPhase::Move, 100.0, 80.0, 16.0));
    engine.handle(mouse(InputPhase::Up, 100.0, 80.0, 40.0));

    {
        let moves = moves.borrow();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].gesture_type(), GestureType::MouseMove);
        assert_eq!(moves[0].direction(), Some(Direction::Up));
        assert_eq!(moves[0].start_of_movement(), Some(true));
        assert_eq!(moves[0].displacement(), Some(Vec2::new(0.0, -20.0)));
        assert_eq!(moves[0].position(), Some(Point::new(100.0, 80.0)));
    }

    // A move does not arm double detection; the next pair is a click, the one
    // after it a double click.
    engine.handle(mouse(InputPhase::Down, 100.0, 80.0, 100.0));
    engine.handle(mouse(InputPhase::Up, 100.0, 80.0, 150.0));
    engine.handle(mouse(InputPhase::Down, 100.0, 80.0, 250.0));
    engine.handle(mouse(InputPhase::Up, 100.0, 80.0, 300.0));

    assert_eq!(
        types(&all),
        vec![
            GestureType::MouseMove,
            GestureType::Click,
            GestureType::DoubleClick,
        ]
    );
    assert_eq!(moves.borrow().len(), 1);
}

#[test]
fn direction_is_decided_once_per_session() {
    let (mut engine, id) = engine_with(continuous());
    let log = listen(&mut engine, id, ListenerKind::MouseMove);

    engine.handle(mouse(InputPhase::Down, 0.0, 0.0, 0.0));
    engine.handle(mouse(InputPhase::Move, 10.0, 0.0, 10.0));
    engine.handle(mouse(InputPhase::Move, 10.0, 200.0, 20.0));
    engine.handle(mouse(InputPhase::Move, -300.0, 0.0, 30.0));
    engine.handle(mouse(InputPhase::Up, -300.0, 0.0, 40.0));

    let log = log.borrow();
    assert_eq!(log.len(), 4);
    let right = Some(Direction::Right);
    assert!(log.iter().all(|ev| ev.direction() == right));
    assert_eq!(log[3].displacement(), Some(Vec2::new(-300.0, 0.0)));
}

#[test]
fn deadzone_edge_does_not_resolve() {
    let (mut engine, id) = engine_with(EngineConfig::default());
    let log = listen(&mut engine, id, ListenerKind::All);
    engine.handle(mouse(InputPhase::Down, 0.0, 0.0, 0.0));
    engine.handle(mouse(InputPhase::Move, 5.0, -5.0, 10.0));
    engine.handle(mouse(InputPhase::Up, 5.0, 5.0, 20.0));
    assert_eq!(types(&log), vec![GestureType::Click]);
}

#[test]
fn custom_deadzone_is_honored() {
    let (mut engine, id) = engine_with(EngineConfig::default().with_deadzone(30.0));
    let log = listen(&mut engine, id, ListenerKind::All);
    engine.handle(mouse(InputPhase::Down, 0.0, 0.0, 0.0));
    engine.handle(mouse(InputPhase::Move, 0.0, 20.0, 10.0));
    assert!(log.borrow().is_empty());
    engine.handle(mouse(InputPhase::Move, 0.0, 31.0, 20.0));
    engine.handle(mouse(InputPhase::Up, 0.0, 31.0, 30.0));
    assert_eq!(log.borrow()[0].direction(), Some(Direction::Down));
}

#[test]
fn double_window_is_configurable() {
    let (mut engine, id) = engine_with(EngineConfig::default().with_double_tap_window_ms(100.0));
    let log = listen(&mut engine, id, ListenerKind::All);
    engine.handle(mouse(InputPhase::Down, 0.0, 0.0, 0.0));
    engine.handle(mouse(InputPhase::Up, 0.0, 0.0, 10.0));
    engine.handle(mouse(InputPhase::Down, 0.0, 0.0, 100.0));
    engine.handle(mouse(InputPhase::Up, 0.0, 0.0, 150.0));
    assert_eq!(types(&log), vec![GestureType::Click, GestureType::Click]);
}

#[test]
fn speed_is_reported_in_pixels_per_ms() {
    let (mut engine, id) = engine_with(EngineConfig::default());
    let log = listen(&mut engine, id, ListenerKind::All);
    engine.handle(mouse(InputPhase::Down, 0.0, 0.0, 0.0));
    engine.handle(mouse(InputPhase::Move, 30.0, 40.0, 10.0));
    let speed = log.borrow()[0].speed().unwrap();
    assert_eq!(speed.x, 3.0);
    assert_eq!(speed.y, 4.0);
    assert_eq!(speed.magnitude, 5.0);
}

#[test]
fn identical_timestamps_never_panic() {
    let (mut engine, id) = engine_with(continuous());
    let log = listen(&mut engine, id, ListenerKind::All);
    // A move before any press is ignored.
    engine.handle(mouse(InputPhase::Move, 0.0, 0.0, 0.0));
    engine.handle(mouse(InputPhase::Down, 0.0, 0.0, 0.0));
    for y in [10.0, 20.0, 30.0] {
        engine.handle(mouse(InputPhase::Move, 0.0, y, 0.0));
    }
    engine.handle(mouse(InputPhase::Up, 0.0, 30.0, 0.0));
    let log = log.borrow();
    assert_eq!(log.len(), 4);
    assert!(log.iter().all(|ev| ev.speed().is_none()));
}

#[test]
fn tap_key_aliases() {
    let (mut engine, id) = engine_with(EngineConfig::default());
    let single = listen(&mut engine, id, ListenerKind::Single);
    let tap = listen(&mut engine, id, ListenerKind::Tap);
    let double = listen(&mut engine, id, ListenerKind::Double);
    let click = listen(&mut engine, id, ListenerKind::Click);

    let p = TouchPoint::new(3, 1.0, 1.0);
    for t0 in [0.0, 120.0] {
        engine.handle(touch(InputPhase::Down, smallvec![p], smallvec![p], t0));
        engine.handle(touch(InputPhase::Up, smallvec![], smallvec![p], t0 + 30.0));
    }

    let both = vec![GestureType::Tap, GestureType::DoubleTap];
    assert_eq!(types(&single), both);
    assert_eq!(types(&tap), both);
    assert_eq!(types(&double), vec![GestureType::DoubleTap]);
    assert!(click.borrow().is_empty());
}

#[test]
fn tap_after_click_is_not_double() {
    let (mut engine, id) = engine_with(EngineConfig::default());
    let log = listen(&mut engine, id, ListenerKind::All);
    engine.handle(mouse(InputPhase::Down, 1.0, 1.0, 0.0));
    engine.handle(mouse(InputPhase::Up, 1.0, 1.0, 20.0));
    let p = TouchPoint::new(1, 1.0, 1.0);
    engine.handle(touch(InputPhase::Down, smallvec![p], smallvec![p], 60.0));
    engine.handle(touch(InputPhase::Up, smallvec![], smallvec![p], 90.0));
    assert_eq!(types(&log), vec![GestureType::Click, GestureType::Tap]);
}

#[test]
fn pinch_tracks_centroid_including_lifted_finger() {
    let (mut engine, id) = engine_with(EngineConfig::default());
    let log = listen(&mut engine, id, ListenerKind::Pinch);
    let a = TouchPoint::new(1, 0.0, 0.0);
    let b = TouchPoint::new(2, 10.0, 10.0);

    engine.handle(touch(InputPhase::Down, smallvec![a], smallvec![a], 0.0));
    engine.handle(touch(InputPhase::Down, smallvec![a, b], smallvec![b], 5.0));
    assert_eq!(log.borrow().len(), 1);
    assert_eq!(log.borrow()[0].position(), Some(Point::new(5.0, 5.0)));
    assert_eq!(log.borrow()[0].input_kind(), InputKind::Touch);

    // One finger up: still pending under the default policy, nothing new dispatched.
    assert_eq!(
        engine.end(touch(InputPhase::Up, smallvec![a], smallvec![b], 20.0)),
        Some(Progress::Pending)
    );
    assert!(engine.is_active());
    assert_eq!(
        engine.session().map(|s| s.gesture_type()),
        Some(Some(GestureType::Pinch))
    );

    assert_eq!(
        engine.end(touch(InputPhase::Up, smallvec![], smallvec![a], 30.0)),
        Some(Progress::Finished)
    );
    engine.run_pending();
    assert!(!engine.is_active());
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn touch_start_with_two_contacts_is_ignored() {
    let (mut engine, _) = engine_with(EngineConfig::default());
    let a = TouchPoint::new(1, 0.0, 0.0);
    let b = TouchPoint::new(2, 10.0, 10.0);
    let down = touch(InputPhase::Down, smallvec![a, b], smallvec![a, b], 0.0);
    assert!(!engine.start(down));
    assert!(!engine.is_active());
}

#[test]
fn synthetic_mouse_after_touch_is_ignored() {
    let (mut engine, id) = engine_with(EngineConfig::default());
    let log = listen(&mut engine, id, ListenerKind::All);
    let p = TouchPoint::new(1, 2.0, 2.0);
    engine.handle(touch(InputPhase::Down, smallvec![p], smallvec![p], 0.0));
    engine.handle(touch(InputPhase::Up, smallvec![], smallvec![p], 30.0));

    let mut down = mouse(InputPhase::Down, 2.0, 2.0, 31.0);
    down.synthetic = true;
    let mut up = mouse(InputPhase::Up, 2.0, 2.0, 31.0);
    up.synthetic = true;
    engine.handle(down);
    engine.handle(up);

    assert_eq!(types(&log), vec![GestureType::Tap]);
}

#[test]
fn stop_movement_finalizes_and_goes_inert() {
    let (mut engine, id) = engine_with(EngineConfig::default());
    let kept: Rc<RefCell<Option<GestureEvent>>> = Rc::new(RefCell::new(None));
    let sink = kept.clone();
    engine
        .add_listener(id, ListenerKind::MouseMove, move |_, ev| {
            assert!(ev.stop_movement());
            *sink.borrow_mut() = Some(ev.clone());
        })
        .unwrap();

    engine.handle(mouse(InputPhase::Down, 0.0, 0.0, 0.0));
    engine.handle(mouse(InputPhase::Move, 40.0, 0.0, 10.0));
    assert!(!engine.is_active());

    let ev = kept.borrow_mut().take().unwrap();
    assert!(!ev.stop_movement());

    // Later input for the stopped interaction starts nothing.
    engine.handle(mouse(InputPhase::Move, 80.0, 0.0, 20.0));
    engine.handle(mouse(InputPhase::Up, 80.0, 0.0, 30.0));
    assert!(!engine.is_active());
    let last = engine.last_finalized().unwrap();
    assert_eq!(last.gesture_type, Some(GestureType::MouseMove));
    assert_eq!(last.released_at, 10.0);
}

#[test]
fn panicking_listener_does_not_block_siblings() {
    let (mut engine, id) = engine_with(EngineConfig::default());
    let before = listen(&mut engine, id, ListenerKind::All);
    engine
        .add_listener(id, ListenerKind::All, |_, _| panic!("broken listener"))
        .unwrap();
    let after = listen(&mut engine, id, ListenerKind::Click);

    engine.start(mouse(InputPhase::Down, 0.0, 0.0, 0.0));
    engine.end(mouse(InputPhase::Up, 0.0, 0.0, 10.0));
    assert_eq!(engine.run_pending(), 1);

    assert_eq!(types(&before), vec![GestureType::Click]);
    assert_eq!(types(&after), vec![GestureType::Click]);
    assert!(!engine.is_active());
}

#[test]
fn listeners_receive_the_raw_input() {
    let (mut engine, id) = engine_with(EngineConfig::default());
    let phases = Rc::new(RefCell::new(Vec::new()));
    let sink = phases.clone();
    engine
        .add_listener(id, ListenerKind::All, move |input, _| {
            sink.borrow_mut().push((input.phase(), input.timestamp()));
        })
        .unwrap();
    engine.handle(mouse(InputPhase::Down, 0.0, 0.0, 0.0));
    engine.handle(mouse(InputPhase::Up, 0.0, 0.0, 12.0));
    assert_eq!(*phases.borrow(), vec![(InputPhase::Up, 12.0)]);
}
