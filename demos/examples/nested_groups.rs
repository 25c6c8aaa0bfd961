// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nested gesture groups.
//!
//! A page body and a main column inside it each get a group. The main column's
//! group bubbles to the body's, so every gesture on the column is reported twice.
//!
//! Run:
//! - `cargo run -p understory_gesture_demos --example nested_groups`

use hashbrown::HashMap;
use kurbo::Point;
use smallvec::smallvec;
use understory_gesture::{
    GestureEngine, Group, GroupOptions, InputPhase, MouseButtons, MouseInput, TouchInput,
    TouchPoint,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
enum Node {
    Body,
    SideMenu,
    Main,
    Article,
}

fn main() {
    let mut tree: HashMap<Node, Vec<Node>> = HashMap::new();
    tree.insert(Node::Body, vec![Node::SideMenu, Node::Main]);
    tree.insert(Node::SideMenu, vec![]);
    tree.insert(Node::Main, vec![Node::Article]);
    tree.insert(Node::Article, vec![]);

    let mut engine = GestureEngine::new();

    // The body covers the whole page, then the main column is taken over by its own group.
    let options = GroupOptions::default();
    let body = Group::new(&mut engine, &tree, Node::Body, options).expect("body group");
    let options = options.overwrite().with_parent(body.id());
    let main_column = Group::new(&mut engine, &tree, Node::Main, options).expect("main group");

    body.add_gesture_listener_named(&mut engine, "all", |_, ev| {
        println!("{:<12} BODY", ev.gesture_type());
    })
    .expect("known key");
    main_column
        .add_gesture_listener_named(&mut engine, "all", |_, ev| {
            let direction = ev.direction().map_or("-", |d| d.as_str());
            println!("{:<12} MAIN  direction={direction}", ev.gesture_type());
        })
        .expect("known key");

    let mouse = |phase, node, x, y, t| {
        MouseInput::new(phase, node, Point::new(x, y), MouseButtons::PRIMARY, t)
    };

    println!("-- drag upward on the article");
    engine.handle(mouse(InputPhase::Down, Node::Article, 100.0, 100.0, 0.0));
    engine.handle(mouse(InputPhase::Move, Node::Article, 100.0, 80.0, 16.0));
    engine.handle(mouse(InputPhase::Up, Node::Article, 100.0, 80.0, 32.0));

    println!("-- two quick clicks on the side menu");
    for t in [100.0, 250.0] {
        engine.handle(mouse(InputPhase::Down, Node::SideMenu, 10.0, 10.0, t));
        engine.handle(mouse(InputPhase::Up, Node::SideMenu, 10.0, 10.0, t + 40.0));
    }

    println!("-- pinch on the main column");
    let a = TouchPoint::new(1, 50.0, 50.0);
    let b = TouchPoint::new(2, 90.0, 90.0);
    let touch = |phase, touches, changed_touches, timestamp| TouchInput {
        phase,
        target: Node::Main,
        touches,
        changed_touches,
        timestamp,
    };
    engine.handle(touch(InputPhase::Down, smallvec![a], smallvec![a], 500.0));
    let both = smallvec![a, b];
    engine.handle(touch(InputPhase::Down, both, smallvec![b], 510.0));
    engine.handle(touch(InputPhase::Up, smallvec![a], smallvec![b], 600.0));
    engine.handle(touch(InputPhase::Up, smallvec![], smallvec![a], 610.0));

    println!("groups registered: {}", engine.group_count());
}
