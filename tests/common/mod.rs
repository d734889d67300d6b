//! Common test utilities for integration tests.

#![allow(dead_code)]

pub mod harness;

use slint_dialogue_editor::{ConnectionDrag, ConnectionDragHost, ConnectionId, DialogueGraph, NodeId};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Tracks editor notifications and drag sessions for testing.
#[derive(Default, Clone)]
pub struct CallbackTracker {
    /// Count of scene_changed notifications
    pub scene_changed: Rc<RefCell<usize>>,
    /// Slot each connection drag started from
    pub drags_started: Rc<RefCell<Vec<ConnectionId>>>,
    /// (target, accepted) for every drop the host attempted
    pub drops: Rc<RefCell<Vec<(NodeId, bool)>>>,
}

impl CallbackTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all recorded callbacks.
    pub fn clear(&self) {
        *self.scene_changed.borrow_mut() = 0;
        self.drags_started.borrow_mut().clear();
        self.drops.borrow_mut().clear();
    }
}

/// What the simulated user does during the next connection drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropScript {
    /// Release over this node.
    Drop(NodeId),
    /// Release over empty canvas.
    Cancel,
}

/// Drag host that replays a script instead of running a toolkit loop.
///
/// An empty script behaves like a release over empty canvas.
pub struct ScriptedDragHost {
    pub script: Rc<RefCell<VecDeque<DropScript>>>,
    pub tracker: CallbackTracker,
}

impl ConnectionDragHost for ScriptedDragHost {
    fn run_connection_drag(&mut self, graph: &DialogueGraph, session: &mut ConnectionDrag) {
        self.tracker.drags_started.borrow_mut().push(session.connection());
        let step = self.script.borrow_mut().pop_front();
        if let Some(DropScript::Drop(target)) = step {
            // A release only lands on something that is actually in the scene.
            if graph.contains(target) {
                let accepted = session.drop_on(target);
                self.tracker.drops.borrow_mut().push((target, accepted));
            }
        }
    }
}
