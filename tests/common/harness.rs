//! Test harness around the sample dialogue scene.
//!
//! Builds the four-node scene the editor ships with and offers helpers for
//! simulating pointer gestures and connection drags.

#![allow(dead_code)]

use super::{CallbackTracker, DropScript, ScriptedDragHost};
use slint_dialogue_editor::{
    ConnectionId, DialogueEditor, DialogueGraph, EditorConfig, Modifiers, NodeId, Point,
    PointerButton,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Positions of the sample text nodes.
pub const SAMPLE_POSITIONS: [(f32, f32); 4] = [(50.0, 60.0), (300.0, 60.0), (500.0, 60.0), (300.0, 200.0)];

/// Sample wiring as (source index, target index), always through slot 0.
pub const SAMPLE_WIRING: [(usize, usize); 3] = [(0, 1), (1, 2), (3, 2)];

/// Editor plus scripted drag host and callback tracking.
pub struct SampleHarness {
    pub editor: DialogueEditor,
    /// Sample nodes in creation order
    pub nodes: Vec<NodeId>,
    pub tracker: CallbackTracker,
    script: Rc<RefCell<VecDeque<DropScript>>>,
}

impl SampleHarness {
    /// The sample scene: four text nodes wired 0→1, 1→2 and 3→2.
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        let mut graph = DialogueGraph::new(config);
        let nodes: Vec<NodeId> = SAMPLE_POSITIONS
            .iter()
            .enumerate()
            .map(|(i, (x, y))| graph.add_text_node(Point::new(*x, *y), format!("Line {}", i + 1)))
            .collect();
        for (from, to) in SAMPLE_WIRING {
            graph
                .set_destination(ConnectionId::new(nodes[from], 0), Some(nodes[to]))
                .unwrap();
        }
        Self::from_graph(graph, nodes)
    }

    /// No nodes at all.
    pub fn empty() -> Self {
        Self::from_graph(DialogueGraph::default(), Vec::new())
    }

    fn from_graph(graph: DialogueGraph, nodes: Vec<NodeId>) -> Self {
        let tracker = CallbackTracker::new();
        let script = Rc::new(RefCell::new(VecDeque::new()));

        let mut editor = DialogueEditor::from_graph(graph);
        editor.set_drag_host(ScriptedDragHost {
            script: script.clone(),
            tracker: tracker.clone(),
        });
        editor.on_scene_changed({
            let count = tracker.scene_changed.clone();
            move || *count.borrow_mut() += 1
        });
        editor.take_repaint_requests();

        Self {
            editor,
            nodes,
            tracker,
            script,
        }
    }

    /// The `i`-th sample node.
    pub fn node(&self, i: usize) -> NodeId {
        self.nodes[i]
    }

    // === Scene coordinates inside a node ===

    pub fn position(&self, id: NodeId) -> Point {
        self.editor.graph().node(id).unwrap().position()
    }

    pub fn handle_point(&self, id: NodeId) -> Point {
        self.position(id) + Point::new(5.0, 10.0)
    }

    pub fn body_point(&self, id: NodeId) -> Point {
        self.position(id) + Point::new(60.0, 25.0)
    }

    pub fn slot_point(&self, id: NodeId, slot: usize) -> Point {
        let cfg = self.editor.config();
        let y = cfg.body_height + cfg.slot_height * (slot as f32 + 0.5);
        self.position(id) + Point::new(60.0, y)
    }

    // === Pointer simulation ===

    pub fn press(&mut self, at: Point, shift: bool) -> bool {
        self.editor
            .on_pointer_down(at, PointerButton::Left, Modifiers { shift })
            .unwrap()
    }

    pub fn move_to(&mut self, at: Point) {
        self.editor.on_pointer_move(at);
    }

    pub fn release(&mut self, at: Point) -> bool {
        self.editor.on_pointer_up(at, PointerButton::Left).unwrap()
    }

    /// Press on the node's body, drag by `delta` in a few steps and release.
    pub fn drag_node(&mut self, id: NodeId, delta: Point, shift: bool) {
        let start = self.body_point(id);
        self.press(start, shift);
        for step in 1..=4 {
            let t = step as f32 / 4.0;
            self.move_to(start + Point::new(delta.x * t, delta.y * t));
        }
        self.release(start + delta);
    }

    /// Plain click on the node's body.
    pub fn click(&mut self, id: NodeId, shift: bool) {
        let at = self.body_point(id);
        self.press(at, shift);
        self.release(at);
    }

    /// Drag a cable out of `slot` and let the user do `script`.
    pub fn drag_connection(&mut self, id: NodeId, slot: usize, script: DropScript) -> bool {
        self.script.borrow_mut().push_back(script);
        let at = self.slot_point(id, slot);
        let consumed = self.press(at, false);
        self.release(at);
        consumed
    }

    // === Inspection ===

    pub fn destination(&self, id: NodeId, slot: usize) -> Option<NodeId> {
        self.editor.graph().node(id).unwrap().destination(slot)
    }

    pub fn scene_changed_count(&self) -> usize {
        *self.tracker.scene_changed.borrow()
    }

    pub fn history_len(&self) -> usize {
        self.editor.history().len()
    }

    pub fn assert_consistent(&self) {
        if let Err(err) = self.editor.graph().check_consistency() {
            panic!("graph is inconsistent: {err}");
        }
    }
}
