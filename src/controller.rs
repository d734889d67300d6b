//! Interaction controller for dialogue editors.
//!
//! The [`DialogueEditor`] owns the graph, the selection and the undo history,
//! and turns raw pointer events into live feedback and, at the end of each
//! gesture, at most one command.
//!
//! # Example
//!
//! ```ignore
//! use slint_dialogue_editor::{DialogueEditor, Modifiers, Point, PointerButton};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! slint::include_modules!();
//!
//! fn main() {
//!     let window = MainWindow::new().unwrap();
//!     let editor = Rc::new(RefCell::new(DialogueEditor::default()));
//!     let w = window.as_weak();
//!
//!     editor.borrow_mut().on_scene_changed(move || {
//!         if let Some(w) = w.upgrade() {
//!             w.invoke_request_scene_rect();
//!         }
//!     });
//!
//!     window.on_pointer_down({
//!         let editor = editor.clone();
//!         move |x, y, shift| {
//!             let pos = Point::new(x, y);
//!             let _ = editor.borrow_mut().on_pointer_down(pos, PointerButton::Left, Modifiers { shift });
//!         }
//!     });
//!
//!     window.on_pointer_move({
//!         let editor = editor.clone();
//!         move |x, y| editor.borrow_mut().on_pointer_move(Point::new(x, y))
//!     });
//!
//!     window.run().unwrap();
//! }
//! ```

use crate::commands::{Command, ConnectCommand, DeleteCommand, MoveCommand, Movement};
use crate::config::EditorConfig;
use crate::drag::{ConnectionDrag, ConnectionDragHost, DropOutcome};
use crate::error::GraphError;
use crate::geometry::{Point, Rect};
use crate::graph::{ConnectionId, DialogueGraph, NodeId};
use crate::hit_test::{find_node_at, node_region, nodes_in_selection_box, NodeRegion};
use crate::history::UndoStack;
use crate::paint::{paint_node, NodePaint};
use crate::selection::SelectionManager;
use tracing::{debug, warn};

/// Mouse buttons as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
    Other,
}

/// Keyboard modifiers held during a pointer press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
}

#[derive(Debug, Clone, Default)]
enum Gesture {
    #[default]
    Idle,
    /// Nodes following the pointer, with their pre-drag positions.
    Moving { anchor: Point, origins: Vec<(NodeId, Point)> },
    RubberBand { origin: Point, current: Point, additive: bool },
}

/// Graph editor core: model, selection, history and gesture state.
pub struct DialogueEditor {
    graph: DialogueGraph,
    selection: SelectionManager,
    history: UndoStack,
    gesture: Gesture,
    drag_host: Option<Box<dyn ConnectionDragHost>>,
    scene_changed: Vec<Box<dyn FnMut()>>,
}

impl Default for DialogueEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl DialogueEditor {
    pub fn new(config: EditorConfig) -> Self {
        Self::from_graph(DialogueGraph::new(config))
    }

    /// Wrap an already built scene. Its construction is not undoable.
    pub fn from_graph(graph: DialogueGraph) -> Self {
        let history = UndoStack::new(graph.config().undo_limit);
        Self {
            graph,
            selection: SelectionManager::new(),
            history,
            gesture: Gesture::Idle,
            drag_host: None,
            scene_changed: Vec::new(),
        }
    }

    /// Install the host that runs connection drags.
    pub fn set_drag_host(&mut self, host: impl ConnectionDragHost + 'static) {
        self.drag_host = Some(Box::new(host));
    }

    /// Register a callback fired whenever a move, connect or delete is finalized
    /// (including undo and redo).
    pub fn on_scene_changed(&mut self, callback: impl FnMut() + 'static) {
        self.scene_changed.push(Box::new(callback));
    }

    pub fn graph(&self) -> &DialogueGraph {
        &self.graph
    }

    pub fn config(&self) -> &EditorConfig {
        self.graph.config()
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    // === Content ===

    pub fn add_entry_node(&mut self, position: Point) -> NodeId {
        self.graph.add_entry_node(position)
    }

    pub fn add_text_node(&mut self, position: Point, text: impl Into<String>) -> NodeId {
        self.graph.add_text_node(position, text)
    }

    pub fn add_choice_node<I, S>(&mut self, position: Point, prompt: impl Into<String>, options: I) -> NodeId
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.graph.add_choice_node(position, prompt, options)
    }

    pub fn add_custom_node<I, S>(&mut self, position: Point, movable: bool, slots: I) -> NodeId
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.graph.add_custom_node(position, movable, slots)
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<(), GraphError> {
        self.graph.set_text(id, text)
    }

    // === Pointer events ===

    /// Start a gesture. Returns whether the press was consumed.
    ///
    /// A press on a slot row runs the host's connection drag to completion
    /// before returning.
    pub fn on_pointer_down(
        &mut self,
        position: Point,
        button: PointerButton,
        modifiers: Modifiers,
    ) -> Result<bool, GraphError> {
        if button != PointerButton::Left {
            return Ok(false);
        }
        self.cancel_gesture();

        let Some(id) = find_node_at(&self.graph, position) else {
            if !modifiers.shift {
                self.selection.clear();
            }
            self.gesture = Gesture::RubberBand {
                origin: position,
                current: position,
                additive: modifiers.shift,
            };
            return Ok(true);
        };

        let region = self
            .graph
            .node(id)
            .and_then(|node| node_region(self.graph.config(), node, position));
        match region {
            Some(region) if region.is_drag_region() => {
                self.begin_move(id, position, modifiers);
                Ok(true)
            }
            Some(NodeRegion::Slot(slot)) => self.run_connection_drag(ConnectionId::new(id, slot)),
            _ => Ok(false),
        }
    }

    /// Live feedback for the current gesture. Never produces commands.
    pub fn on_pointer_move(&mut self, position: Point) {
        match &mut self.gesture {
            Gesture::Moving { anchor, origins } => {
                follow_pointer(&mut self.graph, origins, position - *anchor);
            }
            Gesture::RubberBand { current, .. } => *current = position,
            Gesture::Idle => {}
        }
    }

    /// Finish the current gesture, pushing at most one command.
    pub fn on_pointer_up(&mut self, position: Point, button: PointerButton) -> Result<bool, GraphError> {
        if button != PointerButton::Left {
            return Ok(false);
        }
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => Ok(false),
            Gesture::Moving { anchor, origins } => {
                follow_pointer(&mut self.graph, &origins, position - anchor);
                self.finish_move(origins)?;
                Ok(true)
            }
            Gesture::RubberBand { origin, additive, .. } => {
                let hits = nodes_in_selection_box(&self.graph, Rect::from_corners(origin, position));
                debug!(hits = hits.len(), additive, "rubber band finished");
                if additive {
                    self.selection.extend(hits);
                } else {
                    self.selection.replace_selection(hits);
                }
                Ok(true)
            }
        }
    }

    /// Abort a live gesture. A move snaps every node back to where it started.
    pub fn cancel_gesture(&mut self) -> bool {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => false,
            Gesture::Moving { origins, .. } => {
                follow_pointer(&mut self.graph, &origins, Point::default());
                debug!("move gesture cancelled");
                true
            }
            Gesture::RubberBand { .. } => true,
        }
    }

    pub fn is_moving(&self) -> bool {
        matches!(self.gesture, Gesture::Moving { .. })
    }

    /// Current rubber-band rectangle in scene coordinates, if one is active.
    pub fn rubber_band(&self) -> Option<Rect> {
        match self.gesture {
            Gesture::RubberBand { origin, current, .. } => Some(Rect::from_corners(origin, current)),
            _ => None,
        }
    }

    fn begin_move(&mut self, id: NodeId, position: Point, modifiers: Modifiers) {
        // A plain press inside the selection keeps it, so the group can move.
        if modifiers.shift || !self.selection.contains(id) {
            self.selection.handle_interaction(id, modifiers.shift);
        }
        if self.graph.movable_node(id).is_none() || !self.selection.contains(id) {
            return;
        }

        let origins: Vec<(NodeId, Point)> = self
            .selection
            .iter()
            .filter_map(|n| self.graph.movable_node(n))
            .map(|n| (n.id(), n.position()))
            .collect();
        debug!(nodes = origins.len(), "move gesture started");
        self.gesture = Gesture::Moving {
            anchor: position,
            origins,
        };
    }

    fn finish_move(&mut self, origins: Vec<(NodeId, Point)>) -> Result<(), GraphError> {
        let movements: Vec<Movement> = origins
            .into_iter()
            .filter_map(|(node, old_position)| {
                let new_position = self.graph.node(node)?.position();
                (new_position != old_position).then_some(Movement {
                    node,
                    old_position,
                    new_position,
                })
            })
            .collect();
        if movements.is_empty() {
            debug!("move gesture ended where it started");
            return Ok(());
        }
        self.push_command(Box::new(MoveCommand::new(movements)))
    }

    fn run_connection_drag(&mut self, connection: ConnectionId) -> Result<bool, GraphError> {
        let Some(host) = self.drag_host.as_mut() else {
            warn!(%connection, "no drag host installed, connection drag ignored");
            return Ok(false);
        };

        let mut session = ConnectionDrag::new(connection);
        debug!(%connection, "connection drag started");
        host.run_connection_drag(&self.graph, &mut session);

        match session.outcome() {
            DropOutcome::Cancelled => {
                debug!(%connection, "connection drag cancelled");
                Ok(true)
            }
            DropOutcome::Dropped(target) => {
                self.connect(connection, Some(target))?;
                Ok(true)
            }
        }
    }

    // === Edits ===

    /// Point `connection` at `destination` as one undo step.
    ///
    /// Self-loops, targets that are not live, and drops on the current
    /// destination are ignored. Returns whether a command was pushed.
    pub fn connect(&mut self, connection: ConnectionId, destination: Option<NodeId>) -> Result<bool, GraphError> {
        let current = self.graph.require_connection(connection)?.destination();
        if let Some(target) = destination {
            if target == connection.node {
                debug!(%connection, "self-connection rejected");
                return Ok(false);
            }
            if !self.graph.contains(target) {
                debug!(%connection, node = %target, "drop target is not live");
                return Ok(false);
            }
        }
        if current == destination {
            debug!(%connection, "connection unchanged");
            return Ok(false);
        }
        self.push_command(Box::new(ConnectCommand::new(connection, current, destination)))?;
        Ok(true)
    }

    /// Unhook `connection` from its destination as one undo step.
    pub fn disconnect(&mut self, connection: ConnectionId) -> Result<bool, GraphError> {
        self.connect(connection, None)
    }

    /// Delete every selected live node.
    pub fn delete_selected(&mut self) -> Result<bool, GraphError> {
        let targets: Vec<NodeId> = self
            .selection
            .iter()
            .filter(|id| self.graph.contains(*id))
            .collect();
        self.delete_nodes(targets)
    }

    /// Delete every movable node with no cable in either direction.
    pub fn delete_loose_nodes(&mut self) -> Result<bool, GraphError> {
        let targets: Vec<NodeId> = self
            .graph
            .nodes()
            .filter(|n| n.is_movable() && n.is_loose())
            .map(|n| n.id())
            .collect();
        self.delete_nodes(targets)
    }

    fn delete_nodes(&mut self, targets: Vec<NodeId>) -> Result<bool, GraphError> {
        if targets.is_empty() {
            return Ok(false);
        }
        self.cancel_gesture();
        let command = DeleteCommand::new(&self.graph, targets)?;
        self.push_command(Box::new(command))?;
        Ok(true)
    }

    /// Execute `command` and record it in the history.
    pub fn push_command(&mut self, command: Box<dyn Command>) -> Result<(), GraphError> {
        self.history.push(command, &mut self.graph)?;
        self.after_edit();
        Ok(())
    }

    pub fn undo(&mut self) -> Result<bool, GraphError> {
        self.cancel_gesture();
        let changed = self.history.undo(&mut self.graph)?;
        if changed {
            self.after_edit();
        }
        Ok(changed)
    }

    pub fn redo(&mut self) -> Result<bool, GraphError> {
        self.cancel_gesture();
        let changed = self.history.redo(&mut self.graph)?;
        if changed {
            self.after_edit();
        }
        Ok(changed)
    }

    /// Drop the whole history. Nodes owned by applied deletes are destroyed.
    pub fn clear_history(&mut self) {
        self.history.clear(&mut self.graph);
    }

    fn after_edit(&mut self) {
        let graph = &self.graph;
        self.selection.retain(|id| graph.contains(*id));
        for callback in self.scene_changed.iter_mut() {
            callback();
        }
    }

    // === Selection ===

    pub fn select(&mut self, id: NodeId, shift_held: bool) {
        if self.graph.contains(id) {
            self.selection.handle_interaction(id, shift_held);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Mirror the selection into a Slint model of raw node ids.
    pub fn sync_selection_to_model(&self, model: &slint::VecModel<i32>) {
        self.selection.sync_to_model(model);
    }

    /// Take the selection from a Slint model of raw node ids. Ids that are not
    /// live nodes are dropped.
    pub fn sync_selection_from_model(&mut self, model: &dyn slint::Model<Data = i32>) {
        self.selection.sync_from_model(model);
        let graph = &self.graph;
        self.selection.retain(|id| graph.contains(*id));
    }

    // === Rendering ===

    /// Primitives for one node, with its stale cables refreshed.
    pub fn paint(&mut self, id: NodeId) -> Option<NodePaint> {
        let selected = self.selection.contains(id);
        paint_node(&mut self.graph, id, selected)
    }

    /// Primitives for every live node, back-to-front.
    pub fn paint_all(&mut self) -> Vec<NodePaint> {
        let ids = self.graph.node_ids().to_vec();
        ids.into_iter().filter_map(|id| self.paint(id)).collect()
    }

    pub fn scene_rect(&self, viewport: Rect) -> Rect {
        self.graph.scene_rect(viewport)
    }

    pub fn take_repaint_requests(&mut self) -> Vec<NodeId> {
        self.graph.take_repaint_requests()
    }
}

fn follow_pointer(graph: &mut DialogueGraph, origins: &[(NodeId, Point)], delta: Point) {
    for (id, origin) in origins {
        if let Err(err) = graph.set_position(*id, *origin + delta) {
            warn!(node = %id, %err, "dragged node vanished");
        }
    }
}
