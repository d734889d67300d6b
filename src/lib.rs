//! # Slint Dialogue Editor Library
//!
//! The graph-editing engine behind a visual dialogue-tree editor built with
//! Slint. Nodes are dialogue steps; each node owns a fixed list of outgoing
//! slots, and each slot links to at most one successor node.
//!
//! ## Features
//!
//! - **Consistent Wiring** - Every connection and its destination's receiver
//!   index are updated together through [`DialogueGraph::set_destination`]
//! - **Undoable Edits** - Move, connect and delete are [`Command`]s on a linear
//!   [`UndoStack`]; deleted nodes are kept detached until their command is gone
//! - **Gesture Controller** - [`DialogueEditor`] turns pointer events into live
//!   feedback and at most one command per gesture
//! - **Lazy Cables** - Moving a node only marks cables stale; they are
//!   recomputed when the node is painted
//!
//! ## Quick Start
//!
//! ```no_run
//! use slint_dialogue_editor::{ConnectionId, DialogueEditor, Point};
//!
//! let mut editor = DialogueEditor::default();
//! let hello = editor.add_text_node(Point::new(50.0, 60.0), "Hello");
//! let bye = editor.add_text_node(Point::new(300.0, 60.0), "Bye");
//!
//! editor.connect(ConnectionId::new(hello, 0), Some(bye)).unwrap();
//! editor.undo().unwrap();
//! ```
//!
//! ## Rust Helpers
//!
//! - [`connection_path`] - Cable between a slot and a destination node
//! - [`find_node_at`] - Topmost node under a scene point
//! - [`region_at`] - Handle, body or slot row under a node-local point
//! - [`paint_node`] - Slint-ready primitives for one node
//! - [`SelectionManager`] - Selected node ids, mirrored into a `VecModel`

pub mod commands;
pub mod config;
pub mod controller;
pub mod drag;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod history;
pub mod paint;
pub mod selection;

pub use commands::{Command, ConnectCommand, Custody, DeleteCommand, MoveCommand, Movement};
pub use config::EditorConfig;
pub use controller::{DialogueEditor, Modifiers, PointerButton};
pub use drag::{ConnectionDrag, ConnectionDragHost, DropOutcome};
pub use error::GraphError;
pub use geometry::{
    connection_path, destination_anchor, node_shape, slot_anchor, CablePath, CubicBezier, Point, Rect,
};
pub use graph::{
    Connection, ConnectionId, DialogueGraph, GraphSnapshot, Node, NodeId, NodeKind, NodeLifecycle,
    NodeSnapshot,
};
pub use hit_test::{find_node_at, node_region, nodes_in_selection_box, region_at, NodeRegion};
pub use history::{CommandState, UndoStack};
pub use paint::{paint_node, CablePaint, FillRect, NodePaint, SlotPaint};
pub use selection::SelectionManager;
