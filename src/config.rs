//! Editor configuration.
//!
//! All geometry constants live here so hosts can restyle nodes without touching
//! the engine. The struct deserializes from any serde format; missing fields fall
//! back to [`EditorConfig::default`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Width of the node body, excluding the drag handle.
    pub body_width: f32,
    /// Height of the node body; slot rows start below it.
    pub body_height: f32,
    /// Width of the drag handle on the node's left edge.
    pub handle_width: f32,
    /// Height of one outgoing slot row.
    pub slot_height: f32,
    /// Horizontal distance of the cable's cubic control points.
    pub cable_control_offset: f32,
    /// Length of the straight segment at each end of a cable.
    pub cable_lead: f32,
    /// Padding around a cable's bounds when it grows a node's bounding box.
    pub cable_margin: f32,
    /// Padding around the scene contents on the left, top and bottom.
    pub scene_padding: f32,
    /// Extra room to the right of the scene contents and of the viewport.
    pub scene_trailing_padding: f32,
    /// Maximum number of commands kept for undo; 0 keeps everything.
    pub undo_limit: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            body_width: 120.0,
            body_height: 50.0,
            handle_width: 15.0,
            slot_height: 20.0,
            cable_control_offset: 50.0,
            cable_lead: 5.0,
            cable_margin: 5.0,
            scene_padding: 50.0,
            scene_trailing_padding: 200.0,
            undo_limit: 0,
        }
    }
}

impl EditorConfig {
    /// Set the cubic control offset for cable paths (default: 50.0).
    pub fn with_cable_control_offset(mut self, offset: f32) -> Self {
        self.cable_control_offset = offset;
        self
    }

    /// Limit the undo history depth (default: unlimited).
    pub fn with_undo_limit(mut self, limit: usize) -> Self {
        self.undo_limit = limit;
        self
    }
}
