//! Per-node paint primitives for a Slint scene.
//!
//! Rectangles are in node-local coordinates, cable commands are SVG path
//! strings in the same space, ready for a `Path { commands: ... }` element
//! placed at [`NodePaint::origin`].

use crate::geometry::{self, Point, Rect};
use crate::graph::{ConnectionId, DialogueGraph, NodeId};
use slint::{Color, SharedString};

const HANDLE_COLOR: Color = Color::from_rgb_u8(100, 100, 100);
const BODY_COLOR: Color = Color::from_rgb_u8(200, 200, 200);
const CABLE_COLOR: Color = Color::from_rgb_u8(0, 0, 0);

/// A filled rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct FillRect {
    pub rect: Rect,
    pub fill: Color,
}

/// One outgoing slot row with its label.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotPaint {
    pub slot: usize,
    pub rect: Rect,
    pub label: SharedString,
    pub text_color: Color,
}

/// One outgoing cable.
#[derive(Debug, Clone, PartialEq)]
pub struct CablePaint {
    pub connection: ConnectionId,
    pub commands: SharedString,
    pub color: Color,
}

/// Everything needed to draw one node for the current frame.
#[derive(Debug, Clone, PartialEq)]
pub struct NodePaint {
    pub node: NodeId,
    pub origin: Point,
    /// Local area covered by the node and every cable touching it.
    pub bounds: Rect,
    pub selected: bool,
    pub handle: FillRect,
    pub body: FillRect,
    pub text: SharedString,
    pub slots: Vec<SlotPaint>,
    pub cables: Vec<CablePaint>,
}

/// Build the primitives for a live node, refreshing its stale cables first.
pub fn paint_node(graph: &mut DialogueGraph, id: NodeId, selected: bool) -> Option<NodePaint> {
    graph.refresh_paths(id);
    let graph = &*graph;
    let node = graph.node(id)?;
    let config = graph.config();
    let slot_count = node.slot_count();

    let handle_fill = if selected {
        HANDLE_COLOR.brighter(0.5)
    } else {
        HANDLE_COLOR.darker(1.0)
    };
    let body_fill = if selected {
        BODY_COLOR.brighter(0.1)
    } else {
        BODY_COLOR
    };
    let label_color = HANDLE_COLOR.darker(0.5);

    let slots = node
        .connections()
        .iter()
        .map(|c| SlotPaint {
            slot: c.slot(),
            rect: geometry::slot_rect(config, c.slot()),
            label: c.name().into(),
            text_color: label_color,
        })
        .collect();

    let cables = node
        .connections()
        .iter()
        .filter(|c| !c.cached_path().is_empty())
        .map(|c| CablePaint {
            connection: c.id(),
            commands: c.cached_path().to_svg_commands().into(),
            color: CABLE_COLOR,
        })
        .collect();

    Some(NodePaint {
        node: id,
        origin: node.position(),
        bounds: graph.node_bounds(id)?,
        selected,
        handle: FillRect {
            rect: geometry::handle_rect(config, slot_count),
            fill: handle_fill,
        },
        body: FillRect {
            rect: geometry::body_rect(config),
            fill: body_fill,
        },
        text: node.text().into(),
        slots,
        cables,
    })
}
