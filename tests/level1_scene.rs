//! Level 1: Scene Setup Tests
//!
//! Tests the sample scene: node creation, initial wiring, hit regions,
//! cable geometry and paint output.

mod common;

use common::harness::{SampleHarness, SAMPLE_POSITIONS};
use slint_dialogue_editor::{
    find_node_at, node_region, ConnectionId, NodeKind, NodeLifecycle, NodeRegion, Point, Rect,
};

#[test]
fn test_sample_scene_has_four_text_nodes() {
    let harness = SampleHarness::new();
    let graph = harness.editor.graph();

    assert_eq!(graph.len(), 4);
    assert_eq!(graph.node_ids(), harness.nodes.as_slice());
    for (i, id) in harness.nodes.iter().enumerate() {
        let node = graph.node(*id).unwrap();
        let (x, y) = SAMPLE_POSITIONS[i];
        assert_eq!(node.kind(), NodeKind::Text);
        assert_eq!(node.position(), Point::new(x, y));
        assert_eq!(node.slot_count(), 1);
        assert!(node.is_movable());
        assert_eq!(node.lifecycle(), Ok(NodeLifecycle::Live));
    }
}

#[test]
fn test_sample_wiring_and_receivers() {
    let harness = SampleHarness::new();
    let [n0, n1, n2, n3] = [0, 1, 2, 3].map(|i| harness.node(i));

    assert_eq!(harness.destination(n0, 0), Some(n1));
    assert_eq!(harness.destination(n1, 0), Some(n2));
    assert_eq!(harness.destination(n2, 0), None);
    assert_eq!(harness.destination(n3, 0), Some(n2));

    let graph = harness.editor.graph();
    let mut into_n2: Vec<ConnectionId> = graph.node(n2).unwrap().receivers().collect();
    into_n2.sort();
    assert_eq!(into_n2, vec![ConnectionId::new(n1, 0), ConnectionId::new(n3, 0)]);
    assert_eq!(graph.node(n0).unwrap().receivers().count(), 0);
    harness.assert_consistent();
}

#[test]
fn test_sample_scene_starts_clean() {
    let mut harness = SampleHarness::new();
    assert_eq!(harness.history_len(), 0);
    assert_eq!(harness.scene_changed_count(), 0);
    assert!(harness.editor.selection().is_empty());
    assert!(harness.editor.take_repaint_requests().is_empty());
}

#[test]
fn test_hit_regions_on_sample_node() {
    let harness = SampleHarness::new();
    let n1 = harness.node(1);
    let graph = harness.editor.graph();
    let node = graph.node(n1).unwrap();

    for (point, region) in [
        (harness.handle_point(n1), NodeRegion::Handle),
        (harness.body_point(n1), NodeRegion::Body),
        (harness.slot_point(n1, 0), NodeRegion::Slot(0)),
    ] {
        assert_eq!(find_node_at(graph, point), Some(n1));
        assert_eq!(node_region(graph.config(), node, point), Some(region));
    }

    // Just below the only slot row
    let below = harness.position(n1) + Point::new(60.0, 75.0);
    assert_eq!(find_node_at(graph, below), None);
    assert_eq!(node_region(graph.config(), node, below), None);
}

#[test]
fn test_cable_geometry_between_sample_nodes() {
    let harness = SampleHarness::new();
    let graph = harness.editor.graph();
    let cable = graph.cable(ConnectionId::new(harness.node(0), 0));

    // Slot anchor (135, 60) to node 1's left midpoint, in node 0's space
    assert_eq!(
        cable.to_svg_commands(),
        "M 135 60 L 140 60 C 190 60 195 25 245 25 L 250 25"
    );
    assert!(graph.cable(ConnectionId::new(harness.node(2), 0)).is_empty());
}

#[test]
fn test_node_bounds_grow_with_cables() {
    let harness = SampleHarness::new();
    let graph = harness.editor.graph();

    // Node 2 has no outgoing cable but two incoming ones from the left
    let bounds = graph.node_bounds(harness.node(2)).unwrap();
    let shape = graph.scene_shape(harness.node(2)).unwrap();
    assert!(bounds.x < 0.0);
    assert!(bounds.width > shape.width);
    // Node 3's cable climbs to node 2, so node 2's bounds reach below its own outline
    assert!(bounds.bottom() > 70.0);
}

#[test]
fn test_paint_all_draws_sample_cables() {
    let mut harness = SampleHarness::new();
    let painted = harness.editor.paint_all();

    assert_eq!(painted.len(), 4);
    let cables: usize = painted.iter().map(|p| p.cables.len()).sum();
    assert_eq!(cables, 3);
    assert_eq!(painted[0].text.as_str(), "Line 1");
    assert_eq!(painted[0].slots[0].label.as_str(), "Next");
    assert!(painted[2].cables.is_empty());
}

#[test]
fn test_scene_rect_covers_sample() {
    let harness = SampleHarness::new();
    let rect = harness.editor.scene_rect(Rect::new(0.0, 0.0, 400.0, 300.0));

    // Rightmost node ends at 635; trailing padding adds 200
    assert!(rect.right() >= 835.0);
    // Lowest node ends at 270; padding adds 50
    assert!(rect.bottom() >= 320.0);
    assert_eq!(rect.x, 0.0);
}

#[test]
fn test_empty_editor() {
    let mut harness = SampleHarness::empty();
    assert!(harness.editor.graph().is_empty());
    assert!(harness.editor.paint_all().is_empty());
    assert!(!harness.editor.undo().unwrap());
}
