//! Level 5: Property-based invariant tests.
//!
//! Random sequences of connect, disconnect, move, delete, undo and redo must:
//!
//! 1. Keep every connection and its destination's receiver set in agreement
//! 2. Never fail with a `GraphError`
//! 3. Unwind to the exact starting graph when everything is undone
//! 4. Replay to the exact same graph when everything is redone
//! 5. Make each individual command's undo/redo an exact inverse pair

use proptest::prelude::*;
use slint_dialogue_editor::{
    ConnectionId, DeleteCommand, DialogueEditor, DialogueGraph, EditorConfig, GraphSnapshot,
    MoveCommand, Movement, NodeId, NodeLifecycle, Point,
};

// ── Strategies ──────────────────────────────────────────────────────────

const NODES: usize = 6;

#[derive(Debug, Clone)]
enum Op {
    Connect { source: usize, slot: usize, target: Option<usize> },
    Move { node: usize, dx: i16, dy: i16 },
    Delete(Vec<usize>),
    DeleteLoose,
    Undo,
    Redo,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..NODES, 0usize..3, proptest::option::of(0..NODES))
            .prop_map(|(source, slot, target)| Op::Connect { source, slot, target }),
        2 => (0..NODES, -80i16..80, -80i16..80).prop_map(|(node, dx, dy)| Op::Move { node, dx, dy }),
        1 => proptest::collection::vec(0..NODES, 1..3).prop_map(Op::Delete),
        1 => Just(Op::DeleteLoose),
        2 => Just(Op::Undo),
        1 => Just(Op::Redo),
    ]
}

/// Entry, three text lines, a three-way choice and a slotless custom node.
fn scene(config: EditorConfig) -> (DialogueEditor, Vec<NodeId>) {
    let mut graph = DialogueGraph::new(config);
    let nodes = vec![
        graph.add_entry_node(Point::new(0.0, 0.0)),
        graph.add_text_node(Point::new(200.0, 0.0), "a"),
        graph.add_text_node(Point::new(400.0, 0.0), "b"),
        graph.add_text_node(Point::new(200.0, 200.0), "c"),
        graph.add_choice_node(Point::new(400.0, 200.0), "?", ["x", "y", "z"]),
        graph.add_custom_node(Point::new(600.0, 100.0), true, Vec::<String>::new()),
    ];
    (DialogueEditor::from_graph(graph), nodes)
}

/// Apply one op through the editor's public surface. Ops that make no sense
/// for the current graph (dead nodes, missing slots) are skipped.
fn apply(editor: &mut DialogueEditor, nodes: &[NodeId], op: &Op) -> bool {
    let graph = editor.graph();
    match op {
        Op::Connect { source, slot, target } => {
            let source = nodes[*source];
            let Some(node) = graph.node(source) else {
                return false;
            };
            if *slot >= node.slot_count() {
                return false;
            }
            let target = target.map(|t| nodes[t]);
            editor.connect(ConnectionId::new(source, *slot), target).unwrap()
        }
        Op::Move { node, dx, dy } => {
            let Some(node) = graph.movable_node(nodes[*node]) else {
                return false;
            };
            let old = node.position();
            let new = old + Point::new(*dx as f32, *dy as f32);
            if old == new {
                return false;
            }
            let movement = Movement {
                node: node.id(),
                old_position: old,
                new_position: new,
            };
            editor
                .push_command(Box::new(MoveCommand::new(vec![movement])))
                .unwrap();
            true
        }
        Op::Delete(targets) => {
            let live: Vec<NodeId> = targets
                .iter()
                .map(|i| nodes[*i])
                .filter(|id| graph.contains(*id))
                .collect();
            if live.is_empty() {
                return false;
            }
            let command = DeleteCommand::new(graph, live).unwrap();
            editor.push_command(Box::new(command)).unwrap();
            true
        }
        Op::DeleteLoose => editor.delete_loose_nodes().unwrap(),
        Op::Undo => editor.undo().unwrap(),
        Op::Redo => editor.redo().unwrap(),
    }
}

fn state(editor: &DialogueEditor) -> (GraphSnapshot, Vec<NodeId>) {
    (editor.graph().snapshot(), editor.graph().node_ids().to_vec())
}

// ═══════════════════════════════════════════════════════════════════════
// 1-2. Wiring stays consistent, nothing errors
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn wiring_stays_consistent(ops in proptest::collection::vec(op_strategy(), 1..60)) {
        let (mut editor, nodes) = scene(EditorConfig::default());
        for op in &ops {
            apply(&mut editor, &nodes, op);
            prop_assert_eq!(editor.graph().check_consistency(), Ok(()));
        }
    }

    #[test]
    fn wiring_stays_consistent_with_bounded_history(
        ops in proptest::collection::vec(op_strategy(), 1..60),
        limit in 1usize..4,
    ) {
        let (mut editor, nodes) = scene(EditorConfig::default().with_undo_limit(limit));
        for op in &ops {
            apply(&mut editor, &nodes, op);
            prop_assert_eq!(editor.graph().check_consistency(), Ok(()));
            prop_assert!(editor.history().len() <= limit);
        }
        // Undone deletes hand their nodes back, evicted ones destroyed theirs
        while editor.undo().unwrap() {
            prop_assert_eq!(editor.graph().check_consistency(), Ok(()));
        }
        for id in &nodes {
            prop_assert_ne!(editor.graph().lifecycle(*id), Ok(NodeLifecycle::Detached));
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 3-4. Full unwind and full replay
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn undo_all_restores_start_and_redo_all_restores_end(
        ops in proptest::collection::vec(op_strategy(), 1..60),
    ) {
        let (mut editor, nodes) = scene(EditorConfig::default());
        let start = state(&editor);
        for op in &ops {
            apply(&mut editor, &nodes, op);
        }
        let end_index = editor.history().index();
        while editor.redo().unwrap() {}
        let tip = state(&editor);

        while editor.undo().unwrap() {}
        prop_assert_eq!(state(&editor), start);

        while editor.redo().unwrap() {}
        prop_assert_eq!(state(&editor), tip);
        prop_assert!(editor.history().index() >= end_index);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 5. Every command inverts exactly
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn each_command_is_an_exact_inverse_pair(ops in proptest::collection::vec(op_strategy(), 1..40)) {
        let (mut editor, nodes) = scene(EditorConfig::default());
        for op in &ops {
            if matches!(op, Op::Undo | Op::Redo) {
                continue;
            }
            let before = state(&editor);
            if !apply(&mut editor, &nodes, op) {
                prop_assert_eq!(state(&editor), before);
                continue;
            }
            let after = state(&editor);

            prop_assert!(editor.undo().unwrap());
            prop_assert_eq!(state(&editor), before);
            prop_assert!(editor.redo().unwrap());
            prop_assert_eq!(state(&editor), after);
        }
    }
}
