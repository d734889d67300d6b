//! Connection drag sessions.
//!
//! Dragging a new cable out of a slot runs the host toolkit's own
//! drag-and-drop loop. The editor hands the host a [`ConnectionDrag`] and
//! blocks until the host returns; the session then says whether the user
//! dropped on an acceptable node or gave up.

use crate::graph::{ConnectionId, DialogueGraph, NodeId};

/// How a connection drag ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    Dropped(NodeId),
    Cancelled,
}

/// State of one drag out of a slot.
#[derive(Debug, Clone)]
pub struct ConnectionDrag {
    connection: ConnectionId,
    target: Option<NodeId>,
}

impl ConnectionDrag {
    pub fn new(connection: ConnectionId) -> Self {
        Self {
            connection,
            target: None,
        }
    }

    /// The slot being dragged from.
    pub fn connection(&self) -> ConnectionId {
        self.connection
    }

    /// The node the drag started on.
    pub fn source_node(&self) -> NodeId {
        self.connection.node
    }

    /// Whether hovering `target` should show an accepting cursor.
    ///
    /// Self-loops are never accepted.
    pub fn accepts(&self, target: NodeId) -> bool {
        target != self.connection.node
    }

    /// Record a drop on `target`. Returns false, leaving the session
    /// unchanged, when the target is not accepted.
    pub fn drop_on(&mut self, target: NodeId) -> bool {
        if !self.accepts(target) {
            return false;
        }
        self.target = Some(target);
        true
    }

    pub fn outcome(&self) -> DropOutcome {
        match self.target {
            Some(node) => DropOutcome::Dropped(node),
            None => DropOutcome::Cancelled,
        }
    }
}

/// Runs the toolkit's drag-and-drop loop for a connection drag.
///
/// The implementation returns once the user releases the pointer. Calling
/// [`ConnectionDrag::drop_on`] with the node under the pointer completes the
/// session; returning without a successful drop cancels it. The graph is
/// read-only for the duration.
pub trait ConnectionDragHost {
    fn run_connection_drag(&mut self, graph: &DialogueGraph, session: &mut ConnectionDrag);
}

impl<F> ConnectionDragHost for F
where
    F: FnMut(&DialogueGraph, &mut ConnectionDrag),
{
    fn run_connection_drag(&mut self, graph: &DialogueGraph, session: &mut ConnectionDrag) {
        self(graph, session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: ConnectionId = ConnectionId::new(NodeId(1), 0);

    #[test]
    fn test_new_session_is_cancelled() {
        let session = ConnectionDrag::new(SOURCE);
        assert_eq!(session.source_node(), NodeId(1));
        assert_eq!(session.outcome(), DropOutcome::Cancelled);
    }

    #[test]
    fn test_drop_on_other_node() {
        let mut session = ConnectionDrag::new(SOURCE);
        assert!(session.accepts(NodeId(2)));
        assert!(session.drop_on(NodeId(2)));
        assert_eq!(session.outcome(), DropOutcome::Dropped(NodeId(2)));
    }

    #[test]
    fn test_self_drop_rejected() {
        let mut session = ConnectionDrag::new(SOURCE);
        assert!(!session.accepts(NodeId(1)));
        assert!(!session.drop_on(NodeId(1)));
        assert_eq!(session.outcome(), DropOutcome::Cancelled);
    }

    #[test]
    fn test_closure_host() {
        let graph = DialogueGraph::default();
        let mut host = |_: &DialogueGraph, session: &mut ConnectionDrag| {
            session.drop_on(NodeId(3));
        };
        let mut session = ConnectionDrag::new(SOURCE);
        host.run_connection_drag(&graph, &mut session);
        assert_eq!(session.outcome(), DropOutcome::Dropped(NodeId(3)));
    }
}
