//! Reversible edit commands.
//!
//! Each command captures exactly the state it needs to invert itself. All
//! rewiring goes through [`DialogueGraph::set_destination`], so the
//! connection/receiver pairing holds after any sequence of `redo` and `undo`.

use crate::error::GraphError;
use crate::geometry::Point;
use crate::graph::{ConnectionId, DialogueGraph, NodeId, NodeLifecycle};
use std::fmt;
use tracing::debug;

/// A reversible edit, executed and reverted by an [`UndoStack`](crate::UndoStack).
///
/// `redo` and `undo` must exactly invert each other's observable effect, and
/// applying either twice in a row must be harmless. When either returns an
/// error the graph must be left as it was: validate every handle before the
/// first mutation.
pub trait Command: fmt::Debug {
    /// Short user-facing name, e.g. for an "Undo Move" menu entry.
    fn label(&self) -> &str;

    /// Apply the forward effect. Also used for the first execution.
    fn redo(&mut self, graph: &mut DialogueGraph) -> Result<(), GraphError>;

    /// Revert the forward effect.
    fn undo(&mut self, graph: &mut DialogueGraph) -> Result<(), GraphError>;

    /// Called when the history drops the command for good.
    fn discard(self: Box<Self>, _graph: &mut DialogueGraph) {}
}

/// A node's position before and after a drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Movement {
    pub node: NodeId,
    pub old_position: Point,
    pub new_position: Point,
}

/// Moves one or more nodes as a single undo step.
#[derive(Debug, Clone)]
pub struct MoveCommand {
    movements: Vec<Movement>,
}

impl MoveCommand {
    pub fn new(movements: Vec<Movement>) -> Self {
        Self { movements }
    }

    fn apply(
        &self,
        graph: &mut DialogueGraph,
        target: impl Fn(&Movement) -> Point,
    ) -> Result<(), GraphError> {
        for m in &self.movements {
            graph.require_node(m.node)?;
        }
        for m in &self.movements {
            graph.set_position(m.node, target(m))?;
        }
        Ok(())
    }

    pub fn movements(&self) -> &[Movement] {
        &self.movements
    }
}

impl Command for MoveCommand {
    fn label(&self) -> &str {
        "Move"
    }

    fn redo(&mut self, graph: &mut DialogueGraph) -> Result<(), GraphError> {
        self.apply(graph, |m| m.new_position)
    }

    fn undo(&mut self, graph: &mut DialogueGraph) -> Result<(), GraphError> {
        self.apply(graph, |m| m.old_position)
    }
}

/// Re-points one connection.
#[derive(Debug, Clone)]
pub struct ConnectCommand {
    connection: ConnectionId,
    old_destination: Option<NodeId>,
    new_destination: Option<NodeId>,
}

impl ConnectCommand {
    pub fn new(
        connection: ConnectionId,
        old_destination: Option<NodeId>,
        new_destination: Option<NodeId>,
    ) -> Self {
        Self {
            connection,
            old_destination,
            new_destination,
        }
    }

    /// Build the command from the connection's current destination.
    pub fn capture(
        graph: &DialogueGraph,
        connection: ConnectionId,
        new_destination: Option<NodeId>,
    ) -> Result<Self, GraphError> {
        let old = graph.require_connection(connection)?.destination();
        Ok(Self::new(connection, old, new_destination))
    }

    pub fn connection(&self) -> ConnectionId {
        self.connection
    }

    pub fn old_destination(&self) -> Option<NodeId> {
        self.old_destination
    }

    pub fn new_destination(&self) -> Option<NodeId> {
        self.new_destination
    }
}

impl Command for ConnectCommand {
    fn label(&self) -> &str {
        if self.new_destination.is_some() {
            "Connect"
        } else {
            "Disconnect"
        }
    }

    fn redo(&mut self, graph: &mut DialogueGraph) -> Result<(), GraphError> {
        graph.set_destination(self.connection, self.new_destination)
    }

    fn undo(&mut self, graph: &mut DialogueGraph) -> Result<(), GraphError> {
        graph.set_destination(self.connection, self.old_destination)
    }
}

/// Who is responsible for freeing the nodes of a [`DeleteCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Custody {
    /// Nodes are live in the graph (command not applied, or undone).
    Graph,
    /// Nodes are detached; dropping the command from history destroys them.
    Command,
}

#[derive(Debug, Clone)]
struct DeletedNode {
    node: NodeId,
    z_index: usize,
    receivers: Vec<ConnectionId>,
    outgoing: Vec<(ConnectionId, NodeId)>,
}

/// Removes nodes together with every cable touching them.
#[derive(Debug, Clone)]
pub struct DeleteCommand {
    entries: Vec<DeletedNode>,
    custody: Custody,
}

impl DeleteCommand {
    /// Snapshot the wiring of each live node in `nodes`.
    pub fn new<I>(graph: &DialogueGraph, nodes: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = NodeId>,
    {
        let mut entries: Vec<DeletedNode> = Vec::new();
        for id in nodes {
            if entries.iter().any(|e| e.node == id) {
                continue;
            }
            let node = graph.node(id).ok_or(GraphError::NodeNotFound(id))?;
            let mut receivers: Vec<ConnectionId> = node.receivers().collect();
            receivers.sort();
            let outgoing = node
                .connections()
                .iter()
                .filter_map(|c| Some((c.id(), c.destination()?)))
                .collect();
            entries.push(DeletedNode {
                node: id,
                z_index: 0,
                receivers,
                outgoing,
            });
        }
        Ok(Self {
            entries,
            custody: Custody::Graph,
        })
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries.iter().map(|e| e.node)
    }

    pub fn custody(&self) -> Custody {
        self.custody
    }

    fn is_target(&self, id: NodeId) -> bool {
        self.entries.iter().any(|e| e.node == id)
    }

    /// Every target must still be detached, and every node its wiring refers
    /// to must be live or another target.
    fn check_restorable(&self, graph: &DialogueGraph) -> Result<(), GraphError> {
        for entry in &self.entries {
            match graph.lifecycle(entry.node)? {
                NodeLifecycle::Detached => {}
                NodeLifecycle::Live => return Err(GraphError::NodeLive(entry.node)),
                NodeLifecycle::Destroyed => return Err(GraphError::NodeNotFound(entry.node)),
            }
            let peers = entry
                .receivers
                .iter()
                .map(|c| c.node)
                .chain(entry.outgoing.iter().map(|(_, d)| *d));
            for peer in peers {
                if !self.is_target(peer) {
                    graph.require_node(peer)?;
                }
            }
        }
        Ok(())
    }
}

impl Command for DeleteCommand {
    fn label(&self) -> &str {
        "Delete"
    }

    fn redo(&mut self, graph: &mut DialogueGraph) -> Result<(), GraphError> {
        if self.custody == Custody::Command {
            return Ok(());
        }

        for entry in &self.entries {
            graph.require_node(entry.node)?;
        }

        // Sever every cable touching a target first, so no detached node is
        // referenced by (or references) a live one.
        for entry in &self.entries {
            let Some(node) = graph.node(entry.node) else {
                return Err(GraphError::NodeNotFound(entry.node));
            };
            let touching: Vec<ConnectionId> = node
                .connections()
                .iter()
                .filter(|c| c.destination().is_some())
                .map(|c| c.id())
                .chain(node.receivers())
                .collect();
            for connection in touching {
                graph.set_destination(connection, None)?;
            }
        }

        for entry in self.entries.iter_mut() {
            entry.z_index = graph.detach_node(entry.node)?;
        }
        self.custody = Custody::Command;
        debug!(nodes = self.entries.len(), "nodes deleted");
        Ok(())
    }

    fn undo(&mut self, graph: &mut DialogueGraph) -> Result<(), GraphError> {
        if self.custody == Custody::Graph {
            return Ok(());
        }

        self.check_restorable(graph)?;

        // Reverse detach order so every z-index lands where it was taken from.
        for entry in self.entries.iter().rev() {
            graph.reattach_node(entry.node, entry.z_index)?;
        }
        for entry in &self.entries {
            for receiver in &entry.receivers {
                graph.set_destination(*receiver, Some(entry.node))?;
            }
            for (connection, destination) in &entry.outgoing {
                graph.set_destination(*connection, Some(*destination))?;
            }
        }
        self.custody = Custody::Graph;
        debug!(nodes = self.entries.len(), "nodes restored");
        Ok(())
    }

    fn discard(self: Box<Self>, graph: &mut DialogueGraph) {
        if self.custody != Custody::Command {
            return;
        }
        for entry in &self.entries {
            if let Err(err) = graph.destroy_node(entry.node) {
                debug!(node = %entry.node, %err, "node already gone");
            }
        }
    }
}
