use crate::graph::{ConnectionId, NodeId};
use thiserror::Error;

/// Contract violations reported by graph mutators and commands.
///
/// Gestures never produce these: a rejected gesture is silently dropped. They
/// surface only when a caller hands the graph a handle that is not live.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("node {0} not found")]
    NodeNotFound(NodeId),
    #[error("node {0} is detached from the scene")]
    NodeDetached(NodeId),
    #[error("node {0} is still in the scene")]
    NodeLive(NodeId),
    #[error("slot {slot} out of range for node {node} ({slots} slots)")]
    SlotOutOfRange { node: NodeId, slot: usize, slots: usize },
    #[error("inconsistent wiring on {connection}: {detail}")]
    InconsistentWiring {
        connection: ConnectionId,
        detail: String,
    },
}
