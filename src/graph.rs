//! Dialogue graph model: nodes, their outgoing connection slots and the
//! receiver back-index.
//!
//! Every connection is owned by its source node at a fixed slot index. When a
//! connection points at a node, that node's receiver set contains the
//! connection's [`ConnectionId`], and vice versa. [`DialogueGraph::set_destination`]
//! is the only code path that writes either side of that pair.

use crate::config::EditorConfig;
use crate::error::GraphError;
use crate::geometry::{self, CablePath, Point, Rect};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use tracing::{debug, trace};

/// Stable handle of a node, unique for the lifetime of its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub i32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A connection is identified by its owning node and slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId {
    pub node: NodeId,
    pub slot: usize,
}

impl ConnectionId {
    pub const fn new(node: NodeId, slot: usize) -> Self {
        Self { node, slot }
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.slot)
    }
}

/// What a node is. The kind fixes the node's slots at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Where the dialogue starts. One "Start" slot, pinned in place.
    Entry,
    /// A spoken line. One "Next" slot.
    Text,
    /// A player choice. One slot per option.
    Choice,
    /// Host-defined node with arbitrary slots.
    Custom,
}

/// Where a node's memory currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeLifecycle {
    /// In the scene: rendered, hit-testable, connectable.
    Live,
    /// Removed by a delete command that may still restore it.
    Detached,
    /// Gone for good; the handle will never resolve again.
    Destroyed,
}

/// One outgoing slot of a node.
#[derive(Debug, Clone)]
pub struct Connection {
    source: NodeId,
    slot: usize,
    name: String,
    destination: Option<NodeId>,
    path: CablePath,
    stale: bool,
}

impl Connection {
    fn new(source: NodeId, slot: usize, name: String) -> Self {
        Self {
            source,
            slot,
            name,
            destination: None,
            path: CablePath::Empty,
            stale: false,
        }
    }

    pub fn id(&self) -> ConnectionId {
        ConnectionId::new(self.source, self.slot)
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn destination(&self) -> Option<NodeId> {
        self.destination
    }

    /// Cached cable, possibly stale. Use [`DialogueGraph::cable`] for a fresh one.
    pub fn cached_path(&self) -> &CablePath {
        &self.path
    }

    /// True when an endpoint moved since the cable was last computed.
    pub fn is_stale(&self) -> bool {
        self.stale
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    position: Point,
    movable: bool,
    text: String,
    connections: Vec<Connection>,
    // Non-owning back-references, keyed by connection identity.
    receivers: HashSet<ConnectionId>,
    lifecycle: NodeLifecycle,
}

impl Node {
    fn new(id: NodeId, kind: NodeKind, position: Point, movable: bool) -> Self {
        Self {
            id,
            kind,
            position,
            movable,
            text: String::new(),
            connections: Vec::new(),
            receivers: HashSet::new(),
            lifecycle: NodeLifecycle::Live,
        }
    }

    /// Append an unconnected slot and return its index.
    ///
    /// Only called while the node is being built; slot sets are fixed afterwards.
    pub(crate) fn add_connection(&mut self, name: impl Into<String>) -> usize {
        let slot = self.connections.len();
        self.connections.push(Connection::new(self.id, slot, name.into()));
        slot
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn is_movable(&self) -> bool {
        self.movable
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn lifecycle(&self) -> NodeLifecycle {
        self.lifecycle
    }

    pub fn slot_count(&self) -> usize {
        self.connections.len()
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn connection(&self, slot: usize) -> Option<&Connection> {
        self.connections.get(slot)
    }

    /// Destination of the given slot, `None` when unconnected or out of range.
    pub fn destination(&self, slot: usize) -> Option<NodeId> {
        self.connections.get(slot).and_then(|c| c.destination)
    }

    pub fn receivers(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.receivers.iter().copied()
    }

    pub fn has_receiver(&self, connection: ConnectionId) -> bool {
        self.receivers.contains(&connection)
    }

    /// True when no cable touches the node in either direction.
    pub fn is_loose(&self) -> bool {
        self.receivers.is_empty() && self.connections.iter().all(|c| c.destination.is_none())
    }
}

/// Comparable view of one live node, see [`DialogueGraph::snapshot`].
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSnapshot {
    pub kind: NodeKind,
    pub position: Point,
    pub movable: bool,
    pub text: String,
    pub slots: Vec<(String, Option<NodeId>)>,
    pub receivers: BTreeSet<ConnectionId>,
}

/// Structural snapshot of every live node, ordered by id.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GraphSnapshot {
    pub nodes: BTreeMap<NodeId, NodeSnapshot>,
}

/// The set of nodes and their wiring.
#[derive(Debug, Clone)]
pub struct DialogueGraph {
    config: EditorConfig,
    nodes: HashMap<NodeId, Node>,
    // Live nodes back-to-front.
    order: Vec<NodeId>,
    next_id: i32,
    repaint: HashSet<NodeId>,
}

impl Default for DialogueGraph {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl DialogueGraph {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            nodes: HashMap::new(),
            order: Vec::new(),
            next_id: 1,
            repaint: HashSet::new(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    // === Construction ===

    fn insert_node<I, S>(&mut self, kind: NodeKind, position: Point, movable: bool, slots: I) -> NodeId
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = NodeId(self.next_id);
        self.next_id += 1;

        let mut node = Node::new(id, kind, position, movable);
        for name in slots {
            node.add_connection(name);
        }
        debug!(node = %id, ?kind, slots = node.slot_count(), "node added");

        self.nodes.insert(id, node);
        self.order.push(id);
        self.repaint.insert(id);
        id
    }

    /// Pinned start node with a single "Start" slot.
    pub fn add_entry_node(&mut self, position: Point) -> NodeId {
        self.insert_node(NodeKind::Entry, position, false, ["Start"])
    }

    /// Movable dialogue line with a single "Next" slot.
    pub fn add_text_node(&mut self, position: Point, text: impl Into<String>) -> NodeId {
        let id = self.insert_node(NodeKind::Text, position, true, ["Next"]);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.text = text.into();
        }
        id
    }

    /// Movable choice node with one slot per option label.
    pub fn add_choice_node<I, S>(&mut self, position: Point, prompt: impl Into<String>, options: I) -> NodeId
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = self.insert_node(NodeKind::Choice, position, true, options);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.text = prompt.into();
        }
        id
    }

    pub fn add_custom_node<I, S>(&mut self, position: Point, movable: bool, slots: I) -> NodeId
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert_node(NodeKind::Custom, position, movable, slots)
    }

    // === Lookup ===

    /// Live node by id. Detached and destroyed nodes are not visible here.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes
            .get(&id)
            .filter(|n| n.lifecycle == NodeLifecycle::Live)
    }

    /// Capability query: the node if it is live and may be dragged.
    pub fn movable_node(&self, id: NodeId) -> Option<&Node> {
        self.node(id).filter(|n| n.movable)
    }

    /// Where `id` is in its lifecycle. Ids this graph never handed out are
    /// reported as [`GraphError::NodeNotFound`].
    pub fn lifecycle(&self, id: NodeId) -> Result<NodeLifecycle, GraphError> {
        match self.nodes.get(&id) {
            Some(node) => Ok(node.lifecycle),
            None if id.0 >= 1 && id.0 < self.next_id => Ok(NodeLifecycle::Destroyed),
            None => Err(GraphError::NodeNotFound(id)),
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Live node ids back-to-front.
    pub fn node_ids(&self) -> &[NodeId] {
        &self.order
    }

    /// Live nodes back-to-front.
    pub fn nodes(&self) -> impl DoubleEndedIterator<Item = &Node> + '_ {
        self.order.iter().filter_map(move |id| self.nodes.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.node(id.node)?.connection(id.slot)
    }

    /// Like [`connection`](Self::connection), but says why the handle is invalid.
    pub fn require_connection(&self, id: ConnectionId) -> Result<&Connection, GraphError> {
        self.check_slot(id)?;
        Ok(&self.live_node(id.node)?.connections[id.slot])
    }

    /// Like [`node`](Self::node), but says why the handle is not live.
    pub fn require_node(&self, id: NodeId) -> Result<&Node, GraphError> {
        self.live_node(id)
    }

    fn live_node(&self, id: NodeId) -> Result<&Node, GraphError> {
        match self.nodes.get(&id) {
            Some(node) if node.lifecycle == NodeLifecycle::Live => Ok(node),
            Some(_) => Err(GraphError::NodeDetached(id)),
            None => Err(GraphError::NodeNotFound(id)),
        }
    }

    fn live_node_mut(&mut self, id: NodeId) -> Result<&mut Node, GraphError> {
        match self.nodes.get_mut(&id) {
            Some(node) if node.lifecycle == NodeLifecycle::Live => Ok(node),
            Some(_) => Err(GraphError::NodeDetached(id)),
            None => Err(GraphError::NodeNotFound(id)),
        }
    }

    fn check_slot(&self, id: ConnectionId) -> Result<(), GraphError> {
        let slots = self.live_node(id.node)?.slot_count();
        if id.slot >= slots {
            return Err(GraphError::SlotOutOfRange {
                node: id.node,
                slot: id.slot,
                slots,
            });
        }
        Ok(())
    }

    // === Mutation ===

    /// Point a connection at `destination` (or disconnect it with `None`).
    ///
    /// Removes the connection from the old destination's receivers, adds it to
    /// the new one's, recomputes the cable and schedules a repaint of the source.
    pub fn set_destination(
        &mut self,
        connection: ConnectionId,
        destination: Option<NodeId>,
    ) -> Result<(), GraphError> {
        self.check_slot(connection)?;
        let source_pos = self.live_node(connection.node)?.position;
        let destination_pos = match destination {
            Some(dest) => Some(self.live_node(dest)?.position),
            None => None,
        };

        let old = self.nodes[&connection.node].connections[connection.slot].destination;
        if let Some(old) = old {
            if let Some(old_node) = self.nodes.get_mut(&old) {
                old_node.receivers.remove(&connection);
            }
        }

        let path = geometry::connection_path(&self.config, source_pos, connection.slot, destination_pos);
        let conn = &mut self.live_node_mut(connection.node)?.connections[connection.slot];
        conn.destination = destination;
        conn.path = path;
        conn.stale = false;
        self.repaint.insert(connection.node);

        if let Some(dest) = destination {
            self.live_node_mut(dest)?.receivers.insert(connection);
            self.repaint.insert(dest);
        }
        if let Some(old) = old {
            self.repaint.insert(old);
        }

        trace!(%connection, ?old, new = ?destination, "connection rewired");
        Ok(())
    }

    /// Move a node. Cables touching it are marked stale and refreshed lazily.
    pub fn set_position(&mut self, id: NodeId, position: Point) -> Result<(), GraphError> {
        let node = self.live_node_mut(id)?;
        if node.position == position {
            return Ok(());
        }
        node.position = position;
        for conn in node.connections.iter_mut() {
            if conn.destination.is_some() {
                conn.stale = true;
            }
        }
        let receivers: Vec<ConnectionId> = node.receivers.iter().copied().collect();

        self.repaint.insert(id);
        for receiver in receivers {
            if let Some(conn) = self
                .nodes
                .get_mut(&receiver.node)
                .and_then(|n| n.connections.get_mut(receiver.slot))
            {
                conn.stale = true;
            }
            self.repaint.insert(receiver.node);
        }
        Ok(())
    }

    pub fn set_movable(&mut self, id: NodeId, movable: bool) -> Result<(), GraphError> {
        self.live_node_mut(id)?.movable = movable;
        Ok(())
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<(), GraphError> {
        self.live_node_mut(id)?.text = text.into();
        self.repaint.insert(id);
        Ok(())
    }

    // === Lifecycle ===

    /// Take a fully unwired node out of the scene, keeping its data.
    ///
    /// Returns the node's former z-index so it can be re-attached in place.
    pub fn detach_node(&mut self, id: NodeId) -> Result<usize, GraphError> {
        let node = self.live_node_mut(id)?;
        if let Some(conn) = node.connections.iter().find(|c| c.destination.is_some()) {
            return Err(GraphError::InconsistentWiring {
                connection: conn.id(),
                detail: "detaching a node whose slot is still connected".into(),
            });
        }
        if let Some(receiver) = node.receivers.iter().next() {
            return Err(GraphError::InconsistentWiring {
                connection: *receiver,
                detail: "detaching a node that is still a destination".into(),
            });
        }
        node.lifecycle = NodeLifecycle::Detached;

        let index = self.order.iter().position(|n| *n == id).unwrap_or(self.order.len());
        self.order.retain(|n| *n != id);
        self.repaint.remove(&id);
        debug!(node = %id, index, "node detached");
        Ok(index)
    }

    /// Put a detached node back into the scene at z-index `index`.
    pub fn reattach_node(&mut self, id: NodeId, index: usize) -> Result<(), GraphError> {
        let node = self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))?;
        if node.lifecycle != NodeLifecycle::Detached {
            return Ok(());
        }
        node.lifecycle = NodeLifecycle::Live;
        let index = index.min(self.order.len());
        self.order.insert(index, id);
        self.repaint.insert(id);
        debug!(node = %id, index, "node re-attached");
        Ok(())
    }

    /// Free a detached node. Its handle resolves to `Destroyed` from now on.
    pub fn destroy_node(&mut self, id: NodeId) -> Result<(), GraphError> {
        match self.lifecycle(id)? {
            NodeLifecycle::Detached => {
                self.nodes.remove(&id);
                debug!(node = %id, "node destroyed");
                Ok(())
            }
            NodeLifecycle::Live => Err(GraphError::NodeLive(id)),
            NodeLifecycle::Destroyed => Err(GraphError::NodeNotFound(id)),
        }
    }

    // === Paths and bounds ===

    fn compute_path(&self, connection: &Connection) -> CablePath {
        let source = match self.nodes.get(&connection.source) {
            Some(node) => node.position,
            None => return CablePath::Empty,
        };
        let destination = connection
            .destination
            .and_then(|d| self.nodes.get(&d))
            .map(|n| n.position);
        geometry::connection_path(&self.config, source, connection.slot, destination)
    }

    /// Current cable of a connection, computed on the fly when stale.
    pub fn cable(&self, id: ConnectionId) -> CablePath {
        match self.connection(id) {
            Some(conn) if conn.stale => self.compute_path(conn),
            Some(conn) => conn.path,
            None => CablePath::Empty,
        }
    }

    /// Recompute stale cables owned by `id`. Returns how many were refreshed.
    pub fn refresh_paths(&mut self, id: NodeId) -> usize {
        let Some(node) = self.node(id) else {
            return 0;
        };
        let fresh: Vec<(usize, CablePath)> = node
            .connections
            .iter()
            .filter(|c| c.stale)
            .map(|c| (c.slot, self.compute_path(c)))
            .collect();

        let count = fresh.len();
        if let Some(node) = self.nodes.get_mut(&id) {
            for (slot, path) in fresh {
                let conn = &mut node.connections[slot];
                conn.path = path;
                conn.stale = false;
            }
        }
        if count > 0 {
            trace!(node = %id, count, "cables refreshed");
        }
        count
    }

    /// Local bounds of a live node, grown to cover every cable anchored to it.
    pub fn node_bounds(&self, id: NodeId) -> Option<Rect> {
        let node = self.node(id)?;
        let outgoing = node.connections.iter().map(|c| self.cable(c.id()));
        let incoming = node.receivers.iter().map(|r| {
            let offset = self
                .nodes
                .get(&r.node)
                .map(|src| src.position - node.position)
                .unwrap_or_default();
            self.cable(*r).translated(offset)
        });
        Some(geometry::node_bounds(&self.config, node.slot_count(), outgoing, incoming))
    }

    /// Clickable outline of a live node in scene coordinates.
    pub fn scene_shape(&self, id: NodeId) -> Option<Rect> {
        let node = self.node(id)?;
        Some(geometry::node_shape(&self.config, node.slot_count()).translated(node.position))
    }

    /// Union of every live node's bounds in scene coordinates.
    pub fn items_bounding_rect(&self) -> Option<Rect> {
        self.order
            .iter()
            .filter_map(|id| {
                let pos = self.nodes.get(id)?.position;
                Some(self.node_bounds(*id)?.translated(pos))
            })
            .reduce(|acc, r| acc.united(&r))
    }

    /// Scrollable canvas area for a viewport, padded around the contents.
    pub fn scene_rect(&self, viewport: Rect) -> Rect {
        let trailing = self.config.scene_trailing_padding;
        let pad = self.config.scene_padding;
        let view = viewport.padded(0.0, 0.0, trailing, 0.1);
        match self.items_bounding_rect() {
            Some(items) => view.united(&items.padded(pad, pad, trailing, pad)),
            None => view,
        }
    }

    /// Nodes whose cables or outlines changed since the last call.
    pub fn take_repaint_requests(&mut self) -> Vec<NodeId> {
        let nodes = &self.nodes;
        let mut ids: Vec<NodeId> = self
            .repaint
            .drain()
            .filter(|id| nodes.get(id).is_some_and(|n| n.lifecycle == NodeLifecycle::Live))
            .collect();
        ids.sort();
        ids
    }

    // === Inspection ===

    pub fn snapshot(&self) -> GraphSnapshot {
        let nodes = self
            .nodes()
            .map(|n| {
                (
                    n.id,
                    NodeSnapshot {
                        kind: n.kind,
                        position: n.position,
                        movable: n.movable,
                        text: n.text.clone(),
                        slots: n
                            .connections
                            .iter()
                            .map(|c| (c.name.clone(), c.destination))
                            .collect(),
                        receivers: n.receivers.iter().copied().collect(),
                    },
                )
            })
            .collect();
        GraphSnapshot { nodes }
    }

    /// Verify that every connection and every receiver entry agree.
    pub fn check_consistency(&self) -> Result<(), GraphError> {
        for node in self.nodes.values() {
            for conn in &node.connections {
                let Some(dest) = conn.destination else {
                    continue;
                };
                if node.lifecycle != NodeLifecycle::Live {
                    return Err(GraphError::InconsistentWiring {
                        connection: conn.id(),
                        detail: format!("detached source still points at {dest}"),
                    });
                }
                match self.nodes.get(&dest) {
                    Some(d) if d.lifecycle == NodeLifecycle::Live && d.receivers.contains(&conn.id()) => {}
                    Some(d) if d.lifecycle != NodeLifecycle::Live => {
                        return Err(GraphError::InconsistentWiring {
                            connection: conn.id(),
                            detail: format!("destination {dest} is not live"),
                        })
                    }
                    Some(_) => {
                        return Err(GraphError::InconsistentWiring {
                            connection: conn.id(),
                            detail: format!("{dest} is missing the receiver entry"),
                        })
                    }
                    None => {
                        return Err(GraphError::InconsistentWiring {
                            connection: conn.id(),
                            detail: format!("destination {dest} does not exist"),
                        })
                    }
                }
            }
            for receiver in &node.receivers {
                let points_here = self
                    .nodes
                    .get(&receiver.node)
                    .and_then(|src| src.connections.get(receiver.slot))
                    .map(|c| c.destination == Some(node.id))
                    .unwrap_or(false);
                if !points_here {
                    return Err(GraphError::InconsistentWiring {
                        connection: *receiver,
                        detail: format!("{} lists a receiver that points elsewhere", node.id),
                    });
                }
            }
        }
        Ok(())
    }
}
