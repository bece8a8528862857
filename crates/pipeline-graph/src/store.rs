//! In-memory graph store
//!
//! A flat mutable collection of nodes and edges. The store enforces
//! structural integrity (generated node IDs, no self loops, no duplicate
//! edges, no dangling endpoints, cascading node removal) but not semantic
//! legality: callers consult the connection validator before [`GraphStore::add_edge`].

use crate::types::{Edge, EdgeId, GraphContents, NewNode, Node, NodeId, NodePatch};

/// Result of an edge insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeInsert {
    /// A new edge was appended
    Added(EdgeId),
    /// An edge with the same (from, to) pair already exists; nothing changed
    AlreadyPresent(EdgeId),
    /// Source and target are the same node
    SelfLoop,
    /// The named endpoint is not in the store
    MissingEndpoint(NodeId),
    /// A different pair already owns the derived ID (`a-b`->`c` vs `a`->`b-c`)
    IdCollision(EdgeId),
}

impl EdgeInsert {
    /// ID of the edge now connecting the pair, if any
    pub fn edge_id(&self) -> Option<&str> {
        match self {
            EdgeInsert::Added(id) | EdgeInsert::AlreadyPresent(id) => Some(id),
            _ => None,
        }
    }
}

/// A node removed from the store together with the edges that touched it
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedNode {
    pub node: Node,
    pub edges: Vec<Edge>,
}

/// Owner of node and edge lifetimes for one editing session
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    /// Last issued node number
    counter: u64,
}

impl GraphStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given contents
    pub fn from_contents(contents: GraphContents) -> Self {
        let mut store = Self::new();
        store.replace(contents);
        store
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    /// Place a node, returning its generated ID
    pub fn add_node(&mut self, new: NewNode) -> NodeId {
        let id = self.next_node_id();
        log::debug!("Adding node '{}' ({})", id, new.component_type);
        self.nodes.push(Node {
            id: id.clone(),
            component_type: new.component_type,
            position: new.position,
            label: new.label,
            config: new.config,
        });
        id
    }

    /// Merge fields into an existing node
    ///
    /// Returns false (and changes nothing) if the node does not exist.
    pub fn update_node(&mut self, id: &str, patch: NodePatch) -> bool {
        match self.nodes.iter_mut().find(|n| n.id == id) {
            Some(node) => {
                patch.apply(node);
                true
            }
            None => false,
        }
    }

    /// Remove a node and every edge where it is the source or the target
    pub fn remove_node(&mut self, id: &str) -> Option<RemovedNode> {
        let pos = self.nodes.iter().position(|n| n.id == id)?;
        let node = self.nodes.remove(pos);

        let (removed, kept): (Vec<Edge>, Vec<Edge>) = std::mem::take(&mut self.edges)
            .into_iter()
            .partition(|e| e.touches(id));
        self.edges = kept;

        log::debug!("Removed node '{}' and {} edge(s)", id, removed.len());
        Some(RemovedNode {
            node,
            edges: removed,
        })
    }

    /// Find a node by ID
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Check if a node exists
    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    // =========================================================================
    // Edges
    // =========================================================================

    /// Connect two nodes
    ///
    /// Idempotent: a second call with the same pair leaves one edge. Does not
    /// consult the connection validator.
    pub fn add_edge(&mut self, from: &str, to: &str) -> EdgeInsert {
        if from == to {
            log::warn!("Refusing self-loop on node '{}'", from);
            return EdgeInsert::SelfLoop;
        }
        for endpoint in [from, to] {
            if !self.contains_node(endpoint) {
                log::warn!("Refusing edge {} -> {}: node '{}' not found", from, to, endpoint);
                return EdgeInsert::MissingEndpoint(endpoint.to_string());
            }
        }

        let edge = Edge::new(from, to);
        if let Some(existing) = self.edge(&edge.id) {
            if existing.from == edge.from && existing.to == edge.to {
                return EdgeInsert::AlreadyPresent(edge.id);
            }
            log::warn!(
                "Refusing edge {} -> {}: ID '{}' already used by {} -> {}",
                from,
                to,
                edge.id,
                existing.from,
                existing.to
            );
            return EdgeInsert::IdCollision(edge.id);
        }

        let id = edge.id.clone();
        self.edges.push(edge);
        EdgeInsert::Added(id)
    }

    /// Remove an edge by ID
    pub fn remove_edge(&mut self, id: &str) -> Option<Edge> {
        let pos = self.edges.iter().position(|e| e.id == id)?;
        Some(self.edges.remove(pos))
    }

    /// Find an edge by ID
    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// All edges in insertion order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Get edges coming into a node
    pub fn incoming<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.to == node_id)
    }

    /// Get edges going out of a node
    pub fn outgoing<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.from == node_id)
    }

    /// IDs of the nodes feeding this node
    pub fn upstream(&self, node_id: &str) -> Vec<NodeId> {
        self.incoming(node_id).map(|e| e.from.clone()).collect()
    }

    /// IDs of the nodes fed by this node
    pub fn downstream(&self, node_id: &str) -> Vec<NodeId> {
        self.outgoing(node_id).map(|e| e.to.clone()).collect()
    }

    // =========================================================================
    // Bulk operations
    // =========================================================================

    /// Empty both collections in one step
    pub fn clear(&mut self) {
        self.replace(GraphContents::default());
    }

    /// Replace the whole graph in one step (load is a replace, never a merge)
    ///
    /// Contents are trusted as given: duplicate IDs or dangling edges survive
    /// and are left to the diagnostics.
    pub fn replace(&mut self, contents: GraphContents) {
        let GraphContents { nodes, edges } = contents;
        self.counter = nodes
            .iter()
            .filter_map(|n| generated_number(&n.id))
            .max()
            .unwrap_or(0);
        self.nodes = nodes;
        self.edges = edges;
    }

    /// Copy of the current nodes and edges
    pub fn contents(&self) -> GraphContents {
        GraphContents {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    fn next_node_id(&mut self) -> NodeId {
        loop {
            let Some(next) = self.counter.checked_add(1) else {
                return self.first_free_id();
            };
            self.counter = next;
            let id = format!("node-{}", self.counter);
            if !self.contains_node(&id) {
                return id;
            }
        }
    }

    /// Lowest unused `node-<n>`, once the counter is exhausted
    fn first_free_id(&self) -> NodeId {
        let mut n: u64 = 1;
        loop {
            let id = format!("node-{}", n);
            if !self.contains_node(&id) {
                return id;
            }
            n += 1;
        }
    }
}

/// Number embedded in an ID issued by this store (`node-<n>`)
fn generated_number(id: &str) -> Option<u64> {
    id.strip_prefix("node-")?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;

    fn store_with(n: usize) -> (GraphStore, Vec<NodeId>) {
        let mut store = GraphStore::new();
        let ids = (0..n)
            .map(|i| store.add_node(NewNode::new("split", (i as f64 * 100.0, 0.0))))
            .collect();
        (store, ids)
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let (store, ids) = store_with(3);
        assert_eq!(ids, vec!["node-1", "node-2", "node-3"]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_idempotent_edge_insertion() {
        let (mut store, ids) = store_with(2);

        let first = store.add_edge(&ids[0], &ids[1]);
        let second = store.add_edge(&ids[0], &ids[1]);

        assert_eq!(first, EdgeInsert::Added("node-1-node-2".to_string()));
        assert_eq!(second, EdgeInsert::AlreadyPresent("node-1-node-2".to_string()));
        assert_eq!(store.edges().len(), 1);
        assert_eq!(store.edges()[0].id, "node-1-node-2");
    }

    #[test]
    fn test_reverse_edge_is_distinct() {
        let (mut store, ids) = store_with(2);
        store.add_edge(&ids[0], &ids[1]);
        store.add_edge(&ids[1], &ids[0]);
        assert_eq!(store.edges().len(), 2);
    }

    #[test]
    fn test_structural_rejections() {
        let (mut store, ids) = store_with(1);
        assert_eq!(store.add_edge(&ids[0], &ids[0]), EdgeInsert::SelfLoop);
        assert_eq!(
            store.add_edge(&ids[0], "node-99"),
            EdgeInsert::MissingEndpoint("node-99".to_string())
        );
        assert!(store.edges().is_empty());
    }

    #[test]
    fn test_cascade_delete() {
        let (mut store, ids) = store_with(4);
        store.add_edge(&ids[0], &ids[1]);
        store.add_edge(&ids[1], &ids[2]);
        store.add_edge(&ids[3], &ids[1]);
        store.add_edge(&ids[2], &ids[3]);

        let removed = store.remove_node(&ids[1]).unwrap();

        assert_eq!(removed.node.id, ids[1]);
        assert_eq!(removed.edges.len(), 3);
        assert!(store.edges().iter().all(|e| !e.touches(&ids[1])));
        assert_eq!(store.edges().len(), 1);
        assert_eq!(store.edges()[0].id, "node-3-node-4");
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let (mut store, _) = store_with(1);
        assert!(store.remove_node("node-42").is_none());
        assert!(store.remove_edge("node-1-node-42").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_node() {
        let (mut store, ids) = store_with(1);
        assert!(store.update_node(&ids[0], NodePatch::position((5.0, 6.0))));
        assert_eq!(store.node(&ids[0]).unwrap().position, Position::new(5.0, 6.0));
        assert!(!store.update_node("node-404", NodePatch::position((0.0, 0.0))));
    }

    #[test]
    fn test_neighbours() {
        let (mut store, ids) = store_with(3);
        store.add_edge(&ids[0], &ids[2]);
        store.add_edge(&ids[1], &ids[2]);
        assert_eq!(store.upstream(&ids[2]), vec!["node-1", "node-2"]);
        assert_eq!(store.downstream(&ids[0]), vec!["node-3"]);
    }

    #[test]
    fn test_clear_empties_both() {
        let (mut store, ids) = store_with(2);
        store.add_edge(&ids[0], &ids[1]);
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.add_node(NewNode::new("split", (0.0, 0.0))), "node-1");
    }

    #[test]
    fn test_replace_advances_counter_past_loaded_ids() {
        let mut store = GraphStore::new();
        let mut contents = GraphContents::default();
        for id in ["node-7", "custom", "node-3"] {
            contents.nodes.push(Node {
                id: id.to_string(),
                component_type: "split".to_string(),
                position: Position::default(),
                label: String::new(),
                config: Default::default(),
            });
        }
        store.replace(contents);

        let id = store.add_node(NewNode::new("split", (0.0, 0.0)));
        assert_eq!(id, "node-8");
    }

    fn loaded_node(id: &str) -> Node {
        Node {
            id: id.to_string(),
            component_type: "split".to_string(),
            position: Position::default(),
            label: String::new(),
            config: Default::default(),
        }
    }

    #[test]
    fn test_counter_at_max_falls_back_to_free_id() {
        let mut store = GraphStore::new();
        let max = format!("node-{}", u64::MAX);
        store.replace(GraphContents {
            nodes: vec![loaded_node(&max), loaded_node("node-1")],
            edges: Vec::new(),
        });

        let first = store.add_node(NewNode::new("split", (0.0, 0.0)));
        let second = store.add_node(NewNode::new("split", (0.0, 0.0)));

        assert_eq!(first, "node-2");
        assert_eq!(second, "node-3");
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_colliding_edge_ids_are_refused() {
        let mut store = GraphStore::new();
        store.replace(GraphContents {
            nodes: ["a-b", "c", "a", "b-c"].into_iter().map(loaded_node).collect(),
            edges: Vec::new(),
        });

        assert_eq!(store.add_edge("a-b", "c"), EdgeInsert::Added("a-b-c".to_string()));
        assert_eq!(store.add_edge("a", "b-c"), EdgeInsert::IdCollision("a-b-c".to_string()));
        assert_eq!(store.add_edge("a-b", "c"), EdgeInsert::AlreadyPresent("a-b-c".to_string()));
        assert_eq!(store.edges().len(), 1);
        assert_eq!(store.edges()[0].from, "a-b");
    }
}
