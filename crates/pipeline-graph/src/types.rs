//! Core types for pipeline graphs
//!
//! These types define the placed components (nodes) and the connections
//! (edges) between them, in the shape they are persisted.

use serde::{Deserialize, Serialize};

/// Unique identifier for a node
pub type NodeId = String;

/// Unique identifier for an edge
pub type EdgeId = String;

/// Per-node configuration, schema defined by the component type
pub type ConfigMap = serde_json::Map<String, serde_json::Value>;

/// A point in canvas coordinate space (not screen pixels)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Position {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// A placed component instance on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier for this node instance
    pub id: NodeId,
    /// Component type (references a catalog entry)
    #[serde(rename = "type")]
    pub component_type: String,
    /// Top-left corner of the node in canvas space
    pub position: Position,
    /// Display label, copied from the catalog at placement time
    #[serde(default)]
    pub label: String,
    /// Instance configuration
    #[serde(default)]
    pub config: ConfigMap,
}

/// A directed connection from one node's output to another node's input
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Deterministic identifier, see [`edge_id`]
    pub id: EdgeId,
    /// Source node ID
    pub from: NodeId,
    /// Target node ID
    pub to: NodeId,
}

impl Edge {
    /// Create an edge with its derived ID
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        let from = from.into();
        let to = to.into();
        Self {
            id: edge_id(&from, &to),
            from,
            to,
        }
    }

    /// Check whether this edge touches the given node
    pub fn touches(&self, node_id: &str) -> bool {
        self.from == node_id || self.to == node_id
    }
}

/// Derive the edge ID for a (from, to) pair.
///
/// Duplicate detection is an identity check on this value.
pub fn edge_id(from: &str, to: &str) -> EdgeId {
    format!("{}-{}", from, to)
}

/// Fields of a node that are chosen by the caller when placing it
#[derive(Debug, Clone, PartialEq)]
pub struct NewNode {
    pub component_type: String,
    pub position: Position,
    pub label: String,
    pub config: ConfigMap,
}

impl NewNode {
    pub fn new(component_type: impl Into<String>, position: impl Into<Position>) -> Self {
        Self {
            component_type: component_type.into(),
            position: position.into(),
            label: String::new(),
            config: ConfigMap::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_config(mut self, config: ConfigMap) -> Self {
        self.config = config;
        self
    }
}

/// Partial update merged into an existing node
///
/// `None` fields are left untouched. Config entries are merged key by key,
/// a `Null` value removes the key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub position: Option<Position>,
    pub label: Option<String>,
    pub config: Option<ConfigMap>,
}

impl NodePatch {
    pub fn position(position: impl Into<Position>) -> Self {
        Self {
            position: Some(position.into()),
            ..Self::default()
        }
    }

    pub fn config(config: ConfigMap) -> Self {
        Self {
            config: Some(config),
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub(crate) fn apply(self, node: &mut Node) {
        if let Some(position) = self.position {
            node.position = position;
        }
        if let Some(label) = self.label {
            node.label = label;
        }
        if let Some(config) = self.config {
            for (key, value) in config {
                if value.is_null() {
                    node.config.remove(&key);
                } else {
                    node.config.insert(key, value);
                }
            }
        }
    }
}

/// Raw node and edge arrays, as held by a store or decoded from a document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphContents {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl GraphContents {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_edge_id_is_derived() {
        let edge = Edge::new("node-1", "node-2");
        assert_eq!(edge.id, "node-1-node-2");
        assert!(edge.touches("node-1"));
        assert!(edge.touches("node-2"));
        assert!(!edge.touches("node-3"));
    }

    #[test]
    fn test_node_serializes_with_type_key() {
        let node = Node {
            id: "node-1".to_string(),
            component_type: "split".to_string(),
            position: Position::new(10.0, 20.0),
            label: "Train/Test Split".to_string(),
            config: ConfigMap::new(),
        };

        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["type"], "split");
        assert_eq!(value["position"], json!({"x": 10.0, "y": 20.0}));
    }

    #[test]
    fn test_patch_merges_config() {
        let mut node = Node {
            id: "node-1".to_string(),
            component_type: "split".to_string(),
            position: Position::default(),
            label: "Split".to_string(),
            config: json!({"test_size": 0.2, "method": "random"})
                .as_object()
                .cloned()
                .unwrap(),
        };

        let patch = json!({"test_size": 0.3, "method": null});
        NodePatch::config(patch.as_object().cloned().unwrap())
            .with_label("Holdout")
            .apply(&mut node);

        assert_eq!(node.config.get("test_size"), Some(&json!(0.3)));
        assert!(!node.config.contains_key("method"));
        assert_eq!(node.label, "Holdout");
        assert_eq!(node.position, Position::default());
    }
}
