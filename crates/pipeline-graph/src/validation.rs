//! Connection validation and graph diagnostics
//!
//! [`is_valid_connection`] is the gate the editor consults before adding an
//! edge. [`validate_graph`] checks a whole graph (typically one just loaded
//! from a file or expanded from a template) and reports every problem found.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::catalog::{Catalog, ConfigIssue, DataTag};
use crate::types::{Edge, GraphContents};

/// Why a proposed connection was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionRejection {
    /// Source component type is not in the catalog
    UnknownSource(String),
    /// Target component type is not in the catalog
    UnknownTarget(String),
    /// Target does not accept what the source produces
    Incompatible {
        source_type: String,
        target_type: String,
        produces: DataTag,
    },
}

impl std::fmt::Display for ConnectionRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownSource(t) => write!(f, "Unknown source component type '{}'", t),
            Self::UnknownTarget(t) => write!(f, "Unknown target component type '{}'", t),
            Self::Incompatible {
                source_type,
                target_type,
                produces,
            } => write!(
                f,
                "'{}' does not accept '{}' produced by '{}'",
                target_type, produces, source_type
            ),
        }
    }
}

/// Decide whether an edge from a `from_type` node to a `to_type` node is legal
///
/// The target is resolved first, so a connection where both ends are unknown
/// is reported against the target.
pub fn check_connection(
    catalog: &Catalog,
    from_type: &str,
    to_type: &str,
) -> Result<(), ConnectionRejection> {
    let target = catalog
        .lookup(to_type)
        .map_err(|_| ConnectionRejection::UnknownTarget(to_type.to_string()))?;
    let source = catalog
        .lookup(from_type)
        .map_err(|_| ConnectionRejection::UnknownSource(from_type.to_string()))?;

    if target.accepts.admits(&source.produces) {
        Ok(())
    } else {
        Err(ConnectionRejection::Incompatible {
            source_type: from_type.to_string(),
            target_type: to_type.to_string(),
            produces: source.produces.clone(),
        })
    }
}

/// Boolean form of [`check_connection`]
pub fn is_valid_connection(catalog: &Catalog, from_type: &str, to_type: &str) -> bool {
    check_connection(catalog, from_type, to_type).is_ok()
}

/// Validation error with location context
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Two nodes share an ID
    DuplicateNodeId { node_id: String },
    /// An edge references a non-existent node
    UnknownNode { edge_id: String, node_id: String },
    /// An edge connects a node to itself
    SelfLoop { edge_id: String },
    /// A node has an unknown type (not in catalog)
    UnknownComponentType { node_id: String, component_type: String },
    /// An edge connects incompatible component types
    IncompatibleConnection {
        edge_id: String,
        rejection: ConnectionRejection,
    },
    /// Cycle detected in the graph
    CycleDetected,
    /// A node that needs upstream data has no incoming edge
    UnconnectedInput { node_id: String },
    /// A node's configuration does not satisfy its schema
    InvalidConfig { node_id: String, issue: ConfigIssue },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateNodeId { node_id } => write!(f, "Duplicate node ID '{}'", node_id),
            Self::UnknownNode { edge_id, node_id } => {
                write!(f, "Edge '{}' references unknown node '{}'", edge_id, node_id)
            }
            Self::SelfLoop { edge_id } => write!(f, "Edge '{}' connects a node to itself", edge_id),
            Self::UnknownComponentType {
                node_id,
                component_type,
            } => write!(
                f,
                "Unknown component type '{}' for node '{}'",
                component_type, node_id
            ),
            Self::IncompatibleConnection { edge_id, rejection } => {
                write!(f, "Edge '{}': {}", edge_id, rejection)
            }
            Self::CycleDetected => write!(f, "Cycle detected in graph"),
            Self::UnconnectedInput { node_id } => {
                write!(f, "Node '{}' has no incoming connection", node_id)
            }
            Self::InvalidConfig { node_id, issue } => write!(f, "Node '{}': {}", node_id, issue),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate a whole pipeline graph
///
/// Returns all validation errors found (not just the first).
pub fn validate_graph(graph: &GraphContents, catalog: &Catalog) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    detect_duplicate_ids(graph, &mut errors);
    validate_edge_references(graph, &mut errors);
    validate_component_types(graph, catalog, &mut errors);
    validate_connections(graph, catalog, &mut errors);
    detect_cycles(graph, &mut errors);
    validate_inputs_connected(graph, catalog, &mut errors);
    validate_configs(graph, catalog, &mut errors);

    errors
}

fn detect_duplicate_ids(graph: &GraphContents, errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for node in &graph.nodes {
        if !seen.insert(node.id.as_str()) && reported.insert(node.id.as_str()) {
            errors.push(ValidationError::DuplicateNodeId {
                node_id: node.id.clone(),
            });
        }
    }
}

/// Check that all edge endpoints exist and differ
fn validate_edge_references(graph: &GraphContents, errors: &mut Vec<ValidationError>) {
    let node_ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();

    for edge in &graph.edges {
        if edge.from == edge.to {
            errors.push(ValidationError::SelfLoop {
                edge_id: edge.id.clone(),
            });
        }
        for endpoint in [&edge.from, &edge.to] {
            if !node_ids.contains(endpoint.as_str()) {
                errors.push(ValidationError::UnknownNode {
                    edge_id: edge.id.clone(),
                    node_id: endpoint.clone(),
                });
            }
        }
    }
}

fn validate_component_types(
    graph: &GraphContents,
    catalog: &Catalog,
    errors: &mut Vec<ValidationError>,
) {
    for node in &graph.nodes {
        if !catalog.contains(&node.component_type) {
            errors.push(ValidationError::UnknownComponentType {
                node_id: node.id.clone(),
                component_type: node.component_type.clone(),
            });
        }
    }
}

/// Re-run the connection validator over every edge whose endpoints resolve
///
/// Unknown endpoints and unknown types are already reported elsewhere.
fn validate_connections(
    graph: &GraphContents,
    catalog: &Catalog,
    errors: &mut Vec<ValidationError>,
) {
    let types: HashMap<&str, &str> = graph
        .nodes
        .iter()
        .map(|n| (n.id.as_str(), n.component_type.as_str()))
        .collect();

    for edge in &graph.edges {
        let (Some(from_type), Some(to_type)) =
            (types.get(edge.from.as_str()), types.get(edge.to.as_str()))
        else {
            continue;
        };
        if !catalog.contains(from_type) || !catalog.contains(to_type) {
            continue;
        }
        if let Err(rejection) = check_connection(catalog, from_type, to_type) {
            errors.push(ValidationError::IncompatibleConnection {
                edge_id: edge.id.clone(),
                rejection,
            });
        }
    }
}

/// Detect cycles using Kahn's algorithm (topological sort)
///
/// Edges with a dangling endpoint are ignored here.
fn detect_cycles(graph: &GraphContents, errors: &mut Vec<ValidationError>) {
    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    for node in &graph.nodes {
        in_degree.insert(&node.id, 0);
    }
    let edges: Vec<&Edge> = graph
        .edges
        .iter()
        .filter(|e| in_degree.contains_key(e.from.as_str()) && in_degree.contains_key(e.to.as_str()))
        .collect();
    for edge in &edges {
        if let Some(deg) = in_degree.get_mut(edge.to.as_str()) {
            *deg += 1;
        }
    }

    let mut queue: VecDeque<&str> = in_degree
        .iter()
        .filter(|(_, &deg)| deg == 0)
        .map(|(&id, _)| id)
        .collect();

    let mut visited = 0;
    while let Some(node_id) = queue.pop_front() {
        visited += 1;
        for edge in &edges {
            if edge.from == node_id {
                if let Some(deg) = in_degree.get_mut(edge.to.as_str()) {
                    *deg -= 1;
                    if *deg == 0 {
                        queue.push_back(&edge.to);
                    }
                }
            }
        }
    }

    if visited < in_degree.len() {
        errors.push(ValidationError::CycleDetected);
    }
}

/// Check that every non-source node receives data from somewhere
fn validate_inputs_connected(
    graph: &GraphContents,
    catalog: &Catalog,
    errors: &mut Vec<ValidationError>,
) {
    let targets: HashSet<&str> = graph.edges.iter().map(|e| e.to.as_str()).collect();

    for node in &graph.nodes {
        let Ok(component) = catalog.lookup(&node.component_type) else {
            continue;
        };
        if !component.accepts.is_source() && !targets.contains(node.id.as_str()) {
            errors.push(ValidationError::UnconnectedInput {
                node_id: node.id.clone(),
            });
        }
    }
}

fn validate_configs(graph: &GraphContents, catalog: &Catalog, errors: &mut Vec<ValidationError>) {
    for node in &graph.nodes {
        let Ok(component) = catalog.lookup(&node.component_type) else {
            continue;
        };
        for issue in component.validate_config(&node.config) {
            errors.push(ValidationError::InvalidConfig {
                node_id: node.id.clone(),
                issue,
            });
        }
    }
}
