//! Graph change events
//!
//! The editor session reports every state transition to an [`EventSink`] so
//! a host (UI bridge, logger, test) can react without polling the store.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Receiver of session events
///
/// Hosts plug in whatever transport they use (UI bridge, channel, log).
pub trait EventSink: Send + Sync {
    /// Deliver one event; fails when the receiver has gone away
    fn send(&self, event: GraphEvent) -> Result<(), EventError>;
}

/// Delivery failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    #[error("event receiver disconnected")]
    Disconnected,
}

/// Events emitted by an editing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GraphEvent {
    /// A node was placed
    #[serde(rename_all = "camelCase")]
    NodeAdded { node_id: String, component_type: String },

    /// A node's position, label or config changed
    #[serde(rename_all = "camelCase")]
    NodeUpdated { node_id: String },

    /// A node and its edges were removed
    #[serde(rename_all = "camelCase")]
    NodeRemoved {
        node_id: String,
        removed_edges: Vec<String>,
    },

    /// Placement was refused because the type is not in the catalog
    #[serde(rename_all = "camelCase")]
    UnknownComponent { component_type: String },

    /// A connection was created
    #[serde(rename_all = "camelCase")]
    EdgeAdded { edge_id: String },

    /// A connection was removed
    #[serde(rename_all = "camelCase")]
    EdgeRemoved { edge_id: String },

    /// A proposed connection was refused
    #[serde(rename_all = "camelCase")]
    ConnectionRejected {
        from: String,
        to: String,
        reason: String,
    },

    /// Selection changed
    #[serde(rename_all = "camelCase")]
    SelectionChanged { node_id: Option<String> },

    /// The graph was emptied
    GraphCleared,

    /// The graph was replaced wholesale (load, template, undo/redo)
    #[serde(rename_all = "camelCase")]
    GraphReplaced { node_count: usize, edge_count: usize },

    /// A document could not be loaded; the graph fell back to empty
    #[serde(rename_all = "camelCase")]
    LoadFailed { error: String },

    /// Auto-save could not write; editing continues
    AutoSaveFailed,
}

impl GraphEvent {
    /// Short human-readable summary, used as the undo history label
    pub fn describe(&self) -> String {
        match self {
            Self::NodeAdded { component_type, .. } => format!("Place {}", component_type),
            Self::NodeUpdated { node_id } => format!("Edit {}", node_id),
            Self::NodeRemoved { node_id, .. } => format!("Remove {}", node_id),
            Self::UnknownComponent { component_type } => {
                format!("Unknown component {}", component_type)
            }
            Self::EdgeAdded { edge_id } => format!("Connect {}", edge_id),
            Self::EdgeRemoved { edge_id } => format!("Disconnect {}", edge_id),
            Self::ConnectionRejected { from, to, .. } => format!("Reject {} -> {}", from, to),
            Self::SelectionChanged { .. } => "Select".to_string(),
            Self::GraphCleared => "Clear".to_string(),
            Self::GraphReplaced { .. } => "Load".to_string(),
            Self::LoadFailed { .. } => "Failed load".to_string(),
            Self::AutoSaveFailed => "Auto-save failed".to_string(),
        }
    }

    /// Create a connection-rejected event
    pub fn connection_rejected(from: &str, to: &str, reason: impl ToString) -> Self {
        Self::ConnectionRejected {
            from: from.to_string(),
            to: to.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Drops every event
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn send(&self, _event: GraphEvent) -> Result<(), EventError> {
        Ok(())
    }
}

/// An event sink that forwards to the log
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn send(&self, event: GraphEvent) -> Result<(), EventError> {
        match &event {
            GraphEvent::LoadFailed { .. }
            | GraphEvent::AutoSaveFailed
            | GraphEvent::ConnectionRejected { .. }
            | GraphEvent::UnknownComponent { .. } => log::warn!("{:?}", event),
            _ => log::debug!("{:?}", event),
        }
        Ok(())
    }
}

/// Keeps every event in memory, in delivery order
#[derive(Default)]
pub struct VecEventSink {
    events: Mutex<Vec<GraphEvent>>,
}

impl VecEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything delivered so far
    pub fn events(&self) -> Vec<GraphEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for VecEventSink {
    fn send(&self, event: GraphEvent) -> Result<(), EventError> {
        self.events.lock().push(event);
        Ok(())
    }
}

impl<T: EventSink + ?Sized> EventSink for std::sync::Arc<T> {
    fn send(&self, event: GraphEvent) -> Result<(), EventError> {
        (**self).send(event)
    }
}
