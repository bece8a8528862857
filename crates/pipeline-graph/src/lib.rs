//! Pipeline Graph - the editing core of the Mammoth pipeline designer
//!
//! This crate models recommender-system and computer-vision pipelines as
//! directed graphs of catalog components. It provides:
//!
//! - A typed component catalog with per-block config schemas
//! - Type-based connection validation and whole-graph diagnostics
//! - A graph store owning node and edge lifetimes
//! - Deterministic edge attachment geometry
//! - JSON documents, auto-save behind a pluggable adapter, and templates
//! - Compressed snapshot-based undo/redo
//!
//! # Architecture
//!
//! - `Catalog`: Registry of component types and what they accept/produce
//! - `GraphStore`: Structural integrity only (IDs, self loops, cascades)
//! - `EditorSession`: The single mutator; validates, snapshots, emits, auto-saves
//! - `PersistenceAdapter` / `EventSink`: Seams for storage and host notification
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use pipeline_graph::{Catalog, DesignerConfig, EditorSession, MemoryPersistence};
//!
//! let mut session = EditorSession::new(
//!     Arc::new(Catalog::builtin()),
//!     Box::new(MemoryPersistence::new()),
//!     DesignerConfig::default(),
//! );
//! session.load_template("collaborative-filtering")?;
//! assert!(session.diagnostics().is_empty());
//! ```

pub mod catalog;
pub mod config;
pub mod document;
pub mod error;
pub mod events;
pub mod geometry;
pub mod persistence;
pub mod session;
pub mod store;
pub mod templates;
pub mod types;
pub mod undo;
pub mod validation;

// Re-export key types
pub use catalog::{Accepts, Catalog, Category, ComponentType, ConfigField, ConfigIssue, ConfigKind, DataTag};
pub use config::{ConfigError, DesignerConfig};
pub use document::GraphDocument;
pub use error::{GraphError, Result};
pub use events::{EventSink, GraphEvent, LogEventSink, NullEventSink, VecEventSink};
pub use geometry::{EdgeEnd, Footprint, Point, Side};
pub use persistence::{FilePersistence, MemoryPersistence, PersistenceAdapter, UiState};
pub use session::{ConnectOutcome, EditorSession, LoadOutcome};
pub use store::{EdgeInsert, GraphStore};
pub use templates::{GridLayout, WorkflowTemplate};
pub use types::{ConfigMap, Edge, EdgeId, GraphContents, NewNode, Node, NodeId, NodePatch, Position};
pub use undo::{HistoryEntry, UndoHistory};
pub use validation::{is_valid_connection, validate_graph, ConnectionRejection, ValidationError};
