//! Editor session
//!
//! An [`EditorSession`] is the single mutator of one graph. It places
//! components from the catalog, gates connections through the validator,
//! and after every committed change pushes an undo snapshot, reports a
//! [`GraphEvent`] and mirrors the graph into the persistence adapter.
//!
//! Nothing here ends the session: unknown types, rejected connections,
//! corrupt documents and failed auto-saves are logged, reported as events
//! and returned as non-success outcomes.
//!
//! # Example
//!
//! ```ignore
//! let catalog = Arc::new(Catalog::builtin());
//! let mut session = EditorSession::new(catalog, Box::new(MemoryPersistence::new()), DesignerConfig::default());
//!
//! let source = session.place_node("data-source", (100.0, 100.0)).unwrap();
//! let split = session.place_node("split", (300.0, 100.0)).unwrap();
//! assert!(session.connect(&source, &split).is_connected());
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;

use crate::catalog::Catalog;
use crate::config::DesignerConfig;
use crate::document::{self, GraphDocument};
use crate::error::{GraphError, Result};
use crate::events::{EventSink, GraphEvent, LogEventSink};
use crate::geometry::{self, Point};
use crate::persistence::{auto_save_persist, auto_save_restore, PersistenceAdapter, UiState};
use crate::store::{EdgeInsert, GraphStore};
use crate::templates::{self, SkippedBlock};
use crate::types::{ConfigMap, EdgeId, GraphContents, NewNode, NodeId, NodePatch, Position};
use crate::undo::UndoHistory;
use crate::validation::{self, ConnectionRejection, ValidationError};

/// Result of a connection attempt
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectOutcome {
    /// A new edge was created
    Connected(EdgeId),
    /// The pair was already connected; nothing changed
    AlreadyConnected(EdgeId),
    /// The validator refused the pair
    Rejected(ConnectionRejection),
    /// An endpoint is not in the graph
    UnknownNode(NodeId),
    /// Source and target are the same node
    SelfLoop,
    /// Another pair of nodes already owns the derived edge ID
    IdCollision(EdgeId),
}

impl ConnectOutcome {
    /// Whether the pair is connected after the call
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected(_) | Self::AlreadyConnected(_))
    }
}

/// Result of loading a workflow document
#[derive(Debug)]
pub enum LoadOutcome {
    /// The graph was replaced with the document's contents
    Loaded { node_count: usize, edge_count: usize },
    /// The document could not be read; the graph is now empty
    Failed(GraphError),
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }
}

/// One editing session over one graph
pub struct EditorSession {
    catalog: Arc<Catalog>,
    store: GraphStore,
    selected: Option<NodeId>,
    adapter: Box<dyn PersistenceAdapter>,
    events: Box<dyn EventSink>,
    history: UndoHistory,
    ui_state: Option<UiState>,
    config: DesignerConfig,
}

impl EditorSession {
    /// Start with an empty graph
    pub fn new(
        catalog: Arc<Catalog>,
        adapter: Box<dyn PersistenceAdapter>,
        config: DesignerConfig,
    ) -> Self {
        Self::with_contents(catalog, adapter, config, GraphContents::default(), None)
    }

    /// Start from the auto-saved graph, or empty when there is none
    pub fn restore(
        catalog: Arc<Catalog>,
        adapter: Box<dyn PersistenceAdapter>,
        config: DesignerConfig,
    ) -> Self {
        let (contents, ui_state) = match auto_save_restore(adapter.as_ref()) {
            Some(record) => {
                log::info!(
                    "Restored auto-saved workflow with {} component(s)",
                    record.document.components.len()
                );
                (record.document.into_contents(), record.ui_state)
            }
            None => (GraphContents::default(), None),
        };
        Self::with_contents(catalog, adapter, config, contents, ui_state)
    }

    fn with_contents(
        catalog: Arc<Catalog>,
        adapter: Box<dyn PersistenceAdapter>,
        config: DesignerConfig,
        contents: GraphContents,
        ui_state: Option<UiState>,
    ) -> Self {
        let mut session = Self {
            catalog,
            store: GraphStore::from_contents(contents),
            selected: None,
            adapter,
            events: Box::new(LogEventSink),
            history: UndoHistory::new(config.undo_depth),
            ui_state,
            config,
        };
        session.snapshot("Open");
        session
    }

    /// Report events to `sink` instead of the log
    pub fn with_events(mut self, sink: impl EventSink + 'static) -> Self {
        self.events = Box::new(sink);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn config(&self) -> &DesignerConfig {
        &self.config
    }

    pub fn ui_state(&self) -> Option<UiState> {
        self.ui_state
    }

    /// Update the editor chrome state stored next to the graph
    pub fn set_ui_state(&mut self, ui_state: UiState) {
        self.ui_state = Some(ui_state);
        self.auto_save();
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    /// Place a component from the catalog
    ///
    /// The node starts with the catalog label and default config. Returns
    /// `None` when the type is not in the catalog.
    pub fn place_node(&mut self, component_type: &str, position: impl Into<Position>) -> Option<NodeId> {
        let component = match self.catalog.lookup(component_type) {
            Ok(component) => component,
            Err(e) => {
                log::warn!("Cannot place node: {}", e);
                self.emit(GraphEvent::UnknownComponent {
                    component_type: component_type.to_string(),
                });
                return None;
            }
        };

        let new = NewNode::new(component.id.clone(), position)
            .with_label(component.label.clone())
            .with_config(component.default_config());
        let id = self.store.add_node(new);

        self.commit(GraphEvent::NodeAdded {
            node_id: id.clone(),
            component_type: component_type.to_string(),
        });
        Some(id)
    }

    /// Move a node to a new canvas position
    pub fn move_node(&mut self, id: &str, position: impl Into<Position>) -> bool {
        self.update(id, NodePatch::position(position))
    }

    /// Merge config entries into a node; a `null` value removes the key
    pub fn update_config(&mut self, id: &str, config: ConfigMap) -> bool {
        self.update(id, NodePatch::config(config))
    }

    /// Change a node's display label
    pub fn rename_node(&mut self, id: &str, label: impl Into<String>) -> bool {
        self.update(id, NodePatch::default().with_label(label))
    }

    fn update(&mut self, id: &str, patch: NodePatch) -> bool {
        if !self.store.update_node(id, patch) {
            log::warn!("Cannot update node '{}': not found", id);
            return false;
        }
        self.commit(GraphEvent::NodeUpdated {
            node_id: id.to_string(),
        });
        true
    }

    /// Remove a node and every edge touching it
    pub fn remove_node(&mut self, id: &str) -> bool {
        let Some(removed) = self.store.remove_node(id) else {
            return false;
        };

        if self.selected.as_deref() == Some(id) {
            self.selected = None;
            self.emit(GraphEvent::SelectionChanged { node_id: None });
        }
        self.commit(GraphEvent::NodeRemoved {
            node_id: id.to_string(),
            removed_edges: removed.edges.into_iter().map(|e| e.id).collect(),
        });
        true
    }

    /// Select a node, or clear the selection with `None`
    ///
    /// Returns false if the node does not exist. Selection is not persisted
    /// and not undoable.
    pub fn select(&mut self, id: Option<&str>) -> bool {
        if let Some(id) = id {
            if !self.store.contains_node(id) {
                return false;
            }
        }
        let next = id.map(str::to_string);
        if next != self.selected {
            self.selected = next;
            self.emit(GraphEvent::SelectionChanged {
                node_id: self.selected.clone(),
            });
        }
        true
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    // =========================================================================
    // Edges
    // =========================================================================

    /// Connect two placed nodes if their component types are compatible
    pub fn connect(&mut self, from: &str, to: &str) -> ConnectOutcome {
        let mut types = Vec::with_capacity(2);
        for endpoint in [from, to] {
            match self.store.node(endpoint) {
                Some(node) => types.push(node.component_type.clone()),
                None => {
                    log::warn!("Cannot connect {} -> {}: node '{}' not found", from, to, endpoint);
                    return ConnectOutcome::UnknownNode(endpoint.to_string());
                }
            }
        }

        if let Err(rejection) = validation::check_connection(&self.catalog, &types[0], &types[1]) {
            log::debug!("Rejected connection {} -> {}: {}", from, to, rejection);
            self.emit(GraphEvent::connection_rejected(from, to, &rejection));
            return ConnectOutcome::Rejected(rejection);
        }

        match self.store.add_edge(from, to) {
            EdgeInsert::Added(edge_id) => {
                self.commit(GraphEvent::EdgeAdded {
                    edge_id: edge_id.clone(),
                });
                ConnectOutcome::Connected(edge_id)
            }
            EdgeInsert::AlreadyPresent(edge_id) => ConnectOutcome::AlreadyConnected(edge_id),
            EdgeInsert::SelfLoop => ConnectOutcome::SelfLoop,
            EdgeInsert::MissingEndpoint(id) => ConnectOutcome::UnknownNode(id),
            EdgeInsert::IdCollision(edge_id) => ConnectOutcome::IdCollision(edge_id),
        }
    }

    /// Remove a connection by ID
    pub fn disconnect(&mut self, edge_id: &str) -> bool {
        if self.store.remove_edge(edge_id).is_none() {
            return false;
        }
        self.commit(GraphEvent::EdgeRemoved {
            edge_id: edge_id.to_string(),
        });
        true
    }

    /// Exit and entry points of every edge, in edge order
    pub fn edge_anchors(&self) -> Vec<(EdgeId, Point, Point)> {
        self.store
            .edges()
            .iter()
            .filter_map(|edge| {
                geometry::edge_anchors(&self.store, edge, &self.config.footprint)
                    .map(|(exit, entry)| (edge.id.clone(), exit, entry))
            })
            .collect()
    }

    // =========================================================================
    // Whole graph
    // =========================================================================

    /// Remove every node and edge
    pub fn clear(&mut self) {
        self.store.clear();
        self.selected = None;
        self.commit(GraphEvent::GraphCleared);
    }

    /// Snapshot of the current graph, stamped now
    pub fn save_document(&self) -> GraphDocument {
        document::serialize(&self.store)
    }

    /// Pretty-printed document JSON, as written by Save
    pub fn export_json(&self) -> Result<String> {
        self.save_document().to_json()
    }

    /// Filename for a save made today
    pub fn suggested_filename(&self) -> String {
        document::workflow_filename(&self.config.app_name, Utc::now().date_naive())
    }

    /// Write the document into `dir` under [`Self::suggested_filename`]
    pub fn export_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(self.suggested_filename());
        document::write_document(&path, &self.save_document())?;
        Ok(path)
    }

    /// Replace the graph with a document's contents
    ///
    /// Loading never merges. When the text is not JSON the graph falls back
    /// to empty and the error is returned in the outcome.
    pub fn load_json(&mut self, text: &str) -> LoadOutcome {
        match document::parse_document(text) {
            Ok(contents) => {
                let outcome = LoadOutcome::Loaded {
                    node_count: contents.nodes.len(),
                    edge_count: contents.edges.len(),
                };
                self.replace(contents);
                outcome
            }
            Err(e) => {
                log::warn!("Failed to load workflow: {}", e);
                self.fail_load(e)
            }
        }
    }

    /// Read a workflow file and replace the graph with it
    ///
    /// An unreadable file is handled like unparseable text: the graph falls
    /// back to empty.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> LoadOutcome {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(text) => self.load_json(&text),
            Err(e) => {
                log::warn!("Failed to read {:?}: {}", path.as_ref(), e);
                self.fail_load(e.into())
            }
        }
    }

    fn fail_load(&mut self, error: GraphError) -> LoadOutcome {
        self.store.clear();
        self.selected = None;
        self.commit(GraphEvent::LoadFailed {
            error: error.to_string(),
        });
        LoadOutcome::Failed(error)
    }

    /// Replace the graph with a built-in template
    ///
    /// Returns the blocks that were skipped because their type is unknown.
    /// An unknown template name leaves the graph untouched.
    pub fn load_template(&mut self, name: &str) -> Result<Vec<SkippedBlock>> {
        let template = templates::template(name)?;
        let expansion = templates::expand(&self.catalog, &template, &self.config.layout);
        log::info!(
            "Loaded template '{}' with {} component(s)",
            name,
            expansion.document.components.len()
        );
        self.replace(expansion.document.into_contents());
        Ok(expansion.skipped)
    }

    fn replace(&mut self, contents: GraphContents) {
        self.store.replace(contents);
        self.selected = None;
        self.commit(GraphEvent::GraphReplaced {
            node_count: self.store.len(),
            edge_count: self.store.edges().len(),
        });
    }

    /// Problems in the current graph
    pub fn diagnostics(&self) -> Vec<ValidationError> {
        validation::validate_graph(&self.store.contents(), &self.catalog)
    }

    // =========================================================================
    // Undo / redo
    // =========================================================================

    pub fn undo(&mut self) -> bool {
        let restored = self.history.step_back();
        self.restore_snapshot(restored)
    }

    pub fn redo(&mut self) -> bool {
        let restored = self.history.step_forward();
        self.restore_snapshot(restored)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Label of the edit [`Self::undo`] would revert
    pub fn undo_label(&self) -> Option<&str> {
        self.history.undo_label()
    }

    /// Label of the edit [`Self::redo`] would reapply
    pub fn redo_label(&self) -> Option<&str> {
        self.history.redo_label()
    }

    fn restore_snapshot(&mut self, snapshot: Option<Result<GraphContents>>) -> bool {
        let contents = match snapshot {
            Some(Ok(contents)) => contents,
            Some(Err(e)) => {
                log::warn!("Discarding unreadable undo snapshot: {}", e);
                return false;
            }
            None => return false,
        };

        self.store.replace(contents);
        if let Some(id) = &self.selected {
            if !self.store.contains_node(id) {
                self.selected = None;
                self.emit(GraphEvent::SelectionChanged { node_id: None });
            }
        }
        self.emit(GraphEvent::GraphReplaced {
            node_count: self.store.len(),
            edge_count: self.store.edges().len(),
        });
        self.auto_save();
        true
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn commit(&mut self, event: GraphEvent) {
        self.snapshot(&event.describe());
        self.emit(event);
        self.auto_save();
    }

    fn snapshot(&mut self, label: &str) {
        if let Err(e) = self.history.record(label, &self.store.contents()) {
            log::warn!("Failed to record undo snapshot: {}", e);
        }
    }

    fn auto_save(&mut self) {
        if !auto_save_persist(self.adapter.as_ref(), &self.store, self.ui_state) {
            self.emit(GraphEvent::AutoSaveFailed);
        }
    }

    fn emit(&self, event: GraphEvent) {
        if let Err(e) = self.events.send(event) {
            log::warn!("Failed to deliver graph event: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::VecEventSink;
    use crate::persistence::MemoryPersistence;
    use serde_json::json;
    use tempfile::TempDir;

    fn session_with(adapter: &MemoryPersistence) -> (EditorSession, Arc<VecEventSink>) {
        let sink = Arc::new(VecEventSink::new());
        let session = EditorSession::new(
            Arc::new(Catalog::builtin()),
            Box::new(adapter.clone()),
            DesignerConfig::default(),
        )
        .with_events(sink.clone());
        (session, sink)
    }

    fn saved_contents(adapter: &MemoryPersistence) -> GraphContents {
        adapter.load().unwrap().unwrap().document.into_contents()
    }

    #[test]
    fn test_place_node_uses_catalog_defaults() {
        let adapter = MemoryPersistence::new();
        let (mut session, sink) = session_with(&adapter);

        let id = session.place_node("split", (100.0, 100.0)).unwrap();
        let node = session.store().node(&id).unwrap();
        assert_eq!(node.label, "Train/Test Split");
        assert_eq!(node.config.get("test_size"), Some(&json!(0.2)));
        assert_eq!(
            sink.events(),
            vec![GraphEvent::NodeAdded {
                node_id: id,
                component_type: "split".to_string()
            }]
        );
    }

    #[test]
    fn test_unknown_type_is_soft_failure() {
        let adapter = MemoryPersistence::new();
        let (mut session, sink) = session_with(&adapter);

        assert!(session.place_node("quantum-annealer", (0.0, 0.0)).is_none());
        assert!(session.store().is_empty());
        assert!(matches!(
            sink.events().as_slice(),
            [GraphEvent::UnknownComponent { .. }]
        ));
        assert!(adapter.raw().is_none());
    }

    #[test]
    fn test_connect_follows_validator() {
        let adapter = MemoryPersistence::new();
        let (mut session, sink) = session_with(&adapter);
        let source = session.place_node("data-source", (100.0, 100.0)).unwrap();
        let split = session.place_node("split", (300.0, 100.0)).unwrap();
        sink.clear();

        assert_eq!(
            session.connect(&source, &split),
            ConnectOutcome::Connected("node-1-node-2".to_string())
        );
        assert!(matches!(
            session.connect(&split, &source),
            ConnectOutcome::Rejected(ConnectionRejection::Incompatible { .. })
        ));
        assert_eq!(
            session.connect(&source, &split),
            ConnectOutcome::AlreadyConnected("node-1-node-2".to_string())
        );
        assert_eq!(session.store().edges().len(), 1);

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], GraphEvent::ConnectionRejected { .. }));
    }

    #[test]
    fn test_connect_unknown_node() {
        let adapter = MemoryPersistence::new();
        let (mut session, _) = session_with(&adapter);
        let source = session.place_node("data-source", (0.0, 0.0)).unwrap();

        assert_eq!(
            session.connect(&source, "node-9"),
            ConnectOutcome::UnknownNode("node-9".to_string())
        );
        assert!(!session.connect(&source, &source).is_connected());
    }

    #[test]
    fn test_remove_node_cascades_and_clears_selection() {
        let adapter = MemoryPersistence::new();
        let (mut session, sink) = session_with(&adapter);
        session.load_template("collaborative-filtering").unwrap();
        assert!(session.select(Some("node-2")));
        sink.clear();

        assert!(session.remove_node("node-2"));
        assert_eq!(session.selected(), None);
        assert_eq!(session.store().edges().len(), 2);
        assert!(session.store().edges().iter().all(|e| !e.touches("node-2")));

        let events = sink.events();
        assert_eq!(events[0], GraphEvent::SelectionChanged { node_id: None });
        match &events[1] {
            GraphEvent::NodeRemoved { removed_edges, .. } => {
                assert_eq!(removed_edges, &vec!["node-1-node-2", "node-2-node-3"])
            }
            other => panic!("Expected NodeRemoved, got {:?}", other),
        }
        assert!(!session.remove_node("node-2"));
    }

    #[test]
    fn test_select_missing_node() {
        let adapter = MemoryPersistence::new();
        let (mut session, _) = session_with(&adapter);
        assert!(!session.select(Some("node-1")));
        assert!(session.select(None));
    }

    #[test]
    fn test_every_mutation_auto_saves() {
        let adapter = MemoryPersistence::new();
        let (mut session, _) = session_with(&adapter);

        let a = session.place_node("cv-data-source", (0.0, 0.0)).unwrap();
        assert_eq!(saved_contents(&adapter).nodes.len(), 1);

        let b = session.place_node("tracker", (250.0, 0.0)).unwrap();
        session.connect(&a, &b);
        assert_eq!(saved_contents(&adapter).edges.len(), 1);

        session.move_node(&b, (400.0, 50.0));
        assert_eq!(
            saved_contents(&adapter).nodes[1].position,
            Position::new(400.0, 50.0)
        );

        let patch = json!({"tracker_type": "csrt"}).as_object().cloned().unwrap();
        assert!(session.update_config(&b, patch));
        assert_eq!(
            saved_contents(&adapter).nodes[1].config.get("tracker_type"),
            Some(&json!("csrt"))
        );

        session.disconnect("node-1-node-2");
        assert!(saved_contents(&adapter).edges.is_empty());

        session.clear();
        assert!(saved_contents(&adapter).is_empty());
    }

    #[test]
    fn test_auto_save_failure_is_swallowed() {
        let adapter = MemoryPersistence::new();
        let (mut session, sink) = session_with(&adapter);
        adapter.fail_writes(true);

        assert!(session.place_node("data-source", (0.0, 0.0)).is_some());
        assert_eq!(session.store().len(), 1);
        assert!(sink.events().contains(&GraphEvent::AutoSaveFailed));
    }

    struct DisconnectedSink;

    impl EventSink for DisconnectedSink {
        fn send(&self, _event: GraphEvent) -> std::result::Result<(), crate::events::EventError> {
            Err(crate::events::EventError::Disconnected)
        }
    }

    #[test]
    fn test_undeliverable_events_do_not_block_edits() {
        let adapter = MemoryPersistence::new();
        let mut session = EditorSession::new(
            Arc::new(Catalog::builtin()),
            Box::new(adapter.clone()),
            DesignerConfig::default(),
        )
        .with_events(DisconnectedSink);

        let a = session.place_node("cv-data-source", (0.0, 0.0)).unwrap();
        let b = session.place_node("template-matcher", (250.0, 0.0)).unwrap();
        assert!(session.connect(&a, &b).is_connected());
        assert_eq!(saved_contents(&adapter).edges.len(), 1);
    }

    #[test]
    fn test_restore_from_auto_save() {
        let adapter = MemoryPersistence::new();
        {
            let (mut session, _) = session_with(&adapter);
            session.load_template("cv-tracking").unwrap();
            session.set_ui_state(UiState {
                palette_visible: false,
                palette_width: 320.0,
            });
        }

        let session = EditorSession::restore(
            Arc::new(Catalog::builtin()),
            Box::new(adapter.clone()),
            DesignerConfig::default(),
        );
        assert_eq!(session.store().len(), 3);
        assert_eq!(session.store().edges().len(), 2);
        assert_eq!(session.ui_state().map(|s| s.palette_visible), Some(false));
    }

    #[test]
    fn test_restore_from_corrupt_record_is_empty() {
        let adapter = MemoryPersistence::new();
        adapter.set_raw(r#"{"components": [{"id": "node-1""#);

        let mut session = EditorSession::restore(
            Arc::new(Catalog::builtin()),
            Box::new(adapter.clone()),
            DesignerConfig::default(),
        );
        assert!(session.store().is_empty());
        assert_eq!(session.place_node("data-source", (0.0, 0.0)).as_deref(), Some("node-1"));
    }

    #[test]
    fn test_load_truncated_json_falls_back_to_empty() {
        let adapter = MemoryPersistence::new();
        let (mut session, sink) = session_with(&adapter);
        session.load_template("random-forest").unwrap();

        let text = session.export_json().unwrap();
        let outcome = session.load_json(&text[..text.len() / 2]);

        assert!(matches!(
            outcome,
            LoadOutcome::Failed(GraphError::MalformedDocument(_))
        ));
        assert!(session.store().is_empty());
        assert!(matches!(
            sink.events().last(),
            Some(GraphEvent::LoadFailed { .. })
        ));
    }

    #[test]
    fn test_load_replaces_instead_of_merging() {
        let adapter = MemoryPersistence::new();
        let (mut session, _) = session_with(&adapter);
        session.load_template("xgboost-features").unwrap();
        let text = session.export_json().unwrap();

        session.clear();
        session.place_node("cv-data-source", (0.0, 0.0));

        let outcome = session.load_json(&text);
        assert!(matches!(
            outcome,
            LoadOutcome::Loaded {
                node_count: 5,
                edge_count: 4
            }
        ));
        assert!(session.store().nodes().iter().all(|n| n.component_type != "cv-data-source"));
        assert!(session.diagnostics().is_empty());

        // ids keep counting after the loaded ones
        assert_eq!(session.place_node("split", (0.0, 0.0)).as_deref(), Some("node-6"));
    }

    #[test]
    fn test_unreadable_file_falls_back_to_empty() {
        let adapter = MemoryPersistence::new();
        let (mut session, sink) = session_with(&adapter);
        session.load_template("random-forest").unwrap();
        let id = session.store().nodes()[0].id.clone();
        session.select(Some(&id));

        let temp_dir = TempDir::new().unwrap();
        let outcome = session.load_file(temp_dir.path().join("missing.json"));

        assert!(matches!(outcome, LoadOutcome::Failed(GraphError::Io(_))));
        assert!(session.store().is_empty());
        assert_eq!(session.selected(), None);
        assert!(matches!(
            sink.events().last(),
            Some(GraphEvent::LoadFailed { .. })
        ));
        assert!(saved_contents(&adapter).is_empty());

        // the template comes back with undo
        assert!(session.undo());
        assert_eq!(session.store().len(), 4);
    }

    #[test]
    fn test_place_after_loading_max_generated_id() {
        let adapter = MemoryPersistence::new();
        let (mut session, _) = session_with(&adapter);
        let text = json!({
            "components": [{
                "id": format!("node-{}", u64::MAX),
                "type": "split",
                "position": {"x": 0, "y": 0}
            }]
        })
        .to_string();
        assert!(session.load_json(&text).is_loaded());

        let first = session.place_node("split", (300.0, 0.0));
        let second = session.place_node("split", (600.0, 0.0));

        assert_eq!(first.as_deref(), Some("node-1"));
        assert_eq!(second.as_deref(), Some("node-2"));
        assert_eq!(session.store().len(), 3);
    }

    #[test]
    fn test_load_template_with_unknown_name() {
        let adapter = MemoryPersistence::new();
        let (mut session, _) = session_with(&adapter);
        session.place_node("data-source", (0.0, 0.0));

        assert!(matches!(
            session.load_template("nope"),
            Err(GraphError::UnknownTemplate(_))
        ));
        assert_eq!(session.store().len(), 1);
    }

    #[test]
    fn test_undo_redo() {
        let adapter = MemoryPersistence::new();
        let (mut session, _) = session_with(&adapter);
        assert!(!session.can_undo());

        let a = session.place_node("data-source", (0.0, 0.0)).unwrap();
        let b = session.place_node("split", (250.0, 0.0)).unwrap();
        session.connect(&a, &b);
        session.select(Some(&b));

        assert!(session.undo());
        assert!(session.store().edges().is_empty());
        assert!(session.undo());
        assert_eq!(session.store().len(), 1);
        assert_eq!(session.selected(), None);
        assert_eq!(saved_contents(&adapter).nodes.len(), 1);

        assert!(session.redo());
        assert!(session.redo());
        assert_eq!(session.store().edges().len(), 1);
        assert!(!session.redo());

        session.undo();
        assert_eq!(session.redo_label(), Some("Connect node-1-node-2"));
        assert_eq!(session.undo_label(), Some("Place split"));
        session.place_node("evaluation", (0.0, 200.0));
        assert!(!session.can_redo());
    }

    #[test]
    fn test_edge_anchors() {
        let adapter = MemoryPersistence::new();
        let (mut session, _) = session_with(&adapter);
        let a = session.place_node("data-source", (100.0, 100.0)).unwrap();
        let b = session.place_node("split", (300.0, 100.0)).unwrap();
        session.connect(&a, &b);

        assert_eq!(
            session.edge_anchors(),
            vec![(
                "node-1-node-2".to_string(),
                Point::new(288.0, 159.0),
                Point::new(300.0, 159.0)
            )]
        );
    }

    #[test]
    fn test_export_to_dir() {
        let temp_dir = TempDir::new().unwrap();
        let adapter = MemoryPersistence::new();
        let (mut session, _) = session_with(&adapter);
        session.load_template("cv-feature-matching").unwrap();

        let path = session.export_to(temp_dir.path()).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("mammoth-workflow-"));
        assert!(name.ends_with(".json"));

        let contents = document::read_document(&path).unwrap();
        assert_eq!(contents, session.store().contents());
    }
}
