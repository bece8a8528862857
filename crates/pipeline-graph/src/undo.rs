//! Undo/redo history of compressed graph snapshots
//!
//! Each committed edit records the graph as it stands afterwards, zstd
//! compressed, together with a short label ("Place split", "Connect ...").
//! A cursor points at the entry matching the live graph; stepping back or
//! forward decodes the neighbouring entry.

use std::collections::VecDeque;

use crate::error::{GraphError, Result};
use crate::types::GraphContents;

const COMPRESSION_LEVEL: i32 = 3;

/// One recorded graph state
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// What produced this state
    pub label: String,
    pub node_count: usize,
    pub edge_count: usize,
    packed: Vec<u8>,
}

impl HistoryEntry {
    fn pack(label: &str, graph: &GraphContents) -> Result<Self> {
        let json = serde_json::to_vec(graph)?;
        let packed = zstd::encode_all(json.as_slice(), COMPRESSION_LEVEL)
            .map_err(|e| GraphError::Compression(e.to_string()))?;
        Ok(Self {
            label: label.to_string(),
            node_count: graph.nodes.len(),
            edge_count: graph.edges.len(),
            packed,
        })
    }

    fn unpack(&self) -> Result<GraphContents> {
        let json = zstd::decode_all(self.packed.as_slice())
            .map_err(|e| GraphError::Compression(e.to_string()))?;
        Ok(serde_json::from_slice(&json)?)
    }

    /// Compressed size in bytes
    pub fn packed_len(&self) -> usize {
        self.packed.len()
    }
}

/// Bounded linear history; recording after an undo drops the redo branch
#[derive(Debug)]
pub struct UndoHistory {
    entries: VecDeque<HistoryEntry>,
    cursor: usize,
    depth: usize,
}

impl UndoHistory {
    /// Keep at most `depth` states (at least one)
    pub fn new(depth: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: 0,
            depth: depth.max(1),
        }
    }

    /// Record the graph after an edit
    pub fn record(&mut self, label: &str, graph: &GraphContents) -> Result<()> {
        let entry = HistoryEntry::pack(label, graph)?;

        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push_back(entry);
        if self.entries.len() > self.depth {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;
        Ok(())
    }

    /// Move back one state, `None` at the oldest one
    pub fn step_back(&mut self) -> Option<Result<GraphContents>> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(self.entries[self.cursor].unpack())
    }

    /// Move forward one state, `None` at the newest one
    pub fn step_forward(&mut self) -> Option<Result<GraphContents>> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(self.entries[self.cursor].unpack())
    }

    /// Decode the state under the cursor
    pub fn current(&self) -> Option<Result<GraphContents>> {
        self.entries.get(self.cursor).map(HistoryEntry::unpack)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Label of the edit an undo would revert
    pub fn undo_label(&self) -> Option<&str> {
        if self.can_undo() {
            Some(&self.entries[self.cursor].label)
        } else {
            None
        }
    }

    /// Label of the edit a redo would reapply
    pub fn redo_label(&self) -> Option<&str> {
        if self.can_redo() {
            Some(&self.entries[self.cursor + 1].label)
        } else {
            None
        }
    }

    /// All recorded states, oldest first
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total compressed size of the history
    pub fn packed_len(&self) -> usize {
        self.entries.iter().map(HistoryEntry::packed_len).sum()
    }
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new(crate::config::UNDO_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::GraphStore;
    use crate::types::NewNode;

    fn graph_of(node_count: usize) -> GraphContents {
        let mut store = GraphStore::new();
        for i in 0..node_count {
            store.add_node(NewNode::new("split", (i as f64 * 250.0, 100.0)));
        }
        store.contents()
    }

    fn nodes_of(step: Option<Result<GraphContents>>) -> usize {
        step.unwrap().unwrap().nodes.len()
    }

    #[test]
    fn test_step_back_and_forward() {
        let mut history = UndoHistory::new(10);
        history.record("Open", &graph_of(0)).unwrap();
        history.record("Place split", &graph_of(1)).unwrap();
        history.record("Place split", &graph_of(2)).unwrap();

        assert_eq!(nodes_of(history.step_back()), 1);
        assert_eq!(nodes_of(history.step_back()), 0);
        assert!(history.step_back().is_none());

        assert_eq!(nodes_of(history.step_forward()), 1);
        assert_eq!(nodes_of(history.current()), 1);
    }

    #[test]
    fn test_recording_drops_redo_branch() {
        let mut history = UndoHistory::new(10);
        history.record("Open", &graph_of(0)).unwrap();
        history.record("Place split", &graph_of(1)).unwrap();
        history.step_back();

        history.record("Load template", &graph_of(4)).unwrap();
        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
        assert_eq!(nodes_of(history.current()), 4);
    }

    #[test]
    fn test_depth_is_bounded() {
        let mut history = UndoHistory::new(3);
        for n in 0..6 {
            history.record("Place split", &graph_of(n)).unwrap();
        }

        assert_eq!(history.len(), 3);
        let counts: Vec<usize> = history.entries().map(|e| e.node_count).collect();
        assert_eq!(counts, vec![3, 4, 5]);

        history.step_back();
        history.step_back();
        assert!(!history.can_undo());
        assert!(history.packed_len() > 0);
    }

    #[test]
    fn test_labels_follow_cursor() {
        let mut history = UndoHistory::default();
        assert_eq!(history.undo_label(), None);

        history.record("Open", &graph_of(0)).unwrap();
        history.record("Place split", &graph_of(1)).unwrap();
        assert_eq!(history.undo_label(), Some("Place split"));
        assert_eq!(history.redo_label(), None);

        history.step_back();
        assert_eq!(history.undo_label(), None);
        assert_eq!(history.redo_label(), Some("Place split"));
    }

    #[test]
    fn test_snapshot_is_exact() {
        let mut history = UndoHistory::default();
        let graph = graph_of(2);
        history.record("Place split", &graph).unwrap();
        assert_eq!(history.current().unwrap().unwrap(), graph);
    }
}
