//! Persisted workflow documents
//!
//! A [`GraphDocument`] is the JSON snapshot written by Save and read back by
//! Load. Decoding is best effort: a document whose `components` or
//! `connections` field is missing or malformed yields an empty array for
//! that field instead of an error. Only text that is not JSON at all fails.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GraphError, Result};
use crate::store::GraphStore;
use crate::types::{Edge, GraphContents, Node};

/// Version tag written into every document
pub const DOCUMENT_VERSION: &str = "1.0";

/// Serializable snapshot of a full graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDocument {
    pub components: Vec<Node>,
    pub connections: Vec<Edge>,
    pub version: String,
    pub saved_at: DateTime<Utc>,
}

impl GraphDocument {
    /// Build a document from raw contents, stamped now
    pub fn from_contents(contents: GraphContents) -> Self {
        Self {
            components: contents.nodes,
            connections: contents.edges,
            version: DOCUMENT_VERSION.to_string(),
            saved_at: Utc::now(),
        }
    }

    /// The node and edge arrays of this document
    pub fn contents(&self) -> GraphContents {
        GraphContents {
            nodes: self.components.clone(),
            edges: self.connections.clone(),
        }
    }

    pub fn into_contents(self) -> GraphContents {
        GraphContents {
            nodes: self.components,
            edges: self.connections,
        }
    }

    /// Pretty-printed JSON, as written to workflow files
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Snapshot the store into a document
///
/// The arrays are copied; the document does not borrow from the store.
pub fn serialize(store: &GraphStore) -> GraphDocument {
    GraphDocument::from_contents(store.contents())
}

/// Extract nodes and edges from a decoded JSON value
///
/// Missing or non-array `components`/`connections` default to empty and
/// malformed entries are skipped. Edge endpoints are not checked against the
/// node list.
pub fn deserialize(value: &Value) -> GraphContents {
    GraphContents {
        nodes: lenient_array(value, "components"),
        edges: lenient_array(value, "connections"),
    }
}

/// Parse workflow JSON text into nodes and edges
///
/// Fails only when the text is not valid JSON.
pub fn parse_document(text: &str) -> Result<GraphContents> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| GraphError::malformed(format!("not valid JSON: {}", e)))?;
    Ok(deserialize(&value))
}

/// Decode `field` entry by entry, skipping the entries that do not fit `T`
fn lenient_array<T: serde::de::DeserializeOwned>(value: &Value, field: &str) -> Vec<T> {
    let entries = match value.get(field) {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            log::warn!("Ignoring '{}' in workflow document: not an array", field);
            return Vec::new();
        }
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match T::deserialize(entry) {
            Ok(item) => Some(item),
            Err(e) => {
                log::warn!("Skipping malformed {}[{}] in workflow document: {}", field, index, e);
                None
            }
        })
        .collect()
}

/// File name for a saved workflow: `<app>-workflow-<YYYY-MM-DD>.json`
pub fn workflow_filename(app_name: &str, date: NaiveDate) -> String {
    format!("{}-workflow-{}.json", app_name, date.format("%Y-%m-%d"))
}

/// Write a document to a file
pub fn write_document(path: impl AsRef<Path>, document: &GraphDocument) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, document.to_json()?)?;
    log::info!(
        "Saved workflow with {} component(s) to {:?}",
        document.components.len(),
        path
    );
    Ok(())
}

/// Read a workflow file into nodes and edges
pub fn read_document(path: impl AsRef<Path>) -> Result<GraphContents> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let contents = parse_document(&text)?;
    log::info!(
        "Loaded workflow with {} component(s) from {:?}",
        contents.nodes.len(),
        path
    );
    Ok(contents)
}
