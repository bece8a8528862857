//! Workflow templates
//!
//! A template is a named, ordered list of block types. Expanding it produces
//! a fresh graph: one node per resolvable block laid out on a grid, chained
//! in template order.
//!
//! # Example
//!
//! ```ignore
//! let catalog = Catalog::builtin();
//! let template = templates::template("collaborative-filtering").unwrap();
//! let expansion = templates::expand(&catalog, &template, &GridLayout::default());
//! assert!(expansion.skipped.is_empty());
//! ```

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::document::GraphDocument;
use crate::error::{GraphError, Result};
use crate::store::GraphStore;
use crate::types::{NewNode, NodeId, Position};

/// A named starter pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowTemplate {
    pub name: String,
    pub description: String,
    pub blocks: Vec<String>,
}

impl WorkflowTemplate {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            blocks: Vec::new(),
        }
    }

    /// Append a block type
    pub fn block(mut self, component_type: impl Into<String>) -> Self {
        self.blocks.push(component_type.into());
        self
    }
}

/// Grid used to place expanded blocks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridLayout {
    pub origin: Position,
    pub columns: usize,
    pub column_spacing: f64,
    pub row_spacing: f64,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            origin: Position::new(100.0, 100.0),
            columns: 4,
            column_spacing: 250.0,
            row_spacing: 200.0,
        }
    }
}

impl GridLayout {
    /// Position of the block at `index` in the template
    pub fn position(&self, index: usize) -> Position {
        let columns = self.columns.max(1);
        let row = index / columns;
        let col = index % columns;
        Position::new(
            self.origin.x + col as f64 * self.column_spacing,
            self.origin.y + row as f64 * self.row_spacing,
        )
    }
}

/// A template block that could not be resolved in the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedBlock {
    pub index: usize,
    pub component_type: String,
}

/// Result of expanding a template
#[derive(Debug, Clone)]
pub struct Expansion {
    pub document: GraphDocument,
    pub skipped: Vec<SkippedBlock>,
}

/// Expand a template, skipping unknown blocks
///
/// Each block keeps the grid cell of its template index, so a skipped block
/// leaves a gap. The chain bridges the gap: the last created node connects to
/// the next created one.
pub fn expand(catalog: &Catalog, template: &WorkflowTemplate, layout: &GridLayout) -> Expansion {
    let mut store = GraphStore::new();
    let mut skipped = Vec::new();
    let mut previous: Option<NodeId> = None;

    for (index, block) in template.blocks.iter().enumerate() {
        let component = match catalog.lookup(block) {
            Ok(component) => component,
            Err(e) => {
                log::warn!("Template '{}': skipping block {}: {}", template.name, index, e);
                skipped.push(SkippedBlock {
                    index,
                    component_type: block.clone(),
                });
                continue;
            }
        };

        let id = store.add_node(
            NewNode::new(component.id.clone(), layout.position(index))
                .with_label(component.label.clone())
                .with_config(component.default_config()),
        );
        if let Some(prev) = previous.replace(id.clone()) {
            store.add_edge(&prev, &id);
        }
    }

    log::debug!(
        "Expanded template '{}' into {} node(s), {} skipped",
        template.name,
        store.len(),
        skipped.len()
    );
    Expansion {
        document: crate::document::serialize(&store),
        skipped,
    }
}

/// Expand a template, failing on the first unknown block
pub fn expand_strict(
    catalog: &Catalog,
    template: &WorkflowTemplate,
    layout: &GridLayout,
) -> Result<GraphDocument> {
    if let Some(unknown) = template.blocks.iter().find(|b| !catalog.contains(b)) {
        return Err(GraphError::UnknownComponent(unknown.clone()));
    }
    Ok(expand(catalog, template, layout).document)
}

/// Templates shipped with the designer
pub fn builtin_templates() -> Vec<WorkflowTemplate> {
    vec![
        WorkflowTemplate::new(
            "collaborative-filtering",
            "Neighbourhood recommender with predictions and evaluation",
        )
        .block("data-source")
        .block("split")
        .block("collaborative-filtering")
        .block("predictions")
        .block("evaluation"),
        WorkflowTemplate::new(
            "matrix-factorization",
            "Preprocessed latent factor model with predictions and evaluation",
        )
        .block("data-source")
        .block("preprocessor")
        .block("split")
        .block("matrix-factorization")
        .block("predictions")
        .block("evaluation"),
        WorkflowTemplate::new("xgboost-features", "Gradient boosting over user features")
            .block("features-input")
            .block("preprocessor")
            .block("split")
            .block("xgboost")
            .block("evaluation"),
        WorkflowTemplate::new("random-forest", "Random forest recommender")
            .block("data-source")
            .block("split")
            .block("random-forest")
            .block("evaluation"),
        WorkflowTemplate::new("cv-tracking", "Object tracking on video frames")
            .block("cv-data-source")
            .block("tracker")
            .block("cv-evaluation"),
        WorkflowTemplate::new("cv-template-matching", "Template matching on video frames")
            .block("cv-data-source")
            .block("template-matcher")
            .block("cv-evaluation"),
        WorkflowTemplate::new("cv-feature-matching", "Keypoint matching on video frames")
            .block("cv-data-source")
            .block("feature-matcher")
            .block("cv-evaluation"),
    ]
}

/// Look up a built-in template by name
pub fn template(name: &str) -> Result<WorkflowTemplate> {
    builtin_templates()
        .into_iter()
        .find(|t| t.name == name)
        .ok_or_else(|| GraphError::UnknownTemplate(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_graph;

    #[test]
    fn test_grid_positions() {
        let layout = GridLayout::default();
        assert_eq!(layout.position(0), Position::new(100.0, 100.0));
        assert_eq!(layout.position(3), Position::new(850.0, 100.0));
        assert_eq!(layout.position(4), Position::new(100.0, 300.0));
        assert_eq!(layout.position(9), Position::new(350.0, 500.0));
    }

    #[test]
    fn test_expand_chains_blocks() {
        let catalog = Catalog::builtin();
        let expansion = expand(&catalog, &template("cv-tracking").unwrap(), &GridLayout::default());

        let doc = expansion.document;
        assert!(expansion.skipped.is_empty());
        assert_eq!(doc.components.len(), 3);
        assert_eq!(doc.components[1].label, "Object Tracker");
        assert_eq!(
            doc.components[1].config.get("tracker_type"),
            Some(&serde_json::json!("kcf"))
        );
        let edges: Vec<&str> = doc.connections.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(edges, vec!["node-1-node-2", "node-2-node-3"]);
    }

    #[test]
    fn test_unknown_block_is_bridged() {
        let catalog = Catalog::builtin();
        let template = WorkflowTemplate::new("gappy", "")
            .block("data-source")
            .block("split")
            .block("does-not-exist")
            .block("matrix-factorization")
            .block("evaluation");

        let expansion = expand(&catalog, &template, &GridLayout::default());
        let doc = &expansion.document;

        assert_eq!(doc.components.len(), 4);
        assert_eq!(
            expansion.skipped,
            vec![SkippedBlock {
                index: 2,
                component_type: "does-not-exist".to_string()
            }]
        );
        let pairs: Vec<(&str, &str)> = doc
            .connections
            .iter()
            .map(|e| (e.from.as_str(), e.to.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("node-1", "node-2"), ("node-2", "node-3"), ("node-3", "node-4")]
        );
        // the skipped block keeps its grid cell empty
        assert_eq!(doc.components[2].position, Position::new(850.0, 100.0));
        assert_eq!(doc.components[2].component_type, "matrix-factorization");
    }

    #[test]
    fn test_strict_expansion_fails_on_unknown() {
        let catalog = Catalog::builtin();
        let template = WorkflowTemplate::new("bad", "").block("data-source").block("nope");
        let err = expand_strict(&catalog, &template, &GridLayout::default()).unwrap_err();
        assert!(matches!(err, GraphError::UnknownComponent(ref t) if t == "nope"));
    }

    #[test]
    fn test_builtin_templates_produce_valid_graphs() {
        let catalog = Catalog::builtin();
        for template in builtin_templates() {
            let doc = expand_strict(&catalog, &template, &GridLayout::default()).unwrap();
            let errors = validate_graph(&doc.contents(), &catalog);
            assert!(errors.is_empty(), "{}: {:?}", template.name, errors);
            assert_eq!(doc.connections.len(), template.blocks.len() - 1);
        }
    }

    #[test]
    fn test_unknown_template() {
        assert!(matches!(
            template("nonexistent"),
            Err(GraphError::UnknownTemplate(_))
        ));
    }

    #[test]
    fn test_empty_template() {
        let expansion = expand(
            &Catalog::builtin(),
            &WorkflowTemplate::new("empty", ""),
            &GridLayout::default(),
        );
        assert!(expansion.document.components.is_empty());
        assert!(expansion.document.connections.is_empty());
    }
}
