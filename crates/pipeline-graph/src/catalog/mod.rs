//! Component catalog
//!
//! Static registry mapping a block type identifier to its category, the
//! upstream data tags it accepts and the data tag it produces. The catalog is
//! built once at start-up and never mutated while a session is editing.
//!
//! Lookups return a tagged [`Result`]; each caller decides whether an unknown
//! type is a soft failure (skip, fallback icon) or a hard one.
//!
//! # Usage
//!
//! ```ignore
//! use pipeline_graph::Catalog;
//!
//! let catalog = Catalog::builtin();
//! let split = catalog.lookup("split")?;
//! assert!(split.accepts.admits(&"dataframe".into()));
//! ```

mod builtin;
mod schema;

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::types::ConfigMap;

pub use schema::{ConfigField, ConfigIssue, ConfigKind, ValueRange};

/// Category of a component type, used for palette grouping and styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Loads data into the pipeline
    Input,
    /// Reshapes or splits data
    Transform,
    /// Trains or applies an algorithm
    Model,
    /// Produces results or metrics
    Output,
}

impl Category {
    /// All categories in palette order
    pub const ALL: [Category; 4] = [
        Category::Input,
        Category::Transform,
        Category::Model,
        Category::Output,
    ];

    /// Accent colour of nodes in this category
    pub fn color(&self) -> &'static str {
        match self {
            Category::Input => "#3b82f6",
            Category::Transform => "#8b5cf6",
            Category::Model => "#10b981",
            Category::Output => "#f59e0b",
        }
    }

    /// Palette section title
    pub fn label(&self) -> &'static str {
        match self {
            Category::Input => "Data Input",
            Category::Transform => "Transform",
            Category::Model => "Models",
            Category::Output => "Output",
        }
    }

    /// Parse the lowercase identifier used in persisted catalogs and the CLI
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "input" => Some(Category::Input),
            "transform" => Some(Category::Transform),
            "model" => Some(Category::Model),
            "output" => Some(Category::Output),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = match self {
            Category::Input => "input",
            Category::Transform => "transform",
            Category::Model => "model",
            Category::Output => "output",
        };
        f.write_str(id)
    }
}

/// Tag naming the kind of data flowing along an edge (e.g. "dataframe")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataTag(String);

impl DataTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DataTag {
    fn from(tag: &str) -> Self {
        Self(tag.to_string())
    }
}

impl fmt::Display for DataTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Upstream data a component type can receive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "tags", rename_all = "snake_case")]
pub enum Accepts {
    /// No inputs: the component is a graph source
    Nothing,
    /// Any upstream tag; only used when a type declares it explicitly
    Any,
    /// Any of the listed tags (order irrelevant)
    OneOf(BTreeSet<DataTag>),
}

impl Accepts {
    /// Build from a declared tag list. An empty list declares a source.
    pub fn from_tags<I, T>(tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<DataTag>,
    {
        let tags: BTreeSet<DataTag> = tags.into_iter().map(Into::into).collect();
        if tags.is_empty() {
            Accepts::Nothing
        } else {
            Accepts::OneOf(tags)
        }
    }

    /// Check whether data with this tag may flow in
    pub fn admits(&self, tag: &DataTag) -> bool {
        match self {
            Accepts::Nothing => false,
            Accepts::Any => true,
            Accepts::OneOf(tags) => tags.contains(tag),
        }
    }

    /// Whether the component can only start a pipeline
    pub fn is_source(&self) -> bool {
        matches!(self, Accepts::Nothing)
    }
}

/// Catalog entry for one block type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentType {
    /// Unique type identifier (e.g., "data-source")
    pub id: String,
    /// Category for grouping in the palette
    pub category: Category,
    /// Human-readable label, copied onto nodes at placement
    pub label: String,
    /// Icon name used by the palette and as a render fallback
    pub icon: String,
    /// Description of what the block does
    pub description: String,
    /// Upstream tags this block can receive
    pub accepts: Accepts,
    /// Tag of the data this block produces
    pub produces: DataTag,
    /// Configuration schema
    #[serde(default)]
    pub config: Vec<ConfigField>,
}

impl ComponentType {
    /// Create a source component (accepts nothing)
    pub fn new(
        id: impl Into<String>,
        category: Category,
        label: impl Into<String>,
        produces: impl Into<DataTag>,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            label: label.into(),
            icon: String::new(),
            description: String::new(),
            accepts: Accepts::Nothing,
            produces: produces.into(),
            config: Vec::new(),
        }
    }

    /// Declare the upstream tags this component accepts
    pub fn accepting<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<DataTag>,
    {
        self.accepts = Accepts::from_tags(tags);
        self
    }

    /// Accept any upstream tag
    pub fn accepting_any(mut self) -> Self {
        self.accepts = Accepts::Any;
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append a configuration field
    pub fn field(mut self, field: ConfigField) -> Self {
        self.config.push(field);
        self
    }

    /// Configuration populated from the schema defaults
    pub fn default_config(&self) -> ConfigMap {
        self.config
            .iter()
            .filter_map(|f| f.default.clone().map(|v| (f.key.clone(), v)))
            .collect()
    }

    /// Check an instance configuration against the schema
    ///
    /// Returns every issue found (not just the first). Keys not declared in
    /// the schema are ignored.
    pub fn validate_config(&self, config: &ConfigMap) -> Vec<ConfigIssue> {
        self.config
            .iter()
            .filter_map(|field| field.check(config))
            .collect()
    }
}

/// Registry of component types in declaration order
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<ComponentType>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// The recommendation and computer-vision blocks shipped with the designer
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for component in builtin::recommender_components()
            .into_iter()
            .chain(builtin::vision_components())
        {
            catalog.register(component);
        }
        catalog
    }

    /// Register a component type
    ///
    /// Re-registering an existing ID replaces the entry in place, keeping
    /// its declaration position.
    pub fn register(&mut self, component: ComponentType) {
        match self.index.get(&component.id) {
            Some(&pos) => {
                log::debug!("Replacing catalog entry '{}'", component.id);
                self.entries[pos] = component;
            }
            None => {
                self.index.insert(component.id.clone(), self.entries.len());
                self.entries.push(component);
            }
        }
    }

    /// Resolve a type ID
    pub fn lookup(&self, type_id: &str) -> Result<&ComponentType> {
        self.index
            .get(type_id)
            .map(|&pos| &self.entries[pos])
            .ok_or_else(|| GraphError::UnknownComponent(type_id.to_string()))
    }

    /// Check if a type ID is registered
    pub fn contains(&self, type_id: &str) -> bool {
        self.index.contains_key(type_id)
    }

    /// Component types of one category, in declaration order
    pub fn list_by_category(&self, category: Category) -> Vec<&ComponentType> {
        self.entries
            .iter()
            .filter(|c| c.category == category)
            .collect()
    }

    /// All component types in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &ComponentType> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Schema defaults for a type
    pub fn default_config(&self, type_id: &str) -> Result<ConfigMap> {
        Ok(self.lookup(type_id)?.default_config())
    }

    /// Validate an instance configuration for a type
    pub fn validate_config(&self, type_id: &str, config: &ConfigMap) -> Result<Vec<ConfigIssue>> {
        Ok(self.lookup(type_id)?.validate_config(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_known_and_unknown() {
        let catalog = Catalog::builtin();

        let split = catalog.lookup("split").unwrap();
        assert_eq!(split.category, Category::Transform);
        assert_eq!(split.produces, DataTag::from("split-data"));

        let err = catalog.lookup("quantum-annealer").unwrap_err();
        assert!(matches!(err, GraphError::UnknownComponent(ref id) if id == "quantum-annealer"));
    }

    #[test]
    fn test_list_by_category_preserves_declaration_order() {
        let catalog = Catalog::builtin();
        let inputs: Vec<&str> = catalog
            .list_by_category(Category::Input)
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(inputs, vec!["data-source", "features-input", "cv-data-source"]);
    }

    #[test]
    fn test_register_replaces_in_place() {
        let mut catalog = Catalog::new();
        catalog.register(ComponentType::new("a", Category::Input, "A", "x"));
        catalog.register(ComponentType::new("b", Category::Input, "B", "y"));
        catalog.register(ComponentType::new("a", Category::Input, "A2", "z"));

        assert_eq!(catalog.len(), 2);
        let ids: Vec<&str> = catalog.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(catalog.lookup("a").unwrap().label, "A2");
    }

    #[test]
    fn test_accepts_semantics() {
        let source = Accepts::from_tags(Vec::<&str>::new());
        assert!(source.is_source());
        assert!(!source.admits(&"dataframe".into()));

        let any = Accepts::Any;
        assert!(any.admits(&"anything".into()));

        let split = Accepts::from_tags(["processed-data", "dataframe"]);
        assert!(split.admits(&"dataframe".into()));
        assert!(split.admits(&"processed-data".into()));
        assert!(!split.admits(&"model".into()));
    }

    #[test]
    fn test_every_non_source_accepts_something_produced() {
        let catalog = Catalog::builtin();
        let produced: BTreeSet<&DataTag> = catalog.iter().map(|c| &c.produces).collect();

        for component in catalog.iter() {
            if let Accepts::OneOf(tags) = &component.accepts {
                assert!(
                    tags.iter().any(|t| produced.contains(t)),
                    "{} accepts nothing any block produces",
                    component.id
                );
            }
        }
    }

    #[test]
    fn test_default_config_from_schema() {
        let catalog = Catalog::builtin();
        let config = catalog.default_config("split").unwrap();
        assert_eq!(config.get("test_size"), Some(&json!(0.2)));
        assert_eq!(config.get("method"), Some(&json!("random")));
    }

    #[test]
    fn test_default_configs_are_valid() {
        let catalog = Catalog::builtin();
        for component in catalog.iter() {
            let issues = component.validate_config(&component.default_config());
            assert!(issues.is_empty(), "{}: {:?}", component.id, issues);
        }
    }

    #[test]
    fn test_category_colors_are_distinct() {
        let colors: BTreeSet<&str> = Category::ALL.iter().map(|c| c.color()).collect();
        assert_eq!(colors.len(), Category::ALL.len());
        assert_eq!(Category::from_id("model"), Some(Category::Model));
        assert_eq!(Category::Model.to_string(), "model");
    }

    #[test]
    fn test_component_type_serialization() {
        let catalog = Catalog::builtin();
        let json = serde_json::to_value(catalog.lookup("data-source").unwrap()).unwrap();
        assert_eq!(json["category"], "input");
        assert_eq!(json["accepts"], json!({"kind": "nothing"}));
        assert_eq!(json["produces"], "dataframe");
    }
}
