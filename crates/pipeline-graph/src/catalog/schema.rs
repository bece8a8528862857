//! Block configuration schema
//!
//! Each component type declares the keys its configuration map may hold,
//! with kinds, defaults, allowed options and numeric ranges.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::ConfigMap;

/// Value kind of a configuration field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigKind {
    Int,
    Float,
    Bool,
    Str,
    List,
}

impl ConfigKind {
    fn matches(&self, value: &Value) -> bool {
        match self {
            ConfigKind::Int => value.is_i64() || value.is_u64(),
            // integers are fine where a float is expected
            ConfigKind::Float => value.is_number(),
            ConfigKind::Bool => value.is_boolean(),
            ConfigKind::Str => value.is_string(),
            ConfigKind::List => value.is_array(),
        }
    }
}

impl fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConfigKind::Int => "int",
            ConfigKind::Float => "float",
            ConfigKind::Bool => "bool",
            ConfigKind::Str => "str",
            ConfigKind::List => "list",
        };
        f.write_str(name)
    }
}

/// Numeric bounds for a field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
    /// When true both bounds are excluded
    #[serde(default)]
    pub exclusive: bool,
}

impl ValueRange {
    pub fn contains(&self, value: f64) -> bool {
        if self.exclusive {
            value > self.min && value < self.max
        } else {
            value >= self.min && value <= self.max
        }
    }
}

/// One key of a block's configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigField {
    pub key: String,
    pub kind: ConfigKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<ValueRange>,
    #[serde(default)]
    pub required: bool,
    /// Field becomes required when another key holds the given value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_when: Option<(String, Value)>,
}

impl ConfigField {
    pub fn new(key: impl Into<String>, kind: ConfigKind) -> Self {
        Self {
            key: key.into(),
            kind,
            default: None,
            options: Vec::new(),
            range: None,
            required: false,
            required_when: None,
        }
    }

    pub fn int(key: impl Into<String>, default: i64) -> Self {
        Self::new(key, ConfigKind::Int).with_default(default)
    }

    pub fn float(key: impl Into<String>, default: f64) -> Self {
        Self::new(key, ConfigKind::Float).with_default(default)
    }

    pub fn boolean(key: impl Into<String>, default: bool) -> Self {
        Self::new(key, ConfigKind::Bool).with_default(default)
    }

    pub fn choice(key: impl Into<String>, default: &str, options: &[&str]) -> Self {
        let mut field = Self::new(key, ConfigKind::Str).with_default(default);
        field.options = options.iter().map(|o| o.to_string()).collect();
        field
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn required_when(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.required_when = Some((key.into(), value.into()));
        self
    }

    /// Inclusive bounds
    pub fn between(mut self, min: f64, max: f64) -> Self {
        self.range = Some(ValueRange {
            min,
            max,
            exclusive: false,
        });
        self
    }

    /// Exclusive bounds
    pub fn strictly_between(mut self, min: f64, max: f64) -> Self {
        self.range = Some(ValueRange {
            min,
            max,
            exclusive: true,
        });
        self
    }

    pub fn at_least(self, min: f64) -> Self {
        self.between(min, f64::MAX)
    }

    fn is_required(&self, config: &ConfigMap) -> bool {
        self.required
            || self
                .required_when
                .as_ref()
                .is_some_and(|(key, expected)| config.get(key) == Some(expected))
    }

    pub(crate) fn check(&self, config: &ConfigMap) -> Option<ConfigIssue> {
        let value = match config.get(&self.key) {
            Some(Value::Null) | None => {
                return self.is_required(config).then(|| ConfigIssue::Missing {
                    key: self.key.clone(),
                });
            }
            Some(value) => value,
        };

        if !self.kind.matches(value) {
            return Some(ConfigIssue::WrongKind {
                key: self.key.clone(),
                expected: self.kind,
            });
        }

        if !self.options.is_empty() {
            if let Some(s) = value.as_str() {
                if !self.options.iter().any(|o| o == s) {
                    return Some(ConfigIssue::NotAnOption {
                        key: self.key.clone(),
                        value: s.to_string(),
                        options: self.options.clone(),
                    });
                }
            }
        }

        if let (Some(range), Some(n)) = (self.range, value.as_f64()) {
            if !range.contains(n) {
                return Some(ConfigIssue::OutOfRange {
                    key: self.key.clone(),
                    value: n,
                    range,
                });
            }
        }

        None
    }
}

/// A problem found when checking a configuration against its schema
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigIssue {
    /// A required key is absent
    Missing { key: String },
    /// The value has the wrong JSON kind
    WrongKind { key: String, expected: ConfigKind },
    /// A string value outside the allowed options
    NotAnOption {
        key: String,
        value: String,
        options: Vec<String>,
    },
    /// A number outside the allowed range
    OutOfRange {
        key: String,
        value: f64,
        range: ValueRange,
    },
}

impl ConfigIssue {
    pub fn key(&self) -> &str {
        match self {
            Self::Missing { key }
            | Self::WrongKind { key, .. }
            | Self::NotAnOption { key, .. }
            | Self::OutOfRange { key, .. } => key,
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { key } => write!(f, "Missing required parameter: {}", key),
            Self::WrongKind { key, expected } => {
                write!(f, "Parameter '{}' must be of type {}", key, expected)
            }
            Self::NotAnOption {
                key,
                value,
                options,
            } => write!(
                f,
                "Invalid {}: '{}' (expected one of {})",
                key,
                value,
                options.join(", ")
            ),
            Self::OutOfRange { key, value, range } => {
                let (open, close) = if range.exclusive { ("(", ")") } else { ("[", "]") };
                write!(
                    f,
                    "Parameter '{}' = {} is outside {}{}, {}{}",
                    key, value, open, range.min, range.max, close
                )
            }
        }
    }
}
