//! Declarative scraper configuration.
//!
//! A JSON document describing the fields to extract, an optional per-field
//! named transform, and an optional JSON Schema:
//!
//! ```json
//! {
//!   "fields": {
//!     "title": { "selector": "title" },
//!     "views": { "selector": "meta[name=views]", "attribute": "content",
//!                "transform": "int", "default": 0 },
//!     "image": { "fields": { "url": { "selector": "meta[property='og:image']",
//!                                     "attribute": "content" } } },
//!     "items": { "selector": "li.item", "multiple": true,
//!                "fields": { "name": { "selector": ".name" } } }
//!   },
//!   "schema": { "type": "object" }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Number, Value};

use crate::error::{BoxError, ConfigError};
use crate::field::{Field, FieldMap, FieldTransform, ScopedField, field_path};
use crate::scrape::Scraper;
use crate::traits::Validator;
use crate::validators::{JsonSchemaValidator, SchemaIssues};

fn default_true() -> bool {
    true
}

/// Top-level configuration file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScraperConfig {
    pub fields: BTreeMap<String, FieldSpec>,
    /// JSON Schema the extracted object must satisfy.
    #[serde(default)]
    pub schema: Option<Value>,
    /// Apply schema defaults and scalar coercion before validating.
    #[serde(default = "default_true")]
    pub coerce: bool,
}

/// One entry of `fields`. The shape decides the kind: `selector` + `fields`
/// is scoped, `fields` alone is nested, `selector` alone is a leaf.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FieldSpec {
    Scoped(ScopedSpec),
    Nested(NestedSpec),
    Leaf(LeafSpec),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScopedSpec {
    pub selector: String,
    pub fields: BTreeMap<String, FieldSpec>,
    #[serde(default)]
    pub multiple: bool,
    #[serde(default)]
    pub default: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NestedSpec {
    pub fields: BTreeMap<String, FieldSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LeafSpec {
    pub selector: String,
    #[serde(default)]
    pub attribute: Option<String>,
    #[serde(default)]
    pub html: Option<HtmlMode>,
    #[serde(default)]
    pub multiple: bool,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub transform: Option<TransformSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HtmlMode {
    Inner,
    Outer,
}

/// Named per-value transforms available from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformSpec {
    Trim,
    Lowercase,
    Uppercase,
    /// Base-10 signed integer.
    Int,
    /// Finite floating point number.
    Float,
    /// `true`/`false`, `yes`/`no`, `1`/`0`, case-insensitive.
    Bool,
    /// Split on a separator; pieces are trimmed and empty pieces dropped.
    Split(String),
}

impl TransformSpec {
    pub fn to_transform(&self) -> FieldTransform {
        match self.clone() {
            TransformSpec::Trim => Arc::new(|raw: &str| -> Result<Value, BoxError> {
                Ok(Value::from(raw.trim()))
            }),
            TransformSpec::Lowercase => Arc::new(|raw: &str| -> Result<Value, BoxError> {
                Ok(Value::from(raw.to_lowercase()))
            }),
            TransformSpec::Uppercase => Arc::new(|raw: &str| -> Result<Value, BoxError> {
                Ok(Value::from(raw.to_uppercase()))
            }),
            TransformSpec::Int => Arc::new(|raw: &str| -> Result<Value, BoxError> {
                raw.trim()
                    .parse::<i64>()
                    .map(Value::from)
                    .map_err(|e| format!("'{raw}' is not an integer: {e}").into())
            }),
            TransformSpec::Float => Arc::new(|raw: &str| -> Result<Value, BoxError> {
                raw.trim()
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| format!("'{raw}' is not a finite number").into())
            }),
            TransformSpec::Bool => Arc::new(|raw: &str| -> Result<Value, BoxError> {
                match raw.trim().to_ascii_lowercase().as_str() {
                    "true" | "yes" | "1" => Ok(Value::Bool(true)),
                    "false" | "no" | "0" => Ok(Value::Bool(false)),
                    _ => Err(format!("'{raw}' is not a boolean").into()),
                }
            }),
            TransformSpec::Split(separator) => Arc::new(move |raw: &str| -> Result<Value, BoxError> {
                Ok(raw
                    .split(separator.as_str())
                    .map(str::trim)
                    .filter(|piece| !piece.is_empty())
                    .map(Value::from)
                    .collect())
            }),
        }
    }
}

impl ScraperConfig {
    /// Load a configuration file from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Compile the field specs into a checked [`FieldMap`].
    pub fn field_map(&self) -> Result<FieldMap, ConfigError> {
        let fields = build_fields(&self.fields, "")?;
        fields.check()?;
        Ok(fields)
    }

    /// The validator described by `schema`/`coerce`.
    pub fn validator(&self) -> Result<ConfigValidator, ConfigError> {
        match &self.schema {
            Some(schema) => {
                let validator = JsonSchemaValidator::new(schema)?;
                let validator = if self.coerce {
                    validator.with_coercion()
                } else {
                    validator
                };
                Ok(ConfigValidator::Schema(validator))
            }
            None => Ok(ConfigValidator::Passthrough),
        }
    }

    /// Build a ready-to-run scraper.
    pub fn build(&self) -> Result<Scraper<ConfigValidator>, ConfigError> {
        Scraper::new(self.field_map()?, self.validator()?)
    }
}

fn build_fields(specs: &BTreeMap<String, FieldSpec>, prefix: &str) -> Result<FieldMap, ConfigError> {
    let mut fields = FieldMap::new();
    for (name, spec) in specs {
        let path = field_path(prefix, name);
        match spec {
            FieldSpec::Leaf(leaf) => fields.insert(name, build_leaf(leaf, &path)?),
            FieldSpec::Nested(nested) => fields.insert(name, build_fields(&nested.fields, &path)?),
            FieldSpec::Scoped(scoped) => {
                let mut field = ScopedField::new(&scoped.selector, build_fields(&scoped.fields, &path)?)?;
                if scoped.multiple {
                    field = field.multiple();
                }
                if let Some(default) = &scoped.default {
                    field = field.default_value(default.clone());
                }
                fields.insert(name, field);
            }
        }
    }
    Ok(fields)
}

fn build_leaf(spec: &LeafSpec, path: &str) -> Result<Field, ConfigError> {
    let mut field = match (&spec.attribute, spec.html) {
        (Some(_), Some(_)) => {
            return Err(ConfigError::InvalidField {
                field: path.to_string(),
                message: "'attribute' and 'html' are mutually exclusive".into(),
            });
        }
        (Some(attribute), None) => Field::attr(&spec.selector, attribute)?,
        (None, Some(HtmlMode::Inner)) => Field::inner_html(&spec.selector)?,
        (None, Some(HtmlMode::Outer)) => Field::outer_html(&spec.selector)?,
        (None, None) => Field::text(&spec.selector)?,
    };

    if spec.multiple {
        field = field.multiple();
    }
    if let Some(transform) = &spec.transform {
        field = field.with_transform_fn(transform.to_transform());
    }
    if let Some(default) = &spec.default {
        field = field.default_value(default.clone());
    }
    Ok(field)
}

/// Validator selected by configuration: a JSON Schema, or none.
///
/// Both arms share `SchemaIssues` as their error type so a config-built
/// [`Scraper`] has a single concrete type whether or not a schema is set.
#[derive(Debug)]
pub enum ConfigValidator {
    Schema(JsonSchemaValidator),
    /// No schema configured; behaves like
    /// [`PassthroughValidator`](crate::validators::PassthroughValidator),
    /// whose `Infallible` error cannot stand in for `SchemaIssues`.
    Passthrough,
}

impl Validator for ConfigValidator {
    type Output = Value;
    type Error = SchemaIssues;

    async fn validate(&self, value: Value) -> Result<Value, SchemaIssues> {
        match self {
            ConfigValidator::Schema(validator) => validator.validate(value).await,
            ConfigValidator::Passthrough => Ok(value),
        }
    }
}
