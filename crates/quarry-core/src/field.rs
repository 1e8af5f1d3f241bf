//! Field definitions: which nodes to read and how to shape them.
//!
//! A [`FieldMap`] maps output names to [`FieldDefinition`]s. Leaves read
//! strings from matched nodes; nested maps recurse against the same scope;
//! scoped maps recurse into each matched node.
//!
//! ```rust
//! use quarry_core::field::{Field, FieldMap};
//!
//! # fn build() -> Result<FieldMap, quarry_core::ConfigError> {
//! let fields = FieldMap::new()
//!     .field("title", Field::text("title")?)
//!     .field(
//!         "views",
//!         Field::attr(r#"meta[name="views"]"#, "content")?
//!             .transform(|raw| raw.parse::<i64>())
//!             .default_value(0),
//!     );
//! # Ok(fields)
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use scraper::Selector;
use serde_json::Value;

use crate::document::ValueSource;
use crate::error::{BoxError, ConfigError};

/// Per-value conversion applied to each raw string of a leaf.
pub type FieldTransform = Arc<dyn Fn(&str) -> Result<Value, BoxError> + Send + Sync>;

fn compile(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// A leaf field: reads one raw string per matched node.
#[derive(Clone)]
pub struct Field {
    pub(crate) selector: Selector,
    selector_src: String,
    pub(crate) source: ValueSource,
    pub(crate) multiple: bool,
    pub(crate) transform: Option<FieldTransform>,
    pub(crate) default_value: Option<Value>,
}

impl Field {
    fn with_source(selector: &str, source: ValueSource) -> Result<Self, ConfigError> {
        Ok(Self {
            selector: compile(selector)?,
            selector_src: selector.to_string(),
            source,
            multiple: false,
            transform: None,
            default_value: None,
        })
    }

    /// Read the trimmed text content of matched nodes.
    pub fn text(selector: &str) -> Result<Self, ConfigError> {
        Self::with_source(selector, ValueSource::Text)
    }

    /// Read the named attribute of matched nodes.
    pub fn attr(selector: &str, attribute: &str) -> Result<Self, ConfigError> {
        Self::with_source(selector, ValueSource::Attribute(attribute.to_string()))
    }

    pub fn inner_html(selector: &str) -> Result<Self, ConfigError> {
        Self::with_source(selector, ValueSource::InnerHtml)
    }

    pub fn outer_html(selector: &str) -> Result<Self, ConfigError> {
        Self::with_source(selector, ValueSource::OuterHtml)
    }

    /// Collect every matched value into a list instead of taking the first.
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Value used when nothing matched. It is used as-is; the transform is
    /// not applied to it.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Fallible per-value conversion. Errors abort the extraction.
    pub fn transform<F, T, E>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
        T: Into<Value>,
        E: Into<BoxError>,
    {
        self.transform = Some(Arc::new(move |raw: &str| -> Result<Value, BoxError> {
            f(raw).map(Into::into).map_err(Into::into)
        }));
        self
    }

    /// Infallible per-value conversion.
    pub fn map<F, T>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> T + Send + Sync + 'static,
        T: Into<Value>,
    {
        self.transform = Some(Arc::new(move |raw: &str| -> Result<Value, BoxError> {
            Ok(f(raw).into())
        }));
        self
    }

    /// Attach an already-boxed transform (used by the config layer).
    pub fn with_transform_fn(mut self, transform: FieldTransform) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn selector(&self) -> &str {
        &self.selector_src
    }

    pub fn source(&self) -> &ValueSource {
        &self.source
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    /// Apply the transform, or wrap the raw string when there is none.
    pub(crate) fn apply(&self, raw: &str) -> Result<Value, BoxError> {
        match &self.transform {
            Some(transform) => transform(raw),
            None => Ok(Value::String(raw.to_string())),
        }
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("selector", &self.selector_src)
            .field("source", &self.source)
            .field("multiple", &self.multiple)
            .field("transform", &self.transform.is_some())
            .field("default_value", &self.default_value)
            .finish()
    }
}

/// A nested map evaluated relative to each node matched by `selector`.
#[derive(Clone)]
pub struct ScopedField {
    pub(crate) selector: Selector,
    selector_src: String,
    pub(crate) fields: FieldMap,
    pub(crate) multiple: bool,
    pub(crate) default_value: Option<Value>,
}

impl ScopedField {
    pub fn new(selector: &str, fields: FieldMap) -> Result<Self, ConfigError> {
        Ok(Self {
            selector: compile(selector)?,
            selector_src: selector.to_string(),
            fields,
            multiple: false,
            default_value: None,
        })
    }

    /// Produce one object per matched node instead of only the first.
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn selector(&self) -> &str {
        &self.selector_src
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple
    }
}

impl fmt::Debug for ScopedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedField")
            .field("selector", &self.selector_src)
            .field("fields", &self.fields)
            .field("multiple", &self.multiple)
            .field("default_value", &self.default_value)
            .finish()
    }
}

/// How one output field is obtained.
#[derive(Debug, Clone)]
pub enum FieldDefinition {
    /// Read directly from matched nodes.
    Leaf(Field),
    /// Object whose fields are extracted against the same scope.
    Nested(FieldMap),
    /// Object(s) whose fields are extracted inside each matched node.
    Scoped(ScopedField),
}

impl From<Field> for FieldDefinition {
    fn from(field: Field) -> Self {
        FieldDefinition::Leaf(field)
    }
}

impl From<FieldMap> for FieldDefinition {
    fn from(fields: FieldMap) -> Self {
        FieldDefinition::Nested(fields)
    }
}

impl From<ScopedField> for FieldDefinition {
    fn from(field: ScopedField) -> Self {
        FieldDefinition::Scoped(field)
    }
}

/// Output field names mapped to their definitions.
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    entries: Vec<(String, FieldDefinition)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, replacing any earlier definition with the same name.
    pub fn field(mut self, name: impl Into<String>, definition: impl Into<FieldDefinition>) -> Self {
        self.insert(name, definition);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, definition: impl Into<FieldDefinition>) {
        let name = name.into();
        let definition = definition.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = definition,
            None => self.entries.push((name, definition)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldDefinition> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldDefinition)> {
        self.entries.iter().map(|(n, d)| (n.as_str(), d))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check invariants that the types cannot express.
    ///
    /// A `multiple` field's default replaces the whole list, so it must
    /// itself be a list.
    pub fn check(&self) -> Result<(), ConfigError> {
        self.check_at("")
    }

    fn check_at(&self, prefix: &str) -> Result<(), ConfigError> {
        for (name, definition) in self.iter() {
            let path = field_path(prefix, name);
            match definition {
                FieldDefinition::Leaf(field) => {
                    check_default(&path, field.multiple, field.default_value.as_ref())?;
                }
                FieldDefinition::Scoped(scoped) => {
                    check_default(&path, scoped.multiple, scoped.default_value.as_ref())?;
                    scoped.fields.check_at(&path)?;
                }
                FieldDefinition::Nested(fields) => fields.check_at(&path)?,
            }
        }
        Ok(())
    }
}

fn check_default(path: &str, multiple: bool, default: Option<&Value>) -> Result<(), ConfigError> {
    match default {
        Some(value) if multiple && !value.is_array() => Err(ConfigError::InvalidField {
            field: path.to_string(),
            message: format!("default for a multiple field must be a list, got {value}"),
        }),
        _ => Ok(()),
    }
}

/// Join a parent path and a field name with a dot.
pub(crate) fn field_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}
