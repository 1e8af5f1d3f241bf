//! Recursive field extraction.
//!
//! Walks a [`FieldMap`] against a [`Document`] and assembles a plain JSON
//! object. Fields are independent of each other; a field that produced no
//! value and has no default is left out of the output object.

use serde_json::{Map, Value};

use crate::document::{Document, Scope};
use crate::error::ExtractError;
use crate::field::{Field, FieldDefinition, FieldMap, ScopedField, field_path};

/// Extract every field of `fields` from `document`.
///
/// Fails only when a field transform fails; the error names the field.
pub fn extract(fields: &FieldMap, document: &Document) -> Result<Map<String, Value>, ExtractError> {
    extract_in(fields, document.root(), "")
}

fn extract_in(
    fields: &FieldMap,
    scope: Scope<'_>,
    prefix: &str,
) -> Result<Map<String, Value>, ExtractError> {
    let mut object = Map::new();

    for (name, definition) in fields.iter() {
        let path = field_path(prefix, name);
        let value = match definition {
            FieldDefinition::Nested(nested) => Some(Value::Object(extract_in(nested, scope, &path)?)),
            FieldDefinition::Leaf(field) => extract_leaf(field, scope, &path)?,
            FieldDefinition::Scoped(scoped) => extract_scoped(scoped, scope, &path)?,
        };

        match value {
            Some(value) => {
                object.insert(name.to_string(), value);
            }
            None => tracing::debug!(field = %path, "No value extracted"),
        }
    }

    Ok(object)
}

fn extract_leaf(field: &Field, scope: Scope<'_>, path: &str) -> Result<Option<Value>, ExtractError> {
    let values: Vec<String> = scope
        .select(&field.selector)
        .into_iter()
        .filter_map(|node| field.source.read(node))
        .collect();

    tracing::debug!(
        field = %path,
        selector = field.selector(),
        matched = values.len(),
        "Extracted leaf"
    );

    if values.is_empty() {
        if let Some(default) = &field.default_value {
            return Ok(Some(default.clone()));
        }
    }

    let apply = |raw: &str| {
        field.apply(raw).map_err(|source| ExtractError {
            field: path.to_string(),
            source,
        })
    };

    if field.multiple {
        let list = values
            .iter()
            .map(|raw| apply(raw.as_str()))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Some(Value::Array(list)));
    }

    match values.into_iter().next() {
        // An empty first value is passed through untouched.
        Some(raw) if raw.is_empty() => Ok(Some(Value::String(raw))),
        Some(raw) => apply(&raw).map(Some),
        None => Ok(None),
    }
}

fn extract_scoped(
    scoped: &ScopedField,
    scope: Scope<'_>,
    path: &str,
) -> Result<Option<Value>, ExtractError> {
    let nodes = scope.select(&scoped.selector);

    if nodes.is_empty() {
        if let Some(default) = &scoped.default_value {
            return Ok(Some(default.clone()));
        }
    }

    if scoped.multiple {
        let mut list = Vec::with_capacity(nodes.len());
        for (index, node) in nodes.into_iter().enumerate() {
            let item_path = format!("{path}[{index}]");
            list.push(Value::Object(extract_in(
                &scoped.fields,
                Scope::Element(node),
                &item_path,
            )?));
        }
        return Ok(Some(Value::Array(list)));
    }

    match nodes.into_iter().next() {
        Some(node) => Ok(Some(Value::Object(extract_in(
            &scoped.fields,
            Scope::Element(node),
            path,
        )?))),
        None => Ok(None),
    }
}
