use std::fmt;

use serde_json::{Number, Value};

use crate::error::ConfigError;
use crate::traits::Validator;

/// Every error reported by a JSON Schema validation run, kept as the native
/// [`jsonschema::ValidationError`] values.
///
/// `Display` joins the error messages with newlines, one per issue; use
/// [`issues`](Self::issues) to inspect instance and schema locations.
#[derive(Debug)]
pub struct SchemaIssues {
    errors: Vec<jsonschema::ValidationError<'static>>,
}

impl SchemaIssues {
    /// The native errors, in the order `jsonschema` reported them.
    pub fn issues(&self) -> &[jsonschema::ValidationError<'static>] {
        &self.errors
    }

    /// JSON Pointers of the failing instance locations (e.g. `/image/width`).
    pub fn instance_paths(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|e| e.instance_path().to_string())
            .collect()
    }

    /// Human-readable message of every issue.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn into_inner(self) -> Vec<jsonschema::ValidationError<'static>> {
        self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for SchemaIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join("\n"))
    }
}

impl std::error::Error for SchemaIssues {}

/// Validates extracted values against a JSON Schema using `jsonschema`.
///
/// With [`with_coercion`](Self::with_coercion), values are first brought
/// closer to the schema: missing properties that declare a `default` are
/// filled in, and scalar strings are converted to the declared
/// `integer`/`number`/`boolean` type (numbers and booleans to `string`).
/// Only `properties`, `items` and `type` are followed; `$ref` targets are not
/// coerced.
pub struct JsonSchemaValidator {
    schema: Value,
    validator: jsonschema::Validator,
    coerce: bool,
}

impl JsonSchemaValidator {
    /// Compile `schema`. Fails with [`ConfigError::InvalidSchema`] if the
    /// schema itself is malformed.
    pub fn new(schema: &Value) -> Result<Self, ConfigError> {
        let validator = jsonschema::validator_for(schema)
            .map_err(|e| ConfigError::InvalidSchema(e.to_string()))?;

        Ok(Self {
            schema: schema.clone(),
            validator,
            coerce: false,
        })
    }

    /// Coerce values and apply schema defaults before validating.
    pub fn with_coercion(mut self) -> Self {
        self.coerce = true;
        self
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }
}

impl fmt::Debug for JsonSchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchemaValidator")
            .field("schema", &self.schema)
            .field("coerce", &self.coerce)
            .finish_non_exhaustive()
    }
}

impl Validator for JsonSchemaValidator {
    type Output = Value;
    type Error = SchemaIssues;

    async fn validate(&self, mut value: Value) -> Result<Value, SchemaIssues> {
        if self.coerce {
            coerce(&mut value, &self.schema);
        }

        let errors: Vec<jsonschema::ValidationError<'static>> = self
            .validator
            .iter_errors(&value)
            .map(|e| e.to_owned())
            .collect();

        if errors.is_empty() {
            Ok(value)
        } else {
            tracing::debug!(issues = errors.len(), "JSON Schema rejected extracted value");
            Err(SchemaIssues { errors })
        }
    }
}

fn coerce(value: &mut Value, schema: &Value) {
    let Some(schema) = schema.as_object() else {
        return;
    };

    if let (Some(Value::Object(properties)), Value::Object(object)) =
        (schema.get("properties"), &mut *value)
    {
        for (name, property) in properties {
            match object.get_mut(name) {
                Some(child) => coerce(child, property),
                None => {
                    if let Some(default) = property.get("default") {
                        object.insert(name.clone(), default.clone());
                    }
                }
            }
        }
    }

    if let (Some(items), Value::Array(list)) = (schema.get("items"), &mut *value) {
        for item in list {
            coerce(item, items);
        }
    }

    if let Some(types) = schema.get("type") {
        coerce_scalar(value, types);
    }
}

fn coerce_scalar(value: &mut Value, types: &Value) {
    let allows = |name: &str| match types {
        Value::String(t) => t == name,
        Value::Array(list) => list.iter().any(|t| t == name),
        _ => false,
    };

    let coerced = match &*value {
        Value::String(_) if allows("string") => None,
        Value::String(raw) => {
            let raw = raw.trim();
            let integer = || {
                allows("integer")
                    .then(|| raw.parse::<i64>().ok().map(Value::from))
                    .flatten()
            };
            let number = || {
                allows("number")
                    .then(|| raw.parse::<f64>().ok().and_then(Number::from_f64))
                    .flatten()
                    .map(Value::Number)
            };
            let boolean = || match raw {
                "true" if allows("boolean") => Some(Value::Bool(true)),
                "false" if allows("boolean") => Some(Value::Bool(false)),
                _ => None,
            };
            integer().or_else(number).or_else(boolean)
        }
        Value::Number(n) if allows("string") && !allows("number") && !allows("integer") => {
            Some(Value::String(n.to_string()))
        }
        Value::Bool(b) if allows("string") && !allows("boolean") => {
            Some(Value::String(b.to_string()))
        }
        _ => None,
    };

    if let Some(coerced) = coerced {
        *value = coerced;
    }
}
