use std::future::Future;

use serde_json::Value;

/// Outcome of a single validator invocation: the coerced data, or the
/// schema system's native error.
pub type ValidationResult<T, E> = Result<T, E>;

/// Checks (and possibly coerces) an extracted value against a schema.
///
/// One implementation per schema system. Implementations must not panic on
/// bad input: every rejection is reported as `Err` carrying the schema
/// system's own error representation, unmodified.
pub trait Validator: Send + Sync {
    /// The validated, possibly coerced, data.
    type Output: Send;
    /// The schema system's native error.
    type Error: std::error::Error + Send + Sync + 'static;

    fn validate(
        &self,
        value: Value,
    ) -> impl Future<Output = ValidationResult<Self::Output, Self::Error>> + Send;
}

impl<V: Validator> Validator for std::sync::Arc<V> {
    type Output = V::Output;
    type Error = V::Error;

    fn validate(
        &self,
        value: Value,
    ) -> impl Future<Output = ValidationResult<Self::Output, Self::Error>> + Send {
        (**self).validate(value)
    }
}
