use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::traits::Validator;

/// Decodes the extracted value into a typed struct with `serde`.
///
/// Coercion and defaults come from the target type's serde attributes
/// (`#[serde(default)]`, `deserialize_with = "quarry_core::coerce::from_str_or_native"`).
/// Failures carry the native [`serde_json::Error`].
pub struct SerdeValidator<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> SerdeValidator<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for SerdeValidator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for SerdeValidator<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SerdeValidator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SerdeValidator<{}>", std::any::type_name::<T>())
    }
}

impl<T> Validator for SerdeValidator<T>
where
    T: DeserializeOwned + Send,
{
    type Output = T;
    type Error = serde_json::Error;

    async fn validate(&self, value: Value) -> Result<T, serde_json::Error> {
        serde_json::from_value(value).inspect_err(|e| {
            tracing::debug!(error = %e, "Typed decoding rejected extracted value");
        })
    }
}
