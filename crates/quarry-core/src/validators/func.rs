use std::fmt;
use std::marker::PhantomData;

use serde_json::Value;

use crate::traits::Validator;

/// Adapter for any schema system reachable through a plain function.
///
/// The closure receives the extracted value and returns either the parsed
/// data or the library's own error.
///
/// ```rust
/// use quarry_core::validators::FnValidator;
///
/// let validator = FnValidator::new(|value: serde_json::Value| {
///     value
///         .get("title")
///         .and_then(|t| t.as_str())
///         .map(str::to_owned)
///         .ok_or_else(|| std::io::Error::other("title missing"))
/// });
/// # let _ = validator;
/// ```
pub struct FnValidator<F, T, E> {
    f: F,
    _marker: PhantomData<fn() -> (T, E)>,
}

impl<F, T, E> FnValidator<F, T, E>
where
    F: Fn(Value) -> Result<T, E>,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: PhantomData,
        }
    }
}

impl<F: Clone, T, E> Clone for FnValidator<F, T, E> {
    fn clone(&self) -> Self {
        Self {
            f: self.f.clone(),
            _marker: PhantomData,
        }
    }
}

impl<F, T, E> fmt::Debug for FnValidator<F, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnValidator").finish_non_exhaustive()
    }
}

impl<F, T, E> Validator for FnValidator<F, T, E>
where
    F: Fn(Value) -> Result<T, E> + Send + Sync,
    T: Send,
    E: std::error::Error + Send + Sync + 'static,
{
    type Output = T;
    type Error = E;

    async fn validate(&self, value: Value) -> Result<T, E> {
        (self.f)(value)
    }
}
