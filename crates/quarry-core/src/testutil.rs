//! Test utilities: hand-written mock implementations of the core traits.
//!
//! Mocks use `Arc<Mutex<_>>` so clones share state, allowing assertions on
//! recorded calls after the value under test has taken ownership.

use std::sync::{Arc, Mutex};

use serde_json::Value;
use thiserror::Error;

use crate::traits::Validator;

// ---------------------------------------------------------------------------
// MockValidator
// ---------------------------------------------------------------------------

/// Native error type of [`MockValidator`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("mock rejection: {0}")]
pub struct MockRejection(pub String);

/// Mock validator that records every value it sees.
#[derive(Clone)]
pub struct MockValidator {
    /// Queue of responses. Each call pops the first element.
    /// If empty, the input is accepted unchanged.
    responses: Arc<Mutex<Vec<Result<Value, MockRejection>>>>,
    pub seen: Arc<Mutex<Vec<Value>>>,
}

impl MockValidator {
    fn with_responses(responses: Vec<Result<Value, MockRejection>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Accepts every value unchanged.
    pub fn accepting() -> Self {
        Self::with_responses(vec![])
    }

    /// Accepts the first value but returns `value` in its place.
    pub fn returning(value: Value) -> Self {
        Self::with_responses(vec![Ok(value)])
    }

    /// Rejects the first value with `message`.
    pub fn rejecting(message: &str) -> Self {
        Self::with_responses(vec![Err(MockRejection(message.to_string()))])
    }
}

impl Validator for MockValidator {
    type Output = Value;
    type Error = MockRejection;

    async fn validate(&self, value: Value) -> Result<Value, MockRejection> {
        self.seen.lock().unwrap().push(value.clone());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(value)
        } else {
            responses.remove(0)
        }
    }
}
