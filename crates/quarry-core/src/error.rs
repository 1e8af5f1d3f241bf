use thiserror::Error;

/// Boxed error returned by user-supplied transforms.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Malformed configuration, detected when a scraper or field is built.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A CSS selector failed to compile.
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    /// A JSON Schema failed to compile.
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// A field definition violates an invariant (e.g. non-list default on a
    /// multiple field).
    #[error("Invalid field '{field}': {message}")]
    InvalidField { field: String, message: String },

    /// The configuration file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for the config model.
    #[error("Invalid JSON in config: {0}")]
    Json(#[from] serde_json::Error),
}

/// A field transform failed while converting a raw string.
#[derive(Error, Debug)]
#[error("Transform failed for field '{field}': {source}")]
pub struct ExtractError {
    /// Dotted path of the failing field (e.g. `image.width`).
    pub field: String,
    pub source: BoxError,
}

/// Failure of a single scraper invocation.
///
/// `E` is the validator's native error type and is passed through as-is.
#[derive(Error, Debug)]
pub enum ScrapeError<E> {
    /// A per-field transform failed during extraction.
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractError),

    /// The extracted value was rejected by the validator.
    #[error("Validation error: {0}")]
    Validation(E),

    /// The post-validation transform failed.
    #[error("Transform error: {0}")]
    Transform(BoxError),
}

impl<E> ScrapeError<E> {
    /// Returns true if the validator rejected the extracted data.
    pub fn is_validation(&self) -> bool {
        matches!(self, ScrapeError::Validation(_))
    }

    /// The validator's native error, if this is a validation failure.
    pub fn validation_error(&self) -> Option<&E> {
        match self {
            ScrapeError::Validation(e) => Some(e),
            _ => None,
        }
    }
}
