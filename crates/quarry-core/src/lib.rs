//! Declarative HTML field extraction with pluggable schema validation.
//!
//! A [`Scraper`] runs a fixed pipeline over a page: parse the markup, extract
//! the configured [`FieldMap`] into a plain JSON object, hand that object to
//! a [`Validator`], and optionally transform the validated data.

pub mod coerce;
pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod field;
pub mod scrape;
pub mod traits;
pub mod validators;

#[cfg(test)]
mod testutil;

pub use config::ScraperConfig;
pub use document::Document;
pub use error::{BoxError, ConfigError, ExtractError, ScrapeError};
pub use extract::extract;
pub use field::{Field, FieldDefinition, FieldMap, ScopedField};
pub use scrape::{Scraper, ScraperResult};
pub use traits::{ValidationResult, Validator};
