//! Validator adapters, one per supported schema system.
//!
//! Every adapter implements [`Validator`](crate::traits::Validator), so a
//! [`Scraper`](crate::scrape::Scraper) can be built over any of them without
//! knowing which schema system is behind it.

mod func;
mod json_schema;
mod passthrough;
mod typed;

pub use func::FnValidator;
pub use json_schema::{JsonSchemaValidator, SchemaIssues};
pub use passthrough::PassthroughValidator;
pub use typed::SerdeValidator;
