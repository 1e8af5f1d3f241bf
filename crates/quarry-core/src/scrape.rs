use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::{Map, Value};

use crate::document::Document;
use crate::error::{BoxError, ConfigError, ExtractError, ScrapeError};
use crate::extract::extract;
use crate::field::FieldMap;
use crate::traits::Validator;
use crate::validators::JsonSchemaValidator;

/// Outcome of one scraper invocation: the final data, or the first failure.
pub type ScraperResult<T, E> = Result<T, ScrapeError<E>>;

type TransformFn<T, R> = Arc<dyn Fn(T) -> BoxFuture<'static, Result<R, BoxError>> + Send + Sync>;

/// Last pipeline step, applied to validated data.
enum Finisher<T, R> {
    /// No transform configured; only used when `R` is the validator output.
    Identity(fn(T) -> R),
    Transform(TransformFn<T, R>),
}

/// Orchestrates the pipeline: parse → extract → validate → transform.
///
/// Generic over the [`Validator`], so any schema system can sit behind it.
/// Configuration is immutable after construction; a `Scraper` can be shared
/// across tasks and invoked concurrently.
///
/// ```rust
/// use quarry_core::{Field, FieldMap, Scraper};
/// use quarry_core::validators::PassthroughValidator;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let fields = FieldMap::new().field("title", Field::text("title")?);
/// let scraper = Scraper::new(fields, PassthroughValidator)?;
/// let data = scraper.scrape("<title>Hello</title>").await?;
/// assert_eq!(data["title"], "Hello");
/// # Ok(())
/// # }
/// ```
pub struct Scraper<V: Validator, R = <V as Validator>::Output> {
    fields: FieldMap,
    validator: V,
    finisher: Finisher<V::Output, R>,
}

impl<V: Validator> Scraper<V, V::Output> {
    /// Create a scraper without a transform step.
    ///
    /// Fails if a field definition is inconsistent (see [`FieldMap::check`]).
    pub fn new(fields: FieldMap, validator: V) -> Result<Self, ConfigError> {
        fields.check()?;
        Ok(Self {
            fields,
            validator,
            finisher: Finisher::Identity(std::convert::identity),
        })
    }

    /// Add an asynchronous transform, run once on validated data.
    pub fn with_transform<R, F, Fut, E>(self, transform: F) -> Scraper<V, R>
    where
        F: Fn(V::Output) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        E: Into<BoxError>,
    {
        let boxed: TransformFn<V::Output, R> = Arc::new(
            move |data: V::Output| -> BoxFuture<'static, Result<R, BoxError>> {
                transform(data)
                    .map(|result: Result<R, E>| result.map_err(Into::into))
                    .boxed()
            },
        );

        Scraper {
            fields: self.fields,
            validator: self.validator,
            finisher: Finisher::Transform(boxed),
        }
    }

    /// Add a synchronous transform, run once on validated data.
    pub fn with_transform_sync<R, F, E>(self, transform: F) -> Scraper<V, R>
    where
        F: Fn(V::Output) -> Result<R, E> + Send + Sync + 'static,
        R: Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        self.with_transform(move |data| futures::future::ready(transform(data)))
    }
}

impl Scraper<JsonSchemaValidator> {
    /// Create a scraper validating against a JSON Schema, with coercion and
    /// schema defaults enabled.
    pub fn with_schema(fields: FieldMap, schema: &Value) -> Result<Self, ConfigError> {
        Self::new(fields, JsonSchemaValidator::new(schema)?.with_coercion())
    }
}

impl<V: Validator, R: Send> Scraper<V, R> {
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    pub fn validator(&self) -> &V {
        &self.validator
    }

    /// Run only the extraction step against a parsed document.
    pub fn extract(&self, document: &Document) -> Result<Map<String, Value>, ExtractError> {
        extract(&self.fields, document)
    }

    /// Parse `html` and run the full pipeline.
    ///
    /// Parsing and extraction happen before the returned future is first
    /// polled; only validation and the transform are awaited.
    pub fn scrape(&self, html: &str) -> impl Future<Output = ScraperResult<R, V::Error>> + Send {
        let extracted = {
            let document = Document::parse(html);
            self.extract(&document)
        };
        self.complete(extracted)
    }

    /// Run the full pipeline against an already parsed document.
    pub fn scrape_document(
        &self,
        document: &Document,
    ) -> impl Future<Output = ScraperResult<R, V::Error>> + Send {
        self.complete(self.extract(document))
    }

    async fn complete(
        &self,
        extracted: Result<Map<String, Value>, ExtractError>,
    ) -> ScraperResult<R, V::Error> {
        let data = extracted.inspect_err(|e| {
            tracing::warn!(field = %e.field, error = %e.source, "Extraction failed");
        })?;
        tracing::debug!(fields = data.len(), "Extraction complete");

        let validated = self
            .validator
            .validate(Value::Object(data))
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, "Validation failed");
                ScrapeError::Validation(e)
            })?;

        match &self.finisher {
            Finisher::Identity(identity) => Ok(identity(validated)),
            Finisher::Transform(transform) => transform(validated).await.map_err(|e| {
                tracing::debug!(error = %e, "Transform failed");
                ScrapeError::Transform(e)
            }),
        }
    }
}
