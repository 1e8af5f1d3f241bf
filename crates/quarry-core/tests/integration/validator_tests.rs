use quarry_core::coerce::from_str_or_native;
use quarry_core::validators::{FnValidator, JsonSchemaValidator, PassthroughValidator, SerdeValidator};
use quarry_core::{Field, FieldMap, ScrapeError, Scraper, Validator};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::common::*;

#[derive(Debug, Deserialize, PartialEq)]
struct Page {
    title: String,
    description: String,
    keywords: Vec<String>,
    #[serde(deserialize_with = "from_str_or_native")]
    views: u64,
}

#[derive(Debug, thiserror::Error)]
#[error("missing field `{0}`")]
struct MissingField(&'static str);

fn expected_page() -> Page {
    Page {
        title: "Example Title".into(),
        description: "An example description.".into(),
        keywords: vec!["typescript".into(), "html".into(), "parsing".into()],
        views: 1234,
    }
}

/// Same fields as `page_fields`, but `views` is left as a raw string.
fn raw_views_fields() -> FieldMap {
    page_fields().field(
        "views",
        Field::attr(r#"meta[name="views"]"#, "content").unwrap(),
    )
}

#[tokio::test]
async fn serde_validator_decodes_typed_output() {
    let scraper = Scraper::new(page_fields(), SerdeValidator::<Page>::new()).unwrap();

    let page = scraper.scrape(KITCHEN_SINK).await.unwrap();

    assert_eq!(page, expected_page());
}

#[tokio::test]
async fn serde_validator_coerces_string_numbers() {
    let scraper = Scraper::new(raw_views_fields(), SerdeValidator::<Page>::new()).unwrap();

    let page = scraper.scrape(KITCHEN_SINK).await.unwrap();

    assert_eq!(page.views, 1234);
}

#[tokio::test]
async fn serde_validator_rejects_unparseable_number() {
    let scraper = Scraper::new(raw_views_fields(), SerdeValidator::<Page>::new()).unwrap();
    let html = KITCHEN_SINK.replace(r#"content="1234""#, r#"content="invalid""#);

    let err = scraper.scrape(&html).await.unwrap_err();

    let native: &serde_json::Error = err.validation_error().unwrap();
    assert!(native.is_data());
}

#[tokio::test]
async fn fn_validator_wraps_custom_checks() {
    let validator = FnValidator::new(|value: Value| {
        let title = value
            .get("title")
            .and_then(Value::as_str)
            .ok_or(MissingField("title"))?;
        Ok::<_, MissingField>(title.to_uppercase())
    });
    let scraper = Scraper::new(page_fields(), validator).unwrap();

    assert_eq!(scraper.scrape(KITCHEN_SINK).await.unwrap(), "EXAMPLE TITLE");

    match scraper.scrape(EMPTY_HEAD).await {
        Err(ScrapeError::Validation(MissingField(name))) => assert_eq!(name, "title"),
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn adapters_agree_on_the_same_page() {
    let from_schema = Scraper::with_schema(page_fields(), &page_schema())
        .unwrap()
        .scrape(KITCHEN_SINK)
        .await
        .unwrap();
    let from_passthrough = Scraper::new(page_fields(), PassthroughValidator)
        .unwrap()
        .scrape(KITCHEN_SINK)
        .await
        .unwrap();
    let from_serde = Scraper::new(page_fields(), SerdeValidator::<Page>::new())
        .unwrap()
        .scrape(KITCHEN_SINK)
        .await
        .unwrap();

    assert_eq!(from_schema, from_passthrough);
    assert_eq!(from_serde, serde_json::from_value::<Page>(from_schema).unwrap());
}

#[tokio::test]
async fn schema_without_coercion_rejects_raw_strings() {
    let validator = JsonSchemaValidator::new(&page_schema()).unwrap();
    let scraper = Scraper::new(raw_views_fields(), validator).unwrap();

    let err = scraper.scrape(KITCHEN_SINK).await.unwrap_err();

    assert_eq!(err.validation_error().map(|issues| issues.len()), Some(1));
}

#[tokio::test]
async fn validators_can_be_used_directly() {
    let validator = JsonSchemaValidator::new(&page_schema()).unwrap().with_coercion();
    let value = json!({
        "title": "t",
        "description": "d",
        "keywords": [],
        "views": "7"
    });

    let out = validator.validate(value).await.unwrap();

    assert_eq!(out["views"], 7);
}

#[tokio::test]
async fn serde_validator_accepts_defaults_on_empty_page() {
    let scraper = Scraper::new(page_fields_with_defaults(), SerdeValidator::<Page>::new()).unwrap();

    let page = scraper.scrape(EMPTY_HEAD).await.unwrap();

    assert_eq!(
        page,
        Page {
            title: "No title".into(),
            description: "No description".into(),
            keywords: vec![],
            views: 0,
        }
    );
}

#[derive(Debug, Deserialize, PartialEq)]
struct Image {
    url: String,
    #[serde(deserialize_with = "from_str_or_native")]
    width: u32,
    #[serde(deserialize_with = "from_str_or_native")]
    height: u32,
}

#[derive(Debug, Deserialize, PartialEq)]
struct ImagePage {
    title: String,
    image: Image,
}

fn image_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "title": {"type": "string"},
            "image": {
                "type": "object",
                "properties": {
                    "url": {"type": "string"},
                    "width": {"type": "integer"},
                    "height": {"type": "integer"}
                },
                "required": ["url", "width", "height"]
            }
        },
        "required": ["title", "image"]
    })
}

/// og:image fields with width/height left as raw strings.
fn raw_image_fields() -> FieldMap {
    FieldMap::new()
        .field("title", Field::text("title").unwrap())
        .field(
            "image",
            FieldMap::new()
                .field("url", Field::attr(r#"meta[property="og:image"]"#, "content").unwrap())
                .field(
                    "width",
                    Field::attr(r#"meta[property="og:image:width"]"#, "content").unwrap(),
                )
                .field(
                    "height",
                    Field::attr(r#"meta[property="og:image:height"]"#, "content").unwrap(),
                ),
        )
}

#[tokio::test]
async fn schema_validates_nested_image_dimensions() {
    let expected = json!({
        "title": "Example Title",
        "image": {"url": OG_IMAGE_URL, "width": 1372, "height": 708}
    });

    let transformed = Scraper::with_schema(nested_image_fields(), &image_schema())
        .unwrap()
        .scrape(KITCHEN_SINK_WITH_NESTED)
        .await
        .unwrap();
    let coerced = Scraper::with_schema(raw_image_fields(), &image_schema())
        .unwrap()
        .scrape(KITCHEN_SINK_WITH_NESTED)
        .await
        .unwrap();

    assert_eq!(transformed, expected);
    assert_eq!(coerced, expected);
}

#[tokio::test]
async fn schema_reports_location_of_bad_nested_dimension() {
    let scraper = Scraper::with_schema(raw_image_fields(), &image_schema()).unwrap();
    let html = KITCHEN_SINK_WITH_NESTED.replace(r#"content="1372""#, r#"content="wide""#);

    let err = scraper.scrape(&html).await.unwrap_err();

    let issues = err.validation_error().unwrap();
    assert_eq!(issues.instance_paths(), vec!["/image/width"]);
}

#[tokio::test]
async fn serde_validator_decodes_nested_image() {
    let expected = ImagePage {
        title: "Example Title".into(),
        image: Image {
            url: OG_IMAGE_URL.into(),
            width: 1372,
            height: 708,
        },
    };

    let from_transformed = Scraper::new(nested_image_fields(), SerdeValidator::<ImagePage>::new())
        .unwrap()
        .scrape(KITCHEN_SINK_WITH_NESTED)
        .await
        .unwrap();
    let from_raw = Scraper::new(raw_image_fields(), SerdeValidator::<ImagePage>::new())
        .unwrap()
        .scrape(KITCHEN_SINK_WITH_NESTED)
        .await
        .unwrap();

    assert_eq!(from_transformed, expected);
    assert_eq!(from_raw, expected);
}
