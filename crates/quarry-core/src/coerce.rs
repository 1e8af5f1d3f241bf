//! Serde helpers for decoding scraped strings into typed fields.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

/// Accept either the native representation of `T` or a string parsed with
/// [`FromStr`]. Surrounding whitespace in strings is ignored.
///
/// ```rust
/// #[derive(serde::Deserialize)]
/// struct Page {
///     #[serde(deserialize_with = "quarry_core::coerce::from_str_or_native")]
///     views: u64,
/// }
///
/// let page: Page = serde_json::from_value(serde_json::json!({"views": "1234"})).unwrap();
/// assert_eq!(page.views, 1234);
/// ```
pub fn from_str_or_native<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Deserialize<'de>,
    T::Err: Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StrOrNative<T> {
        Native(T),
        Str(String),
    }

    match StrOrNative::<T>::deserialize(deserializer)? {
        StrOrNative::Native(value) => Ok(value),
        StrOrNative::Str(raw) => raw.trim().parse().map_err(serde::de::Error::custom),
    }
}
