//! Solr browse handler wire format
//!
//! Pure functions that turn a [`BrowseQuery`] into request parameters for the
//! `/browse` handler and decode its JSON response into a [`BrowsePage`].

use crate::browse::{BackendError, BrowseItem, BrowsePage, BrowseQuery, BrowseReference};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Path of the browse handler below the core URL
pub const BROWSE_HANDLER: &str = "browse";

/// Parameters owned by the query itself; extra params may not override them
const RESERVED_PARAMS: [&str; 6] = ["from", "json.nl", "offset", "rows", "source", "wt"];

/// Error fragments the handler emits when the browse database was never built
const INDEX_MISSING_MARKERS: [&str; 3] = [
    "does not exist",
    "no such table",
    "couldn't find a browse index",
];

#[derive(Debug, Deserialize)]
struct RawResponse {
    #[serde(rename = "Browse")]
    browse: Option<RawBrowse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBrowse {
    #[serde(default)]
    start_row: i64,
    #[serde(default)]
    offset: i64,
    #[serde(default)]
    total_count: i64,
    #[serde(default)]
    match_type: Option<String>,
    #[serde(default)]
    items: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    heading: String,
    #[serde(default, rename = "sort_key")]
    sort_key: Option<String>,
    #[serde(default)]
    count: u64,
    #[serde(default)]
    ids: Value,
    #[serde(default)]
    extras: BTreeMap<String, Value>,
    #[serde(default)]
    see_also: Vec<RawReference>,
    #[serde(default)]
    use_instead: Vec<RawReference>,
    #[serde(default)]
    note: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawReference {
    Heading(String),
    Full(BrowseReference),
}

impl From<RawReference> for BrowseReference {
    fn from(raw: RawReference) -> Self {
        match raw {
            RawReference::Heading(heading) => BrowseReference { heading, count: 0 },
            RawReference::Full(reference) => reference,
        }
    }
}

impl From<RawItem> for BrowseItem {
    fn from(raw: RawItem) -> Self {
        BrowseItem {
            heading: raw.heading,
            sort_key: raw.sort_key,
            count: raw.count,
            ids: flatten_strings(&raw.ids),
            extras: raw
                .extras
                .iter()
                .map(|(field, values)| (field.clone(), flatten_strings(values)))
                .collect(),
            see_also: raw.see_also.into_iter().map(Into::into).collect(),
            use_instead: raw.use_instead.into_iter().map(Into::into).collect(),
            note: raw.note.filter(|n| !n.is_empty()),
        }
    }
}

/// Collect every string found in a (possibly nested) JSON value, in order
///
/// The handler returns extras as lists of value lists (`[["Title"]]`).
fn flatten_strings(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Number(n) => vec![n.to_string()],
        Value::Array(values) => values.iter().flat_map(flatten_strings).collect(),
        _ => Vec::new(),
    }
}

/// Build browse handler parameters for a query
pub fn browse_params(query: &BrowseQuery) -> Vec<(String, String)> {
    let mut params = vec![
        ("from".to_string(), query.from.clone()),
        ("json.nl".to_string(), "arrarr".to_string()),
        ("offset".to_string(), query.offset().to_string()),
        ("rows".to_string(), query.page_size.to_string()),
        ("source".to_string(), query.source.clone()),
        ("wt".to_string(), "json".to_string()),
    ];

    params.extend(
        query
            .extra_params
            .iter()
            .filter(|(key, _)| !RESERVED_PARAMS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone())),
    );

    params
}

/// Decode a browse handler response body
///
/// # Errors
/// `BackendError::Unavailable` when the body is not JSON or has no `Browse`
/// section.
pub fn parse_browse_response(body: &str) -> Result<BrowsePage, BackendError> {
    let raw: RawResponse = serde_json::from_str(body)
        .map_err(|e| BackendError::Unavailable(format!("malformed browse response: {e}")))?;

    let browse = raw.browse.ok_or_else(|| {
        BackendError::Unavailable("malformed browse response: missing Browse section".to_string())
    })?;

    Ok(BrowsePage {
        total_count: browse.total_count.max(0),
        offset: browse.offset,
        start_row: browse.start_row,
        match_type: browse.match_type.unwrap_or_default(),
        rows: browse.items.into_iter().map(Into::into).collect(),
    })
}

/// Map a failed handler response to a backend error
///
/// Solr wraps errors as `{"error": {"msg": ...}}`; other bodies are used as-is.
pub fn classify_error(status: u16, body: &str) -> BackendError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["msg"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string());

    let lowered = message.to_lowercase();
    if INDEX_MISSING_MARKERS.iter().any(|m| lowered.contains(m)) {
        return BackendError::IndexMissing(message);
    }

    match status {
        408 | 504 => BackendError::Timeout(format!("HTTP {status}: {message}")),
        _ => BackendError::Unavailable(format!("HTTP {status}: {message}")),
    }
}
