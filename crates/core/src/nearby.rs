//! "Nearby items" around an anchor heading
//!
//! Shelf-style neighbours of a record: browse a call number index around the
//! record's call number and keep the rows that point at a titled record.

use crate::browse::{browse_command, BrowsePage, BrowseQuery};
use crate::config::NearbyConfig;
use serde::Serialize;
use std::collections::BTreeMap;

/// Extra fields the browse handler must return for nearby items
pub const NEARBY_EXTRAS: &str = "title:author:isbn:id";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NearbyItem {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub heading: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NearbyOutput {
    pub source: String,
    pub from: String,
    pub items: Vec<NearbyItem>,
    /// Command that opens the full browse list at this anchor
    pub browse_command: String,
}

/// Query for the neighbours of `from`, or `None` for an empty anchor
pub fn nearby_query(config: &NearbyConfig, from: &str) -> Option<BrowseQuery> {
    if from.trim().is_empty() {
        return None;
    }

    Some(BrowseQuery {
        source: config.source.clone(),
        from: from.to_string(),
        page: 0,
        page_size: config.size,
        extra_params: BTreeMap::from([("extras".to_string(), NEARBY_EXTRAS.to_string())]),
        negative_offset: -config.rows_before,
    })
}

/// Keep rows carrying a title extra
pub fn summarize_nearby(page: &BrowsePage) -> Vec<NearbyItem> {
    page.rows
        .iter()
        .filter_map(|row| {
            let title = row.first_extra("title")?;
            Some(NearbyItem {
                title: title.to_string(),
                id: row.first_extra("id").map(str::to_string),
                heading: row.heading.clone(),
            })
        })
        .collect()
}

/// Build the nearby output from a fetched page
pub fn build_nearby_output(source: &str, from: &str, page: &BrowsePage) -> NearbyOutput {
    NearbyOutput {
        source: source.to_string(),
        from: from.to_string(),
        items: summarize_nearby(page),
        browse_command: browse_command(source, from, None),
    }
}
