//! Core library for alphabrowse
//!
//! This crate implements the **Functional Core** of the alphabrowse application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`alphabrowse_core`** (this crate): Pure transformation functions
//! - **`alphabrowse`**: HTTP client, servers and orchestration (the Imperative Shell)
//!
//! Nothing here talks to the browse handler. The calculator decides which
//! queries to run, the shell runs them and hands the pages back.
//!
//! # Module Organization
//!
//! - [`browse`]: Pagination and highlight calculator for alphabetic browse
//! - [`solr`]: Browse handler request parameters and response decoding
//! - [`config`]: Typed configuration and its defaults
//! - [`access`]: Ordered permission table keyed by type tag
//! - [`nearby`]: "Nearby items" summary around a single anchor
//!
//! # Example Usage
//!
//! ```rust
//! use alphabrowse_core::browse::{compute_browse, BrowsePage, BrowseRequest};
//!
//! let request = BrowseRequest::new("topic", Some("science".to_string()), 0, 20, 5, true)?;
//!
//! // Any function returning pages will do; no HTTP required
//! let view = compute_browse(&request, |query| {
//!     Ok(BrowsePage {
//!         total_count: 100,
//!         offset: query.negative_offset,
//!         start_row: 8,
//!         ..BrowsePage::default()
//!     })
//! });
//!
//! assert_eq!(view.next_page_index, Some(1));
//! # Ok::<(), alphabrowse_core::browse::BrowseError>(())
//! ```

pub mod access;
pub mod browse;
pub mod config;
pub mod nearby;
pub mod solr;
