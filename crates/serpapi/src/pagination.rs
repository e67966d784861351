// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Result pages and next-page cursors.
//!
//! A search response advertises its successor as a complete URL under
//! `serpapi_pagination.next` (or `pagination.next` for some engines). The
//! query of that URL, laid over the parameters the caller started with, is
//! everything needed to fetch the next page. That parameter set is the
//! [`Cursor`]; a page without one is the last page.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::params::Params;

/// Top-level fields that may carry a next-page link, in lookup order.
const PAGINATION_FIELDS: [&str; 2] = ["serpapi_pagination", "pagination"];

/// Everything needed to request the page after the one it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
	params: Params,
}

impl Cursor {
	/// The full parameter set of the next request, options included.
	pub fn params(&self) -> &Params {
		&self.params
	}

	pub fn into_params(self) -> Params {
		self.params
	}
}

/// A decoded search result page.
#[derive(Debug, Clone)]
pub struct Page {
	/// The response payload as returned by the service.
	pub body: Value,
	/// Present while more pages are available.
	pub next: Option<Cursor>,
}

impl Page {
	pub fn has_next(&self) -> bool {
		self.next.is_some()
	}

	/// Shorthand for a top-level field of the payload.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.body.get(key)
	}

	pub fn into_body(self) -> Value {
		self.body
	}
}

/// The next-page link advertised by `body`, if any.
pub fn next_link(body: &Value) -> Option<&str> {
	PAGINATION_FIELDS
		.iter()
		.filter_map(|field| body.get(field)?.get("next")?.as_str())
		.find(|link| !link.is_empty())
}

/// Derives the cursor for the page after `body`, which was fetched with
/// `current` (the caller's parameters before option extraction).
///
/// Returns `None` on the last page, when the link cannot be parsed, and when
/// following the link would repeat the current request.
pub fn next_cursor(current: &Params, body: &Value) -> Option<Cursor> {
	let link = next_link(body)?;
	let url = match Url::parse(link) {
		Ok(url) => url,
		Err(e) => {
			warn!(error = %e, "Ignoring unparseable next-page link");
			return None;
		}
	};

	let mut params = current.clone();
	params.overlay(Params::from_url_query(&url));

	if params.query_string() == current.query_string() {
		debug!("Next-page link repeats the current request; treating as last page");
		return None;
	}

	Some(Cursor { params })
}
