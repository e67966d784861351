// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Request parameters and URL construction.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;
use url::Url;

use serpapi_common_config::REDACTED;

/// Key under which the API key travels in a parameter set.
pub const API_KEY: &str = "api_key";
/// Key under which the per-request timeout (milliseconds) travels.
pub const TIMEOUT: &str = "timeout";
/// Key selecting the search engine.
pub const ENGINE: &str = "engine";

/// A scalar query parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
	Bool(bool),
	Int(i64),
	Float(f64),
	Str(String),
}

impl ParamValue {
	pub fn as_str(&self) -> Option<&str> {
		match self {
			ParamValue::Str(s) => Some(s),
			_ => None,
		}
	}
}

impl fmt::Display for ParamValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ParamValue::Bool(b) => write!(f, "{b}"),
			ParamValue::Int(i) => write!(f, "{i}"),
			ParamValue::Float(x) if x.is_infinite() => {
				f.write_str(if *x > 0.0 { "Infinity" } else { "-Infinity" })
			}
			ParamValue::Float(x) => write!(f, "{x}"),
			ParamValue::Str(s) => f.write_str(s),
		}
	}
}

impl From<&str> for ParamValue {
	fn from(value: &str) -> Self {
		ParamValue::Str(value.to_string())
	}
}

impl From<String> for ParamValue {
	fn from(value: String) -> Self {
		ParamValue::Str(value)
	}
}

impl From<&String> for ParamValue {
	fn from(value: &String) -> Self {
		ParamValue::Str(value.clone())
	}
}

impl From<bool> for ParamValue {
	fn from(value: bool) -> Self {
		ParamValue::Bool(value)
	}
}

impl From<i64> for ParamValue {
	fn from(value: i64) -> Self {
		ParamValue::Int(value)
	}
}

impl From<i32> for ParamValue {
	fn from(value: i32) -> Self {
		ParamValue::Int(value.into())
	}
}

impl From<u32> for ParamValue {
	fn from(value: u32) -> Self {
		ParamValue::Int(value.into())
	}
}

impl From<f64> for ParamValue {
	fn from(value: f64) -> Self {
		ParamValue::Float(value)
	}
}

/// A set of query parameters.
///
/// Each key maps either to a value or to an explicit absence. Absent entries
/// are never serialized, but they are remembered: an absent `api_key` means
/// "send no key" rather than "use the default key". Keys are kept sorted, so
/// two parameter sets with the same entries always serialize identically.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params {
	entries: BTreeMap<String, Option<ParamValue>>,
}

impl Params {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets `key` to `value`, returning the updated set.
	pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
		self.insert(key, value);
		self
	}

	/// Marks `key` as explicitly absent, returning the updated set.
	pub fn with_absent(mut self, key: impl Into<String>) -> Self {
		self.insert_absent(key);
		self
	}

	/// Sets `key` to `value` when present, or marks it absent when `None`.
	pub fn with_opt<V: Into<ParamValue>>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
		self.entries.insert(key.into(), value.map(Into::into));
		self
	}

	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
		self.entries.insert(key.into(), Some(value.into()));
	}

	pub fn insert_absent(&mut self, key: impl Into<String>) {
		self.entries.insert(key.into(), None);
	}

	/// The value for `key`, or `None` when the key is missing or absent.
	pub fn get(&self, key: &str) -> Option<&ParamValue> {
		self.entries.get(key).and_then(Option::as_ref)
	}

	/// Distinguishes a missing key (`None`) from an absent one (`Some(None)`).
	pub fn lookup(&self, key: &str) -> Option<Option<&ParamValue>> {
		self.entries.get(key).map(Option::as_ref)
	}

	pub fn remove(&mut self, key: &str) -> Option<Option<ParamValue>> {
		self.entries.remove(key)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.entries.contains_key(key)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterates over the entries that carry a value, in key order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
		self.entries
			.iter()
			.filter_map(|(k, v)| v.as_ref().map(|v| (k.as_str(), v)))
	}

	/// Copies every entry of `other` over this set; `other` wins on conflict.
	pub fn overlay(&mut self, other: Params) {
		self.entries.extend(other.entries);
	}

	/// Serializes the present entries as an `x-www-form-urlencoded` string.
	pub fn query_string(&self) -> String {
		form_urlencoded::Serializer::new(String::new())
			.extend_pairs(self.iter().map(|(k, v)| (k, v.to_string())))
			.finish()
	}

	/// Parses the query component of `url` into string-valued parameters.
	pub fn from_url_query(url: &Url) -> Self {
		url.query_pairs()
			.map(|(k, v)| (k.into_owned(), v.into_owned()))
			.collect()
	}
}

impl fmt::Debug for Params {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut map = f.debug_map();
		for (key, value) in &self.entries {
			match value {
				Some(_) if key == API_KEY => map.entry(key, &REDACTED),
				Some(v) => map.entry(key, &v.to_string()),
				None => map.entry(key, &"<absent>"),
			};
		}
		map.finish()
	}
}

impl<K, V> FromIterator<(K, V)> for Params
where
	K: Into<String>,
	V: Into<ParamValue>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut params = Params::new();
		params.extend(iter);
		params
	}
}

impl<K, V> Extend<(K, V)> for Params
where
	K: Into<String>,
	V: Into<ParamValue>,
{
	fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
		for (k, v) in iter {
			self.insert(k, v);
		}
	}
}

impl IntoIterator for Params {
	type Item = (String, Option<ParamValue>);
	type IntoIter = btree_map::IntoIter<String, Option<ParamValue>>;

	fn into_iter(self) -> Self::IntoIter {
		self.entries.into_iter()
	}
}

/// Builds `base/segment/...?query` for the given parameters.
///
/// Each segment is percent-encoded as a single path segment, so `/`, `?` and
/// `#` inside it cannot change the path or start a query. `.` and `..`
/// segments are dropped. A trailing `/` on `base` is ignored. Absent
/// parameters are dropped.
pub fn build_url(base: &str, segments: &[&str], params: &Params) -> Result<Url, url::ParseError> {
	let mut url = Url::parse(base)?;
	url.path_segments_mut()
		.map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
		.pop_if_empty()
		.extend(segments);
	url.set_query(Some(&params.query_string()));
	Ok(url)
}

/// Renders `url` for logs with the `api_key` value replaced.
pub fn redact_url(url: &Url) -> String {
	let mut redacted = url.clone();
	let pairs: Vec<(String, String)> = url
		.query_pairs()
		.map(|(k, v)| {
			let value = if k == API_KEY { REDACTED.to_string() } else { v.into_owned() };
			(k.into_owned(), value)
		})
		.collect();
	if url.query().is_some() {
		redacted.query_pairs_mut().clear().extend_pairs(pairs);
	}
	redacted.to_string()
}
