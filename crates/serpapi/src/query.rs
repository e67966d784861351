// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Call shapes accepted by the search operations.
//!
//! Two conventions are supported: a single parameter set that names its own
//! `engine`, and the older `(engine, params)` pair. Both collapse into one
//! canonical [`Params`] before anything else happens.

use serpapi_common_config::SecretString;

use crate::config::ApiKeyOverride;
use crate::error::{Result, SerpApiError};
use crate::params::{ParamValue, Params, API_KEY, ENGINE, TIMEOUT};

/// The arguments of a search call.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
	/// `get_json(params)` with `engine` inside `params`.
	Unified(Params),
	/// `get_json((engine, params))`.
	Legacy { engine: String, params: Params },
}

impl Query {
	pub fn legacy(engine: impl Into<String>, params: Params) -> Self {
		Query::Legacy {
			engine: engine.into(),
			params,
		}
	}

	/// Collapses either shape into one parameter set.
	///
	/// A separately supplied engine replaces any `engine` in the parameters.
	pub fn normalize(self) -> Params {
		match self {
			Query::Unified(params) => params,
			Query::Legacy { engine, mut params } => {
				params.insert(ENGINE, engine);
				params
			}
		}
	}
}

impl From<Params> for Query {
	fn from(params: Params) -> Self {
		Query::Unified(params)
	}
}

impl<E: Into<String>> From<(E, Params)> for Query {
	fn from((engine, params): (E, Params)) -> Self {
		Query::legacy(engine, params)
	}
}

/// Per-request options carried inside the parameter set.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
	pub api_key: ApiKeyOverride,
	/// Deadline in milliseconds; may be non-positive until validated.
	pub timeout_ms: Option<i64>,
}

impl RequestOptions {
	/// Removes `api_key` and `timeout` from `params` and interprets them.
	///
	/// A missing `api_key` inherits the configured key; an absent one asks for
	/// an unmetered request. An absent `timeout` is the same as a missing one.
	pub fn extract(params: &mut Params) -> Result<Self> {
		let api_key = match params.remove(API_KEY) {
			None => ApiKeyOverride::Inherit,
			Some(None) => ApiKeyOverride::Unmetered,
			Some(Some(value)) => ApiKeyOverride::Explicit(SecretString::new(value.to_string())),
		};
		let timeout_ms = match params.remove(TIMEOUT) {
			None | Some(None) => None,
			Some(Some(value)) => Some(timeout_millis(&value)?),
		};
		Ok(Self {
			api_key,
			timeout_ms,
		})
	}
}

fn timeout_millis(value: &ParamValue) -> Result<i64> {
	let millis = match value {
		ParamValue::Int(ms) => return Ok(*ms),
		ParamValue::Float(ms) => *ms,
		ParamValue::Str(raw) => raw.trim().parse::<f64>().map_err(|_| SerpApiError::InvalidTimeout)?,
		ParamValue::Bool(_) => return Err(SerpApiError::InvalidTimeout),
	};
	if !millis.is_finite() {
		return Err(SerpApiError::InvalidTimeout);
	}
	// Sub-millisecond positive values round up so they stay valid.
	Ok(millis.ceil() as i64)
}
