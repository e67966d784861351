// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Error types for the SerpApi client.

use std::time::Duration;

use serpapi_common_config::EnvError;
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, SerpApiError>;

/// Errors that can occur when talking to SerpApi.
///
/// Validation failures (`MissingApiKey`, `InvalidTimeout`, `InvalidSearchId`) are
/// raised before
/// any network traffic. A non-2xx response is not an error at this level;
/// the service's JSON error body is returned to the caller unchanged.
#[derive(Debug, Error)]
pub enum SerpApiError {
	/// No API key was supplied and none is configured.
	#[error("missing API key: pass `api_key` or configure a default key")]
	MissingApiKey,

	/// The resolved timeout is not strictly positive.
	#[error("invalid timeout: must be a positive number of milliseconds")]
	InvalidTimeout,

	/// The search id cannot name an archived search (empty, `.` or `..`).
	#[error("invalid search id: `{0}`")]
	InvalidSearchId(String),

	/// The request deadline elapsed before the response was received.
	#[error("request timed out after {}ms", .0.as_millis())]
	Timeout(Duration),

	/// Network-level error during HTTP communication.
	#[error("network error: {0}")]
	Network(#[source] reqwest::Error),

	/// The response body could not be decoded.
	#[error("failed to decode response: {0}")]
	Decode(#[from] serde_json::Error),

	/// The base URL and path did not form a valid URL.
	#[error("invalid request URL: {0}")]
	Url(#[from] url::ParseError),

	/// Configuration could not be loaded from the environment.
	#[error("configuration error: {0}")]
	Config(#[from] EnvError),
}

impl SerpApiError {
	/// True for the deadline-exceeded failure kind.
	pub fn is_timeout(&self) -> bool {
		matches!(self, SerpApiError::Timeout(_))
	}

	/// Maps a transport error, classifying deadline expiry as a timeout.
	pub(crate) fn transport(err: reqwest::Error, timeout: Duration) -> Self {
		if err.is_timeout() {
			SerpApiError::Timeout(timeout)
		} else {
			SerpApiError::Network(err)
		}
	}
}
