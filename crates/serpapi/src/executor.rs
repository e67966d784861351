// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Issues requests against the SerpApi host.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response};
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::{Result, SerpApiError};
use crate::params::{build_url, redact_url, Params};
use crate::source::{RuntimeIdentity, SOURCE};

/// Sends GET requests with a runtime tag and a per-request deadline.
///
/// The executor does not interpret responses: any status, including non-2xx,
/// is handed back to the caller.
#[derive(Debug, Clone)]
pub struct Executor {
	http_client: Client,
	base_url: String,
	identity: Arc<dyn RuntimeIdentity>,
}

impl Executor {
	pub fn new(
		http_client: Client,
		base_url: impl Into<String>,
		identity: Arc<dyn RuntimeIdentity>,
	) -> Self {
		Self {
			http_client,
			base_url: base_url.into().trim_end_matches('/').to_string(),
			identity,
		}
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	/// Builds the full request URL for the path `segments` against the
	/// configured base.
	pub fn build_url(&self, segments: &[&str], params: &Params) -> Result<Url> {
		Ok(build_url(&self.base_url, segments, params)?)
	}

	/// Sends `GET base/segments...` with `params` and the `source` tag.
	///
	/// The whole exchange, including reading the body later through
	/// [`read_text`], is bounded by `timeout`.
	pub async fn execute(
		&self,
		segments: &[&str],
		mut params: Params,
		timeout: Duration,
	) -> Result<Response> {
		params.insert(SOURCE, self.identity.source_tag());
		let url = self.build_url(segments, &params)?;
		let path = url.path().to_string();

		debug!(
			url = %redact_url(&url),
			timeout_ms = timeout.as_millis() as u64,
			"Sending request to SerpApi"
		);

		let response = self
			.http_client
			.get(url)
			.timeout(timeout)
			.send()
			.await
			.map_err(|e| {
				let err = SerpApiError::transport(e, timeout);
				warn!(error = %err, path = %path, "SerpApi request failed");
				err
			})?;

		debug!(status = %response.status(), path = %path, "Received response from SerpApi");
		Ok(response)
	}
}

/// Reads the body as text, mapping a deadline hit mid-body to a timeout.
pub(crate) async fn read_text(response: Response, timeout: Duration) -> Result<String> {
	let body = response.text().await.map_err(|e| {
		let err = SerpApiError::transport(e, timeout);
		warn!(error = %err, "Failed to read SerpApi response body");
		err
	})?;
	trace!(bytes = body.len(), "Read response body");
	Ok(body)
}

/// Reads and parses the body as JSON.
pub(crate) async fn read_json(response: Response, timeout: Duration) -> Result<serde_json::Value> {
	let body = read_text(response, timeout).await?;
	serde_json::from_str(&body).map_err(|e| {
		warn!(error = %e, "Failed to parse SerpApi response");
		SerpApiError::Decode(e)
	})
}
