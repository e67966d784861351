// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Client defaults and their per-request resolution.

use std::time::Duration;

use serpapi_common_config::{load_parsed_env, load_secret_env, SecretString};
use tracing::debug;

use crate::error::{Result, SerpApiError};

/// Environment variable holding the default API key.
pub const API_KEY_ENV: &str = "SERPAPI_API_KEY";
/// Environment variable holding the default timeout in milliseconds.
pub const TIMEOUT_ENV: &str = "SERPAPI_TIMEOUT_MS";

/// Timeout applied when neither the request nor the client sets one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(60_000);

/// Defaults every request falls back to.
#[derive(Debug, Clone)]
pub struct Config {
	/// Key used when a request does not carry its own.
	pub api_key: Option<SecretString>,
	/// Deadline used when a request does not carry its own.
	pub timeout: Duration,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			api_key: None,
			timeout: DEFAULT_TIMEOUT,
		}
	}
}

/// What a single request says about its API key.
#[derive(Debug, Clone, Default)]
pub enum ApiKeyOverride {
	/// Nothing said; use the configured key.
	#[default]
	Inherit,
	/// Explicitly no key. Honoured only by endpoints that allow unmetered use.
	Unmetered,
	/// Use this key.
	Explicit(SecretString),
}

impl Config {
	/// Loads defaults from `SERPAPI_API_KEY` (or `SERPAPI_API_KEY_FILE`) and
	/// `SERPAPI_TIMEOUT_MS`.
	pub fn from_env() -> Result<Self> {
		let config = Config {
			api_key: load_secret_env(API_KEY_ENV)?,
			timeout: load_parsed_env::<u64>(TIMEOUT_ENV)?
				.map(Duration::from_millis)
				.unwrap_or(DEFAULT_TIMEOUT),
		};
		debug!(
			has_api_key = config.api_key.is_some(),
			timeout_ms = config.timeout.as_millis() as u64,
			"loaded client configuration from environment"
		);
		Ok(config)
	}

	pub fn with_api_key(mut self, key: impl Into<SecretString>) -> Self {
		self.api_key = Some(key.into());
		self
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	/// Decides which key, if any, a request is sent with.
	///
	/// An explicit key always wins, even over the configured one; an explicit
	/// empty key is rejected rather than replaced. `Unmetered` yields no key
	/// when `allow_unmetered` is set and otherwise falls back like `Inherit`.
	pub fn resolve_api_key(
		&self,
		explicit: &ApiKeyOverride,
		allow_unmetered: bool,
	) -> Result<Option<SecretString>> {
		let key = match explicit {
			ApiKeyOverride::Unmetered if allow_unmetered => return Ok(None),
			ApiKeyOverride::Explicit(key) => Some(key),
			ApiKeyOverride::Unmetered | ApiKeyOverride::Inherit => self.api_key.as_ref(),
		};
		match key {
			Some(key) if !key.is_empty() => Ok(Some(key.clone())),
			_ => Err(SerpApiError::MissingApiKey),
		}
	}

	/// Returns the request's timeout (milliseconds) or the configured one.
	///
	/// Fails when the resolved value is zero or negative.
	pub fn resolve_timeout(&self, explicit_ms: Option<i64>) -> Result<Duration> {
		match explicit_ms {
			Some(ms) if ms <= 0 => Err(SerpApiError::InvalidTimeout),
			Some(ms) => Ok(Duration::from_millis(ms.unsigned_abs())),
			None if self.timeout.is_zero() => Err(SerpApiError::InvalidTimeout),
			None => Ok(self.timeout),
		}
	}
}
