// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! HTTP client construction shared by the SerpApi crates.
//!
//! Every client built here identifies itself as
//! `serpapi-rust/{version} ({platform})`. Applications embedding the library
//! may append their own product token, e.g. `serpapi-rust/0.1.0
//! (linux-x86_64) acme-crawler/2.3`.

use reqwest::{Client, ClientBuilder};
use serpapi_common_version::BuildInfo;

/// Product token leading every User-Agent.
pub const PRODUCT: &str = "serpapi-rust";

/// Creates a client builder with the User-Agent already set.
///
/// `application` is appended to the User-Agent when given. Request deadlines
/// are applied per request, so none is configured here.
///
/// # Example
/// ```ignore
/// let client = serpapi_common_http::builder(Some("acme-crawler/2.3"))
///     .connect_timeout(Duration::from_secs(5))
///     .build()?;
/// ```
pub fn builder(application: Option<&str>) -> ClientBuilder {
	Client::builder().user_agent(user_agent(application))
}

/// Formats the User-Agent header value.
pub fn user_agent(application: Option<&str>) -> String {
	let info = BuildInfo::current();
	let base = format!("{PRODUCT}/{} ({})", info.version, info.platform);
	match application.map(str::trim).filter(|app| !app.is_empty()) {
		Some(app) => format!("{base} {app}"),
		None => base,
	}
}
