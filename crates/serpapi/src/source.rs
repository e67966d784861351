// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Identification of the calling runtime.
//!
//! Every request carries a `source` parameter of the form
//! `<runtime>@<version>` so the service can tell client versions apart.
//! The lookup sits behind [`RuntimeIdentity`] so tests can pin the value.

use std::fmt;

use serpapi_common_version::{BuildInfo, RUNTIME_NAME};

/// Query parameter carrying the runtime tag.
pub const SOURCE: &str = "source";

/// Produces the tag sent as the `source` query parameter.
///
/// Implementations must not fail; fall back to a generic tag instead.
pub trait RuntimeIdentity: fmt::Debug + Send + Sync {
	fn source_tag(&self) -> String;
}

/// Reports the Rust toolchain the client was compiled with, e.g. `rust@1.82.0`.
///
/// Falls back to a bare `rust` if the compiler version is unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustRuntime;

impl RuntimeIdentity for RustRuntime {
	fn source_tag(&self) -> String {
		tag_for(BuildInfo::current().rustc_semver())
	}
}

/// A fixed tag, for tests and embedders that want to report their own name.
#[derive(Debug, Clone)]
pub struct FixedIdentity(String);

impl FixedIdentity {
	pub fn new(tag: impl Into<String>) -> Self {
		Self(tag.into())
	}
}

impl RuntimeIdentity for FixedIdentity {
	fn source_tag(&self) -> String {
		self.0.clone()
	}
}

fn tag_for(version: Option<&str>) -> String {
	match version {
		Some(version) => format!("{RUNTIME_NAME}@{version}"),
		None => RUNTIME_NAME.to_string(),
	}
}
