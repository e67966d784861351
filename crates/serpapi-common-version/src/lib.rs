// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Build and toolchain information for the SerpApi client crates.
//!
//! This crate is the single source of truth for the package version, git
//! SHA, target platform and the `rustc` release the client was compiled
//! with. The latter is what the client reports to the service as its
//! runtime.

shadow_rs::shadow!(build);

/// Platform string in `{os}-{arch}` format, e.g. "linux-x86_64".
///
/// Derived at compile time from target configuration.
pub const PLATFORM: &str = env!("SERPAPI_PLATFORM");

/// Name reported for the runtime when identifying the client.
pub const RUNTIME_NAME: &str = "rust";

/// Core build information used for identification headers and tags.
#[derive(Debug, Clone, Copy)]
pub struct BuildInfo {
	pub version: &'static str,
	pub git_sha: &'static str,
	pub rust_version: &'static str,
	pub platform: &'static str,
}

impl BuildInfo {
	/// Get the current build information (compile-time constants).
	#[allow(clippy::const_is_empty)]
	pub const fn current() -> Self {
		Self {
			version: build::PKG_VERSION,
			git_sha: if build::SHORT_COMMIT.is_empty() {
				"unknown"
			} else {
				build::SHORT_COMMIT
			},
			rust_version: build::RUST_VERSION,
			platform: PLATFORM,
		}
	}

	/// The bare semantic version of the compiler, e.g. `1.82.0`.
	pub fn rustc_semver(&self) -> Option<&'static str> {
		parse_rustc_semver(self.rust_version)
	}
}

/// Extracts the version number from `rustc --version` style output.
///
/// `"rustc 1.82.0 (f6e511eec 2024-10-15)"` yields `Some("1.82.0")`. Returns
/// `None` when the string does not look like compiler version output.
pub fn parse_rustc_semver(raw: &'static str) -> Option<&'static str> {
	let version = raw.trim().strip_prefix("rustc ")?.split_whitespace().next()?;
	let numeric = version.split('-').next()?;
	let parts: Vec<&str> = numeric.split('.').collect();
	if parts.len() != 3 || !parts.iter().all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit())) {
		return None;
	}
	Some(version)
}
