// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Command-line arguments.

use std::sync::LazyLock;
use std::time::Duration;

use clap::{Args as ClapArgs, Parser, Subcommand};
use serpapi::{Config, Params};

/// Query SerpApi from the command line
#[derive(Parser, Debug)]
#[command(name = "serpapi", version, long_version = LONG_VERSION.as_str())]
pub struct Cli {
	#[command(flatten)]
	pub global: GlobalArgs,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(ClapArgs, Debug)]
pub struct GlobalArgs {
	/// API key (or set SERPAPI_API_KEY / SERPAPI_API_KEY_FILE)
	#[arg(long, global = true, env = "SERPAPI_API_KEY", hide_env_values = true)]
	pub api_key: Option<String>,

	/// Request timeout in milliseconds
	#[arg(long, global = true, env = "SERPAPI_TIMEOUT_MS")]
	pub timeout_ms: Option<u64>,

	/// API host
	#[arg(long, global = true, env = "SERPAPI_BASE_URL")]
	pub base_url: Option<String>,

	/// Emit logs as JSON
	#[arg(long, global = true)]
	pub json_logs: bool,
}

impl GlobalArgs {
	/// Applies command-line overrides on top of `config`.
	pub fn apply(&self, mut config: Config) -> Config {
		if let Some(key) = &self.api_key {
			config = config.with_api_key(key.as_str());
		}
		if let Some(ms) = self.timeout_ms {
			config = config.with_timeout(Duration::from_millis(ms));
		}
		config
	}
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Run a search
	Search {
		/// Search engine (overrides any engine=... parameter)
		#[arg(long)]
		engine: Option<String>,

		/// Print the rendered HTML instead of JSON
		#[arg(long, conflicts_with = "pages")]
		html: bool,

		/// Follow pagination for up to N pages, one JSON document per line
		#[arg(long, value_name = "N")]
		pages: Option<usize>,

		/// Send the request without an API key
		#[arg(long)]
		no_api_key: bool,

		/// Search parameters as key=value pairs
		#[arg(value_parser = parse_param, value_name = "KEY=VALUE")]
		params: Vec<(String, String)>,
	},

	/// Retrieve an archived search by id
	Archive {
		search_id: String,

		/// Print the rendered HTML instead of JSON
		#[arg(long)]
		html: bool,
	},

	/// Show account information
	Account,

	/// Look up supported locations
	Locations {
		/// Location name prefix
		#[arg(long)]
		q: Option<String>,

		/// Maximum number of results
		#[arg(long)]
		limit: Option<u32>,
	},
}

/// Parses a `key=value` argument. The value may be empty or contain `=`.
pub fn parse_param(raw: &str) -> Result<(String, String), String> {
	let (key, value) = raw
		.split_once('=')
		.ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
	let key = key.trim();
	if key.is_empty() {
		return Err(format!("empty parameter name in `{raw}`"));
	}
	Ok((key.to_string(), value.to_string()))
}

/// Builds the search parameters for the `search` subcommand.
pub fn search_params(pairs: &[(String, String)], no_api_key: bool) -> Params {
	let mut params: Params = pairs.iter().cloned().collect();
	if no_api_key {
		params.insert_absent(serpapi::params::API_KEY);
	}
	params
}

static LONG_VERSION: LazyLock<String> = LazyLock::new(|| {
	let info = serpapi_common_version::BuildInfo::current();
	format!(
		"{}\nGit SHA:  {}\nRust:     {}\nPlatform: {}",
		info.version, info.git_sha, info.rust_version, info.platform,
	)
});
