// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Environment variable helpers.
//!
//! Secrets may be supplied directly (`SERPAPI_API_KEY=...`) or through a file
//! (`SERPAPI_API_KEY_FILE=/run/secrets/serpapi`), the convention used by
//! container orchestrators. Empty values count as unset.

use std::path::PathBuf;
use std::str::FromStr;

use serpapi_common_secret::SecretString;
use thiserror::Error;
use tracing::debug;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error)]
pub enum EnvError {
	/// Both `NAME` and `NAME_FILE` were set.
	#[error("both {name} and {name}_FILE are set; use only one")]
	Conflict { name: String },

	/// The file named by `NAME_FILE` could not be read.
	#[error("failed to read {name}_FILE at {}: {source}", .path.display())]
	ReadFile {
		name: String,
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// The variable is not valid unicode.
	#[error("{name} is not valid unicode")]
	NotUnicode { name: String },

	/// The variable could not be parsed into the expected type.
	#[error("invalid value for {name}: {message}")]
	Invalid { name: String, message: String },
}

/// Reads a plain environment variable, treating empty values as unset.
pub fn load_env(name: &str) -> Result<Option<String>, EnvError> {
	match std::env::var(name) {
		Ok(value) if value.trim().is_empty() => Ok(None),
		Ok(value) => Ok(Some(value)),
		Err(std::env::VarError::NotPresent) => Ok(None),
		Err(std::env::VarError::NotUnicode(_)) => Err(EnvError::NotUnicode {
			name: name.to_string(),
		}),
	}
}

/// Reads and parses an environment variable.
pub fn load_parsed_env<T>(name: &str) -> Result<Option<T>, EnvError>
where
	T: FromStr,
	T::Err: std::fmt::Display,
{
	let Some(raw) = load_env(name)? else {
		return Ok(None);
	};
	raw.trim().parse().map(Some).map_err(|e: T::Err| EnvError::Invalid {
		name: name.to_string(),
		message: e.to_string(),
	})
}

/// Loads a secret from `name`, or from the file at `{name}_FILE`.
///
/// File contents are trimmed of surrounding whitespace. Returns `Ok(None)`
/// when neither variable is set.
pub fn load_secret_env(name: &str) -> Result<Option<SecretString>, EnvError> {
	let file_var = format!("{name}_FILE");
	let direct = load_env(name)?;
	let file = load_env(&file_var)?;

	match (direct, file) {
		(Some(_), Some(_)) => Err(EnvError::Conflict {
			name: name.to_string(),
		}),
		(Some(value), None) => {
			debug!(var = name, "loaded secret from environment");
			Ok(Some(SecretString::new(value)))
		}
		(None, Some(path)) => {
			let path = PathBuf::from(path);
			let contents = std::fs::read_to_string(&path).map_err(|source| EnvError::ReadFile {
				name: name.to_string(),
				path: path.clone(),
				source,
			})?;
			debug!(var = %file_var, path = %path.display(), "loaded secret from file");
			let trimmed = contents.trim();
			if trimmed.is_empty() {
				Ok(None)
			} else {
				Ok(Some(SecretString::new(trimmed.to_string())))
			}
		}
		(None, None) => Ok(None),
	}
}
