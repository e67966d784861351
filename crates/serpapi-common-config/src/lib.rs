// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Common configuration primitives for the SerpApi client.
//!
//! This crate provides:
//!
//! - [`Secret<T>`]: A wrapper type that prevents accidental logging of
//!   sensitive values (re-exported from [`serpapi_common_secret`])
//! - [`load_secret_env`]: Helper for loading secrets from environment variables
//!   with `*_FILE` support
//! - [`load_parsed_env`]: Helper for typed, optional environment settings

pub mod env;

// Re-export Secret types for convenience
pub use serpapi_common_secret::{Secret, SecretString, REDACTED};

pub use env::{load_env, load_parsed_env, load_secret_env, EnvError};
