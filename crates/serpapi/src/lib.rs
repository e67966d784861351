// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Client for the SerpApi search engine results API.
//!
//! The crate resolves credentials and deadlines against configurable
//! defaults, builds request URLs, tags every request with the runtime it came
//! from, and decodes the responses. Search results can be followed page by
//! page through [`Cursor`]s.
//!
//! Every operation is an `async fn`; each also has a `*_with` form that
//! delivers its result to a callback.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod pagination;
pub mod params;
pub mod query;
pub mod source;

pub use client::{Client, ClientBuilder, DEFAULT_BASE_URL};
pub use config::{ApiKeyOverride, Config, DEFAULT_TIMEOUT};
pub use dispatch::Detached;
pub use error::{Result, SerpApiError};
pub use pagination::{Cursor, Page};
pub use params::{ParamValue, Params};
pub use query::Query;
pub use serpapi_common_config::SecretString;
pub use source::{FixedIdentity, RuntimeIdentity, RustRuntime};
