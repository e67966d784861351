// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP utilities for the SerpApi client.
//!
//! Every outgoing request carries the same User-Agent so the service can
//! attribute traffic to this client and its release.

mod client;

pub use client::{builder, user_agent, PRODUCT};
