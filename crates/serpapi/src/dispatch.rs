// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Callback delivery for client operations.
//!
//! Every operation is an `async fn`. The `*_with` variants run that same
//! future as a task and hand its result to a completion callback instead of
//! returning it.

use std::future::Future;
use std::ops::ControlFlow;

use futures::{Stream, StreamExt};
use tokio::task::JoinHandle;

use crate::error::Result;

/// Handle to an operation whose result goes to a callback.
///
/// Dropping it does not cancel the operation.
#[derive(Debug)]
pub struct Detached {
	handle: JoinHandle<()>,
}

impl Detached {
	/// Waits until the callback has run.
	///
	/// A panic raised inside the callback is resumed here.
	pub async fn wait(self) {
		if let Err(err) = self.handle.await {
			if err.is_panic() {
				std::panic::resume_unwind(err.into_panic());
			}
		}
	}

	/// Cancels the operation; the callback will not run if it has not yet.
	pub fn abort(&self) {
		self.handle.abort();
	}

	pub fn is_finished(&self) -> bool {
		self.handle.is_finished()
	}
}

/// Runs `operation` on the current Tokio runtime and passes its result to
/// `callback`.
///
/// The callback is not guarded: if it panics, the panic follows the
/// runtime's normal task-panic handling.
///
/// # Panics
///
/// Panics if called outside a Tokio runtime.
pub(crate) fn deliver<R, Fut, F>(operation: Fut, callback: F) -> Detached
where
	R: Send + 'static,
	Fut: Future<Output = Result<R>> + Send + 'static,
	F: FnOnce(Result<R>) + Send + 'static,
{
	let handle = tokio::spawn(async move {
		let result = operation.await;
		callback(result);
	});
	Detached { handle }
}

/// Drains `items` on the current Tokio runtime, passing each to `callback`
/// until the stream ends or the callback breaks.
///
/// # Panics
///
/// Panics if called outside a Tokio runtime.
pub(crate) fn deliver_each<R, S, F>(items: S, mut callback: F) -> Detached
where
	R: Send + 'static,
	S: Stream<Item = Result<R>> + Send + 'static,
	F: FnMut(Result<R>) -> ControlFlow<()> + Send + 'static,
{
	let handle = tokio::spawn(async move {
		let mut items = std::pin::pin!(items);
		while let Some(item) = items.next().await {
			if callback(item).is_break() {
				break;
			}
		}
	});
	Detached { handle }
}
