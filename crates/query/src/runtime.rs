// Copyright (c) ledm.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Bridging the one asynchronous boundary.
//!
//! Pipeline composition is synchronous; only execution crosses into
//! async. Materialization suspends the caller on that single point, so
//! this helper has to work wherever the caller happens to be: inside a
//! multi-thread runtime, inside a current-thread runtime, or with no
//! runtime at all.

use std::future::Future;

use ledm_core::{Error, Result};
use tokio::runtime::{Builder, Handle, Runtime, RuntimeFlavor};

/// Drives a future to completion from synchronous code.
///
/// On a multi-thread runtime the worker blocks in place; on a
/// current-thread runtime the future is shipped to a scoped thread with
/// its own throwaway runtime (blocking the runtime thread itself would
/// starve the driver); with no ambient runtime a throwaway runtime runs
/// it directly.
pub fn block_on<T, F>(future: F) -> Result<T>
where
	F: Future<Output = Result<T>> + Send,
	T: Send,
{
	match Handle::try_current() {
		Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
			tokio::task::block_in_place(|| handle.block_on(future))
		}
		Ok(_) => std::thread::scope(|scope| {
			scope
				.spawn(|| throwaway_runtime()?.block_on(future))
				.join()
				.map_err(|_| Error::Execution {
					message: "query execution thread panicked".to_string(),
				})?
		}),
		Err(_) => throwaway_runtime()?.block_on(future),
	}
}

fn throwaway_runtime() -> Result<Runtime> {
	Builder::new_current_thread().enable_all().build().map_err(|e| Error::Execution {
		message: format!("failed to build bridge runtime: {e}"),
	})
}
