// Copyright (c) ledm.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use async_trait::async_trait;
use ledm_core::{Array, Expr, Result, value::eval};
use tracing::debug;

/// What a query execution produced: the columnar backend's type, or some
/// other value the caller has to deal with itself.
#[derive(Clone, Debug, PartialEq)]
pub enum Executed {
	Columnar(Array),
	Opaque(serde_json::Value),
}

/// The transport contract of the remote-query backend.
///
/// Cancellation, timeouts and retries belong to implementations; the
/// core neither masks nor translates their failures.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
	async fn execute(&self, expr: &Expr) -> Result<Executed>;
}

/// Executes pipelines by interpreting them against an in-memory array.
///
/// Useful as the dataset-on-disk stand-in for a remote service: field
/// projections, selects and arithmetic run locally; method calls fail
/// the way any expression the interpreter cannot evaluate does.
pub struct LocalExecutor {
	data: Array,
}

impl LocalExecutor {
	pub fn new(data: Array) -> Self {
		Self {
			data,
		}
	}
}

#[async_trait]
impl QueryExecutor for LocalExecutor {
	async fn execute(&self, expr: &Expr) -> Result<Executed> {
		debug!(pipeline = %expr, "executing pipeline against local data");
		let result = eval::evaluate_with_source(expr, &self.data, None)?;
		Ok(Executed::Columnar(result))
	}
}
