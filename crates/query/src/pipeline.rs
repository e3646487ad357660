// Copyright (c) ledm.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::{
	fmt,
	fmt::{Debug, Display, Formatter},
	sync::Arc,
};

use ledm_core::{Expr, Lambda, Result};
use tracing::debug;

use crate::executor::{Executed, QueryExecutor};

/// A composed, not-yet-executed query: the pipeline handle raw value of
/// the query backend.
///
/// Stages are appended symbolically; no callback is ever invoked during
/// composition. The canonical text form (`Display`) is the stable way to
/// inspect what was built, e.g.
/// `select(source, lambda e: e.met_first())`.
#[derive(Clone)]
pub struct Pipeline {
	expr: Expr,
	executor: Arc<dyn QueryExecutor>,
}

impl Pipeline {
	/// A fresh pipeline over the executor's source dataset.
	pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
		Self {
			expr: Expr::Source,
			executor,
		}
	}

	pub fn from_expr(expr: Expr, executor: Arc<dyn QueryExecutor>) -> Self {
		Self {
			expr,
			executor,
		}
	}

	pub fn expr(&self) -> &Expr {
		&self.expr
	}

	pub fn executor(&self) -> &Arc<dyn QueryExecutor> {
		&self.executor
	}

	/// Appends a projection stage: select each item via the lambda.
	pub fn select(&self, lambda: &Lambda) -> Pipeline {
		Self {
			expr: self.expr.clone().select(lambda.clone()),
			executor: self.executor.clone(),
		}
	}

	/// Applies a transform symbolically: the lambda body with its
	/// parameter replaced by the current pipeline expression. A remap
	/// like `lambda ds: ds.select(...)` therefore contributes exactly
	/// the stages it spells out.
	pub fn apply(&self, lambda: &Lambda) -> Pipeline {
		Self {
			expr: lambda.apply(&self.expr),
			executor: self.executor.clone(),
		}
	}

	/// The canonical text rendering of the accumulated pipeline.
	pub fn text(&self) -> String {
		self.expr.to_string()
	}

	/// Runs the pipeline on its executor. Each call executes afresh;
	/// caching across materializations is the caller's concern.
	pub async fn execute(&self) -> Result<Executed> {
		debug!(pipeline = %self.text(), "executing query pipeline");
		self.executor.execute(&self.expr).await
	}
}

impl Display for Pipeline {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		Display::fmt(&self.expr, f)
	}
}

impl Debug for Pipeline {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Pipeline").field("expr", &self.text()).finish()
	}
}

#[cfg(test)]
mod tests {
	use ledm_core::Array;

	use super::*;
	use crate::executor::LocalExecutor;

	fn empty_pipeline() -> Pipeline {
		Pipeline::new(Arc::new(LocalExecutor::new(Array::int64(vec![]))))
	}

	#[test]
	fn test_fresh_pipeline_renders_source() {
		assert_eq!(empty_pipeline().text(), "source");
	}

	#[test]
	fn test_select_stage_renders_canonically() {
		let p = empty_pipeline().select(&Lambda::new("e", Expr::param("e").call("met_first", vec![])));
		assert_eq!(p.text(), "select(source, lambda e: e.met_first())");
	}

	#[test]
	fn test_apply_substitutes_current_expression() {
		let remap = Lambda::new("ds", Expr::param("ds").select(Lambda::new("e", Expr::param("e").call("met_first", vec![]))));
		let p = empty_pipeline().apply(&remap);
		assert_eq!(p.text(), "select(source, lambda e: e.met_first())");
	}

	#[test]
	fn test_stages_compose() {
		let p = empty_pipeline()
			.select(&Lambda::new("e", Expr::param("e").call("jets", vec![])))
			.select(&Lambda::new("j", Expr::param("j").call("pt", vec![])));
		assert_eq!(p.text(), "select(select(source, lambda e: e.jets()), lambda j: j.pt())");
	}
}
