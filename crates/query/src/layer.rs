// Copyright (c) ledm.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::sync::Arc;

use ledm_core::{Array, Error, Expr, ExpressionLayer, Lambda, Result};
use once_cell::sync::OnceCell;
use tracing::debug;

use crate::{
	executor::Executed,
	pipeline::Pipeline,
	runtime,
};

/// Expression layer over a composed query pipeline.
///
/// Maps never invoke anything: a single-item transform is applied
/// symbolically (its parameter replaced by the pipeline expression), a
/// collection transform appends a nested per-element select, one level
/// deeper. Materialization triggers the executor once per node; the
/// result is held in a cell so repeated access to the same node does not
/// re-execute, while a freshly wrapped node starts cold.
#[derive(Clone)]
pub struct QueryLayer {
	pipeline: Pipeline,
	cell: Arc<OnceCell<Array>>,
}

impl QueryLayer {
	pub fn new(pipeline: Pipeline) -> Self {
		Self {
			pipeline,
			cell: Arc::new(OnceCell::new()),
		}
	}

	pub fn pipeline(&self) -> &Pipeline {
		&self.pipeline
	}

	/// The canonical text of the pipeline this node holds.
	pub fn text(&self) -> String {
		self.pipeline.text()
	}
}

impl From<Pipeline> for QueryLayer {
	fn from(pipeline: Pipeline) -> Self {
		Self::new(pipeline)
	}
}

/// A fresh, collision-free parameter for the outer lambda of a nested
/// per-element select.
fn outer_param(inner: &str) -> String {
	let mut name = String::from("items");
	while name == inner {
		name.push('_');
	}
	name
}

impl ExpressionLayer for QueryLayer {
	type Raw = Pipeline;
	type Wrapped = QueryLayer;

	fn wrap(&self, raw: Pipeline) -> Result<QueryLayer> {
		Ok(QueryLayer::new(raw))
	}

	fn raw(&self) -> Result<Pipeline> {
		Ok(self.pipeline.clone())
	}

	fn single_item_map(&self, transform: &Lambda) -> Result<Pipeline> {
		Ok(self.pipeline.apply(transform))
	}

	fn iterable_map(&self, transform: &Lambda) -> Result<Pipeline> {
		let outer = outer_param(&transform.param);
		let lambda = Lambda::new(outer.clone(), Expr::param(outer).select(transform.clone()));
		Ok(self.pipeline.select(&lambda))
	}

	fn as_columnar(&self) -> Result<Array> {
		self.cell
			.get_or_try_init(|| {
				debug!(pipeline = %self.text(), "materializing query node");
				let pipeline = self.pipeline.clone();
				let executed = runtime::block_on(async move { pipeline.execute().await })?;
				match executed {
					Executed::Columnar(array) => Ok(array),
					Executed::Opaque(value) => Err(Error::UnsupportedOperation {
						operation: format!("wrapping non-columnar execution result: {value}"),
					}),
				}
			})
			.cloned()
	}

	fn get_attr(&self, name: &str) -> Result<QueryLayer> {
		// Raw backend fields not covered by a template become a plain
		// field-projection stage.
		let lambda = Lambda::new("e", Expr::param("e").field(name));
		self.wrap(self.pipeline.select(&lambda))
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};

	use async_trait::async_trait;
	use ledm_core::value::eval;
	use serde_json::json;

	use super::*;
	use crate::executor::{LocalExecutor, QueryExecutor};

	struct CountingExecutor {
		data: Array,
		calls: AtomicUsize,
	}

	#[async_trait]
	impl QueryExecutor for CountingExecutor {
		async fn execute(&self, expr: &Expr) -> Result<Executed> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			Ok(Executed::Columnar(eval::evaluate_with_source(expr, &self.data, None)?))
		}
	}

	struct OpaqueExecutor;

	#[async_trait]
	impl QueryExecutor for OpaqueExecutor {
		async fn execute(&self, _expr: &Expr) -> Result<Executed> {
			Ok(Executed::Opaque(json!({"rows": 0})))
		}
	}

	fn jagged() -> Array {
		Array::from_json(&json!([
			[{"x": 1}, {"x": 2}, {"x": 3}],
			[],
			[{"x": 4}, {"x": 5}],
		]))
		.unwrap()
	}

	#[test]
	fn test_single_item_map_is_symbolic_application() {
		let layer = QueryLayer::new(Pipeline::new(Arc::new(LocalExecutor::new(jagged()))));
		let remap = Lambda::new("ds", Expr::param("ds").select(Lambda::new("e", Expr::param("e").call("met_first", vec![]))));
		let raw = layer.single_item_map(&remap).unwrap();
		assert_eq!(raw.text(), "select(source, lambda e: e.met_first())");
	}

	#[test]
	fn test_iterable_map_nests_one_level_deeper() {
		let layer = QueryLayer::new(Pipeline::new(Arc::new(LocalExecutor::new(jagged()))));
		let raw = layer.iterable_map(&Lambda::new("j", Expr::param("j").call("pt", vec![]))).unwrap();
		assert_eq!(raw.text(), "select(source, lambda items: select(items, lambda j: j.pt()))");
	}

	#[test]
	fn test_outer_param_avoids_shadowing() {
		assert_eq!(outer_param("j"), "items");
		assert_eq!(outer_param("items"), "items_");
	}

	#[test]
	fn test_materialization_cached_per_node() {
		let executor = Arc::new(CountingExecutor {
			data: jagged(),
			calls: AtomicUsize::new(0),
		});
		let layer = QueryLayer::new(Pipeline::new(executor.clone()));
		let raw = layer.single_item_map(&Lambda::new("ds", Expr::param("ds").select(Lambda::new("e", Expr::param("e").field("x"))))).unwrap();
		let node = layer.wrap(raw).unwrap();

		let first = node.as_columnar().unwrap();
		let second = node.as_columnar().unwrap();
		assert_eq!(first, second);
		assert_eq!(executor.calls.load(Ordering::SeqCst), 1);

		// A fresh node over the same pipeline starts cold.
		let fresh = layer.wrap(node.raw().unwrap()).unwrap();
		fresh.as_columnar().unwrap();
		assert_eq!(executor.calls.load(Ordering::SeqCst), 2);
	}

	#[test]
	fn test_opaque_result_cannot_be_wrapped() {
		let layer = QueryLayer::new(Pipeline::new(Arc::new(OpaqueExecutor)));
		let err = layer.as_columnar().unwrap_err();
		assert!(matches!(err, Error::UnsupportedOperation { .. }));
	}

	#[test]
	fn test_get_attr_appends_projection_stage() {
		let layer = QueryLayer::new(Pipeline::new(Arc::new(LocalExecutor::new(jagged()))));
		let node = layer.get_attr("x").unwrap();
		assert_eq!(node.text(), "select(source, lambda e: e.x)");
		assert_eq!(node.as_columnar().unwrap().to_json().unwrap(), json!([[1, 2, 3], [], [4, 5]]));
	}
}
