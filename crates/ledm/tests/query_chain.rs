// Copyright (c) ledm.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use ledm::{
	Array, Context, Error, Executed, Expr, Lambda, LocalExecutor, Pipeline, QueryExecutor, Resolved, Result, Template,
};
use ledm_core::value::eval;
use serde_json::json;

fn jagged() -> Array {
	Array::from_json(&json!([
		[{"x": 1}, {"x": 2}, {"x": 3}],
		[],
		[{"x": 4}, {"x": 5}],
	]))
	.unwrap()
}

fn local_pipeline(data: Array) -> Pipeline {
	Pipeline::new(Arc::new(LocalExecutor::new(data)))
}

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

#[test]
fn test_met_pipeline_renders_exactly() {
	let event = Template::builder("event")
		.terminal(
			"met",
			Lambda::new("ds", Expr::param("ds").select(Lambda::new("e", Expr::param("e").call("met_first", vec![])))),
		)
		.build();

	let ctx = Context::new();
	let data = ctx.query(&event, local_pipeline(Array::int64(vec![]))).unwrap();
	let met = data.get("met").unwrap().leaf().unwrap();
	assert_eq!(met.text(), "select(source, lambda e: e.met_first())");
}

#[test]
fn test_collection_chain_nests_selects() {
	let jet = Template::builder("jet")
		.terminal("pt", Lambda::new("j", Expr::param("j").call("pt", vec![])))
		.build();
	let event = Template::builder("event")
		.sequence(
			"jets",
			Lambda::new("ds", Expr::param("ds").select(Lambda::new("e", Expr::param("e").call("jets", vec![])))),
			jet,
		)
		.build();

	let ctx = Context::new();
	let data = ctx.query(&event, local_pipeline(Array::int64(vec![]))).unwrap();
	let pt = data.get("jets").unwrap().get("pt").unwrap().leaf().unwrap();
	assert_eq!(
		pt.text(),
		"select(select(source, lambda e: e.jets()), lambda items: select(items, lambda j: j.pt()))"
	);
}

#[test]
fn test_query_chain_executes_against_local_data() {
	let event = Template::builder("event")
		.terminal("met", Lambda::new("ds", Expr::param("ds").select(Lambda::new("e", Expr::param("e").field("x")))))
		.build();

	let ctx = Context::new();
	let data = ctx.query(&event, local_pipeline(jagged())).unwrap();
	let met = data.get("met").unwrap().as_columnar().unwrap();
	assert_eq!(met.to_json().unwrap(), json!([[1, 2, 3], [], [4, 5]]));
}

#[test]
fn test_collection_chain_executes_one_level_deeper() {
	let jet = Template::builder("jet")
		.terminal("px", Lambda::new("j", Expr::param("j").field("x")))
		.build();
	let event = Template::builder("event").sequence("p4", Lambda::identity(), jet).build();

	let ctx = Context::new();
	let data = ctx.query(&event, local_pipeline(jagged())).unwrap();
	let resolved = data.get("p4").unwrap();
	assert!(matches!(resolved, Resolved::Plural(_)));
	let px = resolved.get("px").unwrap().as_columnar().unwrap();
	assert_eq!(px.to_json().unwrap(), json!([[1, 2, 3], [], [4, 5]]));
}

#[test]
fn test_materialization_executes_lazily_per_member() {
	let event = Template::builder("event")
		.terminal("met", Lambda::new("ds", Expr::param("ds").select(Lambda::new("e", Expr::param("e").field("x")))))
		.terminal(
			"met_plus",
			Lambda::new("ds", Expr::param("ds").select(Lambda::new("e", Expr::param("e").field("x").add(Expr::lit(1i64))))),
		)
		.build();

	let executor = Arc::new(CountingExecutor {
		data: jagged(),
		calls: AtomicUsize::new(0),
	});
	let ctx = Context::new();
	let data = ctx
		.query(&event, Pipeline::new(executor.clone() as Arc<dyn QueryExecutor>))
		.unwrap();

	let record = data.as_columnar().unwrap();
	// Only the first member ran, purely to learn the row count.
	assert_eq!(executor.calls.load(Ordering::SeqCst), 1);

	let full = record.to_json().unwrap();
	assert_eq!(executor.calls.load(Ordering::SeqCst), 2);
	assert_eq!(
		full,
		json!([
			{"met": [1, 2, 3], "met_plus": [2, 3, 4]},
			{"met": [], "met_plus": []},
			{"met": [4, 5], "met_plus": [5, 6]},
		])
	);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_materialization_inside_async_context() {
	let event = Template::builder("event")
		.terminal("met", Lambda::new("ds", Expr::param("ds").select(Lambda::new("e", Expr::param("e").field("x")))))
		.build();

	let ctx = Context::new();
	let data = ctx.query(&event, local_pipeline(jagged())).unwrap();
	let met = data.get("met").unwrap().as_columnar().unwrap();
	assert_eq!(met.to_json().unwrap(), json!([[1, 2, 3], [], [4, 5]]));
}

#[test]
fn test_unexecutable_pipeline_surfaces_backend_error() {
	let event = Template::builder("event")
		.terminal(
			"met",
			Lambda::new("ds", Expr::param("ds").select(Lambda::new("e", Expr::param("e").call("met_first", vec![])))),
		)
		.build();

	let ctx = Context::new();
	let data = ctx.query(&event, local_pipeline(jagged())).unwrap();
	let err = data.get("met").unwrap().as_columnar().unwrap_err();
	assert!(matches!(err, Error::UnsupportedOperation { .. }));
}
