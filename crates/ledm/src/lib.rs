// Copyright (c) ledm.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Layered event data model.
//!
//! Declare the logical shape of your events once, as templates, and read
//! the same members off whatever actually holds the data: an in-memory
//! jagged array, a lazily composed remote query, or anything that can be
//! coerced to columnar.
//!
//! ```
//! use ledm::{Array, Context, Expr, Lambda, Template};
//!
//! let event = Template::builder("event")
//! 	.terminal("met", Lambda::new("e", Expr::param("e").field("x")))
//! 	.build();
//!
//! let data = Array::from_json(&serde_json::json!([
//! 	[{"x": 1}, {"x": 2}, {"x": 3}],
//! 	[],
//! 	[{"x": 4}, {"x": 5}],
//! ]))
//! .unwrap();
//!
//! let ctx = Context::new();
//! let bound = ctx.columnar(&event, data).unwrap();
//! let met = bound.get("met").unwrap().as_columnar().unwrap();
//! assert_eq!(met.to_json().unwrap(), serde_json::json!([[1, 2, 3], [], [4, 5]]));
//! ```

mod bound;
mod context;
mod convert;
mod materialize;

pub use bound::{Bound, Many, Multiplicity, One, Resolved};
pub use context::Context;
pub use convert::ColumnarConvert;
pub use ledm_core::{
	Array, ArrayData, Behavior, BehaviorDecl, BehaviorRef, BehaviorRegistry, BinaryOp, ColumnarLayer, Error, Expr,
	ExpressionLayer, Lambda, Member, MemberKind, Result, Scalar, Template, TemplateBuilder,
};
pub use ledm_query::{Executed, LocalExecutor, Pipeline, QueryExecutor, QueryLayer};
