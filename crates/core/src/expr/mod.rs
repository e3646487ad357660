// Copyright (c) ledm.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Projection expression IR.
//!
//! A remap attached to a template member is not an opaque closure: it is a
//! value of this small expression language, built once at template
//! definition time. The columnar backend interprets it against in-memory
//! arrays; the query backend embeds it symbolically into a pipeline.
//!
//! ```text
//! select(source, lambda e: e.met_first())
//! ```

mod render;

use serde::{Deserialize, Serialize};

/// A literal value embedded in an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
	Bool(bool),
	Int(i64),
	Float(f64),
	Utf8(String),
}

impl From<bool> for Scalar {
	fn from(v: bool) -> Self {
		Scalar::Bool(v)
	}
}

impl From<i64> for Scalar {
	fn from(v: i64) -> Self {
		Scalar::Int(v)
	}
}

impl From<f64> for Scalar {
	fn from(v: f64) -> Self {
		Scalar::Float(v)
	}
}

impl From<&str> for Scalar {
	fn from(v: &str) -> Self {
		Scalar::Utf8(v.to_string())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
	Add,
	Sub,
	Mul,
	Div,
	Gt,
}

/// One node of a projection description.
///
/// `Source` names the pipeline root; `Param` references the parameter of
/// the enclosing [`Lambda`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
	Source,
	Param(String),
	Field {
		base: Box<Expr>,
		name: String,
	},
	Call {
		base: Box<Expr>,
		method: String,
		args: Vec<Expr>,
	},
	Select {
		base: Box<Expr>,
		lambda: Box<Lambda>,
	},
	Binary {
		op: BinaryOp,
		left: Box<Expr>,
		right: Box<Expr>,
	},
	Literal(Scalar),
}

/// A unary callback description: one named parameter and a body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lambda {
	pub param: String,
	pub body: Expr,
}

impl Expr {
	pub fn param(name: impl Into<String>) -> Self {
		Expr::Param(name.into())
	}

	pub fn lit(value: impl Into<Scalar>) -> Self {
		Expr::Literal(value.into())
	}

	pub fn field(self, name: impl Into<String>) -> Self {
		Expr::Field {
			base: Box::new(self),
			name: name.into(),
		}
	}

	pub fn call(self, method: impl Into<String>, args: Vec<Expr>) -> Self {
		Expr::Call {
			base: Box::new(self),
			method: method.into(),
			args,
		}
	}

	pub fn select(self, lambda: Lambda) -> Self {
		Expr::Select {
			base: Box::new(self),
			lambda: Box::new(lambda),
		}
	}

	pub fn binary(self, op: BinaryOp, rhs: Expr) -> Self {
		Expr::Binary {
			op,
			left: Box::new(self),
			right: Box::new(rhs),
		}
	}

	pub fn add(self, rhs: Expr) -> Self {
		self.binary(BinaryOp::Add, rhs)
	}

	pub fn sub(self, rhs: Expr) -> Self {
		self.binary(BinaryOp::Sub, rhs)
	}

	pub fn mul(self, rhs: Expr) -> Self {
		self.binary(BinaryOp::Mul, rhs)
	}

	pub fn div(self, rhs: Expr) -> Self {
		self.binary(BinaryOp::Div, rhs)
	}

	pub fn gt(self, rhs: Expr) -> Self {
		self.binary(BinaryOp::Gt, rhs)
	}

	/// Replaces every free occurrence of `param` with `replacement`.
	///
	/// A nested lambda with the same parameter name shields its body, so
	/// substitution never captures through a shadowing select.
	pub fn substitute(&self, param: &str, replacement: &Expr) -> Expr {
		match self {
			Expr::Source => Expr::Source,
			Expr::Param(name) => {
				if name == param {
					replacement.clone()
				} else {
					self.clone()
				}
			}
			Expr::Field {
				base,
				name,
			} => Expr::Field {
				base: Box::new(base.substitute(param, replacement)),
				name: name.clone(),
			},
			Expr::Call {
				base,
				method,
				args,
			} => Expr::Call {
				base: Box::new(base.substitute(param, replacement)),
				method: method.clone(),
				args: args.iter().map(|a| a.substitute(param, replacement)).collect(),
			},
			Expr::Select {
				base,
				lambda,
			} => {
				let body = if lambda.param == param {
					lambda.body.clone()
				} else {
					lambda.body.substitute(param, replacement)
				};
				Expr::Select {
					base: Box::new(base.substitute(param, replacement)),
					lambda: Box::new(Lambda {
						param: lambda.param.clone(),
						body,
					}),
				}
			}
			Expr::Binary {
				op,
				left,
				right,
			} => Expr::Binary {
				op: *op,
				left: Box::new(left.substitute(param, replacement)),
				right: Box::new(right.substitute(param, replacement)),
			},
			Expr::Literal(_) => self.clone(),
		}
	}
}

impl Lambda {
	pub fn new(param: impl Into<String>, body: Expr) -> Self {
		Self {
			param: param.into(),
			body,
		}
	}

	/// The default remap: hands the current expression through unchanged.
	pub fn identity() -> Self {
		Self::new("it", Expr::param("it"))
	}

	/// Symbolic application: the body with the parameter replaced by `arg`.
	pub fn apply(&self, arg: &Expr) -> Expr {
		self.body.substitute(&self.param, arg)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_substitute_replaces_free_param() {
		let body = Expr::param("ds").field("x");
		let out = body.substitute("ds", &Expr::Source);
		assert_eq!(out, Expr::Source.field("x"));
	}

	#[test]
	fn test_substitute_shields_shadowed_param() {
		// select(e, lambda e: e.x) - the inner e must not be replaced
		let inner = Lambda::new("e", Expr::param("e").field("x"));
		let body = Expr::param("e").select(inner.clone());
		let out = body.substitute("e", &Expr::Source);
		assert_eq!(out, Expr::Source.select(inner));
	}

	#[test]
	fn test_apply_is_substitution() {
		let l = Lambda::new("ds", Expr::param("ds").select(Lambda::new("e", Expr::param("e").call("met_first", vec![]))));
		let applied = l.apply(&Expr::Source);
		assert_eq!(applied.to_string(), "select(source, lambda e: e.met_first())");
	}

	#[test]
	fn test_identity_apply_returns_argument() {
		let arg = Expr::Source.field("jets");
		assert_eq!(Lambda::identity().apply(&arg), arg);
	}

	#[test]
	fn test_ir_round_trips_through_serde() {
		let l = Lambda::new("j", Expr::param("j").field("pt").mul(Expr::lit(2i64)));
		let text = serde_json::to_string(&l).unwrap();
		let back: Lambda = serde_json::from_str(&text).unwrap();
		assert_eq!(back, l);
	}
}
