// Copyright (c) ledm.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Canonical text rendering of the projection IR.
//!
//! The rendered form is the stable wire/debug representation of a query
//! pipeline, e.g. `select(source, lambda e: e.met_first())`.

use std::fmt::{self, Display, Formatter};

use super::{BinaryOp, Expr, Lambda, Scalar};

impl Display for Scalar {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Scalar::Bool(v) => write!(f, "{}", v),
			Scalar::Int(v) => write!(f, "{}", v),
			Scalar::Float(v) => write!(f, "{}", v),
			Scalar::Utf8(v) => write!(f, "'{}'", v),
		}
	}
}

impl Display for BinaryOp {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			BinaryOp::Add => f.write_str("+"),
			BinaryOp::Sub => f.write_str("-"),
			BinaryOp::Mul => f.write_str("*"),
			BinaryOp::Div => f.write_str("/"),
			BinaryOp::Gt => f.write_str(">"),
		}
	}
}

impl Display for Expr {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Expr::Source => f.write_str("source"),
			Expr::Param(name) => f.write_str(name),
			Expr::Field {
				base,
				name,
			} => write!(f, "{}.{}", base, name),
			Expr::Call {
				base,
				method,
				args,
			} => {
				write!(f, "{}.{}(", base, method)?;
				for (i, arg) in args.iter().enumerate() {
					if i > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{}", arg)?;
				}
				f.write_str(")")
			}
			Expr::Select {
				base,
				lambda,
			} => write!(f, "select({}, {})", base, lambda),
			Expr::Binary {
				op,
				left,
				right,
			} => {
				fmt_operand(left, f)?;
				write!(f, " {} ", op)?;
				fmt_operand(right, f)
			}
			Expr::Literal(value) => write!(f, "{}", value),
		}
	}
}

impl Display for Lambda {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "lambda {}: {}", self.param, self.body)
	}
}

/// Writes `expr`, parenthesized when it is itself a binary expression so
/// nested arithmetic stays unambiguous.
fn fmt_operand(expr: &Expr, f: &mut Formatter<'_>) -> fmt::Result {
	if matches!(expr, Expr::Binary { .. }) {
		write!(f, "({})", expr)
	} else {
		write!(f, "{}", expr)
	}
}

#[cfg(test)]
mod tests {
	use crate::expr::{Expr, Lambda};

	#[test]
	fn test_render_select_of_call() {
		let e = Expr::Source.select(Lambda::new("e", Expr::param("e").call("met_first", vec![])));
		assert_eq!(e.to_string(), "select(source, lambda e: e.met_first())");
	}

	#[test]
	fn test_render_nested_binary_parenthesized() {
		let e = Expr::param("v").field("x").add(Expr::param("v").field("y").mul(Expr::lit(2i64)));
		assert_eq!(e.to_string(), "v.x + (v.y * 2)");
	}

	#[test]
	fn test_render_call_with_args() {
		let e = Expr::param("j").call("closest", vec![Expr::param("j").field("eta"), Expr::lit(0.4f64)]);
		assert_eq!(e.to_string(), "j.closest(j.eta, 0.4)");
	}
}
