// Copyright (c) ledm.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Interpretation of the projection IR against in-memory arrays.
//!
//! Arrays are vectorized: a lambda written against one logical item is
//! evaluated with its parameter bound to the whole column, and field
//! projection broadcasts through the jagged structure. Nested selects
//! therefore collapse to direct application, which is exactly what makes
//! the single-item and collection map primitives coincide on this
//! backend. Method calls have no local callee and are rejected.

use tracing::trace;

use super::{
	Array, ArrayData,
	container::{BoolContainer, NumberContainer},
};
use crate::{
	behavior::BehaviorRegistry,
	error::{Error, Result},
	expr::{BinaryOp, Expr, Lambda, Scalar},
};

/// The result of evaluating one IR node: a column or a bare literal.
#[derive(Clone, Debug, PartialEq)]
pub enum Evaluated {
	Array(Array),
	Scalar(Scalar),
}

struct Env<'a> {
	bindings: Vec<(String, Array)>,
	behaviors: Option<&'a BehaviorRegistry>,
}

/// Applies a remap lambda to an array: the parameter is bound to the
/// array and the body evaluated elementwise.
pub fn evaluate_lambda(lambda: &Lambda, arg: Array, behaviors: Option<&BehaviorRegistry>) -> Result<Array> {
	trace!(param = %lambda.param, "evaluating lambda against array");
	let len = arg.known_len();
	let mut env = Env {
		bindings: vec![(lambda.param.clone(), arg)],
		behaviors,
	};
	match eval(&lambda.body, &mut env)? {
		Evaluated::Array(array) => Ok(array),
		Evaluated::Scalar(scalar) => match len {
			Some(len) => Ok(broadcast(&scalar, len)),
			None => Err(Error::TypeMismatch {
				expected: "array-valued expression".to_string(),
				found: "literal of unknown extent".to_string(),
			}),
		},
	}
}

/// Evaluates a full pipeline expression with `source` bound to the given
/// array. Used by local execution of composed query pipelines.
pub fn evaluate_with_source(expr: &Expr, source: &Array, behaviors: Option<&BehaviorRegistry>) -> Result<Array> {
	let lambda = Lambda {
		param: "source".to_string(),
		body: expr.substitute_source(),
	};
	evaluate_lambda(&lambda, source.clone(), behaviors)
}

impl Expr {
	/// Rewrites `Source` nodes into a parameter reference so a pipeline
	/// expression can be evaluated like any lambda body.
	fn substitute_source(&self) -> Expr {
		match self {
			Expr::Source => Expr::param("source"),
			Expr::Param(_) | Expr::Literal(_) => self.clone(),
			Expr::Field {
				base,
				name,
			} => Expr::Field {
				base: Box::new(base.substitute_source()),
				name: name.clone(),
			},
			Expr::Call {
				base,
				method,
				args,
			} => Expr::Call {
				base: Box::new(base.substitute_source()),
				method: method.clone(),
				args: args.iter().map(|a| a.substitute_source()).collect(),
			},
			Expr::Select {
				base,
				lambda,
			} => Expr::Select {
				base: Box::new(base.substitute_source()),
				lambda: Box::new(Lambda {
					param: lambda.param.clone(),
					body: lambda.body.substitute_source(),
				}),
			},
			Expr::Binary {
				op,
				left,
				right,
			} => Expr::Binary {
				op: *op,
				left: Box::new(left.substitute_source()),
				right: Box::new(right.substitute_source()),
			},
		}
	}
}

fn eval(expr: &Expr, env: &mut Env<'_>) -> Result<Evaluated> {
	match expr {
		Expr::Source => Err(Error::InvalidOperation {
			operation: "evaluating an unbound pipeline source against in-memory data".to_string(),
		}),
		Expr::Param(name) => {
			let bound = env.bindings.iter().rev().find(|(param, _)| param == name);
			match bound {
				Some((_, array)) => Ok(Evaluated::Array(array.clone())),
				None => Err(Error::InvalidOperation {
					operation: format!("unbound parameter '{name}'"),
				}),
			}
		}
		Expr::Field {
			base,
			name,
		} => match eval(base, env)? {
			Evaluated::Array(array) => Ok(Evaluated::Array(array.field(name, env.behaviors)?)),
			Evaluated::Scalar(_) => Err(Error::TypeMismatch {
				expected: "record or list data".to_string(),
				found: "literal".to_string(),
			}),
		},
		Expr::Call {
			method, ..
		} => Err(Error::UnsupportedOperation {
			operation: format!("method call '{method}' against in-memory data"),
		}),
		Expr::Select {
			base,
			lambda,
		} => {
			let operand = match eval(base, env)? {
				Evaluated::Array(array) => array,
				Evaluated::Scalar(_) => {
					return Err(Error::TypeMismatch {
						expected: "collection data".to_string(),
						found: "literal".to_string(),
					});
				}
			};
			let len = operand.known_len();
			env.bindings.push((lambda.param.clone(), operand));
			let result = eval(&lambda.body, env);
			env.bindings.pop();
			match result? {
				Evaluated::Array(array) => Ok(Evaluated::Array(array)),
				Evaluated::Scalar(scalar) => match len {
					Some(len) => Ok(Evaluated::Array(broadcast(&scalar, len))),
					None => Ok(Evaluated::Scalar(scalar)),
				},
			}
		}
		Expr::Binary {
			op,
			left,
			right,
		} => {
			let l = eval(left, env)?;
			let r = eval(right, env)?;
			apply_binary(*op, l, r)
		}
		Expr::Literal(scalar) => Ok(Evaluated::Scalar(scalar.clone())),
	}
}

fn broadcast(scalar: &Scalar, len: usize) -> Array {
	match scalar {
		Scalar::Bool(v) => Array::bool(vec![*v; len]),
		Scalar::Int(v) => Array::int64(vec![*v; len]),
		Scalar::Float(v) => Array::float64(vec![*v; len]),
		Scalar::Utf8(v) => Array::utf8(vec![v.clone(); len]),
	}
}

/// Elementwise combination of two evaluated operands, promoting integers
/// to floats where the operands mix and propagating undefined slots.
pub fn apply_binary(op: BinaryOp, left: Evaluated, right: Evaluated) -> Result<Evaluated> {
	match (left, right) {
		(Evaluated::Array(l), Evaluated::Array(r)) => Ok(Evaluated::Array(binary_arrays(op, &l, &r)?)),
		(Evaluated::Array(l), Evaluated::Scalar(s)) => Ok(Evaluated::Array(binary_array_scalar(op, &l, &s, true)?)),
		(Evaluated::Scalar(s), Evaluated::Array(r)) => Ok(Evaluated::Array(binary_array_scalar(op, &r, &s, false)?)),
		(Evaluated::Scalar(l), Evaluated::Scalar(r)) => Ok(Evaluated::Scalar(binary_scalars(op, &l, &r)?)),
	}
}

fn binary_arrays(op: BinaryOp, left: &Array, right: &Array) -> Result<Array> {
	let left = left.settle()?;
	let right = right.settle()?;
	match (left.data(), right.data()) {
		(ArrayData::List(l), ArrayData::List(r)) => {
			if l.offsets() != r.offsets() {
				return Err(Error::ShapeMismatch {
					left: format!("list of {} rows", l.len()),
					right: format!("list of {} rows", r.len()),
				});
			}
			let values = binary_arrays(op, l.values(), r.values())?;
			Ok(ArrayData::List(l.with_values(values)?).into())
		}
		(ArrayData::Int64(l), ArrayData::Int64(r)) => zip_i64(op, l, r),
		(ArrayData::Float64(_), _) | (_, ArrayData::Float64(_)) | (ArrayData::Int64(_), _) | (_, ArrayData::Int64(_)) => {
			let l = as_f64(&left)?;
			let r = as_f64(&right)?;
			zip_f64(op, &l, &r)
		}
		_ => Err(Error::TypeMismatch {
			expected: "numeric data".to_string(),
			found: format!("{} vs {}", left.type_name(), right.type_name()),
		}),
	}
}

fn binary_array_scalar(op: BinaryOp, array: &Array, scalar: &Scalar, array_on_left: bool) -> Result<Array> {
	let array = array.settle()?;
	match (array.data(), scalar) {
		(ArrayData::List(l), _) => {
			let values = binary_array_scalar(op, l.values(), scalar, array_on_left)?;
			Ok(ArrayData::List(l.with_values(values)?).into())
		}
		(ArrayData::Int64(c), Scalar::Int(v)) => {
			let constant = NumberContainer::from_vec(vec![*v; c.len()]);
			if array_on_left {
				zip_i64(op, c, &constant)
			} else {
				zip_i64(op, &constant, c)
			}
		}
		(ArrayData::Int64(_) | ArrayData::Float64(_), Scalar::Int(_) | Scalar::Float(_)) => {
			let c = as_f64(&array)?;
			let v = scalar_f64(scalar).expect("checked numeric");
			let constant = NumberContainer::from_vec(vec![v; c.len()]);
			if array_on_left {
				zip_f64(op, &c, &constant)
			} else {
				zip_f64(op, &constant, &c)
			}
		}
		_ => Err(Error::TypeMismatch {
			expected: "numeric data".to_string(),
			found: format!("{} vs literal {}", array.type_name(), scalar),
		}),
	}
}

fn binary_scalars(op: BinaryOp, left: &Scalar, right: &Scalar) -> Result<Scalar> {
	match (left, right) {
		(Scalar::Int(l), Scalar::Int(r)) => match op {
			BinaryOp::Add => Ok(Scalar::Int(l + r)),
			BinaryOp::Sub => Ok(Scalar::Int(l - r)),
			BinaryOp::Mul => Ok(Scalar::Int(l * r)),
			BinaryOp::Div => {
				if *r == 0 {
					Err(Error::InvalidOperation {
						operation: "division by zero in literal expression".to_string(),
					})
				} else {
					Ok(Scalar::Int(l / r))
				}
			}
			BinaryOp::Gt => Ok(Scalar::Bool(l > r)),
		},
		_ => match (scalar_f64(left), scalar_f64(right)) {
			(Some(l), Some(r)) => match op {
				BinaryOp::Add => Ok(Scalar::Float(l + r)),
				BinaryOp::Sub => Ok(Scalar::Float(l - r)),
				BinaryOp::Mul => Ok(Scalar::Float(l * r)),
				BinaryOp::Div => Ok(Scalar::Float(l / r)),
				BinaryOp::Gt => Ok(Scalar::Bool(l > r)),
			},
			_ => Err(Error::TypeMismatch {
				expected: "numeric literals".to_string(),
				found: format!("{left} vs {right}"),
			}),
		},
	}
}

fn scalar_f64(scalar: &Scalar) -> Option<f64> {
	match scalar {
		Scalar::Int(v) => Some(*v as f64),
		Scalar::Float(v) => Some(*v),
		_ => None,
	}
}

fn as_f64(array: &Array) -> Result<NumberContainer<f64>> {
	match array.data() {
		ArrayData::Float64(c) => Ok(c.clone()),
		ArrayData::Int64(c) => {
			let mut out = NumberContainer::with_capacity(c.len());
			for v in c.iter() {
				match v {
					Some(v) => out.push(v as f64),
					None => out.push_undefined(),
				}
			}
			Ok(out)
		}
		_ => Err(Error::TypeMismatch {
			expected: "numeric data".to_string(),
			found: array.type_name().to_string(),
		}),
	}
}

fn zip_i64(op: BinaryOp, left: &NumberContainer<i64>, right: &NumberContainer<i64>) -> Result<Array> {
	if left.len() != right.len() {
		return Err(Error::ShapeMismatch {
			left: format!("{} rows", left.len()),
			right: format!("{} rows", right.len()),
		});
	}
	match op {
		BinaryOp::Gt => {
			let mut out = BoolContainer::with_capacity(left.len());
			for (l, r) in left.iter().zip(right.iter()) {
				match (l, r) {
					(Some(l), Some(r)) => out.push(l > r),
					_ => out.push_undefined(),
				}
			}
			Ok(ArrayData::Bool(out).into())
		}
		BinaryOp::Div => {
			let mut out = NumberContainer::with_capacity(left.len());
			for (l, r) in left.iter().zip(right.iter()) {
				match (l, r) {
					(Some(l), Some(r)) if r != 0 => out.push(l / r),
					_ => out.push_undefined(),
				}
			}
			Ok(ArrayData::Int64(out).into())
		}
		_ => {
			let mut out = NumberContainer::with_capacity(left.len());
			for (l, r) in left.iter().zip(right.iter()) {
				match (l, r) {
					(Some(l), Some(r)) => out.push(match op {
						BinaryOp::Add => l + r,
						BinaryOp::Sub => l - r,
						BinaryOp::Mul => l * r,
						BinaryOp::Div | BinaryOp::Gt => unreachable!("handled above"),
					}),
					_ => out.push_undefined(),
				}
			}
			Ok(ArrayData::Int64(out).into())
		}
	}
}

fn zip_f64(op: BinaryOp, left: &NumberContainer<f64>, right: &NumberContainer<f64>) -> Result<Array> {
	if left.len() != right.len() {
		return Err(Error::ShapeMismatch {
			left: format!("{} rows", left.len()),
			right: format!("{} rows", right.len()),
		});
	}
	if let BinaryOp::Gt = op {
		let mut out = BoolContainer::with_capacity(left.len());
		for (l, r) in left.iter().zip(right.iter()) {
			match (l, r) {
				(Some(l), Some(r)) => out.push(l > r),
				_ => out.push_undefined(),
			}
		}
		return Ok(ArrayData::Bool(out).into());
	}
	let mut out = NumberContainer::with_capacity(left.len());
	for (l, r) in left.iter().zip(right.iter()) {
		match (l, r) {
			(Some(l), Some(r)) => out.push(match op {
				BinaryOp::Add => l + r,
				BinaryOp::Sub => l - r,
				BinaryOp::Mul => l * r,
				BinaryOp::Div => l / r,
				BinaryOp::Gt => unreachable!("handled above"),
			}),
			_ => out.push_undefined(),
		}
	}
	Ok(ArrayData::Float64(out).into())
}
