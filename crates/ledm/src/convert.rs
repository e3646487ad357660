// Copyright (c) ledm.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use ledm_core::{
	Array, ColumnarLayer, Error, Expr, ExpressionLayer, Lambda, Result, Scalar,
	behavior::BehaviorRegistry,
	value::eval::{self, Evaluated},
};
use tracing::debug;

/// Captures another backend's layer and coerces everything that crosses
/// it to columnar.
///
/// Remaps are interpreted attribute-wise: a parameter-rooted field
/// access is forwarded to the captured layer and its result materialized
/// (`captured.get_attr(name)?.as_columnar()?`); arithmetic then runs on
/// the coerced arrays. Capabilities the captured backend cannot express
/// through that window (collection maps, wholesale materialization,
/// method calls, selects) fail with `UnsupportedOperation`.
#[derive(Clone)]
pub struct ColumnarConvert<L: ExpressionLayer> {
	captured: L,
	behaviors: BehaviorRegistry,
	pending_tag: Option<String>,
}

impl<L: ExpressionLayer> ColumnarConvert<L> {
	pub fn new(captured: L, behaviors: BehaviorRegistry, pending_tag: Option<String>) -> Self {
		Self {
			captured,
			behaviors,
			pending_tag,
		}
	}

	pub fn captured(&self) -> &L {
		&self.captured
	}

	/// Wraps a coerced array as a columnar node, applying any behavior
	/// tag pending from binding to untagged record data.
	fn finish(&self, array: Array) -> Result<ColumnarLayer> {
		let array = match &self.pending_tag {
			Some(tag) => array.tag_if_untagged(tag)?,
			None => array,
		};
		Ok(ColumnarLayer::with_behaviors(array, self.behaviors.clone()))
	}
}

/// What one IR node coerced to: still the captured layer itself, an
/// already columnar value, or a bare literal.
enum Coerced {
	Captured,
	Array(Array),
	Literal(Scalar),
}

fn coerce<L: ExpressionLayer>(expr: &Expr, param: &str, convert: &ColumnarConvert<L>) -> Result<Coerced> {
	match expr {
		Expr::Param(name) if name == param => Ok(Coerced::Captured),
		Expr::Param(name) => Err(Error::InvalidOperation {
			operation: format!("unbound parameter '{name}' in a columnar conversion"),
		}),
		Expr::Source => Err(Error::UnsupportedOperation {
			operation: "pipeline source in a columnar conversion".to_string(),
		}),
		Expr::Field {
			base,
			name,
		} => match coerce(base, param, convert)? {
			Coerced::Captured => {
				debug!(attribute = name, "coercing captured attribute to columnar");
				Ok(Coerced::Array(convert.captured.get_attr(name)?.as_columnar()?))
			}
			Coerced::Array(array) => Ok(Coerced::Array(array.field(name, Some(&convert.behaviors))?)),
			Coerced::Literal(_) => Err(Error::TypeMismatch {
				expected: "record or list data".to_string(),
				found: "literal".to_string(),
			}),
		},
		Expr::Literal(scalar) => Ok(Coerced::Literal(scalar.clone())),
		Expr::Binary {
			op,
			left,
			right,
		} => {
			let l = evaluated(coerce(left, param, convert)?)?;
			let r = evaluated(coerce(right, param, convert)?)?;
			Ok(match eval::apply_binary(*op, l, r)? {
				Evaluated::Array(array) => Coerced::Array(array),
				Evaluated::Scalar(scalar) => Coerced::Literal(scalar),
			})
		}
		Expr::Call {
			method, ..
		} => Err(Error::UnsupportedOperation {
			operation: format!("method call '{method}' through a columnar conversion"),
		}),
		Expr::Select {
			..
		} => Err(Error::UnsupportedOperation {
			operation: "select through a columnar conversion".to_string(),
		}),
	}
}

fn evaluated(coerced: Coerced) -> Result<Evaluated> {
	match coerced {
		Coerced::Array(array) => Ok(Evaluated::Array(array)),
		Coerced::Literal(scalar) => Ok(Evaluated::Scalar(scalar)),
		Coerced::Captured => Err(Error::UnsupportedOperation {
			operation: "operating on the captured layer wholesale".to_string(),
		}),
	}
}

impl<L: ExpressionLayer> ExpressionLayer for ColumnarConvert<L> {
	type Raw = Array;
	type Wrapped = ColumnarLayer;

	/// Wrapping succeeds only for values that are already columnar,
	/// which the type already guarantees here; the conversion applies
	/// its pending behavior tag on the way through.
	fn wrap(&self, raw: Array) -> Result<ColumnarLayer> {
		self.finish(raw)
	}

	fn raw(&self) -> Result<Array> {
		Err(Error::UnsupportedOperation {
			operation: "raw value of a conversion layer".to_string(),
		})
	}

	fn single_item_map(&self, transform: &Lambda) -> Result<Array> {
		match coerce(&transform.body, &transform.param, self)? {
			Coerced::Array(array) => Ok(array),
			// Identity remap: coerce the captured layer itself.
			Coerced::Captured => self.captured.as_columnar(),
			Coerced::Literal(_) => Err(Error::TypeMismatch {
				expected: "array-valued transform".to_string(),
				found: "literal".to_string(),
			}),
		}
	}

	fn iterable_map(&self, _transform: &Lambda) -> Result<Array> {
		Err(Error::UnsupportedOperation {
			operation: "collection map through a columnar conversion".to_string(),
		})
	}

	fn as_columnar(&self) -> Result<Array> {
		Err(Error::UnsupportedOperation {
			operation: "materializing a conversion layer without a transform".to_string(),
		})
	}

	fn get_attr(&self, name: &str) -> Result<ColumnarLayer> {
		let array = self.captured.get_attr(name)?.as_columnar()?;
		self.finish(array)
	}
}
