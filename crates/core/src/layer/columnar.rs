// Copyright (c) ledm.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use tracing::debug;

use super::ExpressionLayer;
use crate::{
	behavior::BehaviorRegistry,
	error::Result,
	expr::Lambda,
	value::{Array, eval},
};

/// Expression layer over an in-memory jagged array.
///
/// Arrays are vectorized, so both map primitives reduce to interpreting
/// the transform directly against the held array; a collection transform
/// needs no extra machinery because field projection and arithmetic
/// already broadcast through the jagged structure.
#[derive(Clone, Debug)]
pub struct ColumnarLayer {
	array: Array,
	behaviors: BehaviorRegistry,
}

impl ColumnarLayer {
	pub fn new(array: Array) -> Self {
		Self {
			array,
			behaviors: BehaviorRegistry::new(),
		}
	}

	pub fn with_behaviors(array: Array, behaviors: BehaviorRegistry) -> Self {
		Self {
			array,
			behaviors,
		}
	}

	pub fn array(&self) -> &Array {
		&self.array
	}

	pub fn behaviors(&self) -> &BehaviorRegistry {
		&self.behaviors
	}

	/// Tags the held array with a named record behavior.
	///
	/// This is the one documented in-place rebind in the value model and
	/// it is single-assignment: a second call with a different name
	/// fails instead of silently dropping the first tag.
	pub fn add_behavior(&mut self, name: &str) -> Result<()> {
		debug!(behavior = name, "tagging columnar node");
		self.array = self.array.with_record_name(name)?;
		Ok(())
	}
}

impl ExpressionLayer for ColumnarLayer {
	type Raw = Array;
	type Wrapped = ColumnarLayer;

	fn wrap(&self, raw: Array) -> Result<ColumnarLayer> {
		Ok(ColumnarLayer::with_behaviors(raw, self.behaviors.clone()))
	}

	fn raw(&self) -> Result<Array> {
		Ok(self.array.clone())
	}

	fn single_item_map(&self, transform: &Lambda) -> Result<Array> {
		eval::evaluate_lambda(transform, self.array.clone(), Some(&self.behaviors))
	}

	fn iterable_map(&self, transform: &Lambda) -> Result<Array> {
		// Vectorized arrays broadcast; the collection map is the single
		// item map.
		self.single_item_map(transform)
	}

	fn as_columnar(&self) -> Result<Array> {
		Ok(self.array.clone())
	}

	fn get_attr(&self, name: &str) -> Result<ColumnarLayer> {
		self.wrap(self.array.field(name, Some(&self.behaviors))?)
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::expr::Expr;

	fn layer() -> ColumnarLayer {
		ColumnarLayer::new(
			Array::from_json(&json!([
				[{"x": 1}, {"x": 2}, {"x": 3}],
				[],
				[{"x": 4}, {"x": 5}],
			]))
			.unwrap(),
		)
	}

	#[test]
	fn test_wrap_then_materialize_round_trips() {
		let arr = Array::from_json(&json!([1, 2, 3])).unwrap();
		let wrapped = layer().wrap(arr.clone()).unwrap();
		assert_eq!(wrapped.as_columnar().unwrap(), arr);
	}

	#[test]
	fn test_maps_coincide() {
		let l = layer();
		let t = Lambda::new("e", Expr::param("e").field("x"));
		assert_eq!(l.single_item_map(&t).unwrap(), l.iterable_map(&t).unwrap());
	}

	#[test]
	fn test_get_attr_projects_field() {
		let out = layer().get_attr("x").unwrap();
		assert_eq!(out.as_columnar().unwrap().to_json().unwrap(), json!([[1, 2, 3], [], [4, 5]]));
	}

	#[test]
	fn test_add_behavior_twice_rejected() {
		let mut l = layer();
		l.add_behavior("jet").unwrap();
		assert!(l.add_behavior("muon").is_err());
		assert!(l.add_behavior("jet").is_ok());
	}
}
