// Copyright (c) ledm.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Jagged columnar arrays.
//!
//! An [`Array`] is the materialized representation every layer can be
//! forced into: scalar columns with validity masks, variable-length
//! lists, records of named columns, and deferred values computed by a
//! generator on first read. Elementwise operations broadcast through the
//! jagged structure, so a transform written against one logical item
//! applies unchanged across a whole collection.

pub mod container;
pub mod eval;
mod json;

use indexmap::IndexMap;

use self::container::{
	BoolContainer, DeferredContainer, ListContainer, NumberContainer, RecordContainer, StringContainer,
};

use crate::{
	behavior::BehaviorRegistry,
	error::{Error, Result},
};

#[derive(Clone, Debug, PartialEq)]
pub enum ArrayData {
	Bool(BoolContainer),
	Int64(NumberContainer<i64>),
	Float64(NumberContainer<f64>),
	Utf8(StringContainer),
	List(ListContainer),
	Record(RecordContainer),
	Deferred(DeferredContainer),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Array {
	data: ArrayData,
}

impl From<ArrayData> for Array {
	fn from(data: ArrayData) -> Self {
		Self {
			data,
		}
	}
}

impl Array {
	pub fn bool(values: Vec<bool>) -> Self {
		ArrayData::Bool(BoolContainer::from_vec(values)).into()
	}

	pub fn int64(values: Vec<i64>) -> Self {
		ArrayData::Int64(NumberContainer::from_vec(values)).into()
	}

	pub fn float64(values: Vec<f64>) -> Self {
		ArrayData::Float64(NumberContainer::from_vec(values)).into()
	}

	pub fn utf8(values: Vec<String>) -> Self {
		ArrayData::Utf8(StringContainer::from_vec(values)).into()
	}

	pub fn list(offsets: Vec<usize>, values: Array) -> Self {
		ArrayData::List(ListContainer::new(offsets, values)).into()
	}

	pub fn record(fields: IndexMap<String, Array>, len: usize) -> Self {
		ArrayData::Record(RecordContainer::new(fields, len)).into()
	}

	/// A lazily computed array of known row count; the generator runs at
	/// most once and the result is shared.
	pub fn deferred(len: usize, generator: impl Fn() -> Result<Array> + Send + Sync + 'static) -> Self {
		ArrayData::Deferred(DeferredContainer::new(Some(len), true, generator)).into()
	}

	/// A lazily computed array with explicit length and caching control.
	/// `len: None` defers the row count until first read; `cache: false`
	/// reruns the generator on every read.
	pub fn deferred_with(len: Option<usize>, cache: bool, generator: impl Fn() -> Result<Array> + Send + Sync + 'static) -> Self {
		ArrayData::Deferred(DeferredContainer::new(len, cache, generator)).into()
	}

	pub fn data(&self) -> &ArrayData {
		&self.data
	}

	pub fn type_name(&self) -> &'static str {
		match &self.data {
			ArrayData::Bool(_) => "bool",
			ArrayData::Int64(_) => "int64",
			ArrayData::Float64(_) => "float64",
			ArrayData::Utf8(_) => "utf8",
			ArrayData::List(_) => "list",
			ArrayData::Record(_) => "record",
			ArrayData::Deferred(_) => "deferred",
		}
	}

	/// Row count. Forces a deferred array only when its length was not
	/// declared and has not been materialized yet.
	pub fn len(&self) -> Result<usize> {
		match &self.data {
			ArrayData::Bool(c) => Ok(c.len()),
			ArrayData::Int64(c) => Ok(c.len()),
			ArrayData::Float64(c) => Ok(c.len()),
			ArrayData::Utf8(c) => Ok(c.len()),
			ArrayData::List(c) => Ok(c.len()),
			ArrayData::Record(c) => Ok(c.len()),
			ArrayData::Deferred(c) => c.len(),
		}
	}

	/// Row count without forcing anything; `None` for an unmaterialized
	/// deferred array of undeclared length.
	pub fn known_len(&self) -> Option<usize> {
		match &self.data {
			ArrayData::Deferred(c) => c.known_len(),
			_ => self.len().ok(),
		}
	}

	/// Resolves any top-level deferral into concrete data.
	pub fn settle(&self) -> Result<Array> {
		let mut current = self.clone();
		loop {
			let next = match &current.data {
				ArrayData::Deferred(d) => d.force()?,
				_ => return Ok(current),
			};
			current = next;
		}
	}

	/// Projects a named field, broadcasting through lists and deferred
	/// cells. On a behavior-tagged record, a name that is not a stored
	/// field falls back to the behavior's derived properties.
	pub fn field(&self, name: &str, behaviors: Option<&BehaviorRegistry>) -> Result<Array> {
		match &self.data {
			ArrayData::Record(record) => {
				if let Some(field) = record.field(name) {
					return Ok(field.clone());
				}
				if let (Some(registry), Some(tag)) = (behaviors, record.name()) {
					if let Some(property) = registry.property(tag, name) {
						return eval::evaluate_lambda(&property, self.clone(), behaviors);
					}
				}
				Err(Error::AttributeNotFound {
					name: name.to_string(),
				})
			}
			ArrayData::List(list) => {
				let values = list.values().field(name, behaviors)?;
				Ok(ArrayData::List(list.with_values(values)?).into())
			}
			ArrayData::Deferred(deferred) => deferred.force()?.field(name, behaviors),
			_ => Err(Error::AttributeNotFound {
				name: name.to_string(),
			}),
		}
	}

	/// The behavior tag of the underlying record data, if any. Does not
	/// force deferred values.
	pub fn record_name(&self) -> Option<String> {
		match &self.data {
			ArrayData::Record(record) => record.name().map(|n| n.to_string()),
			ArrayData::List(list) => list.values().record_name(),
			_ => None,
		}
	}

	/// Tags the underlying record data with a behavior name.
	///
	/// Tagging is a one-time operation: re-tagging with the same name is
	/// a no-op, re-tagging with a different name is an error.
	pub fn with_record_name(&self, name: &str) -> Result<Array> {
		self.tag(name, true)
	}

	/// Tags the underlying record data unless some tag is already
	/// present; a no-op on data with no records to tag.
	pub fn tag_if_untagged(&self, name: &str) -> Result<Array> {
		self.tag(name, false)
	}

	fn tag(&self, name: &str, strict: bool) -> Result<Array> {
		match &self.data {
			ArrayData::Record(record) => match record.name() {
				None => Ok(ArrayData::Record(record.clone().with_name(name)).into()),
				Some(existing) if existing == name || !strict => Ok(self.clone()),
				Some(existing) => Err(Error::BehaviorAlreadyBound {
					existing: existing.to_string(),
					requested: name.to_string(),
				}),
			},
			ArrayData::List(list) => {
				let values = list.values().tag(name, strict)?;
				Ok(ArrayData::List(list.with_values(values)?).into())
			}
			ArrayData::Deferred(deferred) => {
				let inner = deferred.clone();
				let tag = name.to_string();
				Ok(ArrayData::Deferred(DeferredContainer::new(inner.known_len(), inner.is_cached(), move || {
					inner.force()?.tag(&tag, strict)
				}))
				.into())
			}
			_ if strict => Err(Error::TypeMismatch {
				expected: "record data".to_string(),
				found: self.type_name().to_string(),
			}),
			_ => Ok(self.clone()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn jagged_records() -> Array {
		Array::from_json(&serde_json::json!([
			[{"x": 1}, {"x": 2}, {"x": 3}],
			[],
			[{"x": 4}, {"x": 5}],
		]))
		.unwrap()
	}

	#[test]
	fn test_field_broadcasts_through_lists() {
		let arr = jagged_records();
		let x = arr.field("x", None).unwrap();
		assert_eq!(x.to_json().unwrap(), serde_json::json!([[1, 2, 3], [], [4, 5]]));
	}

	#[test]
	fn test_field_missing_is_attribute_not_found() {
		let arr = jagged_records();
		let err = arr.field("missing", None).unwrap_err();
		assert!(matches!(err, Error::AttributeNotFound { name } if name == "missing"));
	}

	#[test]
	fn test_tag_reaches_nested_records() {
		let arr = jagged_records().with_record_name("jet").unwrap();
		assert_eq!(arr.record_name().as_deref(), Some("jet"));
	}

	#[test]
	fn test_retag_same_name_is_noop() {
		let arr = jagged_records().with_record_name("jet").unwrap();
		let again = arr.with_record_name("jet").unwrap();
		assert_eq!(again.record_name().as_deref(), Some("jet"));
	}

	#[test]
	fn test_retag_different_name_errors() {
		let arr = jagged_records().with_record_name("jet").unwrap();
		let err = arr.with_record_name("muon").unwrap_err();
		assert_eq!(
			err,
			Error::BehaviorAlreadyBound {
				existing: "jet".to_string(),
				requested: "muon".to_string(),
			}
		);
	}

	#[test]
	fn test_field_on_deferred_forces_then_projects() {
		let arr = Array::deferred(3, || {
			Ok(Array::from_json(&serde_json::json!([{"x": 1}, {"x": 2}, {"x": 3}])).unwrap())
		});
		let x = arr.field("x", None).unwrap();
		assert_eq!(x.to_json().unwrap(), serde_json::json!([1, 2, 3]));
	}
}
