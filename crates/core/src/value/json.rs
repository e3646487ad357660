// Copyright (c) ledm.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! JSON construction and extraction for jagged arrays.
//!
//! The JSON edge exists for tests and for feeding small in-memory
//! datasets into a layer; it is not a storage format. Nulls map to
//! undefined slots, objects to records, nested arrays to lists.

use indexmap::IndexMap;
use serde_json::Value;

use super::{Array, ArrayData};
use crate::error::{Error, Result};

impl Array {
	/// Builds an array from a JSON array value.
	pub fn from_json(value: &Value) -> Result<Array> {
		match value {
			Value::Array(items) => from_values(items),
			other => Err(Error::TypeMismatch {
				expected: "json array".to_string(),
				found: json_kind(other).to_string(),
			}),
		}
	}

	/// Extracts the array back into JSON, forcing deferred values.
	pub fn to_json(&self) -> Result<Value> {
		match self.data() {
			ArrayData::Bool(c) => Ok(Value::Array(c.iter().map(|v| v.map(Value::from).unwrap_or(Value::Null)).collect())),
			ArrayData::Int64(c) => Ok(Value::Array(c.iter().map(|v| v.map(Value::from).unwrap_or(Value::Null)).collect())),
			ArrayData::Float64(c) => Ok(Value::Array(
				c.iter()
					.map(|v| {
						v.and_then(|f| serde_json::Number::from_f64(f)).map(Value::Number).unwrap_or(Value::Null)
					})
					.collect(),
			)),
			ArrayData::Utf8(c) => Ok(Value::Array(c.iter().map(|v| v.map(Value::from).unwrap_or(Value::Null)).collect())),
			ArrayData::List(list) => {
				let values = match list.values().to_json()? {
					Value::Array(values) => values,
					_ => unreachable!("array extraction always yields a json array"),
				};
				let mut rows = Vec::with_capacity(list.len());
				for idx in 0..list.len() {
					let (start, end) = list.span(idx).expect("index within row count");
					rows.push(Value::Array(values[start..end].to_vec()));
				}
				Ok(Value::Array(rows))
			}
			ArrayData::Record(record) => {
				let mut columns = Vec::with_capacity(record.fields().len());
				for (name, field) in record.fields() {
					let column = match field.to_json()? {
						Value::Array(column) => column,
						_ => unreachable!("array extraction always yields a json array"),
					};
					columns.push((name.clone(), column));
				}
				let mut rows = Vec::with_capacity(record.len());
				for idx in 0..record.len() {
					let mut row = serde_json::Map::new();
					for (name, column) in &columns {
						row.insert(name.clone(), column[idx].clone());
					}
					rows.push(Value::Object(row));
				}
				Ok(Value::Array(rows))
			}
			ArrayData::Deferred(deferred) => deferred.force()?.to_json(),
		}
	}
}

fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "bool",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}

fn from_values(items: &[Value]) -> Result<Array> {
	// Classify by the first defined element; nulls alone default to an
	// undefined int column.
	let sample = items.iter().find(|v| !v.is_null());
	match sample {
		None => {
			let mut c = super::container::NumberContainer::<i64>::with_capacity(items.len());
			for _ in items {
				c.push_undefined();
			}
			Ok(ArrayData::Int64(c).into())
		}
		Some(Value::Array(_)) => from_nested_lists(items),
		Some(Value::Object(_)) => from_objects(items),
		Some(Value::Bool(_)) => from_bools(items),
		Some(Value::String(_)) => from_strings(items),
		Some(Value::Number(_)) => from_numbers(items),
		Some(Value::Null) => unreachable!("sample is a defined element"),
	}
}

fn from_nested_lists(items: &[Value]) -> Result<Array> {
	let mut offsets = Vec::with_capacity(items.len() + 1);
	offsets.push(0usize);
	let mut flat = Vec::new();
	for item in items {
		match item {
			Value::Array(inner) => flat.extend(inner.iter().cloned()),
			other => {
				return Err(Error::TypeMismatch {
					expected: "array".to_string(),
					found: json_kind(other).to_string(),
				});
			}
		}
		offsets.push(flat.len());
	}
	Ok(Array::list(offsets, from_values(&flat)?))
}

fn from_objects(items: &[Value]) -> Result<Array> {
	let keys: Vec<String> = match items.iter().find(|v| !v.is_null()) {
		Some(Value::Object(first)) => first.keys().cloned().collect(),
		_ => {
			return Err(Error::TypeMismatch {
				expected: "object".to_string(),
				found: "mixed".to_string(),
			});
		}
	};
	let mut fields = IndexMap::new();
	for key in keys {
		let column: Vec<Value> = items
			.iter()
			.map(|item| match item {
				Value::Object(obj) => obj.get(&key).cloned().unwrap_or(Value::Null),
				_ => Value::Null,
			})
			.collect();
		fields.insert(key, from_values(&column)?);
	}
	Ok(Array::record(fields, items.len()))
}

fn from_bools(items: &[Value]) -> Result<Array> {
	let mut c = super::container::BoolContainer::with_capacity(items.len());
	for item in items {
		match item {
			Value::Bool(v) => c.push(*v),
			Value::Null => c.push_undefined(),
			other => {
				return Err(Error::TypeMismatch {
					expected: "bool".to_string(),
					found: json_kind(other).to_string(),
				});
			}
		}
	}
	Ok(ArrayData::Bool(c).into())
}

fn from_strings(items: &[Value]) -> Result<Array> {
	let mut c = super::container::StringContainer::with_capacity(items.len());
	for item in items {
		match item {
			Value::String(v) => c.push(v.clone()),
			Value::Null => c.push_undefined(),
			other => {
				return Err(Error::TypeMismatch {
					expected: "string".to_string(),
					found: json_kind(other).to_string(),
				});
			}
		}
	}
	Ok(ArrayData::Utf8(c).into())
}

fn from_numbers(items: &[Value]) -> Result<Array> {
	let integral = items.iter().all(|item| match item {
		Value::Number(n) => n.is_i64(),
		Value::Null => true,
		_ => false,
	});
	if integral {
		let mut c = super::container::NumberContainer::<i64>::with_capacity(items.len());
		for item in items {
			match item {
				Value::Number(n) => c.push(n.as_i64().expect("checked integral")),
				Value::Null => c.push_undefined(),
				other => {
					return Err(Error::TypeMismatch {
						expected: "number".to_string(),
						found: json_kind(other).to_string(),
					});
				}
			}
		}
		return Ok(ArrayData::Int64(c).into());
	}
	let mut c = super::container::NumberContainer::<f64>::with_capacity(items.len());
	for item in items {
		match item {
			Value::Number(n) => match n.as_f64() {
				Some(v) => c.push(v),
				None => c.push_undefined(),
			},
			Value::Null => c.push_undefined(),
			other => {
				return Err(Error::TypeMismatch {
					expected: "number".to_string(),
					found: json_kind(other).to_string(),
				});
			}
		}
	}
	Ok(ArrayData::Float64(c).into())
}
