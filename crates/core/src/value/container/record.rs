// Copyright (c) ledm.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use indexmap::IndexMap;

use crate::value::Array;

/// Named columns of equal row count, optionally tagged with the name of a
/// registered record behavior.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordContainer {
	fields: IndexMap<String, Array>,
	len: usize,
	name: Option<String>,
}

impl RecordContainer {
	pub fn new(fields: IndexMap<String, Array>, len: usize) -> Self {
		debug_assert!(fields.values().all(|f| f.known_len().map(|l| l == len).unwrap_or(true)));
		Self {
			fields,
			len,
			name: None,
		}
	}

	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	pub fn fields(&self) -> &IndexMap<String, Array> {
		&self.fields
	}

	pub fn field(&self, name: &str) -> Option<&Array> {
		self.fields.get(name)
	}

	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}
}
