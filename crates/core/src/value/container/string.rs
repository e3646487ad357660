// Copyright (c) ledm.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

/// UTF-8 string values with a validity mask.
#[derive(Clone, Debug, PartialEq)]
pub struct StringContainer {
	data: Vec<String>,
	validity: Vec<bool>,
}

impl StringContainer {
	pub fn new(data: Vec<String>, validity: Vec<bool>) -> Self {
		debug_assert_eq!(data.len(), validity.len());
		Self {
			data,
			validity,
		}
	}

	pub fn from_vec(data: Vec<String>) -> Self {
		let len = data.len();
		Self {
			data,
			validity: vec![true; len],
		}
	}

	pub fn with_capacity(capacity: usize) -> Self {
		Self {
			data: Vec::with_capacity(capacity),
			validity: Vec::with_capacity(capacity),
		}
	}

	pub fn len(&self) -> usize {
		debug_assert_eq!(self.data.len(), self.validity.len());
		self.data.len()
	}

	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	pub fn push(&mut self, value: impl Into<String>) {
		self.data.push(value.into());
		self.validity.push(true);
	}

	pub fn push_undefined(&mut self) {
		self.data.push(String::new());
		self.validity.push(false);
	}

	pub fn is_defined(&self, idx: usize) -> bool {
		idx < self.len() && self.validity[idx]
	}

	pub fn get(&self, idx: usize) -> Option<&str> {
		if self.is_defined(idx) {
			Some(&self.data[idx])
		} else {
			None
		}
	}

	pub fn iter(&self) -> impl Iterator<Item = Option<&str>> + '_ {
		self.data.iter().zip(self.validity.iter()).map(|(v, defined)| {
			if *defined {
				Some(v.as_str())
			} else {
				None
			}
		})
	}
}
