// Copyright (c) ledm.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

/// Boolean values with a validity mask.
#[derive(Clone, Debug, PartialEq)]
pub struct BoolContainer {
	data: Vec<bool>,
	validity: Vec<bool>,
}

impl BoolContainer {
	pub fn new(data: Vec<bool>, validity: Vec<bool>) -> Self {
		debug_assert_eq!(data.len(), validity.len());
		Self {
			data,
			validity,
		}
	}

	pub fn from_vec(data: Vec<bool>) -> Self {
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

	pub fn push(&mut self, value: bool) {
		self.data.push(value);
		self.validity.push(true);
	}

	pub fn push_undefined(&mut self) {
		self.data.push(false);
		self.validity.push(false);
	}

	pub fn is_defined(&self, idx: usize) -> bool {
		idx < self.len() && self.validity[idx]
	}

	pub fn get(&self, idx: usize) -> Option<bool> {
		if self.is_defined(idx) {
			Some(self.data[idx])
		} else {
			None
		}
	}

	pub fn data(&self) -> &[bool] {
		&self.data
	}

	pub fn validity(&self) -> &[bool] {
		&self.validity
	}

	pub fn iter(&self) -> impl Iterator<Item = Option<bool>> + '_ {
		self.data.iter().zip(self.validity.iter()).map(|(v, defined)| {
			if *defined {
				Some(*v)
			} else {
				None
			}
		})
	}
}
