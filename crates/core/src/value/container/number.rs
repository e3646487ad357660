// Copyright (c) ledm.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

/// Fixed-width numeric values with a validity mask.
#[derive(Clone, Debug, PartialEq)]
pub struct NumberContainer<T> {
	data: Vec<T>,
	validity: Vec<bool>,
}

impl<T: Copy + Default> NumberContainer<T> {
	pub fn new(data: Vec<T>, validity: Vec<bool>) -> Self {
		debug_assert_eq!(data.len(), validity.len());
		Self {
			data,
			validity,
		}
	}

	pub fn from_vec(data: Vec<T>) -> Self {
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

	pub fn push(&mut self, value: T) {
		self.data.push(value);
		self.validity.push(true);
	}

	pub fn push_undefined(&mut self) {
		self.data.push(T::default());
		self.validity.push(false);
	}

	pub fn is_defined(&self, idx: usize) -> bool {
		idx < self.len() && self.validity[idx]
	}

	pub fn get(&self, idx: usize) -> Option<T> {
		if self.is_defined(idx) {
			Some(self.data[idx])
		} else {
			None
		}
	}

	pub fn data(&self) -> &[T] {
		&self.data
	}

	pub fn validity(&self) -> &[bool] {
		&self.validity
	}

	pub fn iter(&self) -> impl Iterator<Item = Option<T>> + '_ {
		self.data.iter().zip(self.validity.iter()).map(|(v, defined)| {
			if *defined {
				Some(*v)
			} else {
				None
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_push_and_get() {
		let mut c = NumberContainer::<i64>::with_capacity(3);
		c.push(1);
		c.push_undefined();
		c.push(3);
		assert_eq!(c.len(), 3);
		assert_eq!(c.get(0), Some(1));
		assert_eq!(c.get(1), None);
		assert_eq!(c.get(2), Some(3));
		assert_eq!(c.get(3), None);
	}

	#[test]
	fn test_iter_yields_undefined_slots() {
		let c = NumberContainer::new(vec![1.5f64, 0.0], vec![true, false]);
		let collected: Vec<_> = c.iter().collect();
		assert_eq!(collected, vec![Some(1.5), None]);
	}
}
