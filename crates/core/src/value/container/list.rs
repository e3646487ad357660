// Copyright (c) ledm.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use crate::{
	error::{Error, Result},
	value::Array,
};

/// Variable-length sublists over a flat values array.
///
/// `offsets` has one more entry than the row count; row `i` spans
/// `values[offsets[i]..offsets[i + 1]]`.
#[derive(Clone, Debug, PartialEq)]
pub struct ListContainer {
	offsets: Vec<usize>,
	values: Box<Array>,
}

impl ListContainer {
	pub fn new(offsets: Vec<usize>, values: Array) -> Self {
		debug_assert!(!offsets.is_empty());
		debug_assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
		Self {
			offsets,
			values: Box::new(values),
		}
	}

	pub fn len(&self) -> usize {
		self.offsets.len() - 1
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn offsets(&self) -> &[usize] {
		&self.offsets
	}

	pub fn values(&self) -> &Array {
		&self.values
	}

	/// The bounds of row `idx` into the values array.
	pub fn span(&self, idx: usize) -> Option<(usize, usize)> {
		if idx < self.len() {
			Some((self.offsets[idx], self.offsets[idx + 1]))
		} else {
			None
		}
	}

	/// Rebuilds the list around a transformed values array of the same
	/// length, keeping the offsets. This is how elementwise operations
	/// broadcast through the jagged structure.
	pub fn with_values(&self, values: Array) -> Result<Self> {
		let expected = *self.offsets.last().unwrap_or(&0);
		let found = values.len()?;
		if found != expected {
			return Err(Error::ShapeMismatch {
				left: format!("list values of length {expected}"),
				right: format!("replacement of length {found}"),
			});
		}
		Ok(Self {
			offsets: self.offsets.clone(),
			values: Box::new(values),
		})
	}
}
