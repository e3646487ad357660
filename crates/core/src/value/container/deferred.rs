// Copyright (c) ledm.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::{
	fmt,
	fmt::{Debug, Formatter},
	sync::Arc,
};

use once_cell::sync::OnceCell;

use crate::{error::Result, value::Array};

type Generator = Arc<dyn Fn() -> Result<Array> + Send + Sync>;

/// A value whose computation is represented by a zero-argument generator
/// invoked only when first needed.
///
/// When `cache` is set (the default), concurrent readers force the
/// generator at most once and share the result through the cell. A
/// container built with caching disabled recomputes on every read; that
/// is part of its contract, not an optimization bug.
#[derive(Clone)]
pub struct DeferredContainer {
	len: Option<usize>,
	generator: Generator,
	cell: Arc<OnceCell<Array>>,
	cache: bool,
}

impl DeferredContainer {
	pub fn new(len: Option<usize>, cache: bool, generator: impl Fn() -> Result<Array> + Send + Sync + 'static) -> Self {
		Self {
			len,
			generator: Arc::new(generator),
			cell: Arc::new(OnceCell::new()),
			cache,
		}
	}

	/// Row count without forcing, when declared at construction or
	/// already materialized.
	pub fn known_len(&self) -> Option<usize> {
		self.len.or_else(|| self.cell.get().and_then(|a| a.known_len()))
	}

	pub fn is_materialized(&self) -> bool {
		self.cell.get().is_some()
	}

	pub fn is_cached(&self) -> bool {
		self.cache
	}

	/// Runs the generator (or returns the shared result) and hands back
	/// the concrete array.
	pub fn force(&self) -> Result<Array> {
		if self.cache {
			self.cell.get_or_try_init(|| (self.generator)()).cloned()
		} else {
			(self.generator)()
		}
	}

	pub fn len(&self) -> Result<usize> {
		match self.known_len() {
			Some(len) => Ok(len),
			None => self.force()?.len(),
		}
	}
}

impl Debug for DeferredContainer {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("DeferredContainer")
			.field("len", &self.len)
			.field("cache", &self.cache)
			.field("materialized", &self.is_materialized())
			.finish()
	}
}

impl PartialEq for DeferredContainer {
	fn eq(&self, other: &Self) -> bool {
		match (self.force(), other.force()) {
			(Ok(a), Ok(b)) => a == b,
			_ => false,
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};

	use super::*;

	#[test]
	fn test_generator_runs_at_most_once_when_cached() {
		let calls = Arc::new(AtomicUsize::new(0));
		let seen = calls.clone();
		let d = DeferredContainer::new(Some(3), true, move || {
			seen.fetch_add(1, Ordering::SeqCst);
			Ok(Array::int64(vec![1, 2, 3]))
		});
		assert!(!d.is_materialized());
		assert_eq!(d.force().unwrap(), Array::int64(vec![1, 2, 3]));
		assert_eq!(d.force().unwrap(), Array::int64(vec![1, 2, 3]));
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn test_uncached_generator_recomputes() {
		let calls = Arc::new(AtomicUsize::new(0));
		let seen = calls.clone();
		let d = DeferredContainer::new(Some(1), false, move || {
			seen.fetch_add(1, Ordering::SeqCst);
			Ok(Array::int64(vec![7]))
		});
		d.force().unwrap();
		d.force().unwrap();
		assert_eq!(calls.load(Ordering::SeqCst), 2);
	}

	#[test]
	fn test_len_forces_only_when_unknown() {
		let calls = Arc::new(AtomicUsize::new(0));
		let seen = calls.clone();
		let d = DeferredContainer::new(None, true, move || {
			seen.fetch_add(1, Ordering::SeqCst);
			Ok(Array::int64(vec![1, 2]))
		});
		assert_eq!(d.len().unwrap(), 2);
		assert_eq!(calls.load(Ordering::SeqCst), 1);

		let declared = DeferredContainer::new(Some(5), true, || Ok(Array::int64(vec![0; 5])));
		assert_eq!(declared.len().unwrap(), 5);
		assert!(!declared.is_materialized());
	}
}
