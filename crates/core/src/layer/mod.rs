// Copyright (c) ledm.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! The capability contract every backend layer satisfies.

mod columnar;

pub use columnar::ColumnarLayer;

use crate::{error::Result, expr::Lambda, value::Array};

/// One backend's view of an expression node.
///
/// A layer owns exactly one underlying value (an array, a pipeline, a
/// captured foreign layer); `wrap` always produces a new node and never
/// mutates in place. Transforms arrive as projection IR lambdas, never
/// as opaque closures, so every backend can either interpret or
/// symbolically embed them.
pub trait ExpressionLayer: Clone + Send + Sync + Sized + 'static {
	/// The raw value this backend wraps.
	type Raw;

	/// The node type produced by wrapping a mapped result. Backends wrap
	/// into themselves; a converter wraps into the columnar layer it
	/// coerces to.
	type Wrapped: ExpressionLayer;

	/// Constructs a new node of this backend kind over a raw value.
	fn wrap(&self, raw: Self::Raw) -> Result<Self::Wrapped>;

	/// The current raw value.
	fn raw(&self) -> Result<Self::Raw>;

	/// Applies a transform to the current value as one logical item,
	/// returning the raw (unwrapped) result.
	fn single_item_map(&self, transform: &Lambda) -> Result<Self::Raw>;

	/// Applies a transform as if the current value were a collection of
	/// logical items, element-wise, one nesting level deeper than
	/// [`Self::single_item_map`].
	fn iterable_map(&self, transform: &Lambda) -> Result<Self::Raw>;

	/// Produces the columnar materialization of whatever this node
	/// currently represents, as lazily as the backend allows.
	fn as_columnar(&self) -> Result<Array>;

	/// Pass-through access to an attribute the template did not
	/// redeclare.
	fn get_attr(&self, name: &str) -> Result<Self::Wrapped>;

	/// The node map operations should target. Plain backends are their
	/// own root; template-bound layers point below themselves.
	fn root_expression(&self) -> &Self {
		self
	}
}
