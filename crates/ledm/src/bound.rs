// Copyright (c) ledm.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! The template resolution engine.
//!
//! A [`Bound`] value pairs a backend node with a template. Resolving a
//! member looks it up in the template's table, pushes the remap through
//! the backend's map primitive, wraps the raw result, and classifies it:
//! a leaf hands back the wrapped node, a nested template binds a fresh
//! engine over it, a collection switches everything beneath into
//! element-wise context.
//!
//! Singular and plural contexts share this one code path; only the
//! choice of map primitive differs, and that choice is made statically
//! by the [`Multiplicity`] parameter rather than by a runtime branch.

use std::{marker::PhantomData, sync::Arc};

use ledm_core::{
	Array, BehaviorRegistry, Error, ExpressionLayer, Lambda, MemberKind, Result, Template,
};
use tracing::debug;

use crate::materialize;

/// Static choice of map primitive: [`One`] routes member resolution
/// through `single_item_map`, [`Many`] through `iterable_map`.
pub trait Multiplicity: Send + Sync + Sized + 'static {
	/// Context label for diagnostics.
	const CONTEXT: &'static str;

	fn apply<L: ExpressionLayer>(layer: &L, transform: &Lambda) -> Result<L::Raw>;

	/// Binds a nested single-object member. In a plural context the
	/// nested object stays element-wise.
	fn bind<W: ExpressionLayer>(node: W, template: Arc<Template>, behaviors: BehaviorRegistry) -> Resolved<W>;

	fn materialize<L: ExpressionLayer>(bound: &Bound<L, Self>) -> Result<Array>;
}

/// Singular context: the node represents one logical item.
#[derive(Clone, Copy, Debug)]
pub struct One;

/// Plural context: the node represents a collection, and every access
/// beneath it applies element-wise.
#[derive(Clone, Copy, Debug)]
pub struct Many;

impl Multiplicity for One {
	const CONTEXT: &'static str = "single";

	fn apply<L: ExpressionLayer>(layer: &L, transform: &Lambda) -> Result<L::Raw> {
		layer.single_item_map(transform)
	}

	fn bind<W: ExpressionLayer>(node: W, template: Arc<Template>, behaviors: BehaviorRegistry) -> Resolved<W> {
		Resolved::Single(Bound::new(node, template, behaviors))
	}

	fn materialize<L: ExpressionLayer>(bound: &Bound<L, One>) -> Result<Array> {
		materialize::record(bound)
	}
}

impl Multiplicity for Many {
	const CONTEXT: &'static str = "iterable";

	fn apply<L: ExpressionLayer>(layer: &L, transform: &Lambda) -> Result<L::Raw> {
		layer.iterable_map(transform)
	}

	fn bind<W: ExpressionLayer>(node: W, template: Arc<Template>, behaviors: BehaviorRegistry) -> Resolved<W> {
		Resolved::Plural(Bound::new(node, template, behaviors))
	}

	fn materialize<L: ExpressionLayer>(bound: &Bound<L, Many>) -> Result<Array> {
		// A collection context materializes as one deferred
		// record-of-arrays; nothing is forced until first read.
		let inner = bound.clone();
		Ok(Array::deferred_with(None, true, move || materialize::record(&inner)))
	}
}

/// A backend node bound to a template: the resolution engine itself.
#[derive(Debug)]
pub struct Bound<L: ExpressionLayer, M: Multiplicity> {
	node: L,
	template: Arc<Template>,
	behaviors: BehaviorRegistry,
	_multiplicity: PhantomData<M>,
}

impl<L: ExpressionLayer, M: Multiplicity> Clone for Bound<L, M> {
	fn clone(&self) -> Self {
		Self {
			node: self.node.clone(),
			template: self.template.clone(),
			behaviors: self.behaviors.clone(),
			_multiplicity: PhantomData,
		}
	}
}

/// What resolving one member produced.
#[derive(Debug)]
pub enum Resolved<W: ExpressionLayer> {
	/// A terminal (or unclassified) member: the wrapped expression node.
	Leaf(W),
	/// A nested single object, open for further singular resolution.
	Single(Bound<W, One>),
	/// A nested collection (or anything beneath one); all further
	/// resolution applies element-wise.
	Plural(Bound<W, Many>),
}

impl<L: ExpressionLayer, M: Multiplicity> Bound<L, M> {
	pub fn new(node: L, template: Arc<Template>, behaviors: BehaviorRegistry) -> Self {
		Self {
			node,
			template,
			behaviors,
			_multiplicity: PhantomData,
		}
	}

	pub fn template(&self) -> &Arc<Template> {
		&self.template
	}

	pub fn node(&self) -> &L {
		&self.node
	}

	pub fn behaviors(&self) -> &BehaviorRegistry {
		&self.behaviors
	}

	/// Resolves one logical member.
	///
	/// A name the template does not declare passes through to the
	/// wrapped node's own attribute of the same name, so raw backend
	/// fields stay reachable.
	pub fn get(&self, name: &str) -> Result<Resolved<L::Wrapped>> {
		let Some(member) = self.template.member(name) else {
			debug!(template = %self.template.name(), member = name, "pass-through attribute");
			return Ok(Resolved::Leaf(self.node.get_attr(name)?));
		};

		let root = self.node.root_expression();
		let raw = M::apply(root, member.remap())?;
		let node = root.wrap(raw)?;
		debug!(
			template = %self.template.name(),
			member = name,
			context = M::CONTEXT,
			"resolved member"
		);

		Ok(match member.kind() {
			MemberKind::Terminal => Resolved::Leaf(node),
			MemberKind::Object(template) => M::bind(node, template.clone(), self.behaviors.clone()),
			MemberKind::Sequence(template) => {
				Resolved::Plural(Bound::new(node, template.clone(), self.behaviors.clone()))
			}
		})
	}

	/// Materializes this bound layer into a columnar record of every
	/// declared member.
	pub fn as_columnar(&self) -> Result<Array> {
		M::materialize(self)
	}
}

impl<W: ExpressionLayer> Resolved<W> {
	/// Continues the chain one member deeper.
	pub fn get(&self, name: &str) -> Result<Resolved<W::Wrapped>> {
		match self {
			Resolved::Leaf(node) => Ok(Resolved::Leaf(node.get_attr(name)?)),
			Resolved::Single(bound) => bound.get(name),
			Resolved::Plural(bound) => bound.get(name),
		}
	}

	pub fn as_columnar(&self) -> Result<Array> {
		match self {
			Resolved::Leaf(node) => node.as_columnar(),
			Resolved::Single(bound) => bound.as_columnar(),
			Resolved::Plural(bound) => bound.as_columnar(),
		}
	}

	/// The wrapped node of a terminal resolution.
	pub fn leaf(self) -> Result<W> {
		match self {
			Resolved::Leaf(node) => Ok(node),
			Resolved::Single(_) | Resolved::Plural(_) => Err(Error::InvalidOperation {
				operation: "taking the leaf node of a nested resolution".to_string(),
			}),
		}
	}
}

/// Templates never act as expression nodes themselves: wrapping or
/// mapping through a bound layer is structural misuse. Materialization
/// and pass-through remain available, which is what lets a conversion
/// layer capture a bound value.
impl<L: ExpressionLayer, M: Multiplicity> ExpressionLayer for Bound<L, M> {
	type Raw = L::Raw;
	type Wrapped = L::Wrapped;

	fn wrap(&self, _raw: L::Raw) -> Result<L::Wrapped> {
		Err(Error::InvalidOperation {
			operation: "wrapping a raw value in a template-bound layer".to_string(),
		})
	}

	fn raw(&self) -> Result<L::Raw> {
		self.node.raw()
	}

	fn single_item_map(&self, _transform: &Lambda) -> Result<L::Raw> {
		Err(Error::InvalidOperation {
			operation: "mapping over a template declaration".to_string(),
		})
	}

	fn iterable_map(&self, _transform: &Lambda) -> Result<L::Raw> {
		Err(Error::InvalidOperation {
			operation: "mapping over a template declaration".to_string(),
		})
	}

	fn as_columnar(&self) -> Result<Array> {
		M::materialize(self)
	}

	fn get_attr(&self, name: &str) -> Result<L::Wrapped> {
		match self.get(name)? {
			Resolved::Leaf(node) => Ok(node),
			Resolved::Single(_) | Resolved::Plural(_) => Err(Error::UnsupportedOperation {
				operation: format!("pass-through access to nested member '{name}'"),
			}),
		}
	}
}
