// Copyright (c) ledm.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::sync::Arc;

use ledm_core::{Array, BehaviorRegistry, ColumnarLayer, ExpressionLayer, Result, Template};
use ledm_query::QueryLayer;
use tracing::debug;

use crate::{
	bound::{Bound, One},
	convert::ColumnarConvert,
};

/// The entry point that binds templates to backends.
///
/// A context owns the behavior registry consulted by everything it
/// constructs; its lifetime bounds the registry's, so behaviors declared
/// for one context never leak into another.
#[derive(Clone, Debug, Default)]
pub struct Context {
	behaviors: BehaviorRegistry,
}

impl Context {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn behaviors(&self) -> &BehaviorRegistry {
		&self.behaviors
	}

	/// Binds a template over a raw columnar array. The template's
	/// behaviors are resolved and the array tagged before anything is
	/// resolved against it.
	pub fn columnar(&self, template: &Arc<Template>, array: Array) -> Result<Bound<ColumnarLayer, One>> {
		self.columnar_layer(template, ColumnarLayer::with_behaviors(array, self.behaviors.clone()))
	}

	/// Binds a template over an existing columnar node.
	pub fn columnar_layer(&self, template: &Arc<Template>, layer: ColumnarLayer) -> Result<Bound<ColumnarLayer, One>> {
		let mut layer = ColumnarLayer::with_behaviors(layer.array().clone(), self.behaviors.clone());
		if let Some(name) = self.behaviors.resolve_for(template)? {
			layer.add_behavior(&name)?;
		}
		debug!(template = %template.name(), backend = "columnar", "bound template");
		Ok(Bound::new(layer, template.clone(), self.behaviors.clone()))
	}

	/// Binds a template over any non-columnar layer by routing every
	/// access through the columnar conversion.
	pub fn columnar_from<L: ExpressionLayer>(
		&self,
		template: &Arc<Template>,
		layer: L,
	) -> Result<Bound<ColumnarConvert<L>, One>> {
		let pending_tag = self.behaviors.resolve_for(template)?;
		let convert = ColumnarConvert::new(layer, self.behaviors.clone(), pending_tag);
		debug!(template = %template.name(), backend = "convert", "bound template");
		Ok(Bound::new(convert, template.clone(), self.behaviors.clone()))
	}

	/// Binds a template over a query pipeline or an existing query node.
	pub fn query(&self, template: &Arc<Template>, layer: impl Into<QueryLayer>) -> Result<Bound<QueryLayer, One>> {
		debug!(template = %template.name(), backend = "query", "bound template");
		Ok(Bound::new(layer.into(), template.clone(), self.behaviors.clone()))
	}
}
