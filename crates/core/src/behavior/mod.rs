// Copyright (c) ledm.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Named record behaviors.
//!
//! A behavior is a bundle of derived properties attached to materialized
//! records by tag: the property lambdas are evaluated against the record
//! on demand, so `v.x2` can be computed from stored fields without ever
//! being stored itself. The registry is owned by the binding context
//! that constructs template-bound layers, not by the process; it is not
//! thread-safe for concurrent registration, so define templates before
//! spawning worker threads.

use std::{
	fmt,
	fmt::{Debug, Formatter},
	sync::Arc,
};

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::{
	error::{Error, Result},
	expr::Lambda,
	template::Template,
};

/// A named bundle of derived record properties.
#[derive(Clone, Debug, PartialEq)]
pub struct Behavior {
	name: String,
	properties: IndexMap<String, Lambda>,
}

impl Behavior {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			properties: IndexMap::new(),
		}
	}

	pub fn property(mut self, name: impl Into<String>, lambda: Lambda) -> Self {
		self.properties.insert(name.into(), lambda);
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn properties(&self) -> &IndexMap<String, Lambda> {
		&self.properties
	}
}

type RegistrationCallback = Arc<dyn Fn(&BehaviorRegistry) + Send + Sync>;

/// How a template refers to a behavior: by the name of one registered
/// elsewhere, or by carrying the definition inline.
#[derive(Clone)]
pub enum BehaviorRef {
	Named(String),
	Inline(Behavior),
}

/// One behavior declaration attached to a template, with an optional
/// one-shot registration callback run just before the behavior is first
/// needed.
#[derive(Clone)]
pub struct BehaviorDecl {
	reference: BehaviorRef,
	callback: Option<RegistrationCallback>,
}

impl BehaviorDecl {
	pub fn named(name: impl Into<String>) -> Self {
		Self {
			reference: BehaviorRef::Named(name.into()),
			callback: None,
		}
	}

	pub fn inline(behavior: Behavior) -> Self {
		Self {
			reference: BehaviorRef::Inline(behavior),
			callback: None,
		}
	}

	pub fn with_callback(mut self, callback: impl Fn(&BehaviorRegistry) + Send + Sync + 'static) -> Self {
		self.callback = Some(Arc::new(callback));
		self
	}

	pub fn reference(&self) -> &BehaviorRef {
		&self.reference
	}
}

impl Debug for BehaviorDecl {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let name = match &self.reference {
			BehaviorRef::Named(name) => name.as_str(),
			BehaviorRef::Inline(behavior) => behavior.name(),
		};
		f.debug_struct("BehaviorDecl")
			.field("name", &name)
			.field("callback", &self.callback.is_some())
			.finish()
	}
}

/// The behavior table consulted when records are tagged and when tagged
/// records are asked for derived properties. Cheap to clone; clones
/// share the table.
#[derive(Clone, Debug, Default)]
pub struct BehaviorRegistry {
	inner: Arc<RwLock<IndexMap<String, Behavior>>>,
}

impl BehaviorRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a behavior under its name unless that name is already
	/// taken; first registration wins.
	pub fn declare(&self, behavior: Behavior) {
		let mut table = self.inner.write();
		let name = behavior.name().to_string();
		table.entry(name).or_insert(behavior);
	}

	pub fn contains(&self, name: &str) -> bool {
		self.inner.read().contains_key(name)
	}

	pub fn get(&self, name: &str) -> Option<Behavior> {
		self.inner.read().get(name).cloned()
	}

	/// Looks up one derived property of a registered behavior.
	pub fn property(&self, behavior: &str, name: &str) -> Option<Lambda> {
		self.inner.read().get(behavior).and_then(|b| b.properties().get(name)).cloned()
	}

	/// Resolves the behavior a template's materialized records carry.
	///
	/// Zero declarations resolve to no behavior; one declaration runs
	/// its callback and yields its (validated) name; several are
	/// synthesized into a composite registered under a freshly generated
	/// unique name, so one synthesis can never shadow another.
	pub fn resolve_for(&self, template: &Template) -> Result<Option<String>> {
		let decls = template.behaviors();
		if decls.is_empty() {
			return Ok(None);
		}

		for decl in decls {
			if let Some(callback) = &decl.callback {
				callback(self);
			}
		}

		if let [only] = decls {
			let name = match only.reference() {
				BehaviorRef::Named(name) => {
					if !self.contains(name) {
						return Err(Error::UnknownBehavior {
							name: name.clone(),
						});
					}
					name.clone()
				}
				BehaviorRef::Inline(behavior) => {
					self.declare(behavior.clone());
					behavior.name().to_string()
				}
			};
			debug!(template = %template.name(), behavior = %name, "resolved behavior");
			return Ok(Some(name));
		}

		// Multiple behaviors compose: merge the property tables in
		// declaration order (first declaration of a property wins).
		let mut properties = IndexMap::new();
		for decl in decls {
			let behavior = match decl.reference() {
				BehaviorRef::Named(name) => self.get(name).ok_or_else(|| Error::UnknownBehavior {
					name: name.clone(),
				})?,
				BehaviorRef::Inline(behavior) => behavior.clone(),
			};
			for (name, lambda) in behavior.properties() {
				properties.entry(name.clone()).or_insert_with(|| lambda.clone());
			}
		}

		let name = format!("composite-{}", Uuid::new_v4());
		let mut composite = Behavior::new(name.clone());
		composite.properties = properties;
		self.declare(composite);
		debug!(template = %template.name(), behavior = %name, "synthesized composite behavior");
		Ok(Some(name))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::expr::Expr;

	fn doubler() -> Behavior {
		Behavior::new("doubler").property("x2", Lambda::new("v", Expr::param("v").field("x").mul(Expr::lit(2i64))))
	}

	fn tripler() -> Behavior {
		Behavior::new("tripler").property("x3", Lambda::new("v", Expr::param("v").field("x").mul(Expr::lit(3i64))))
	}

	#[test]
	fn test_no_declarations_resolve_to_none_repeatedly() {
		let registry = BehaviorRegistry::new();
		let template = Template::builder("bare").build();
		assert_eq!(registry.resolve_for(&template).unwrap(), None);
		assert_eq!(registry.resolve_for(&template).unwrap(), None);
	}

	#[test]
	fn test_inline_declaration_registers_and_names() {
		let registry = BehaviorRegistry::new();
		let template = Template::builder("evt").behavior(BehaviorDecl::inline(doubler())).build();
		let name = registry.resolve_for(&template).unwrap().unwrap();
		assert_eq!(name, "doubler");
		assert!(registry.contains("doubler"));
	}

	#[test]
	fn test_unknown_named_behavior_fails_with_name() {
		let registry = BehaviorRegistry::new();
		let template = Template::builder("evt").behavior(BehaviorDecl::named("never-registered")).build();
		let err = registry.resolve_for(&template).unwrap_err();
		assert_eq!(
			err,
			Error::UnknownBehavior {
				name: "never-registered".to_string(),
			}
		);
		assert!(err.to_string().contains("never-registered"));
	}

	#[test]
	fn test_named_behavior_validated_after_callback() {
		let registry = BehaviorRegistry::new();
		let template = Template::builder("evt")
			.behavior(BehaviorDecl::named("doubler").with_callback(|r| r.declare(doubler())))
			.build();
		assert_eq!(registry.resolve_for(&template).unwrap().unwrap(), "doubler");
	}

	#[test]
	fn test_two_behaviors_synthesize_composite_with_both_properties() {
		let registry = BehaviorRegistry::new();
		let template = Template::builder("evt")
			.behavior(BehaviorDecl::inline(doubler()))
			.behavior(BehaviorDecl::inline(tripler()))
			.build();
		let name = registry.resolve_for(&template).unwrap().unwrap();
		assert!(name.starts_with("composite-"));
		assert!(registry.property(&name, "x2").is_some());
		assert!(registry.property(&name, "x3").is_some());
	}

	#[test]
	fn test_syntheses_never_shadow_each_other() {
		let registry = BehaviorRegistry::new();
		let template = Template::builder("evt")
			.behavior(BehaviorDecl::inline(doubler()))
			.behavior(BehaviorDecl::inline(tripler()))
			.build();
		let first = registry.resolve_for(&template).unwrap().unwrap();
		let second = registry.resolve_for(&template).unwrap().unwrap();
		assert_ne!(first, second);
		assert!(registry.property(&first, "x2").is_some());
		assert!(registry.property(&second, "x2").is_some());
	}
}
