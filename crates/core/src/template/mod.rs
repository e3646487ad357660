// Copyright (c) ledm.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Declaration-only templates.
//!
//! A template is pure metadata: an ordered table of members, each
//! carrying a remap (defaulting to identity) and a classification of
//! what the member resolves to. Templates are built once, shared as
//! `Arc`, and never instantiated; resolution consults the table with
//! ordinary lookups, no reflection anywhere.
//!
//! ```
//! use ledm_core::{Expr, Lambda, Template};
//!
//! let jet = Template::builder("jet")
//! 	.terminal("px", Lambda::new("j", Expr::param("j").field("jet_px")))
//! 	.build();
//! let event = Template::builder("event")
//! 	.sequence("jets", Lambda::identity(), jet.clone())
//! 	.build();
//! # assert!(event.member("jets").is_some());
//! ```

use std::sync::Arc;

use indexmap::IndexMap;

use crate::{behavior::BehaviorDecl, expr::Lambda};

/// What a member resolves to: a leaf column, a nested single object, or
/// a nested collection of objects.
#[derive(Clone, Debug)]
pub enum MemberKind {
	Terminal,
	Object(Arc<Template>),
	Sequence(Arc<Template>),
}

#[derive(Clone, Debug)]
pub struct Member {
	name: String,
	remap: Lambda,
	kind: MemberKind,
}

impl Member {
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn remap(&self) -> &Lambda {
		&self.remap
	}

	pub fn kind(&self) -> &MemberKind {
		&self.kind
	}
}

/// A logical record type declaration.
#[derive(Clone, Debug)]
pub struct Template {
	name: String,
	members: IndexMap<String, Member>,
	behaviors: Vec<BehaviorDecl>,
}

impl Template {
	pub fn builder(name: impl Into<String>) -> TemplateBuilder {
		TemplateBuilder {
			name: name.into(),
			members: IndexMap::new(),
			behaviors: Vec::new(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn member(&self, name: &str) -> Option<&Member> {
		self.members.get(name)
	}

	pub fn members(&self) -> impl Iterator<Item = &Member> {
		self.members.values()
	}

	pub fn member_count(&self) -> usize {
		self.members.len()
	}

	pub fn behaviors(&self) -> &[BehaviorDecl] {
		&self.behaviors
	}
}

pub struct TemplateBuilder {
	name: String,
	members: IndexMap<String, Member>,
	behaviors: Vec<BehaviorDecl>,
}

impl TemplateBuilder {
	/// Declares a leaf member. Also the right declaration for a member
	/// with no return classification at all: both resolve to the mapped
	/// expression directly.
	pub fn terminal(self, name: impl Into<String>, remap: Lambda) -> Self {
		self.member(name, remap, MemberKind::Terminal)
	}

	/// Declares a member resolving to a single nested object.
	pub fn object(self, name: impl Into<String>, remap: Lambda, template: Arc<Template>) -> Self {
		self.member(name, remap, MemberKind::Object(template))
	}

	/// Declares a member resolving to a collection of nested objects;
	/// everything accessed beneath it is applied element-wise.
	pub fn sequence(self, name: impl Into<String>, remap: Lambda, template: Arc<Template>) -> Self {
		self.member(name, remap, MemberKind::Sequence(template))
	}

	pub fn behavior(mut self, decl: BehaviorDecl) -> Self {
		self.behaviors.push(decl);
		self
	}

	fn member(mut self, name: impl Into<String>, remap: Lambda, kind: MemberKind) -> Self {
		let name = name.into();
		debug_assert!(!self.members.contains_key(&name), "duplicate member declaration");
		self.members.insert(
			name.clone(),
			Member {
				name,
				remap,
				kind,
			},
		);
		self
	}

	pub fn build(self) -> Arc<Template> {
		Arc::new(Template {
			name: self.name,
			members: self.members,
			behaviors: self.behaviors,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::expr::Expr;

	#[test]
	fn test_member_table_preserves_declaration_order() {
		let t = Template::builder("jet")
			.terminal("px", Lambda::new("j", Expr::param("j").field("jet_px")))
			.terminal("py", Lambda::new("j", Expr::param("j").field("jet_py")))
			.build();
		let names: Vec<_> = t.members().map(|m| m.name().to_string()).collect();
		assert_eq!(names, vec!["px", "py"]);
	}

	#[test]
	fn test_lookup_by_name() {
		let t = Template::builder("jet").terminal("px", Lambda::identity()).build();
		assert!(t.member("px").is_some());
		assert!(t.member("pz").is_none());
	}

	#[test]
	fn test_nested_template_reference() {
		let jet = Template::builder("jet").terminal("px", Lambda::identity()).build();
		let event = Template::builder("event").sequence("jets", Lambda::identity(), jet.clone()).build();
		match event.member("jets").unwrap().kind() {
			MemberKind::Sequence(t) => assert_eq!(t.name(), "jet"),
			other => panic!("expected sequence member, got {other:?}"),
		}
	}
}
