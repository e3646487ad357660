// Copyright (c) ledm.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Record assembly.
//!
//! Materializing a bound layer forces as little as possible: exactly one
//! member is materialized eagerly, purely to learn the row count; every
//! other member becomes a length-annotated deferred array over its own
//! generator, independently computable and never forced as a group.

use indexmap::IndexMap;
use ledm_core::{Array, ExpressionLayer, Result};
use tracing::debug;

use crate::bound::{Bound, Multiplicity};

pub(crate) fn record<L: ExpressionLayer, M: Multiplicity>(bound: &Bound<L, M>) -> Result<Array> {
	let template = bound.template().clone();
	let behavior = bound.behaviors().resolve_for(&template)?;

	// A template with no declared members describes the underlying data
	// as-is; it still carries its behaviors.
	if template.member_count() == 0 {
		let array = bound.node().as_columnar()?;
		return match &behavior {
			Some(name) => array.tag_if_untagged(name),
			None => Ok(array),
		};
	}

	let mut fields = IndexMap::new();
	let mut rows = 0usize;
	for (index, member) in template.members().enumerate() {
		let name = member.name().to_string();
		let resolved = bound.get(&name)?;
		if index == 0 {
			let array = resolved.as_columnar()?;
			rows = array.len()?;
			fields.insert(name, array);
		} else {
			fields.insert(name, Array::deferred(rows, move || resolved.as_columnar()));
		}
	}

	debug!(template = %template.name(), fields = fields.len(), rows, "assembled record");
	let array = Array::record(fields, rows);
	match &behavior {
		Some(name) => array.tag_if_untagged(name),
		None => Ok(array),
	}
}
