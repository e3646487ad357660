// Copyright (c) ledm.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Core of the layered event data model.
//!
//! Client code declares logical record types ([`Template`]) whose
//! members carry projection-IR remaps; a backend implementing
//! [`ExpressionLayer`] turns those declarations into operations on an
//! underlying representation. This crate holds the contract, the
//! columnar value model and backend, the template metadata, and the
//! behavior registry; the query backend and the resolution engine build
//! on it.

pub mod behavior;
pub mod error;
pub mod expr;
pub mod layer;
pub mod template;
pub mod value;

pub use behavior::{Behavior, BehaviorDecl, BehaviorRef, BehaviorRegistry};
pub use error::{Error, Result};
pub use expr::{BinaryOp, Expr, Lambda, Scalar};
pub use layer::{ColumnarLayer, ExpressionLayer};
pub use template::{Member, MemberKind, Template, TemplateBuilder};
pub use value::{Array, ArrayData};
