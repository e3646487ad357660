// Copyright (c) ledm.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use thiserror::Error;

/// Error taxonomy shared by every layer.
///
/// All variants are raised synchronously at the point of detection and
/// propagate unchanged through a resolution chain; nothing in the core
/// retries or translates them.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
	#[error("attribute not found: '{name}'")]
	AttributeNotFound {
		name: String,
	},

	#[error("unsupported operation: {operation}")]
	UnsupportedOperation {
		operation: String,
	},

	#[error("invalid operation: {operation}")]
	InvalidOperation {
		operation: String,
	},

	#[error("unknown behavior: '{name}'")]
	UnknownBehavior {
		name: String,
	},

	#[error("behavior '{existing}' already bound, cannot rebind to '{requested}'")]
	BehaviorAlreadyBound {
		existing: String,
		requested: String,
	},

	#[error("type mismatch: expected {expected}, found {found}")]
	TypeMismatch {
		expected: String,
		found: String,
	},

	#[error("shape mismatch: {left} vs {right}")]
	ShapeMismatch {
		left: String,
		right: String,
	},

	#[error("execution failed: {message}")]
	Execution {
		message: String,
	},
}

pub type Result<T> = std::result::Result<T, Error>;
