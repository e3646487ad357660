// Copyright (c) ledm.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Remote-query backend.
//!
//! A pipeline is a not-yet-executed query: a projection IR expression
//! rooted at `source` plus a handle to the executor that will run it.
//! Composition is entirely synchronous and symbolic; the single
//! asynchronous boundary is crossed when a node is materialized.
//!
//! ```text
//! scan source | select(source, lambda e: e.met_first()) | execute
//! ```

mod executor;
mod layer;
mod pipeline;
pub mod runtime;

pub use executor::{Executed, LocalExecutor, QueryExecutor};
pub use layer::QueryLayer;
pub use pipeline::Pipeline;
