//! Lowering from IR graph to executable graph.
//!
//! The walk order, the per-build accumulator, and the per-variant dispatch
//! are split into focused modules:
//! - `topo` - dependency ordering utility (the children-first contract)
//! - `context` - per-build accumulator mapping IR nodes to executable nodes
//! - `translator` - rewrite-pass plumbing and per-variant dispatch

mod context;
mod topo;
mod translator;

#[cfg(test)]
mod topo_tests;
#[cfg(test)]
mod translator_tests;

pub use context::BuildCtx;
pub use topo::topo_order;
pub use translator::{Transformation, Translator, translate};
