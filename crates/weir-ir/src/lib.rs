#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Query-graph IR for weir.
//!
//! A weir query is a graph of typed nodes describing operations over streamed
//! AST elements: map, filter, aggregate, combine, and scoped grouping. This
//! crate owns the pre-translation side of the pipeline:
//!
//! ```text
//! fluent construction → IrGraph → [rewrite passes] → weir-compiler
//! ```
//!
//! - `ids` - injected allocator for node and scope identities
//! - `value` - dynamic element model and function shapes
//! - `node` - the IR node vocabulary
//! - `graph` - arena storage and typed constructors
//! - `scopes` - scope/unscope pairing lifecycle
//! - `flow` - flow classification queries for diagnostics
//! - `dump` - graph printer for inspection and snapshot tests

mod dump;
mod flow;
mod graph;
mod ids;
mod node;
mod scopes;
mod value;


pub use dump::GraphPrinter;
pub use flow::{FlowClass, FlowMap};
pub use graph::{IrGraph, TranslationTable};
pub use ids::{IdGen, NodeId, ScopeId};
pub use node::{IrKind, IrNode, LambdaFn, Sink, Transform};
pub use scopes::ScopeLinks;
pub use value::{BatchFn, SinkFn, Value, ValueKind};

/// Errors from IR graph construction and lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// An unscope must close at least one scope.
    #[error("unscope must close at least one scope")]
    EmptyUnscope,

    #[error("{0} is not a scope node")]
    NotAScope(NodeId),

    #[error("{0} is not an unscope node")]
    NotAnUnscope(NodeId),

    #[error("{0} is not in the graph")]
    UnknownNode(NodeId),
}

/// Result type for IR graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;
