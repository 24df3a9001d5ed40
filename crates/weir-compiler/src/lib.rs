#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Translation backend for weir query graphs.
//!
//! Walks a `weir_ir::IrGraph` in dependency order and produces one executable
//! node per IR node, resolving each transform either inline or through the
//! shared `FunctionRegistry`:
//!
//! ```text
//! IrGraph → [Transformation passes] → Translator → Executable
//! ```
//!
//! - `exec` - the immutable executable graph model
//! - `registry` - shared resolution of named transforms
//! - `translate` - walk order, build context, and per-variant dispatch
//! - `dump` - executable-graph printer for inspection and snapshot tests

mod dump;
mod exec;
mod registry;
mod translate;


pub use dump::ExecPrinter;
pub use exec::{ExecGraph, ExecId, ExecNode, ExecOp, Executable};
pub use registry::FunctionRegistry;
pub use translate::{BuildCtx, Transformation, Translator, topo_order, translate};

use weir_ir::NodeId;

/// Errors raised while lowering an IR graph.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    /// An input's translation was requested before it was produced: the
    /// driving walk violated the children-first contract.
    #[error("{0} has not been translated yet (walk order violated)")]
    InputNotTranslated(NodeId),

    /// No translation order exists because the parent edges form a cycle.
    #[error("dependency cycle through {0}")]
    Cycle(NodeId),

    /// The walk finished without ever translating a root node.
    #[error("no root node found")]
    MissingRoot,

    /// A named transform is absent from the function registry.
    #[error("unknown function `{0}`")]
    UnknownFunction(String),

    #[error(transparent)]
    Graph(#[from] weir_ir::GraphError),
}

/// Result type for translation.
pub type Result<T> = std::result::Result<T, TranslateError>;
