//! Executable graph produced by translation.
//!
//! Nodes are stored in a flat vector and referenced by `ExecId`. `inputs`
//! point upstream; `outputs` accumulate as downstream nodes are recorded, so
//! a finished graph can be walked from the root toward its sinks. Once
//! wrapped in an `Executable` the graph is structurally immutable.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexSet;
use weir_ir::{BatchFn, ScopeId, Sink, ValueKind};

/// Index into `ExecGraph::nodes`.
pub type ExecId = u32;

/// A concrete processing node.
#[derive(Debug, Clone)]
pub struct ExecNode {
    /// Upstream nodes this one reads from, in wiring order.
    pub inputs: Vec<ExecId>,
    /// Downstream nodes reading from this one.
    pub outputs: Vec<ExecId>,
    pub op: ExecOp,
}

/// Operation performed by an executable node.
#[derive(Clone)]
pub enum ExecOp {
    /// Entry point; input batches arrive here.
    Source,
    Map(Arc<BatchFn>),
    FlatMap(Arc<BatchFn>),
    Filter(Arc<BatchFn>),
    /// Drop null-valued elements.
    DropNull,
    /// Keep elements whose runtime category is in the set.
    KeepKinds(IndexSet<ValueKind>),
    Aggregate(Arc<BatchFn>),
    AggregateDrop(Arc<BatchFn>),
    Combine(Arc<BatchFn>),
    CombineDrop(Arc<BatchFn>),
    /// Terminal sink.
    Sink(Sink),
    /// Merge `arity` upstream branches.
    Union { arity: usize },
    /// Opens the scope.
    ScopeOpen(ScopeId),
    /// Closes the scopes, by scope id, deduplicated.
    ScopeClose(IndexSet<ScopeId>),
}

impl fmt::Debug for ExecOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecOp::Source => f.write_str("Source"),
            ExecOp::Map(_) => f.write_str("Map"),
            ExecOp::FlatMap(_) => f.write_str("FlatMap"),
            ExecOp::Filter(_) => f.write_str("Filter"),
            ExecOp::DropNull => f.write_str("DropNull"),
            ExecOp::KeepKinds(kinds) => {
                let items: Vec<String> = kinds.iter().map(|k| k.to_string()).collect();
                write!(f, "KeepKinds{{{}}}", items.join(", "))
            }
            ExecOp::Aggregate(_) => f.write_str("Aggregate"),
            ExecOp::AggregateDrop(_) => f.write_str("AggregateDrop"),
            ExecOp::Combine(_) => f.write_str("Combine"),
            ExecOp::CombineDrop(_) => f.write_str("CombineDrop"),
            ExecOp::Sink(_) => f.write_str("Sink"),
            ExecOp::Union { arity } => write!(f, "Union({arity})"),
            ExecOp::ScopeOpen(scope) => write!(f, "ScopeOpen({scope})"),
            ExecOp::ScopeClose(scopes) => {
                let items: Vec<String> = scopes.iter().map(|s| s.to_string()).collect();
                write!(f, "ScopeClose{{{}}}", items.join(", "))
            }
        }
    }
}

/// Node store filled during translation and frozen into an `Executable`.
#[derive(Debug, Default)]
pub struct ExecGraph {
    nodes: Vec<ExecNode>,
}

impl ExecGraph {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Add a node, wiring it into its inputs' output lists.
    pub(crate) fn add(&mut self, inputs: Vec<ExecId>, op: ExecOp) -> ExecId {
        let id = self.nodes.len() as ExecId;
        for input in &inputs {
            self.nodes[*input as usize].outputs.push(id);
        }
        self.nodes.push(ExecNode {
            inputs,
            outputs: Vec::new(),
            op,
        });
        id
    }

    pub fn node(&self, id: ExecId) -> &ExecNode {
        &self.nodes[id as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all nodes with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (ExecId, &ExecNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (i as ExecId, n))
    }
}

/// A finalized executable graph, rooted at the translated root node.
///
/// Structurally immutable; safe to share read-only across concurrent
/// executions of the downstream runtime.
#[derive(Debug)]
pub struct Executable {
    graph: ExecGraph,
    root: ExecId,
}

impl Executable {
    pub(crate) fn new(graph: ExecGraph, root: ExecId) -> Self {
        Self { graph, root }
    }

    /// Entry node id.
    pub fn root(&self) -> ExecId {
        self.root
    }

    /// Entry node, where input batches are fed.
    pub fn entry(&self) -> &ExecNode {
        self.graph.node(self.root)
    }

    pub fn graph(&self) -> &ExecGraph {
        &self.graph
    }
}
