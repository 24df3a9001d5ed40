//! IR node vocabulary.
//!
//! Nodes reference each other by `NodeId` only; `parents` lists data-flow
//! predecessors and never changes after construction. Rewrite passes replace
//! nodes wholesale and redirect cross-links through a `TranslationTable`.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexSet;

use crate::ids::{NodeId, ScopeId};
use crate::value::{BatchFn, SinkFn, Value, ValueKind};

/// How a node declares its operation: an inline function value with its own
/// identity, or a name resolved through the shared function registry at
/// translation time.
#[derive(Clone)]
pub enum Transform {
    Lambda(LambdaFn),
    Named(String),
}

impl Transform {
    /// Inline function with the given identity.
    pub fn lambda(
        id: u64,
        f: impl Fn(&[Value]) -> Vec<Value> + Send + Sync + 'static,
    ) -> Self {
        Transform::Lambda(LambdaFn::new(id, f))
    }

    /// Registry reference by name.
    pub fn named(name: impl Into<String>) -> Self {
        Transform::Named(name.into())
    }
}

impl PartialEq for Transform {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Transform::Lambda(a), Transform::Lambda(b)) => a.id() == b.id(),
            (Transform::Named(a), Transform::Named(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Transform {}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Lambda(l) => write!(f, "λ{}", l.id()),
            Transform::Named(n) => write!(f, "#{n}"),
        }
    }
}

/// An inline function value carrying its own identity.
///
/// Equality and merge decisions use the id; clones share the underlying
/// function instance.
#[derive(Clone)]
pub struct LambdaFn {
    id: u64,
    func: Arc<BatchFn>,
}

impl LambdaFn {
    pub fn new(id: u64, f: impl Fn(&[Value]) -> Vec<Value> + Send + Sync + 'static) -> Self {
        Self {
            id,
            func: Arc::new(f),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Shared handle to the function instance.
    pub fn func(&self) -> Arc<BatchFn> {
        Arc::clone(&self.func)
    }
}

/// Sink carried by consumer nodes.
#[derive(Clone)]
pub struct Sink(Arc<SinkFn>);

impl Sink {
    pub fn new(f: impl Fn(&[Value]) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn func(&self) -> Arc<SinkFn> {
        Arc::clone(&self.0)
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sink")
    }
}

/// A node in the query IR.
#[derive(Debug, Clone)]
pub struct IrNode {
    pub id: NodeId,
    /// Data-flow predecessors, in wiring order.
    pub parents: Vec<NodeId>,
    /// Terminal sinks end the pipeline; only consumers set this.
    pub terminal: bool,
    pub kind: IrKind,
}

impl IrNode {
    /// First data-flow predecessor, for the single-parent variants.
    pub fn parent(&self) -> Option<NodeId> {
        self.parents.first().copied()
    }

    pub fn is_root(&self) -> bool {
        matches!(self.kind, IrKind::Root)
    }

    pub fn is_scope(&self) -> bool {
        matches!(self.kind, IrKind::Scope { .. })
    }

    pub fn is_unscope(&self) -> bool {
        matches!(self.kind, IrKind::Unscope { .. })
    }
}

/// Node variants of the query IR.
#[derive(Debug, Clone)]
pub enum IrKind {
    /// Entry of the graph; input elements arrive here.
    Root,
    /// One element in, one out.
    Map(Transform),
    /// One element in, zero or more out.
    FlatMap(Transform),
    /// Keep elements the predicate admits.
    Filter(Transform),
    /// Drop null-valued elements.
    FilterNonNull,
    /// Keep elements whose runtime category is in the set.
    FilterType(IndexSet<ValueKind>),
    /// Fold a batch into one element.
    Aggregate(Transform),
    /// Fold a batch into one element, dropping the originals.
    AggregateDrop(Transform),
    /// Join two upstream branches pairwise.
    Combine(Transform),
    /// Join two upstream branches pairwise, dropping the originals.
    CombineDrop(Transform),
    /// Terminal sink.
    Consumer(Sink),
    /// Merge any number of upstream branches.
    Union,
    /// Opens a nested evaluation context.
    Scope {
        scope: ScopeId,
        /// Unscope nodes closing this scope. Kept consistent with each
        /// counterpart's `scope_starts` by the lifecycle operations.
        unscopes: IndexSet<NodeId>,
    },
    /// Closes one or more scopes. Non-empty by construction.
    Unscope { scope_starts: IndexSet<NodeId> },
}
