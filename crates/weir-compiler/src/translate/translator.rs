//! Rewrite-pass plumbing and per-variant translation dispatch.

use std::sync::Arc;

use indexmap::IndexSet;
use weir_ir::{BatchFn, IrGraph, IrKind, IrNode, NodeId, ScopeId, Transform, TranslationTable};

use crate::Result;
use crate::exec::{ExecId, ExecOp, Executable};
use crate::registry::FunctionRegistry;
use crate::translate::{BuildCtx, topo_order};

/// An IR rewrite pass applied before translation.
///
/// Passes are opaque to the builder; each returns the substitution table for
/// any nodes it replaced, so scope cross-links can be redirected afterwards.
pub trait Transformation {
    fn apply(&self, graph: &mut IrGraph) -> TranslationTable;
}

/// Lowers an IR graph into an executable graph.
pub struct Translator {
    passes: Vec<Box<dyn Transformation>>,
}

impl Translator {
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    /// Append a rewrite pass; passes run in insertion order.
    pub fn with_pass(mut self, pass: Box<dyn Transformation>) -> Self {
        self.passes.push(pass);
        self
    }

    /// Translate the whole graph.
    ///
    /// Runs the rewrite passes, redirects scope cross-links through each
    /// pass's substitution table, then walks the graph parents-first and
    /// produces exactly one executable node per IR node.
    pub fn translate(
        &self,
        graph: &mut IrGraph,
        registry: &FunctionRegistry,
    ) -> Result<Executable> {
        for pass in &self.passes {
            let table = pass.apply(graph);
            if table.is_empty() {
                continue;
            }
            for id in graph.node_ids() {
                graph.apply_translation(id, &table)?;
            }
        }

        let mut ctx = BuildCtx::new();
        for id in topo_order(graph)? {
            self.translate_node(&mut ctx, graph, id, registry)?;
        }
        ctx.finish()
    }

    /// Produce the executable node for one IR node.
    fn translate_node(
        &self,
        ctx: &mut BuildCtx,
        graph: &IrGraph,
        id: NodeId,
        registry: &FunctionRegistry,
    ) -> Result<ExecId> {
        let node = graph.node(id)?;
        let mut inputs = Vec::with_capacity(node.parents.len());
        for p in &node.parents {
            inputs.push(ctx.translated(*p)?);
        }

        let op = match &node.kind {
            IrKind::Root => ExecOp::Source,
            IrKind::Map(t) => ExecOp::Map(self.resolve_transform(ctx, node, t, registry)?),
            IrKind::FlatMap(t) => {
                ExecOp::FlatMap(self.resolve_transform(ctx, node, t, registry)?)
            }
            IrKind::Filter(t) => ExecOp::Filter(self.resolve_transform(ctx, node, t, registry)?),
            IrKind::FilterNonNull => ExecOp::DropNull,
            IrKind::FilterType(kinds) => ExecOp::KeepKinds(kinds.clone()),
            IrKind::Aggregate(t) => {
                ExecOp::Aggregate(self.resolve_transform(ctx, node, t, registry)?)
            }
            IrKind::AggregateDrop(t) => {
                ExecOp::AggregateDrop(self.resolve_transform(ctx, node, t, registry)?)
            }
            IrKind::Combine(t) => ExecOp::Combine(self.resolve_transform(ctx, node, t, registry)?),
            IrKind::CombineDrop(t) => {
                ExecOp::CombineDrop(self.resolve_transform(ctx, node, t, registry)?)
            }
            IrKind::Consumer(sink) => ExecOp::Sink(sink.clone()),
            IrKind::Union => ExecOp::Union {
                arity: node.parents.len(),
            },
            IrKind::Scope { scope, .. } => ExecOp::ScopeOpen(*scope),
            IrKind::Unscope { scope_starts } => {
                // Scope ids, not node identities: copies of one scope collapse.
                let mut scopes: IndexSet<ScopeId> = IndexSet::new();
                for s in scope_starts {
                    scopes.insert(graph.scope_id(*s)?);
                }
                ExecOp::ScopeClose(scopes)
            }
        };

        let exec_id = ctx.record(node.id, inputs, op);
        if node.is_root() {
            ctx.note_root(node.id);
        }
        Ok(exec_id)
    }

    /// The one place inline and registry transforms diverge.
    fn resolve_transform(
        &self,
        ctx: &mut BuildCtx,
        node: &IrNode,
        transform: &Transform,
        registry: &FunctionRegistry,
    ) -> Result<Arc<BatchFn>> {
        match transform {
            Transform::Lambda(l) => Ok(l.func()),
            Transform::Named(name) => registry.resolve(ctx, node, name),
        }
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new()
    }
}

/// Translate with no rewrite passes.
pub fn translate(graph: &mut IrGraph, registry: &FunctionRegistry) -> Result<Executable> {
    Translator::new().translate(graph, registry)
}
