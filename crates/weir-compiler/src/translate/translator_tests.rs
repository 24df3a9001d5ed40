//! Tests for whole-graph translation.

use std::sync::Arc;

use indexmap::IndexSet;
use weir_ir::{
    BatchFn, IdGen, IrGraph, NodeId, Sink, Transform, TranslationTable, Value, ValueKind,
};

use crate::TranslateError;
use crate::exec::ExecOp;
use crate::registry::FunctionRegistry;
use crate::translate::{Transformation, Translator, translate};

fn graph() -> IrGraph {
    IrGraph::new(Arc::new(IdGen::new()))
}

fn identity(id: u64) -> Transform {
    Transform::lambda(id, |batch| batch.to_vec())
}

fn empty_registry() -> FunctionRegistry {
    FunctionRegistry::new()
}

fn find_close(exe: &crate::Executable) -> IndexSet<weir_ir::ScopeId> {
    exe.graph()
        .iter()
        .find_map(|(_, n)| match &n.op {
            ExecOp::ScopeClose(scopes) => Some(scopes.clone()),
            _ => None,
        })
        .expect("a ScopeClose node")
}

#[test]
fn chain_translates_to_wrapped_children() {
    let mut g = graph();
    let root = g.add_root();
    let map = g.add_map(root, identity(0)).unwrap();
    g.add_consumer(map, Sink::new(|_| {})).unwrap();

    let exe = translate(&mut g, &empty_registry()).unwrap();

    assert_eq!(exe.graph().len(), 3);
    assert!(matches!(exe.entry().op, ExecOp::Source));
    assert_eq!(exe.entry().outputs, vec![1]);
    insta::assert_snapshot!(exe.dump(), @r"
    E0: Source → E1
    E1: Map → E2
    E2: Sink
    root: E0
    ");
}

#[test]
fn every_variant_lowers_to_its_op() {
    let mut g = graph();
    let root = g.add_root();
    let fm = g.add_flat_map(root, identity(0)).unwrap();
    let nn = g.add_filter_non_null(fm).unwrap();
    let kinds: IndexSet<ValueKind> = [ValueKind::Int].into_iter().collect();
    let ft = g.add_filter_type(nn, kinds).unwrap();
    let ag = g.add_aggregate(ft, identity(1)).unwrap();
    let agd = g.add_aggregate_drop(ag, identity(2)).unwrap();
    let cd = g.add_combine_drop(ag, agd, identity(3)).unwrap();
    let un = g.add_union(vec![cd]).unwrap();
    g.add_consumer(un, Sink::new(|_| {})).unwrap();

    let exe = translate(&mut g, &empty_registry()).unwrap();

    insta::assert_snapshot!(exe.dump(), @r"
    E0: Source → E1
    E1: FlatMap → E2
    E2: DropNull → E3
    E3: KeepKinds{Int} → E4
    E4: Aggregate → E5, E6
    E5: AggregateDrop → E6
    E6: CombineDrop → E7
    E7: Union(1) → E8
    E8: Sink
    root: E0
    ");
}

#[test]
fn scopes_survive_translation_and_close_by_scope_id() {
    let mut g = graph();
    let root = g.add_root();
    let sid = g.ids().next_scope();
    let scope = g.add_scope(root, sid).unwrap();
    let map = g.add_map(scope, identity(0)).unwrap();
    let unscope = g.add_unscope(map, IndexSet::from([scope])).unwrap();

    let exe = translate(&mut g, &empty_registry()).unwrap();

    // Translation leaves the IR pairing untouched.
    assert_eq!(*g.scope_unscopes(scope).unwrap(), IndexSet::from([unscope]));
    assert_eq!(*g.unscope_starts(unscope).unwrap(), IndexSet::from([scope]));
    assert!(g.pairing_consistent());

    assert_eq!(find_close(&exe), IndexSet::from([sid]));
    assert!(
        exe.graph()
            .iter()
            .any(|(_, n)| matches!(&n.op, ExecOp::ScopeOpen(s) if *s == sid))
    );
}

#[test]
fn scope_copies_collapse_to_one_scope_id() {
    let mut g = graph();
    let root = g.add_root();
    let sid = g.ids().next_scope();
    let scope = g.add_scope(root, sid).unwrap();
    let dup = g.copy_scope(scope).unwrap();
    let map = g.add_map(scope, identity(0)).unwrap();
    g.add_unscope(map, IndexSet::from([scope, dup])).unwrap();

    let exe = translate(&mut g, &empty_registry()).unwrap();

    let close = find_close(&exe);
    assert_eq!(close, IndexSet::from([sid]));
    assert_eq!(close.len(), 1);
}

#[test]
fn shared_upstream_translates_once() {
    let mut g = graph();
    let root = g.add_root();
    let shared = g.add_map(root, identity(0)).unwrap();
    let left = g.add_filter(shared, identity(1)).unwrap();
    let right = g.add_filter(shared, identity(2)).unwrap();
    let combine = g.add_combine(left, right, identity(3)).unwrap();
    g.add_consumer(combine, Sink::new(|_| {})).unwrap();

    let exe = translate(&mut g, &empty_registry()).unwrap();

    assert_eq!(exe.graph().len(), 6);
    let maps: Vec<_> = exe
        .graph()
        .iter()
        .filter(|(_, n)| matches!(n.op, ExecOp::Map(_)))
        .map(|(id, _)| id)
        .collect();
    assert_eq!(maps.len(), 1);
    let shared_exec = maps[0];

    let filters: Vec<_> = exe
        .graph()
        .iter()
        .filter(|(_, n)| matches!(n.op, ExecOp::Filter(_)))
        .collect();
    assert_eq!(filters.len(), 2);
    for (_, f) in &filters {
        assert_eq!(f.inputs, vec![shared_exec]);
    }
    assert_eq!(exe.graph().node(shared_exec).outputs.len(), 2);
}

#[test]
fn named_functions_share_one_instance_per_build() {
    let mut registry = FunctionRegistry::new();
    registry.register("normalize", |_| {
        let f: Arc<BatchFn> = Arc::new(|batch: &[Value]| batch.to_vec());
        f
    });

    let mut g = graph();
    let root = g.add_root();
    let m1 = g.add_map(root, Transform::named("normalize")).unwrap();
    g.add_map(m1, Transform::named("normalize")).unwrap();

    let exe = translate(&mut g, &registry).unwrap();
    let fns: Vec<Arc<BatchFn>> = exe
        .graph()
        .iter()
        .filter_map(|(_, n)| match &n.op {
            ExecOp::Map(f) => Some(Arc::clone(f)),
            _ => None,
        })
        .collect();
    assert_eq!(fns.len(), 2);
    assert!(Arc::ptr_eq(&fns[0], &fns[1]));

    // A second build resolves its own instance.
    let mut g2 = graph();
    let root2 = g2.add_root();
    g2.add_map(root2, Transform::named("normalize")).unwrap();
    let exe2 = translate(&mut g2, &registry).unwrap();
    let f2 = exe2
        .graph()
        .iter()
        .find_map(|(_, n)| match &n.op {
            ExecOp::Map(f) => Some(Arc::clone(f)),
            _ => None,
        })
        .unwrap();
    assert!(!Arc::ptr_eq(&fns[0], &f2));
}

#[test]
fn graph_without_root_fails() {
    let mut g = graph();
    let union = g.add_union(vec![]).unwrap();
    g.add_consumer(union, Sink::new(|_| {})).unwrap();

    let err = translate(&mut g, &empty_registry()).unwrap_err();
    assert!(matches!(err, TranslateError::MissingRoot));
}

#[test]
fn unknown_function_fails() {
    let mut g = graph();
    let root = g.add_root();
    g.add_map(root, Transform::named("nope")).unwrap();

    let err = translate(&mut g, &empty_registry()).unwrap_err();
    assert!(matches!(err, TranslateError::UnknownFunction(name) if name == "nope"));
}

#[test]
fn first_root_becomes_the_entry() {
    let mut g = graph();
    let r1 = g.add_root();
    let r2 = g.add_root();
    let union = g.add_union(vec![r1, r2]).unwrap();
    g.add_consumer(union, Sink::new(|_| {})).unwrap();

    let exe = translate(&mut g, &empty_registry()).unwrap();

    assert_eq!(exe.root(), 0);
    assert!(matches!(exe.entry().op, ExecOp::Source));
    assert!(
        exe.graph()
            .iter()
            .any(|(_, n)| matches!(n.op, ExecOp::Union { arity: 2 }))
    );
}

/// Replaces every scope with a fresh copy, as a deduplicating rewrite would.
struct RefreshScopes;

impl Transformation for RefreshScopes {
    fn apply(&self, graph: &mut IrGraph) -> TranslationTable {
        let mut table = TranslationTable::new();
        let scopes: Vec<NodeId> = graph
            .iter()
            .filter(|n| n.is_scope())
            .map(|n| n.id)
            .collect();
        for scope in scopes {
            let dup = graph.copy_scope(scope).expect("scope exists");
            table.insert(scope, dup);
        }
        table
    }
}

#[test]
fn passes_redirect_cross_links_before_the_walk() {
    let mut g = graph();
    let root = g.add_root();
    let sid = g.ids().next_scope();
    let scope = g.add_scope(root, sid).unwrap();
    let map = g.add_map(scope, identity(0)).unwrap();
    let unscope = g.add_unscope(map, IndexSet::from([scope])).unwrap();

    let translator = Translator::new().with_pass(Box::new(RefreshScopes));
    let exe = translator.translate(&mut g, &empty_registry()).unwrap();

    // The unscope now pairs with the replacement only.
    let starts = g.unscope_starts(unscope).unwrap();
    assert_eq!(starts.len(), 1);
    let replacement = *starts.first().unwrap();
    assert_ne!(replacement, scope);
    assert!(g.scope_unscopes(scope).unwrap().is_empty());
    assert_eq!(
        *g.scope_unscopes(replacement).unwrap(),
        IndexSet::from([unscope])
    );
    assert!(g.pairing_consistent());

    // Original and replacement both translate; the close is by scope id.
    assert_eq!(exe.graph().len(), 5);
    assert_eq!(find_close(&exe), IndexSet::from([sid]));
}

#[test]
fn executable_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<crate::Executable>();
}
