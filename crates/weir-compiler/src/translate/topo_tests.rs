//! Tests for the dependency ordering utility.

use std::sync::Arc;

use weir_ir::{GraphError, IdGen, IrGraph, NodeId, Sink, Transform};

use crate::TranslateError;
use crate::translate::topo_order;

fn graph() -> IrGraph {
    IrGraph::new(Arc::new(IdGen::new()))
}

fn identity(id: u64) -> Transform {
    Transform::lambda(id, |batch| batch.to_vec())
}

fn position(order: &[NodeId], id: NodeId) -> usize {
    order.iter().position(|n| *n == id).expect("node in order")
}

#[test]
fn parents_precede_consumers() {
    let mut g = graph();
    let root = g.add_root();
    let left = g.add_map(root, identity(0)).unwrap();
    let right = g.add_map(root, identity(1)).unwrap();
    let combine = g.add_combine(left, right, identity(2)).unwrap();
    let consumer = g.add_consumer(combine, Sink::new(|_| {})).unwrap();

    let order = topo_order(&g).unwrap();

    assert_eq!(order.len(), 5);
    for node in g.iter() {
        for parent in &node.parents {
            assert!(
                position(&order, *parent) < position(&order, node.id),
                "{parent} must precede {}",
                node.id
            );
        }
    }
    assert!(position(&order, root) < position(&order, consumer));
}

#[test]
fn chain_order_is_insertion_order() {
    let mut g = graph();
    let root = g.add_root();
    let map = g.add_map(root, identity(0)).unwrap();
    let consumer = g.add_consumer(map, Sink::new(|_| {})).unwrap();

    let order = topo_order(&g).unwrap();
    assert_eq!(order, vec![root, map, consumer]);
}

#[test]
fn missing_parent_is_reported() {
    let mut g = graph();
    let root = g.add_root();
    let map = g.add_map(root, identity(0)).unwrap();
    g.add_consumer(map, Sink::new(|_| {})).unwrap();

    // A careless rewrite: the node leaves, its consumer's edge does not.
    g.remove_node(map).unwrap();

    let err = topo_order(&g).unwrap_err();
    assert!(matches!(
        err,
        TranslateError::Graph(GraphError::UnknownNode(id)) if id == map
    ));
}

#[test]
fn empty_graph_orders_to_nothing() {
    let g = graph();
    assert!(topo_order(&g).unwrap().is_empty());
}
