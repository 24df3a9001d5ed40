//! Dump helpers for IR graph inspection and testing.
//!
//! One line per node, in arena insertion order, suitable for snapshot tests
//! and debugging.

use std::fmt::Write;

use indexmap::IndexSet;

use crate::graph::IrGraph;
use crate::ids::NodeId;
use crate::node::IrKind;

/// Printer for `IrGraph`.
pub struct GraphPrinter<'a> {
    graph: &'a IrGraph,
}

impl<'a> GraphPrinter<'a> {
    pub fn new(graph: &'a IrGraph) -> Self {
        Self { graph }
    }

    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    fn format(&self, w: &mut String) -> std::fmt::Result {
        for node in self.graph.iter() {
            write!(w, "{}: ", node.id)?;
            match &node.kind {
                IrKind::Root => write!(w, "Root")?,
                IrKind::Map(t) => write!(w, "Map({t:?})")?,
                IrKind::FlatMap(t) => write!(w, "FlatMap({t:?})")?,
                IrKind::Filter(t) => write!(w, "Filter({t:?})")?,
                IrKind::FilterNonNull => write!(w, "FilterNonNull")?,
                IrKind::FilterType(kinds) => {
                    let names: Vec<String> = kinds.iter().map(|k| k.to_string()).collect();
                    write!(w, "FilterType{{{}}}", names.join(", "))?;
                }
                IrKind::Aggregate(t) => write!(w, "Aggregate({t:?})")?,
                IrKind::AggregateDrop(t) => write!(w, "AggregateDrop({t:?})")?,
                IrKind::Combine(t) => write!(w, "Combine({t:?})")?,
                IrKind::CombineDrop(t) => write!(w, "CombineDrop({t:?})")?,
                IrKind::Consumer(_) => write!(w, "Consumer")?,
                IrKind::Union => write!(w, "Union")?,
                IrKind::Scope { scope, unscopes } => {
                    write!(w, "Scope({scope}) ⇄ {}", fmt_set(unscopes))?;
                }
                IrKind::Unscope { scope_starts } => {
                    write!(w, "Unscope ⇄ {}", fmt_set(scope_starts))?;
                }
            }
            if !node.parents.is_empty() {
                let parents: Vec<String> = node.parents.iter().map(|p| p.to_string()).collect();
                write!(w, " ← {}", parents.join(", "))?;
            }
            if node.terminal {
                write!(w, " [sink]")?;
            }
            writeln!(w)?;
        }
        Ok(())
    }
}

fn fmt_set(set: &IndexSet<NodeId>) -> String {
    if set.is_empty() {
        return "∅".to_string();
    }
    let items: Vec<String> = set.iter().map(|n| n.to_string()).collect();
    format!("{{{}}}", items.join(", "))
}

impl IrGraph {
    /// Formatted dump of the whole graph.
    pub fn dump(&self) -> String {
        GraphPrinter::new(self).dump()
    }
}
