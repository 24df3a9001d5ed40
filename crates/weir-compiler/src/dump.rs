//! Dump helpers for executable-graph inspection and testing.

use std::fmt::Write;

use crate::exec::Executable;

/// Printer for `Executable`: one line per node plus the root marker.
pub struct ExecPrinter<'a> {
    exec: &'a Executable,
}

impl<'a> ExecPrinter<'a> {
    pub fn new(exec: &'a Executable) -> Self {
        Self { exec }
    }

    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    fn format(&self, w: &mut String) -> std::fmt::Result {
        for (id, node) in self.exec.graph().iter() {
            write!(w, "E{id}: {:?}", node.op)?;
            if !node.outputs.is_empty() {
                let outs: Vec<String> = node.outputs.iter().map(|o| format!("E{o}")).collect();
                write!(w, " → {}", outs.join(", "))?;
            }
            writeln!(w)?;
        }
        writeln!(w, "root: E{}", self.exec.root())?;
        Ok(())
    }
}

impl Executable {
    /// Formatted dump of the whole executable graph.
    pub fn dump(&self) -> String {
        ExecPrinter::new(self).dump()
    }
}
