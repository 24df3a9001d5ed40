//! Per-build accumulator mapping IR nodes to their executable forms.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use weir_ir::{BatchFn, NodeId};

use crate::exec::{ExecGraph, ExecId, ExecOp, Executable};
use crate::{Result, TranslateError};

/// Build state: the executable graph under construction, the id translation
/// map (populated monotonically by the walk), the first root seen, and the
/// per-build function memo.
///
/// Created fresh per build and consumed by `finish` — a finished context
/// cannot accumulate further, which is what makes the executable immutable.
pub struct BuildCtx {
    exec: ExecGraph,
    translated: IndexMap<NodeId, ExecId>,
    root: Option<NodeId>,
    functions: IndexMap<String, Arc<BatchFn>>,
}

impl BuildCtx {
    pub fn new() -> Self {
        Self {
            exec: ExecGraph::new(),
            translated: IndexMap::new(),
            root: None,
            functions: IndexMap::new(),
        }
    }

    /// Executable id of an already-translated node.
    ///
    /// An error here means the driving walk broke the children-first
    /// contract; the build cannot recover.
    pub fn translated(&self, id: NodeId) -> Result<ExecId> {
        self.translated
            .get(&id)
            .copied()
            .ok_or(TranslateError::InputNotTranslated(id))
    }

    pub fn is_translated(&self, id: NodeId) -> bool {
        self.translated.contains_key(&id)
    }

    /// Number of translated nodes so far.
    pub fn len(&self) -> usize {
        self.translated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.translated.is_empty()
    }

    /// First root recorded by the walk, if any.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Record the executable node translated from `id`.
    pub(crate) fn record(&mut self, id: NodeId, inputs: Vec<ExecId>, op: ExecOp) -> ExecId {
        let exec_id = self.exec.add(inputs, op);
        self.translated.insert(id, exec_id);
        exec_id
    }

    /// Remember the first root encountered; later roots are ignored.
    pub(crate) fn note_root(&mut self, id: NodeId) {
        if self.root.is_none() {
            self.root = Some(id);
        }
    }

    pub(crate) fn cached_fn(&self, name: &str) -> Option<Arc<BatchFn>> {
        self.functions.get(name).cloned()
    }

    pub(crate) fn cache_fn(&mut self, name: &str, f: Arc<BatchFn>) {
        self.functions.insert(name.to_string(), f);
    }

    /// Finalize into the runnable graph wrapping the translated root.
    ///
    /// Fails if the walk never recorded a root.
    pub fn finish(self) -> Result<Executable> {
        let root_ir = self.root.ok_or(TranslateError::MissingRoot)?;
        let root = self.translated(root_ir)?;
        Ok(Executable::new(self.exec, root))
    }
}

impl Default for BuildCtx {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BuildCtx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildCtx")
            .field("translated", &self.translated)
            .field("root", &self.root)
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
