//! Shared function registry for named transforms.
//!
//! Multiple IR nodes across one or many graphs may declare the same named
//! function; within one build they all resolve to a single executable
//! instance. The per-build memo lives on the build context, which keeps
//! resolution pure with respect to a build.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use weir_ir::{BatchFn, IrNode, Value};

use crate::translate::BuildCtx;
use crate::{Result, TranslateError};

type FnBuilder = Box<dyn Fn(&IrNode) -> Arc<BatchFn> + Send + Sync>;

/// Name → builder table for registry-resolved transforms.
#[derive(Default)]
pub struct FunctionRegistry {
    builders: IndexMap<String, FnBuilder>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a builder invoked on first resolution within a build.
    ///
    /// The builder receives the IR node that triggered resolution, so it can
    /// specialize on the declaring site if it needs to.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        builder: impl Fn(&IrNode) -> Arc<BatchFn> + Send + Sync + 'static,
    ) {
        self.builders.insert(name.into(), Box::new(builder));
    }

    /// Register a fixed function under a name.
    pub fn register_fn(
        &mut self,
        name: impl Into<String>,
        f: impl Fn(&[Value]) -> Vec<Value> + Send + Sync + 'static,
    ) {
        let shared: Arc<BatchFn> = Arc::new(f);
        self.register(name, move |_| Arc::clone(&shared));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.builders.contains_key(name)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.builders.keys().map(String::as_str)
    }

    /// Resolve a named transform to its per-build executable instance,
    /// building and caching on first use.
    pub(crate) fn resolve(
        &self,
        ctx: &mut BuildCtx,
        node: &IrNode,
        name: &str,
    ) -> Result<Arc<BatchFn>> {
        if let Some(f) = ctx.cached_fn(name) {
            return Ok(f);
        }
        let builder = self
            .builders
            .get(name)
            .ok_or_else(|| TranslateError::UnknownFunction(name.to_string()))?;
        let f = builder(node);
        ctx.cache_fn(name, Arc::clone(&f));
        Ok(f)
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("names", &self.builders.keys().collect::<Vec<_>>())
            .finish()
    }
}
