//! Dynamic element model for streamed query data.
//!
//! Transforms are erased to one function shape over batches of `Value`s so
//! the translation backend can treat every transforming variant uniformly.

use std::fmt;

/// Shape of every compiled element function: a batch of elements in, a batch
/// out. Map emits one element per input, flat-map several, filter zero or
/// one, aggregate one per batch, combine one per pair.
pub type BatchFn = dyn Fn(&[Value]) -> Vec<Value> + Send + Sync;

/// Terminal sink: observes batches, produces nothing.
pub type SinkFn = dyn Fn(&[Value]) + Send + Sync;

/// A streamed element.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
}

impl Value {
    /// Runtime category of this element.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Text(_) => ValueKind::Text,
            Value::List(_) => ValueKind::List,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// Runtime category used by type-filter nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    Text,
    List,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "Null",
            ValueKind::Bool => "Bool",
            ValueKind::Int => "Int",
            ValueKind::Float => "Float",
            ValueKind::Text => "Text",
            ValueKind::List => "List",
        };
        f.write_str(name)
    }
}
