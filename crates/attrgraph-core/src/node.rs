//! Internal, type-erased node storage.
//!
//! The graph owns an arena of [`NodeSlot`]s indexed by [`NodeId`]. Edges are
//! small value structs living in the producer's own `outgoing` list; the
//! consumer's `incoming` list holds only `(producer, slot)` indices back into
//! that list. This sidesteps the Rc/RefCell cycle a naive node-holds-edges,
//! edge-holds-nodes graph would otherwise need — see the module-level notes
//! in `graph.rs`.

use crate::id::NodeId;
use crate::value::ErasedValue;
use std::rc::Rc;

/// A node's evaluation strategy, fixed at construction.
pub(crate) enum NodeKind {
    Input,
    /// `Rc`, not `Box`: evaluating a rule means calling it while no borrow of
    /// the node arena is held (the rule itself reads other nodes, which
    /// re-enters the graph). Cloning the `Rc` out of the arena for the
    /// duration of the call sidesteps that aliasing conflict.
    Rule(Rc<dyn Fn() -> Box<dyn ErasedValue>>),
}

impl NodeKind {
    pub(crate) fn is_rule(&self) -> bool {
        matches!(self, NodeKind::Rule(_))
    }
}

/// One outgoing dependency edge, owned by the producer.
pub(crate) struct OutEdge {
    pub(crate) to: NodeId,
    pub(crate) pending: bool,
}

/// A back-reference into a producer's `outgoing` list.
pub(crate) struct InEdge {
    pub(crate) from: NodeId,
    pub(crate) slot: usize,
}

pub(crate) struct NodeSlot {
    pub(crate) name: String,
    pub(crate) kind: NodeKind,
    pub(crate) cache: Option<Box<dyn ErasedValue>>,
    pub(crate) potentially_dirty: bool,
    pub(crate) outgoing: Vec<OutEdge>,
    pub(crate) incoming: Vec<InEdge>,
}

impl NodeSlot {
    pub(crate) fn input(name: String, value: Box<dyn ErasedValue>) -> Self {
        Self {
            name,
            kind: NodeKind::Input,
            cache: Some(value),
            potentially_dirty: false,
            outgoing: Vec::new(),
            incoming: Vec::new(),
        }
    }

    pub(crate) fn rule(name: String, f: Rc<dyn Fn() -> Box<dyn ErasedValue>>) -> Self {
        Self {
            name,
            kind: NodeKind::Rule(f),
            cache: None,
            potentially_dirty: false,
            outgoing: Vec::new(),
            incoming: Vec::new(),
        }
    }
}
