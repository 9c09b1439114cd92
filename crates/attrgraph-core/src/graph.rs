//! The graph itself: arena storage, the pull-based recompute algorithm, and
//! the transaction/observer mechanism.
//!
//! # Ownership
//!
//! [`Graph`] is a cheap, `Clone`-able handle (`Rc<RefCell<Inner>>`) around the
//! node arena. Nodes reference each other only by [`NodeId`] — never by
//! pointer — so the arena itself has no internal cycles regardless of how
//! tangled the dependency graph gets (§9).
//!
//! # Evaluation
//!
//! [`Graph::read`] drives the graph's internal `recompute`, the five-step
//! pull algorithm from the core specification: capture the dependency on
//! the current top of the evaluation stack, short-circuit if nothing could
//! have changed, recursively reconcile producers, decide whether a
//! re-evaluation is needed, and — if so — push the stack, run the rule, pop
//! it, and fan out `pending` to anything downstream.

use crate::error::{ErrorCode, GraphError};
use crate::handle::Node;
use crate::id::NodeId;
use crate::node::{InEdge, NodeKind, NodeSlot, OutEdge};
use crate::value::ErasedValue;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Panics on invariant violations — a mismatched stack pop, an edge whose
/// two ends disagree about its existence. These are bugs in this crate,
/// never a caller mistake, so they abort rather than returning a
/// [`GraphError`] (§7).
fn bug(msg: impl fmt::Display) -> ! {
    panic!("attrgraph-core: invariant violation: {msg}")
}

pub(crate) struct Inner {
    nodes: Vec<NodeSlot>,
    eval_stack: Vec<NodeId>,
    observer: Option<Box<dyn FnMut(&str, &Graph)>>,
}

/// A pull-based incremental attribute graph.
///
/// Cloning a `Graph` clones the handle, not the graph — all clones refer to
/// the same underlying arena, the same way an `Rc` clone does.
pub struct Graph(Rc<RefCell<Inner>>);

impl Clone for Graph {
    fn clone(&self) -> Self {
        Graph(Rc::clone(&self.0))
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        Graph(Rc::new(RefCell::new(Inner {
            nodes: Vec::new(),
            eval_stack: Vec::new(),
            observer: None,
        })))
    }

    /// Install a callback invoked once per mutation, inside every
    /// [`transaction`](Graph::transaction) (including the implicit one a bare
    /// `write` or `create_*` call outside an explicit transaction opens).
    /// See §6 for the exact label vocabulary.
    pub fn set_observer(&self, f: impl FnMut(&str, &Graph) + 'static) {
        self.0.borrow_mut().observer = Some(Box::new(f));
    }

    /// Create an input node: a cell with no rule, written directly via
    /// [`Node::write`].
    pub fn create_input<T>(&self, name: impl Into<String>, value: T) -> Node<T>
    where
        T: fmt::Debug + Clone + 'static,
    {
        let name = name.into();
        let id = {
            let mut inner = self.0.borrow_mut();
            let id = NodeId(inner.nodes.len());
            inner.nodes.push(NodeSlot::input(name.clone(), Box::new(value)));
            id
        };
        self.notify(&format!("{name} init"));
        Node::new(self.clone(), id)
    }

    /// Create a rule node: a cell whose value is computed by `f`, and
    /// recomputed only when something it read last time has changed.
    ///
    /// `f` is called with no arguments; it is expected to close over the
    /// [`Node`] handles it depends on and call `.read()` on them — those
    /// reads are what record the dependency edges.
    pub fn create_rule<T, F>(&self, name: impl Into<String>, f: F) -> Node<T>
    where
        T: fmt::Debug + Clone + 'static,
        F: Fn() -> T + 'static,
    {
        let name = name.into();
        let erased: Rc<dyn Fn() -> Box<dyn ErasedValue>> = Rc::new(move || -> Box<dyn ErasedValue> {
            Box::new(f())
        });
        let id = {
            let mut inner = self.0.borrow_mut();
            let id = NodeId(inner.nodes.len());
            inner.nodes.push(NodeSlot::rule(name.clone(), erased));
            id
        };
        self.notify(&format!("{name} init"));
        Node::new(self.clone(), id)
    }

    /// Run `f` as a single notification unit. Transactions nest: an inner
    /// transaction fires its own notification when it completes, and the
    /// outer one fires its own separately when it in turn completes (§4.1).
    /// The notification fires on every exit path, including a panic
    /// unwinding out of `f`.
    pub fn transaction<R>(&self, label: impl Into<String>, f: impl FnOnce() -> R) -> R {
        let _guard = NotifyGuard {
            graph: self,
            label: label.into(),
        };
        f()
    }

    /// A pure, non-mutating structural view of the graph. Never triggers
    /// recomputation — nodes are reported exactly as currently cached.
    pub fn snapshot(&self) -> crate::snapshot::GraphValue {
        crate::snapshot::build(&self.0.borrow())
    }

    pub(crate) fn read(&self, id: NodeId) -> Box<dyn ErasedValue> {
        self.capture_dependency(id);
        self.recompute(id);
        let inner = self.0.borrow();
        inner.nodes[id.0]
            .cache
            .as_ref()
            .unwrap_or_else(|| bug(format!("node {id} has no cached value after recompute")))
            .clone()
    }

    pub(crate) fn write(&self, id: NodeId, value: Box<dyn ErasedValue>) -> Result<(), GraphError> {
        {
            let inner = self.0.borrow();
            if inner.nodes[id.0].kind.is_rule() {
                return Err(GraphError::new(
                    ErrorCode::WriteToRuleNode,
                    format!(
                        "node {} (\"{}\") is backed by a rule; its value cannot be assigned",
                        id, inner.nodes[id.0].name
                    ),
                ));
            }
        }
        let name = {
            let mut inner = self.0.borrow_mut();
            inner.nodes[id.0].cache = Some(value);
            inner.nodes[id.0].name.clone()
        };
        self.notify(&format!("{name} wrappedValue: set"));
        self.propagate_from(id);
        Ok(())
    }

    /// §4.4 step 1: if there is a rule currently evaluating, record that it
    /// read `producer` by ensuring an edge exists from `producer` to it.
    fn capture_dependency(&self, producer: NodeId) {
        let mut inner = self.0.borrow_mut();
        let Some(&consumer) = inner.eval_stack.last() else {
            return;
        };
        if consumer == producer {
            bug(format!("node {producer} read itself while on top of the evaluation stack"));
        }
        if inner.nodes[producer.0]
            .outgoing
            .iter()
            .any(|e| e.to == consumer)
        {
            // Already tracked from a previous evaluation of this rule (open
            // question #2: stale edges from producers no longer read are
            // never pruned, so re-reading one just confirms it's live).
            let name = inner.nodes[consumer.0].name.clone();
            drop(inner);
            self.notify(&format!("{name} rec: resetting edge"));
            return;
        }
        let slot = inner.nodes[producer.0].outgoing.len();
        inner.nodes[consumer.0].incoming.push(InEdge { from: producer, slot });
        inner.nodes[producer.0].outgoing.push(OutEdge {
            to: consumer,
            pending: false,
        });
        let name = inner.nodes[consumer.0].name.clone();
        drop(inner);
        self.notify(&format!("{name} rec: adding edge"));
    }

    /// §4.4 steps 2-4: bring `id` up to date, recursing into its producers,
    /// and decide whether a re-evaluation (step 5) is required.
    fn recompute(&self, id: NodeId) {
        let (is_rule, has_cache, potentially_dirty) = {
            let inner = self.0.borrow();
            let slot = &inner.nodes[id.0];
            (slot.kind.is_rule(), slot.cache.is_some(), slot.potentially_dirty)
        };

        // Step 2: inputs are always current; clean, already-evaluated rules
        // short-circuit without even inspecting incoming edges.
        if !is_rule || (has_cache && !potentially_dirty) {
            return;
        }

        // Step 3: reconcile every producer first, so their `pending` flags
        // are resolved before we decide whether we need to re-run.
        let producers: Vec<NodeId> = {
            let inner = self.0.borrow();
            inner.nodes[id.0].incoming.iter().map(|e| e.from).collect()
        };
        for producer in producers {
            self.recompute(producer);
        }

        // Step 4: does any incoming edge say the producer changed since we
        // last ran? Then unconditionally clear potentiallyDirty — a
        // panicking rule restores it via EvalGuard below.
        let incoming: Vec<(NodeId, usize)> = {
            let inner = self.0.borrow();
            inner.nodes[id.0]
                .incoming
                .iter()
                .map(|e| (e.from, e.slot))
                .collect()
        };
        let has_pending = {
            let mut inner = self.0.borrow_mut();
            let mut any_pending = false;
            for (from, slot) in incoming {
                let out = inner.nodes[from.0]
                    .outgoing
                    .get_mut(slot)
                    .unwrap_or_else(|| bug(format!("edge slot {slot} missing on node {from}")));
                if out.pending {
                    any_pending = true;
                    out.pending = false;
                }
            }
            inner.nodes[id.0].potentially_dirty = false;
            any_pending
        };

        let is_initial = !has_cache;
        if has_pending || is_initial {
            self.evaluate_rule(id, is_initial);
        } else {
            let name = self.0.borrow().nodes[id.0].name.clone();
            self.notify(&format!("{name} rec: no-pending"));
        }
    }

    /// §4.4 step 5: push the stack, run the rule, pop it (even on panic),
    /// and — for every evaluation after the first — mark this node's
    /// consumers pending.
    fn evaluate_rule(&self, id: NodeId, is_initial: bool) {
        let name = self.0.borrow().nodes[id.0].name.clone();
        self.notify(&format!("{name} rec: push"));
        self.0.borrow_mut().eval_stack.push(id);
        let guard = EvalGuard { graph: self, id };

        let rule = {
            let inner = self.0.borrow();
            match &inner.nodes[id.0].kind {
                NodeKind::Rule(f) => Rc::clone(f),
                NodeKind::Input => bug(format!("node {id} has no rule but reached step 5")),
            }
        };
        self.notify(&format!("{name} rec: evaluate rule"));
        // No borrow of Inner is held across this call: the rule body reads
        // other nodes, which re-enters recompute/capture_dependency.
        let value = rule();

        guard.finish();
        self.0.borrow_mut().nodes[id.0].cache = Some(value);

        let popped = self.0.borrow_mut().eval_stack.pop();
        if popped != Some(id) {
            bug(format!(
                "evaluation stack mismatch: expected to pop {id}, popped {popped:?}"
            ));
        }
        self.notify(&format!("{name} rec: pop"));

        if !is_initial {
            self.propagate_from(id);
        }
    }

    /// Mark every outgoing edge of `id` pending and every downstream node
    /// potentially dirty. Shared by `write` and the post-evaluation fan-out
    /// in step 5.5: a pending edge is unobservable unless the consumer's
    /// `potentiallyDirty` flag is also set, since step 2's short-circuit
    /// never inspects incoming edges on a node that isn't already flagged.
    fn propagate_from(&self, id: NodeId) {
        let downstream: Vec<NodeId> = {
            let mut inner = self.0.borrow_mut();
            for edge in inner.nodes[id.0].outgoing.iter_mut() {
                edge.pending = true;
            }
            inner.nodes[id.0].outgoing.iter().map(|e| e.to).collect()
        };
        for to in downstream {
            self.set_potentially_dirty(to, true);
        }
    }

    /// §4.3: idempotent; recurses downstream only on an actual false→true
    /// transition, so a diamond-shaped graph is visited once per node per
    /// propagation rather than once per path into it.
    fn set_potentially_dirty(&self, id: NodeId, new_value: bool) {
        let (already, name, downstream) = {
            let inner = self.0.borrow();
            let slot = &inner.nodes[id.0];
            (
                slot.potentially_dirty == new_value,
                slot.name.clone(),
                slot.outgoing.iter().map(|e| e.to).collect::<Vec<_>>(),
            )
        };
        if already {
            return;
        }
        self.0.borrow_mut().nodes[id.0].potentially_dirty = new_value;
        if new_value {
            self.notify(&format!("{name} set dirty"));
            for to in downstream {
                self.set_potentially_dirty(to, true);
            }
        }
    }

    /// Every mutation is its own one-off transaction: fire immediately.
    /// Take the observer out of `Inner`, call it without holding any borrow,
    /// then put it back. Nested transactions always finish — and so call
    /// their own notification — strictly before an outer transaction's body
    /// returns, so no two calls are ever concurrent; this makes the
    /// take-call-restore dance safe against `RefCell` reentrancy.
    fn notify(&self, label: &str) {
        let taken = self.0.borrow_mut().observer.take();
        let mut observer = match taken {
            Some(f) => f,
            None => return,
        };
        observer(label, self);
        self.0.borrow_mut().observer = Some(observer);
    }
}

/// Backs `Graph::transaction`: fires `label` on every exit path of the
/// wrapped closure, including a panic unwinding through it.
struct NotifyGuard<'g> {
    graph: &'g Graph,
    label: String,
}

impl Drop for NotifyGuard<'_> {
    fn drop(&mut self) {
        self.graph.notify(&self.label);
    }
}

/// Pops the evaluation stack and restores `potentiallyDirty` if the rule
/// panicked, so a subsequent read retries it instead of serving a stale or
/// absent cache forever (§7). `finish()` disarms the panic-recovery path on
/// the ordinary, successful-return exit.
struct EvalGuard<'g> {
    graph: &'g Graph,
    id: NodeId,
}

impl EvalGuard<'_> {
    fn finish(self) {
        std::mem::forget(self);
    }
}

impl Drop for EvalGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            let mut inner = self.graph.0.borrow_mut();
            inner.nodes[self.id.0].potentially_dirty = true;
            if inner.eval_stack.last() == Some(&self.id) {
                inner.eval_stack.pop();
            }
        }
    }
}

impl Inner {
    pub(crate) fn iter_nodes(&self) -> impl Iterator<Item = (NodeId, &NodeSlot)> {
        self.nodes.iter().enumerate().map(|(i, slot)| (NodeId(i), slot))
    }

    pub(crate) fn is_on_stack(&self, id: NodeId) -> bool {
        self.eval_stack.contains(&id)
    }
}
