use crate::error::GraphError;
use crate::graph::Graph;
use crate::id::NodeId;
use std::fmt;
use std::marker::PhantomData;

/// A typed reference to one cell of a [`Graph`].
///
/// `Node<T>` is the client-facing handle: the graph arena stores values
/// type-erased, and `Node<T>` is the only place that remembers `T`. Rule
/// closures close over `Node<T>` handles of the nodes they read — reading
/// through a handle while the owning rule is on top of the evaluation stack
/// is what records the dependency (§4.4 step 1).
pub struct Node<T> {
    graph: Graph,
    id: NodeId,
    _marker: PhantomData<T>,
}

impl<T> Node<T> {
    pub(crate) fn new(graph: Graph, id: NodeId) -> Self {
        Self {
            graph,
            id,
            _marker: PhantomData,
        }
    }

    /// Stable identity of this node, for use with [`Graph::snapshot`].
    pub fn id(&self) -> NodeId {
        self.id
    }
}

impl<T> Clone for Node<T> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
            id: self.id,
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node").field("id", &self.id).finish()
    }
}

impl<T> Node<T>
where
    T: fmt::Debug + Clone + 'static,
{
    /// Ensure this node is up to date, then return its cached value.
    ///
    /// Drives recomputation via the pull-based algorithm in `graph.rs`.
    /// Never fails — a panicking rule unwinds through this call instead.
    pub fn read(&self) -> T {
        let erased = self.graph.read(self.id);
        erased
            .as_any()
            .downcast_ref::<T>()
            .cloned()
            .unwrap_or_else(|| {
                panic!(
                    "attrgraph-core: type mismatch reading node {} — Node<T> handle does not \
                     match the type it was constructed with",
                    self.id
                )
            })
    }

    /// Overwrite the cached value of an input node.
    ///
    /// Returns [`GraphError`] and leaves the graph unmodified if this handle
    /// refers to a rule node — rule outputs are computed, never assigned.
    pub fn write(&self, value: T) -> Result<(), GraphError> {
        self.graph.write(self.id, Box::new(value))
    }
}
