use std::fmt;

/// Stable identity of a node, valid for the lifetime of the graph that
/// created it. Indexes directly into the graph's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Raw arena index. Exposed so collaborators (snapshot renderers,
    /// debuggers) can derive stable, alphanumeric-only labels.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}
