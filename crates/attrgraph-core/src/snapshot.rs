//! A pure, read-only structural view of a [`crate::Graph`], plus a
//! dot-like rendering of that view for debugging and visualization tools.
//!
//! Building a [`GraphValue`] never recomputes anything: nodes are reported
//! exactly as currently cached, `potentiallyDirty` and `pending` exactly as
//! currently flagged. Rendering is a second, independent step over that
//! value — nothing here ever touches the graph itself.

use crate::graph::Inner;
use crate::id::NodeId;
use crate::value::ErasedValue as _;
use std::fmt::Write as _;

/// One node as seen from outside the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeValue {
    pub id: NodeId,
    pub name: String,
    pub potentially_dirty: bool,
    /// Debug-rendered cache contents, or `"<nil>"` if nothing has been
    /// computed yet.
    pub value: String,
    pub is_rule: bool,
    /// True while this node sits on the evaluation stack — i.e. a rule
    /// currently being evaluated, or one of its ancestors in the current
    /// recompute call chain.
    pub is_current: bool,
}

/// One dependency edge as seen from outside the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeValue {
    pub from: NodeId,
    pub to: NodeId,
    pub pending: bool,
}

/// The full structural snapshot: every node and every edge, as they stand
/// at the moment [`crate::Graph::snapshot`] was called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphValue {
    pub nodes: Vec<NodeValue>,
    pub edges: Vec<EdgeValue>,
}

pub(crate) fn build(inner: &Inner) -> GraphValue {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    for (id, slot) in inner.iter_nodes() {
        nodes.push(NodeValue {
            id,
            name: slot.name.clone(),
            potentially_dirty: slot.potentially_dirty,
            value: slot
                .cache
                .as_ref()
                .map(|v| v.render())
                .unwrap_or_else(|| "<nil>".to_string()),
            is_rule: slot.kind.is_rule(),
            is_current: inner.is_on_stack(id),
        });
        for edge in &slot.outgoing {
            edges.push(EdgeValue {
                from: id,
                to: edge.to,
                pending: edge.pending,
            });
        }
    }
    GraphValue { nodes, edges }
}

impl GraphValue {
    /// Render as a dot-like graph description (§6.3): identifiers are
    /// alphanumeric-only (`NodeId`'s `n{index}` form already satisfies
    /// this), labels are quote-escaped, dashed edges/nodes mark
    /// `pending`/`potentiallyDirty`, `shape=rect` marks a rule node, and
    /// `color=red` marks a node currently on the evaluation stack.
    pub fn render_dot(&self) -> String {
        let mut out = String::new();
        out.push_str("digraph attrgraph {\n");
        for node in &self.nodes {
            writeln!(out, "  {}", render_node_line(node)).expect("writing to String cannot fail");
        }
        for edge in &self.edges {
            writeln!(out, "  {}", render_edge_line(edge)).expect("writing to String cannot fail");
        }
        out.push_str("}\n");
        out
    }
}

fn escape_label(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

pub(crate) fn render_node_line(node: &NodeValue) -> String {
    let label = escape_label(&format!("{}\\n{}", node.name, node.value));
    let mut attrs = vec![format!("label=\"{label}\"")];
    if node.is_rule {
        attrs.push("shape=rect".to_string());
    }
    if node.potentially_dirty {
        attrs.push("style=dashed".to_string());
    }
    if node.is_current {
        attrs.push("color=red".to_string());
    }
    format!("{} [{}];", node.id, attrs.join(", "))
}

pub(crate) fn render_edge_line(edge: &EdgeValue) -> String {
    if edge.pending {
        format!("{} -> {} [style=dashed];", edge.from, edge.to)
    } else {
        format!("{} -> {};", edge.from, edge.to)
    }
}
