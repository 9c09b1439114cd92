//! Incremental attribute graph: pull-based dependency tracking and dirty
//! propagation.
//!
//! A [`Graph`] holds two kinds of node: inputs, written directly, and
//! rules, whose value is computed from other nodes the first time it is
//! read and cached until something it depends on changes. Dependencies are
//! discovered automatically — a rule just calls `.read()` on the handles it
//! needs — and recomputation is pull-based: writing an input marks its
//! descendants `pending`, but nothing actually re-runs until a reader asks
//! for a value that might be stale.
//!
//! ```
//! use attrgraph_core::Graph;
//!
//! let graph = Graph::new();
//! let width = graph.create_input("width", 3);
//! let height = graph.create_input("height", 4);
//! let (w, h) = (width.clone(), height.clone());
//! let area = graph.create_rule("area", move || w.read() * h.read());
//!
//! assert_eq!(area.read(), 12);
//! width.write(10).unwrap();
//! assert_eq!(area.read(), 40);
//! ```

mod error;
mod graph;
mod handle;
mod id;
mod node;
mod snapshot;
mod value;

pub use error::{ErrorCode, GraphError};
pub use graph::Graph;
pub use handle::Node;
pub use id::NodeId;
pub use snapshot::{EdgeValue, GraphValue, NodeValue};
