use std::fmt;

/// Machine-readable error codes emitted by the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// `write` was called on a node that is backed by a rule, not an input.
    WriteToRuleNode,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::WriteToRuleNode => "WRITE_TO_RULE_NODE",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level graph error (returned from the public API).
///
/// These are usage errors the caller can recover from. Runtime invariant
/// violations (a mismatched evaluation-stack pop, an edge whose endpoints
/// disagree) are bugs, not recoverable conditions, and panic instead — see
/// `graph::bug`.
#[derive(Debug, Clone)]
pub struct GraphError {
    pub code: ErrorCode,
    pub message: String,
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for GraphError {}

impl GraphError {
    pub fn new(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self {
            code,
            message: msg.into(),
        }
    }
}
