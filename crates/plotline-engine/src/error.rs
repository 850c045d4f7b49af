//! Error types for the outline engine
//!
//! Every variant is locally recovered: the failing operation leaves the
//! story and the history untouched, and the caller decides what to show.

use plotline_model::{InvariantViolation, KindMismatch, NodeId, NodeKind};

/// Outline operation failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Referenced id is not in the story
    #[error("node not found: {0}")]
    NotFound(NodeId),

    /// Operation addressed a node of a different kind
    #[error("{id} is a {actual}, expected a {expected}")]
    TypeMismatch {
        id: NodeId,
        expected: NodeKind,
        actual: NodeKind,
    },

    /// Parent/child type rules forbid the pairing
    #[error("a {child} cannot be placed under {}", describe_parent(.parent))]
    InvalidParent {
        child: NodeKind,
        parent: Option<NodeKind>,
    },

    /// Target parent lies inside the moved node's own subtree
    #[error("cannot move {node} under {target}, which is inside its own subtree")]
    CycleDetected { node: NodeId, target: NodeId },

    /// Proposed chapter order is not a permutation of the current one
    #[error("invalid chapter order: {0}")]
    InvalidReorder(String),

    /// Replacement story breaks tree invariants
    #[error("replacement story violates {} invariant(s)", .0.len())]
    InvalidSnapshot(Vec<InvariantViolation>),

    /// Position or delta with a NaN or infinite component
    #[error("non-finite {field} for {id}")]
    NonFinite { id: NodeId, field: &'static str },

    /// Drag update without a drag in progress
    #[error("no drag in progress")]
    NoActiveDrag,
}

impl EngineError {
    /// Check if the error comes from the parent/child structure rules
    #[inline]
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::InvalidParent { .. } | Self::CycleDetected { .. } | Self::InvalidReorder(_)
        )
    }

    pub(crate) fn kind_mismatch(id: &NodeId, mismatch: KindMismatch) -> Self {
        Self::TypeMismatch {
            id: id.clone(),
            expected: mismatch.expected,
            actual: mismatch.actual,
        }
    }
}

fn describe_parent(parent: &Option<NodeKind>) -> String {
    match parent {
        Some(kind) => format!("a {kind}"),
        None => "the top level".to_string(),
    }
}
