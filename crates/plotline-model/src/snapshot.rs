//! Persisted snapshot codec
//!
//! JSON shape: `{title, nodeMap, order, childrenOrder}` with flat,
//! `type`-tagged nodes. Decoding refuses stories that break an invariant.

use crate::invariants::InvariantViolation;
use crate::story::Story;

/// Snapshot encode/decode failure
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Malformed JSON or missing required fields
    #[error("invalid snapshot json: {0}")]
    Json(#[from] serde_json::Error),

    /// Well-formed document describing an inconsistent story
    #[error("snapshot violates {} invariant(s), first: {}", .0.len(), .0.first().map(ToString::to_string).unwrap_or_default())]
    Invalid(Vec<InvariantViolation>),
}

impl Story {
    /// Encode as compact JSON
    ///
    /// # Errors
    /// Returns [`SnapshotError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Encode as indented JSON
    ///
    /// # Errors
    /// Returns [`SnapshotError::Json`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode and validate
    ///
    /// # Errors
    /// Returns [`SnapshotError::Json`] for malformed input and
    /// [`SnapshotError::Invalid`] when the decoded story is inconsistent.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let story: Story = serde_json::from_str(json)?;
        story.check_invariants().map_err(SnapshotError::Invalid)?;
        Ok(story)
    }
}
