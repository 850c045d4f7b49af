//! Persisted snapshot checking

use plotline_model::{NodeKind, SnapshotError, Story};
use serde::Serialize;

/// Shape of a story that passed every invariant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorySummary {
    pub title: String,
    pub nodes: usize,
    pub chapters: usize,
    pub scenes: usize,
    pub texts: usize,
    pub media: usize,
}

impl StorySummary {
    #[must_use]
    pub fn of(story: &Story) -> Self {
        let count = |kind: NodeKind| story.nodes().filter(|n| n.kind() == kind).count();
        Self {
            title: story.title().to_string(),
            nodes: story.len(),
            chapters: count(NodeKind::Chapter),
            scenes: count(NodeKind::Scene),
            texts: count(NodeKind::Text),
            media: story.nodes().filter(|n| n.kind().is_media()).count(),
        }
    }
}

/// Decode a JSON snapshot and verify its invariants
///
/// # Errors
/// [`SnapshotError::Json`] for malformed input, [`SnapshotError::Invalid`]
/// listing every broken invariant.
pub fn check_snapshot(json: &str) -> Result<StorySummary, SnapshotError> {
    let story = Story::from_json(json)?;
    Ok(StorySummary::of(&story))
}
