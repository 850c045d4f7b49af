//! Remeasure protocol
//!
//! The renderer reports sizes after layout. A report goes through two
//! phases: the size cache is refreshed, then (when the height really moved
//! and nothing says to hold off) the difference is propagated to everything
//! that follows the node.
//!
//! Two things hold propagation back:
//! - history suppression, raised while an undo/redo restores a layout that
//!   already contains the shift
//! - echoes: a report that exactly reverses the last delta applied for the
//!   same node is the renderer settling back, not a real edit

use plotline_layout::{propagate_shift, SizeCache};
use plotline_model::{NodeId, Offset, Size, Story};
use serde::Serialize;
use std::collections::HashMap;

/// Heights closer than this are treated as equal
pub const HEIGHT_EPSILON: f64 = 1e-6;

/// What a size report did
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RemeasureOutcome {
    /// No earlier height; cache filled, nothing moved
    FirstMeasurement,
    /// Same height as before
    Unchanged,
    /// History suppression raised; cache refreshed only
    Suppressed,
    /// Reverses the last applied delta; swallowed
    EchoIgnored { delta: f64 },
    /// Following content moved by `delta`
    Shifted { delta: f64, moved: usize },
    /// Reported id is not in the story
    UnknownNode,
    /// NaN, infinite or negative size; nothing recorded
    InvalidSize,
}

impl RemeasureOutcome {
    /// Whether the story changed
    #[inline]
    #[must_use]
    pub fn is_shift(&self) -> bool {
        matches!(self, Self::Shifted { .. })
    }
}

/// Last delta the engine applied per node
#[derive(Debug, Clone, Default)]
pub struct RemeasureTracker {
    last_applied: HashMap<NodeId, f64>,
}

impl RemeasureTracker {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, id: &NodeId, delta: f64) {
        self.last_applied.insert(id.clone(), delta);
    }

    /// Consume the record for `id` if `delta` exactly undoes it
    pub fn take_echo(&mut self, id: &NodeId, delta: f64) -> bool {
        let is_echo = self
            .last_applied
            .get(id)
            .is_some_and(|last| (last + delta).abs() < HEIGHT_EPSILON);
        if is_echo {
            self.last_applied.remove(id);
        }
        is_echo
    }

    #[inline]
    #[must_use]
    pub fn last_applied(&self, id: &NodeId) -> Option<f64> {
        self.last_applied.get(id).copied()
    }

    pub fn forget(&mut self, id: &NodeId) {
        self.last_applied.remove(id);
    }

    pub fn clear(&mut self) {
        self.last_applied.clear();
    }
}

/// Run both phases for one size report
///
/// Returns the outcome and, for [`RemeasureOutcome::Shifted`], the shifted
/// story. The size cache is updated for every known node reporting a valid
/// size.
pub fn remeasure<S>(
    story: &Story,
    sizes: &mut S,
    tracker: &mut RemeasureTracker,
    suppressed: bool,
    id: &NodeId,
    size: Size,
) -> (RemeasureOutcome, Option<Story>)
where
    S: SizeCache + ?Sized,
{
    if !story.contains(id) {
        return (RemeasureOutcome::UnknownNode, None);
    }
    if !size.is_valid() {
        return (RemeasureOutcome::InvalidSize, None);
    }

    let previous = sizes.height(id);
    sizes.set_size(id, size);

    let Some(previous) = previous else {
        return (RemeasureOutcome::FirstMeasurement, None);
    };
    let delta = size.height - previous;
    if delta.abs() < HEIGHT_EPSILON {
        return (RemeasureOutcome::Unchanged, None);
    }
    if suppressed {
        return (RemeasureOutcome::Suppressed, None);
    }
    if tracker.take_echo(id, delta) {
        return (RemeasureOutcome::EchoIgnored { delta }, None);
    }

    let (next, moved) = shift_after(story, id, delta);
    tracker.record(id, delta);
    (RemeasureOutcome::Shifted { delta, moved }, Some(next))
}

/// Propagate a vertical delta from `id` onto a copy of `story`
#[must_use]
pub fn shift_after(story: &Story, id: &NodeId, delta: f64) -> (Story, usize) {
    let mut next = story.clone();
    let moved = propagate_shift(&mut next, id, Offset::vertical(delta));
    (next, moved)
}
