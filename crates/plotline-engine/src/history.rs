//! Bounded undo/redo history
//!
//! Snapshots hold the whole `{story, images}` pair. Both are persistent
//! values, so a snapshot is a handful of reference-count bumps rather than a
//! deep copy, and nothing in `past` or `future` can alias live state mutably.

use crate::images::ImageStore;
use plotline_model::Story;
use std::collections::VecDeque;

/// Default undo depth
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Immutable capture of the engine state before a mutation
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySnapshot {
    story: Story,
    images: ImageStore,
}

impl HistorySnapshot {
    #[inline]
    #[must_use]
    pub fn new(story: Story, images: ImageStore) -> Self {
        Self { story, images }
    }

    #[inline]
    #[must_use]
    pub fn story(&self) -> &Story {
        &self.story
    }

    #[inline]
    #[must_use]
    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    #[inline]
    #[must_use]
    pub fn into_parts(self) -> (Story, ImageStore) {
        (self.story, self.images)
    }
}

/// Past/future stacks plus the remeasure suppression flag
///
/// Suppression is raised around every effective undo or redo and lowered by
/// the host on the next animation frame. While raised, size reports only
/// refresh the cache so a restored layout is not shifted a second time.
#[derive(Debug, Clone)]
pub struct HistoryManager {
    past: VecDeque<HistorySnapshot>,
    future: Vec<HistorySnapshot>,
    capacity: usize,
    suppressed: bool,
}

impl HistoryManager {
    /// Create with the given capacity (clamped to at least 1)
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            past: VecDeque::with_capacity(capacity),
            future: Vec::new(),
            capacity,
            suppressed: false,
        }
    }

    /// Record the state before a new mutation
    ///
    /// Evicts the oldest entry at capacity and invalidates redo.
    pub fn push(&mut self, snapshot: HistorySnapshot) {
        self.push_past(snapshot);
        self.future.clear();
    }

    /// Step back: returns the state to restore, stashing `current` for redo
    pub fn undo(&mut self, current: HistorySnapshot) -> Option<HistorySnapshot> {
        let previous = self.past.pop_back()?;
        self.future.push(current);
        Some(previous)
    }

    /// Step forward: returns the state to restore, stashing `current` for undo
    pub fn redo(&mut self, current: HistorySnapshot) -> Option<HistorySnapshot> {
        let next = self.future.pop()?;
        self.push_past(current);
        Some(next)
    }

    #[inline]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    #[inline]
    #[must_use]
    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first
    pub fn past(&self) -> impl Iterator<Item = &HistorySnapshot> + '_ {
        self.past.iter()
    }

    /// Drop both stacks
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    pub fn raise_suppression(&mut self) {
        self.suppressed = true;
    }

    pub fn lower_suppression(&mut self) {
        self.suppressed = false;
    }

    #[inline]
    #[must_use]
    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    fn push_past(&mut self, snapshot: HistorySnapshot) {
        if self.past.len() == self.capacity {
            self.past.pop_front();
        }
        self.past.push_back(snapshot);
    }
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
