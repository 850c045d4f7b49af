//! The outline engine facade
//!
//! `OutlineEngine` owns the current story, the image set, the size cache and
//! the history. Every public mutation follows the same shape:
//!
//! 1. compute the next story from the current one (pure, may fail)
//! 2. on success, push a snapshot of the pre-state (unless skipped)
//! 3. publish the next story
//!
//! A failure returns before step 2, so rejected operations leave both the
//! story and the history exactly as they were.

use crate::actions::{self, Created, Deleted};
use crate::config::EngineConfig;
use crate::connect::{compute_targets, ConnectTarget};
use crate::error::EngineError;
use crate::history::{HistoryManager, HistorySnapshot};
use crate::images::ImageStore;
use crate::remeasure::{self, RemeasureOutcome, RemeasureTracker};
use crate::reparent::{self, MoveSpec};
use indexmap::IndexMap;
use plotline_layout::{MeasuredSizes, SizeCache};
use plotline_model::{
    AnnotationBody, AnnotationPatch, EventBody, EventPatch, Heading, HeadingPatch, NodeBody,
    NodeId, NodeKind, NodePatch, PictureBody, PicturePatch, Placement, Position, Size, Story,
    TextBody, TextPatch,
};
use std::sync::Arc;

/// Whether a mutation records an undo step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryMode {
    #[default]
    Record,
    /// Batched update whose snapshot was already taken
    Skip,
}

/// Drag in progress: one snapshot at start, none while moving
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub id: NodeId,
    pub start: Position,
}

/// Single-user outline editor core
#[derive(Debug)]
pub struct OutlineEngine<S: SizeCache = MeasuredSizes> {
    story: Story,
    images: ImageStore,
    sizes: S,
    history: HistoryManager,
    tracker: RemeasureTracker,
    drag: Option<DragSession>,
    config: EngineConfig,
}

impl OutlineEngine<MeasuredSizes> {
    /// Empty story with the in-memory size cache
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self::with_sizes(config, MeasuredSizes::new())
    }
}

impl Default for OutlineEngine<MeasuredSizes> {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl<S: SizeCache> OutlineEngine<S> {
    /// Empty story over a host-provided size cache
    #[must_use]
    pub fn with_sizes(config: EngineConfig, sizes: S) -> Self {
        Self {
            story: Story::default(),
            images: ImageStore::new(),
            sizes,
            history: HistoryManager::new(config.history_capacity),
            tracker: RemeasureTracker::new(),
            drag: None,
            config,
        }
    }

    /// Start from a persisted story
    ///
    /// # Errors
    /// [`EngineError::InvalidSnapshot`] if the story breaks tree invariants.
    pub fn from_story(story: Story, config: EngineConfig, sizes: S) -> Result<Self, EngineError> {
        story.check_invariants().map_err(EngineError::InvalidSnapshot)?;
        let mut engine = Self::with_sizes(config, sizes);
        engine.story = story;
        Ok(engine)
    }

    // ------------------------------------------------------------------
    // State access
    // ------------------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn current_story(&self) -> &Story {
        &self.story
    }

    #[inline]
    #[must_use]
    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    #[inline]
    #[must_use]
    pub fn sizes(&self) -> &S {
        &self.sizes
    }

    #[inline]
    #[must_use]
    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn active_drag(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    /// Swap in a whole story (load, import, external restore)
    ///
    /// Cached sizes of the outgoing and incoming nodes are dropped, so the
    /// next report for each node is a first measurement. Images whose node
    /// is absent from the new story are pruned.
    ///
    /// # Errors
    /// [`EngineError::InvalidSnapshot`] if the story breaks tree invariants.
    pub fn replace_story(&mut self, story: Story, skip_history: bool) -> Result<(), EngineError> {
        if let Err(violations) = story.check_invariants() {
            tracing::warn!(count = violations.len(), "rejected replacement story");
            return Err(EngineError::InvalidSnapshot(violations));
        }
        let mode = if skip_history { HistoryMode::Skip } else { HistoryMode::Record };
        let outgoing: Vec<NodeId> = self.story.nodes().map(|n| n.id.clone()).collect();
        self.commit(story, mode);

        for id in outgoing.iter().chain(self.story.nodes().map(|n| &n.id)) {
            self.sizes.forget(id);
        }
        let orphaned: Vec<NodeId> = self
            .images
            .ids()
            .filter(|id| !self.story.contains(id))
            .cloned()
            .collect();
        let pruned = self.images.prune(&orphaned);
        self.tracker.clear();
        self.drag = None;
        tracing::debug!(nodes = self.story.len(), pruned, skip_history, "story replaced");
        Ok(())
    }

    /// Rename the story
    pub fn set_title(&mut self, title: impl Into<String>) {
        let mut next = self.story.clone();
        next.set_title(title);
        self.commit(next, HistoryMode::Record);
    }

    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Create any node kind under `parent`
    ///
    /// # Errors
    /// [`EngineError::NotFound`] or [`EngineError::InvalidParent`].
    pub fn create(
        &mut self,
        parent: Option<&NodeId>,
        placement: &Placement,
        body: NodeBody,
    ) -> Result<NodeId, EngineError> {
        let kind = body.kind();
        let created = actions::create_node(
            &self.story,
            &self.sizes,
            &self.config.layout,
            parent,
            body,
            placement,
        )
        .map_err(|err| rejected("create", err))?;

        let Created { story, id, shifted } = created;
        self.commit(story, HistoryMode::Record);
        tracing::debug!(%id, %kind, shifted, "node created");
        Ok(id)
    }

    /// New chapter at the top level
    ///
    /// # Errors
    /// None in practice: chapters always live at the top level.
    pub fn create_chapter(&mut self, placement: &Placement, heading: Heading) -> Result<NodeId, EngineError> {
        self.create(None, placement, NodeBody::Chapter(heading))
    }

    /// New scene in `chapter`
    ///
    /// # Errors
    /// [`EngineError::NotFound`] or [`EngineError::InvalidParent`].
    pub fn create_scene(
        &mut self,
        chapter: &NodeId,
        placement: &Placement,
        heading: Heading,
    ) -> Result<NodeId, EngineError> {
        self.create(Some(chapter), placement, NodeBody::Scene(heading))
    }

    /// New text passage in `scene`
    ///
    /// # Errors
    /// [`EngineError::NotFound`] or [`EngineError::InvalidParent`].
    pub fn create_text(
        &mut self,
        scene: &NodeId,
        placement: &Placement,
        body: TextBody,
    ) -> Result<NodeId, EngineError> {
        self.create(Some(scene), placement, NodeBody::Text(body))
    }

    /// New picture under a chapter, scene or text, with optional image bytes
    ///
    /// The node and its image land in one undo step.
    ///
    /// # Errors
    /// [`EngineError::NotFound`] or [`EngineError::InvalidParent`].
    pub fn create_picture(
        &mut self,
        parent: &NodeId,
        body: PictureBody,
        image: Option<Arc<[u8]>>,
    ) -> Result<NodeId, EngineError> {
        let id = self.create(Some(parent), &Placement::append(), NodeBody::Picture(body))?;
        if let Some(bytes) = image {
            self.images.insert(id.clone(), bytes);
        }
        Ok(id)
    }

    /// New annotation under a chapter, scene or text
    ///
    /// # Errors
    /// [`EngineError::NotFound`] or [`EngineError::InvalidParent`].
    pub fn create_annotation(&mut self, parent: &NodeId, body: AnnotationBody) -> Result<NodeId, EngineError> {
        self.create(Some(parent), &Placement::append(), NodeBody::Annotation(body))
    }

    /// New event under a chapter, scene or text
    ///
    /// # Errors
    /// [`EngineError::NotFound`] or [`EngineError::InvalidParent`].
    pub fn create_event(&mut self, parent: &NodeId, body: EventBody) -> Result<NodeId, EngineError> {
        self.create(Some(parent), &Placement::append(), NodeBody::Event(body))
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Merge a kind-tagged patch into `id`
    ///
    /// # Errors
    /// [`EngineError::NotFound`] or [`EngineError::TypeMismatch`].
    pub fn update(&mut self, id: &NodeId, patch: NodePatch) -> Result<(), EngineError> {
        let kind = patch.kind();
        let next = actions::update_node(&self.story, id, patch).map_err(|err| rejected("update", err))?;
        self.commit(next, HistoryMode::Record);
        tracing::debug!(%id, %kind, "node updated");
        Ok(())
    }

    /// # Errors
    /// [`EngineError::NotFound`] or [`EngineError::TypeMismatch`].
    pub fn update_chapter(&mut self, id: &NodeId, patch: HeadingPatch) -> Result<(), EngineError> {
        self.update(id, NodePatch::Chapter(patch))
    }

    /// # Errors
    /// [`EngineError::NotFound`] or [`EngineError::TypeMismatch`].
    pub fn update_scene(&mut self, id: &NodeId, patch: HeadingPatch) -> Result<(), EngineError> {
        self.update(id, NodePatch::Scene(patch))
    }

    /// # Errors
    /// [`EngineError::NotFound`] or [`EngineError::TypeMismatch`].
    pub fn update_text(&mut self, id: &NodeId, patch: TextPatch) -> Result<(), EngineError> {
        self.update(id, NodePatch::Text(patch))
    }

    /// # Errors
    /// [`EngineError::NotFound`] or [`EngineError::TypeMismatch`].
    pub fn update_picture(&mut self, id: &NodeId, patch: PicturePatch) -> Result<(), EngineError> {
        self.update(id, NodePatch::Picture(patch))
    }

    /// # Errors
    /// [`EngineError::NotFound`] or [`EngineError::TypeMismatch`].
    pub fn update_annotation(&mut self, id: &NodeId, patch: AnnotationPatch) -> Result<(), EngineError> {
        self.update(id, NodePatch::Annotation(patch))
    }

    /// # Errors
    /// [`EngineError::NotFound`] or [`EngineError::TypeMismatch`].
    pub fn update_event(&mut self, id: &NodeId, patch: EventPatch) -> Result<(), EngineError> {
        self.update(id, NodePatch::Event(patch))
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete `id` and its subtree; `expected` guards against deleting the
    /// wrong kind
    ///
    /// Returns every removed id. Images, sizes and remeasure records of the
    /// removed nodes go with them.
    ///
    /// # Errors
    /// [`EngineError::NotFound`] or [`EngineError::TypeMismatch`].
    pub fn delete(&mut self, id: &NodeId, expected: Option<NodeKind>) -> Result<Vec<NodeId>, EngineError> {
        let Deleted { story, removed } =
            actions::delete_node(&self.story, id, expected).map_err(|err| rejected("delete", err))?;

        let snapshot = self.snapshot();
        self.history.push(snapshot);
        self.story = story;
        let pruned = self.images.prune(&removed);
        for gone in &removed {
            self.sizes.forget(gone);
            self.tracker.forget(gone);
        }
        if self.drag.as_ref().is_some_and(|d| removed.contains(&d.id)) {
            self.drag = None;
        }
        tracing::debug!(%id, removed = removed.len(), pruned, "subtree deleted");
        Ok(removed)
    }

    /// # Errors
    /// [`EngineError::NotFound`] or [`EngineError::TypeMismatch`].
    pub fn delete_chapter(&mut self, id: &NodeId) -> Result<Vec<NodeId>, EngineError> {
        self.delete(id, Some(NodeKind::Chapter))
    }

    /// # Errors
    /// [`EngineError::NotFound`] or [`EngineError::TypeMismatch`].
    pub fn delete_scene(&mut self, id: &NodeId) -> Result<Vec<NodeId>, EngineError> {
        self.delete(id, Some(NodeKind::Scene))
    }

    /// # Errors
    /// [`EngineError::NotFound`] or [`EngineError::TypeMismatch`].
    pub fn delete_text(&mut self, id: &NodeId) -> Result<Vec<NodeId>, EngineError> {
        self.delete(id, Some(NodeKind::Text))
    }

    /// # Errors
    /// [`EngineError::NotFound`] or [`EngineError::TypeMismatch`].
    pub fn delete_picture(&mut self, id: &NodeId) -> Result<Vec<NodeId>, EngineError> {
        self.delete(id, Some(NodeKind::Picture))
    }

    /// # Errors
    /// [`EngineError::NotFound`] or [`EngineError::TypeMismatch`].
    pub fn delete_annotation(&mut self, id: &NodeId) -> Result<Vec<NodeId>, EngineError> {
        self.delete(id, Some(NodeKind::Annotation))
    }

    /// # Errors
    /// [`EngineError::NotFound`] or [`EngineError::TypeMismatch`].
    pub fn delete_event(&mut self, id: &NodeId) -> Result<Vec<NodeId>, EngineError> {
        self.delete(id, Some(NodeKind::Event))
    }

    // ------------------------------------------------------------------
    // Images
    // ------------------------------------------------------------------

    /// Attach image bytes to a picture node
    ///
    /// # Errors
    /// [`EngineError::NotFound`] or [`EngineError::TypeMismatch`].
    pub fn set_image(&mut self, id: &NodeId, bytes: impl Into<Arc<[u8]>>) -> Result<(), EngineError> {
        actions::expect_kind(&self.story, id, NodeKind::Picture).map_err(|err| rejected("set_image", err))?;
        let snapshot = self.snapshot();
        self.history.push(snapshot);
        self.images.insert(id.clone(), bytes);
        tracing::debug!(%id, "image set");
        Ok(())
    }

    /// Drop the image of `id`; returns whether there was one
    pub fn remove_image(&mut self, id: &NodeId) -> bool {
        if !self.images.contains(id) {
            return false;
        }
        let snapshot = self.snapshot();
        self.history.push(snapshot);
        self.images.remove(id);
        true
    }

    // ------------------------------------------------------------------
    // Positions and drag
    // ------------------------------------------------------------------

    /// Place one node
    ///
    /// # Errors
    /// [`EngineError::NotFound`] or [`EngineError::NonFinite`].
    pub fn set_position(&mut self, id: &NodeId, position: Position, mode: HistoryMode) -> Result<(), EngineError> {
        let next = actions::set_position(&self.story, id, position).map_err(|err| rejected("set_position", err))?;
        self.commit(next, mode);
        Ok(())
    }

    /// Start dragging `id`; takes the single undo snapshot for the gesture
    ///
    /// A drag already in progress is ended first.
    ///
    /// # Errors
    /// [`EngineError::NotFound`].
    pub fn begin_drag(&mut self, id: &NodeId) -> Result<(), EngineError> {
        let start = self
            .story
            .get_node(id)
            .map(|n| n.position)
            .ok_or_else(|| rejected("begin_drag", EngineError::NotFound(id.clone())))?;
        let snapshot = self.snapshot();
        self.history.push(snapshot);
        self.drag = Some(DragSession { id: id.clone(), start });
        tracing::trace!(%id, "drag started");
        Ok(())
    }

    /// Move the dragged node without recording history
    ///
    /// # Errors
    /// [`EngineError::NoActiveDrag`] or [`EngineError::NonFinite`].
    pub fn drag_to(&mut self, position: Position) -> Result<(), EngineError> {
        let id = self
            .drag
            .as_ref()
            .map(|d| d.id.clone())
            .ok_or_else(|| rejected("drag_to", EngineError::NoActiveDrag))?;
        self.set_position(&id, position, HistoryMode::Skip)
    }

    /// Finish the drag; returns the session that ended
    ///
    /// # Errors
    /// [`EngineError::NoActiveDrag`].
    pub fn end_drag(&mut self) -> Result<DragSession, EngineError> {
        let session = self
            .drag
            .take()
            .ok_or_else(|| rejected("end_drag", EngineError::NoActiveDrag))?;
        tracing::trace!(id = %session.id, "drag ended");
        Ok(session)
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    /// Reparent `id` under `new_parent` (`None` = top level)
    ///
    /// # Errors
    /// [`EngineError::NotFound`], [`EngineError::CycleDetected`] or
    /// [`EngineError::InvalidParent`].
    pub fn move_node(
        &mut self,
        id: &NodeId,
        new_parent: Option<&NodeId>,
        placement: &Placement,
    ) -> Result<(), EngineError> {
        let next = reparent::move_node(&self.story, id, new_parent, placement)
            .map_err(|err| rejected("move_node", err))?;
        self.commit(next, HistoryMode::Record);
        tracing::debug!(%id, parent = ?new_parent, "node moved");
        Ok(())
    }

    /// Apply a resolved move, typically from [`Self::connect_targets`]
    ///
    /// # Errors
    /// See [`Self::move_node`].
    pub fn apply_move(&mut self, id: &NodeId, spec: &MoveSpec) -> Result<(), EngineError> {
        self.move_node(id, spec.new_parent.as_ref(), &spec.placement)
    }

    /// Reorder top-level chapters
    ///
    /// # Errors
    /// [`EngineError::InvalidReorder`].
    pub fn reorder_chapters(&mut self, new_order: &[NodeId]) -> Result<(), EngineError> {
        let next = reparent::reorder_chapters(&self.story, new_order)
            .map_err(|err| rejected("reorder_chapters", err))?;
        self.commit(next, HistoryMode::Record);
        tracing::debug!(chapters = new_order.len(), "chapters reordered");
        Ok(())
    }

    /// Valid connect targets for `source` in document order
    #[must_use]
    pub fn connect_targets(&self, source: &NodeId) -> IndexMap<NodeId, ConnectTarget> {
        compute_targets(&self.story, source)
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Restore the state before the last recorded mutation
    ///
    /// Returns `false` when there is nothing to undo. On success remeasure
    /// suppression is raised until [`Self::on_frame`].
    pub fn undo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.undo(current) {
            Some(previous) => {
                self.restore(previous);
                tracing::debug!(past = self.history.past_len(), "undo");
                true
            }
            None => false,
        }
    }

    /// Re-apply the last undone mutation
    ///
    /// Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.redo(current) {
            Some(next) => {
                self.restore(next);
                tracing::debug!(future = self.history.future_len(), "redo");
                true
            }
            None => false,
        }
    }

    #[inline]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[inline]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Host signal: the next animation frame has been rendered
    pub fn on_frame(&mut self) {
        self.history.lower_suppression();
    }

    // ------------------------------------------------------------------
    // Remeasure
    // ------------------------------------------------------------------

    /// Record a rendered size and shift following content if it grew or shrank
    ///
    /// Never records history.
    pub fn report_size(&mut self, id: &NodeId, size: Size) -> RemeasureOutcome {
        let (outcome, next) = remeasure::remeasure(
            &self.story,
            &mut self.sizes,
            &mut self.tracker,
            self.history.is_suppressed(),
            id,
            size,
        );
        if let Some(next) = next {
            self.story = next;
        }
        tracing::trace!(%id, ?outcome, "size reported");
        outcome
    }

    /// Apply a vertical layout delta from `id` directly, skipping the cache
    ///
    /// Returns the number of nodes moved. Recorded for echo detection like a
    /// measured change; never records history.
    ///
    /// # Errors
    /// [`EngineError::NotFound`] or [`EngineError::NonFinite`].
    pub fn apply_layout_delta(&mut self, id: &NodeId, delta: f64) -> Result<usize, EngineError> {
        if !self.story.contains(id) {
            return Err(rejected("apply_layout_delta", EngineError::NotFound(id.clone())));
        }
        if !delta.is_finite() {
            let err = EngineError::NonFinite {
                id: id.clone(),
                field: "delta",
            };
            return Err(rejected("apply_layout_delta", err));
        }
        let (next, moved) = remeasure::shift_after(&self.story, id, delta);
        self.story = next;
        self.tracker.record(id, delta);
        Ok(moved)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot::new(self.story.clone(), self.images.clone())
    }

    fn commit(&mut self, next: Story, mode: HistoryMode) {
        if mode == HistoryMode::Record {
            let snapshot = self.snapshot();
            self.history.push(snapshot);
        }
        self.story = next;
    }

    fn restore(&mut self, snapshot: HistorySnapshot) {
        let (story, images) = snapshot.into_parts();
        self.story = story;
        self.images = images;
        self.tracker.clear();
        self.drag = None;
        self.history.raise_suppression();
    }
}

fn rejected(operation: &'static str, err: EngineError) -> EngineError {
    tracing::warn!(operation, error = %err, "operation rejected");
    err
}
