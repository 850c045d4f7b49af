//! Create / update / delete over story values
//!
//! Each action takes the current story by reference and returns a new one.
//! The input is never touched, so a failed action needs no rollback and the
//! caller can snapshot the old value for history only once it succeeds.

use crate::error::EngineError;
use plotline_layout::{initial_position, propagate_shift, LayoutConfig, SizeCache};
use plotline_model::{
    rules, Node, NodeBody, NodeId, NodeKind, NodePatch, Offset, Placement, Position, Story,
};

/// Result of a successful create
#[derive(Debug, Clone)]
pub struct Created {
    pub story: Story,
    pub id: NodeId,
    /// Nodes moved by the insertion gap
    pub shifted: usize,
}

/// Result of a successful delete
#[derive(Debug, Clone)]
pub struct Deleted {
    pub story: Story,
    /// Every id removed, root first
    pub removed: Vec<NodeId>,
}

/// Gap opened after inserting a node of `kind`
///
/// Texts and scenes push later content down; chapters push later chapters
/// right. Media never displaces anything.
#[must_use]
pub fn insertion_gap(layout: &LayoutConfig, kind: NodeKind) -> Option<Offset> {
    match kind {
        NodeKind::Text => Some(Offset::vertical(layout.insert_gap_text_y)),
        NodeKind::Scene => Some(Offset::vertical(layout.insert_gap_scene_y)),
        NodeKind::Chapter => Some(Offset::horizontal(layout.insert_gap_chapter_x)),
        NodeKind::Picture | NodeKind::Annotation | NodeKind::Event => None,
    }
}

/// Check that a `kind` node may hang under `parent`
///
/// # Errors
/// [`EngineError::NotFound`] for an absent parent, [`EngineError::InvalidParent`]
/// when the type rules forbid the pairing.
pub fn check_parent(
    story: &Story,
    kind: NodeKind,
    parent: Option<&NodeId>,
) -> Result<(), EngineError> {
    let parent_kind = match parent {
        Some(parent) => Some(
            story
                .kind_of(parent)
                .ok_or_else(|| EngineError::NotFound(parent.clone()))?,
        ),
        None => None,
    };
    if rules::is_allowed(kind, parent_kind) {
        Ok(())
    } else {
        Err(EngineError::InvalidParent {
            child: kind,
            parent: parent_kind,
        })
    }
}

/// Look up `id` and confirm its kind
///
/// # Errors
/// [`EngineError::NotFound`] or [`EngineError::TypeMismatch`].
pub fn expect_kind<'a>(
    story: &'a Story,
    id: &NodeId,
    expected: NodeKind,
) -> Result<&'a Node, EngineError> {
    let node = story
        .get_node(id)
        .ok_or_else(|| EngineError::NotFound(id.clone()))?;
    if node.kind() == expected {
        Ok(node)
    } else {
        Err(EngineError::TypeMismatch {
            id: id.clone(),
            expected,
            actual: node.kind(),
        })
    }
}

/// Insert a new node under `parent` at `placement`
///
/// The node is positioned from its neighbours and then the insertion gap is
/// propagated from it, so content that follows moves out of the way.
///
/// # Errors
/// See [`check_parent`].
pub fn create_node<S>(
    story: &Story,
    sizes: &S,
    layout: &LayoutConfig,
    parent: Option<&NodeId>,
    body: NodeBody,
    placement: &Placement,
) -> Result<Created, EngineError>
where
    S: SizeCache + ?Sized,
{
    let kind = body.kind();
    check_parent(story, kind, parent)?;

    let position = initial_position(story, sizes, layout, parent, kind, placement);
    let node = Node::new(parent.cloned(), position, body);
    let id = node.id.clone();

    let mut next = story.clone();
    next.insert_node(node);
    next.attach(parent, id.clone(), placement);

    let shifted = insertion_gap(layout, kind)
        .map_or(0, |gap| propagate_shift(&mut next, &id, gap));

    Ok(Created {
        story: next,
        id,
        shifted,
    })
}

/// Merge `patch` into node `id`
///
/// # Errors
/// [`EngineError::NotFound`], or [`EngineError::TypeMismatch`] when the
/// patch targets another kind.
pub fn update_node(story: &Story, id: &NodeId, patch: NodePatch) -> Result<Story, EngineError> {
    let mut next = story.clone();
    let node = next
        .node_mut(id)
        .ok_or_else(|| EngineError::NotFound(id.clone()))?;
    node.apply_patch(patch)
        .map_err(|mismatch| EngineError::kind_mismatch(id, mismatch))?;
    Ok(next)
}

/// Remove node `id` and all of its descendants
///
/// # Errors
/// [`EngineError::NotFound`], or [`EngineError::TypeMismatch`] when
/// `expected` is given and differs.
pub fn delete_node(
    story: &Story,
    id: &NodeId,
    expected: Option<NodeKind>,
) -> Result<Deleted, EngineError> {
    match expected {
        Some(kind) => {
            expect_kind(story, id, kind)?;
        }
        None if !story.contains(id) => return Err(EngineError::NotFound(id.clone())),
        None => {}
    }
    let mut next = story.clone();
    let removed = next.remove_subtree(id);
    Ok(Deleted {
        story: next,
        removed,
    })
}

/// Place a single node; descendants stay where they are
///
/// # Errors
/// [`EngineError::NotFound`].
pub fn set_position(story: &Story, id: &NodeId, position: Position) -> Result<Story, EngineError> {
    if !position.is_finite() {
        return Err(EngineError::NonFinite {
            id: id.clone(),
            field: "position",
        });
    }
    let mut next = story.clone();
    let node = next
        .node_mut(id)
        .ok_or_else(|| EngineError::NotFound(id.clone()))?;
    node.position = position;
    Ok(next)
}
