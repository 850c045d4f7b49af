//! Initial placement of new nodes
//!
//! These placements are advisory: they keep a fresh node clear of the
//! neighbour it was inserted after, and are never re-validated against the
//! rest of the canvas. Keeping existing nodes apart is the job of
//! [`crate::shift`].

use crate::config::LayoutConfig;
use crate::size_cache::SizeCache;
use plotline_model::{NodeId, NodeKind, Placement, Position, Story};

/// Height used for layout: measured if known, else the per-kind default
#[must_use]
pub fn node_height<S>(story: &Story, sizes: &S, config: &LayoutConfig, id: &NodeId) -> Option<f64>
where
    S: SizeCache + ?Sized,
{
    let kind = story.kind_of(id)?;
    Some(
        sizes
            .height(id)
            .unwrap_or_else(|| config.default_heights.for_kind(kind)),
    )
}

/// Follow the last child repeatedly until reaching a leaf
///
/// Anchor for "insert after this whole subtree". `None` if `id` is absent.
#[must_use]
pub fn deepest_last_id(story: &Story, id: &NodeId) -> Option<NodeId> {
    if !story.contains(id) {
        return None;
    }
    let mut current = id.clone();
    // bounded so a corrupted child loop cannot spin forever
    for _ in 0..story.len() {
        match story.last_child(&current) {
            Some(next) if story.contains(next) => current = next.clone(),
            _ => break,
        }
    }
    Some(current)
}

/// Directly below `anchor`: `{anchor.x, anchor.y + round(height / 2) + buffer}`
#[must_use]
pub fn position_below<S>(
    story: &Story,
    sizes: &S,
    config: &LayoutConfig,
    anchor: &NodeId,
) -> Option<Position>
where
    S: SizeCache + ?Sized,
{
    let node = story.get_node(anchor)?;
    let height = node_height(story, sizes, config, anchor)?;
    Some(Position::new(
        node.position.x,
        node.position.y + (height / 2.0).round() + config.buffer_y,
    ))
}

/// Right of the deepest-last descendant of `prev_chapter`, on the chapter row
#[must_use]
pub fn position_for_chapter_after(
    story: &Story,
    config: &LayoutConfig,
    prev_chapter: &NodeId,
) -> Option<Position> {
    let chapter = story.get_node(prev_chapter)?;
    let deepest = deepest_last_id(story, prev_chapter)?;
    let deepest = story.get_node(&deepest)?;
    Some(Position::new(
        deepest.position.x + config.chapter_gap_x,
        chapter.position.y,
    ))
}

/// Starting position for a node of `kind` about to be attached under `parent`
///
/// Chapters go right of the chapter they follow (or at the configured
/// origin when they become first). Everything else goes below the
/// deepest-last node of the sibling it follows, or below the parent itself
/// when it becomes the first child.
#[must_use]
pub fn initial_position<S>(
    story: &Story,
    sizes: &S,
    config: &LayoutConfig,
    parent: Option<&NodeId>,
    kind: NodeKind,
    placement: &Placement,
) -> Position
where
    S: SizeCache + ?Sized,
{
    let predecessor = story
        .child_list(parent)
        .and_then(|list| placement.predecessor(list))
        .cloned();

    let position = match (kind, predecessor, parent) {
        (NodeKind::Chapter, Some(prev), _) => position_for_chapter_after(story, config, &prev),
        (NodeKind::Chapter, None, _) => None,
        (_, Some(prev), _) => deepest_last_id(story, &prev)
            .and_then(|anchor| position_below(story, sizes, config, &anchor)),
        (_, None, Some(parent)) => position_below(story, sizes, config, parent),
        (_, None, None) => None,
    };

    position.unwrap_or(config.origin)
}
