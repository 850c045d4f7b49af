//! Reparenting and chapter reordering
//!
//! Checks run in a fixed order so callers get the most specific reason:
//! missing ids first, then cycles, then the type table.

use crate::actions::check_parent;
use crate::error::EngineError;
use plotline_model::{NodeId, NodeKind, Placement, Story};
use std::collections::HashSet;

/// Destination of a move: parent (`None` = top level) plus list placement
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MoveSpec {
    pub new_parent: Option<NodeId>,
    pub placement: Placement,
}

impl MoveSpec {
    #[inline]
    #[must_use]
    pub fn new(new_parent: Option<NodeId>, placement: Placement) -> Self {
        Self {
            new_parent,
            placement,
        }
    }

    /// Append under `parent`
    #[inline]
    #[must_use]
    pub fn under(parent: NodeId) -> Self {
        Self::new(Some(parent), Placement::append())
    }
}

/// Check a move without performing it
///
/// # Errors
/// [`EngineError::NotFound`], [`EngineError::CycleDetected`] when the new
/// parent is the node itself or one of its descendants, or
/// [`EngineError::InvalidParent`].
pub fn validate_move(
    story: &Story,
    id: &NodeId,
    new_parent: Option<&NodeId>,
) -> Result<NodeKind, EngineError> {
    let kind = story
        .kind_of(id)
        .ok_or_else(|| EngineError::NotFound(id.clone()))?;
    if let Some(target) = new_parent {
        if !story.contains(target) {
            return Err(EngineError::NotFound(target.clone()));
        }
        if story.is_in_subtree(id, target) {
            return Err(EngineError::CycleDetected {
                node: id.clone(),
                target: target.clone(),
            });
        }
    }
    check_parent(story, kind, new_parent)?;
    Ok(kind)
}

/// Whether [`move_node`] would accept the move
#[inline]
#[must_use]
pub fn can_move(story: &Story, id: &NodeId, new_parent: Option<&NodeId>) -> bool {
    validate_move(story, id, new_parent).is_ok()
}

/// Detach `id` and re-attach it under `new_parent` at `placement`
///
/// Positions are left alone; the host decides whether the moved branch
/// should be laid out again.
///
/// # Errors
/// See [`validate_move`].
pub fn move_node(
    story: &Story,
    id: &NodeId,
    new_parent: Option<&NodeId>,
    placement: &Placement,
) -> Result<Story, EngineError> {
    validate_move(story, id, new_parent)?;

    let mut next = story.clone();
    next.detach(id);
    if let Some(node) = next.node_mut(id) {
        node.parent_id = new_parent.cloned();
    }
    next.attach(new_parent, id.clone(), placement);
    Ok(next)
}

/// Replace the top-level order with a permutation of itself
///
/// # Errors
/// [`EngineError::InvalidReorder`] unless `new_order` holds every current
/// top-level chapter exactly once and nothing else.
pub fn reorder_chapters(story: &Story, new_order: &[NodeId]) -> Result<Story, EngineError> {
    let current = story.order();
    if new_order.len() != current.len() {
        return Err(EngineError::InvalidReorder(format!(
            "expected {} chapters, got {}",
            current.len(),
            new_order.len()
        )));
    }

    let mut seen = HashSet::with_capacity(new_order.len());
    for id in new_order {
        if !seen.insert(id) {
            return Err(EngineError::InvalidReorder(format!("{id} listed twice")));
        }
        if story.kind_of(id) != Some(NodeKind::Chapter) || !current.contains(id) {
            return Err(EngineError::InvalidReorder(format!(
                "{id} is not a top-level chapter"
            )));
        }
    }

    let mut next = story.clone();
    next.replace_order(new_order.iter().cloned());
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotline_model::{Heading, Node, NodeBody, Position, TextBody};
    use pretty_assertions::assert_eq;

    fn node(id: &str, parent: Option<&str>, body: NodeBody) -> Node {
        Node::with_id(id.into(), parent.map(NodeId::new), Position::origin(), body)
    }

    fn ids(list: &[&str]) -> Vec<NodeId> {
        list.iter().map(|s| NodeId::new(*s)).collect()
    }

    fn story() -> Story {
        Story::from_parts(
            "moves",
            vec![
                node("c1", None, NodeBody::Chapter(Heading::titled("One"))),
                node("c2", None, NodeBody::Chapter(Heading::titled("Two"))),
                node("s1", Some("c1"), NodeBody::Scene(Heading::titled("A"))),
                node("s2", Some("c2"), NodeBody::Scene(Heading::titled("B"))),
                node("t1", Some("s1"), NodeBody::Text(TextBody::new("x"))),
            ],
            ids(&["c1", "c2"]),
            vec![
                ("c1".into(), ids(&["s1"])),
                ("c2".into(), ids(&["s2"])),
                ("s1".into(), ids(&["t1"])),
            ],
        )
    }

    #[test]
    fn scene_to_other_chapter_at_start() {
        let story = story();
        let next = move_node(&story, &"s1".into(), Some(&"c2".into()), &Placement::at_start()).unwrap();

        assert_eq!(next.children(&"c2".into()).cloned().collect::<Vec<_>>(), ids(&["s1", "s2"]));
        assert_eq!(next.children(&"c1".into()).count(), 0);
        assert_eq!(
            next.get_node(&"s1".into()).unwrap().parent_id,
            Some(NodeId::new("c2"))
        );
        assert!(next.check_invariants().is_ok());
    }

    #[test]
    fn cycle_rejected() {
        let story = story();
        let err = move_node(&story, &"s1".into(), Some(&"t1".into()), &Placement::append()).unwrap_err();
        assert_eq!(
            err,
            EngineError::CycleDetected {
                node: "s1".into(),
                target: "t1".into()
            }
        );

        let err = move_node(&story, &"s1".into(), Some(&"s1".into()), &Placement::append()).unwrap_err();
        assert!(matches!(err, EngineError::CycleDetected { .. }));
    }

    #[test]
    fn type_rules_apply() {
        let story = story();
        let err = move_node(&story, &"t1".into(), Some(&"c2".into()), &Placement::append()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidParent { .. }));

        assert!(!can_move(&story, &"s1".into(), None));
        assert!(can_move(&story, &"t1".into(), Some(&"s2".into())));
        assert!(!can_move(&story, &"ghost".into(), None));
    }

    #[test]
    fn reorder() {
        let story = story();
        let next = reorder_chapters(&story, &ids(&["c2", "c1"])).unwrap();
        assert_eq!(next.order().iter().cloned().collect::<Vec<_>>(), ids(&["c2", "c1"]));

        for bad in [vec!["c1"], vec!["c1", "c1"], vec!["c1", "s1"], vec!["c1", "zz"]] {
            let err = reorder_chapters(&story, &ids(&bad)).unwrap_err();
            assert!(matches!(err, EngineError::InvalidReorder(_)), "{bad:?}");
        }
    }
}
