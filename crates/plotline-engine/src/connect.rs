//! Valid drop targets for a connect gesture
//!
//! Given a source node, lists every node it could be connected to along with
//! the exact [`MoveSpec`] that realises the connection. The resolver is pure:
//! it never mutates and never fails; an unknown source yields no targets.

use crate::reparent::{can_move, MoveSpec};
use indexmap::IndexMap;
use plotline_model::{NodeId, NodeKind, Placement, Story};
use serde::Serialize;
use std::collections::HashSet;

/// What connecting to a target does, for labelling in the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectAction {
    /// Chapter source, chapter target: follow it at the top level
    AfterChapter,
    /// Scene source, chapter target: become its first scene
    FirstSceneOf,
    /// Scene source, scene target: follow it in its chapter
    AfterScene,
    /// Text source, scene target: become its first text
    FirstTextOf,
    /// Text source, text target: follow it in its scene
    AfterText,
    /// Media source: hang under the target, appended
    AttachTo,
}

/// One candidate target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectTarget {
    pub action: ConnectAction,
    pub spec: MoveSpec,
}

/// Every valid target for `source`, keyed by target id in document order
#[must_use]
pub fn compute_targets(story: &Story, source: &NodeId) -> IndexMap<NodeId, ConnectTarget> {
    let Some(source_kind) = story.kind_of(source) else {
        return IndexMap::new();
    };
    let excluded: HashSet<NodeId> = story.subtree_ids(source).into_iter().collect();

    story
        .document_order()
        .into_iter()
        .filter(|id| !excluded.contains(id))
        .filter_map(|target| {
            let target_kind = story.kind_of(&target)?;
            let connect = resolve(story, source_kind, &target, target_kind)?;
            debug_assert!(can_move(story, source, connect.spec.new_parent.as_ref()));
            Some((target, connect))
        })
        .collect()
}

fn resolve(
    story: &Story,
    source: NodeKind,
    target: &NodeId,
    target_kind: NodeKind,
) -> Option<ConnectTarget> {
    let after_sibling = |action| ConnectTarget {
        action,
        spec: MoveSpec::new(story.parent_of(target).cloned(), Placement::after(target.clone())),
    };
    let first_child = |action| ConnectTarget {
        action,
        spec: MoveSpec::new(Some(target.clone()), Placement::at_start()),
    };

    match (source, target_kind) {
        (NodeKind::Chapter, NodeKind::Chapter) => Some(after_sibling(ConnectAction::AfterChapter)),
        (NodeKind::Scene, NodeKind::Chapter) => Some(first_child(ConnectAction::FirstSceneOf)),
        (NodeKind::Scene, NodeKind::Scene) => Some(after_sibling(ConnectAction::AfterScene)),
        (NodeKind::Text, NodeKind::Scene) => Some(first_child(ConnectAction::FirstTextOf)),
        (NodeKind::Text, NodeKind::Text) => Some(after_sibling(ConnectAction::AfterText)),
        (s, NodeKind::Chapter | NodeKind::Scene | NodeKind::Text) if s.is_media() => Some(ConnectTarget {
            action: ConnectAction::AttachTo,
            spec: MoveSpec::under(target.clone()),
        }),
        _ => None,
    }
}
