//! Shift propagation
//!
//! When a node grows (or is inserted) everything that visually follows it
//! must move by the same offset, in document order, while nodes before it
//! and nodes on unrelated branches stay put.
//!
//! For a change at `X`:
//! 1. find the scene above `X` and the chapter at the root of its branch
//! 2. later siblings of `X` in that scene move with their subtrees, except
//!    media siblings, which only ever travel inside a moved ancestor
//! 3. later scenes of the chapter move with their subtrees
//! 4. later chapters move with their subtrees
//!
//! When `X` sits deeper than a direct scene child (media under a text), the
//! scene-level step uses the ancestor of `X` that is directly in the scene.

use plotline_model::{NodeId, NodeKind, Offset, Story};

/// Translate `root` and every descendant by `offset`
///
/// Returns the number of nodes moved.
pub fn translate_subtree(story: &mut Story, root: &NodeId, offset: Offset) -> usize {
    if offset.is_zero() {
        return 0;
    }
    let ids = story.subtree_ids(root);
    for id in &ids {
        story.translate_node(id, offset);
    }
    ids.len()
}

/// Where a change sits in the outline
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShiftContext {
    /// Parent scene and the member of its child list that contains the origin
    pub scene: Option<(NodeId, NodeId)>,
    /// Owning chapter and the member of its child list that contains the origin
    pub chapter: Option<(NodeId, Option<NodeId>)>,
}

impl ShiftContext {
    /// Resolve the context of `origin`; empty for unknown ids
    #[must_use]
    pub fn resolve(story: &Story, origin: &NodeId) -> Self {
        if !story.contains(origin) {
            return Self::default();
        }
        // origin first, root last
        let mut chain = vec![origin.clone()];
        chain.extend(story.ancestors(origin));

        let scene = chain
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, id)| story.kind_of(id) == Some(NodeKind::Scene))
            .map(|(i, id)| (id.clone(), chain[i - 1].clone()));

        let root = chain.len() - 1;
        let chapter = match story.kind_of(&chain[root]) {
            Some(NodeKind::Chapter) => {
                let member = root.checked_sub(1).map(|i| chain[i].clone());
                Some((chain[root].clone(), member))
            }
            _ => None,
        };

        Self { scene, chapter }
    }
}

/// Roots of the subtrees that must move for a change at `origin`
#[must_use]
pub fn affected_roots(story: &Story, origin: &NodeId) -> Vec<NodeId> {
    let context = ShiftContext::resolve(story, origin);
    let mut roots = Vec::new();

    if let Some((scene, member)) = &context.scene {
        roots.extend(
            siblings_after(story, Some(scene), member)
                .filter(|id| story.kind_of(id).is_some_and(|k| !k.is_media())),
        );
    }

    if let Some((chapter, member)) = &context.chapter {
        if let Some(member) = member {
            roots.extend(
                siblings_after(story, Some(chapter), member)
                    .filter(|id| story.kind_of(id) == Some(NodeKind::Scene)),
            );
        }
        roots.extend(siblings_after(story, None, chapter));
    }

    roots
}

/// Move everything that follows `origin` by `offset`
///
/// Returns the number of nodes moved. `origin` itself never moves.
pub fn propagate_shift(story: &mut Story, origin: &NodeId, offset: Offset) -> usize {
    if offset.is_zero() {
        return 0;
    }
    let roots = affected_roots(story, origin);
    let moved: usize = roots
        .iter()
        .map(|root| translate_subtree(story, root, offset))
        .sum();
    tracing::trace!(%origin, dx = offset.dx, dy = offset.dy, roots = roots.len(), moved, "propagated shift");
    moved
}

fn siblings_after<'a>(
    story: &'a Story,
    parent: Option<&NodeId>,
    member: &NodeId,
) -> impl Iterator<Item = NodeId> + 'a {
    let list = story.child_list(parent);
    let start = list
        .and_then(|l| l.index_of(member))
        .map_or(usize::MAX, |i| i + 1);
    list.into_iter()
        .flat_map(|l| l.iter())
        .skip(start)
        .cloned()
}
