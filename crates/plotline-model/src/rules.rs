//! Parent/child type rules
//!
//! | child | allowed parent |
//! |---|---|
//! | chapter | none (top level) |
//! | scene | chapter |
//! | text | scene |
//! | picture / annotation / event | chapter, scene, text |

use crate::node::NodeKind;

const CONTAINERS: &[NodeKind] = &[NodeKind::Chapter, NodeKind::Scene, NodeKind::Text];

/// Parent kinds a child of `child` kind may hang under
///
/// Empty for chapters, which only live at the top level.
#[must_use]
pub fn allowed_parent_kinds(child: NodeKind) -> &'static [NodeKind] {
    match child {
        NodeKind::Chapter => &[],
        NodeKind::Scene => &[NodeKind::Chapter],
        NodeKind::Text => &[NodeKind::Scene],
        NodeKind::Picture | NodeKind::Annotation | NodeKind::Event => CONTAINERS,
    }
}

/// Check a `(child, parent)` pairing; `None` is the top level
#[must_use]
pub fn is_allowed(child: NodeKind, parent: Option<NodeKind>) -> bool {
    match parent {
        None => child == NodeKind::Chapter,
        Some(parent) => allowed_parent_kinds(child).contains(&parent),
    }
}

/// Check whether a node of `parent` kind may own any children at all
#[must_use]
pub fn can_have_children(parent: NodeKind) -> bool {
    CONTAINERS.contains(&parent)
}
