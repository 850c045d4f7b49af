//! Tree invariant checker
//!
//! A consistent story satisfies:
//! - every id in `order` or any child list exists in the node map
//! - every node is listed exactly once, under the parent its `parent_id`
//!   names (top-level chapters in `order`)
//! - every `(kind, parent kind)` pairing obeys the type rules
//! - following `parent_id` links never revisits a node

use crate::id::NodeId;
use crate::node::NodeKind;
use crate::rules;
use crate::story::Story;
use std::collections::HashMap;

/// One broken invariant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("top-level order references missing node {0}")]
    DanglingTopLevel(NodeId),

    #[error("child list of {parent} references missing node {child}")]
    DanglingChild { parent: NodeId, child: NodeId },

    #[error("child list kept for missing parent {0}")]
    UnknownParentList(NodeId),

    #[error("node {0} is not listed under any parent")]
    NotListed(NodeId),

    #[error("node {id} is listed {count} times")]
    ListedMultipleTimes { id: NodeId, count: usize },

    #[error("node {id} records parent {recorded:?} but is listed under {listed:?}")]
    ParentMismatch {
        id: NodeId,
        recorded: Option<NodeId>,
        listed: Option<NodeId>,
    },

    #[error("node {id} names missing parent {parent}")]
    MissingParent { id: NodeId, parent: NodeId },

    #[error("{kind} {id} cannot live under {parent:?}")]
    TypeRule {
        id: NodeId,
        kind: NodeKind,
        parent: Option<NodeKind>,
    },

    #[error("parent chain of {0} loops")]
    Cycle(NodeId),
}

impl Story {
    /// Every broken invariant, in a stable order
    #[must_use]
    pub fn violations(&self) -> Vec<InvariantViolation> {
        let mut out = Vec::new();
        // id -> holders (None = top level)
        let mut listed: HashMap<&NodeId, Vec<Option<&NodeId>>> = HashMap::new();

        for id in self.order() {
            if self.contains(id) {
                listed.entry(id).or_default().push(None);
            } else {
                out.push(InvariantViolation::DanglingTopLevel(id.clone()));
            }
        }

        for (parent, children) in self.children_order() {
            if !self.contains(parent) {
                out.push(InvariantViolation::UnknownParentList(parent.clone()));
            }
            for child in children {
                if self.contains(child) {
                    listed.entry(child).or_default().push(Some(parent));
                } else {
                    out.push(InvariantViolation::DanglingChild {
                        parent: parent.clone(),
                        child: child.clone(),
                    });
                }
            }
        }

        for node in self.nodes() {
            let id = &node.id;
            match listed.get(id).map(Vec::as_slice) {
                None | Some([]) => out.push(InvariantViolation::NotListed(id.clone())),
                Some([holder]) => {
                    if *holder != node.parent_id.as_ref() {
                        out.push(InvariantViolation::ParentMismatch {
                            id: id.clone(),
                            recorded: node.parent_id.clone(),
                            listed: holder.cloned(),
                        });
                    }
                }
                Some(holders) => out.push(InvariantViolation::ListedMultipleTimes {
                    id: id.clone(),
                    count: holders.len(),
                }),
            }

            let parent_kind = match &node.parent_id {
                None => None,
                Some(parent) => match self.kind_of(parent) {
                    Some(kind) => Some(kind),
                    None => {
                        out.push(InvariantViolation::MissingParent {
                            id: id.clone(),
                            parent: parent.clone(),
                        });
                        continue;
                    }
                },
            };
            if !rules::is_allowed(node.kind(), parent_kind) {
                out.push(InvariantViolation::TypeRule {
                    id: id.clone(),
                    kind: node.kind(),
                    parent: parent_kind,
                });
            }

            if self.parent_chain_loops(id) {
                out.push(InvariantViolation::Cycle(id.clone()));
            }
        }

        out
    }

    /// `Ok` when [`Story::violations`] is empty
    ///
    /// # Errors
    /// Returns every violation found.
    pub fn check_invariants(&self) -> Result<(), Vec<InvariantViolation>> {
        let violations = self.violations();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    fn parent_chain_loops(&self, id: &NodeId) -> bool {
        let mut current = self.parent_of(id);
        let mut steps = 0;
        while let Some(parent) = current {
            if parent == id || steps > self.len() {
                return true;
            }
            steps += 1;
            current = self.parent_of(parent);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Position;
    use crate::node::{Heading, Node, NodeBody, TextBody};

    fn node(id: &str, parent: Option<&str>, body: NodeBody) -> Node {
        Node::with_id(
            NodeId::new(id),
            parent.map(NodeId::new),
            Position::origin(),
            body,
        )
    }

    fn chapter(id: &str) -> Node {
        node(id, None, NodeBody::Chapter(Heading::titled(id)))
    }

    #[test]
    fn consistent_story_passes() {
        let story = Story::from_parts(
            "ok",
            vec![
                chapter("c1"),
                node("s1", Some("c1"), NodeBody::Scene(Heading::titled("s"))),
            ],
            vec!["c1".into()],
            vec![("c1".into(), vec!["s1".into()])],
        );
        assert_eq!(story.check_invariants(), Ok(()));
    }

    #[test]
    fn detects_dangling_and_unlisted() {
        let story = Story::from_parts(
            "bad",
            vec![
                chapter("c1"),
                node("s1", Some("c1"), NodeBody::Scene(Heading::titled("s"))),
            ],
            vec!["c1".into(), "ghost".into()],
            vec![],
        );
        let violations = story.violations();
        assert!(violations.contains(&InvariantViolation::DanglingTopLevel("ghost".into())));
        assert!(violations.contains(&InvariantViolation::NotListed("s1".into())));
    }

    #[test]
    fn detects_type_rule_and_mismatch() {
        let story = Story::from_parts(
            "bad",
            vec![
                chapter("c1"),
                chapter("c2"),
                node("t1", Some("c1"), NodeBody::Text(TextBody::new("x"))),
            ],
            vec!["c1".into(), "c2".into()],
            vec![("c2".into(), vec!["t1".into()])],
        );
        let violations = story.violations();
        assert!(violations.iter().any(|v| matches!(
            v,
            InvariantViolation::TypeRule { kind: NodeKind::Text, parent: Some(NodeKind::Chapter), .. }
        )));
        assert!(violations.iter().any(|v| matches!(v, InvariantViolation::ParentMismatch { .. })));
    }

    #[test]
    fn detects_parent_cycle() {
        let story = Story::from_parts(
            "loop",
            vec![
                node("a", Some("b"), NodeBody::Scene(Heading::titled("a"))),
                node("b", Some("a"), NodeBody::Scene(Heading::titled("b"))),
            ],
            vec![],
            vec![("a".into(), vec!["b".into()]), ("b".into(), vec!["a".into()])],
        );
        let cycles = story
            .violations()
            .into_iter()
            .filter(|v| matches!(v, InvariantViolation::Cycle(_)))
            .count();
        assert_eq!(cycles, 2);
    }
}
