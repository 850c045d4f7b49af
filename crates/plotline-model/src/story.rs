//! Story aggregate
//!
//! [`Story`] is the root of the outline: an id → node map, the ordered
//! top-level chapter list, and an ordered child list per parent.
//!
//! All collections are persistent (`im`), so cloning a story is O(1) and
//! mutating the clone never disturbs the original. Callers that need a new
//! story value clone, mutate the clone through the primitives below, and
//! publish it.
//!
//! Queries are total: an absent or malformed id yields `None` or an empty
//! result. The mutation primitives are low-level and do not enforce the
//! type rules; validation lives with the operations that call them.

use crate::geometry::Offset;
use crate::id::NodeId;
use crate::node::{Node, NodeKind};
use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Where an id goes in a sibling list
///
/// `at_start` wins over `insert_after`. An `insert_after` id that is not in
/// the list degrades to appending.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Placement {
    pub insert_after: Option<NodeId>,
    pub at_start: bool,
}

impl Placement {
    /// Append at the end of the list
    #[inline]
    #[must_use]
    pub fn append() -> Self {
        Self::default()
    }

    /// Insert immediately after `sibling`
    #[inline]
    #[must_use]
    pub fn after(sibling: NodeId) -> Self {
        Self {
            insert_after: Some(sibling),
            at_start: false,
        }
    }

    /// Insert as first element
    #[inline]
    #[must_use]
    pub fn at_start() -> Self {
        Self {
            insert_after: None,
            at_start: true,
        }
    }

    /// Index the new element takes in `list`
    #[must_use]
    pub fn index_in(&self, list: &Vector<NodeId>) -> usize {
        if self.at_start {
            return 0;
        }
        match &self.insert_after {
            Some(anchor) => list.index_of(anchor).map_or(list.len(), |i| i + 1),
            None => list.len(),
        }
    }

    /// Element the new one would directly follow in `list`
    #[must_use]
    pub fn predecessor<'a>(&self, list: &'a Vector<NodeId>) -> Option<&'a NodeId> {
        match self.index_in(list) {
            0 => None,
            index => list.get(index - 1),
        }
    }
}

/// Root aggregate of the outline
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    #[serde(default)]
    title: String,
    #[serde(default)]
    node_map: OrdMap<NodeId, Node>,
    #[serde(default)]
    order: Vector<NodeId>,
    #[serde(default)]
    children_order: OrdMap<NodeId, Vector<NodeId>>,
}

impl Story {
    /// Empty story
    #[inline]
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Assemble a story from raw parts without checking invariants
    ///
    /// Use [`Story::check_invariants`] before trusting the result.
    #[must_use]
    pub fn from_parts<N, C>(title: impl Into<String>, nodes: N, order: Vec<NodeId>, children: C) -> Self
    where
        N: IntoIterator<Item = Node>,
        C: IntoIterator<Item = (NodeId, Vec<NodeId>)>,
    {
        Self {
            title: title.into(),
            node_map: nodes.into_iter().map(|n| (n.id.clone(), n)).collect(),
            order: order.into_iter().collect(),
            children_order: children
                .into_iter()
                .map(|(parent, kids)| (parent, kids.into_iter().collect::<im::Vector<NodeId>>()))
                .collect(),
        }
    }

    #[inline]
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[inline]
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Number of nodes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.node_map.contains_key(id)
    }

    /// Look up a node
    #[inline]
    #[must_use]
    pub fn get_node(&self, id: &NodeId) -> Option<&Node> {
        self.node_map.get(id)
    }

    #[inline]
    #[must_use]
    pub fn kind_of(&self, id: &NodeId) -> Option<NodeKind> {
        self.get_node(id).map(Node::kind)
    }

    /// All nodes, ordered by id
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.node_map.values()
    }

    /// Top-level chapter ids in order
    #[inline]
    #[must_use]
    pub fn order(&self) -> &Vector<NodeId> {
        &self.order
    }

    /// Raw parent → ordered children map
    #[inline]
    #[must_use]
    pub fn children_order(&self) -> &OrdMap<NodeId, Vector<NodeId>> {
        &self.children_order
    }

    /// Sibling list owned by `parent`; `None` addresses the top level
    #[must_use]
    pub fn child_list(&self, parent: Option<&NodeId>) -> Option<&Vector<NodeId>> {
        match parent {
            None => Some(&self.order),
            Some(parent) => self.children_order.get(parent),
        }
    }

    /// Direct children of `id` in order
    pub fn children<'a>(&'a self, id: &NodeId) -> impl Iterator<Item = &'a NodeId> + 'a {
        self.children_order
            .get(id)
            .into_iter()
            .flat_map(|list| list.iter())
    }

    #[must_use]
    pub fn last_child(&self, id: &NodeId) -> Option<&NodeId> {
        self.children_order.get(id).and_then(|list| list.last())
    }

    #[inline]
    #[must_use]
    pub fn parent_of(&self, id: &NodeId) -> Option<&NodeId> {
        self.get_node(id).and_then(|n| n.parent_id.as_ref())
    }

    /// Parent chain of `id`, nearest first
    ///
    /// Stops after as many steps as there are nodes, so a corrupted parent
    /// cycle cannot loop forever.
    #[must_use]
    pub fn ancestors(&self, id: &NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent_of(id);
        while let Some(parent) = current {
            if out.len() >= self.node_map.len() {
                break;
            }
            out.push(parent.clone());
            current = self.parent_of(parent);
        }
        out
    }

    /// Nearest scene above `id`
    #[must_use]
    pub fn find_parent_scene_id(&self, id: &NodeId) -> Option<NodeId> {
        self.nearest_ancestor_of_kind(id, NodeKind::Scene)
    }

    /// Nearest chapter above `id`
    #[must_use]
    pub fn find_parent_chapter_id(&self, id: &NodeId) -> Option<NodeId> {
        self.nearest_ancestor_of_kind(id, NodeKind::Chapter)
    }

    fn nearest_ancestor_of_kind(&self, id: &NodeId, kind: NodeKind) -> Option<NodeId> {
        self.ancestors(id)
            .into_iter()
            .find(|a| self.kind_of(a) == Some(kind))
    }

    /// Last text passage of a scene
    #[must_use]
    pub fn last_text_id_in_scene(&self, scene_id: &NodeId) -> Option<NodeId> {
        self.last_child_of_kind(scene_id, NodeKind::Scene, NodeKind::Text)
    }

    /// Last scene of a chapter
    #[must_use]
    pub fn last_scene_id_in_chapter(&self, chapter_id: &NodeId) -> Option<NodeId> {
        self.last_child_of_kind(chapter_id, NodeKind::Chapter, NodeKind::Scene)
    }

    fn last_child_of_kind(&self, parent: &NodeId, parent_kind: NodeKind, kind: NodeKind) -> Option<NodeId> {
        if self.kind_of(parent) != Some(parent_kind) {
            return None;
        }
        self.children_order
            .get(parent)?
            .iter()
            .rev()
            .find(|c| self.kind_of(c) == Some(kind))
            .cloned()
    }

    /// `root` and everything below it, depth-first pre-order
    #[must_use]
    pub fn subtree_ids(&self, root: &NodeId) -> Vec<NodeId> {
        if !self.contains(root) {
            return Vec::new();
        }
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![root.clone()];
        while let Some(id) = stack.pop() {
            if !self.contains(&id) || !seen.insert(id.clone()) {
                continue;
            }
            if let Some(children) = self.children_order.get(&id) {
                stack.extend(children.iter().rev().cloned());
            }
            out.push(id);
        }
        out
    }

    /// Check whether `candidate` is `root` or one of its descendants
    #[must_use]
    pub fn is_in_subtree(&self, root: &NodeId, candidate: &NodeId) -> bool {
        self.subtree_ids(root).iter().any(|id| id == candidate)
    }

    /// Every reachable node in reading order
    #[must_use]
    pub fn document_order(&self) -> Vec<NodeId> {
        self.order
            .iter()
            .flat_map(|chapter| self.subtree_ids(chapter))
            .collect()
    }

    /// Insert or replace a node in the map; list membership is untouched
    pub fn insert_node(&mut self, node: Node) -> Option<Node> {
        self.node_map.insert(node.id.clone(), node)
    }

    #[inline]
    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.node_map.get_mut(id)
    }

    /// Put `id` into the list owned by `parent` at `placement`
    pub fn attach(&mut self, parent: Option<&NodeId>, id: NodeId, placement: &Placement) {
        let list = match parent {
            None => &mut self.order,
            Some(parent) => self
                .children_order
                .entry(parent.clone())
                .or_insert_with(Vector::new),
        };
        let index = placement.index_in(list);
        list.insert(index, id);
    }

    /// Take `id` out of the list its recorded parent owns
    ///
    /// Empty child lists are dropped so equal outlines compare equal.
    pub fn detach(&mut self, id: &NodeId) -> bool {
        let parent = match self.get_node(id) {
            Some(node) => node.parent_id.clone(),
            None => return false,
        };
        match parent {
            None => remove_from(&mut self.order, id),
            Some(parent) => {
                let Some(list) = self.children_order.get_mut(&parent) else {
                    return false;
                };
                let removed = remove_from(list, id);
                if list.is_empty() {
                    self.children_order.remove(&parent);
                }
                removed
            }
        }
    }

    /// Delete `root` and all descendants, returning the removed ids
    pub fn remove_subtree(&mut self, root: &NodeId) -> Vec<NodeId> {
        let ids = self.subtree_ids(root);
        if ids.is_empty() {
            return ids;
        }
        self.detach(root);
        for id in &ids {
            self.node_map.remove(id);
            self.children_order.remove(id);
        }
        ids
    }

    /// Replace the top-level order wholesale
    pub fn replace_order(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        self.order = ids.into_iter().collect();
    }

    /// Move one node's position by `offset`
    pub fn translate_node(&mut self, id: &NodeId, offset: Offset) -> bool {
        match self.node_map.get_mut(id) {
            Some(node) => {
                node.position = node.position.translated(offset);
                true
            }
            None => false,
        }
    }
}

fn remove_from(list: &mut Vector<NodeId>, id: &NodeId) -> bool {
    match list.index_of(id) {
        Some(index) => {
            list.remove(index);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Position;
    use crate::node::{Heading, NodeBody, PictureBody, TextBody};

    fn node(id: &str, parent: Option<&str>, body: NodeBody) -> Node {
        Node::with_id(
            NodeId::new(id),
            parent.map(NodeId::new),
            Position::origin(),
            body,
        )
    }

    fn sample() -> Story {
        Story::from_parts(
            "Sample",
            vec![
                node("c1", None, NodeBody::Chapter(Heading::titled("One"))),
                node("s1", Some("c1"), NodeBody::Scene(Heading::titled("Dock"))),
                node("t1", Some("s1"), NodeBody::Text(TextBody::new("a"))),
                node("t2", Some("s1"), NodeBody::Text(TextBody::new("b"))),
                node("p1", Some("t2"), NodeBody::Picture(PictureBody::default())),
                node("c2", None, NodeBody::Chapter(Heading::titled("Two"))),
            ],
            vec!["c1".into(), "c2".into()],
            vec![
                ("c1".into(), vec!["s1".into()]),
                ("s1".into(), vec!["t1".into(), "t2".into()]),
                ("t2".into(), vec!["p1".into()]),
            ],
        )
    }

    #[test]
    fn placement_indexes() {
        let list: Vector<NodeId> = vec![NodeId::new("a"), NodeId::new("b")].into_iter().collect();
        assert_eq!(Placement::append().index_in(&list), 2);
        assert_eq!(Placement::after("a".into()).index_in(&list), 1);
        assert_eq!(Placement::after("zz".into()).index_in(&list), 2);
        assert_eq!(Placement::at_start().index_in(&list), 0);

        let both = Placement {
            insert_after: Some("b".into()),
            at_start: true,
        };
        assert_eq!(both.index_in(&list), 0);
        assert_eq!(both.predecessor(&list), None);
        assert_eq!(Placement::after("a".into()).predecessor(&list), Some(&NodeId::new("a")));
    }

    #[test]
    fn lookups_are_total() {
        let story = sample();
        let missing = NodeId::new("nope");
        assert!(story.get_node(&missing).is_none());
        assert!(story.find_parent_scene_id(&missing).is_none());
        assert!(story.last_text_id_in_scene(&missing).is_none());
        assert!(story.subtree_ids(&missing).is_empty());
        assert_eq!(story.children(&missing).count(), 0);
        // wrong kind
        assert!(story.last_scene_id_in_chapter(&NodeId::new("s1")).is_none());
    }

    #[test]
    fn structural_queries() {
        let story = sample();
        let p1 = NodeId::new("p1");
        assert_eq!(story.find_parent_scene_id(&p1), Some(NodeId::new("s1")));
        assert_eq!(story.find_parent_chapter_id(&p1), Some(NodeId::new("c1")));
        assert_eq!(story.last_text_id_in_scene(&"s1".into()), Some(NodeId::new("t2")));
        assert_eq!(story.last_scene_id_in_chapter(&"c1".into()), Some(NodeId::new("s1")));
        assert_eq!(
            story.ancestors(&p1),
            vec![NodeId::new("t2"), NodeId::new("s1"), NodeId::new("c1")]
        );
        let order: Vec<_> = story.document_order().iter().map(|i| i.to_string()).collect();
        assert_eq!(order, ["c1", "s1", "t1", "t2", "p1", "c2"]);
        assert!(story.is_in_subtree(&"s1".into(), &p1));
        assert!(!story.is_in_subtree(&"t1".into(), &p1));
    }

    #[test]
    fn remove_subtree_unlinks_everything() {
        let mut story = sample();
        let before = story.clone();
        let removed = story.remove_subtree(&"t2".into());
        assert_eq!(removed, vec![NodeId::new("t2"), NodeId::new("p1")]);
        assert!(!story.contains(&"p1".into()));
        assert!(story.children_order().get(&NodeId::new("t2")).is_none());
        assert_eq!(story.children(&"s1".into()).count(), 1);
        // persistent: the original is untouched
        assert_eq!(before.len(), 6);
        assert!(before.contains(&"p1".into()));
    }

    #[test]
    fn detach_drops_empty_lists() {
        let mut story = sample();
        assert!(story.detach(&"p1".into()));
        assert!(story.children_order().get(&NodeId::new("t2")).is_none());
        assert!(!story.detach(&"p1".into()));
    }
}
