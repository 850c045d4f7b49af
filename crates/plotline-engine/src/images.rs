//! External image set
//!
//! Binary content for picture nodes lives outside the story. The engine
//! never interprets it; it only snapshots and restores the mapping together
//! with the story so undo brings both back in step.

use im::OrdMap;
use plotline_model::NodeId;
use std::sync::Arc;

/// Node id → opaque image bytes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageStore {
    images: OrdMap<NodeId, Arc<[u8]>>,
}

impl ImageStore {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store bytes for `id`, returning what was there before
    pub fn insert(&mut self, id: NodeId, bytes: impl Into<Arc<[u8]>>) -> Option<Arc<[u8]>> {
        self.images.insert(id, bytes.into())
    }

    #[inline]
    #[must_use]
    pub fn get(&self, id: &NodeId) -> Option<&Arc<[u8]>> {
        self.images.get(id)
    }

    pub fn remove(&mut self, id: &NodeId) -> Option<Arc<[u8]>> {
        self.images.remove(id)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.images.contains_key(id)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Ids that currently have content
    pub fn ids(&self) -> impl Iterator<Item = &NodeId> + '_ {
        self.images.keys()
    }

    /// Drop entries for every id in `removed`; returns how many were dropped
    pub fn prune<'a>(&mut self, removed: impl IntoIterator<Item = &'a NodeId>) -> usize {
        removed
            .into_iter()
            .filter(|id| self.images.remove(*id).is_some())
            .count()
    }
}
