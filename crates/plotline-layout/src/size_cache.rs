//! Measured node sizes
//!
//! The renderer owns measurement. Layout code only reads heights back
//! through [`SizeCache`]; it never measures anything itself.

use plotline_model::{NodeId, Size};
use std::collections::HashMap;

/// Lookup of rendered sizes, written by the host after each measurement
pub trait SizeCache {
    /// Last measured height, if the node has been measured
    fn height(&self, id: &NodeId) -> Option<f64>;

    /// Record a fresh measurement
    fn set_size(&mut self, id: &NodeId, size: Size);

    /// Drop the entry for a node that no longer exists
    fn forget(&mut self, id: &NodeId);
}

/// In-memory [`SizeCache`]
#[derive(Debug, Clone, Default)]
pub struct MeasuredSizes {
    sizes: HashMap<NodeId, Size>,
}

impl MeasuredSizes {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Full recorded size
    #[inline]
    #[must_use]
    pub fn size(&self, id: &NodeId) -> Option<Size> {
        self.sizes.get(id).copied()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

impl SizeCache for MeasuredSizes {
    fn height(&self, id: &NodeId) -> Option<f64> {
        self.sizes.get(id).map(|s| s.height)
    }

    fn set_size(&mut self, id: &NodeId, size: Size) {
        self.sizes.insert(id.clone(), size);
    }

    fn forget(&mut self, id: &NodeId) {
        self.sizes.remove(id);
    }
}
