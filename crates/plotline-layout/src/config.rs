//! Layout constants
//!
//! Defaults reproduce the canvas spacing the outline editor ships with.
//! Every field can be overridden from configuration; missing keys fall back
//! to the defaults.

use plotline_model::{NodeKind, Position};
use serde::{Deserialize, Serialize};

/// Fallback heights for nodes the renderer has not measured yet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultHeights {
    pub chapter: f64,
    pub scene: f64,
    pub text: f64,
    pub picture: f64,
    pub annotation: f64,
    pub event: f64,
}

impl DefaultHeights {
    /// Fallback height for `kind`
    #[inline]
    #[must_use]
    pub fn for_kind(&self, kind: NodeKind) -> f64 {
        match kind {
            NodeKind::Chapter => self.chapter,
            NodeKind::Scene => self.scene,
            NodeKind::Text => self.text,
            NodeKind::Picture => self.picture,
            NodeKind::Annotation => self.annotation,
            NodeKind::Event => self.event,
        }
    }
}

impl Default for DefaultHeights {
    fn default() -> Self {
        Self {
            chapter: 120.0,
            scene: 120.0,
            text: 160.0,
            picture: 140.0,
            annotation: 120.0,
            event: 120.0,
        }
    }
}

/// Spacing used by positioning and insertion shifts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Vertical gap below an anchor's midline for a new node
    pub buffer_y: f64,
    /// Horizontal distance from a chapter's deepest-last node to the next chapter
    pub chapter_gap_x: f64,
    /// Shift applied to following nodes when a text is inserted
    pub insert_gap_text_y: f64,
    /// Shift applied to following nodes when a scene is inserted
    pub insert_gap_scene_y: f64,
    /// Shift applied to following chapters when a chapter is inserted
    pub insert_gap_chapter_x: f64,
    /// Where the first chapter of an empty story lands
    pub origin: Position,
    pub default_heights: DefaultHeights,
}

impl LayoutConfig {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with_buffer_y(mut self, buffer_y: f64) -> Self {
        self.buffer_y = buffer_y;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_origin(mut self, origin: Position) -> Self {
        self.origin = origin;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_default_heights(mut self, heights: DefaultHeights) -> Self {
        self.default_heights = heights;
        self
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            buffer_y: 200.0,
            chapter_gap_x: 1500.0,
            insert_gap_text_y: 300.0,
            insert_gap_scene_y: 300.0,
            insert_gap_chapter_x: 1600.0,
            origin: Position::origin(),
            default_heights: DefaultHeights::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = LayoutConfig::default();
        assert_eq!(config.buffer_y, 200.0);
        assert_eq!(config.chapter_gap_x, 1500.0);
        assert_eq!(config.insert_gap_chapter_x, 1600.0);
        assert_eq!(config.default_heights.for_kind(NodeKind::Text), 160.0);
        assert_eq!(config.default_heights.for_kind(NodeKind::Picture), 140.0);
        assert_eq!(config.default_heights.for_kind(NodeKind::Event), 120.0);
    }
}
