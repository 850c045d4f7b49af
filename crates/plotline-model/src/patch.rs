//! Partial field updates
//!
//! Every patch field is optional. Nullable node fields use
//! `Option<Option<T>>`: `None` leaves the field alone, `Some(None)` clears
//! it. Position is deliberately absent; it only changes through move and
//! drag paths.

use crate::node::{Node, NodeBody, NodeKind, RichText, Sticker};
use std::collections::BTreeSet;

/// Patch for chapter and scene headings
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeadingPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
}

impl HeadingPatch {
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }
}

/// Patch for text passages
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextPatch {
    pub text: Option<RichText>,
    pub summary: Option<Option<String>>,
    pub tags: Option<BTreeSet<String>>,
    pub sticker: Option<Option<Sticker>>,
}

impl TextPatch {
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(RichText::new(text));
        self
    }

    #[must_use]
    pub fn summary(mut self, summary: Option<String>) -> Self {
        self.summary = Some(summary);
        self
    }

    #[must_use]
    pub fn tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn sticker(mut self, sticker: Option<Sticker>) -> Self {
        self.sticker = Some(sticker);
        self
    }
}

/// Patch for pictures
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PicturePatch {
    pub description: Option<String>,
    pub url: Option<Option<String>>,
}

/// Patch for annotations
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnnotationPatch {
    pub text: Option<RichText>,
}

/// Patch for events
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventPatch {
    pub year: Option<i32>,
    pub month: Option<Option<u8>>,
    pub day: Option<Option<u8>>,
    pub title: Option<String>,
    pub tags: Option<BTreeSet<String>>,
}

/// Kind-tagged patch; the tag is the kind the caller expects to edit
#[derive(Debug, Clone, PartialEq)]
pub enum NodePatch {
    Chapter(HeadingPatch),
    Scene(HeadingPatch),
    Text(TextPatch),
    Picture(PicturePatch),
    Annotation(AnnotationPatch),
    Event(EventPatch),
}

impl NodePatch {
    /// Kind this patch applies to
    #[inline]
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            NodePatch::Chapter(_) => NodeKind::Chapter,
            NodePatch::Scene(_) => NodeKind::Scene,
            NodePatch::Text(_) => NodeKind::Text,
            NodePatch::Picture(_) => NodeKind::Picture,
            NodePatch::Annotation(_) => NodeKind::Annotation,
            NodePatch::Event(_) => NodeKind::Event,
        }
    }
}

/// Patch kind differs from the node kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("patch for {expected} applied to {actual}")]
pub struct KindMismatch {
    pub expected: NodeKind,
    pub actual: NodeKind,
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

impl Node {
    /// Merge `patch` into this node's payload
    ///
    /// # Errors
    /// Returns [`KindMismatch`] without touching the node when the patch
    /// targets a different kind.
    pub fn apply_patch(&mut self, patch: NodePatch) -> Result<(), KindMismatch> {
        let actual = self.kind();
        match (&mut self.body, patch) {
            (NodeBody::Chapter(h), NodePatch::Chapter(p)) | (NodeBody::Scene(h), NodePatch::Scene(p)) => {
                set(&mut h.title, p.title);
                set(&mut h.description, p.description);
            }
            (NodeBody::Text(t), NodePatch::Text(p)) => {
                set(&mut t.text, p.text);
                set(&mut t.summary, p.summary);
                set(&mut t.tags, p.tags);
                set(&mut t.sticker, p.sticker);
            }
            (NodeBody::Picture(pic), NodePatch::Picture(p)) => {
                set(&mut pic.description, p.description);
                set(&mut pic.url, p.url);
            }
            (NodeBody::Annotation(a), NodePatch::Annotation(p)) => {
                set(&mut a.text, p.text);
            }
            (NodeBody::Event(e), NodePatch::Event(p)) => {
                set(&mut e.year, p.year);
                set(&mut e.month, p.month);
                set(&mut e.day, p.day);
                set(&mut e.title, p.title);
                set(&mut e.tags, p.tags);
            }
            (_, patch) => {
                return Err(KindMismatch {
                    expected: patch.kind(),
                    actual,
                })
            }
        }
        Ok(())
    }
}
