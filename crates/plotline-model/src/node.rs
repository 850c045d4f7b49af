//! Outline nodes
//!
//! A [`Node`] carries the fields every node shares (id, owning parent,
//! canvas position) plus a [`NodeBody`] holding the variant payload. The
//! body is a tagged sum type; consumers match on it exhaustively.

use crate::geometry::Position;
use crate::id::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

/// Node variant tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Chapter,
    Scene,
    Text,
    Picture,
    Annotation,
    Event,
}

impl NodeKind {
    /// Every kind, in outline depth order
    pub const ALL: [NodeKind; 6] = [
        NodeKind::Chapter,
        NodeKind::Scene,
        NodeKind::Text,
        NodeKind::Picture,
        NodeKind::Annotation,
        NodeKind::Event,
    ];

    /// Media kinds attach to chapters, scenes or texts and never own children
    #[inline]
    #[must_use]
    pub fn is_media(self) -> bool {
        matches!(
            self,
            NodeKind::Picture | NodeKind::Annotation | NodeKind::Event
        )
    }

    /// Lowercase tag used in snapshots
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Chapter => "chapter",
            NodeKind::Scene => "scene",
            NodeKind::Text => "text",
            NodeKind::Picture => "picture",
            NodeKind::Annotation => "annotation",
            NodeKind::Event => "event",
        }
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialized rich-text document
///
/// Produced and consumed by the editing widgets; the engine stores it
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText(pub String);

impl RichText {
    #[inline]
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self(content.into())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Title block shared by chapters and scenes
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Heading {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Heading {
    /// Heading with a title and no description
    #[inline]
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Decorative sticker pinned to a text passage
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Sticker {
    /// Sticker artwork name
    pub glyph: String,
    /// Rotation in degrees
    #[serde(default)]
    pub rotation: f64,
}

/// Text passage payload
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextBody {
    #[serde(default)]
    pub text: RichText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticker: Option<Sticker>,
}

impl TextBody {
    #[inline]
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: RichText::new(text),
            ..Self::default()
        }
    }
}

/// Picture payload; the binary content lives in the external image store
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PictureBody {
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Free-form note attached to another node
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnnotationBody {
    #[serde(default)]
    pub text: RichText,
}

/// Dated story event
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventBody {
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u8>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
}

impl EventBody {
    /// Event in `year` with no month or day
    #[inline]
    #[must_use]
    pub fn in_year(year: i32, title: impl Into<String>) -> Self {
        Self {
            year,
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Variant payload, discriminated by the `type` tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeBody {
    Chapter(Heading),
    Scene(Heading),
    Text(TextBody),
    Picture(PictureBody),
    Annotation(AnnotationBody),
    Event(EventBody),
}

impl NodeBody {
    /// Tag of this payload
    #[inline]
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeBody::Chapter(_) => NodeKind::Chapter,
            NodeBody::Scene(_) => NodeKind::Scene,
            NodeBody::Text(_) => NodeKind::Text,
            NodeBody::Picture(_) => NodeKind::Picture,
            NodeBody::Annotation(_) => NodeKind::Annotation,
            NodeBody::Event(_) => NodeKind::Event,
        }
    }

    /// Display title, where the variant has one
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        match self {
            NodeBody::Chapter(h) | NodeBody::Scene(h) => Some(&h.title),
            NodeBody::Event(e) => Some(&e.title),
            NodeBody::Text(_) | NodeBody::Picture(_) | NodeBody::Annotation(_) => None,
        }
    }
}

/// One addressable unit of the outline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    #[serde(default)]
    pub position: Position,
    #[serde(flatten)]
    pub body: NodeBody,
}

impl Node {
    /// New node with a freshly generated id
    #[inline]
    #[must_use]
    pub fn new(parent_id: Option<NodeId>, position: Position, body: NodeBody) -> Self {
        Self::with_id(NodeId::generate(), parent_id, position, body)
    }

    /// New node with a caller-chosen id
    #[inline]
    #[must_use]
    pub fn with_id(
        id: NodeId,
        parent_id: Option<NodeId>,
        position: Position,
        body: NodeBody,
    ) -> Self {
        Self {
            id,
            parent_id,
            position,
            body,
        }
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.body.kind()
    }
}
