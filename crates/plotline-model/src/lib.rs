//! Plotline Model
//!
//! The story outline as data: typed nodes on a canvas, arranged in an
//! ordered tree (story → chapters → scenes → texts, with media attached).
//!
//! # Core Concepts
//!
//! - [`Story`]: persistent root aggregate (node map, chapter order, child lists)
//! - [`Node`] / [`NodeBody`]: shared node fields plus a tagged variant payload
//! - [`rules`]: which kind may hang under which
//! - [`NodePatch`]: kind-checked partial updates
//! - [`Placement`]: where an id lands in a sibling list
//!
//! # Example
//!
//! ```rust,ignore
//! use plotline_model::{Story, Node, NodeBody, Heading, Placement, Position};
//!
//! let mut story = Story::new("Saga");
//! let chapter = Node::new(None, Position::origin(), NodeBody::Chapter(Heading::titled("One")));
//! let id = chapter.id.clone();
//! story.insert_node(chapter);
//! story.attach(None, id, &Placement::append());
//! assert!(story.check_invariants().is_ok());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod geometry;
mod id;
mod invariants;
mod node;
mod patch;
mod snapshot;
mod story;

pub mod rules;

pub use geometry::{Offset, Position, Size};
pub use id::NodeId;
pub use invariants::InvariantViolation;
pub use node::{
    AnnotationBody, EventBody, Heading, Node, NodeBody, NodeKind, PictureBody, RichText, Sticker,
    TextBody,
};
pub use patch::{
    AnnotationPatch, EventPatch, HeadingPatch, KindMismatch, NodePatch, PicturePatch, TextPatch,
};
pub use snapshot::SnapshotError;
pub use story::{Placement, Story};

/// Persistent vector type used for ordered id lists
pub use im::Vector;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
