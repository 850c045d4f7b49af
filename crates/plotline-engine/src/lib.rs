//! Plotline Engine
//!
//! Mutation, reparenting and history for a story outline.
//!
//! # Architecture
//!
//! ```text
//! OutlineEngine
//!   ├── actions     create / update / delete (pure, story in → story out)
//!   ├── reparent    move_node, reorder_chapters
//!   ├── connect     valid connect targets for a source node
//!   ├── remeasure   size reports → shift propagation, echo suppression
//!   └── history     bounded past/future snapshots + suppression flag
//! ```
//!
//! All operations are synchronous and single-threaded. Failed operations
//! return an [`EngineError`] and leave the story and history untouched.
//!
//! # Example
//!
//! ```rust,ignore
//! use plotline_engine::prelude::*;
//!
//! let mut engine = OutlineEngine::default();
//! let chapter = engine.create_chapter(&Placement::append(), Heading::titled("One"))?;
//! let scene = engine.create_scene(&chapter, &Placement::append(), Heading::titled("Arrival"))?;
//! engine.create_text(&scene, &Placement::append(), TextBody::new("It rained."))?;
//! assert!(engine.undo());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod config;
mod engine;
mod error;
mod history;
mod images;

pub mod actions;
pub mod connect;
pub mod remeasure;
pub mod reparent;

pub use config::{ConfigError, EngineConfig};
pub use connect::{compute_targets, ConnectAction, ConnectTarget};
pub use engine::{DragSession, HistoryMode, OutlineEngine};
pub use error::EngineError;
pub use history::{HistoryManager, HistorySnapshot, DEFAULT_HISTORY_CAPACITY};
pub use images::ImageStore;
pub use remeasure::{RemeasureOutcome, RemeasureTracker};
pub use reparent::{can_move, move_node, reorder_chapters, validate_move, MoveSpec};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        ConnectAction, ConnectTarget, EngineConfig, EngineError, HistoryMode, MoveSpec,
        OutlineEngine, RemeasureOutcome,
    };
    pub use plotline_layout::{LayoutConfig, MeasuredSizes, SizeCache};
    pub use plotline_model::{
        AnnotationBody, EventBody, Heading, HeadingPatch, Node, NodeBody, NodeId, NodeKind,
        NodePatch, PictureBody, Placement, Position, Size, Story, TextBody, TextPatch,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
