//! Plotline Layout
//!
//! Canvas placement for the story outline:
//! - [`positioning`]: where a freshly created node first appears
//! - [`shift`]: moving everything that follows a grown or inserted node
//! - [`SizeCache`]: read-only view of the renderer's measurements
//! - [`LayoutConfig`]: spacing constants
//!
//! Every function here is pure over a [`plotline_model::Story`] or mutates a
//! caller-owned working copy; nothing keeps state between calls.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod config;
mod size_cache;

pub mod positioning;
pub mod shift;

pub use config::{DefaultHeights, LayoutConfig};
pub use positioning::{deepest_last_id, initial_position, position_below, position_for_chapter_after};
pub use shift::{propagate_shift, translate_subtree, ShiftContext};
pub use size_cache::{MeasuredSizes, SizeCache};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
