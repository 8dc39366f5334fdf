//! Output generation for query snapshots.
//!
//! # Submodules
//!
//! - [`json`]: Writes a [`QueryState`](crate::models::QueryState) snapshot to a JSON file
//! - [`text`]: Renders a snapshot for the terminal in grid, list, or compact layout,
//!   plus a detail view for a single article

pub mod json;
pub mod text;
