//! Layout engine plugins and the pipeline orchestrator
//!
//! Each engine implements [`crate::core::LayoutEngine`] for one diagram
//! language.

pub mod orchestrator;
pub mod sketch;

pub use orchestrator::*;
pub use sketch::*;
