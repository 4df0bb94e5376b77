//! Core abstractions for diagram analysis
//!
//! Layout engines, the layout tree they produce, geometry, configuration,
//! errors and logging.

pub mod chumsky_utils;
mod config;
mod engine;
mod error;
mod geometry;
mod layout;
pub mod logging;

pub use config::*;
pub use engine::*;
pub use error::*;
pub use geometry::*;
pub use layout::*;
pub use logging::*;
