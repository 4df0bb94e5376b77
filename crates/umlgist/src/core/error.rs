//! Core error types for diagram analysis
//!
//! This module defines the error type shared by the layout, analysis and
//! model-generation stages.

use thiserror::Error;

use super::layout::RenderErrors;

/// Core error types for diagram analysis
#[derive(Error, Debug)]
pub enum DiagramError {
    #[error("Parse error: {message} at line {line}, column {column}")]
    Parse {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Layout error: {message}")]
    Layout { message: String },

    #[error("Root element '{id}' is not a canvas (found {found})")]
    NotCanvas { id: String, found: String },

    #[error("Diagram has {} render error(s): {0}", .0.len())]
    Render(RenderErrors),

    #[error("No graph was produced for the diagram")]
    MissingGraph,

    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl DiagramError {
    /// Create a new parse error
    pub fn parse_error(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::Parse {
            message: message.into(),
            line,
            column,
        }
    }

    /// Create a new layout error
    pub fn layout_error(message: impl Into<String>) -> Self {
        Self::Layout {
            message: message.into(),
        }
    }

    /// Create a new error for a layout root that is not a canvas
    pub fn not_canvas(id: impl Into<String>, found: impl Into<String>) -> Self {
        Self::NotCanvas {
            id: id.into(),
            found: found.into(),
        }
    }
}
