//! Layout engine abstraction
//!
//! A layout engine turns diagram source text into a [`LayoutedDiagram`].
//! Engines never fail outright: problems are reported through
//! [`RenderErrors`] next to whatever diagram could be produced.

use serde::{Deserialize, Serialize};

use super::config::RenderConfig;
use super::layout::{LayoutedDiagram, RenderErrors};

/// Result of one layout engine run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagram: Option<LayoutedDiagram>,
    #[serde(default)]
    pub errors: RenderErrors,
}

impl EngineOutput {
    /// Output for a successful run
    pub fn diagram(diagram: LayoutedDiagram) -> Self {
        Self {
            diagram: Some(diagram),
            errors: RenderErrors::default(),
        }
    }

    /// Output for a run that produced no diagram
    pub fn failed(errors: RenderErrors) -> Self {
        Self {
            diagram: None,
            errors,
        }
    }
}

/// Core trait for layout engines
pub trait LayoutEngine: Send + Sync {
    /// Lay out the diagram described by `source`
    fn layout(&self, source: &str, config: &RenderConfig) -> EngineOutput;

    /// Get the name of this engine
    fn name(&self) -> &'static str;
}
