//! umlgist - Extract the semantic gist of laid-out UML class diagrams
//!
//! A library that reads the layout tree of a rendered class diagram, rebuilds
//! the graph of boxes and connections, and condenses it into a compact JSON
//! model of classes, interfaces, enums, packages, comments and associations.
//!
//! # Quick Start
//!
//! ```rust
//! use umlgist::summarize;
//!
//! let model = summarize(r#"classDiagram { class("HelloWorld") { public { hello : string } } }"#).unwrap();
//! assert_eq!(model.classes[0].name, "HelloWorld");
//! assert_eq!(model.classes[0].members, vec!["hello : string".to_string()]);
//! ```
//!
//! # Advanced Usage
//!
//! Each stage can be driven on its own:
//!
//! ```rust
//! use umlgist::prelude::*;
//!
//! let engine = SketchEngine::new();
//! let output = engine.layout(
//!     r#"classDiagram { interface("Shape") class("Circle") Circle implements Shape }"#,
//!     &RenderConfig::default(),
//! );
//! let diagram = output.diagram.unwrap();
//!
//! // Rebuild the graph from the layout tree
//! let graph = SemanticAnalyzer::new().analyze(&diagram).unwrap();
//! assert_eq!(graph.node_count(), 2);
//! assert_eq!(graph.edge_count(), 1);
//!
//! // Flatten it into the compact model
//! let model = SemanticModelGenerator::new().convert(&graph);
//! assert_eq!(model.associations[0].relationship_type, RelationshipType::Realization);
//! ```

pub mod core;
pub mod plugins;
pub mod semantic;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use core::*;
pub use semantic::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        DiagramError, EngineOutput, LayoutElement, LayoutEngine, LayoutedDiagram, RenderConfig,
        RenderErrors, Theme,
    };
    pub use crate::plugins::{Orchestrator, SketchEngine};
    pub use crate::semantic::{
        AnalysisResult, AttachmentPosition, CompactSemanticModel, Graph, NodeKind,
        RelationshipType, SemanticAnalyzer, SemanticModelGenerator,
    };
}

/// Summarize class diagram source with the built-in sketch engine
///
/// # Arguments
/// * `source` - Class diagram source (e.g., `classDiagram { class("A") }`)
///
/// # Returns
/// * `Ok(CompactSemanticModel)` - The compact semantic model
/// * `Err` - If the source has parse, interpreter or layout errors
pub fn summarize(source: &str) -> anyhow::Result<CompactSemanticModel> {
    plugins::Orchestrator::default().summarize(source)
}

/// Summarize class diagram source with a specific render configuration
///
/// # Example
/// ```rust
/// use umlgist::{summarize_with_config, RenderConfig, Theme};
///
/// let model = summarize_with_config(r#"classDiagram { enum("Color") { RED; GREEN } }"#, RenderConfig::new(Theme::Dark)).unwrap();
/// assert_eq!(model.enums[0].values, vec!["RED".to_string(), "GREEN".to_string()]);
/// ```
pub fn summarize_with_config(
    source: &str,
    config: RenderConfig,
) -> anyhow::Result<CompactSemanticModel> {
    plugins::Orchestrator::with_sketch_engine(config).summarize(source)
}

/// Summarize a layouted diagram given as JSON, whatever engine produced it
///
/// # Example
/// ```rust
/// use umlgist::summarize_layout;
///
/// let json = r#"{ "root": { "id": "root", "type": "canvas" } }"#;
/// let model = summarize_layout(json).unwrap();
/// assert!(model.classes.is_empty());
/// ```
pub fn summarize_layout(json: &str) -> anyhow::Result<CompactSemanticModel> {
    plugins::Orchestrator::default().summarize_layout_json(json)
}

/// Lay out and analyze source, keeping render errors in the result
pub fn analyze(source: &str) -> anyhow::Result<AnalysisResult> {
    plugins::Orchestrator::default().analyze(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_hello_world() {
        let model =
            summarize(r#"classDiagram { class("HelloWorld") { public { hello : string } } }"#)
                .unwrap();
        assert_eq!(
            model.classes,
            vec![CompactClass {
                name: "HelloWorld".to_string(),
                members: vec!["hello : string".to_string()],
                is_abstract: false,
            }]
        );
        assert!(model.enums.is_empty());
        assert!(model.interfaces.is_empty());
        assert!(model.packages.is_empty());
        assert!(model.comments.is_empty());
        assert!(model.associations.is_empty());
    }

    #[test]
    fn test_summarize_rejects_invalid_source() {
        assert!(summarize("classDiagram {").is_err());
    }

    #[test]
    fn test_analyze_reports_errors_without_failing() {
        let result = analyze(r#"classDiagram { class("A") A --> Nope }"#).unwrap();
        assert_eq!(result.errors.interpreter.len(), 1);
        assert!(result.graph.is_some());
    }
}
