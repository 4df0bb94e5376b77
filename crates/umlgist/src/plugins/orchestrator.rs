//! Pipeline orchestrator
//!
//! The orchestrator runs diagram source through the whole pipeline:
//! Layout engine → Semantic analyzer → Semantic model generator

use anyhow::Result;
use tracing::{debug, info, span, warn, Level};

use crate::core::{
    DiagramError, Diagnostic, LayoutEngine, LayoutedDiagram, RenderConfig, RenderErrors,
};
use crate::semantic::{
    AnalysisResult, CompactSemanticModel, SemanticAnalyzer, SemanticModelGenerator,
};

use super::sketch::SketchEngine;

/// Runs a layout engine, the analyzer and the generator in sequence
///
/// The engine is swappable so callers with their own layout engine can
/// reuse the semantic stages unchanged.
pub struct Orchestrator {
    engine: Box<dyn LayoutEngine>,
    config: RenderConfig,
    analyzer: SemanticAnalyzer,
    generator: SemanticModelGenerator,
}

impl Orchestrator {
    /// Create an orchestrator around a layout engine
    pub fn new(engine: Box<dyn LayoutEngine>, config: RenderConfig) -> Self {
        Self {
            engine,
            config,
            analyzer: SemanticAnalyzer::new(),
            generator: SemanticModelGenerator::new(),
        }
    }

    /// Create an orchestrator using the built-in sketch engine
    pub fn with_sketch_engine(config: RenderConfig) -> Self {
        Self::new(Box::new(SketchEngine::new()), config)
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Lay out source without analyzing it
    ///
    /// Fails when the engine reports any error.
    pub fn layout(&self, source: &str) -> Result<LayoutedDiagram> {
        let layout_span = span!(Level::INFO, "pipeline_layout", engine = self.engine.name());
        let _enter = layout_span.enter();

        let output = self.engine.layout(source, &self.config);
        if !output.errors.is_empty() {
            warn!(error_count = output.errors.len(), "Layout engine reported errors");
            return Err(layout_failure(output.errors).into());
        }
        output
            .diagram
            .ok_or_else(|| DiagramError::layout_error("engine produced no diagram").into())
    }

    /// Lay out and analyze source, keeping engine errors in the result
    pub fn analyze(&self, source: &str) -> Result<AnalysisResult> {
        let result = self
            .analyzer
            .analyze_source(self.engine.as_ref(), source, &self.config)?;
        debug!(
            error_count = result.errors.len(),
            has_graph = result.graph.is_some(),
            "Source analyzed"
        );
        Ok(result)
    }

    /// Run the complete pipeline on diagram source
    pub fn summarize(&self, source: &str) -> Result<CompactSemanticModel> {
        let summarize_span = span!(Level::INFO, "summarize", source_len = source.len());
        let _enter = summarize_span.enter();

        info!(engine = self.engine.name(), "Starting semantic summary");
        let result = self.analyze(source)?;
        let model = self.generator.generate(&result)?;
        info!(
            nodes = model.node_entry_count(),
            associations = model.associations.len(),
            "Semantic summary completed"
        );
        Ok(model)
    }

    /// Summarize an already laid out diagram
    pub fn summarize_layout(&self, diagram: &LayoutedDiagram) -> Result<CompactSemanticModel> {
        let summarize_span = span!(Level::INFO, "summarize_layout", root = %diagram.root.id);
        let _enter = summarize_span.enter();

        let graph = self.analyzer.analyze(diagram)?;
        Ok(self.generator.convert(&graph))
    }

    /// Summarize a laid out diagram given as JSON
    pub fn summarize_layout_json(&self, json: &str) -> Result<CompactSemanticModel> {
        let diagram = LayoutedDiagram::from_json(json).map_err(DiagramError::from)?;
        self.summarize_layout(&diagram)
    }
}

/// A lone located parse error is reported as such, anything else in bulk
fn layout_failure(errors: RenderErrors) -> DiagramError {
    match errors.parser.as_slice() {
        [Diagnostic {
            message,
            line: Some(line),
            column: Some(column),
        }] if errors.len() == 1 => DiagramError::parse_error(message.clone(), *line, *column),
        _ => DiagramError::Render(errors),
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::with_sketch_engine(RenderConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EngineOutput;

    /// Engine that always fails with a layout error
    struct BrokenEngine;

    impl LayoutEngine for BrokenEngine {
        fn layout(&self, _source: &str, _config: &RenderConfig) -> EngineOutput {
            let mut errors = RenderErrors::default();
            errors.layout.push(Diagnostic::new("no room on canvas"));
            EngineOutput::failed(errors)
        }

        fn name(&self) -> &'static str {
            "broken"
        }
    }

    #[test]
    fn test_default_uses_sketch_engine() {
        let orchestrator = Orchestrator::default();
        assert_eq!(orchestrator.engine_name(), "sketch");
        assert_eq!(orchestrator.config().columns, 3);
    }

    #[test]
    fn test_summarize_simple_diagram() {
        let model = Orchestrator::default()
            .summarize(r#"classDiagram { class("A") { public { x : int } } }"#)
            .unwrap();
        assert_eq!(model.classes.len(), 1);
        assert_eq!(model.classes[0].members, vec!["x : int".to_string()]);
    }

    #[test]
    fn test_summarize_surfaces_render_errors() {
        let orchestrator = Orchestrator::new(Box::new(BrokenEngine), RenderConfig::default());
        let err = orchestrator.summarize("anything").unwrap_err();
        let diagram_error = err.downcast_ref::<DiagramError>().unwrap();
        assert!(matches!(diagram_error, DiagramError::Render(_)));
        assert!(orchestrator.layout("anything").is_err());
    }

    #[test]
    fn test_layout_reports_single_parse_error_with_location() {
        let err = Orchestrator::default()
            .layout("classDiagram {\n  class(")
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DiagramError>(),
            Some(DiagramError::Parse { line, .. }) if *line >= 1
        ));
    }

    #[test]
    fn test_summarize_layout_json_reports_json_errors() {
        let err = Orchestrator::default()
            .summarize_layout_json("{ not json")
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DiagramError>(),
            Some(DiagramError::Json { .. })
        ));
    }

    #[test]
    fn test_analyze_keeps_errors() {
        let orchestrator = Orchestrator::new(Box::new(BrokenEngine), RenderConfig::default());
        let result = orchestrator.analyze("anything").unwrap();
        assert!(result.graph.is_none());
        assert_eq!(result.errors.layout.len(), 1);
    }

    #[test]
    fn test_layout_then_summarize_layout_matches_summarize() {
        let source = r#"classDiagram { class("A") enum("E") { X } A --> E }"#;
        let orchestrator = Orchestrator::default();
        let diagram = orchestrator.layout(source).unwrap();
        assert_eq!(
            orchestrator.summarize_layout(&diagram).unwrap(),
            orchestrator.summarize(source).unwrap()
        );
    }
}
