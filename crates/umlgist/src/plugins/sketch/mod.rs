//! Sketch layout engine
//!
//! A small reference engine for a Hylimo-flavoured class diagram language.
//! It produces the same layout tree shape a full engine would, which is all
//! the semantic analyzer needs.

mod layout;
mod parser;

pub use layout::SketchLayout;
pub use parser::{
    ClassifierDecl, ClassifierKind, ConnectionDecl, ConnectionOperator, LabelDecl, PackageDecl,
    Section, SketchParser, Statement, Visibility,
};

use tracing::{debug, info, span, warn, Level};

use crate::core::{EngineOutput, LayoutEngine, RenderConfig, RenderErrors};

/// Layout engine for the sketch class diagram language
#[derive(Debug, Clone, Copy, Default)]
pub struct SketchEngine {
    parser: SketchParser,
}

impl SketchEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LayoutEngine for SketchEngine {
    fn layout(&self, source: &str, config: &RenderConfig) -> EngineOutput {
        let layout_span = span!(Level::INFO, "sketch_layout", source_len = source.len());
        let _enter = layout_span.enter();

        let statements = match self.parser.parse_diagram(source) {
            Ok(statements) => statements,
            Err(diagnostics) => {
                warn!(error_count = diagnostics.len(), "Failed to parse diagram source");
                return EngineOutput::failed(RenderErrors {
                    parser: diagnostics,
                    ..RenderErrors::default()
                });
            }
        };
        debug!(statement_count = statements.len(), "Parsed diagram source");

        let (diagram, interpreter) = SketchLayout::new(config).run(&statements);
        if !interpreter.is_empty() {
            warn!(error_count = interpreter.len(), "Diagram references unknown elements");
        }
        info!(points = diagram.points.len(), lines = diagram.lines.len(), "Layout completed");

        let mut output = EngineOutput::diagram(diagram);
        output.errors.interpreter = interpreter;
        output
    }

    fn name(&self) -> &'static str {
        "sketch"
    }
}
