//! Error handling tests
//!
//! Render errors, malformed layout documents and error formatting.

use umlgist::prelude::*;
use umlgist::{analyze, summarize, summarize_layout, Diagnostic};

#[test]
fn test_parse_error_has_location() {
    let result = analyze("classDiagram {\n  class(\"A\") {\n    public { x : int }\n").unwrap();
    assert!(result.graph.is_none());
    assert!(!result.errors.parser.is_empty());
    let diagnostic = &result.errors.parser[0];
    assert!(diagnostic.line.is_some());
    assert!(diagnostic.column.is_some());
}

#[test]
fn test_missing_header_is_a_parse_error() {
    let result = analyze(r#"class("A")"#).unwrap();
    assert_eq!(result.errors.parser[0].line, Some(1));
    assert!(result.errors.interpreter.is_empty());
}

#[test]
fn test_unknown_identifier_is_an_interpreter_error() {
    let result = analyze(r#"classDiagram { class("A") A --> B }"#).unwrap();
    assert!(result.errors.parser.is_empty());
    assert_eq!(result.errors.interpreter.len(), 1);
    assert!(result.errors.interpreter[0].message.contains("'B'"));
}

#[test]
fn test_summarize_refuses_render_errors() {
    let err = summarize(r#"classDiagram { class("A") A --> B }"#).unwrap_err();
    match err.downcast_ref::<DiagramError>() {
        Some(DiagramError::Render(errors)) => assert_eq!(errors.len(), 1),
        other => panic!("Expected render error, got {:?}", other),
    }
}

#[test]
fn test_render_error_message_lists_diagnostics() {
    let err = summarize("classDiagram").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("render error"));
    assert!(message.contains("1:"));
}

#[test]
fn test_layout_root_must_be_canvas() {
    let err = summarize_layout(r#"{ "root": { "id": "r", "type": "rect" } }"#).unwrap_err();
    match err.downcast_ref::<DiagramError>() {
        Some(DiagramError::NotCanvas { id, found }) => {
            assert_eq!(id, "r");
            assert_eq!(found, "rect");
        }
        other => panic!("Expected not-canvas error, got {:?}", other),
    }
}

#[test]
fn test_malformed_layout_json() {
    assert!(summarize_layout("{").is_err());
    assert!(summarize_layout(r#"{ "points": {} }"#).is_err());
}

#[test]
fn test_diagram_error_display() {
    let error = DiagramError::parse_error("expected '}'", 3, 7);
    assert_eq!(error.to_string(), "Parse error: expected '}' at line 3, column 7");

    let mut errors = RenderErrors::default();
    errors.interpreter.push(Diagnostic::new("Unknown identifier 'B'"));
    let error = DiagramError::Render(errors);
    assert!(error.to_string().contains("Unknown identifier 'B'"));
}

#[test]
fn test_generator_requires_graph() {
    let result = AnalysisResult {
        errors: RenderErrors::default(),
        graph: None,
    };
    assert!(matches!(
        SemanticModelGenerator::new().generate(&result),
        Err(DiagramError::MissingGraph)
    ));
}
