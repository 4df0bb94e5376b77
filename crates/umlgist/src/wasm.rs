//! WebAssembly bindings for umlgist
//!
//! Browser-friendly wrappers returning the compact model as JSON strings.

use wasm_bindgen::prelude::*;

use crate::core::RenderConfig;
use crate::plugins::Orchestrator;

/// Initialize WASM module
///
/// Sets up panic hooks and logging for better error messages in the browser.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    // Logs go to the browser console
    let _ = crate::core::logging::init_logging(Some("info"), None);
}

fn to_js_error(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// Summarize class diagram source into compact model JSON
///
/// Throws a JavaScript error if the source has render errors.
#[wasm_bindgen]
pub fn summarize_diagram(source: &str) -> Result<String, JsValue> {
    let model = Orchestrator::default().summarize(source).map_err(to_js_error)?;
    model.to_json().map_err(to_js_error)
}

/// Summarize with a JSON render configuration (theme, fontSize, ...)
#[wasm_bindgen]
pub fn summarize_diagram_with_config(source: &str, config: &str) -> Result<String, JsValue> {
    let config = RenderConfig::from_json(config).map_err(to_js_error)?;
    let model = Orchestrator::with_sketch_engine(config)
        .summarize(source)
        .map_err(to_js_error)?;
    model.to_json().map_err(to_js_error)
}

/// Summarize a layouted diagram given as JSON
#[wasm_bindgen]
pub fn summarize_layout(json: &str) -> Result<String, JsValue> {
    let model = Orchestrator::default()
        .summarize_layout_json(json)
        .map_err(to_js_error)?;
    model.to_json().map_err(to_js_error)
}

/// Render errors of a source as JSON (`{parser, interpreter, layout}`)
#[wasm_bindgen]
pub fn diagram_errors(source: &str) -> Result<String, JsValue> {
    let result = Orchestrator::default().analyze(source).map_err(to_js_error)?;
    serde_json::to_string(&result.errors).map_err(to_js_error)
}
