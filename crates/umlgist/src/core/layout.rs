//! Layout tree produced by a diagram layout engine
//!
//! These types mirror the JSON a layout engine emits for a laid-out
//! diagram: an element tree with CSS-like class tags, a table of point
//! definitions and a table of resolved lines. They are the input of the
//! semantic analyzer.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::geometry::{Bounds, Line};

/// Set of CSS-like class tags attached to an element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassSet(BTreeSet<String>);

impl ClassSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether the tag is present
    pub fn has(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn insert(&mut self, tag: impl Into<String>) {
        self.0.insert(tag.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ClassSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Engine-reported element type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementType {
    Canvas,
    CanvasElement,
    CanvasConnection,
    Text,
    Span,
    Marker,
    Rect,
    Path,
    Ellipse,
    Hbox,
    Vbox,
    Stack,
    #[serde(other)]
    Other,
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementType::Canvas => "canvas",
            ElementType::CanvasElement => "canvasElement",
            ElementType::CanvasConnection => "canvasConnection",
            ElementType::Text => "text",
            ElementType::Span => "span",
            ElementType::Marker => "marker",
            ElementType::Rect => "rect",
            ElementType::Path => "path",
            ElementType::Ellipse => "ellipse",
            ElementType::Hbox => "hbox",
            ElementType::Vbox => "vbox",
            ElementType::Stack => "stack",
            ElementType::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// Which end of a connection a marker decorates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerSide {
    Start,
    End,
}

/// One element of the layout tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutElement {
    pub id: String,
    #[serde(rename = "type")]
    pub element_type: ElementType,
    #[serde(default, skip_serializing_if = "ClassSet::is_empty")]
    pub class: ClassSet,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LayoutElement>,
    /// Text content of a span
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Start point id of a connection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    /// End point id of a connection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    /// Anchor point id of a canvas element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<MarkerSide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
}

impl LayoutElement {
    /// Create an element with no tags, children or optional fields
    pub fn new(id: impl Into<String>, element_type: ElementType) -> Self {
        Self {
            id: id.into(),
            element_type,
            class: ClassSet::new(),
            children: Vec::new(),
            text: None,
            start: None,
            end: None,
            pos: None,
            marker: None,
            bounds: None,
        }
    }

    /// Create a span leaf carrying text
    pub fn span(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(id, ElementType::Span)
        }
    }

    pub fn with_class<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for tag in tags {
            self.class.insert(tag);
        }
        self
    }

    pub fn with_child(mut self, child: LayoutElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = LayoutElement>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }
}

/// Definition of a point referenced by id from the layout tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PointDefinition {
    /// Fixed canvas coordinates
    #[serde(rename = "absolutePoint")]
    Absolute { x: f64, y: f64 },
    /// Offset from another point
    #[serde(rename = "relativePoint")]
    Relative {
        target: String,
        #[serde(rename = "offsetX", default)]
        offset_x: f64,
        #[serde(rename = "offsetY", default)]
        offset_y: f64,
    },
    /// A point anchored on the line provided by another element
    #[serde(rename = "linePoint")]
    LinePoint {
        #[serde(rename = "lineProvider")]
        line_provider: String,
        #[serde(default)]
        pos: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        segment: Option<usize>,
        #[serde(default)]
        distance: f64,
    },
}

/// A fully laid-out diagram: element tree plus resolved geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutedDiagram {
    pub root: LayoutElement,
    #[serde(default)]
    pub points: BTreeMap<String, PointDefinition>,
    #[serde(default)]
    pub lines: BTreeMap<String, Line>,
}

impl LayoutedDiagram {
    pub fn new(root: LayoutElement) -> Self {
        Self {
            root,
            points: BTreeMap::new(),
            lines: BTreeMap::new(),
        }
    }

    /// Parse a layouted diagram from its JSON form
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn point(&self, id: &str) -> Option<&PointDefinition> {
        self.points.get(id)
    }

    pub fn line(&self, id: &str) -> Option<&Line> {
        self.lines.get(id)
    }
}

/// A single problem reported by a layout engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            column: None,
        }
    }

    /// Diagnostic with a 1-based source location
    pub fn at(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line: Some(line),
            column: Some(column),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(column)) => write!(f, "{}:{}: {}", line, column, self.message),
            (Some(line), None) => write!(f, "{}: {}", line, self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}

/// Errors aggregated over the stages of a layout engine run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderErrors {
    #[serde(default)]
    pub parser: Vec<Diagnostic>,
    #[serde(default)]
    pub interpreter: Vec<Diagnostic>,
    #[serde(default)]
    pub layout: Vec<Diagnostic>,
}

impl RenderErrors {
    pub fn is_empty(&self) -> bool {
        self.parser.is_empty() && self.interpreter.is_empty() && self.layout.is_empty()
    }

    pub fn len(&self) -> usize {
        self.parser.len() + self.interpreter.len() + self.layout.len()
    }

    /// Iterate over every diagnostic, parser errors first
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.parser
            .iter()
            .chain(self.interpreter.iter())
            .chain(self.layout.iter())
    }
}

impl fmt::Display for RenderErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join("; "))
    }
}
