//! Semantic analyzer: layout tree to semantic graph
//!
//! Walks the element tree of a [`LayoutedDiagram`], registering every canvas
//! element as a node and every canvas connection as an edge. Once the whole
//! tree is known, edge endpoints are resolved through their line points and
//! floating labels are attached to the edges they sit on.

use std::collections::HashMap;
use tracing::{debug, info, span, trace, warn, Level};

use crate::core::{
    DiagramError, ElementType, LayoutElement, LayoutEngine, LayoutedDiagram, MarkerSide,
    PointDefinition, RenderConfig, RenderErrors,
};

use super::graph::{Attachment, AttachmentPosition, EdgeId, Element, Graph, NodeId};

/// Outcome of running a layout engine and the analyzer over a source
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub errors: RenderErrors,
    /// Missing when the engine could not lay out the source
    pub graph: Option<Graph>,
}

/// Converts layouted diagrams into semantic graphs
#[derive(Debug, Clone, Copy, Default)]
pub struct SemanticAnalyzer;

impl SemanticAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Build the graph of a layouted diagram
    ///
    /// Fails only when the root element is not a canvas. Dangling edge
    /// endpoints are left unresolved.
    pub fn analyze(&self, diagram: &LayoutedDiagram) -> Result<Graph, DiagramError> {
        let analyze_span = span!(Level::INFO, "analyze_layout", root = %diagram.root.id);
        let _enter = analyze_span.enter();

        let root = &diagram.root;
        if root.element_type != ElementType::Canvas {
            warn!(found = %root.element_type, "Layout root is not a canvas");
            return Err(DiagramError::not_canvas(
                &root.id,
                root.element_type.to_string(),
            ));
        }

        let mut walk = GraphWalk::new(diagram, Graph::new(&root.id));
        walk.collect_canvas(root);
        let graph = walk.finish();

        info!(
            node_count = graph.node_count(),
            edge_count = graph.edge_count(),
            "Analysis completed"
        );
        Ok(graph)
    }

    /// Run `engine` over `source` and analyze whatever it laid out
    ///
    /// Engine problems end up in [`AnalysisResult::errors`]; only structural
    /// failures of the analyzer itself are returned as `Err`.
    pub fn analyze_source(
        &self,
        engine: &dyn LayoutEngine,
        source: &str,
        config: &RenderConfig,
    ) -> Result<AnalysisResult, DiagramError> {
        let source_span = span!(
            Level::INFO,
            "analyze_source",
            engine = engine.name(),
            source_len = source.len()
        );
        let _enter = source_span.enter();

        let output = engine.layout(source, config);
        if !output.errors.is_empty() {
            debug!(error_count = output.errors.len(), "Engine reported errors");
        }

        let graph = match output.diagram {
            Some(ref diagram) => Some(self.analyze(diagram)?),
            None => None,
        };

        Ok(AnalysisResult {
            errors: output.errors,
            graph,
        })
    }
}

/// State of one walk over the layout tree
struct GraphWalk<'a> {
    diagram: &'a LayoutedDiagram,
    graph: Graph,
    nodes_by_layout_id: HashMap<&'a str, NodeId>,
    edges_by_layout_id: HashMap<&'a str, EdgeId>,
    /// Connections waiting for endpoint resolution
    pending_edges: Vec<(EdgeId, &'a LayoutElement)>,
    /// Canvas elements with an anchor point, possibly labels
    anchored_nodes: Vec<(NodeId, &'a str)>,
}

impl<'a> GraphWalk<'a> {
    fn new(diagram: &'a LayoutedDiagram, graph: Graph) -> Self {
        Self {
            diagram,
            graph,
            nodes_by_layout_id: HashMap::new(),
            edges_by_layout_id: HashMap::new(),
            pending_edges: Vec::new(),
            anchored_nodes: Vec::new(),
        }
    }

    /// Convert the direct children of a canvas
    fn collect_canvas(&mut self, canvas: &'a LayoutElement) -> Vec<Element> {
        canvas
            .children
            .iter()
            .map(|child| match child.element_type {
                ElementType::CanvasElement => Element::Node {
                    id: self.register_node(child),
                },
                ElementType::CanvasConnection => Element::Edge {
                    id: self.register_edge(child),
                },
                _ => self.convert(child),
            })
            .collect()
    }

    /// Convert any element below a node or edge
    fn convert(&mut self, element: &'a LayoutElement) -> Element {
        match element.element_type {
            ElementType::Canvas => Element::Div {
                layout_id: element.id.clone(),
                class: element.class.clone(),
                children: self.collect_canvas(element),
            },
            ElementType::CanvasElement => Element::Node {
                id: self.register_node(element),
            },
            ElementType::CanvasConnection => Element::Edge {
                id: self.register_edge(element),
            },
            ElementType::Text | ElementType::Span => Element::Text {
                layout_id: element.id.clone(),
                class: element.class.clone(),
                text: span_text(element),
            },
            _ => Element::Div {
                layout_id: element.id.clone(),
                class: element.class.clone(),
                children: element
                    .children
                    .iter()
                    .map(|child| self.convert(child))
                    .collect(),
            },
        }
    }

    fn register_node(&mut self, element: &'a LayoutElement) -> NodeId {
        let id = self.graph.add_node(&element.id, element.class.clone());
        trace!(layout_id = %element.id, kind = %self.graph.node(id).kind, "Registered node");
        self.nodes_by_layout_id.insert(element.id.as_str(), id);
        if let Some(pos) = element.pos.as_deref() {
            self.anchored_nodes.push((id, pos));
        }

        let children = element
            .children
            .iter()
            .map(|child| self.convert(child))
            .collect();
        self.graph.node_mut(id).children = children;
        id
    }

    fn register_edge(&mut self, element: &'a LayoutElement) -> EdgeId {
        let id = self.graph.add_edge(&element.id, element.class.clone());
        trace!(layout_id = %element.id, "Registered edge");
        self.edges_by_layout_id.insert(element.id.as_str(), id);
        self.pending_edges.push((id, element));

        let mut start_marker = None;
        let mut end_marker = None;
        let mut children = Vec::new();
        for child in &element.children {
            let converted = self.convert(child);
            match (child.element_type, child.marker) {
                (ElementType::Marker, Some(MarkerSide::Start)) => start_marker = Some(converted),
                (ElementType::Marker, Some(MarkerSide::End)) => end_marker = Some(converted),
                _ => children.push(converted),
            }
        }

        let edge = self.graph.edge_mut(id);
        edge.start_marker = start_marker;
        edge.end_marker = end_marker;
        edge.children = children;
        id
    }

    fn finish(mut self) -> Graph {
        self.resolve_endpoints();
        self.attach_labels();
        self.graph
    }

    fn resolve_endpoints(&mut self) {
        for (edge, element) in std::mem::take(&mut self.pending_edges) {
            match self.endpoint_node(element.start.as_deref()) {
                Some(node) => self.graph.connect_start(edge, node),
                None => warn!(edge = %element.id, "Edge start does not resolve to a node"),
            }
            match self.endpoint_node(element.end.as_deref()) {
                Some(node) => self.graph.connect_end(edge, node),
                None => warn!(edge = %element.id, "Edge end does not resolve to a node"),
            }
        }
    }

    /// Node providing the line a connection endpoint is anchored on
    fn endpoint_node(&self, point_id: Option<&str>) -> Option<NodeId> {
        match self.diagram.point(point_id?)? {
            PointDefinition::LinePoint { line_provider, .. } => {
                self.nodes_by_layout_id.get(line_provider.as_str()).copied()
            }
            _ => None,
        }
    }

    fn attach_labels(&mut self) {
        let diagram = self.diagram;
        for (node, point_id) in std::mem::take(&mut self.anchored_nodes) {
            let Some(PointDefinition::LinePoint {
                line_provider,
                pos,
                segment,
                ..
            }) = diagram.point(point_id)
            else {
                continue;
            };
            let Some(&edge) = self.edges_by_layout_id.get(line_provider.as_str()) else {
                continue;
            };

            let fraction = match diagram.line(line_provider) {
                Some(line) => line.normalized_position(*segment, *pos),
                None => {
                    warn!(edge = %line_provider, "Edge has no resolved line, label placed at start");
                    0.0
                }
            };
            let position = AttachmentPosition::from_fraction(fraction);
            debug!(
                label = %self.graph.node(node).layout_id,
                edge = %line_provider,
                fraction,
                %position,
                "Attached label"
            );
            self.graph
                .edge_mut(edge)
                .attachments
                .push(Attachment { node, position });
        }
    }
}

/// Concatenated text of a text element's spans, or a span's own text
fn span_text(element: &LayoutElement) -> String {
    let mut text = element.text.clone().unwrap_or_default();
    for child in &element.children {
        text.push_str(&span_text(child));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Line, Point};

    fn title(id: &str, name: &str) -> LayoutElement {
        LayoutElement::new(id, ElementType::Text)
            .with_class(["title"])
            .with_child(LayoutElement::span(format!("{}-span", id), name))
    }

    fn class_box(id: &str, name: &str) -> LayoutElement {
        LayoutElement::new(id, ElementType::CanvasElement)
            .with_class(["class-element"])
            .with_child(title(&format!("{}-title", id), name))
    }

    fn line_point(provider: &str, pos: f64, segment: Option<usize>) -> PointDefinition {
        PointDefinition::LinePoint {
            line_provider: provider.to_string(),
            pos,
            segment,
            distance: 0.0,
        }
    }

    fn connection(id: &str, start: &str, end: &str) -> LayoutElement {
        let mut element = LayoutElement::new(id, ElementType::CanvasConnection);
        element.start = Some(start.to_string());
        element.end = Some(end.to_string());
        element
    }

    #[test]
    fn test_root_must_be_canvas() {
        let diagram = LayoutedDiagram::new(LayoutElement::new("root", ElementType::Text));
        let result = SemanticAnalyzer::new().analyze(&diagram);
        assert!(matches!(result, Err(DiagramError::NotCanvas { .. })));
    }

    #[test]
    fn test_text_concatenates_spans() {
        let text = LayoutElement::new("t", ElementType::Text).with_children([
            LayoutElement::span("s1", "hello"),
            LayoutElement::span("s2", " : "),
            LayoutElement::span("s3", "string"),
        ]);
        assert_eq!(span_text(&text), "hello : string");
    }

    #[test]
    fn test_resolves_edge_endpoints() {
        let root = LayoutElement::new("root", ElementType::Canvas).with_children([
            class_box("a", "A"),
            class_box("b", "B"),
            connection("e", "e-start", "e-end"),
        ]);
        let mut diagram = LayoutedDiagram::new(root);
        diagram
            .points
            .insert("e-start".into(), line_point("a", 0.0, None));
        diagram
            .points
            .insert("e-end".into(), line_point("b", 0.0, None));

        let graph = SemanticAnalyzer::new().analyze(&diagram).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);

        let edge = graph.edges().next().unwrap();
        assert_eq!(edge.start, graph.find_node("a"));
        assert_eq!(edge.end, graph.find_node("b"));
        let a = graph.find_node("a").unwrap();
        assert_eq!(graph.node(a).outgoing, vec![edge.id]);
    }

    #[test]
    fn test_dangling_endpoint_is_left_unresolved() {
        let root = LayoutElement::new("root", ElementType::Canvas)
            .with_children([class_box("a", "A"), connection("e", "e-start", "missing")]);
        let mut diagram = LayoutedDiagram::new(root);
        diagram
            .points
            .insert("e-start".into(), line_point("a", 0.0, None));

        let graph = SemanticAnalyzer::new().analyze(&diagram).unwrap();
        let edge = graph.edges().next().unwrap();
        assert!(edge.start.is_some());
        assert!(edge.end.is_none());
    }

    #[test]
    fn test_markers_are_split_by_side() {
        let mut marker = LayoutElement::new("m", ElementType::Marker).with_class(["triangle-marker"]);
        marker.marker = Some(MarkerSide::End);
        let root = LayoutElement::new("root", ElementType::Canvas)
            .with_child(connection("e", "s", "t").with_child(marker));

        let graph = SemanticAnalyzer::new()
            .analyze(&LayoutedDiagram::new(root))
            .unwrap();
        let edge = graph.edges().next().unwrap();
        assert!(edge.start_marker.is_none());
        assert!(edge
            .end_marker
            .as_ref()
            .is_some_and(|m| m.has_class("triangle-marker")));
        assert!(edge.children.is_empty());
    }

    #[test]
    fn test_label_attachment_uses_arc_length() {
        let mut label = LayoutElement::new("label", ElementType::CanvasElement)
            .with_child(LayoutElement::new("label-text", ElementType::Text));
        label.pos = Some("label-pos".to_string());
        let root = LayoutElement::new("root", ElementType::Canvas)
            .with_children([connection("e", "s", "t"), label]);

        let mut diagram = LayoutedDiagram::new(root);
        // Segment lengths 10 and 30: the middle of segment 1 is at 25/40
        diagram.lines.insert(
            "e".into(),
            Line::through(&[
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 30.0),
            ]),
        );
        diagram
            .points
            .insert("label-pos".into(), line_point("e", 0.5, Some(1)));

        let graph = SemanticAnalyzer::new().analyze(&diagram).unwrap();
        let edge = graph.edges().next().unwrap();
        assert_eq!(edge.attachments.len(), 1);
        assert_eq!(edge.attachments[0].node, graph.find_node("label").unwrap());
        assert_eq!(edge.attachments[0].position, AttachmentPosition::Middle);
    }

    #[test]
    fn test_freestanding_node_is_not_attached() {
        let mut node = class_box("a", "A");
        node.pos = Some("a-pos".to_string());
        let root = LayoutElement::new("root", ElementType::Canvas).with_child(node);
        let mut diagram = LayoutedDiagram::new(root);
        diagram
            .points
            .insert("a-pos".into(), PointDefinition::Absolute { x: 1.0, y: 2.0 });

        let graph = SemanticAnalyzer::new().analyze(&diagram).unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_nested_canvas_registers_nodes() {
        let inner = LayoutElement::new("pkg-canvas", ElementType::Canvas)
            .with_child(class_box("inner", "Inner"));
        let package = LayoutElement::new("pkg", ElementType::CanvasElement)
            .with_class(["package-element"])
            .with_child(LayoutElement::new("pkg-rect", ElementType::Rect).with_child(inner));
        let root = LayoutElement::new("root", ElementType::Canvas).with_child(package);

        let graph = SemanticAnalyzer::new()
            .analyze(&LayoutedDiagram::new(root))
            .unwrap();
        assert_eq!(graph.node_count(), 2);
        assert!(graph.find_node("inner").is_some());
    }
}
