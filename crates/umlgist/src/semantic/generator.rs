//! Semantic model generator: graph to compact model
//!
//! Reads names, members and relationship kinds out of the rendered content
//! of a [`Graph`] and flattens them into a [`CompactSemanticModel`].

use tracing::{debug, info, span, trace, Level};

use crate::core::{ClassSet, DiagramError};

use super::analyzer::AnalysisResult;
use super::graph::{Edge, Element, Graph, Node, NodeId, NodeKind};
use super::model::{
    CompactAssociation, CompactClass, CompactEnum, CompactInterface, CompactLabel,
    CompactPackage, CompactSemanticModel, RelationshipType,
};

/// Name used for nodes without a title and for unresolved edge ends
pub const UNKNOWN_NAME: &str = "Unknown";

/// Builds compact semantic models from analyzed graphs
#[derive(Debug, Clone, Copy, Default)]
pub struct SemanticModelGenerator;

impl SemanticModelGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Convert an analysis result, refusing results with render errors
    pub fn generate(&self, result: &AnalysisResult) -> Result<CompactSemanticModel, DiagramError> {
        if !result.errors.is_empty() {
            return Err(DiagramError::Render(result.errors.clone()));
        }
        let graph = result.graph.as_ref().ok_or(DiagramError::MissingGraph)?;
        Ok(self.convert(graph))
    }

    /// Flatten a graph into the compact model
    pub fn convert(&self, graph: &Graph) -> CompactSemanticModel {
        let convert_span = span!(
            Level::INFO,
            "generate_model",
            node_count = graph.node_count(),
            edge_count = graph.edge_count()
        );
        let _enter = convert_span.enter();

        let mut model = CompactSemanticModel::default();

        for node in graph.nodes() {
            trace!(layout_id = %node.layout_id, kind = %node.kind, "Converting node");
            match node.kind {
                NodeKind::Class => model.classes.push(CompactClass {
                    name: node_name(node),
                    members: find_node_members(&node.children),
                    is_abstract: node.class.has("abstract"),
                }),
                NodeKind::Enum => model.enums.push(CompactEnum {
                    name: node_name(node),
                    values: find_node_members(&node.children),
                }),
                NodeKind::Interface => model.interfaces.push(CompactInterface {
                    name: node_name(node),
                    members: find_node_members(&node.children),
                }),
                NodeKind::Comment => model
                    .comments
                    .push(find_node_members(&node.children).join("\n")),
                NodeKind::Package => model.packages.push(CompactPackage {
                    name: node_name(node),
                    contains: find_contained_nodes(graph, node)
                        .into_iter()
                        .map(node_name)
                        .collect(),
                }),
                NodeKind::Other => {}
            }
        }

        model.associations = graph
            .edges()
            .map(|edge| convert_edge(graph, edge))
            .collect();

        info!(
            classes = model.classes.len(),
            enums = model.enums.len(),
            interfaces = model.interfaces.len(),
            packages = model.packages.len(),
            comments = model.comments.len(),
            associations = model.associations.len(),
            "Model generated"
        );
        model
    }
}

fn convert_edge(graph: &Graph, edge: &Edge) -> CompactAssociation {
    let end_name = |end: Option<NodeId>| {
        end.map(|id| node_name(graph.node(id)))
            .unwrap_or_else(|| UNKNOWN_NAME.to_string())
    };

    let labels = edge
        .attachments
        .iter()
        .filter_map(|attachment| {
            let members = find_node_members(&graph.node(attachment.node).children);
            (!members.is_empty()).then(|| CompactLabel {
                position: attachment.position,
                text: members.join(" "),
            })
        })
        .collect();

    let end_marker = edge.end_marker.as_ref().and_then(Element::class);
    let relationship_type = marker_type(end_marker, &edge.class);
    debug!(edge = %edge.layout_id, %relationship_type, "Classified edge");

    CompactAssociation {
        from: end_name(edge.start),
        to: end_name(edge.end),
        relationship_type,
        labels,
    }
}

/// Title of a node, or [`UNKNOWN_NAME`]
pub fn node_name(node: &Node) -> String {
    find_title(&node.children).unwrap_or_else(|| UNKNOWN_NAME.to_string())
}

/// First text tagged `title`, depth first
///
/// Nested nodes and edges are not searched, so a package never borrows the
/// title of a class drawn inside it.
pub fn find_title(elements: &[Element]) -> Option<String> {
    elements.iter().find_map(|element| match element {
        Element::Text { class, text, .. } if class.has("title") => Some(text.clone()),
        Element::Text { .. } => None,
        Element::Div { children, .. } => find_title(children),
        Element::Node { .. } | Element::Edge { .. } => None,
    })
}

/// Trimmed, non-empty texts in traversal order
///
/// Elements tagged `title` or `keyword` are skipped together with their
/// subtrees. Nested nodes and edges are not searched.
pub fn find_node_members(elements: &[Element]) -> Vec<String> {
    let mut members = Vec::new();
    collect_members(elements, &mut members);
    members
}

fn collect_members(elements: &[Element], members: &mut Vec<String>) {
    for element in elements {
        if element.has_class("title") || element.has_class("keyword") {
            continue;
        }
        match element {
            Element::Text { text, .. } => {
                let text = text.trim();
                if !text.is_empty() {
                    members.push(text.to_string());
                }
            }
            Element::Div { children, .. } => collect_members(children, members),
            Element::Node { .. } | Element::Edge { .. } => {}
        }
    }
}

/// Nodes drawn inside `node`, stopping at the first node on each path
pub fn find_contained_nodes<'g>(graph: &'g Graph, node: &Node) -> Vec<&'g Node> {
    let mut contained = Vec::new();
    collect_contained(&node.children, &mut contained);
    contained
        .into_iter()
        .filter(|&id| id != node.id)
        .map(|id| graph.node(id))
        .collect()
}

fn collect_contained(elements: &[Element], contained: &mut Vec<NodeId>) {
    for element in elements {
        match element {
            Element::Node { id } => contained.push(*id),
            Element::Div { children, .. } => collect_contained(children, contained),
            Element::Text { .. } | Element::Edge { .. } => {}
        }
    }
}

/// UML relationship kind of an edge
///
/// Depends only on the class tags of the end marker and of the edge itself.
pub fn marker_type(end_marker: Option<&ClassSet>, edge_class: &ClassSet) -> RelationshipType {
    let dashed = edge_class.has("dashed-connection");
    let marker_has = |tag: &str| end_marker.is_some_and(|class| class.has(tag));

    if marker_has("triangle-marker") {
        if dashed {
            RelationshipType::Realization
        } else {
            RelationshipType::Inheritance
        }
    } else if marker_has("filled-diamond-marker") {
        RelationshipType::Composition
    } else if marker_has("diamond-marker") {
        RelationshipType::Aggregation
    } else if marker_has("arrow-marker") {
        RelationshipType::DirectedAssociation
    } else if dashed {
        RelationshipType::Dependency
    } else {
        RelationshipType::Association
    }
}
