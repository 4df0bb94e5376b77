//! Arena-backed semantic graph of a class diagram
//!
//! Nodes and edges live in flat vectors and refer to each other by index,
//! so the node/edge back-references never form ownership cycles.

use serde::Serialize;
use std::fmt;

use crate::core::ClassSet;

/// Index of a node in its graph
///
/// Only [`Graph::add_node`] hands these out, so every id indexes its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of an edge in its graph
///
/// Only [`Graph::add_edge`] hands these out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EdgeId(usize);

impl EdgeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// UML role of a node, decided once from its class tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Class,
    Enum,
    Interface,
    Comment,
    Package,
    /// Labels and any box without a UML role
    Other,
}

impl NodeKind {
    /// Classify a node by its class tags
    pub fn from_class(class: &ClassSet) -> Self {
        if class.has("class-element") {
            NodeKind::Class
        } else if class.has("enum-element") {
            NodeKind::Enum
        } else if class.has("interface-element") {
            NodeKind::Interface
        } else if class.has("comment-element") {
            NodeKind::Comment
        } else if class.has("package-element") {
            NodeKind::Package
        } else {
            NodeKind::Other
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Class => write!(f, "class"),
            NodeKind::Enum => write!(f, "enum"),
            NodeKind::Interface => write!(f, "interface"),
            NodeKind::Comment => write!(f, "comment"),
            NodeKind::Package => write!(f, "package"),
            NodeKind::Other => write!(f, "other"),
        }
    }
}

/// Rendered content below a node or edge
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Element {
    /// Generic container
    Div {
        layout_id: String,
        class: ClassSet,
        children: Vec<Element>,
    },
    /// Text leaf with the concatenated text of its spans
    Text {
        layout_id: String,
        class: ClassSet,
        text: String,
    },
    /// A node nested in this content (package members)
    Node { id: NodeId },
    /// An edge nested in this content
    Edge { id: EdgeId },
}

impl Element {
    /// Class tags of a div or text; nested nodes and edges carry none here
    pub fn class(&self) -> Option<&ClassSet> {
        match self {
            Element::Div { class, .. } | Element::Text { class, .. } => Some(class),
            Element::Node { .. } | Element::Edge { .. } => None,
        }
    }

    pub fn has_class(&self, tag: &str) -> bool {
        self.class().is_some_and(|class| class.has(tag))
    }
}

/// Qualitative position of a label along an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentPosition {
    Start,
    Middle,
    End,
}

impl AttachmentPosition {
    /// Classify a normalized position (0..=1) into thirds
    ///
    /// Exactly 1/3 and 2/3 are middle.
    pub fn from_fraction(t: f64) -> Self {
        if t < 1.0 / 3.0 {
            AttachmentPosition::Start
        } else if t > 2.0 / 3.0 {
            AttachmentPosition::End
        } else {
            AttachmentPosition::Middle
        }
    }
}

impl fmt::Display for AttachmentPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachmentPosition::Start => write!(f, "start"),
            AttachmentPosition::Middle => write!(f, "middle"),
            AttachmentPosition::End => write!(f, "end"),
        }
    }
}

/// A label node pinned to a point on an edge
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attachment {
    pub node: NodeId,
    pub position: AttachmentPosition,
}

/// A box on the canvas
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: NodeId,
    pub layout_id: String,
    pub kind: NodeKind,
    pub class: ClassSet,
    pub children: Vec<Element>,
    pub outgoing: Vec<EdgeId>,
    pub incoming: Vec<EdgeId>,
}

/// A connection between two nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub id: EdgeId,
    pub layout_id: String,
    pub class: ClassSet,
    /// Unresolved while the diagram is incomplete
    pub start: Option<NodeId>,
    pub end: Option<NodeId>,
    pub start_marker: Option<Element>,
    pub end_marker: Option<Element>,
    pub children: Vec<Element>,
    pub attachments: Vec<Attachment>,
}

/// The root canvas with every node and edge found below it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Graph {
    pub layout_id: String,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Graph {
    pub fn new(layout_id: impl Into<String>) -> Self {
        Self {
            layout_id: layout_id.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Add a node; its id is assigned here
    pub fn add_node(&mut self, layout_id: impl Into<String>, class: ClassSet) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            id,
            layout_id: layout_id.into(),
            kind: NodeKind::from_class(&class),
            class,
            children: Vec::new(),
            outgoing: Vec::new(),
            incoming: Vec::new(),
        });
        id
    }

    /// Add an edge without endpoints; its id is assigned here
    pub fn add_edge(&mut self, layout_id: impl Into<String>, class: ClassSet) -> EdgeId {
        let id = EdgeId(self.edges.len());
        self.edges.push(Edge {
            id,
            layout_id: layout_id.into(),
            class,
            start: None,
            end: None,
            start_marker: None,
            end_marker: None,
            children: Vec::new(),
            attachments: Vec::new(),
        });
        id
    }

    /// Set the start of an edge and record it as outgoing on the node
    pub fn connect_start(&mut self, edge: EdgeId, node: NodeId) {
        self.edges[edge.0].start = Some(node);
        self.nodes[node.0].outgoing.push(edge);
    }

    /// Set the end of an edge and record it as incoming on the node
    pub fn connect_end(&mut self, edge: EdgeId, node: NodeId) {
        self.edges[edge.0].end = Some(node);
        self.nodes[node.0].incoming.push(edge);
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0]
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Find a node by the id of the layout element it came from
    pub fn find_node(&self, layout_id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|node| node.layout_id == layout_id)
            .map(|node| node.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_kind_from_class() {
        let class: ClassSet = ["class-element", "abstract"].into_iter().collect();
        assert_eq!(NodeKind::from_class(&class), NodeKind::Class);
        let class: ClassSet = ["package-element"].into_iter().collect();
        assert_eq!(NodeKind::from_class(&class), NodeKind::Package);
        assert_eq!(NodeKind::from_class(&ClassSet::new()), NodeKind::Other);
    }

    #[test]
    fn test_thirds_rule() {
        assert_eq!(AttachmentPosition::from_fraction(0.2), AttachmentPosition::Start);
        assert_eq!(AttachmentPosition::from_fraction(0.5), AttachmentPosition::Middle);
        assert_eq!(AttachmentPosition::from_fraction(0.8), AttachmentPosition::End);
        assert_eq!(
            AttachmentPosition::from_fraction(1.0 / 3.0),
            AttachmentPosition::Middle
        );
        assert_eq!(
            AttachmentPosition::from_fraction(2.0 / 3.0),
            AttachmentPosition::Middle
        );
    }

    #[test]
    fn test_ids_index_their_arena() {
        let mut graph = Graph::new("root");
        let first = graph.add_node("first", ClassSet::new());
        let second = graph.add_node("second", ClassSet::new());
        let edge = graph.add_edge("edge", ClassSet::new());

        assert_eq!((first.index(), second.index(), edge.index()), (0, 1, 0));
        assert_eq!(graph.node(second).layout_id, "second");
        assert_eq!(graph.node(second).id, second);
        assert_eq!(graph.edge(edge).id, edge);
    }

    #[test]
    fn test_connect_records_back_references() {
        let mut graph = Graph::new("root");
        let a = graph.add_node("a", ClassSet::new());
        let b = graph.add_node("b", ClassSet::new());
        let edge = graph.add_edge("e", ClassSet::new());
        graph.connect_start(edge, a);
        graph.connect_end(edge, b);

        assert_eq!(graph.edge(edge).start, Some(a));
        assert_eq!(graph.edge(edge).end, Some(b));
        assert_eq!(graph.node(a).outgoing, vec![edge]);
        assert_eq!(graph.node(b).incoming, vec![edge]);
        assert_eq!(graph.find_node("b"), Some(b));
        assert_eq!(graph.find_node("zzz"), None);
    }
}
