//! Semantic extraction for class diagrams
//!
//! Two stages: the [`SemanticAnalyzer`] turns a layouted diagram into an
//! arena [`Graph`], and the [`SemanticModelGenerator`] flattens that graph
//! into a [`CompactSemanticModel`].

mod analyzer;
mod generator;
mod graph;
mod model;

pub use analyzer::{AnalysisResult, SemanticAnalyzer};
pub use generator::{
    find_contained_nodes, find_node_members, find_title, marker_type, node_name,
    SemanticModelGenerator, UNKNOWN_NAME,
};
pub use graph::{
    Attachment, AttachmentPosition, Edge, EdgeId, Element, Graph, Node, NodeId, NodeKind,
};
pub use model::{
    CompactAssociation, CompactClass, CompactEnum, CompactInterface, CompactLabel,
    CompactPackage, CompactSemanticModel, RelationshipType,
};
