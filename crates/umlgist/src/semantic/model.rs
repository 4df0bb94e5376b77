//! Compact semantic model
//!
//! The flat JSON projection of a class diagram handed to UI components and
//! to the feedback service. Field names are part of that contract.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::graph::AttachmentPosition;

/// UML relationship kind of an association
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipType {
    Realization,
    Inheritance,
    Composition,
    Aggregation,
    #[serde(rename = "Directed Association")]
    DirectedAssociation,
    Dependency,
    Association,
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RelationshipType::Realization => "Realization",
            RelationshipType::Inheritance => "Inheritance",
            RelationshipType::Composition => "Composition",
            RelationshipType::Aggregation => "Aggregation",
            RelationshipType::DirectedAssociation => "Directed Association",
            RelationshipType::Dependency => "Dependency",
            RelationshipType::Association => "Association",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactClass {
    pub name: String,
    pub members: Vec<String>,
    pub is_abstract: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactEnum {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactInterface {
    pub name: String,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactPackage {
    pub name: String,
    /// Names of the nodes drawn inside the package
    pub contains: Vec<String>,
}

/// Text of one label on an association
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactLabel {
    pub position: AttachmentPosition,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactAssociation {
    pub from: String,
    pub to: String,
    pub relationship_type: RelationshipType,
    pub labels: Vec<CompactLabel>,
}

/// Flat projection of a class diagram
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactSemanticModel {
    pub classes: Vec<CompactClass>,
    pub enums: Vec<CompactEnum>,
    pub interfaces: Vec<CompactInterface>,
    pub packages: Vec<CompactPackage>,
    pub comments: Vec<String>,
    pub associations: Vec<CompactAssociation>,
}

impl CompactSemanticModel {
    /// Number of entries produced from nodes
    pub fn node_entry_count(&self) -> usize {
        self.classes.len()
            + self.enums.len()
            + self.interfaces.len()
            + self.packages.len()
            + self.comments.len()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
