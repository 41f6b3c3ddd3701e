//! Edge weights for the family graph.
//!
//! Parent-child edges point from parent to child. Spouse edges keep the
//! direction they were recorded in, and every query treats them as
//! undirected.

use lineage_core::{ConnectorStyle, RelationKind, Relationship, SpouseStatus};
use serde::{Deserialize, Serialize};

/// An edge in the family graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Id of the relationship this edge was built from.
    pub id: String,

    /// The kind of relationship.
    pub kind: RelationKind,

    /// Spouse status, if any.
    pub status: Option<SpouseStatus>,
}

impl Edge {
    pub fn is_spouse(&self) -> bool {
        self.kind == RelationKind::Spouse
    }

    pub fn is_parent_child(&self) -> bool {
        self.kind == RelationKind::ParentChild
    }

    /// Divorced spouses are dashed, everything else is solid.
    pub fn connector_style(&self) -> ConnectorStyle {
        match (self.kind, self.status) {
            (RelationKind::Spouse, Some(SpouseStatus::Divorced)) => ConnectorStyle::Dashed,
            _ => ConnectorStyle::Solid,
        }
    }
}

impl From<&Relationship> for Edge {
    fn from(rel: &Relationship) -> Self {
        Self {
            id: rel.id.clone(),
            kind: rel.kind,
            status: rel.status,
        }
    }
}

/// A resolved edge for export, with person ids instead of graph indexes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub kind: RelationKind,
    pub connector: ConnectorStyle,
}
