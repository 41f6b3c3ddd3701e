//! Relationship types for the family tree.
//!
//! Only two kinds of link are recorded. Everything else (siblings,
//! cousins, in-laws) is derived from them.

use serde::{Deserialize, Serialize};

/// The kind of link between two people.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationKind {
    /// Source is the parent, target is the child. Direction matters.
    ParentChild,

    /// Marriage or partnership. Direction is irrelevant.
    Spouse,
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::ParentChild => "parent-child",
            Self::Spouse => "spouse",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for RelationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parent-child" | "parent" => Ok(Self::ParentChild),
            "spouse" => Ok(Self::Spouse),
            other => Err(format!("unknown relationship type '{}'", other)),
        }
    }
}

/// State of a spouse link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpouseStatus {
    Married,
    Divorced,
}

impl std::fmt::Display for SpouseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Married => write!(f, "married"),
            Self::Divorced => write!(f, "divorced"),
        }
    }
}

impl std::str::FromStr for SpouseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "married" => Ok(Self::Married),
            "divorced" => Ok(Self::Divorced),
            other => Err(format!("unknown spouse status '{}'", other)),
        }
    }
}

/// How a renderer should draw the connector for a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorStyle {
    Solid,
    Dashed,
}

/// A recorded link between two people.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: String,

    pub source_id: String,

    pub target_id: String,

    #[serde(rename = "type")]
    pub kind: RelationKind,

    /// Only meaningful for spouse links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SpouseStatus>,
}

impl Relationship {
    /// Creates a parent-child link. `parent` becomes the source.
    pub fn parent_child(
        id: impl Into<String>,
        parent: impl Into<String>,
        child: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_id: parent.into(),
            target_id: child.into(),
            kind: RelationKind::ParentChild,
            status: None,
        }
    }

    /// Creates a spouse link with the given status.
    pub fn spouse(
        id: impl Into<String>,
        a: impl Into<String>,
        b: impl Into<String>,
        status: SpouseStatus,
    ) -> Self {
        Self {
            id: id.into(),
            source_id: a.into(),
            target_id: b.into(),
            kind: RelationKind::Spouse,
            status: Some(status),
        }
    }

    /// Returns true if this link touches the given person.
    pub fn involves(&self, person_id: &str) -> bool {
        self.source_id == person_id || self.target_id == person_id
    }

    /// Returns true if this link describes the same relationship as
    /// `(source, target, kind)`. Spouse links match in either direction.
    pub fn same_link(&self, source: &str, target: &str, kind: RelationKind) -> bool {
        if self.kind != kind {
            return false;
        }
        let forward = self.source_id == source && self.target_id == target;
        let backward = self.source_id == target && self.target_id == source;
        match kind {
            RelationKind::ParentChild => forward,
            RelationKind::Spouse => forward || backward,
        }
    }

    /// Divorced spouses are drawn dashed, everything else solid.
    pub fn connector_style(&self) -> ConnectorStyle {
        match (self.kind, self.status) {
            (RelationKind::Spouse, Some(SpouseStatus::Divorced)) => ConnectorStyle::Dashed,
            _ => ConnectorStyle::Solid,
        }
    }
}
