//! Interaction modes.

use lineage_graph::Kinship;
use serde::Serialize;

/// Two people waiting for a relationship type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingLink {
    pub source_id: String,
    pub target_id: String,
}

/// What the session is currently doing.
///
/// Exactly one mode is active at a time. Starting any mode leaves the
/// previous one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum Mode {
    #[default]
    Idle,
    /// Editing a person that does not exist yet.
    Adding,
    /// A link was started from `source_id`; the next selection picks the target.
    Linking { source_id: String },
    /// Source and target are chosen; waiting for the kind.
    PickingRelationshipType { pending: PendingLink },
    /// Collecting two people to compare.
    FindingRelationship { first_id: Option<String> },
}

impl Mode {
    pub fn is_idle(&self) -> bool {
        matches!(self, Mode::Idle)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mode::Idle => "idle",
            Mode::Adding => "adding",
            Mode::Linking { .. } => "linking",
            Mode::PickingRelationshipType { .. } => "picking relationship type",
            Mode::FindingRelationship { .. } => "finding relationship",
        }
    }
}

/// What a selection did, given the mode it happened in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Plain selection changed.
    Selected(Option<String>),
    /// A link target was chosen; the session now waits for a kind.
    LinkPending(PendingLink),
    /// The link source was selected again, which abandons the link.
    LinkCancelled,
    /// First person of a relationship query chosen.
    FirstPicked(String),
    /// Second person chosen; the query has been answered.
    Found(Kinship),
    /// Nothing happened.
    Ignored,
}
