use crate::relationship::RelationKind;
use thiserror::Error;

/// Errors raised while reading a family tree document.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid JSON structure for family tree data: {0}")]
    InvalidShape(String),
}

/// Errors raised when a structural edit would break a graph invariant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("Person not found: {0}")]
    UnknownPerson(String),

    #[error("Relationship not found: {0}")]
    UnknownRelationship(String),

    #[error("Cannot create a relationship with oneself")]
    SelfLink,

    #[error("This {0} relationship already exists")]
    Duplicate(RelationKind),

    #[error("Only spouse relationships carry a status")]
    NotASpouseLink,

    #[error("Person id already in use: {0}")]
    DuplicatePerson(String),
}
