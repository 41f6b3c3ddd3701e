use crate::notice::Notice;
use lineage_core::{DocumentError, LinkError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error("Person not found: {0}")]
    UnknownPerson(String),

    #[error("A person's name cannot be empty")]
    EmptyName,

    #[error("No person is selected")]
    NothingSelected,

    #[error("No relationship is waiting for a type")]
    NoPendingLink,
}

impl SessionError {
    /// The destructive notice a host shows for this failure.
    pub fn notice(&self) -> Notice {
        match self {
            SessionError::Document(e) => Notice::destructive(
                "Import Failed",
                format!("Could not import JSON data. {}", e),
            ),
            SessionError::Link(LinkError::SelfLink) => Notice::destructive(
                "Invalid Relationship",
                "Cannot create a relationship with oneself.",
            ),
            SessionError::Link(LinkError::Duplicate(_)) => Notice::destructive(
                "Relationship Exists",
                "This relationship already exists.",
            ),
            other => Notice::destructive("Action Failed", other.to_string()),
        }
    }
}
