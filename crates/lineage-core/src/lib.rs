//! Lineage Core - the family tree data model
//!
//! This crate defines the people and relationships that make up a family
//! tree, and the JSON document they are exchanged in. It knows nothing
//! about graph traversal or layout; those live in `lineage-graph`.
//!
//! # Example
//!
//! ```
//! use lineage_core::{FamilyDocument, Person, RelationKind};
//!
//! let mut doc = FamilyDocument::new();
//! doc.add_person(Person::new("1", "John Doe")).unwrap();
//! doc.add_person(Person::new("3", "Peter Doe")).unwrap();
//! doc.add_relationship("e1", "1", "3", RelationKind::ParentChild).unwrap();
//!
//! assert_eq!(doc.edges.len(), 1);
//! ```

mod document;
mod error;
mod person;
mod relationship;

pub use document::{
    placeholder_coordinate, random_coordinate, FamilyDocument, DEFAULT_CANVAS_HEIGHT,
    DEFAULT_CANVAS_WIDTH,
};
pub use error::{DocumentError, LinkError};
pub use person::{clean_date, Gender, Person, PersonDraft};
pub use relationship::{ConnectorStyle, RelationKind, Relationship, SpouseStatus};
