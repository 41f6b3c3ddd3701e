//! Lineage Graph - family relationship analysis
//!
//! This crate turns a family tree document into a queryable graph and runs
//! the two algorithms the rest of Lineage depends on: classifying how two
//! people are related, and arranging everyone into generational rows.
//!
//! # Architecture
//!
//! The graph uses petgraph internally with an id index for lookups. It is
//! an immutable snapshot: build it from the current document, query it,
//! and drop it. Nothing here mutates the document.
//!
//! # Example
//!
//! ```
//! use lineage_core::FamilyDocument;
//! use lineage_graph::{describe_relationship, GraphBuilder};
//!
//! let doc = FamilyDocument::sample();
//! let graph = GraphBuilder::from_document(&doc).build();
//!
//! assert_eq!(
//!     describe_relationship(&graph, "3", "1"),
//!     "John Doe is the parent of Peter Doe."
//! );
//! ```

mod builder;
mod edge;
mod finder;
mod graph;
mod layering;
mod layout;
mod query;

pub use builder::GraphBuilder;
pub use edge::{Edge, GraphEdge};
pub use finder::{describe_relationship, find_relationship, Kinship};
pub use graph::{FamilyGraph, GraphStats, NodeId};
pub use layering::{Layering, SpouseSync};
pub use layout::{
    apply_layout, arrange, arrange_with_rng, Layout, LayoutConfig, LayoutEngine, Placement,
};
pub use query::{Sibling, SiblingKind};
