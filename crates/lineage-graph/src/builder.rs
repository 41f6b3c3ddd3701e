//! Graph builder for constructing the family graph from a document.
//!
//! The builder takes people and relationships and resolves the
//! relationship endpoints into actual graph edges.

use crate::edge::Edge;
use crate::graph::FamilyGraph;
use lineage_core::{FamilyDocument, Person, Relationship};
use tracing::{debug, warn};

/// Builds a FamilyGraph from people and relationships.
///
/// The builder handles the two-pass process:
/// 1. Add all people to the graph
/// 2. Resolve relationships into edges
///
/// Anything that would make the snapshot malformed is skipped with a
/// warning: repeated person ids (the first wins), relationships pointing at
/// unknown people, and self-links.
pub struct GraphBuilder {
    graph: FamilyGraph,
    pending: Vec<Relationship>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            graph: FamilyGraph::new(),
            pending: Vec::new(),
        }
    }

    /// Creates a builder preloaded with people and relationships.
    pub fn from_parts(persons: &[Person], relationships: &[Relationship]) -> Self {
        let mut builder = Self::new();
        builder.add_persons(persons.iter().cloned());
        builder.add_relationships(relationships.iter().cloned());
        builder
    }

    /// Creates a builder preloaded with a whole document.
    pub fn from_document(document: &FamilyDocument) -> Self {
        Self::from_parts(&document.nodes, &document.edges)
    }

    /// Adds people to the graph.
    pub fn add_persons(&mut self, persons: impl IntoIterator<Item = Person>) {
        for person in persons {
            let id = person.id.clone();
            if self.graph.add_person(person).is_none() {
                warn!("Skipping person with repeated id {}", id);
            }
        }
    }

    /// Queues relationships for resolution.
    ///
    /// Call this before or after `add_persons`; endpoints are only resolved
    /// in `build`.
    pub fn add_relationships(&mut self, relationships: impl IntoIterator<Item = Relationship>) {
        self.pending.extend(relationships);
    }

    /// Resolves queued relationships into edges.
    fn resolve_edges(&mut self) {
        let mut skipped = 0usize;

        for rel in self.pending.drain(..) {
            let from = self.graph.get_index(&rel.source_id);
            let to = self.graph.get_index(&rel.target_id);

            match (from, to) {
                (Some(from), Some(to)) if from != to => {
                    self.graph.add_edge(from, to, Edge::from(&rel));
                }
                (Some(_), Some(_)) => {
                    warn!("Skipping self-referential {} link {}", rel.kind, rel.id);
                    skipped += 1;
                }
                _ => {
                    warn!(
                        "Skipping {} link {}: {} -> {} references an unknown person",
                        rel.kind, rel.id, rel.source_id, rel.target_id
                    );
                    skipped += 1;
                }
            }
        }

        debug!(
            "Resolved {} edges ({} skipped)",
            self.graph.edge_count(),
            skipped
        );
    }

    /// Finishes building and returns the graph.
    pub fn build(mut self) -> FamilyGraph {
        self.resolve_edges();
        self.graph
    }
}
