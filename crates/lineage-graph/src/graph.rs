//! Core graph data structure.
//!
//! The FamilyGraph wraps petgraph and adds an id index for fast lookups.
//! It is an immutable snapshot of a document: built once per call by the
//! `GraphBuilder`, queried by the finder and the layout engine, then
//! dropped.

use crate::edge::{Edge, GraphEdge};
use lineage_core::{Person, RelationKind};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Index of a person in the graph.
pub type NodeId = NodeIndex;

/// The family relationship graph.
///
/// People are nodes, recorded relationships are edges. Node indexes follow
/// the order people were added, which is what every tie-break falls back
/// on.
#[derive(Debug, Clone)]
pub struct FamilyGraph {
    /// The underlying petgraph graph.
    pub(crate) graph: DiGraph<Person, Edge>,

    /// Maps person ids to graph node indexes.
    id_index: HashMap<String, NodeId>,
}

impl Default for FamilyGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl FamilyGraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            id_index: HashMap::new(),
        }
    }

    /// Adds a person to the graph.
    ///
    /// Returns `None` if a person with the same id is already present; the
    /// first one recorded wins.
    pub(crate) fn add_person(&mut self, person: Person) -> Option<NodeId> {
        if self.id_index.contains_key(&person.id) {
            return None;
        }
        let id = person.id.clone();
        let index = self.graph.add_node(person);
        self.id_index.insert(id, index);
        Some(index)
    }

    /// Adds an edge between two people.
    pub(crate) fn add_edge(&mut self, from: NodeId, to: NodeId, edge: Edge) {
        self.graph.add_edge(from, to, edge);
    }

    /// Gets a person by id.
    pub fn get_by_id(&self, id: &str) -> Option<&Person> {
        let index = self.id_index.get(id)?;
        self.graph.node_weight(*index)
    }

    /// Gets a person by graph index.
    pub fn get(&self, index: NodeId) -> Option<&Person> {
        self.graph.node_weight(index)
    }

    /// Gets the node index for a person id.
    pub fn get_index(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.id_index.contains_key(id)
    }

    /// Finds everyone whose name matches exactly, ignoring case.
    pub fn find_by_name(&self, name: &str) -> Vec<&Person> {
        let wanted = name.to_lowercase();
        self.graph
            .node_weights()
            .filter(|p| p.name.to_lowercase() == wanted)
            .collect()
    }

    /// Searches for people whose name contains the query.
    pub fn search(&self, query: &str) -> Vec<&Person> {
        let query_lower = query.to_lowercase();
        self.graph
            .node_weights()
            .filter(|p| p.name.to_lowercase().contains(&query_lower))
            .collect()
    }

    /// Returns the number of people.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of relationships.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Iterates over all people in insertion order.
    pub fn persons(&self) -> impl Iterator<Item = &Person> {
        self.graph.node_weights()
    }

    /// Iterates over all node indexes in insertion order.
    pub fn node_indexes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.node_indices()
    }

    /// Returns every spouse pair in the order the links were recorded.
    pub fn spouse_pairs(&self) -> Vec<(NodeId, NodeId)> {
        self.graph
            .edge_references()
            .filter(|e| e.weight().is_spouse())
            .map(|e| (e.source(), e.target()))
            .collect()
    }

    /// Returns all edges with person ids for export.
    pub fn export_edges(&self) -> Vec<GraphEdge> {
        self.graph
            .edge_references()
            .filter_map(|edge_ref| {
                let source = self.graph.node_weight(edge_ref.source())?.id.clone();
                let target = self.graph.node_weight(edge_ref.target())?.id.clone();
                let weight = edge_ref.weight();
                Some(GraphEdge {
                    source,
                    target,
                    kind: weight.kind,
                    connector: weight.connector_style(),
                })
            })
            .collect()
    }

    /// Neighbours over edges of one kind, in edge insertion order, without
    /// duplicates.
    pub(crate) fn neighbours(
        &self,
        index: NodeId,
        kind: RelationKind,
        direction: petgraph::Direction,
    ) -> Vec<NodeId> {
        let mut found: Vec<(EdgeIndex, NodeId)> = self
            .graph
            .edges_directed(index, direction)
            .filter(|e| e.weight().kind == kind)
            .map(|e| {
                let other = match direction {
                    petgraph::Direction::Incoming => e.source(),
                    petgraph::Direction::Outgoing => e.target(),
                };
                (e.id(), other)
            })
            .collect();
        found.sort_by_key(|(edge, _)| *edge);

        let mut result = Vec::with_capacity(found.len());
        for (_, node) in found {
            if !result.contains(&node) {
                result.push(node);
            }
        }
        result
    }
}

/// Graph statistics for status output.
#[derive(Debug, Serialize, Deserialize)]
pub struct GraphStats {
    pub people: usize,
    pub relationships: usize,
    pub spouse_links: usize,
    pub roots: usize,
    pub deceased: usize,
}

impl FamilyGraph {
    /// Returns graph statistics.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            people: self.node_count(),
            relationships: self.edge_count(),
            spouse_links: self.spouse_pairs().len(),
            roots: self
                .node_indexes()
                .filter(|&idx| self.parent_indexes(idx).is_empty())
                .count(),
            deceased: self.persons().filter(|p| p.is_deceased()).count(),
        }
    }
}
