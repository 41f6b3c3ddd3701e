//! Kinship queries over the family graph.
//!
//! These are the building blocks the relationship finder and the layout
//! engine share: parents, children, spouses and siblings of a person.
//! Unknown ids yield empty results rather than errors.

use crate::graph::{FamilyGraph, NodeId};
use lineage_core::{Person, RelationKind};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use std::collections::BTreeSet;

/// Whether two siblings share all their parents or only some.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SiblingKind {
    /// Identical parent sets with at least two parents.
    Full,
    /// Overlapping but different parent sets, or one shared parent.
    Half,
}

impl std::fmt::Display for SiblingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SiblingKind::Full => write!(f, "full"),
            SiblingKind::Half => write!(f, "half"),
        }
    }
}

/// A sibling of some person, with how closely they are related.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sibling<'a> {
    pub person: &'a Person,
    pub kind: SiblingKind,
}

impl FamilyGraph {
    /// Parents of a node, in the order the links were recorded.
    pub fn parent_indexes(&self, index: NodeId) -> Vec<NodeId> {
        self.neighbours(index, RelationKind::ParentChild, Direction::Incoming)
    }

    /// Children of a node, in the order the links were recorded.
    pub fn child_indexes(&self, index: NodeId) -> Vec<NodeId> {
        self.neighbours(index, RelationKind::ParentChild, Direction::Outgoing)
    }

    /// Spouses of a node over links recorded in either direction.
    pub fn spouse_indexes(&self, index: NodeId) -> Vec<NodeId> {
        let mut links: Vec<_> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .filter(|e| e.weight().is_spouse())
            .map(|e| (e.id(), e.target()))
            .chain(
                self.graph
                    .edges_directed(index, Direction::Incoming)
                    .filter(|e| e.weight().is_spouse())
                    .map(|e| (e.id(), e.source())),
            )
            .collect();
        links.sort_by_key(|(edge, _)| *edge);

        let mut result = Vec::with_capacity(links.len());
        for (_, node) in links {
            if node != index && !result.contains(&node) {
                result.push(node);
            }
        }
        result
    }

    /// Parents of parents, flattened in order without duplicates.
    pub fn grandparent_indexes(&self, index: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        for parent in self.parent_indexes(index) {
            for grandparent in self.parent_indexes(parent) {
                if !result.contains(&grandparent) {
                    result.push(grandparent);
                }
            }
        }
        result
    }

    /// Siblings of a node, ordered by node index.
    ///
    /// Anyone sharing at least one parent counts. People without recorded
    /// parents have no siblings.
    pub fn sibling_indexes(&self, index: NodeId) -> Vec<(NodeId, SiblingKind)> {
        let parents = self.parent_indexes(index);
        if parents.is_empty() {
            return Vec::new();
        }
        let parent_set: BTreeSet<NodeId> = parents.iter().copied().collect();

        let mut candidates: BTreeSet<NodeId> = BTreeSet::new();
        for &parent in &parents {
            candidates.extend(self.child_indexes(parent));
        }
        candidates.remove(&index);

        candidates
            .into_iter()
            .map(|candidate| {
                let theirs: BTreeSet<NodeId> =
                    self.parent_indexes(candidate).into_iter().collect();
                let kind = if theirs == parent_set && parent_set.len() >= 2 {
                    SiblingKind::Full
                } else {
                    SiblingKind::Half
                };
                (candidate, kind)
            })
            .collect()
    }

    /// Returns the sibling kind linking two nodes, if they are siblings.
    pub fn sibling_kind(&self, a: NodeId, b: NodeId) -> Option<SiblingKind> {
        self.sibling_indexes(a)
            .into_iter()
            .find(|(node, _)| *node == b)
            .map(|(_, kind)| kind)
    }

    /// All people that are source of a parent-child link targeting `id`.
    pub fn parents_of(&self, id: &str) -> Vec<&Person> {
        self.resolve_all(id, |idx| self.parent_indexes(idx))
    }

    /// All people that are target of a parent-child link from `id`.
    pub fn children_of(&self, id: &str) -> Vec<&Person> {
        self.resolve_all(id, |idx| self.child_indexes(idx))
    }

    /// All people linked to `id` by a spouse link, either direction.
    pub fn spouses_of(&self, id: &str) -> Vec<&Person> {
        self.resolve_all(id, |idx| self.spouse_indexes(idx))
    }

    /// All grandparents of `id`.
    pub fn grandparents_of(&self, id: &str) -> Vec<&Person> {
        self.resolve_all(id, |idx| self.grandparent_indexes(idx))
    }

    /// All siblings of `id`, classified full or half.
    pub fn siblings_of(&self, id: &str) -> Vec<Sibling<'_>> {
        let Some(index) = self.get_index(id) else {
            return Vec::new();
        };
        self.sibling_indexes(index)
            .into_iter()
            .filter_map(|(node, kind)| self.get(node).map(|person| Sibling { person, kind }))
            .collect()
    }

    fn resolve_all<F>(&self, id: &str, lookup: F) -> Vec<&Person>
    where
        F: Fn(NodeId) -> Vec<NodeId>,
    {
        match self.get_index(id) {
            Some(index) => lookup(index)
                .into_iter()
                .filter_map(|node| self.get(node))
                .collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::GraphBuilder;
    use crate::query::SiblingKind;
    use lineage_core::{Person, Relationship, SpouseStatus};

    fn names(people: Vec<&Person>) -> Vec<&str> {
        people.iter().map(|p| p.name.as_str()).collect()
    }

    fn family() -> crate::FamilyGraph {
        // mum + dad -> ann, ben; dad + other -> cal
        let people = ["mum", "dad", "other", "ann", "ben", "cal", "loner"]
            .iter()
            .map(|id| Person::new(*id, *id))
            .collect::<Vec<_>>();
        let edges = vec![
            Relationship::parent_child("e1", "mum", "ann"),
            Relationship::parent_child("e2", "dad", "ann"),
            Relationship::parent_child("e3", "mum", "ben"),
            Relationship::parent_child("e4", "dad", "ben"),
            Relationship::parent_child("e5", "dad", "cal"),
            Relationship::parent_child("e6", "other", "cal"),
            Relationship::spouse("e7", "mum", "dad", SpouseStatus::Married),
            Relationship::spouse("e8", "other", "dad", SpouseStatus::Divorced),
        ];
        GraphBuilder::from_parts(&people, &edges).build()
    }

    #[test]
    fn test_parents_children_spouses() {
        let graph = family();
        assert_eq!(names(graph.parents_of("ann")), vec!["mum", "dad"]);
        assert_eq!(names(graph.children_of("dad")), vec!["ann", "ben", "cal"]);
        assert_eq!(names(graph.spouses_of("dad")), vec!["mum", "other"]);
        assert_eq!(names(graph.spouses_of("other")), vec!["dad"]);
    }

    #[test]
    fn test_unknown_ids_are_empty() {
        let graph = family();
        assert!(graph.parents_of("nobody").is_empty());
        assert!(graph.children_of("nobody").is_empty());
        assert!(graph.spouses_of("nobody").is_empty());
        assert!(graph.siblings_of("nobody").is_empty());
    }

    #[test]
    fn test_sibling_classification() {
        let graph = family();
        let ann: Vec<_> = graph
            .siblings_of("ann")
            .into_iter()
            .map(|s| (s.person.id.as_str(), s.kind))
            .collect();
        assert_eq!(ann, vec![("ben", SiblingKind::Full), ("cal", SiblingKind::Half)]);

        let cal: Vec<_> = graph
            .siblings_of("cal")
            .into_iter()
            .map(|s| (s.person.id.as_str(), s.kind))
            .collect();
        assert_eq!(cal, vec![("ann", SiblingKind::Half), ("ben", SiblingKind::Half)]);
    }

    #[test]
    fn test_no_parents_no_siblings() {
        let graph = family();
        assert!(graph.siblings_of("mum").is_empty());
        assert!(graph.siblings_of("loner").is_empty());
    }

    #[test]
    fn test_single_shared_parent_is_half() {
        let people = vec![Person::new("p", "p"), Person::new("a", "a"), Person::new("b", "b")];
        let edges = vec![
            Relationship::parent_child("e1", "p", "a"),
            Relationship::parent_child("e2", "p", "b"),
        ];
        let graph = GraphBuilder::from_parts(&people, &edges).build();
        let a = graph.get_index("a").unwrap();
        let b = graph.get_index("b").unwrap();
        assert_eq!(graph.sibling_kind(a, b), Some(SiblingKind::Half));
    }
}
