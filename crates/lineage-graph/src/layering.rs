//! Generational layering.
//!
//! A `Layering` maps every node to a layer (generation depth) and every
//! layer to its ordered members. It is built in three phases:
//!
//! 1. Breadth-first descent from the roots. Children sit one layer below
//!    their parent and spouses are pulled onto the layer of whoever reached
//!    them first.
//! 2. Spouse synchronization. Each pass produces a new `Layering` in which
//!    spouses on different layers both move to the deeper one. Passes repeat
//!    until nothing changes or the pass budget runs out.
//! 3. Orphan placement. Nodes never reached go one layer below the deepest
//!    one.
//!
//! Layers are capped at the node count, so parent-child cycles terminate.

use crate::graph::{FamilyGraph, NodeId};
use std::collections::{BTreeMap, HashMap, VecDeque};
use tracing::{debug, warn};

/// Layer assignment for a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layering {
    layer_of: HashMap<NodeId, usize>,
    layers: BTreeMap<usize, Vec<NodeId>>,
}

/// Outcome of spouse synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpouseSync {
    /// Passes that moved at least one node.
    pub passes: usize,
    /// False if the pass budget ran out before a fixpoint.
    pub converged: bool,
}

impl Layering {
    /// Creates an empty layering.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs all three phases.
    pub fn compute(graph: &FamilyGraph) -> Self {
        let (roots, layering) = Self::descend(graph);
        let (layering, sync) = layering.synchronize_spouses(graph);
        if !sync.converged {
            warn!(
                "Spouse layers did not settle after {} passes; using best effort",
                sync.passes
            );
        }
        layering.place_orphans(graph, roots > 0)
    }

    /// Layer of a node, if it has one.
    pub fn layer(&self, node: NodeId) -> Option<usize> {
        self.layer_of.get(&node).copied()
    }

    /// Members of a layer, in the order they were placed there.
    pub fn members(&self, layer: usize) -> &[NodeId] {
        self.layers.get(&layer).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Non-empty layers in ascending order.
    pub fn layers(&self) -> impl Iterator<Item = (usize, &[NodeId])> {
        self.layers
            .iter()
            .filter(|(_, members)| !members.is_empty())
            .map(|(layer, members)| (*layer, members.as_slice()))
    }

    /// Deepest non-empty layer.
    pub fn max_layer(&self) -> Option<usize> {
        self.layers().map(|(layer, _)| layer).last()
    }

    /// Number of nodes with a layer.
    pub fn len(&self) -> usize {
        self.layer_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layer_of.is_empty()
    }

    /// Puts a node on a layer, taking it off its previous one.
    fn assign(&mut self, node: NodeId, layer: usize) {
        if let Some(previous) = self.layer_of.insert(node, layer) {
            if previous == layer {
                return;
            }
            if let Some(members) = self.layers.get_mut(&previous) {
                members.retain(|&n| n != node);
            }
        }
        self.layers.entry(layer).or_default().push(node);
    }

    /// Phase 1: breadth-first layering from the roots.
    ///
    /// Returns the number of roots alongside the layering. A node reached
    /// again at a deeper layer moves down; shallower or equal revisits are
    /// ignored.
    pub fn descend(graph: &FamilyGraph) -> (usize, Self) {
        let mut layering = Self::new();
        let depth_cap = graph.node_count().max(1);

        let roots: Vec<NodeId> = graph
            .node_indexes()
            .filter(|&idx| graph.parent_indexes(idx).is_empty())
            .collect();
        let mut queue: VecDeque<(NodeId, usize)> = roots.iter().map(|&r| (r, 0)).collect();
        let mut capped = 0usize;

        while let Some((node, layer)) = queue.pop_front() {
            if layer >= depth_cap {
                capped += 1;
                continue;
            }
            if let Some(current) = layering.layer(node) {
                if layer <= current {
                    continue;
                }
            }

            layering.assign(node, layer);

            for child in graph.child_indexes(node) {
                queue.push_back((child, layer + 1));
            }
            for spouse in graph.spouse_indexes(node) {
                if layering.layer(spouse).is_none() {
                    queue.push_back((spouse, layer));
                }
            }
        }

        if capped > 0 {
            warn!(
                "Parent-child cycle detected: {} visits stopped at depth {}",
                capped, depth_cap
            );
        }
        debug!(
            "Descent from {} roots reached {} of {} people",
            roots.len(),
            layering.len(),
            graph.node_count()
        );

        (roots.len(), layering)
    }

    /// One spouse synchronization pass.
    ///
    /// Returns the adjusted layering, or `None` if every pair of spouses
    /// already shares a layer.
    pub fn spouse_pass(&self, pairs: &[(NodeId, NodeId)]) -> Option<Self> {
        let mut next = self.clone();
        let mut changed = false;

        for &(a, b) in pairs {
            let (Some(layer_a), Some(layer_b)) = (next.layer(a), next.layer(b)) else {
                continue;
            };
            if layer_a != layer_b {
                let deeper = layer_a.max(layer_b);
                next.assign(a, deeper);
                next.assign(b, deeper);
                changed = true;
            }
        }

        changed.then_some(next)
    }

    /// Phase 2: repeat spouse passes until a fixpoint.
    ///
    /// The pass budget is the node count plus one; layers only ever move to
    /// values already present, so a spouse chain settles well within it.
    pub fn synchronize_spouses(self, graph: &FamilyGraph) -> (Self, SpouseSync) {
        let pairs = graph.spouse_pairs();
        let budget = graph.node_count() + 1;
        let mut current = self;
        let mut passes = 0;

        while passes < budget {
            match current.spouse_pass(&pairs) {
                Some(next) => {
                    current = next;
                    passes += 1;
                }
                None => {
                    debug!("Spouse layers settled after {} passes", passes);
                    return (
                        current,
                        SpouseSync {
                            passes,
                            converged: true,
                        },
                    );
                }
            }
        }

        (
            current,
            SpouseSync {
                passes,
                converged: false,
            },
        )
    }

    /// Phase 3: give every unreached node a layer.
    ///
    /// Orphans go one layer below the deepest layer, or on layer 0 when the
    /// graph has no roots at all.
    pub fn place_orphans(mut self, graph: &FamilyGraph, has_roots: bool) -> Self {
        let orphan_layer = match (has_roots, self.max_layer()) {
            (true, Some(max)) => max + 1,
            _ => 0,
        };

        let orphans: Vec<NodeId> = graph
            .node_indexes()
            .filter(|&idx| self.layer(idx).is_none())
            .collect();
        if !orphans.is_empty() {
            debug!("Placing {} unreached people on layer {}", orphans.len(), orphan_layer);
        }
        for node in orphans {
            self.assign(node, orphan_layer);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use lineage_core::{Person, Relationship, SpouseStatus};

    fn graph(ids: &[&str], edges: Vec<Relationship>) -> FamilyGraph {
        let people: Vec<Person> = ids.iter().map(|id| Person::new(*id, *id)).collect();
        GraphBuilder::from_parts(&people, &edges).build()
    }

    fn layer_of(graph: &FamilyGraph, layering: &Layering, id: &str) -> Option<usize> {
        layering.layer(graph.get_index(id)?)
    }

    #[test]
    fn test_parent_above_child() {
        let g = graph(&["a", "b"], vec![Relationship::parent_child("e1", "a", "b")]);
        let layering = Layering::compute(&g);
        assert_eq!(layer_of(&g, &layering, "a"), Some(0));
        assert_eq!(layer_of(&g, &layering, "b"), Some(1));
    }

    #[test]
    fn test_deeper_path_wins() {
        // a -> b -> c and a -> c: c ends up below b
        let g = graph(
            &["a", "b", "c"],
            vec![
                Relationship::parent_child("e1", "a", "c"),
                Relationship::parent_child("e2", "a", "b"),
                Relationship::parent_child("e3", "b", "c"),
            ],
        );
        let layering = Layering::compute(&g);
        assert_eq!(layer_of(&g, &layering, "c"), Some(2));
        assert_eq!(layering.members(1).len(), 1);
    }

    #[test]
    fn test_married_in_spouse_joins_partner_layer() {
        // p -> kid, kid = partner (partner has no parents)
        let g = graph(
            &["partner", "p", "kid"],
            vec![
                Relationship::parent_child("e1", "p", "kid"),
                Relationship::spouse("e2", "kid", "partner", SpouseStatus::Married),
            ],
        );
        let layering = Layering::compute(&g);
        assert_eq!(layer_of(&g, &layering, "kid"), Some(1));
        assert_eq!(layer_of(&g, &layering, "partner"), Some(1));
    }

    #[test]
    fn test_spouse_pass_moves_both_to_deeper_layer() {
        let g = graph(
            &["a", "b", "c", "d"],
            vec![
                Relationship::parent_child("e1", "a", "b"),
                Relationship::parent_child("e2", "b", "c"),
                Relationship::spouse("e3", "c", "d", SpouseStatus::Married),
            ],
        );
        // Hand-built layering with the spouses apart.
        let mut layering = Layering::new();
        for (id, layer) in [("a", 0), ("b", 1), ("c", 2), ("d", 0)] {
            layering.assign(g.get_index(id).unwrap(), layer);
        }

        let next = layering.spouse_pass(&g.spouse_pairs()).unwrap();
        assert_eq!(layer_of(&g, &next, "d"), Some(2));
        assert_eq!(next.members(0), &[g.get_index("a").unwrap()]);
        assert!(next.spouse_pass(&g.spouse_pairs()).is_none());

        // The original value is untouched.
        assert_eq!(layer_of(&g, &layering, "d"), Some(0));
    }

    #[test]
    fn test_spouse_chain_converges() {
        // x0 -> x1 -> x2 -> x3, and a chain of spouses hanging off x3
        let ids = ["x0", "x1", "x2", "x3", "s1", "s2", "s3"];
        let mut edges = vec![
            Relationship::parent_child("p1", "x0", "x1"),
            Relationship::parent_child("p2", "x1", "x2"),
            Relationship::parent_child("p3", "x2", "x3"),
            Relationship::spouse("m1", "s3", "s2", SpouseStatus::Married),
            Relationship::spouse("m2", "s2", "s1", SpouseStatus::Divorced),
            Relationship::spouse("m3", "s1", "x3", SpouseStatus::Married),
        ];
        edges.push(Relationship::parent_child("p4", "s3", "x0"));
        let g = graph(&ids, edges);

        let (roots, layering) = Layering::descend(&g);
        assert_eq!(roots, 3);
        let (layering, sync) = layering.synchronize_spouses(&g);
        assert!(sync.converged);

        let expected = layer_of(&g, &layering, "x3");
        for id in ["s1", "s2", "s3"] {
            assert_eq!(layer_of(&g, &layering, id), expected, "{} off layer", id);
        }
    }

    #[test]
    fn test_cycle_terminates_and_places_everyone() {
        let g = graph(
            &["root", "a", "b", "loop1", "loop2"],
            vec![
                Relationship::parent_child("e1", "root", "a"),
                Relationship::parent_child("e2", "a", "b"),
                Relationship::parent_child("e3", "b", "a"),
                Relationship::parent_child("e4", "loop1", "loop2"),
                Relationship::parent_child("e5", "loop2", "loop1"),
            ],
        );
        let layering = Layering::compute(&g);
        assert_eq!(layering.len(), 5);
        let max = layering.max_layer().unwrap();
        assert!(max < 6);
        // the rootless loop is placed one layer below everything else
        assert_eq!(layer_of(&g, &layering, "loop1"), Some(max));
        assert_eq!(layer_of(&g, &layering, "loop2"), Some(max));
        for id in ["root", "a", "b"] {
            assert!(layer_of(&g, &layering, id).unwrap() < max, "{} on the loop's layer", id);
        }
    }

    #[test]
    fn test_no_roots_places_orphans_on_layer_zero() {
        let g = graph(
            &["a", "b"],
            vec![
                Relationship::parent_child("e1", "a", "b"),
                Relationship::parent_child("e2", "b", "a"),
            ],
        );
        let layering = Layering::compute(&g);
        assert_eq!(layering.members(0).len(), 2);
    }

    #[test]
    fn test_empty_graph() {
        let layering = Layering::compute(&FamilyGraph::new());
        assert!(layering.is_empty());
        assert_eq!(layering.max_layer(), None);
    }
}
