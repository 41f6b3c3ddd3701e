//! Property tests over randomly generated family trees.

use lineage_core::{FamilyDocument, Person, RelationKind, Relationship};
use lineage_graph::{arrange, find_relationship, GraphBuilder, Kinship, LayoutConfig, LayoutEngine};
use proptest::prelude::*;

/// Builds a document from raw link attempts, keeping only the ones the
/// document accepts.
fn family(size: usize, links: &[(usize, usize, bool)]) -> FamilyDocument {
    let mut doc = FamilyDocument::new();
    for i in 0..size {
        doc.add_person(Person::new(format!("p{}", i), format!("Person {}", i)))
            .unwrap();
    }
    for (n, &(from, to, spouse)) in links.iter().enumerate() {
        let kind = if spouse {
            RelationKind::Spouse
        } else {
            RelationKind::ParentChild
        };
        let _ = doc.add_relationship(
            format!("e{}", n),
            &format!("p{}", from % size),
            &format!("p{}", to % size),
            kind,
        );
    }
    doc
}

/// True when `a` and `b` are each recorded as the other's parent.
fn mutual_parents(edges: &[Relationship], a: &str, b: &str) -> bool {
    let parent_of = |parent: &str, child: &str| {
        edges.iter().any(|e| {
            e.kind == RelationKind::ParentChild && e.source_id == parent && e.target_id == child
        })
    };
    parent_of(a, b) && parent_of(b, a)
}

fn family_strategy() -> impl Strategy<Value = FamilyDocument> {
    (1usize..12).prop_flat_map(|size| {
        prop::collection::vec((0..size, 0..size, any::<bool>()), 0..24)
            .prop_map(move |links| family(size, &links))
    })
}

proptest! {
    #[test]
    fn test_same_person_is_identity(doc in family_strategy()) {
        let graph = GraphBuilder::from_document(&doc).build();
        for person in &doc.nodes {
            let same = matches!(
                find_relationship(&graph, &person.id, &person.id),
                Kinship::SamePerson { .. }
            );
            prop_assert!(same);
        }
    }

    #[test]
    fn test_direct_relations_are_symmetric(doc in family_strategy()) {
        let graph = GraphBuilder::from_document(&doc).build();
        for a in &doc.nodes {
            for b in &doc.nodes {
                // Each side of a two-person parent loop reports its own parent.
                if mutual_parents(&doc.edges, &a.id, &b.id) {
                    continue;
                }
                let forward = find_relationship(&graph, &a.id, &b.id);
                let backward = find_relationship(&graph, &b.id, &a.id);
                if matches!(
                    forward,
                    Kinship::Parent { .. } | Kinship::Spouses { .. } | Kinship::Siblings { .. }
                ) {
                    prop_assert_eq!(forward.as_str(), backward.as_str());
                }
                if let (Kinship::Parent { parent: p1, child: c1 }, Kinship::Parent { parent: p2, child: c2 }) =
                    (&forward, &backward)
                {
                    prop_assert_eq!(p1, p2);
                    prop_assert_eq!(c1, c2);
                }
            }
        }
    }

    #[test]
    fn test_siblings_are_symmetric_with_same_kind(doc in family_strategy()) {
        let graph = GraphBuilder::from_document(&doc).build();
        for a in &doc.nodes {
            for sibling in graph.siblings_of(&a.id) {
                let back = graph
                    .siblings_of(&sibling.person.id)
                    .into_iter()
                    .find(|s| s.person.id == a.id);
                prop_assert!(back.is_some(), "{} lists {} but not back", a.id, sibling.person.id);
                prop_assert_eq!(back.map(|s| s.kind), Some(sibling.kind));
            }
        }
    }

    #[test]
    fn test_layout_places_everyone(doc in family_strategy(), width in 0.0f64..2000.0) {
        let graph = GraphBuilder::from_document(&doc).build();
        let layout = LayoutEngine::default().compute(&graph, width);

        prop_assert_eq!(layout.placements.len(), doc.nodes.len());
        for placement in &layout.placements {
            prop_assert!(placement.x.is_finite() && placement.y.is_finite());
            prop_assert!(placement.x >= LayoutConfig::default().min_left_margin);
        }

        for (a, b) in graph.spouse_pairs() {
            prop_assert_eq!(layout.layering.layer(a), layout.layering.layer(b));
        }
    }

    #[test]
    fn test_arrange_is_idempotent(doc in family_strategy()) {
        let config = LayoutConfig::default();
        let once = arrange(&doc.nodes, &doc.edges, 1000.0, &config);
        let twice = arrange(&once, &doc.edges, 1000.0, &config);

        for (first, second) in once.iter().zip(&twice) {
            prop_assert_eq!(first.position(), second.position());
        }
    }
}
