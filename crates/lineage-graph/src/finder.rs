//! Relationship finder.
//!
//! Classifies how two people are related by walking outward from both of
//! them. Checks run nearest relationship first and the first match wins,
//! so a full sibling who also shares a grandparent is reported as a
//! sibling rather than something more distant.
//!
//! Cousins are an approximation: any pair whose parents are siblings and
//! who share a grandparent is reported as cousins, with no first/second or
//! removed distinction. Trees with remarriage and half-sibling chains can
//! over- or under-match.

use crate::graph::{FamilyGraph, NodeId};
use crate::query::SiblingKind;
use lineage_core::Gender;
use serde::Serialize;
use tracing::debug;

/// The outcome of a relationship query.
///
/// `Display` renders the sentence shown to users. Names are copied out of
/// the graph so the result outlives the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "relation", rename_all = "snake_case")]
pub enum Kinship {
    /// One or both ids are not in the graph.
    NotFound,
    SamePerson {
        name: String,
    },
    Parent {
        parent: String,
        child: String,
    },
    Spouses {
        first: String,
        second: String,
    },
    Siblings {
        first: String,
        second: String,
        kind: SiblingKind,
    },
    Grandparent {
        elder: String,
        younger: String,
    },
    GreatGrandparent {
        elder: String,
        younger: String,
    },
    /// `elder` is a sibling of one of `younger`'s parents.
    AuntOrUncle {
        elder: String,
        younger: String,
        gender: Gender,
    },
    /// `elder` is a sibling of one of `younger`'s grandparents.
    GrandAuntOrUncle {
        elder: String,
        younger: String,
        gender: Gender,
    },
    Cousins {
        first: String,
        second: String,
    },
    /// `in_law` is married to a sibling of `of`, or is a sibling of their spouse.
    SiblingInLaw {
        in_law: String,
        of: String,
        gender: Gender,
    },
    /// Related too distantly, or not at all.
    Unidentified {
        first: String,
        second: String,
    },
}

impl Kinship {
    /// Short machine-friendly name of the relation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kinship::NotFound => "not_found",
            Kinship::SamePerson { .. } => "same_person",
            Kinship::Parent { .. } => "parent",
            Kinship::Spouses { .. } => "spouses",
            Kinship::Siblings { .. } => "siblings",
            Kinship::Grandparent { .. } => "grandparent",
            Kinship::GreatGrandparent { .. } => "great_grandparent",
            Kinship::AuntOrUncle { .. } => "aunt_or_uncle",
            Kinship::GrandAuntOrUncle { .. } => "grand_aunt_or_uncle",
            Kinship::Cousins { .. } => "cousins",
            Kinship::SiblingInLaw { .. } => "sibling_in_law",
            Kinship::Unidentified { .. } => "unidentified",
        }
    }

    /// Returns true if some relationship was identified.
    pub fn is_identified(&self) -> bool {
        !matches!(
            self,
            Kinship::NotFound | Kinship::SamePerson { .. } | Kinship::Unidentified { .. }
        )
    }
}

impl std::fmt::Display for Kinship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Kinship::NotFound => write!(f, "One or both individuals not found."),
            Kinship::SamePerson { name } => write!(f, "{} is the same person.", name),
            Kinship::Parent { parent, child } => {
                write!(f, "{} is the parent of {}.", parent, child)
            }
            Kinship::Spouses { first, second } => {
                write!(f, "{} and {} are spouses.", first, second)
            }
            Kinship::Siblings {
                first,
                second,
                kind,
            } => write!(f, "{} and {} are {} siblings.", first, second, kind),
            Kinship::Grandparent { elder, younger } => {
                write!(f, "{} is the grandparent of {}.", elder, younger)
            }
            Kinship::GreatGrandparent { elder, younger } => {
                write!(f, "{} is the great-grandparent of {}.", elder, younger)
            }
            Kinship::AuntOrUncle {
                elder,
                younger,
                gender,
            } => write!(
                f,
                "{} is an {} of {}.",
                elder,
                gender.pick("aunt", "uncle", "aunt or uncle"),
                younger
            ),
            Kinship::GrandAuntOrUncle {
                elder,
                younger,
                gender,
            } => write!(
                f,
                "{} is a {} of {}.",
                elder,
                gender.pick("grandaunt", "granduncle", "grandaunt or granduncle"),
                younger
            ),
            Kinship::Cousins { first, second } => {
                write!(f, "{} and {} are cousins.", first, second)
            }
            Kinship::SiblingInLaw { in_law, of, gender } => write!(
                f,
                "{} is the {} of {}.",
                in_law,
                gender.pick("sister-in-law", "brother-in-law", "sibling-in-law"),
                of
            ),
            Kinship::Unidentified { first, second } => write!(
                f,
                "The relationship between {} and {} is not directly identified by this tool or is more distant.",
                first, second
            ),
        }
    }
}

/// Classifies how the person `b_id` is related to the person `a_id`.
///
/// Total: unknown ids, identical ids and unrelated people all produce a
/// `Kinship` rather than an error.
pub fn find_relationship(graph: &FamilyGraph, a_id: &str, b_id: &str) -> Kinship {
    let (Some(a), Some(b)) = (graph.get_index(a_id), graph.get_index(b_id)) else {
        return Kinship::NotFound;
    };

    let kinship = Finder::new(graph, a, b).classify();
    debug!("{} ~ {}: {}", a_id, b_id, kinship.as_str());
    kinship
}

/// String form of `find_relationship`.
pub fn describe_relationship(graph: &FamilyGraph, a_id: &str, b_id: &str) -> String {
    find_relationship(graph, a_id, b_id).to_string()
}

/// One pair being classified, with the lookups shared between checks.
struct Finder<'g> {
    graph: &'g FamilyGraph,
    a: NodeId,
    b: NodeId,
    a_parents: Vec<NodeId>,
    b_parents: Vec<NodeId>,
}

impl<'g> Finder<'g> {
    fn new(graph: &'g FamilyGraph, a: NodeId, b: NodeId) -> Self {
        Self {
            graph,
            a,
            b,
            a_parents: graph.parent_indexes(a),
            b_parents: graph.parent_indexes(b),
        }
    }

    fn name(&self, index: NodeId) -> String {
        self.graph
            .get(index)
            .map(|p| p.name.clone())
            .unwrap_or_default()
    }

    fn gender(&self, index: NodeId) -> Gender {
        self.graph.get(index).map(|p| p.gender).unwrap_or_default()
    }

    fn is_sibling(&self, of: NodeId, candidate: NodeId) -> bool {
        self.graph.sibling_kind(of, candidate).is_some()
    }

    fn classify(&self) -> Kinship {
        let (a, b) = (self.a, self.b);
        if a == b {
            return Kinship::SamePerson { name: self.name(a) };
        }

        if let Some(found) = self.direct() {
            return found;
        }
        if let Some(found) = self.lineal() {
            return found;
        }
        if let Some(found) = self.collateral() {
            return found;
        }
        if let Some(found) = self.in_law() {
            return found;
        }

        Kinship::Unidentified {
            first: self.name(a),
            second: self.name(b),
        }
    }

    /// Parent, child, spouse and sibling.
    fn direct(&self) -> Option<Kinship> {
        let (a, b) = (self.a, self.b);

        if self.a_parents.contains(&b) {
            return Some(Kinship::Parent {
                parent: self.name(b),
                child: self.name(a),
            });
        }
        if self.b_parents.contains(&a) {
            return Some(Kinship::Parent {
                parent: self.name(a),
                child: self.name(b),
            });
        }

        if self.graph.spouse_indexes(a).contains(&b) {
            return Some(Kinship::Spouses {
                first: self.name(a),
                second: self.name(b),
            });
        }

        self.graph
            .sibling_kind(a, b)
            .map(|kind| Kinship::Siblings {
                first: self.name(a),
                second: self.name(b),
                kind,
            })
    }

    /// Grandparents and great-grandparents, in either direction.
    fn lineal(&self) -> Option<Kinship> {
        for (younger, elder) in [(self.a, self.b), (self.b, self.a)] {
            if self.graph.grandparent_indexes(younger).contains(&elder) {
                return Some(Kinship::Grandparent {
                    elder: self.name(elder),
                    younger: self.name(younger),
                });
            }
        }

        for (younger, elder) in [(self.a, self.b), (self.b, self.a)] {
            let great = self
                .graph
                .grandparent_indexes(younger)
                .into_iter()
                .any(|gp| self.graph.parent_indexes(gp).contains(&elder));
            if great {
                return Some(Kinship::GreatGrandparent {
                    elder: self.name(elder),
                    younger: self.name(younger),
                });
            }
        }

        None
    }

    /// Aunts and uncles, grand-aunts and grand-uncles, cousins.
    fn collateral(&self) -> Option<Kinship> {
        let pairs = [
            (self.a, self.b, &self.a_parents),
            (self.b, self.a, &self.b_parents),
        ];

        for (younger, elder, parents) in pairs {
            if parents.iter().any(|&p| self.is_sibling(p, elder)) {
                return Some(Kinship::AuntOrUncle {
                    elder: self.name(elder),
                    younger: self.name(younger),
                    gender: self.gender(elder),
                });
            }
        }

        let a_grandparents = self.graph.grandparent_indexes(self.a);
        let b_grandparents = self.graph.grandparent_indexes(self.b);

        for (younger, elder, grandparents) in [
            (self.a, self.b, &a_grandparents),
            (self.b, self.a, &b_grandparents),
        ] {
            if grandparents.iter().any(|&gp| self.is_sibling(gp, elder)) {
                return Some(Kinship::GrandAuntOrUncle {
                    elder: self.name(elder),
                    younger: self.name(younger),
                    gender: self.gender(elder),
                });
            }
        }

        let share_grandparent = a_grandparents.iter().any(|gp| b_grandparents.contains(gp));
        if share_grandparent {
            let parents_are_siblings = self.a_parents.iter().any(|&p1| {
                self.b_parents
                    .iter()
                    .any(|&p2| p1 != p2 && self.is_sibling(p1, p2))
            });
            if parents_are_siblings {
                return Some(Kinship::Cousins {
                    first: self.name(self.a),
                    second: self.name(self.b),
                });
            }
        }

        None
    }

    /// `b` is married to one of `a`'s siblings, or is a sibling of `a`'s spouse.
    fn in_law(&self) -> Option<Kinship> {
        let (a, b) = (self.a, self.b);

        let via_sibling = self
            .graph
            .sibling_indexes(a)
            .into_iter()
            .any(|(sibling, _)| self.graph.spouse_indexes(sibling).contains(&b));

        let via_spouse = || {
            self.graph
                .spouse_indexes(a)
                .into_iter()
                .any(|spouse| self.is_sibling(spouse, b))
        };

        if via_sibling || via_spouse() {
            return Some(Kinship::SiblingInLaw {
                in_law: self.name(b),
                of: self.name(a),
                gender: self.gender(b),
            });
        }
        None
    }
}
