//! The exchanged family tree document.
//!
//! A document is just two arrays, `nodes` and `edges`. It is the canonical
//! state a host holds and the only thing that is ever persisted. Structural
//! edits go through the methods here so the edge invariants hold no matter
//! which front end is driving.

use crate::error::{DocumentError, LinkError};
use crate::person::{Gender, Person, PersonDraft};
use crate::relationship::{RelationKind, Relationship, SpouseStatus};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Canvas width assumed when the real one is unknown.
pub const DEFAULT_CANVAS_WIDTH: f64 = 800.0;

/// Canvas height assumed when the real one is unknown.
pub const DEFAULT_CANVAS_HEIGHT: f64 = 600.0;

/// Offset added to random placeholder coordinates.
const PLACEHOLDER_MARGIN: f64 = 50.0;

/// Fraction of the canvas used for random placeholders.
const PLACEHOLDER_SPREAD: f64 = 0.8;

/// A family tree: people plus the links between them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FamilyDocument {
    pub nodes: Vec<Person>,
    pub edges: Vec<Relationship>,
}

impl FamilyDocument {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a document, validating the top-level shape first.
    ///
    /// Both `nodes` and `edges` must be present and must be arrays. Entries
    /// are then decoded strictly; positions are left as found.
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        let value: serde_json::Value = serde_json::from_str(text)?;

        let object = value
            .as_object()
            .ok_or_else(|| DocumentError::InvalidShape("top level must be an object".into()))?;

        for key in ["nodes", "edges"] {
            match object.get(key) {
                Some(serde_json::Value::Array(_)) => {}
                Some(_) => {
                    return Err(DocumentError::InvalidShape(format!(
                        "'{}' must be an array",
                        key
                    )))
                }
                None => {
                    return Err(DocumentError::InvalidShape(format!(
                        "missing '{}' array",
                        key
                    )))
                }
            }
        }

        let document: FamilyDocument = serde_json::from_value(value)?;
        debug!(
            "Parsed document with {} people and {} relationships",
            document.nodes.len(),
            document.edges.len()
        );
        Ok(document)
    }

    /// Parses a document and gives every unplaced person a random
    /// placeholder position until the next auto-arrange.
    pub fn import<R: Rng + ?Sized>(
        text: &str,
        rng: &mut R,
        canvas_width: f64,
        canvas_height: f64,
    ) -> Result<Self, DocumentError> {
        let mut document = Self::parse(text)?;
        document.fill_missing_positions(rng, canvas_width, canvas_height);
        Ok(document)
    }

    /// Serializes to pretty JSON with exactly the two arrays.
    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Replaces missing or non-finite coordinates with random placeholders.
    ///
    /// Returns how many people were touched.
    pub fn fill_missing_positions<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        canvas_width: f64,
        canvas_height: f64,
    ) -> usize {
        let width = usable_extent(canvas_width, DEFAULT_CANVAS_WIDTH);
        let height = usable_extent(canvas_height, DEFAULT_CANVAS_HEIGHT);
        let mut filled = 0;

        for person in &mut self.nodes {
            let mut touched = false;
            if !person.x.is_some_and(f64::is_finite) {
                person.x = Some(placeholder_coordinate(rng, width));
                touched = true;
            }
            if !person.y.is_some_and(f64::is_finite) {
                person.y = Some(placeholder_coordinate(rng, height));
                touched = true;
            }
            if touched {
                filled += 1;
            }
        }

        if filled > 0 {
            debug!("Assigned placeholder positions to {} people", filled);
        }
        filled
    }

    /// Looks up a person by id.
    pub fn person(&self, id: &str) -> Option<&Person> {
        self.nodes.iter().find(|p| p.id == id)
    }

    fn person_mut(&mut self, id: &str) -> Option<&mut Person> {
        self.nodes.iter_mut().find(|p| p.id == id)
    }

    /// Looks up a relationship by id.
    pub fn relationship(&self, id: &str) -> Option<&Relationship> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Returns true if a person with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.person(id).is_some()
    }

    /// Adds a person. Ids must be unique.
    pub fn add_person(&mut self, person: Person) -> Result<&Person, LinkError> {
        if self.contains(&person.id) {
            return Err(LinkError::DuplicatePerson(person.id));
        }
        self.nodes.push(person);
        let index = self.nodes.len() - 1;
        Ok(&self.nodes[index])
    }

    /// Merges a draft into an existing person.
    pub fn update_person(&mut self, id: &str, draft: &PersonDraft) -> Result<&Person, LinkError> {
        let person = self
            .person_mut(id)
            .ok_or_else(|| LinkError::UnknownPerson(id.to_string()))?;
        draft.apply_to(person);
        Ok(person)
    }

    /// Moves a person to an explicit position.
    pub fn move_person(&mut self, id: &str, x: f64, y: f64) -> Result<(), LinkError> {
        let person = self
            .person_mut(id)
            .ok_or_else(|| LinkError::UnknownPerson(id.to_string()))?;
        person.x = Some(x);
        person.y = Some(y);
        Ok(())
    }

    /// Removes a person and every relationship that references them.
    ///
    /// Returns the removed person and the relationships dropped with them.
    pub fn remove_person(&mut self, id: &str) -> Result<(Person, Vec<Relationship>), LinkError> {
        let index = self
            .nodes
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| LinkError::UnknownPerson(id.to_string()))?;
        let person = self.nodes.remove(index);

        let (dropped, kept): (Vec<_>, Vec<_>) =
            self.edges.drain(..).partition(|edge| edge.involves(id));
        self.edges = kept;

        debug!(
            "Removed {} and {} relationships referencing them",
            person.id,
            dropped.len()
        );
        Ok((person, dropped))
    }

    /// Adds a relationship after checking the edge invariants.
    ///
    /// Both people must exist, a person cannot be linked to themselves, and
    /// the same link cannot be recorded twice (spouse links in either
    /// direction count as the same). New spouse links start as married.
    pub fn add_relationship(
        &mut self,
        id: impl Into<String>,
        source_id: &str,
        target_id: &str,
        kind: RelationKind,
    ) -> Result<&Relationship, LinkError> {
        if source_id == target_id {
            return Err(LinkError::SelfLink);
        }
        for endpoint in [source_id, target_id] {
            if !self.contains(endpoint) {
                return Err(LinkError::UnknownPerson(endpoint.to_string()));
            }
        }
        if self
            .edges
            .iter()
            .any(|edge| edge.same_link(source_id, target_id, kind))
        {
            return Err(LinkError::Duplicate(kind));
        }

        let relationship = match kind {
            RelationKind::ParentChild => Relationship::parent_child(id, source_id, target_id),
            RelationKind::Spouse => {
                Relationship::spouse(id, source_id, target_id, SpouseStatus::Married)
            }
        };
        self.edges.push(relationship);
        let index = self.edges.len() - 1;
        Ok(&self.edges[index])
    }

    /// Removes a relationship by id.
    pub fn remove_relationship(&mut self, id: &str) -> Result<Relationship, LinkError> {
        let index = self
            .edges
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| LinkError::UnknownRelationship(id.to_string()))?;
        Ok(self.edges.remove(index))
    }

    /// Changes the status of a spouse relationship.
    pub fn set_spouse_status(
        &mut self,
        id: &str,
        status: SpouseStatus,
    ) -> Result<&Relationship, LinkError> {
        let edge = self
            .edges
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| LinkError::UnknownRelationship(id.to_string()))?;
        if edge.kind != RelationKind::Spouse {
            return Err(LinkError::NotASpouseLink);
        }
        edge.status = Some(status);
        Ok(edge)
    }

    /// Counts relationships that point at people missing from the document.
    pub fn dangling_relationships(&self) -> usize {
        let dangling = self
            .edges
            .iter()
            .filter(|e| !self.contains(&e.source_id) || !self.contains(&e.target_id))
            .count();
        if dangling > 0 {
            warn!("{} relationships reference unknown people", dangling);
        }
        dangling
    }

    /// The demo tree shown to first-time users.
    pub fn sample() -> Self {
        let photo = || Some("https://placehold.co/80x80.png".to_string());

        let mut people = vec![
            Person::new("1", "John Doe")
                .with_gender(Gender::Male)
                .with_dates(Some("1970-01-01"), None),
            Person::new("2", "Jane Smith (Doe)")
                .with_gender(Gender::Female)
                .with_dates(Some("1972-03-15"), Some("2020-05-10")),
            Person::new("3", "Peter Doe")
                .with_gender(Gender::Male)
                .with_dates(Some("1995-06-20"), None),
            Person::new("4", "Alice Doe-Green")
                .with_gender(Gender::Female)
                .with_dates(Some("1998-09-10"), None),
            Person::new("5", "Charlie Green")
                .with_gender(Gender::Male)
                .with_dates(Some("1997-11-05"), None),
            Person::new("6", "Laura Doe")
                .with_gender(Gender::Female)
                .with_dates(Some("2000-01-01"), None),
        ];
        for person in &mut people {
            person.photo_url = photo();
        }

        let edges = vec![
            Relationship::spouse("e1", "1", "2", SpouseStatus::Divorced),
            Relationship::parent_child("e2", "1", "3"),
            Relationship::parent_child("e3", "2", "3"),
            Relationship::parent_child("e4", "2", "4"),
            Relationship::parent_child("e5", "1", "4"),
            Relationship::spouse("e6", "4", "5", SpouseStatus::Married),
            Relationship::parent_child("e7", "1", "6"),
            Relationship::parent_child("e8", "2", "6"),
        ];

        Self {
            nodes: people,
            edges,
        }
    }
}

fn usable_extent(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

/// Random coordinate in `margin..margin + extent * 0.8`.
///
/// Collapses to `margin` when the extent leaves no room.
pub fn random_coordinate<R: Rng + ?Sized>(rng: &mut R, extent: f64, margin: f64) -> f64 {
    let span = extent * PLACEHOLDER_SPREAD;
    if span.is_finite() && span > 0.0 {
        rng.gen_range(0.0..span) + margin
    } else {
        margin
    }
}

/// Random coordinate for someone who has not been placed yet.
pub fn placeholder_coordinate<R: Rng + ?Sized>(rng: &mut R, extent: f64) -> f64 {
    random_coordinate(rng, extent, PLACEHOLDER_MARGIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn two_people() -> FamilyDocument {
        let mut doc = FamilyDocument::new();
        doc.add_person(Person::new("a", "Ann")).unwrap();
        doc.add_person(Person::new("b", "Bob")).unwrap();
        doc
    }

    #[test]
    fn test_parse_requires_both_arrays() {
        let err = FamilyDocument::parse(r#"{"nodes": []}"#).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidShape(_)));
        assert!(err.to_string().contains("edges"));

        let err = FamilyDocument::parse(r#"{"nodes": [], "edges": {}}"#).unwrap_err();
        assert!(err.to_string().contains("'edges' must be an array"));

        let err = FamilyDocument::parse("[]").unwrap_err();
        assert!(matches!(err, DocumentError::InvalidShape(_)));

        assert!(matches!(
            FamilyDocument::parse("not json").unwrap_err(),
            DocumentError::Json(_)
        ));
    }

    #[test]
    fn test_import_fills_placeholders_within_canvas() {
        let text = r#"{
            "nodes": [
                {"id": "1", "name": "Placed", "x": 10, "y": 20},
                {"id": "2", "name": "Loose"}
            ],
            "edges": []
        }"#;
        let mut rng = StdRng::seed_from_u64(7);
        let doc = FamilyDocument::import(text, &mut rng, 0.0, 0.0).unwrap();

        assert_eq!(doc.nodes[0].position(), Some((10.0, 20.0)));
        let (x, y) = doc.nodes[1].position().unwrap();
        assert!((50.0..=50.0 + DEFAULT_CANVAS_WIDTH * 0.8).contains(&x));
        assert!((50.0..=50.0 + DEFAULT_CANVAS_HEIGHT * 0.8).contains(&y));
    }

    #[test]
    fn test_random_coordinate_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let x = placeholder_coordinate(&mut rng, 100.0);
            assert!((50.0..130.0).contains(&x));
        }
        assert_eq!(random_coordinate(&mut rng, 0.0, 12.0), 12.0);
        assert_eq!(random_coordinate(&mut rng, f64::NAN, 12.0), 12.0);
    }

    #[test]
    fn test_parse_accepts_blank_and_partial_dates() {
        let text = r#"{
            "nodes": [
                {"id": "1", "name": "Ann", "birthDate": "1970-01-01", "deathDate": ""},
                {"id": "2", "name": "Bo", "birthDate": "1970"}
            ],
            "edges": []
        }"#;
        let doc = FamilyDocument::parse(text).unwrap();

        assert_eq!(doc.nodes[0].death_date, None);
        assert!(!doc.nodes[0].is_deceased());
        assert_eq!(doc.nodes[1].birth_date.as_deref(), Some("1970"));

        let back = FamilyDocument::parse(&doc.to_json_pretty().unwrap()).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_export_round_trips_sample() {
        let sample = FamilyDocument::sample();
        let text = sample.to_json_pretty().unwrap();
        assert_eq!(FamilyDocument::parse(&text).unwrap(), sample);
    }

    #[test]
    fn test_add_relationship_invariants() {
        let mut doc = two_people();

        assert_eq!(
            doc.add_relationship("e0", "a", "a", RelationKind::Spouse).unwrap_err(),
            LinkError::SelfLink
        );
        assert_eq!(
            doc.add_relationship("e0", "a", "zed", RelationKind::ParentChild).unwrap_err(),
            LinkError::UnknownPerson("zed".into())
        );

        let spouse = doc.add_relationship("e1", "a", "b", RelationKind::Spouse).unwrap();
        assert_eq!(spouse.status, Some(SpouseStatus::Married));

        assert_eq!(
            doc.add_relationship("e2", "b", "a", RelationKind::Spouse).unwrap_err(),
            LinkError::Duplicate(RelationKind::Spouse)
        );

        doc.add_relationship("e3", "a", "b", RelationKind::ParentChild).unwrap();
        assert_eq!(
            doc.add_relationship("e4", "a", "b", RelationKind::ParentChild).unwrap_err(),
            LinkError::Duplicate(RelationKind::ParentChild)
        );
        assert_eq!(doc.edges.len(), 2);
    }

    #[test]
    fn test_remove_person_cascades() {
        let mut doc = FamilyDocument::sample();
        let (removed, dropped) = doc.remove_person("1").unwrap();

        assert_eq!(removed.name, "John Doe");
        assert_eq!(dropped.len(), 4);
        assert!(doc.edges.iter().all(|e| !e.involves("1")));
        assert_eq!(doc.nodes.len(), 5);
        assert_eq!(doc.dangling_relationships(), 0);
    }

    #[test]
    fn test_spouse_status_only_on_spouse_links() {
        let mut doc = FamilyDocument::sample();
        let edge = doc.set_spouse_status("e1", SpouseStatus::Married).unwrap();
        assert_eq!(edge.status, Some(SpouseStatus::Married));

        assert_eq!(
            doc.set_spouse_status("e2", SpouseStatus::Divorced).unwrap_err(),
            LinkError::NotASpouseLink
        );
        assert!(doc.set_spouse_status("missing", SpouseStatus::Divorced).is_err());
    }

    #[test]
    fn test_duplicate_person_rejected() {
        let mut doc = two_people();
        assert_eq!(
            doc.add_person(Person::new("a", "Another Ann")).unwrap_err(),
            LinkError::DuplicatePerson("a".into())
        );
    }
}
