//! People in the family tree.
//!
//! A person is the node type of the family graph. Everything except the
//! id and name is optional, matching what users actually know about
//! their relatives.

use serde::{Deserialize, Deserializer, Serialize};

/// Recorded gender of a person.
///
/// Only used to pick gendered labels ("aunt" vs "uncle") and for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
    #[default]
    Unknown,
}

impl Gender {
    /// Picks between a female and a male word, falling back to the neutral one.
    pub fn pick<'a>(&self, female: &'a str, male: &'a str, neutral: &'a str) -> &'a str {
        match self {
            Gender::Female => female,
            Gender::Male => male,
            Gender::Other | Gender::Unknown => neutral,
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Self::Male),
            "female" | "f" => Ok(Self::Female),
            "other" => Ok(Self::Other),
            "unknown" => Ok(Self::Unknown),
            other => Err(format!("unknown gender '{}'", other)),
        }
    }
}

/// Normalizes a recorded date. Blank means unknown; anything else is kept
/// as written, so partial dates like `1970` survive a round trip.
pub fn clean_date(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(clean_date))
}

/// A single individual in the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    /// Unique identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Usually `YYYY-MM-DD`, but any non-blank text is accepted.
    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub birth_date: Option<String>,

    /// A non-blank value marks the person as deceased.
    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub death_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Canvas position. Unset until placed by hand or by the layout engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,

    #[serde(default)]
    pub gender: Gender,
}

impl Person {
    /// Creates a person with just an id and a name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            birth_date: None,
            death_date: None,
            photo_url: None,
            notes: None,
            x: None,
            y: None,
            gender: Gender::Unknown,
        }
    }

    /// Builder-style gender setter.
    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    /// Builder-style date setter.
    pub fn with_dates(mut self, birth: Option<&str>, death: Option<&str>) -> Self {
        self.birth_date = birth.and_then(clean_date);
        self.death_date = death.and_then(clean_date);
        self
    }

    /// Builder-style position setter.
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn is_deceased(&self) -> bool {
        self.death_date
            .as_deref()
            .is_some_and(|date| !date.trim().is_empty())
    }

    /// Returns the position if both coordinates are set and finite.
    pub fn position(&self) -> Option<(f64, f64)> {
        match (self.x, self.y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((x, y)),
            _ => None,
        }
    }

    /// Formats the known dates, e.g. `1970-01-01 – 2020-05-10` or `b. 1995-06-20`.
    pub fn lifespan(&self) -> Option<String> {
        let birth = self.birth_date.as_deref().and_then(clean_date);
        let death = self.death_date.as_deref().and_then(clean_date);
        match (birth, death) {
            (Some(born), Some(died)) => Some(format!("{} – {}", born, died)),
            (Some(born), None) => Some(format!("b. {}", born)),
            (None, Some(died)) => Some(format!("d. {}", died)),
            (None, None) => None,
        }
    }
}

/// A partial set of person fields, used for both adding and editing.
///
/// `None` means "leave unchanged" on edit and "use the default" on add.
/// A blank date clears the stored one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonDraft {
    pub name: Option<String>,
    pub birth_date: Option<String>,
    pub death_date: Option<String>,
    pub photo_url: Option<String>,
    pub notes: Option<String>,
    pub gender: Option<Gender>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl PersonDraft {
    /// Creates a draft that only sets the name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Merges the set fields into `person`. The id never changes.
    pub fn apply_to(&self, person: &mut Person) {
        if let Some(name) = &self.name {
            person.name = name.clone();
        }
        if let Some(born) = &self.birth_date {
            person.birth_date = clean_date(born);
        }
        if let Some(died) = &self.death_date {
            person.death_date = clean_date(died);
        }
        if let Some(photo) = &self.photo_url {
            person.photo_url = Some(photo.clone());
        }
        if let Some(notes) = &self.notes {
            person.notes = Some(notes.clone());
        }
        if let Some(gender) = self.gender {
            person.gender = gender;
        }
        if self.x.is_some() {
            person.x = self.x;
        }
        if self.y.is_some() {
            person.y = self.y;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deceased_and_lifespan() {
        let jane = Person::new("2", "Jane").with_dates(Some("1972-03-15"), Some("2020-05-10"));

        assert!(jane.is_deceased());
        assert_eq!(jane.lifespan().unwrap(), "1972-03-15 – 2020-05-10");
        assert!(Person::new("1", "John").lifespan().is_none());
    }

    #[test]
    fn test_position_requires_finite_coordinates() {
        assert_eq!(Person::new("a", "A").at(1.0, 2.0).position(), Some((1.0, 2.0)));
        assert_eq!(Person::new("a", "A").at(f64::NAN, 2.0).position(), None);
        assert_eq!(Person::new("a", "A").position(), None);
    }

    #[test]
    fn test_draft_keeps_id_and_unset_fields() {
        let mut person = Person::new("p1", "Old").with_gender(Gender::Female);
        let draft = PersonDraft {
            name: Some("New".to_string()),
            notes: Some("moved abroad".to_string()),
            ..PersonDraft::default()
        };
        draft.apply_to(&mut person);

        assert_eq!(person.id, "p1");
        assert_eq!(person.name, "New");
        assert_eq!(person.gender, Gender::Female);
        assert_eq!(person.notes.as_deref(), Some("moved abroad"));
    }

    #[test]
    fn test_gender_parse() {
        assert_eq!("Female".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!("m".parse::<Gender>().unwrap(), Gender::Male);
        assert!("robot".parse::<Gender>().is_err());
    }

    #[test]
    fn test_serde_names() {
        let json = r#"{"id":"1","name":"John","birthDate":"1970-01-01","gender":"male","data-ai-hint":"x"}"#;
        let person: Person = serde_json::from_str(json).unwrap();
        assert_eq!(person.gender, Gender::Male);
        assert_eq!(person.birth_date.as_deref(), Some("1970-01-01"));

        let out = serde_json::to_value(&person).unwrap();
        assert_eq!(out["birthDate"], "1970-01-01");
        assert!(out.get("x").is_none());
    }

    #[test]
    fn test_blank_death_date_is_not_deceased() {
        let json = r#"{"id":"1","name":"Ann","birthDate":"1970-01-01","deathDate":""}"#;
        let person: Person = serde_json::from_str(json).unwrap();

        assert_eq!(person.death_date, None);
        assert!(!person.is_deceased());
        assert_eq!(person.lifespan().unwrap(), "b. 1970-01-01");

        let out = serde_json::to_value(&person).unwrap();
        assert!(out.get("deathDate").is_none());

        let mut hand_built = Person::new("2", "Bo");
        hand_built.death_date = Some("  ".to_string());
        assert!(!hand_built.is_deceased());
        assert!(hand_built.lifespan().is_none());
    }

    #[test]
    fn test_partial_dates_are_kept() {
        let json = r#"{"id":"1","name":"Ann","birthDate":"1970","deathDate":null}"#;
        let person: Person = serde_json::from_str(json).unwrap();

        assert_eq!(person.birth_date.as_deref(), Some("1970"));
        assert_eq!(person.death_date, None);
        assert_eq!(serde_json::to_value(&person).unwrap()["birthDate"], "1970");
    }

    #[test]
    fn test_draft_blank_date_clears() {
        let mut person = Person::new("p1", "Ann").with_dates(Some("1970"), Some("2001-02-03"));
        let draft = PersonDraft {
            death_date: Some(String::new()),
            ..PersonDraft::default()
        };
        draft.apply_to(&mut person);

        assert_eq!(person.birth_date.as_deref(), Some("1970"));
        assert!(!person.is_deceased());
    }
}
