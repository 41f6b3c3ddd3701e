//! The editing session.
//!
//! A session owns the document and the interaction mode. Hosts translate
//! their input (clicks, key presses, shell commands) into the calls here
//! and show the returned notices. The graph algorithms are run against a
//! fresh snapshot of the document whenever they are needed.

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::mode::{Mode, PendingLink, Selection};
use crate::notice::Notice;
use lineage_core::{
    placeholder_coordinate, FamilyDocument, Person, PersonDraft, RelationKind, Relationship,
    SpouseStatus,
};
use lineage_graph::{
    apply_layout, find_relationship, FamilyGraph, GraphBuilder, Kinship, Layout, LayoutEngine,
};
use rand::Rng;
use tracing::{debug, info};
use uuid::Uuid;

/// Name given to people added without one.
pub const UNNAMED_PERSON: &str = "Unnamed Person";

/// Photo used until a real one is provided.
pub const PLACEHOLDER_PHOTO: &str = "https://placehold.co/80x80.png";

type Result<T> = std::result::Result<T, SessionError>;

pub struct Session {
    document: FamilyDocument,
    mode: Mode,
    selected: Option<String>,
    config: SessionConfig,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Session {
    /// Creates a session over an empty tree.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_document(FamilyDocument::new(), config)
    }

    /// Creates a session over an existing document.
    pub fn with_document(document: FamilyDocument, config: SessionConfig) -> Self {
        Self {
            document,
            mode: Mode::Idle,
            selected: None,
            config,
        }
    }

    pub fn document(&self) -> &FamilyDocument {
        &self.document
    }

    /// Hands the document back, ending the session.
    pub fn into_document(self) -> FamilyDocument {
        self.document
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn selected(&self) -> Option<&Person> {
        self.selected
            .as_deref()
            .and_then(|id| self.document.person(id))
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Updates the canvas size used for placeholders and layout.
    pub fn set_canvas_size(&mut self, width: f64, height: f64) {
        self.config.canvas_width = width;
        self.config.canvas_height = height;
    }

    /// Builds a graph snapshot of the current document.
    pub fn graph(&self) -> FamilyGraph {
        GraphBuilder::from_document(&self.document).build()
    }

    fn name_of(&self, id: &str) -> String {
        self.document
            .person(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "Person".to_string())
    }

    fn require(&self, id: &str) -> Result<()> {
        if self.document.contains(id) {
            Ok(())
        } else {
            Err(SessionError::UnknownPerson(id.to_string()))
        }
    }

    pub fn begin_add(&mut self) {
        self.selected = None;
        self.mode = Mode::Adding;
    }

    pub fn begin_linking(&mut self, source_id: &str) -> Result<()> {
        self.require(source_id)?;
        self.selected = None;
        self.mode = Mode::Linking {
            source_id: source_id.to_string(),
        };
        debug!("Linking from {}", source_id);
        Ok(())
    }

    pub fn begin_find_relationship(&mut self) -> Notice {
        self.selected = None;
        self.mode = Mode::FindingRelationship { first_id: None };
        Notice::info(
            "Find Relationship Mode",
            "Select the first person on the canvas.",
        )
    }

    /// Leaves whatever mode is active. Returns false if already idle.
    pub fn cancel(&mut self) -> bool {
        if self.mode.is_idle() {
            return false;
        }
        debug!("Cancelled {}", self.mode.name());
        self.mode = Mode::Idle;
        true
    }

    /// Handles a person being selected, or the selection being cleared.
    ///
    /// What that means depends on the mode: it may pick a link target,
    /// abandon a link, collect people for a relationship query, or simply
    /// change the selection.
    pub fn select(&mut self, id: Option<&str>) -> Result<Selection> {
        if let Some(id) = id {
            self.require(id)?;
        }

        match (&self.mode, id) {
            (Mode::FindingRelationship { .. }, None) => Ok(Selection::Ignored),
            (Mode::FindingRelationship { first_id: None }, Some(id)) => {
                self.mode = Mode::FindingRelationship {
                    first_id: Some(id.to_string()),
                };
                Ok(Selection::FirstPicked(id.to_string()))
            }
            (Mode::FindingRelationship { first_id: Some(first) }, Some(id)) => {
                if first == id {
                    return Ok(Selection::Ignored);
                }
                let kinship = find_relationship(&self.graph(), first, id);
                info!("Relationship query {} ~ {}: {}", first, id, kinship.as_str());
                self.mode = Mode::Idle;
                Ok(Selection::Found(kinship))
            }
            (Mode::Linking { source_id }, Some(id)) if source_id == id => {
                self.mode = Mode::Idle;
                Ok(Selection::LinkCancelled)
            }
            (Mode::Linking { source_id }, Some(id)) => {
                let pending = PendingLink {
                    source_id: source_id.clone(),
                    target_id: id.to_string(),
                };
                self.mode = Mode::PickingRelationshipType {
                    pending: pending.clone(),
                };
                Ok(Selection::LinkPending(pending))
            }
            (Mode::PickingRelationshipType { .. }, _) => Ok(Selection::Ignored),
            _ => {
                self.selected = id.map(str::to_string);
                self.mode = Mode::Idle;
                Ok(Selection::Selected(self.selected.clone()))
            }
        }
    }

    /// Creates the pending link with the chosen kind.
    ///
    /// The session returns to idle whether or not the link was accepted.
    pub fn confirm_relationship_type(&mut self, kind: RelationKind) -> Result<Notice> {
        let pending = match std::mem::take(&mut self.mode) {
            Mode::PickingRelationshipType { pending } => pending,
            other => {
                self.mode = other;
                return Err(SessionError::NoPendingLink);
            }
        };
        self.add_relationship(&pending.source_id, &pending.target_id, kind)
    }

    /// Saves the person being added, or merges the draft into an existing one.
    ///
    /// A new person is created only in adding mode with no explicit id.
    /// Otherwise the draft applies to `id`, falling back to the selection.
    pub fn save_person(&mut self, draft: &PersonDraft, id: Option<&str>) -> Result<Notice> {
        self.save_person_with_rng(draft, id, &mut rand::thread_rng())
    }

    pub fn save_person_with_rng<R: Rng + ?Sized>(
        &mut self,
        draft: &PersonDraft,
        id: Option<&str>,
        rng: &mut R,
    ) -> Result<Notice> {
        if self.mode == Mode::Adding && id.is_none() {
            return self.create_person(draft, rng);
        }

        let id = id
            .map(str::to_string)
            .or_else(|| self.selected.clone())
            .ok_or(SessionError::NothingSelected)?;
        if draft.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(SessionError::EmptyName);
        }

        self.document
            .update_person(&id, draft)
            .map_err(|_| SessionError::UnknownPerson(id.clone()))?;
        self.mode = Mode::Idle;

        info!("Updated {}", id);
        Ok(Notice::info(
            "Changes Saved",
            format!(
                "Details for {} have been updated.",
                draft.name.as_deref().unwrap_or("Person")
            ),
        ))
    }

    fn create_person<R: Rng + ?Sized>(&mut self, draft: &PersonDraft, rng: &mut R) -> Result<Notice> {
        let name = draft
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(UNNAMED_PERSON);

        let mut person = Person::new(Uuid::new_v4().to_string(), name);
        draft.apply_to(&mut person);
        person.name = name.to_string();
        if person.photo_url.is_none() {
            person.photo_url = Some(PLACEHOLDER_PHOTO.to_string());
        }
        if !person.x.is_some_and(f64::is_finite) {
            person.x = Some(placeholder_coordinate(rng, self.config.canvas_width));
        }
        if !person.y.is_some_and(f64::is_finite) {
            person.y = Some(placeholder_coordinate(rng, self.config.canvas_height));
        }

        let id = self.document.add_person(person)?.id.clone();
        self.selected = Some(id.clone());
        self.mode = Mode::Idle;

        info!("Added {} ({})", name, id);
        Ok(Notice::info(
            "Person Added",
            format!("{} has been added to the tree.", name),
        ))
    }

    /// Removes a person and every relationship touching them.
    pub fn delete_person(&mut self, id: &str) -> Result<Notice> {
        let (person, dropped) = self
            .document
            .remove_person(id)
            .map_err(|_| SessionError::UnknownPerson(id.to_string()))?;

        if self.selected.as_deref() == Some(id) {
            self.selected = self.document.nodes.first().map(|p| p.id.clone());
        }
        self.mode = Mode::Idle;

        info!("Deleted {} with {} relationships", person.id, dropped.len());
        Ok(Notice::destructive(
            "Person Deleted",
            format!("{} has been removed from the tree.", person.name),
        ))
    }

    pub fn move_person(&mut self, id: &str, x: f64, y: f64) -> Result<()> {
        self.document
            .move_person(id, x, y)
            .map_err(|_| SessionError::UnknownPerson(id.to_string()))
    }

    /// Links two people directly, bypassing the linking modes.
    pub fn add_relationship(
        &mut self,
        source_id: &str,
        target_id: &str,
        kind: RelationKind,
    ) -> Result<Notice> {
        let edge_id = Uuid::new_v4().to_string();
        self.document
            .add_relationship(edge_id, source_id, target_id, kind)?;

        info!("Linked {} -> {} as {}", source_id, target_id, kind);
        Ok(Notice::info(
            "Relationship Added",
            format!(
                "Connected {} and {} as {}.",
                self.name_of(source_id),
                self.name_of(target_id),
                kind
            ),
        ))
    }

    pub fn remove_relationship(&mut self, id: &str) -> Result<Notice> {
        let removed = self.document.remove_relationship(id)?;

        info!("Removed relationship {}", removed.id);
        Ok(Notice::destructive(
            "Relationship Removed",
            format!(
                "Disconnected {} and {}.",
                self.name_of(&removed.source_id),
                self.name_of(&removed.target_id)
            ),
        ))
    }

    pub fn set_spouse_status(&mut self, id: &str, status: SpouseStatus) -> Result<Notice> {
        let Relationship {
            source_id,
            target_id,
            ..
        } = self.document.set_spouse_status(id, status)?.clone();

        info!("Relationship {} is now {}", id, status);
        Ok(Notice::info(
            "Relationship Updated",
            format!(
                "Relationship status between {} and {} changed to {}.",
                self.name_of(&source_id),
                self.name_of(&target_id),
                status
            ),
        ))
    }

    /// Answers a relationship query without going through the finding mode.
    pub fn find_relationship(&self, a_id: &str, b_id: &str) -> Kinship {
        find_relationship(&self.graph(), a_id, b_id)
    }

    pub fn new_tree(&mut self) -> Notice {
        self.document = FamilyDocument::new();
        self.selected = None;
        self.mode = Mode::Idle;

        info!("Started a new tree");
        Notice::info(
            "New Tree Created",
            "The canvas is cleared. Start adding people!",
        )
    }

    /// Replaces the document with an imported one.
    ///
    /// On failure the current document, selection and mode are untouched.
    pub fn import_json(&mut self, text: &str) -> Result<Notice> {
        self.import_json_with_rng(text, &mut rand::thread_rng())
    }

    pub fn import_json_with_rng<R: Rng + ?Sized>(&mut self, text: &str, rng: &mut R) -> Result<Notice> {
        let document = FamilyDocument::import(
            text,
            rng,
            self.config.canvas_width,
            self.config.canvas_height,
        )?;
        let dangling = document.dangling_relationships();

        self.selected = document.nodes.first().map(|p| p.id.clone());
        self.document = document;
        self.mode = Mode::Idle;

        info!(
            "Imported {} people and {} relationships ({} dangling)",
            self.document.nodes.len(),
            self.document.edges.len(),
            dangling
        );
        Ok(Notice::info("Import Successful", "Family tree data imported."))
    }

    pub fn export_json(&self) -> Result<(String, Notice)> {
        let json = self.document.to_json_pretty()?;
        Ok((
            json,
            Notice::info("Export Successful", "Family tree data exported as JSON."),
        ))
    }

    /// Lays out the whole tree and replaces every person with the result.
    ///
    /// Returns the layout that was applied, or `None` when there is nobody
    /// to arrange.
    pub fn auto_arrange(&mut self) -> Option<(Notice, Layout)> {
        if self.document.nodes.is_empty() {
            return None;
        }

        let layout = LayoutEngine::new(self.config.layout.clone())
            .compute(&self.graph(), self.config.canvas_width);
        self.document.nodes = apply_layout(
            &self.document.nodes,
            &layout,
            &self.config.layout,
            &mut rand::thread_rng(),
        );

        let notice = Notice::info(
            "Tree Rearranged",
            "Nodes have been automatically arranged.",
        );
        Some((notice, layout))
    }
}
