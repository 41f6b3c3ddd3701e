//! CLI command implementations.

use crate::config::{self, ProjectConfig};
use chrono::NaiveDate;
use colored::Colorize;
use lineage_core::{FamilyDocument, PersonDraft, RelationKind, SpouseStatus};
use lineage_graph::{GraphBuilder, Kinship};
use lineage_session::{Notice, Session, SessionConfig};
use std::fs;
use std::path::Path;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// File name used by `init --sample`.
pub const SAMPLE_FILE: &str = "family-tree.json";

/// Initialize Lineage in a directory.
pub fn init(path: &Path, sample: bool) -> Result<()> {
    let config_path = config::config_path(path);

    if config_path.exists() {
        println!("{} Already initialized", "✓".green());
    } else {
        fs::create_dir_all(path.join(config::CONFIG_DIR))?;
        let config = ProjectConfig::default();
        fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;
        println!("{} Initialized Lineage in {}", "✓".green(), path.display());
    }

    if sample {
        let sample_path = path.join(SAMPLE_FILE);
        if sample_path.exists() {
            return Err(format!("{} already exists", sample_path.display()).into());
        }
        fs::write(&sample_path, FamilyDocument::sample().to_json_pretty()?)?;
        println!("{} Wrote sample tree to {}", "✓".green(), sample_path.display());
        println!(
            "  Run {} to see who is in it",
            format!("lineage list {}", SAMPLE_FILE).cyan()
        );
    }

    Ok(())
}

/// Checks a date typed on the command line.
///
/// Accepts a full `YYYY-MM-DD` date or a bare year. An empty value is passed
/// through so an edit can clear the stored date.
pub fn parse_date(raw: &str) -> std::result::Result<String, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(String::new());
    }
    if raw.len() == 4 && raw.chars().all(|c| c.is_ascii_digit()) {
        return Ok(raw.to_string());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| date.to_string())
        .map_err(|e| format!("'{}' is not YYYY-MM-DD or YYYY: {}", raw, e))
}

/// Reads a tree file. Positions are left as stored.
pub fn load(file: &Path) -> Result<FamilyDocument> {
    let text = fs::read_to_string(file)
        .map_err(|e| format!("Could not read {}: {}", file.display(), e))?;
    Ok(FamilyDocument::parse(&text)?)
}

/// Opens a tree file as a session.
pub fn open(file: &Path, config: &SessionConfig) -> Result<Session> {
    Ok(Session::with_document(load(file)?, config.clone()))
}

/// Writes the session's document back to disk.
pub fn save(session: &Session, file: &Path) -> Result<()> {
    let (json, _) = session.export_json()?;
    fs::write(file, json)?;
    Ok(())
}

/// Finds a person by id, then exact name, then a unique name fragment.
pub fn resolve_person(document: &FamilyDocument, query: &str) -> Result<String> {
    if document.contains(query) {
        return Ok(query.to_string());
    }

    let graph = GraphBuilder::from_document(document).build();
    let exact = graph.find_by_name(query);
    let candidates = if exact.is_empty() {
        graph.search(query)
    } else {
        exact
    };

    match candidates.as_slice() {
        [] => Err(format!("No person matches '{}'", query).into()),
        [person] => Ok(person.id.clone()),
        many => {
            let names: Vec<String> = many
                .iter()
                .map(|p| format!("{} ({})", p.name, p.id))
                .collect();
            Err(format!("'{}' is ambiguous: {}", query, names.join(", ")).into())
        }
    }
}

fn report(notice: &Notice) {
    if notice.is_destructive() {
        println!("{} {}", "✗".red(), notice.description);
    } else {
        println!("{} {}", "✓".green(), notice.description);
    }
}

/// Show a summary of a tree file.
pub fn status(file: &Path) -> Result<()> {
    let document = load(file)?;
    let stats = GraphBuilder::from_document(&document).build().stats();
    let dangling = document.dangling_relationships();

    println!("{}", file.display().to_string().cyan().bold());
    println!("  People:         {}", stats.people);
    println!("  Relationships:  {}", stats.relationships);
    println!("  Spouse links:   {}", stats.spouse_links);
    println!("  Root ancestors: {}", stats.roots);
    println!("  Deceased:       {}", stats.deceased);
    if dangling > 0 {
        println!(
            "{} {} relationships point at missing people",
            "⚠".yellow(),
            dangling
        );
    }

    Ok(())
}

/// List people and relationships.
pub fn list(file: &Path) -> Result<()> {
    let document = load(file)?;

    if document.nodes.is_empty() {
        println!("The tree is empty");
        return Ok(());
    }

    println!("{}", "People".bold());
    for person in &document.nodes {
        print!(
            "  {} {} {}",
            person.id.dimmed(),
            person.name.cyan(),
            format!("[{}]", person.gender).dimmed()
        );
        if let Some(span) = person.lifespan() {
            print!(" {}", span);
        }
        println!();
    }

    if !document.edges.is_empty() {
        println!();
        println!("{}", "Relationships".bold());
    }
    let name = |id: &str| {
        document
            .person(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("<missing {}>", id))
    };
    for edge in &document.edges {
        let arrow = match edge.kind {
            RelationKind::ParentChild => "→",
            RelationKind::Spouse => "=",
        };
        print!(
            "  {} {} {} {}",
            edge.id.dimmed(),
            name(&edge.source_id),
            arrow,
            name(&edge.target_id)
        );
        match edge.status {
            Some(status) => println!(" ({}, {})", edge.kind.to_string().yellow(), status),
            None => println!(" ({})", edge.kind.to_string().yellow()),
        }
    }

    Ok(())
}

/// Add a person.
pub fn add(file: &Path, draft: &PersonDraft, config: &SessionConfig) -> Result<()> {
    let mut session = open(file, config)?;
    session.begin_add();
    let notice = session.save_person(draft, None)?;
    save(&session, file)?;

    report(&notice);
    if let Some(person) = session.selected() {
        println!("  id: {}", person.id.dimmed());
    }
    Ok(())
}

/// Edit a person's details.
pub fn edit(file: &Path, person: &str, draft: &PersonDraft, config: &SessionConfig) -> Result<()> {
    let mut session = open(file, config)?;
    let id = resolve_person(session.document(), person)?;
    let notice = session.save_person(draft, Some(&id))?;
    save(&session, file)?;

    report(&notice);
    Ok(())
}

/// Remove a person and their relationships.
pub fn remove(file: &Path, person: &str, config: &SessionConfig) -> Result<()> {
    let mut session = open(file, config)?;
    let id = resolve_person(session.document(), person)?;
    let notice = session.delete_person(&id)?;
    save(&session, file)?;

    report(&notice);
    Ok(())
}

/// Link two people.
pub fn link(
    file: &Path,
    source: &str,
    target: &str,
    kind: RelationKind,
    config: &SessionConfig,
) -> Result<()> {
    let mut session = open(file, config)?;
    let source = resolve_person(session.document(), source)?;
    let target = resolve_person(session.document(), target)?;
    let notice = session
        .add_relationship(&source, &target, kind)
        .map_err(|e| e.notice().description)?;
    save(&session, file)?;

    report(&notice);
    Ok(())
}

/// Remove a relationship.
pub fn unlink(file: &Path, edge: &str, config: &SessionConfig) -> Result<()> {
    let mut session = open(file, config)?;
    let notice = session.remove_relationship(edge)?;
    save(&session, file)?;

    report(&notice);
    Ok(())
}

/// Mark a spouse link as married or divorced.
pub fn spouse_status(
    file: &Path,
    edge: &str,
    status: SpouseStatus,
    config: &SessionConfig,
) -> Result<()> {
    let mut session = open(file, config)?;
    let notice = session.set_spouse_status(edge, status)?;
    save(&session, file)?;

    report(&notice);
    Ok(())
}

/// Describe how two people are related.
pub fn find(file: &Path, a: &str, b: &str, json_output: bool) -> Result<()> {
    let document = load(file)?;
    let a = resolve_person(&document, a)?;
    let b = resolve_person(&document, b)?;

    let graph = GraphBuilder::from_document(&document).build();
    let kinship = lineage_graph::find_relationship(&graph, &a, &b);

    if json_output {
        let output = serde_json::json!({
            "first": a,
            "second": b,
            "result": kinship,
            "message": kinship.to_string()
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        let marker = match kinship {
            Kinship::Unidentified { .. } | Kinship::NotFound => "•".blue(),
            _ => "✓".green(),
        };
        println!("{} {}", marker, kinship);
    }

    Ok(())
}

/// Auto-arrange a tree and write the positions back.
pub fn arrange(
    file: &Path,
    width: Option<f64>,
    output: Option<&Path>,
    json_output: bool,
    config: &SessionConfig,
) -> Result<()> {
    let mut config = config.clone();
    if let Some(width) = width {
        config.canvas_width = width;
    }

    let mut session = open(file, &config)?;
    let Some((notice, layout)) = session.auto_arrange() else {
        println!("Nothing to arrange");
        return Ok(());
    };

    let destination = output.unwrap_or(file);
    save(&session, destination)?;

    if json_output {
        let output = serde_json::json!({
            "canvasWidth": layout.canvas_width,
            "placements": layout.placements,
            "edges": session.graph().export_edges()
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        report(&notice);
        println!(
            "  {} people over {} generations, written to {}",
            layout.placements.len(),
            layout.max_layer().map_or(0, |max| max + 1),
            destination.display()
        );
    }

    Ok(())
}
