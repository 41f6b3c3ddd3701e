//! Line-oriented driver for an editing session.
//!
//! Each line is one action, in the same order a canvas user would perform
//! them: `link Alice`, then `select Charlie`, then `kind spouse`.

use crate::commands::{self, resolve_person, Result};
use colored::Colorize;
use lineage_core::{PersonDraft, RelationKind, SpouseStatus};
use lineage_session::{Notice, Selection, Session, SessionConfig};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

const HELP: &str = "\
Commands:
  show                     list people and relationships
  select [person]          select a person, or clear the selection
  add [name]               add a person
  rename <name>            rename the selected person
  delete <person>          delete a person and their relationships
  link <person>            start a link; select the target next
  kind <parent-child|spouse>
                           choose the kind of the pending link
  unlink <edge>            remove a relationship
  status <edge> <married|divorced>
  find                     pick two people with select to compare them
  arrange                  auto-arrange the whole tree
  new                      start an empty tree
  import <file>            replace the tree with a JSON file
  export <file>            write the tree to a JSON file
  cancel                   leave the current mode
  save                     write back to the opened file
  quit";

/// What the loop should do after a line.
#[derive(Debug, PartialEq)]
pub enum Reply {
    Notice(Notice),
    Text(String),
    Nothing,
    Quit,
}

pub struct Shell {
    session: Session,
    path: PathBuf,
}

impl Shell {
    pub fn open(path: &Path, config: &SessionConfig) -> Result<Self> {
        Ok(Self {
            session: commands::open(path, config)?,
            path: path.to_path_buf(),
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn person(&self, query: &str) -> Result<String> {
        resolve_person(self.session.document(), query)
    }

    fn name(&self, id: &str) -> String {
        self.session
            .document()
            .person(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Runs one line.
    pub fn execute(&mut self, line: &str) -> Result<Reply> {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        debug!("shell: {} [{}]", command, self.session.mode().name());

        let reply = match command {
            "" => Reply::Nothing,
            "help" => Reply::Text(HELP.to_string()),
            "quit" | "exit" => Reply::Quit,
            "mode" => Reply::Text(self.session.mode().name().to_string()),
            "show" => Reply::Text(self.show()),
            "select" => {
                let id = if rest.is_empty() {
                    None
                } else {
                    Some(self.person(rest)?)
                };
                let selection = self.session.select(id.as_deref())?;
                self.describe(selection)
            }
            "add" => {
                self.session.begin_add();
                let draft = PersonDraft {
                    name: Some(rest.to_string()),
                    ..PersonDraft::default()
                };
                Reply::Notice(self.session.save_person(&draft, None)?)
            }
            "rename" => Reply::Notice(
                self.session
                    .save_person(&PersonDraft::named(rest), None)?,
            ),
            "delete" => {
                let id = self.person(rest)?;
                Reply::Notice(self.session.delete_person(&id)?)
            }
            "link" => {
                let id = self.person(rest)?;
                self.session.begin_linking(&id)?;
                Reply::Text(format!("Linking from {}; select the other person", self.name(&id)))
            }
            "kind" => {
                let kind: RelationKind = rest.parse()?;
                match self.session.confirm_relationship_type(kind) {
                    Ok(notice) => Reply::Notice(notice),
                    Err(e) => Reply::Notice(e.notice()),
                }
            }
            "unlink" => Reply::Notice(self.session.remove_relationship(rest)?),
            "status" => {
                let (edge, status) = rest
                    .split_once(' ')
                    .ok_or("usage: status <edge> <married|divorced>")?;
                let status: SpouseStatus = status.trim().parse()?;
                Reply::Notice(self.session.set_spouse_status(edge, status)?)
            }
            "find" => Reply::Notice(self.session.begin_find_relationship()),
            "cancel" | "esc" => {
                if self.session.cancel() {
                    Reply::Text("Cancelled".to_string())
                } else {
                    Reply::Nothing
                }
            }
            "arrange" => match self.session.auto_arrange() {
                Some((notice, _)) => Reply::Notice(notice),
                None => Reply::Text("Nothing to arrange".to_string()),
            },
            "new" => Reply::Notice(self.session.new_tree()),
            "import" => {
                let text = fs::read_to_string(rest)?;
                match self.session.import_json(&text) {
                    Ok(notice) => Reply::Notice(notice),
                    Err(e) => Reply::Notice(e.notice()),
                }
            }
            "export" => {
                let (json, notice) = self.session.export_json()?;
                fs::write(rest, json)?;
                Reply::Notice(notice)
            }
            "save" => {
                commands::save(&self.session, &self.path)?;
                Reply::Text(format!("Saved to {}", self.path.display()))
            }
            other => return Err(format!("Unknown command '{}'. Try 'help'.", other).into()),
        };

        Ok(reply)
    }

    fn describe(&self, selection: Selection) -> Reply {
        match selection {
            Selection::Selected(Some(id)) => Reply::Text(format!("Selected {}", self.name(&id))),
            Selection::Selected(None) => Reply::Text("Selection cleared".to_string()),
            Selection::LinkPending(pending) => Reply::Text(format!(
                "Link {} and {} as? (kind parent-child | kind spouse)",
                self.name(&pending.source_id),
                self.name(&pending.target_id)
            )),
            Selection::LinkCancelled => Reply::Text("Link cancelled".to_string()),
            Selection::FirstPicked(id) => Reply::Text(format!(
                "First person: {}. Select the second person.",
                self.name(&id)
            )),
            Selection::Found(kinship) => Reply::Text(kinship.to_string()),
            Selection::Ignored => Reply::Nothing,
        }
    }

    fn show(&self) -> String {
        let document = self.session.document();
        let mut out = Vec::new();
        for person in &document.nodes {
            let marker = match self.session.selected() {
                Some(selected) if selected.id == person.id => "*",
                _ => " ",
            };
            out.push(format!("{} {}  {}", marker, person.id, person.name));
        }
        for edge in &document.edges {
            let status = edge.status.map(|s| format!(" ({})", s)).unwrap_or_default();
            out.push(format!(
                "  {}  {} {} {}{}",
                edge.id,
                self.name(&edge.source_id),
                edge.kind,
                self.name(&edge.target_id),
                status
            ));
        }
        if out.is_empty() {
            out.push("The tree is empty".to_string());
        }
        out.join("\n")
    }
}

/// Runs the shell on stdin until `quit` or end of input.
pub fn run(path: &Path, config: &SessionConfig) -> Result<()> {
    let mut shell = Shell::open(path, config)?;
    println!(
        "{} Opened {} ({} people). Type {} for commands.",
        "✓".green(),
        path.display(),
        shell.session().document().nodes.len(),
        "help".cyan()
    );

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{} ", format!("[{}]>", shell.session().mode().name()).dimmed());
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        match shell.execute(&line?) {
            Ok(Reply::Quit) => break,
            Ok(Reply::Nothing) => {}
            Ok(Reply::Text(text)) => println!("{}", text),
            Ok(Reply::Notice(notice)) if notice.is_destructive() => {
                println!("{} {}", notice.title.red().bold(), notice.description)
            }
            Ok(Reply::Notice(notice)) => {
                println!("{} {}", notice.title.green().bold(), notice.description)
            }
            Err(e) => eprintln!("{} {}", "error:".red().bold(), e),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineage_core::FamilyDocument;

    fn shell() -> (tempfile::TempDir, Shell) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.json");
        fs::write(&path, FamilyDocument::sample().to_json_pretty().unwrap()).unwrap();
        let shell = Shell::open(&path, &SessionConfig::default()).unwrap();
        (dir, shell)
    }

    fn text(reply: Reply) -> String {
        match reply {
            Reply::Text(text) => text,
            Reply::Notice(notice) => notice.description,
            other => panic!("unexpected reply {:?}", other),
        }
    }

    #[test]
    fn test_link_then_pick_kind() {
        let (_dir, mut shell) = shell();

        shell.execute("link Peter").unwrap();
        assert_eq!(shell.session().mode().name(), "linking");

        let reply = text(shell.execute("select Charlie").unwrap());
        assert_eq!(
            reply,
            "Link Peter Doe and Charlie Green as? (kind parent-child | kind spouse)"
        );

        let reply = text(shell.execute("kind spouse").unwrap());
        assert_eq!(reply, "Connected Peter Doe and Charlie Green as spouse.");
        assert_eq!(shell.session().document().edges.len(), 9);
    }

    #[test]
    fn test_find_flow() {
        let (_dir, mut shell) = shell();

        shell.execute("find").unwrap();
        shell.execute("select Alice").unwrap();
        let reply = text(shell.execute("select Charlie").unwrap());
        assert_eq!(reply, "Alice Doe-Green and Charlie Green are spouses.");
        assert_eq!(shell.session().mode().name(), "idle");
    }

    #[test]
    fn test_add_rename_and_save() {
        let (dir, mut shell) = shell();

        let reply = text(shell.execute("add Mia Doe").unwrap());
        assert_eq!(reply, "Mia Doe has been added to the tree.");
        let reply = text(shell.execute("rename Mia Green").unwrap());
        assert_eq!(reply, "Details for Mia Green have been updated.");

        shell.execute("save").unwrap();
        let saved = fs::read_to_string(dir.path().join("tree.json")).unwrap();
        let doc = FamilyDocument::parse(&saved).unwrap();
        assert!(doc.nodes.iter().any(|p| p.name == "Mia Green"));
    }

    #[test]
    fn test_bad_import_keeps_tree() {
        let (dir, mut shell) = shell();
        let bad = dir.path().join("bad.json");
        fs::write(&bad, r#"{"edges": []}"#).unwrap();

        let reply = shell.execute(&format!("import {}", bad.display())).unwrap();
        match reply {
            Reply::Notice(notice) => assert_eq!(notice.title, "Import Failed"),
            other => panic!("unexpected reply {:?}", other),
        }
        assert_eq!(shell.session().document().nodes.len(), 6);
    }

    #[test]
    fn test_unknown_command() {
        let (_dir, mut shell) = shell();
        assert!(shell.execute("fly").is_err());
        assert_eq!(shell.execute("quit").unwrap(), Reply::Quit);
        assert_eq!(shell.execute("cancel").unwrap(), Reply::Nothing);
    }
}
