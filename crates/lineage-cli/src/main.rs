//! Lineage CLI - Command-line interface for Lineage
//!
//! This is the main entry point for users interacting with Lineage.
//! It provides commands for editing family tree files, asking how two
//! people are related, and laying the tree out in generations.

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use lineage_core::{Gender, PersonDraft, RelationKind, SpouseStatus};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod shell;

#[derive(Parser)]
#[command(name = "lineage")]
#[command(author = "Lineage Contributors")]
#[command(version)]
#[command(about = "Family trees you can query and lay out", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Person fields shared by `add` and `edit`.
#[derive(Args)]
struct PersonFields {
    /// Birth date (YYYY-MM-DD or YYYY, empty to clear)
    #[arg(long, value_parser = commands::parse_date)]
    born: Option<String>,

    /// Death date (YYYY-MM-DD or YYYY, empty to clear)
    #[arg(long, value_parser = commands::parse_date)]
    died: Option<String>,

    /// male, female, other or unknown
    #[arg(short, long)]
    gender: Option<Gender>,

    /// Photo URL
    #[arg(long)]
    photo: Option<String>,

    /// Free-form notes
    #[arg(long)]
    notes: Option<String>,
}

impl PersonFields {
    fn into_draft(self, name: Option<String>) -> PersonDraft {
        PersonDraft {
            name,
            birth_date: self.born,
            death_date: self.died,
            photo_url: self.photo,
            notes: self.notes,
            gender: self.gender,
            x: None,
            y: None,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize Lineage in a directory
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Also write the sample family tree
        #[arg(long)]
        sample: bool,
    },

    /// Show statistics for a tree file
    Status {
        file: PathBuf,
    },

    /// List people and relationships
    List {
        file: PathBuf,
    },

    /// Add a person
    Add {
        file: PathBuf,

        /// Name of the new person
        #[arg(short, long)]
        name: Option<String>,

        #[command(flatten)]
        fields: PersonFields,
    },

    /// Edit a person's details
    Edit {
        file: PathBuf,

        /// Person id or name
        person: String,

        /// New name
        #[arg(short, long)]
        name: Option<String>,

        #[command(flatten)]
        fields: PersonFields,
    },

    /// Remove a person and every relationship they are part of
    Remove {
        file: PathBuf,

        /// Person id or name
        person: String,
    },

    /// Link two people
    Link {
        file: PathBuf,

        /// Parent (for parent-child) or first spouse
        source: String,

        /// Child (for parent-child) or second spouse
        target: String,

        /// parent-child or spouse
        #[arg(short, long, default_value = "parent-child")]
        kind: RelationKind,
    },

    /// Remove a relationship by id
    Unlink {
        file: PathBuf,
        edge: String,
    },

    /// Mark a spouse relationship as married or divorced
    SpouseStatus {
        file: PathBuf,
        edge: String,
        status: SpouseStatus,
    },

    /// Describe how two people are related
    Find {
        file: PathBuf,
        first: String,
        second: String,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Arrange the tree in generational rows
    Arrange {
        file: PathBuf,

        /// Canvas width to center rows in
        #[arg(short, long)]
        width: Option<f64>,

        /// Write the result here instead of back to the input
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the placements as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit a tree interactively
    Shell {
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let result = std::env::current_dir()
        .map_err(Into::into)
        .and_then(|cwd| config::load(&cwd))
        .and_then(|project| run(cli.command, &project.session));

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(command: Commands, config: &lineage_session::SessionConfig) -> commands::Result<()> {
    match command {
        Commands::Init { path, sample } => commands::init(&path, sample),
        Commands::Status { file } => commands::status(&file),
        Commands::List { file } => commands::list(&file),
        Commands::Add { file, name, fields } => {
            commands::add(&file, &fields.into_draft(name), config)
        }
        Commands::Edit {
            file,
            person,
            name,
            fields,
        } => commands::edit(&file, &person, &fields.into_draft(name), config),
        Commands::Remove { file, person } => commands::remove(&file, &person, config),
        Commands::Link {
            file,
            source,
            target,
            kind,
        } => commands::link(&file, &source, &target, kind, config),
        Commands::Unlink { file, edge } => commands::unlink(&file, &edge, config),
        Commands::SpouseStatus { file, edge, status } => {
            commands::spouse_status(&file, &edge, status, config)
        }
        Commands::Find {
            file,
            first,
            second,
            json,
        } => commands::find(&file, &first, &second, json),
        Commands::Arrange {
            file,
            width,
            output,
            json,
        } => commands::arrange(&file, width, output.as_deref(), json, config),
        Commands::Shell { file } => shell::run(&file, config),
    }
}
