//! Lineage Session - interactive editing on top of the family graph
//!
//! This crate is the adapter between a front end and the pure graph
//! algorithms. It holds the canonical document, tracks which interaction
//! mode is active, and reports every completed action as a `Notice`.
//!
//! The session supports:
//! - Adding, editing and deleting people
//! - Linking people through a pick-source, pick-target, pick-kind flow
//! - Relationship queries by picking two people
//! - JSON import and export, and whole-tree auto-arrange

mod config;
mod error;
mod mode;
mod notice;
mod session;

pub use config::SessionConfig;
pub use error::SessionError;
pub use mode::{Mode, PendingLink, Selection};
pub use notice::{Notice, Severity};
pub use session::{Session, PLACEHOLDER_PHOTO, UNNAMED_PERSON};
