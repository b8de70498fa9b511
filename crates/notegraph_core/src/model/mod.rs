//! Domain model for the note graph.
//!
//! # Responsibility
//! - Define the note vertex and link edge records used by every layer.
//! - Keep input validation next to the data it guards.
//!
//! # Invariants
//! - Notes own no links; links reference notes by id only.
//! - Parent/child lists are derived views, never stored on the note.

pub mod link;
pub mod note;
