//! Core graph engine for NoteGraph.
//! This crate is the single source of truth for note DAG invariants.

pub mod config;
pub mod db;
pub mod graph;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{AppConfig, ConfigError, DatabaseLocation, LogSettings, StoreConfig};
pub use graph::{GraphError, GraphResult, GraphTraversal, LinkAdmission, TraversalLimits};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::link::{LinkId, NoteLink};
pub use model::note::{
    NewNote, Note, NoteId, NotePatch, NoteSummary, NoteValidationError, NoteWithRelations,
};
pub use repo::link_repo::{LinkRepository, SqliteLinkRepository};
pub use repo::note_repo::{NoteListQuery, NoteRepository, SqliteNoteRepository};
pub use repo::{RepoError, RepoResult};
pub use service::note_graph::NoteGraph;
pub use service::note_service::NoteService;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
