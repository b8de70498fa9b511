//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Bind operations to SQLite transactions so callers never manage them.

pub mod note_graph;
pub mod note_service;
