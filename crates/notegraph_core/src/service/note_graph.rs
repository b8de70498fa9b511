//! Transactional entry point for every note graph operation.
//!
//! # Responsibility
//! - Own one migrated SQLite connection.
//! - Run each operation in a transaction of the right strength and wire the
//!   repositories, traversal engine, admission controller, and note service.
//!
//! # Invariants
//! - Writes run under `BEGIN IMMEDIATE`, so link admission checks and the
//!   insert are serialized against every other writer on the same database,
//!   including other connections and processes.
//! - Multi-statement reads run in a deferred transaction and see one
//!   consistent snapshot.
//! - A failed operation rolls back; nothing partial is committed.
//!
//! `NoteGraph` is `Send` but not `Sync`. Concurrent callers open one
//! instance per thread against the same database file.

use crate::config::StoreConfig;
use crate::db::{open_db_in_memory, open_with_config};
use crate::graph::{GraphResult, GraphTraversal, LinkAdmission, TraversalLimits};
use crate::model::link::{LinkId, NoteLink};
use crate::model::note::{NewNote, Note, NoteId, NotePatch, NoteSummary, NoteWithRelations};
use crate::repo::ensure_graph_schema;
use crate::repo::link_repo::{LinkRepository, SqliteLinkRepository};
use crate::repo::note_repo::SqliteNoteRepository;
use crate::repo::RepoError;
use crate::service::note_service::NoteService;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Note graph store bound to one SQLite connection.
pub struct NoteGraph {
    conn: Connection,
    limits: TraversalLimits,
}

impl NoteGraph {
    /// Opens (and migrates) the store described by `config`.
    pub fn open(config: &StoreConfig) -> GraphResult<Self> {
        let conn = open_with_config(config).map_err(RepoError::from)?;
        Ok(Self {
            conn,
            limits: config.traversal_limits,
        })
    }

    /// Opens a private in-memory store with default settings.
    pub fn open_in_memory() -> GraphResult<Self> {
        let conn = open_db_in_memory().map_err(RepoError::from)?;
        Ok(Self {
            conn,
            limits: TraversalLimits::default(),
        })
    }

    /// Wraps an existing connection after verifying it is migrated.
    pub fn from_connection(conn: Connection) -> GraphResult<Self> {
        ensure_graph_schema(&conn)?;
        Ok(Self {
            conn,
            limits: TraversalLimits::default(),
        })
    }

    /// Replaces the traversal guard used by `ancestors`/`descendants`.
    pub fn with_traversal_limits(mut self, limits: TraversalLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Borrows the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn create_note(&self, input: NewNote) -> GraphResult<Note> {
        self.write(|notes, links| NoteService::new(notes, links).create_note(input))
    }

    pub fn get_note(&self, id: NoteId) -> GraphResult<Option<Note>> {
        self.read(|notes, links| NoteService::new(notes, links).get_note(id))
    }

    /// Lists one id-ordered page of note summaries.
    pub fn list_notes(&self, offset: u32, limit: Option<u32>) -> GraphResult<Vec<NoteSummary>> {
        self.read(|notes, links| NoteService::new(notes, links).list_notes(offset, limit))
    }

    pub fn update_note(&self, id: NoteId, patch: NotePatch) -> GraphResult<Option<Note>> {
        self.write(|notes, links| NoteService::new(notes, links).update_note(id, patch))
    }

    /// Deletes a note and every link touching it. Returns whether it existed.
    pub fn delete_note(&self, id: NoteId) -> GraphResult<bool> {
        self.write(|notes, links| NoteService::new(notes, links).delete_note(id))
    }

    pub fn get_note_with_relations(&self, id: NoteId) -> GraphResult<Option<NoteWithRelations>> {
        self.read(|notes, links| NoteService::new(notes, links).get_note_with_relations(id))
    }

    pub fn ancestors(&self, id: NoteId) -> GraphResult<Vec<Note>> {
        let limits = self.limits;
        self.read(|notes, links| {
            GraphTraversal::new(notes, links)
                .with_limits(limits)
                .ancestors(id)
        })
    }

    pub fn descendants(&self, id: NoteId) -> GraphResult<Vec<Note>> {
        let limits = self.limits;
        self.read(|notes, links| {
            GraphTraversal::new(notes, links)
                .with_limits(limits)
                .descendants(id)
        })
    }

    /// Probes whether `parent_id -> child_id` would be rejected as a cycle.
    pub fn would_create_cycle(&self, parent_id: NoteId, child_id: NoteId) -> GraphResult<bool> {
        self.read(|notes, links| {
            GraphTraversal::new(notes, links).would_create_cycle(parent_id, child_id)
        })
    }

    /// Admits and persists one link. See [`LinkAdmission::admit`].
    pub fn create_link(&self, parent_id: NoteId, child_id: NoteId) -> GraphResult<NoteLink> {
        self.write(|notes, links| LinkAdmission::new(notes, links).admit(parent_id, child_id))
    }

    pub fn get_link(&self, id: LinkId) -> GraphResult<Option<NoteLink>> {
        Ok(SqliteLinkRepository::new(&self.conn).get_link(id)?)
    }

    pub fn list_links_by_participant(&self, note_id: NoteId) -> GraphResult<Vec<NoteLink>> {
        Ok(SqliteLinkRepository::new(&self.conn).list_by_participant(note_id)?)
    }

    /// Deletes one link. Returns whether it existed.
    pub fn delete_link(&self, id: LinkId) -> GraphResult<bool> {
        self.write(|_, links| Ok(links.delete_link(id)?))
    }

    fn write<T>(
        &self,
        op: impl FnOnce(&SqliteNoteRepository<'_>, &SqliteLinkRepository<'_>) -> GraphResult<T>,
    ) -> GraphResult<T> {
        self.in_transaction(TransactionBehavior::Immediate, op)
    }

    fn read<T>(
        &self,
        op: impl FnOnce(&SqliteNoteRepository<'_>, &SqliteLinkRepository<'_>) -> GraphResult<T>,
    ) -> GraphResult<T> {
        self.in_transaction(TransactionBehavior::Deferred, op)
    }

    fn in_transaction<T>(
        &self,
        behavior: TransactionBehavior,
        op: impl FnOnce(&SqliteNoteRepository<'_>, &SqliteLinkRepository<'_>) -> GraphResult<T>,
    ) -> GraphResult<T> {
        let tx = Transaction::new_unchecked(&self.conn, behavior)?;
        let value = {
            let notes = SqliteNoteRepository::new(&tx);
            let links = SqliteLinkRepository::new(&tx);
            op(&notes, &links)?
        };
        tx.commit()?;
        Ok(value)
    }
}
