//! Link repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist directed note edges and answer endpoint lookups.
//! - Provide the adjacency queries the traversal engine walks.
//!
//! # Invariants
//! - `create_link` performs no admission checks; callers own validation.
//! - UNIQUE/CHECK violations are reported as [`RepoError::DuplicateLink`] and
//!   [`RepoError::SelfLink`], not as opaque SQLite failures.
//! - Every multi-row read is ordered by link id (insertion order).

use crate::model::link::{LinkId, NoteLink};
use crate::model::note::NoteId;
use crate::repo::{ensure_graph_schema, RepoError, RepoResult};
use rusqlite::{ffi, params, Connection, Row};

/// Repository interface for note links.
pub trait LinkRepository {
    /// Persists one edge without validation.
    fn create_link(&self, parent_id: NoteId, child_id: NoteId) -> RepoResult<NoteLink>;
    /// Loads one link by id.
    fn get_link(&self, id: LinkId) -> RepoResult<Option<NoteLink>>;
    /// Loads the link for one directed endpoint pair.
    fn find_link(&self, parent_id: NoteId, child_id: NoteId) -> RepoResult<Option<NoteLink>>;
    /// Lists every link where `note_id` is parent or child.
    fn list_by_participant(&self, note_id: NoteId) -> RepoResult<Vec<NoteLink>>;
    /// Immediate parents of `note_id`.
    fn parent_ids(&self, note_id: NoteId) -> RepoResult<Vec<NoteId>>;
    /// Immediate children of `note_id`.
    fn child_ids(&self, note_id: NoteId) -> RepoResult<Vec<NoteId>>;
    /// Deletes one link. Returns whether it existed.
    fn delete_link(&self, id: LinkId) -> RepoResult<bool>;
}

/// SQLite-backed link repository.
pub struct SqliteLinkRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLinkRepository<'conn> {
    /// Creates repository from migrated connection, verifying the schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_graph_schema(conn)?;
        Ok(Self { conn })
    }

    /// Creates repository over a connection already known to be migrated.
    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_ids(&self, sql: &str, note_id: NoteId) -> RepoResult<Vec<NoteId>> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let mut rows = stmt.query([note_id])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(row.get(0)?);
        }
        Ok(ids)
    }
}

impl LinkRepository for SqliteLinkRepository<'_> {
    fn create_link(&self, parent_id: NoteId, child_id: NoteId) -> RepoResult<NoteLink> {
        self.conn
            .execute(
                "INSERT INTO note_links (parent_id, child_id) VALUES (?1, ?2);",
                params![parent_id, child_id],
            )
            .map_err(|err| classify_insert_error(err, parent_id, child_id))?;
        Ok(NoteLink {
            id: self.conn.last_insert_rowid(),
            parent_id,
            child_id,
        })
    }

    fn get_link(&self, id: LinkId) -> RepoResult<Option<NoteLink>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, parent_id, child_id
             FROM note_links
             WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_link_row(row)?));
        }
        Ok(None)
    }

    fn find_link(&self, parent_id: NoteId, child_id: NoteId) -> RepoResult<Option<NoteLink>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, parent_id, child_id
             FROM note_links
             WHERE parent_id = ?1
               AND child_id = ?2;",
        )?;
        let mut rows = stmt.query(params![parent_id, child_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_link_row(row)?));
        }
        Ok(None)
    }

    fn list_by_participant(&self, note_id: NoteId) -> RepoResult<Vec<NoteLink>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, parent_id, child_id
             FROM note_links
             WHERE parent_id = ?1
                OR child_id = ?1
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([note_id])?;
        let mut links = Vec::new();
        while let Some(row) = rows.next()? {
            links.push(parse_link_row(row)?);
        }
        Ok(links)
    }

    fn parent_ids(&self, note_id: NoteId) -> RepoResult<Vec<NoteId>> {
        self.query_ids(
            "SELECT parent_id
             FROM note_links
             WHERE child_id = ?1
             ORDER BY id ASC;",
            note_id,
        )
    }

    fn child_ids(&self, note_id: NoteId) -> RepoResult<Vec<NoteId>> {
        self.query_ids(
            "SELECT child_id
             FROM note_links
             WHERE parent_id = ?1
             ORDER BY id ASC;",
            note_id,
        )
    }

    fn delete_link(&self, id: LinkId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM note_links WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }
}

fn classify_insert_error(err: rusqlite::Error, parent_id: NoteId, child_id: NoteId) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        match failure.extended_code {
            ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                return RepoError::DuplicateLink {
                    parent_id,
                    child_id,
                };
            }
            ffi::SQLITE_CONSTRAINT_CHECK if parent_id == child_id => {
                return RepoError::SelfLink(parent_id);
            }
            _ => {}
        }
    }
    err.into()
}

fn parse_link_row(row: &Row<'_>) -> RepoResult<NoteLink> {
    Ok(NoteLink {
        id: row.get("id")?,
        parent_id: row.get("parent_id")?,
        child_id: row.get("child_id")?,
    })
}
