//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist note vertices: create, read, page, partial update, delete.
//! - Keep SQL details and ordering behavior inside repository boundary.
//!
//! # Invariants
//! - Input is validated by callers; storage CHECK constraints are the backstop.
//! - Listing is deterministic: `id ASC`.
//! - Every update refreshes `updated_at`.
//! - Deleting a note removes its incident links through the
//!   `ON DELETE CASCADE` foreign keys, in the same statement.

use crate::model::note::{validate_importance, NewNote, Note, NoteId, NotePatch};
use crate::repo::{ensure_graph_schema, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

/// Page size used when a list query does not specify one.
pub const NOTES_DEFAULT_LIMIT: u32 = 100;

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    title,
    content,
    importance,
    created_at,
    updated_at
FROM notes";

/// Paging options for note listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoteListQuery {
    /// Number of rows to skip.
    pub offset: u32,
    /// Maximum rows to return. Defaults to [`NOTES_DEFAULT_LIMIT`].
    pub limit: Option<u32>,
}

/// Repository interface for note vertices.
pub trait NoteRepository {
    /// Inserts one validated note and returns the stored row.
    fn create_note(&self, note: &NewNote) -> RepoResult<Note>;
    /// Loads one note by id.
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
    /// Returns whether a note with `id` exists.
    fn note_exists(&self, id: NoteId) -> RepoResult<bool>;
    /// Lists one page of notes in id order.
    fn list_notes(&self, query: &NoteListQuery) -> RepoResult<Vec<Note>>;
    /// Applies supplied patch fields. Returns `None` when `id` is absent.
    fn update_note(&self, id: NoteId, patch: &NotePatch) -> RepoResult<Option<Note>>;
    /// Deletes one note and its incident links. Returns whether it existed.
    fn delete_note(&self, id: NoteId) -> RepoResult<bool>;
    /// Number of links where `id` is parent or child; what a delete would cascade.
    fn count_incident_links(&self, id: NoteId) -> RepoResult<u64>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Creates repository from migrated connection, verifying the schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_graph_schema(conn)?;
        Ok(Self { conn })
    }

    /// Creates repository over a connection already known to be migrated.
    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn create_note(&self, note: &NewNote) -> RepoResult<Note> {
        self.conn.execute(
            "INSERT INTO notes (title, content, importance) VALUES (?1, ?2, ?3);",
            params![note.title, note.content, note.importance],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_note(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("note {id} missing after insert read-back"))
        })
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(row)?));
        }
        Ok(None)
    }

    fn note_exists(&self, id: NoteId) -> RepoResult<bool> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM notes WHERE id = ?1;", [id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    fn list_notes(&self, query: &NoteListQuery) -> RepoResult<Vec<Note>> {
        let limit = normalize_note_limit(query.limit);
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL} ORDER BY id ASC LIMIT ?1 OFFSET ?2;"
        ))?;
        let mut rows = stmt.query(params![i64::from(limit), i64::from(query.offset)])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn update_note(&self, id: NoteId, patch: &NotePatch) -> RepoResult<Option<Note>> {
        let mut assignments =
            vec!["updated_at = CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER)"];
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(title) = patch.title.as_ref() {
            assignments.push("title = ?");
            bind_values.push(Value::Text(title.clone()));
        }
        if let Some(content) = patch.content.as_ref() {
            assignments.push("content = ?");
            bind_values.push(content.clone().map_or(Value::Null, Value::Text));
        }
        if let Some(importance) = patch.importance {
            assignments.push("importance = ?");
            bind_values.push(importance.map_or(Value::Null, |value| {
                Value::Integer(i64::from(value))
            }));
        }
        bind_values.push(Value::Integer(id));

        let sql = format!("UPDATE notes SET {} WHERE id = ?;", assignments.join(", "));
        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        if changed == 0 {
            return Ok(None);
        }
        self.get_note(id)
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<bool> {
        let changed = self.conn.execute("DELETE FROM notes WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn count_incident_links(&self, id: NoteId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*)
             FROM note_links
             WHERE parent_id = ?1
                OR child_id = ?1;",
            [id],
            |row| row.get(0),
        )?;
        u64::try_from(count).map_err(|_| {
            RepoError::InvalidData(format!("negative link count {count} for note {id}"))
        })
    }
}

/// Normalizes list limit according to the notes paging contract.
pub fn normalize_note_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(NOTES_DEFAULT_LIMIT)
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let id: NoteId = row.get("id")?;
    let importance = match row.get::<_, Option<i64>>("importance")? {
        None => None,
        Some(raw) => {
            let value = u8::try_from(raw)
                .ok()
                .filter(|value| validate_importance(Some(*value)).is_ok())
                .ok_or_else(|| {
                    RepoError::InvalidData(format!(
                        "invalid importance `{raw}` in notes.importance for note {id}"
                    ))
                })?;
            Some(value)
        }
    };

    Ok(Note {
        id,
        title: row.get("title")?,
        content: row.get("content")?,
        importance,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
