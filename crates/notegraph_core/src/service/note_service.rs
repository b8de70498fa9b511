//! Note use-case service.
//!
//! # Responsibility
//! - Validate note input above the repository layer.
//! - Provide the catalog listing and the "note with relations" read view.
//!
//! # Invariants
//! - Titles are trimmed before persistence; create and update share rules.
//! - Updates never touch links.
//! - Relation views are derived from links at read time, in link-id order.

use crate::graph::{GraphError, GraphResult};
use crate::model::note::{NewNote, Note, NoteId, NotePatch, NoteSummary, NoteWithRelations};
use crate::repo::link_repo::LinkRepository;
use crate::repo::note_repo::{NoteListQuery, NoteRepository};
use crate::repo::RepoError;
use log::info;

/// Note service facade over repository implementations.
pub struct NoteService<'r, N: NoteRepository, L: LinkRepository> {
    notes: &'r N,
    links: &'r L,
}

impl<'r, N: NoteRepository, L: LinkRepository> NoteService<'r, N, L> {
    pub fn new(notes: &'r N, links: &'r L) -> Self {
        Self { notes, links }
    }

    /// Creates one note after validating and trimming its fields.
    pub fn create_note(&self, input: NewNote) -> GraphResult<Note> {
        let input = input.validated()?;
        let note = self.notes.create_note(&input)?;
        info!("event=note_create module=service status=ok note_id={}", note.id);
        Ok(note)
    }

    pub fn get_note(&self, id: NoteId) -> GraphResult<Option<Note>> {
        Ok(self.notes.get_note(id)?)
    }

    /// Lists one page of the note catalog.
    pub fn list_notes(&self, offset: u32, limit: Option<u32>) -> GraphResult<Vec<NoteSummary>> {
        let query = NoteListQuery { offset, limit };
        let notes = self.notes.list_notes(&query)?;
        Ok(notes.iter().map(Note::summary).collect())
    }

    /// Applies supplied patch fields. Returns `None` for an unknown id.
    pub fn update_note(&self, id: NoteId, patch: NotePatch) -> GraphResult<Option<Note>> {
        let patch = patch.validated()?;
        let updated = self.notes.update_note(id, &patch)?;
        if updated.is_some() {
            info!("event=note_update module=service status=ok note_id={id}");
        }
        Ok(updated)
    }

    /// Deletes one note together with every incident link.
    pub fn delete_note(&self, id: NoteId) -> GraphResult<bool> {
        let incident = self.notes.count_incident_links(id)?;
        let existed = self.notes.delete_note(id)?;
        if existed {
            info!(
                "event=note_delete module=service status=ok note_id={id} cascaded_links={incident}"
            );
        }
        Ok(existed)
    }

    /// Loads one note with its immediate parents and children.
    pub fn get_note_with_relations(&self, id: NoteId) -> GraphResult<Option<NoteWithRelations>> {
        let Some(note) = self.notes.get_note(id)? else {
            return Ok(None);
        };
        let parents = self.summaries(self.links.parent_ids(id)?)?;
        let children = self.summaries(self.links.child_ids(id)?)?;
        Ok(Some(NoteWithRelations {
            note,
            parents,
            children,
        }))
    }

    fn summaries(&self, ids: Vec<NoteId>) -> GraphResult<Vec<NoteSummary>> {
        ids.into_iter()
            .map(|id| {
                self.notes
                    .get_note(id)?
                    .map(|note| note.summary())
                    .ok_or_else(|| {
                        GraphError::Repo(RepoError::InvalidData(format!(
                            "link endpoint {id} has no note row"
                        )))
                    })
            })
            .collect()
    }
}
