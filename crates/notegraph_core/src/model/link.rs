//! Directed parent → child edge between two notes.

use crate::model::note::NoteId;
use serde::{Deserialize, Serialize};

/// Storage-assigned link identity.
pub type LinkId = i64;

/// One admitted DAG edge. `parent_id` contains `child_id` as a subtopic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteLink {
    pub id: LinkId,
    pub parent_id: NoteId,
    pub child_id: NoteId,
}

impl NoteLink {
    /// Returns whether `note_id` is either endpoint.
    pub fn touches(&self, note_id: NoteId) -> bool {
        self.parent_id == note_id || self.child_id == note_id
    }
}
