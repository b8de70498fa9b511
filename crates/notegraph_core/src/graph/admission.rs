//! Link admission controller.
//!
//! # Responsibility
//! - Run the ordered admission checks for one candidate edge.
//! - Delegate the write to the link repository only when every check passes.
//!
//! # Invariants
//! - Check order is fixed: cycle, endpoint existence, duplicate.
//! - A rejected request writes nothing; an admitted one writes exactly one
//!   edge. Callers must run [`LinkAdmission::admit`] inside a write-locking
//!   transaction so the checks and the insert see the same graph state.

use crate::graph::traversal::GraphTraversal;
use crate::graph::{GraphError, GraphResult};
use crate::model::link::NoteLink;
use crate::model::note::NoteId;
use crate::repo::link_repo::LinkRepository;
use crate::repo::note_repo::NoteRepository;
use log::{info, warn};

/// Gatekeeper for link creation.
pub struct LinkAdmission<'r, N: NoteRepository, L: LinkRepository> {
    notes: &'r N,
    links: &'r L,
}

impl<'r, N: NoteRepository, L: LinkRepository> LinkAdmission<'r, N, L> {
    pub fn new(notes: &'r N, links: &'r L) -> Self {
        Self { notes, links }
    }

    /// Validates `parent_id -> child_id` and persists it.
    ///
    /// # Errors
    /// - [`GraphError::Cycle`] for a self-link or when `parent_id` is already
    ///   a descendant of `child_id`.
    /// - [`GraphError::NoteNotFound`] when either endpoint is missing (parent
    ///   reported first).
    /// - [`GraphError::Conflict`] when the pair is already linked.
    pub fn admit(&self, parent_id: NoteId, child_id: NoteId) -> GraphResult<NoteLink> {
        let traversal = GraphTraversal::new(self.notes, self.links);
        if traversal.would_create_cycle(parent_id, child_id)? {
            return Err(reject(
                GraphError::Cycle {
                    parent_id,
                    child_id,
                },
                "cycle",
            ));
        }

        for endpoint in [parent_id, child_id] {
            if !self.notes.note_exists(endpoint)? {
                return Err(reject(GraphError::NoteNotFound(endpoint), "endpoint_missing"));
            }
        }

        if let Some(existing) = self.links.find_link(parent_id, child_id)? {
            return Err(reject(
                GraphError::Conflict {
                    parent_id,
                    child_id,
                    existing_link_id: Some(existing.id),
                },
                "duplicate",
            ));
        }

        let link = self.links.create_link(parent_id, child_id)?;
        info!(
            "event=link_admit module=graph status=ok link_id={} parent_id={} child_id={}",
            link.id, parent_id, child_id
        );
        Ok(link)
    }
}

fn reject(err: GraphError, reason: &'static str) -> GraphError {
    warn!("event=link_admit module=graph status=rejected reason={reason} detail={err}");
    err
}
