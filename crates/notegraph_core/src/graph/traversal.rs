//! Ancestor/descendant traversal and cycle reachability.
//!
//! # Invariants
//! - Output keeps path multiplicity: a note reachable over `k` distinct
//!   paths appears `k` times.
//! - Order is pre-order depth-first with neighbours in link-id order, the
//!   same order a recursive "neighbour, then its closure" walk produces.
//! - Walks use an explicit stack, so chain depth never grows the call stack.

use crate::graph::{GraphError, GraphResult, TraversalLimits};
use crate::model::note::{Note, NoteId};
use crate::repo::link_repo::LinkRepository;
use crate::repo::note_repo::NoteRepository;
use crate::repo::{RepoError, RepoResult};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
}

/// Read-only traversal engine over note and link repositories.
pub struct GraphTraversal<'r, N: NoteRepository, L: LinkRepository> {
    notes: &'r N,
    links: &'r L,
    limits: TraversalLimits,
}

impl<'r, N: NoteRepository, L: LinkRepository> GraphTraversal<'r, N, L> {
    pub fn new(notes: &'r N, links: &'r L) -> Self {
        Self {
            notes,
            links,
            limits: TraversalLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: TraversalLimits) -> Self {
        self.limits = limits;
        self
    }

    /// All transitive parents of `note_id`, with path multiplicity.
    ///
    /// Returns an empty sequence when the note does not exist.
    pub fn ancestors(&self, note_id: NoteId) -> GraphResult<Vec<Note>> {
        self.collect(note_id, Direction::Up)
    }

    /// All transitive children of `note_id`, with path multiplicity.
    ///
    /// Returns an empty sequence when the note does not exist.
    pub fn descendants(&self, note_id: NoteId) -> GraphResult<Vec<Note>> {
        self.collect(note_id, Direction::Down)
    }

    /// Returns whether adding `parent_id -> child_id` would close a cycle.
    ///
    /// True for a self-link, or when `parent_id` is already reachable from
    /// `child_id` (a descendant of it). Each note is expanded at most once,
    /// so the cost is bounded by the descendant count, not the path count.
    pub fn would_create_cycle(&self, parent_id: NoteId, child_id: NoteId) -> GraphResult<bool> {
        if parent_id == child_id {
            return Ok(true);
        }

        let mut visited = HashSet::new();
        let mut stack = vec![child_id];
        while let Some(current) = stack.pop() {
            for descendant in self.links.child_ids(current)? {
                if descendant == parent_id {
                    return Ok(true);
                }
                if visited.insert(descendant) {
                    stack.push(descendant);
                }
            }
        }
        Ok(false)
    }

    fn collect(&self, note_id: NoteId, direction: Direction) -> GraphResult<Vec<Note>> {
        if !self.notes.note_exists(note_id)? {
            return Ok(Vec::new());
        }

        let mut cache: HashMap<NoteId, Note> = HashMap::new();
        let mut adjacency: HashMap<NoteId, Vec<NoteId>> = HashMap::new();
        let mut result = Vec::new();

        let mut stack = self.neighbours(note_id, direction, &mut adjacency)?;
        stack.reverse();
        while let Some(current) = stack.pop() {
            if let Some(limit) = self.limits.max_results {
                if result.len() >= limit {
                    return Err(GraphError::TraversalLimitExceeded { note_id, limit });
                }
            }

            let note = match cache.get(&current) {
                Some(note) => note.clone(),
                None => {
                    // Links cascade with notes; a dangling endpoint is corrupt data.
                    let loaded = self.notes.get_note(current)?.ok_or_else(|| {
                        RepoError::InvalidData(format!(
                            "link endpoint {current} has no note row"
                        ))
                    })?;
                    cache.insert(current, loaded.clone());
                    loaded
                }
            };
            result.push(note);

            let mut next = self.neighbours(current, direction, &mut adjacency)?;
            next.reverse();
            stack.extend(next);
        }

        Ok(result)
    }

    fn neighbours(
        &self,
        note_id: NoteId,
        direction: Direction,
        adjacency: &mut HashMap<NoteId, Vec<NoteId>>,
    ) -> RepoResult<Vec<NoteId>> {
        if let Some(ids) = adjacency.get(&note_id) {
            return Ok(ids.clone());
        }
        let ids = match direction {
            Direction::Up => self.links.parent_ids(note_id)?,
            Direction::Down => self.links.child_ids(note_id)?,
        };
        adjacency.insert(note_id, ids.clone());
        Ok(ids)
    }
}
