//! Graph integrity and traversal engine.
//!
//! # Responsibility
//! - Compute transitive ancestor/descendant sequences over note links.
//! - Gatekeep link creation so the edge set stays a DAG.
//!
//! # Invariants
//! - The engine only reads through repository traits; the single write it
//!   performs is the admitted `create_link`.
//! - The edge set is acyclic before every admission. A candidate
//!   `parent -> child` is admitted only when `parent` is unreachable from
//!   `child`, which keeps it acyclic afterwards.

use crate::model::link::LinkId;
use crate::model::note::{NoteId, NoteValidationError};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod admission;
pub mod traversal;

pub use admission::LinkAdmission;
pub use traversal::GraphTraversal;

pub type GraphResult<T> = Result<T, GraphError>;

/// Optional caller-side guard for traversal output size.
///
/// Path multiplicity makes ancestor/descendant sequences grow with the
/// number of paths, not the number of notes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalLimits {
    /// Maximum entries a single traversal may return. `None` is unbounded.
    pub max_results: Option<usize>,
}

impl TraversalLimits {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn max_results(limit: usize) -> Self {
        Self {
            max_results: Some(limit),
        }
    }
}

/// Classified failure of a graph operation.
#[derive(Debug)]
pub enum GraphError {
    /// Note input violates a field rule.
    Validation(NoteValidationError),
    /// Referenced note does not exist.
    NoteNotFound(NoteId),
    /// The directed pair is already linked.
    Conflict {
        parent_id: NoteId,
        child_id: NoteId,
        existing_link_id: Option<LinkId>,
    },
    /// Linking `parent_id -> child_id` would close a cycle.
    Cycle { parent_id: NoteId, child_id: NoteId },
    /// Traversal output exceeded the configured bound.
    TraversalLimitExceeded { note_id: NoteId, limit: usize },
    /// Storage-level failure.
    Repo(RepoError),
}

impl Display for GraphError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::Conflict {
                parent_id,
                child_id,
                ..
            } => write!(f, "link {parent_id} -> {child_id} already exists"),
            Self::Cycle {
                parent_id,
                child_id,
            } if parent_id == child_id => {
                write!(f, "link would create cycle: note {parent_id} cannot contain itself")
            }
            Self::Cycle {
                parent_id,
                child_id,
            } => write!(
                f,
                "link would create cycle: note {parent_id} is already a descendant of note {child_id}"
            ),
            Self::TraversalLimitExceeded { note_id, limit } => write!(
                f,
                "traversal from note {note_id} exceeded limit of {limit} results"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GraphError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NoteValidationError> for GraphError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for GraphError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DuplicateLink {
                parent_id,
                child_id,
            } => Self::Conflict {
                parent_id,
                child_id,
                existing_link_id: None,
            },
            RepoError::SelfLink(note_id) => Self::Cycle {
                parent_id: note_id,
                child_id: note_id,
            },
            other => Self::Repo(other),
        }
    }
}

impl From<rusqlite::Error> for GraphError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(value.into())
    }
}
