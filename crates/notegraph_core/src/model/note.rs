//! Note domain model and field validation.
//!
//! # Responsibility
//! - Define the persisted note record and its input shapes.
//! - Own the title/importance validation rules shared by create and update.
//!
//! # Invariants
//! - `title` is stored trimmed, non-empty, and at most [`TITLE_MAX_CHARS`]
//!   characters long.
//! - `importance`, when set, lies in `IMPORTANCE_MIN..=IMPORTANCE_MAX`.
//! - Timestamps are Unix epoch milliseconds assigned by storage.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned note identity. Never reused after deletion.
pub type NoteId = i64;

/// Maximum title length, counted in characters after trimming.
pub const TITLE_MAX_CHARS: usize = 200;
pub const IMPORTANCE_MIN: u8 = 0;
pub const IMPORTANCE_MAX: u8 = 9;

/// Field-level validation failure for note input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Title is empty or whitespace-only.
    BlankTitle,
    /// Title exceeds the character limit after trimming.
    TitleTooLong { chars: usize, max: usize },
    /// Importance is outside the accepted range.
    ImportanceOutOfRange(u8),
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "note title must not be blank"),
            Self::TitleTooLong { chars, max } => {
                write!(f, "note title has {chars} characters; at most {max} allowed")
            }
            Self::ImportanceOutOfRange(value) => write!(
                f,
                "note importance {value} is outside {IMPORTANCE_MIN}..={IMPORTANCE_MAX}"
            ),
        }
    }
}

impl Error for NoteValidationError {}

/// Persisted note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: Option<String>,
    pub importance: Option<u8>,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms timestamp of the last mutation.
    pub updated_at: i64,
}

impl Note {
    /// Returns the catalog projection of this note.
    pub fn summary(&self) -> NoteSummary {
        NoteSummary {
            id: self.id,
            title: self.title.clone(),
            importance: self.importance,
        }
    }
}

/// Lightweight projection used by listings and relation panels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSummary {
    pub id: NoteId,
    pub title: String,
    pub importance: Option<u8>,
}

/// A note together with its immediate neighbours.
///
/// `parents` and `children` are derived from links at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteWithRelations {
    #[serde(flatten)]
    pub note: Note,
    pub parents: Vec<NoteSummary>,
    pub children: Vec<NoteSummary>,
}

/// Input for note creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNote {
    pub title: String,
    pub content: Option<String>,
    pub importance: Option<u8>,
}

impl NewNote {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_importance(mut self, importance: u8) -> Self {
        self.importance = Some(importance);
        self
    }

    /// Validates all fields and returns the normalized (trimmed) input.
    pub fn validated(self) -> Result<Self, NoteValidationError> {
        let title = normalize_title(&self.title)?;
        validate_importance(self.importance)?;
        Ok(Self {
            title,
            content: self.content,
            importance: self.importance,
        })
    }
}

/// Partial update. `None` leaves a field unchanged.
///
/// `content` and `importance` use a nested option so callers can clear
/// them with `Some(None)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<Option<String>>,
    pub importance: Option<Option<u8>>,
}

impl NotePatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn content(mut self, content: Option<String>) -> Self {
        self.content = Some(content);
        self
    }

    pub fn importance(mut self, importance: Option<u8>) -> Self {
        self.importance = Some(importance);
        self
    }

    /// Validates only the supplied fields, trimming a supplied title.
    pub fn validated(self) -> Result<Self, NoteValidationError> {
        let title = self.title.as_deref().map(normalize_title).transpose()?;
        if let Some(importance) = self.importance {
            validate_importance(importance)?;
        }
        Ok(Self {
            title,
            content: self.content,
            importance: self.importance,
        })
    }
}

/// Trims `title` and checks the blank and length rules.
pub fn normalize_title(title: &str) -> Result<String, NoteValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(NoteValidationError::BlankTitle);
    }
    let chars = trimmed.chars().count();
    if chars > TITLE_MAX_CHARS {
        return Err(NoteValidationError::TitleTooLong {
            chars,
            max: TITLE_MAX_CHARS,
        });
    }
    Ok(trimmed.to_string())
}

pub fn validate_importance(importance: Option<u8>) -> Result<(), NoteValidationError> {
    match importance {
        Some(value) if !(IMPORTANCE_MIN..=IMPORTANCE_MAX).contains(&value) => {
            Err(NoteValidationError::ImportanceOutOfRange(value))
        }
        _ => Ok(()),
    }
}
