//! Todo domain model.
//!
//! # Responsibility
//! - Define the stored record shape: identity, timestamps, payload.
//! - Provide the validation rules write paths must run before mutating
//!   storage.
//!
//! # Invariants
//! - `id` is assigned once at creation and never changes.
//! - `description` is never empty for a stored record.
//! - `updated_at` is never earlier than `created_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque unique identifier assigned to every stored todo.
///
/// Kept as a type alias to make semantic intent explicit in signatures. The
/// repository's injected generator decides the actual format.
pub type TodoId = String;

/// Completion state of a todo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TodoStatus {
    /// Finished and no longer actionable.
    Done,
    /// Still open. This is the creation default.
    #[default]
    NotDone,
}

impl TodoStatus {
    /// Canonical wire spelling, also used by query values.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Done => "Done",
            Self::NotDone => "NotDone",
        }
    }

    /// Parses the canonical spelling. Anything else is rejected.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Done" => Some(Self::Done),
            "NotDone" => Some(Self::NotDone),
            _ => None,
        }
    }
}

impl Display for TodoStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stored todo record.
///
/// Instances are owned by the repository; callers always receive clones, so
/// mutating a returned value never touches stored state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Stable ID from the repository's injected generator.
    pub id: TodoId,
    /// Stamped once at creation, immutable afterwards.
    pub created_at: DateTime<Utc>,
    /// Equal to `created_at` at creation, refreshed on every update.
    pub updated_at: DateTime<Utc>,
    /// Free-form text, required to be non-empty.
    pub description: String,
    /// Completion state, defaults to `NotDone`.
    pub status: TodoStatus,
}

impl Todo {
    /// Checks the stored-record invariants.
    ///
    /// Write paths run this on the candidate state before committing it, so
    /// a failed validation leaves storage untouched.
    pub fn validate(&self) -> Result<(), TodoValidationError> {
        validate_description(&self.description)?;
        if self.updated_at < self.created_at {
            return Err(TodoValidationError::InvalidTimestamps {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }
}

/// Partial update for [`Todo`]. `None` fields are left unchanged.
///
/// An explicit empty description is rejected by the repository rather than
/// treated as "unset"; clearing a description is not supported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub description: Option<String>,
    pub status: Option<TodoStatus>,
}

impl TodoPatch {
    /// Patch that only replaces the description.
    pub fn description(text: impl Into<String>) -> Self {
        Self {
            description: Some(text.into()),
            ..Self::default()
        }
    }

    /// Patch that only replaces the status.
    pub fn status(status: TodoStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// Validation failure for todo input or stored state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoValidationError {
    /// Description text is required and must be non-empty.
    EmptyDescription,
    /// `updated_at` fell behind `created_at`, e.g. via a misbehaving clock.
    InvalidTimestamps {
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    },
}

impl Display for TodoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDescription => {
                write!(f, "description is not valid, it must be a non-empty string")
            }
            Self::InvalidTimestamps {
                created_at,
                updated_at,
            } => write!(
                f,
                "updated_at ({updated_at}) must not be earlier than created_at ({created_at})"
            ),
        }
    }
}

impl Error for TodoValidationError {}

/// Checks the non-empty description rule shared by insert and patch input.
pub fn validate_description(description: &str) -> Result<(), TodoValidationError> {
    if description.is_empty() {
        return Err(TodoValidationError::EmptyDescription);
    }
    Ok(())
}
