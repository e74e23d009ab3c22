//! Todo repository contract and in-memory implementation.
//!
//! # Responsibility
//! - Provide stable CRUD + query APIs over the in-memory record sequence.
//! - Stamp identity and timestamps from injected collaborators so tests can
//!   pin both.
//!
//! # Invariants
//! - Storage holds records in insertion order; delete keeps the relative
//!   order of the remainder.
//! - Callers only ever receive clones of stored records.
//! - A failed validation leaves storage untouched.

use crate::model::todo::{validate_description, Todo, TodoId, TodoPatch, TodoStatus, TodoValidationError};
use crate::query::engine::{run_query, QueryError, TodoQuery};
use chrono::{DateTime, Utc};
use log::debug;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Produces a fresh record id. Must yield values unique for the lifetime of
/// the repository it is handed to.
pub type IdGenerator = Box<dyn Fn() -> TodoId + Send>;

/// Reads the current wall-clock time. Injected so tests can freeze or step
/// timestamps deterministically.
pub type Clock = Box<dyn Fn() -> DateTime<Utc> + Send>;

/// Repository error for todo storage and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Input failed a record-level rule (empty description, bad timestamps).
    Validation(TodoValidationError),
    /// A query mapping failed validation; carried verbatim from the engine.
    Query(QueryError),
    /// No stored record has the requested id.
    NotFound(TodoId),
    /// The store was never initialized; distinct from an empty store.
    NotInitialized,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Query(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "todo not found: {id}"),
            Self::NotInitialized => write!(f, "repository not initialized"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Query(err) => Some(err),
            Self::NotFound(_) => None,
            Self::NotInitialized => None,
        }
    }
}

impl From<TodoValidationError> for RepoError {
    fn from(value: TodoValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<QueryError> for RepoError {
    fn from(value: QueryError) -> Self {
        Self::Query(value)
    }
}

/// Repository interface for todo CRUD and query operations.
pub trait TodoRepository {
    /// Stores a new record. Status defaults to `NotDone` when omitted; both
    /// timestamps come from a single clock read.
    fn insert(&mut self, description: &str, status: Option<TodoStatus>) -> RepoResult<Todo>;

    /// Returns all records in storage order.
    fn fetch_all(&self) -> RepoResult<Vec<Todo>>;

    /// Validates `raw` and returns the matching records, ordered per the
    /// query's sort directive when present.
    fn fetch_by_query(&self, raw: &HashMap<String, String>) -> RepoResult<Vec<Todo>>;

    /// Applies the present patch fields and refreshes `updated_at`.
    fn update(&mut self, id: &str, patch: &TodoPatch) -> RepoResult<Todo>;

    /// Removes and returns the record with the given id.
    fn delete(&mut self, id: &str) -> RepoResult<Todo>;
}

/// In-memory todo repository backed by a `Vec` in insertion order.
///
/// `records` is `None` for a store that was never initialized, mirroring the
/// distinction `fetch_all` is required to make; the first insert initializes
/// it.
pub struct InMemoryTodoRepository {
    id_gen: IdGenerator,
    clock: Clock,
    records: Option<Vec<Todo>>,
}

impl InMemoryTodoRepository {
    /// Creates an initialized, empty repository using the system clock.
    pub fn new(id_gen: IdGenerator) -> Self {
        Self::with_clock(id_gen, Box::new(Utc::now))
    }

    /// Creates an initialized, empty repository with an injected clock.
    pub fn with_clock(id_gen: IdGenerator, clock: Clock) -> Self {
        Self {
            id_gen,
            clock,
            records: Some(Vec::new()),
        }
    }

    /// Creates a repository whose store does not exist yet.
    ///
    /// Fetch operations fail with [`RepoError::NotInitialized`] until the
    /// first insert brings the store into existence.
    pub fn uninitialized(id_gen: IdGenerator) -> Self {
        Self {
            id_gen,
            clock: Box::new(Utc::now),
            records: None,
        }
    }

    fn position_of(&self, id: &str) -> Option<usize> {
        self.records
            .as_deref()
            .unwrap_or_default()
            .iter()
            .position(|todo| todo.id == id)
    }
}

impl Default for InMemoryTodoRepository {
    /// Initialized repository with uuid-v4 ids and the system clock.
    fn default() -> Self {
        Self::new(Box::new(|| Uuid::new_v4().to_string()))
    }
}

impl TodoRepository for InMemoryTodoRepository {
    fn insert(&mut self, description: &str, status: Option<TodoStatus>) -> RepoResult<Todo> {
        validate_description(description)?;

        let now = (self.clock)();
        let todo = Todo {
            id: (self.id_gen)(),
            created_at: now,
            updated_at: now,
            description: description.to_string(),
            status: status.unwrap_or_default(),
        };

        debug!(
            "event=todo_insert module=repo status=ok id={} todo_status={}",
            todo.id, todo.status
        );
        self.records.get_or_insert_with(Vec::new).push(todo.clone());

        Ok(todo)
    }

    fn fetch_all(&self) -> RepoResult<Vec<Todo>> {
        let records = self.records.as_ref().ok_or(RepoError::NotInitialized)?;
        Ok(records.clone())
    }

    fn fetch_by_query(&self, raw: &HashMap<String, String>) -> RepoResult<Vec<Todo>> {
        let records = self.records.as_ref().ok_or(RepoError::NotInitialized)?;
        let query = TodoQuery::parse(raw)?;
        Ok(run_query(records, &query))
    }

    fn update(&mut self, id: &str, patch: &TodoPatch) -> RepoResult<Todo> {
        let index = self
            .position_of(id)
            .ok_or_else(|| RepoError::NotFound(id.to_string()))?;

        // Build and validate the candidate before committing, so a rejected
        // patch leaves the stored record (and its updated_at) untouched.
        let records = self.records.as_mut().ok_or(RepoError::NotInitialized)?;
        let mut candidate = records[index].clone();
        if let Some(description) = &patch.description {
            validate_description(description)?;
            candidate.description = description.clone();
        }
        if let Some(status) = patch.status {
            candidate.status = status;
        }
        candidate.updated_at = (self.clock)();
        candidate.validate()?;

        debug!(
            "event=todo_update module=repo status=ok id={} todo_status={}",
            candidate.id, candidate.status
        );
        records[index] = candidate.clone();

        Ok(candidate)
    }

    fn delete(&mut self, id: &str) -> RepoResult<Todo> {
        let index = self
            .position_of(id)
            .ok_or_else(|| RepoError::NotFound(id.to_string()))?;

        let records = self.records.as_mut().ok_or(RepoError::NotInitialized)?;
        // Vec::remove shifts the tail left, keeping relative order.
        let removed = records.remove(index);
        debug!(
            "event=todo_delete module=repo status=ok id={}",
            removed.id
        );

        Ok(removed)
    }
}
