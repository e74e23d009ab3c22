//! Todo use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD entry points for core callers.
//! - Delegate storage to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation contracts.
//! - Service layer remains storage-agnostic.

use crate::model::todo::{Todo, TodoPatch, TodoStatus};
use crate::repo::todo_repo::{RepoResult, TodoRepository};
use std::collections::HashMap;

/// Use-case service wrapper for todo CRUD and query operations.
pub struct TodoService<R: TodoRepository> {
    repo: R,
}

impl<R: TodoRepository> TodoService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Stores a new open todo.
    ///
    /// # Contract
    /// - Status starts as `NotDone`.
    /// - Returns the stored record as a detached copy.
    pub fn add(&mut self, description: impl AsRef<str>) -> RepoResult<Todo> {
        self.repo.insert(description.as_ref(), None)
    }

    /// Stores a new todo with an explicit status.
    pub fn add_with_status(
        &mut self,
        description: impl AsRef<str>,
        status: TodoStatus,
    ) -> RepoResult<Todo> {
        self.repo.insert(description.as_ref(), Some(status))
    }

    /// Returns every stored todo in storage order.
    pub fn fetch_all(&self) -> RepoResult<Vec<Todo>> {
        self.repo.fetch_all()
    }

    /// Returns the todos matching a raw query mapping.
    ///
    /// Returns repository-level validation errors unchanged.
    pub fn fetch_by_query(&self, raw: &HashMap<String, String>) -> RepoResult<Vec<Todo>> {
        self.repo.fetch_by_query(raw)
    }

    /// Applies a partial update to an existing todo by id.
    pub fn update(&mut self, id: &str, patch: &TodoPatch) -> RepoResult<Todo> {
        self.repo.update(id, patch)
    }

    /// Marks a todo as completed.
    pub fn mark_done(&mut self, id: &str) -> RepoResult<Todo> {
        self.repo.update(id, &TodoPatch::status(TodoStatus::Done))
    }

    /// Reopens a completed todo.
    pub fn mark_not_done(&mut self, id: &str) -> RepoResult<Todo> {
        self.repo.update(id, &TodoPatch::status(TodoStatus::NotDone))
    }

    /// Removes a todo by id and returns its last stored state.
    pub fn delete(&mut self, id: &str) -> RepoResult<Todo> {
        self.repo.delete(id)
    }
}
