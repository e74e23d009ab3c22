//! In-memory todo record store.
//! This crate is the single source of truth for record and query invariants.

pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::todo::{Todo, TodoId, TodoPatch, TodoStatus, TodoValidationError};
pub use query::engine::{
    run_query, DateField, DateOp, Predicate, QueryError, QueryResult, Sort, SortKey, SortOrder,
    TodoQuery,
};
pub use repo::todo_repo::{
    Clock, IdGenerator, InMemoryTodoRepository, RepoError, RepoResult, TodoRepository,
};
pub use service::todo_service::TodoService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
