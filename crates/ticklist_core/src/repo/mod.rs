//! Repository layer abstractions and the in-memory implementation.
//!
//! # Responsibility
//! - Define the use-case oriented data access contract for todos.
//! - Keep storage and injected-collaborator details behind the trait.
//!
//! # Invariants
//! - Repository writes validate candidate state before committing it.
//! - Repository APIs return semantic errors (`NotFound`, `NotInitialized`)
//!   in addition to validation errors.

pub mod todo_repo;
