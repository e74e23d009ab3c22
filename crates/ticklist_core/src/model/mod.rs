//! Domain model for the todo record store.
//!
//! # Responsibility
//! - Define the canonical stored record and its companion input types.
//! - Own the validation rules the repository enforces on write paths.
//!
//! # Invariants
//! - Every stored record is identified by a stable `TodoId`.
//! - A stored record never carries an empty description.

pub mod todo;
