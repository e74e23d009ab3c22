//! Query layer: validation, matching and ordering of stored todos.
//!
//! # Responsibility
//! - Turn raw string-keyed query mappings into a closed typed form.
//! - Evaluate the typed form against records without touching storage.
//!
//! # Invariants
//! - Validation happens in one pass before any matching; a single bad
//!   key/value fails the whole query.
//! - Matching and sorting never mutate the repository.

pub mod engine;
