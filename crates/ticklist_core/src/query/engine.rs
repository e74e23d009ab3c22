//! Filter + sort engine over the todo store.
//!
//! # Responsibility
//! - Parse a raw `field -> value` mapping into typed predicates and an
//!   optional sort directive.
//! - Evaluate predicates conjunctively and order the surviving records.
//!
//! # Invariants
//! - The set of recognized keys is closed; unknown keys fail validation.
//! - `Sort` and `SortBy` are accepted together or not at all.
//! - Date comparisons always happen at day granularity on both sides.
//! - A malformed description pattern matches nothing; it never fails the
//!   query (documented rough edge, logged as a warning).

use crate::model::todo::{Todo, TodoStatus};
use chrono::{DateTime, NaiveDate, Utc};
use log::warn;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Result type for query parsing.
pub type QueryResult<T> = Result<T, QueryError>;

/// Validation failure for a raw query mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The key is not part of the recognized query vocabulary.
    UnrecognizedField(String),
    /// `Status` value is neither `Done` nor `NotDone`.
    InvalidStatus(String),
    /// A date-valued key did not parse as `YYYY-MM-DD`.
    InvalidDate { field: &'static str, value: String },
    /// `Sort` value is neither `asc` nor `desc`.
    InvalidSortOrder(String),
    /// `SortBy` value names a field that cannot be sorted on.
    InvalidSortKey(String),
    /// Exactly one of `Sort`/`SortBy` was supplied.
    UnpairedSort {
        present: &'static str,
        missing: &'static str,
    },
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnrecognizedField(key) => write!(f, "unrecognized query field `{key}`"),
            Self::InvalidStatus(value) => write!(
                f,
                "invalid Status query value `{value}`, expected Done or NotDone"
            ),
            Self::InvalidDate { field, value } => write!(
                f,
                "invalid date `{value}` for query field `{field}`, expected YYYY-MM-DD"
            ),
            Self::InvalidSortOrder(value) => write!(
                f,
                "invalid Sort query value `{value}`, expected asc or desc"
            ),
            Self::InvalidSortKey(value) => write!(
                f,
                "invalid SortBy query value `{value}`, expected Id, CreatedAt, UpdatedAt or Description"
            ),
            Self::UnpairedSort { present, missing } => {
                write!(f, "query has `{present}` but is missing `{missing}`")
            }
        }
    }
}

impl Error for QueryError {}

/// Timestamp field a date predicate or sort reads from a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    CreatedAt,
    UpdatedAt,
}

impl DateField {
    fn of(self, todo: &Todo) -> DateTime<Utc> {
        match self {
            Self::CreatedAt => todo.created_at,
            Self::UpdatedAt => todo.updated_at,
        }
    }
}

/// Comparison a date predicate applies after day truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOp {
    Eq,
    Lt,
    Gt,
}

/// One field-level test derived from a query key/value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Exact equality on the record id.
    Id(String),
    /// Regex search (not full-match) over the description. The pattern is
    /// compiled once per query; a pattern that fails to compile matches
    /// nothing.
    Description(String),
    /// Exact equality on the completion status.
    Status(TodoStatus),
    /// Day-truncated comparison of a timestamp field against a query date.
    Date {
        field: DateField,
        op: DateOp,
        value: NaiveDate,
    },
}

/// Field the result set is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Id,
    CreatedAt,
    UpdatedAt,
    Description,
}

impl SortKey {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "Id" => Some(Self::Id),
            "CreatedAt" => Some(Self::CreatedAt),
            "UpdatedAt" => Some(Self::UpdatedAt),
            "Description" => Some(Self::Description),
            _ => None,
        }
    }
}

/// Direction of the ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Sort directive: field plus direction, always paired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub key: SortKey,
    pub order: SortOrder,
}

/// Validated query: conjunctive predicates plus an optional sort directive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoQuery {
    pub predicates: Vec<Predicate>,
    pub sort: Option<Sort>,
}

impl TodoQuery {
    /// Parses and validates a raw query mapping in one pass.
    ///
    /// The recognized keys are exactly `Id`, `Description`, `Status`,
    /// `CreatedAt`, `UpdatedAt`, their `_lt`/`_gt` variants, `Sort` and
    /// `SortBy`. The first violation aborts the whole query.
    pub fn parse(raw: &HashMap<String, String>) -> QueryResult<Self> {
        let mut predicates = Vec::new();
        let mut sort_key = None;
        let mut sort_order = None;

        for (field, value) in raw {
            match field.as_str() {
                "Id" => predicates.push(Predicate::Id(value.clone())),
                "Description" => predicates.push(Predicate::Description(value.clone())),
                "Status" => {
                    let status = TodoStatus::parse(value)
                        .ok_or_else(|| QueryError::InvalidStatus(value.clone()))?;
                    predicates.push(Predicate::Status(status));
                }
                "CreatedAt" => predicates.push(date_predicate(
                    DateField::CreatedAt,
                    DateOp::Eq,
                    "CreatedAt",
                    value,
                )?),
                "CreatedAt_lt" => predicates.push(date_predicate(
                    DateField::CreatedAt,
                    DateOp::Lt,
                    "CreatedAt_lt",
                    value,
                )?),
                "CreatedAt_gt" => predicates.push(date_predicate(
                    DateField::CreatedAt,
                    DateOp::Gt,
                    "CreatedAt_gt",
                    value,
                )?),
                "UpdatedAt" => predicates.push(date_predicate(
                    DateField::UpdatedAt,
                    DateOp::Eq,
                    "UpdatedAt",
                    value,
                )?),
                "UpdatedAt_lt" => predicates.push(date_predicate(
                    DateField::UpdatedAt,
                    DateOp::Lt,
                    "UpdatedAt_lt",
                    value,
                )?),
                "UpdatedAt_gt" => predicates.push(date_predicate(
                    DateField::UpdatedAt,
                    DateOp::Gt,
                    "UpdatedAt_gt",
                    value,
                )?),
                "Sort" => {
                    sort_order = Some(
                        SortOrder::parse(value)
                            .ok_or_else(|| QueryError::InvalidSortOrder(value.clone()))?,
                    );
                }
                "SortBy" => {
                    sort_key = Some(
                        SortKey::parse(value)
                            .ok_or_else(|| QueryError::InvalidSortKey(value.clone()))?,
                    );
                }
                other => return Err(QueryError::UnrecognizedField(other.to_string())),
            }
        }

        let sort = match (sort_key, sort_order) {
            (Some(key), Some(order)) => Some(Sort { key, order }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(QueryError::UnpairedSort {
                    present: "SortBy",
                    missing: "Sort",
                });
            }
            (None, Some(_)) => {
                return Err(QueryError::UnpairedSort {
                    present: "Sort",
                    missing: "SortBy",
                });
            }
        };

        Ok(Self { predicates, sort })
    }
}

fn date_predicate(
    field: DateField,
    op: DateOp,
    key: &'static str,
    value: &str,
) -> QueryResult<Predicate> {
    let date = NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        QueryError::InvalidDate {
            field: key,
            value: value.to_string(),
        }
    })?;
    Ok(Predicate::Date {
        field,
        op,
        value: date,
    })
}

/// Predicate with the description pattern compiled once per query run.
enum CompiledPredicate<'a> {
    Id(&'a str),
    Description(Option<Regex>),
    Status(TodoStatus),
    Date {
        field: DateField,
        op: DateOp,
        value: NaiveDate,
    },
}

fn compile(predicates: &[Predicate]) -> Vec<CompiledPredicate<'_>> {
    predicates
        .iter()
        .map(|predicate| match predicate {
            Predicate::Id(id) => CompiledPredicate::Id(id),
            Predicate::Description(pattern) => {
                let compiled = match Regex::new(pattern) {
                    Ok(regex) => Some(regex),
                    Err(err) => {
                        warn!(
                            "event=invalid_description_pattern module=query status=degraded pattern={pattern} error={err}"
                        );
                        None
                    }
                };
                CompiledPredicate::Description(compiled)
            }
            Predicate::Status(status) => CompiledPredicate::Status(*status),
            Predicate::Date { field, op, value } => CompiledPredicate::Date {
                field: *field,
                op: *op,
                value: *value,
            },
        })
        .collect()
}

fn matches(todo: &Todo, predicates: &[CompiledPredicate<'_>]) -> bool {
    predicates.iter().all(|predicate| match predicate {
        CompiledPredicate::Id(id) => todo.id == *id,
        CompiledPredicate::Description(regex) => regex
            .as_ref()
            .is_some_and(|regex| regex.is_match(&todo.description)),
        CompiledPredicate::Status(status) => todo.status == *status,
        CompiledPredicate::Date { field, op, value } => {
            let stored = field.of(todo).date_naive();
            match op {
                DateOp::Eq => stored == *value,
                DateOp::Lt => stored < *value,
                DateOp::Gt => stored > *value,
            }
        }
    })
}

fn compare(a: &Todo, b: &Todo, key: SortKey) -> Ordering {
    match key {
        SortKey::Id => a.id.cmp(&b.id),
        SortKey::Description => a.description.cmp(&b.description),
        SortKey::CreatedAt => a.created_at.date_naive().cmp(&b.created_at.date_naive()),
        SortKey::UpdatedAt => a.updated_at.date_naive().cmp(&b.updated_at.date_naive()),
    }
}

/// Runs a validated query over the stored records.
///
/// Matching preserves storage order. When a sort directive is present the
/// survivors are reordered with a stable sort; `desc` is the negated `asc`
/// comparator, so ties keep their relative order in both directions.
pub fn run_query(todos: &[Todo], query: &TodoQuery) -> Vec<Todo> {
    let compiled = compile(&query.predicates);

    let mut result: Vec<Todo> = todos
        .iter()
        .filter(|todo| matches(todo, &compiled))
        .cloned()
        .collect();

    if let Some(sort) = query.sort {
        if !result.is_empty() {
            result.sort_by(|a, b| {
                let ordering = compare(a, b, sort.key);
                match sort.order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            });
        }
    }

    result
}
