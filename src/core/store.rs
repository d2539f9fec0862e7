//! Store trait: the relational collaborator the engine drives

use anyhow::Result;
use async_trait::async_trait;
use std::fmt;

use crate::core::field::FieldValue;
use crate::core::order::OrderSpec;
use crate::core::predicate::QueryFilter;
use crate::core::record::Record;

/// A primary-key value taken from untrusted input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKey {
    /// The id parsed as a non-negative integer
    Numeric(u64),
    /// Any other id, kept verbatim (trimmed)
    Text(String),
}

impl RecordKey {
    /// Classify a raw id
    ///
    /// Only ids made entirely of ASCII digits that fit a `u64` are numeric;
    /// `+1`, `-1` and `007x` stay textual.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = raw.parse::<u64>() {
                return RecordKey::Numeric(id);
            }
        }
        RecordKey::Text(raw.to_string())
    }

    /// Whether a stored key value equals this key
    pub fn matches(&self, value: &FieldValue) -> bool {
        match (self, value) {
            (RecordKey::Numeric(id), FieldValue::Integer(stored)) => {
                u64::try_from(*stored).is_ok_and(|stored| stored == *id)
            }
            (RecordKey::Numeric(id), FieldValue::String(stored)) => stored == &id.to_string(),
            (RecordKey::Text(id), FieldValue::Uuid(stored)) => {
                uuid::Uuid::parse_str(id).is_ok_and(|id| id == *stored)
            }
            (RecordKey::Text(id), FieldValue::String(stored)) => stored == id,
            _ => false,
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Numeric(id) => write!(f, "{}", id),
            RecordKey::Text(id) => f.write_str(id),
        }
    }
}

/// Relational store over one record type
///
/// Every identifier a store receives (in filters, orders and update column
/// sets) has already passed the column allowlist; every operand must still
/// be bound as a parameter, never interpolated.
#[async_trait]
pub trait Store<T: Record>: Send + Sync {
    /// Count the rows matching a filter
    async fn count(&self, filter: &QueryFilter) -> Result<u64>;

    /// Fetch matching rows in the given order, bounded by limit and offset
    async fn fetch(
        &self,
        filter: &QueryFilter,
        orders: &[OrderSpec],
        limit: u64,
        offset: u64,
    ) -> Result<Vec<T>>;

    /// Insert a full row, returning it with any store-assigned key
    async fn insert(&self, record: T) -> Result<T>;

    /// Write the listed columns of the row whose primary key matches the
    /// record's, returning the number of rows affected
    async fn update_columns(&self, record: &T, columns: &[&'static str]) -> Result<u64>;

    /// Delete by primary-key equality, returning the number of rows affected
    async fn delete_by_key(&self, key: &RecordKey) -> Result<u64>;
}
