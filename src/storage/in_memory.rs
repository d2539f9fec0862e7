//! In-memory implementation of Store for testing and development

use crate::core::field::FieldValue;
use crate::core::order::OrderSpec;
use crate::core::predicate::{Comparison, Predicate, QueryFilter};
use crate::core::record::Record;
use crate::core::store::{RecordKey, Store};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, PoisonError, RwLock};

/// In-memory store implementation
///
/// Evaluates predicates in process with SQL-like semantics: operands are
/// coerced to the column's kind, `NULL` only matches `IS NULL`, and `LIKE`
/// is case-insensitive with `%`, `_` and `\` escapes. Integer keys are
/// assigned from an increasing sequence, UUID keys are random.
#[derive(Clone)]
pub struct InMemoryStore<T> {
    rows: Arc<RwLock<Vec<T>>>,
    sequence: Arc<AtomicU64>,
}

impl<T: Record> InMemoryStore<T> {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(Vec::new())),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of stored rows
    ///
    /// Counts through a poisoned lock; every write leaves the row vector
    /// whole, so its length stays valid.
    pub fn len(&self) -> usize {
        self.rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every stored row, in insertion order
    pub fn all(&self) -> Result<Vec<T>> {
        let rows = self
            .rows
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        Ok(rows.clone())
    }

    fn matching(&self, filter: &QueryFilter) -> Result<Vec<T>> {
        let rows = self
            .rows
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(rows
            .iter()
            .filter(|row| matches_filter(*row, filter))
            .cloned()
            .collect())
    }
}

impl<T: Record> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> Store<T> for InMemoryStore<T>
where
    T: Record + Serialize + DeserializeOwned,
{
    async fn count(&self, filter: &QueryFilter) -> Result<u64> {
        Ok(self.matching(filter)?.len() as u64)
    }

    async fn fetch(
        &self,
        filter: &QueryFilter,
        orders: &[OrderSpec],
        limit: u64,
        offset: u64,
    ) -> Result<Vec<T>> {
        let mut rows = self.matching(filter)?;
        sort_rows(&mut rows, orders);

        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    async fn insert(&self, mut record: T) -> Result<T> {
        let mut rows = self
            .rows
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if record.has_zero_key() {
            let sequence = self.sequence.fetch_add(1, AtomicOrdering::SeqCst) + 1;
            if !record.assign_generated_key(sequence) {
                return Err(anyhow!(
                    "{}: primary key cannot be generated, supply one",
                    T::resource_name()
                ));
            }
        } else if let Some(FieldValue::Integer(key)) = record.primary_key_value() {
            if let Ok(key) = u64::try_from(key) {
                self.sequence.fetch_max(key, AtomicOrdering::SeqCst);
            }
        }

        let key = record.primary_key_value();
        if rows.iter().any(|row| row.primary_key_value() == key) {
            return Err(anyhow!(
                "{}: duplicate primary key {:?}",
                T::resource_name(),
                key
            ));
        }

        rows.push(record.clone());
        Ok(record)
    }

    async fn update_columns(&self, record: &T, columns: &[&'static str]) -> Result<u64> {
        let key = record.primary_key_value();
        let field_names: Vec<&'static str> = T::fields()
            .iter()
            .filter(|field| columns.contains(&field.column_name()))
            .map(|field| field.name)
            .collect();

        let mut rows = self
            .rows
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let Some(stored) = rows.iter_mut().find(|row| row.primary_key_value() == key) else {
            return Ok(0);
        };

        let mut merged = serde_json::to_value(&*stored)?;
        let incoming = serde_json::to_value(record)?;
        if let (Some(target), Some(source)) = (merged.as_object_mut(), incoming.as_object()) {
            for name in field_names {
                if let Some(value) = source.get(name) {
                    target.insert(name.to_string(), value.clone());
                }
            }
        }

        *stored = serde_json::from_value(merged)
            .map_err(|e| anyhow!("Failed to merge updated columns: {}", e))?;
        Ok(1)
    }

    async fn delete_by_key(&self, key: &RecordKey) -> Result<u64> {
        let mut rows = self
            .rows
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let before = rows.len();
        rows.retain(|row| !row.primary_key_value().is_some_and(|value| key.matches(&value)));
        Ok((before - rows.len()) as u64)
    }
}

fn matches_filter<T: Record>(row: &T, filter: &QueryFilter) -> bool {
    filter
        .predicates()
        .iter()
        .all(|predicate| matches_predicate(row, predicate))
}

fn matches_predicate<T: Record>(row: &T, predicate: &Predicate) -> bool {
    let Some(value) = row.column_value(predicate.column()) else {
        return false;
    };

    match predicate {
        Predicate::Compare { op, value: operand, .. } => {
            value.compare_operand(operand).is_some_and(|ordering| match op {
                Comparison::Eq => ordering == Ordering::Equal,
                Comparison::Ne => ordering != Ordering::Equal,
                Comparison::Gt => ordering == Ordering::Greater,
                Comparison::Gte => ordering != Ordering::Less,
                Comparison::Lt => ordering == Ordering::Less,
                Comparison::Lte => ordering != Ordering::Greater,
            })
        }
        Predicate::Like { pattern, .. } => value
            .to_text()
            .is_some_and(|text| like_match(pattern, &text)),
        Predicate::In { values, .. } => values
            .iter()
            .any(|operand| value.compare_operand(operand) == Some(Ordering::Equal)),
        Predicate::NotIn { values, .. } => values.iter().all(|operand| {
            value
                .compare_operand(operand)
                .is_some_and(|ordering| ordering != Ordering::Equal)
        }),
        Predicate::IsNull { .. } => value.is_null(),
        Predicate::IsNotNull { .. } => !value.is_null(),
    }
}

fn sort_rows<T: Record>(rows: &mut [T], orders: &[OrderSpec]) {
    if orders.is_empty() {
        return;
    }

    rows.sort_by(|a, b| {
        for order in orders {
            let left = a.column_value(&order.column).unwrap_or(FieldValue::Null);
            let right = b.column_value(&order.column).unwrap_or(FieldValue::Null);
            let ordering = left.sort_cmp(&right);
            let ordering = if order.descending {
                ordering.reverse()
            } else {
                ordering
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

/// Case-insensitive SQL `LIKE`: `%` is any run, `_` any one character,
/// `\` escapes the next character
pub fn like_match(pattern: &str, text: &str) -> bool {
    #[derive(Clone, Copy, PartialEq)]
    enum Token {
        Any,
        One,
        Char(char),
    }

    let mut tokens = Vec::new();
    let mut chars = pattern.chars().flat_map(char::to_lowercase);
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '%' => Token::Any,
            '_' => Token::One,
            '\\' => Token::Char(chars.next().unwrap_or('\\')),
            other => Token::Char(other),
        });
    }
    let text: Vec<char> = text.chars().flat_map(char::to_lowercase).collect();

    // matched[j]: tokens so far match text[..j]
    let mut matched = vec![false; text.len() + 1];
    matched[0] = true;
    for token in tokens {
        let mut next = vec![false; text.len() + 1];
        match token {
            Token::Any => {
                let mut reachable = false;
                for j in 0..=text.len() {
                    reachable |= matched[j];
                    next[j] = reachable;
                }
            }
            Token::One => {
                for j in 1..=text.len() {
                    next[j] = matched[j - 1];
                }
            }
            Token::Char(c) => {
                for j in 1..=text.len() {
                    next[j] = matched[j - 1] && text[j - 1] == c;
                }
            }
        }
        matched = next;
    }

    matched[text.len()]
}
