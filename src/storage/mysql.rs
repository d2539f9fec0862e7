//! MySQL storage backend using sqlx.
//!
//! Provides `MysqlStore<T>`, a [`Store`] over one table per record type.
//!
//! # Feature flag
//!
//! This module is gated behind the `mysql` feature flag:
//! ```toml
//! [dependencies]
//! this-crud = { version = "0.0.9", features = ["mysql"] }
//! ```
//!
//! # Mapping
//!
//! - Table name: `Record::resource_name()`
//! - Columns: the descriptors' column names, backtick-quoted, and only
//!   after passing the identifier check
//! - Every operand is a bound `?` parameter
//! - UUIDs are stored as `CHAR(36)`
//! - Rows are decoded column by column according to the field kind, merged
//!   into a JSON object keyed by field name and deserialized into `T`; fields
//!   not listed in `impl_record!` therefore need `#[serde(default)]`
//! - No `RETURNING`: integer keys come from `LAST_INSERT_ID()`

use crate::core::field::{FieldDescriptor, FieldKind, FieldValue};
use crate::core::order::OrderSpec;
use crate::core::predicate::{Predicate, QueryFilter};
use crate::core::record::Record;
use crate::core::schema::is_safe_identifier;
use crate::core::store::{RecordKey, Store};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, MySqlPool, QueryBuilder, Row};

/// Quote a column or table name, refusing anything but plain identifiers
pub fn quote_identifier(name: &str) -> Result<String> {
    if !is_safe_identifier(name) {
        return Err(anyhow!("refusing unsafe identifier '{}'", name));
    }
    Ok(format!("`{}`", name))
}

/// Append ` WHERE ...` for a non-empty filter
fn push_where(builder: &mut QueryBuilder<'static, MySql>, filter: &QueryFilter) -> Result<()> {
    for (index, predicate) in filter.predicates().iter().enumerate() {
        builder.push(if index == 0 { " WHERE " } else { " AND " });
        let column = quote_identifier(predicate.column())?;

        match predicate {
            Predicate::Compare { op, value, .. } => {
                builder.push(format!("{} {} ", column, op.sql()));
                builder.push_bind(value.clone());
            }
            Predicate::Like { pattern, .. } => {
                builder.push(format!("{} LIKE ", column));
                builder.push_bind(pattern.clone());
            }
            Predicate::In { values, .. } | Predicate::NotIn { values, .. } => {
                let keyword = if matches!(predicate, Predicate::In { .. }) {
                    "IN"
                } else {
                    "NOT IN"
                };
                builder.push(format!("{} {} (", column, keyword));
                let mut separated = builder.separated(", ");
                for value in values {
                    separated.push_bind(value.clone());
                }
                separated.push_unseparated(")");
            }
            Predicate::IsNull { .. } => {
                builder.push(format!("{} IS NULL", column));
            }
            Predicate::IsNotNull { .. } => {
                builder.push(format!("{} IS NOT NULL", column));
            }
        }
    }
    Ok(())
}

/// Bind one field value
fn push_value(builder: &mut QueryBuilder<'static, MySql>, value: FieldValue) {
    match value {
        FieldValue::String(v) => builder.push_bind(v),
        FieldValue::Integer(v) => builder.push_bind(v),
        FieldValue::Float(v) => builder.push_bind(v),
        FieldValue::Boolean(v) => builder.push_bind(v),
        FieldValue::Uuid(v) => builder.push_bind(v.to_string()),
        FieldValue::DateTime(v) => builder.push_bind(v),
        FieldValue::Null => builder.push_bind(None::<String>),
    };
}

/// `SELECT COUNT(*) FROM t WHERE ...`
pub fn count_query<T: Record>(filter: &QueryFilter) -> Result<QueryBuilder<'static, MySql>> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT COUNT(*) FROM {}",
        quote_identifier(T::resource_name())?
    ));
    push_where(&mut builder, filter)?;
    Ok(builder)
}

/// `SELECT cols FROM t WHERE ... ORDER BY ... LIMIT ? OFFSET ?`
pub fn fetch_query<T: Record>(
    filter: &QueryFilter,
    orders: &[OrderSpec],
    limit: u64,
    offset: u64,
) -> Result<QueryBuilder<'static, MySql>> {
    let columns = T::fields()
        .iter()
        .map(|field| quote_identifier(field.column_name()))
        .collect::<Result<Vec<_>>>()?;
    if columns.is_empty() {
        return Err(anyhow!("{} declares no columns", T::resource_name()));
    }

    let mut builder = QueryBuilder::new(format!(
        "SELECT {} FROM {}",
        columns.join(", "),
        quote_identifier(T::resource_name())?
    ));
    push_where(&mut builder, filter)?;

    for (index, order) in orders.iter().enumerate() {
        builder.push(if index == 0 { " ORDER BY " } else { ", " });
        builder.push(format!(
            "{} {}",
            quote_identifier(&order.column)?,
            order.direction()
        ));
    }

    builder.push(" LIMIT ");
    builder.push_bind(limit);
    builder.push(" OFFSET ");
    builder.push_bind(offset);
    Ok(builder)
}

/// `INSERT INTO t (cols) VALUES (?, ...)`, leaving out a zero integer key
pub fn insert_query<T: Record>(record: &T) -> Result<QueryBuilder<'static, MySql>> {
    let omit_key = record.has_zero_key()
        && T::primary_key_field().is_some_and(|key| key.kind == FieldKind::Integer);

    let fields: Vec<&FieldDescriptor> = T::fields()
        .iter()
        .filter(|field| !(omit_key && field.primary_key))
        .collect();
    let columns = fields
        .iter()
        .map(|field| quote_identifier(field.column_name()))
        .collect::<Result<Vec<_>>>()?;

    let mut builder = QueryBuilder::new(format!(
        "INSERT INTO {} ({}) VALUES (",
        quote_identifier(T::resource_name())?,
        columns.join(", ")
    ));
    for (index, field) in fields.iter().enumerate() {
        if index > 0 {
            builder.push(", ");
        }
        push_value(
            &mut builder,
            record.field_value(field.name).unwrap_or(FieldValue::Null),
        );
    }
    builder.push(")");
    Ok(builder)
}

/// `UPDATE t SET c = ?, ... WHERE key = ?`
pub fn update_query<T: Record>(
    record: &T,
    columns: &[&'static str],
) -> Result<QueryBuilder<'static, MySql>> {
    let key = T::primary_key_field()
        .ok_or_else(|| anyhow!("{} has no primary key", T::resource_name()))?;
    let key_value = record
        .primary_key_value()
        .ok_or_else(|| anyhow!("{} primary key is unreadable", T::resource_name()))?;

    let mut builder = QueryBuilder::new(format!(
        "UPDATE {} SET ",
        quote_identifier(T::resource_name())?
    ));
    for (index, column) in columns.iter().enumerate() {
        if index > 0 {
            builder.push(", ");
        }
        builder.push(format!("{} = ", quote_identifier(column)?));
        push_value(
            &mut builder,
            record.column_value(column).unwrap_or(FieldValue::Null),
        );
    }
    builder.push(format!(" WHERE {} = ", quote_identifier(key.column_name())?));
    push_value(&mut builder, key_value);
    Ok(builder)
}

/// `DELETE FROM t WHERE key = ?`
pub fn delete_query<T: Record>(key: &RecordKey) -> Result<QueryBuilder<'static, MySql>> {
    let key_field = T::primary_key_field()
        .ok_or_else(|| anyhow!("{} has no primary key", T::resource_name()))?;

    let mut builder = QueryBuilder::new(format!(
        "DELETE FROM {} WHERE {} = ",
        quote_identifier(T::resource_name())?,
        quote_identifier(key_field.column_name())?
    ));
    match key {
        RecordKey::Numeric(id) => builder.push_bind(*id),
        RecordKey::Text(id) => builder.push_bind(id.clone()),
    };
    Ok(builder)
}

/// Decode one column into a field value according to the field kind
fn decode_column(row: &MySqlRow, index: usize, field: &FieldDescriptor) -> Result<FieldValue> {
    let value = match field.kind {
        FieldKind::String => row
            .try_get::<Option<String>, _>(index)?
            .map(FieldValue::String),
        FieldKind::Integer => match row.try_get::<Option<i64>, _>(index) {
            Ok(value) => value.map(FieldValue::Integer),
            Err(_) => row
                .try_get::<Option<u64>, _>(index)?
                .map(|v| FieldValue::Integer(i64::try_from(v).unwrap_or(i64::MAX))),
        },
        FieldKind::Float => match row.try_get::<Option<f64>, _>(index) {
            Ok(value) => value.map(FieldValue::Float),
            Err(_) => row
                .try_get::<Option<f32>, _>(index)?
                .map(|v| FieldValue::Float(f64::from(v))),
        },
        FieldKind::Boolean => row
            .try_get::<Option<bool>, _>(index)?
            .map(FieldValue::Boolean),
        FieldKind::Uuid => row
            .try_get::<Option<String>, _>(index)?
            .map(|raw| uuid::Uuid::parse_str(&raw).map(FieldValue::Uuid))
            .transpose()?,
        FieldKind::DateTime => row
            .try_get::<Option<DateTime<Utc>>, _>(index)?
            .map(FieldValue::DateTime),
    };
    Ok(value.unwrap_or(FieldValue::Null))
}

/// Rebuild a record from a row selected by [`fetch_query`]
fn reconstruct_record<T: Record + DeserializeOwned>(row: &MySqlRow) -> Result<T> {
    let mut object = serde_json::Map::new();
    for (index, field) in T::fields().iter().enumerate() {
        let value = decode_column(row, index, field)
            .map_err(|e| anyhow!("Failed to decode column '{}': {}", field.column_name(), e))?;
        object.insert(field.name.to_string(), serde_json::to_value(value)?);
    }

    serde_json::from_value(serde_json::Value::Object(object))
        .map_err(|e| anyhow!("Failed to deserialize {} from row: {}", T::resource_name(), e))
}

/// Store backed by one MySQL table per record type.
///
/// # Example
///
/// ```rust,ignore
/// let pool = DatabaseConfig::from_env()?.connect().await?;
/// let store = MysqlStore::<Member>::new(pool);
/// let service = CrudService::new(store, Arc::new(SchemaRegistry::new()));
/// ```
#[derive(Clone, Debug)]
pub struct MysqlStore<T> {
    pool: MySqlPool,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T> MysqlStore<T> {
    pub fn new(pool: MySqlPool) -> Self {
        Self {
            pool,
            _marker: std::marker::PhantomData,
        }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

#[async_trait]
impl<T: Record + DeserializeOwned> Store<T> for MysqlStore<T> {
    async fn count(&self, filter: &QueryFilter) -> Result<u64> {
        let mut builder = count_query::<T>(filter)?;
        let total: i64 = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| anyhow!("Failed to count {}: {}", T::resource_name(), e))?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn fetch(
        &self,
        filter: &QueryFilter,
        orders: &[OrderSpec],
        limit: u64,
        offset: u64,
    ) -> Result<Vec<T>> {
        let mut builder = fetch_query::<T>(filter, orders, limit, offset)?;
        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| anyhow!("Failed to list {}: {}", T::resource_name(), e))?;

        rows.iter().map(reconstruct_record::<T>).collect()
    }

    async fn insert(&self, mut record: T) -> Result<T> {
        if record.has_zero_key() {
            match T::primary_key_field().map(|key| key.kind) {
                Some(FieldKind::Integer) => {}
                Some(FieldKind::Uuid) => {
                    record.assign_generated_key(0);
                }
                _ => {
                    return Err(anyhow!(
                        "{}: primary key cannot be generated, supply one",
                        T::resource_name()
                    ));
                }
            }
        }

        let mut builder = insert_query(&record)?;
        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| anyhow!("Failed to create {}: {}", T::resource_name(), e))?;

        if record.has_zero_key() && !record.assign_generated_key(result.last_insert_id()) {
            return Err(anyhow!(
                "{}: store did not assign a primary key",
                T::resource_name()
            ));
        }
        Ok(record)
    }

    async fn update_columns(&self, record: &T, columns: &[&'static str]) -> Result<u64> {
        if columns.is_empty() {
            return Ok(0);
        }

        let mut builder = update_query(record, columns)?;
        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| anyhow!("Failed to update {}: {}", T::resource_name(), e))?;
        Ok(result.rows_affected())
    }

    async fn delete_by_key(&self, key: &RecordKey) -> Result<u64> {
        let mut builder = delete_query::<T>(key)?;
        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| anyhow!("Failed to delete {}: {}", T::resource_name(), e))?;
        Ok(result.rows_affected())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
