//! Diff-based upsert planning
//!
//! A record whose primary key is still at its zero value is new and gets
//! inserted whole. Any other record is an update of exactly the writable
//! fields that carry a non-zero value, plus the auto-managed fields.
//!
//! Zero values double as "not supplied": an update can never set a field
//! back to `0`, `""`, `false` or null through this path.

use crate::core::error::CrudError;
use crate::core::field::FieldDescriptor;
use crate::core::record::Record;
use crate::core::schema::TableSchema;

/// What a save call must do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertPlan {
    /// Insert the full record
    Create,
    /// Update these columns by primary key
    Update { columns: Vec<&'static str> },
    /// Nothing to write
    Unchanged,
}

/// Decide between create and update, and compute the update column set
///
/// `schema` must be the introspected schema of `T`.
pub fn plan_upsert<T: Record>(record: &T, schema: &TableSchema) -> Result<UpsertPlan, CrudError> {
    if schema.primary_key().is_none() {
        return Err(CrudError::invalid_input(format!(
            "{} has no primary key",
            schema.table()
        )));
    }

    if record.has_zero_key() {
        return Ok(UpsertPlan::Create);
    }

    let auto_managed: Vec<&'static str> = schema.auto_managed_columns().collect();
    let columns: Vec<&'static str> = schema
        .fields()
        .iter()
        .filter(|field| !field.primary_key && field.writable)
        .map(FieldDescriptor::column_name)
        .filter(|column| {
            auto_managed.contains(column)
                || record
                    .column_value(column)
                    .is_some_and(|value| !value.is_zero())
        })
        .collect();

    if columns.is_empty() {
        Ok(UpsertPlan::Unchanged)
    } else {
        Ok(UpsertPlan::Update { columns })
    }
}
