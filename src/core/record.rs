//! Record trait defining the capability every managed type must provide

use chrono::{DateTime, Utc};

use crate::core::field::{FieldDescriptor, FieldValue};

/// Base trait for all records managed by the engine.
///
/// A record is any application type with exactly one primary-key field.
/// The engine never reflects on the type at runtime; instead the type
/// publishes a static table of [`FieldDescriptor`]s and gives read access
/// to each field by name. Use [`impl_record!`](crate::impl_record) rather
/// than implementing this by hand.
pub trait Record: Clone + Send + Sync + 'static {
    /// The table (resource) name used by stores
    fn resource_name() -> &'static str;

    /// Descriptors for every addressable field
    fn fields() -> &'static [FieldDescriptor];

    /// Read a field by its Rust field name
    fn field_value(&self, field: &str) -> Option<FieldValue>;

    /// Store a generated primary key
    ///
    /// Returns `false` when the key type cannot be generated from a
    /// sequence number (e.g. free-form strings).
    fn assign_generated_key(&mut self, sequence: u64) -> bool;

    /// Refresh auto-managed fields (update timestamps) before a write
    fn touch(&mut self, _now: DateTime<Utc>) {}

    // === Utility Methods ===

    /// The primary-key descriptor, if the type declares one
    fn primary_key_field() -> Option<&'static FieldDescriptor> {
        Self::fields().iter().find(|field| field.primary_key)
    }

    /// Current value of the primary key
    fn primary_key_value(&self) -> Option<FieldValue> {
        Self::primary_key_field().and_then(|field| self.field_value(field.name))
    }

    /// Whether the primary key is still at its zero value
    fn has_zero_key(&self) -> bool {
        self.primary_key_value()
            .is_none_or(|value| value.is_zero())
    }

    /// Read a field by its store-facing column name
    fn column_value(&self, column: &str) -> Option<FieldValue> {
        Self::fields()
            .iter()
            .find(|field| field.column_name() == column)
            .and_then(|field| self.field_value(field.name))
    }
}
