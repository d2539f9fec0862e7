//! Schema introspection and the per-type column allowlist cache

use regex::Regex;
use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::core::field::FieldDescriptor;
use crate::core::record::Record;

/// Check that a name is a plain identifier (`^[A-Za-z0-9_]+$`)
///
/// Only names passing this check may ever appear in a filter or order
/// clause, whatever their origin.
pub fn is_safe_identifier(name: &str) -> bool {
    static COLUMN_NAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = COLUMN_NAME_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_]+$").expect("column name pattern is valid")
    });
    regex.is_match(name)
}

/// The set of column names user input may reference
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnAllowlist {
    columns: HashSet<String>,
}

impl ColumnAllowlist {
    /// Build an allowlist from candidate names, discarding unsafe ones
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = names
            .into_iter()
            .map(Into::into)
            .filter(|name| is_safe_identifier(name))
            .collect();

        Self { columns }
    }

    /// Allowlist derived from field descriptors (column name, else field name)
    pub fn from_fields(fields: &[FieldDescriptor]) -> Self {
        Self::new(fields.iter().map(|field| field.column_name()))
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Introspected schema of one record type
#[derive(Debug, Clone)]
pub struct TableSchema {
    table: &'static str,
    fields: &'static [FieldDescriptor],
    allowlist: ColumnAllowlist,
}

impl TableSchema {
    /// Introspect a record type
    ///
    /// A type without descriptors yields an empty allowlist: listing still
    /// works, but nothing can be filtered or ordered.
    pub fn of<T: Record>() -> Self {
        let fields = T::fields();
        Self {
            table: T::resource_name(),
            fields,
            allowlist: ColumnAllowlist::from_fields(fields),
        }
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn fields(&self) -> &'static [FieldDescriptor] {
        self.fields
    }

    pub fn allowlist(&self) -> &ColumnAllowlist {
        &self.allowlist
    }

    /// The primary-key descriptor
    pub fn primary_key(&self) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|field| field.primary_key)
    }

    /// The primary-key column, only when it is allowlisted
    pub fn primary_key_column(&self) -> Option<&'static str> {
        self.primary_key()
            .map(FieldDescriptor::column_name)
            .filter(|column| self.allowlist.contains(column))
    }

    /// Columns flagged as auto-managed
    pub fn auto_managed_columns(&self) -> impl Iterator<Item = &'static str> {
        self.fields
            .iter()
            .filter(|field| field.auto_managed)
            .map(FieldDescriptor::column_name)
    }
}

/// Registry caching the introspected schema of each record type
///
/// Create one at startup and share it (by `Arc`) with every service. Each
/// schema is derived once, on first use, and is read-only afterwards. Two
/// tasks racing on the first lookup may both derive it; the results are
/// identical and the first insert wins.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<TypeId, Arc<TableSchema>>>,
}

impl SchemaRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Get (deriving on first use) the schema of a record type
    pub fn schema_for<T: Record>(&self) -> Arc<TableSchema> {
        let type_id = TypeId::of::<T>();

        if let Some(schema) = self
            .schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
        {
            return Arc::clone(schema);
        }

        let derived = Arc::new(TableSchema::of::<T>());
        tracing::debug!(
            table = derived.table(),
            columns = derived.allowlist().len(),
            "derived column allowlist"
        );

        let mut schemas = self
            .schemas
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(schemas.entry(type_id).or_insert(derived))
    }

    /// The column allowlist of a record type
    pub fn allowed_columns<T: Record>(&self) -> ColumnAllowlist {
        self.schema_for::<T>().allowlist().clone()
    }

    /// Number of record types introspected so far
    pub fn len(&self) -> usize {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
