//! Core module containing the engine's traits, types and algorithms

pub mod error;
pub mod field;
pub mod filter;
pub mod order;
pub mod predicate;
pub mod query;
pub mod record;
pub mod schema;
pub mod service;
pub mod store;
pub mod upsert;

pub use error::{CrudError, StoreOperation};
pub use field::{FieldDescriptor, FieldKind, FieldType, FieldValue};
pub use filter::{FilterClause, FilterMap, FilterOp, parse_filter_key, parse_filters};
pub use order::{OrderSpec, resolve_order};
pub use predicate::{Comparison, Predicate, QueryFilter, build_predicate};
pub use query::{ListQuery, PageRequest, PageResult};
pub use record::Record;
pub use schema::{ColumnAllowlist, SchemaRegistry, TableSchema};
pub use service::{CrudOperations, CrudService};
pub use store::{RecordKey, Store};
pub use upsert::{UpsertPlan, plan_upsert};
