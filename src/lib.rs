//! # This-CRUD
//!
//! A generic upsert, delete and filtered-pagination engine for any record
//! type with a primary key.
//!
//! ## Features
//!
//! - **Filter grammar**: `age__gte=18`, `status__in=1,2`, `name__like=jo`,
//!   `deleted_at__isnull=1` straight from a query string
//! - **Column allowlist**: only declared, identifier-safe columns can be
//!   filtered or ordered; everything else is dropped silently
//! - **Diff-based upsert**: zero primary key creates, otherwise only the
//!   non-zero and auto-managed fields are written
//! - **Pagination**: page/size clamping, one count plus one bounded fetch
//! - **Pluggable stores**: in-memory out of the box, MySQL behind the
//!   `mysql` feature
//! - **REST adapter**: an Axum router per record type
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use this_crud::prelude::*;
//!
//! #[derive(Debug, Clone, Default, Serialize, Deserialize)]
//! pub struct Member {
//!     pub id: u64,
//!     pub name: String,
//!     pub age: i64,
//!     pub updated_at: Option<DateTime<Utc>>,
//! }
//!
//! impl_record!(Member, "members", {
//!     id: u64 [key],
//!     name: String,
//!     age: i64,
//!     updated_at: Option<DateTime<Utc>> [auto],
//! });
//!
//! let schemas = Arc::new(SchemaRegistry::new());
//! let members = CrudService::new(InMemoryStore::<Member>::new(), schemas);
//!
//! let created = members.save_or_update(Member { name: "joe".into(), age: 30, ..Default::default() }).await?;
//!
//! let mut filters = FilterMap::new();
//! filters.insert("age__gte".into(), vec!["18".into()]);
//! let page = members.paginate(1, 10, &filters, &["-age".to_string()]).await?;
//!
//! let app = Router::new().nest("/members", rest::router::<Member>(Arc::new(members)));
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Traits ===
    pub use crate::core::{
        error::{CrudError, StoreOperation},
        field::{FieldDescriptor, FieldKind, FieldType, FieldValue},
        filter::{FilterMap, FilterOp},
        order::OrderSpec,
        predicate::{Predicate, QueryFilter},
        query::{ListQuery, PageRequest, PageResult},
        record::Record,
        schema::{ColumnAllowlist, SchemaRegistry},
        service::{CrudOperations, CrudService},
        store::{RecordKey, Store},
    };

    // === Macros ===
    pub use crate::impl_record;

    // === Storage ===
    pub use crate::storage::InMemoryStore;
    #[cfg(feature = "mysql")]
    pub use crate::storage::MysqlStore;

    // === Config ===
    pub use crate::config::EngineConfig;
    #[cfg(feature = "mysql")]
    pub use crate::config::DatabaseConfig;

    // === Server ===
    pub use crate::server::{ApiResponse, ListResponse, rest};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::Arc;
    pub use uuid::Uuid;

    // === Axum ===
    pub use axum::Router;
}
