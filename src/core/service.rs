//! Service trait and the generic engine implementing it

use async_trait::async_trait;
use chrono::Utc;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

use crate::config::EngineConfig;
use crate::core::error::{CrudError, StoreOperation};
use crate::core::filter::{FilterMap, parse_filters};
use crate::core::order::{OrderSpec, resolve_order};
use crate::core::predicate::build_predicate;
use crate::core::query::{ListQuery, PageRequest, PageResult};
use crate::core::record::Record;
use crate::core::schema::{SchemaRegistry, TableSchema};
use crate::core::store::{RecordKey, Store};
use crate::core::upsert::{UpsertPlan, plan_upsert};

/// Upsert, delete and list operations over one record type
///
/// Transports depend on this trait only, so they can be driven by any
/// implementation (including test doubles).
#[async_trait]
pub trait CrudOperations<T: Record>: Send + Sync {
    /// Create the record when its primary key is zero, otherwise update its
    /// non-zero and auto-managed fields. Returns the record as stored.
    async fn save_or_update(&self, record: T) -> Result<T, CrudError>;

    /// Delete the record whose primary key equals `id`
    async fn delete_by_id(&self, id: &str) -> Result<(), CrudError>;

    /// Filter, order and paginate
    async fn paginate(
        &self,
        page: i64,
        size: i64,
        filters: &FilterMap,
        orders: &[String],
    ) -> Result<PageResult<T>, CrudError>;

    /// Run a decoded list request
    async fn list(&self, query: &ListQuery) -> Result<PageResult<T>, CrudError> {
        self.paginate(query.page, query.size, &query.filters, &query.orders)
            .await
    }
}

/// The engine: generic over the record type and its store
///
/// Holds no per-call state; share one instance (by `Arc`) across tasks.
pub struct CrudService<T, S> {
    store: Arc<S>,
    schemas: Arc<SchemaRegistry>,
    schema: OnceLock<Arc<TableSchema>>,
    config: EngineConfig,
    _record: PhantomData<fn() -> T>,
}

impl<T, S> CrudService<T, S>
where
    T: Record,
    S: Store<T>,
{
    pub fn new(store: S, schemas: Arc<SchemaRegistry>) -> Self {
        Self::from_shared(Arc::new(store), schemas)
    }

    /// Build a service over a store that is shared elsewhere
    pub fn from_shared(store: Arc<S>, schemas: Arc<SchemaRegistry>) -> Self {
        Self {
            store,
            schemas,
            schema: OnceLock::new(),
            config: EngineConfig::default(),
            _record: PhantomData,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Schema of `T`, looked up in the registry once per service
    fn schema(&self) -> Arc<TableSchema> {
        Arc::clone(self.schema.get_or_init(|| self.schemas.schema_for::<T>()))
    }

    /// Ordering used when no valid directive was supplied
    ///
    /// A configured column is followed by the primary key so that pages
    /// stay deterministic when the configured column has ties.
    fn fallback_order(&self, schema: &TableSchema) -> Vec<OrderSpec> {
        let configured = self
            .config
            .fallback_order_column
            .as_deref()
            .filter(|column| schema.allowlist().contains(column));
        let key: Option<&str> = schema.primary_key_column();

        configured
            .into_iter()
            .chain(key.filter(|key| Some(*key) != configured))
            .map(OrderSpec::asc)
            .collect()
    }
}

#[async_trait]
impl<T, S> CrudOperations<T> for CrudService<T, S>
where
    T: Record,
    S: Store<T>,
{
    async fn save_or_update(&self, mut record: T) -> Result<T, CrudError> {
        let plan = plan_upsert(&record, &self.schema())?;
        let resource = T::resource_name();

        match plan {
            UpsertPlan::Create => {
                record.touch(Utc::now());
                let created = self
                    .store
                    .insert(record)
                    .await
                    .map_err(|e| CrudError::store(StoreOperation::Insert, e))?;
                tracing::info!(
                    resource,
                    id = ?created.primary_key_value(),
                    "record created"
                );
                Ok(created)
            }
            UpsertPlan::Update { columns } => {
                record.touch(Utc::now());
                let affected = self
                    .store
                    .update_columns(&record, &columns)
                    .await
                    .map_err(|e| CrudError::store(StoreOperation::Update, e))?;
                tracing::debug!(
                    resource,
                    id = ?record.primary_key_value(),
                    ?columns,
                    affected,
                    "record updated"
                );
                Ok(record)
            }
            UpsertPlan::Unchanged => {
                tracing::debug!(
                    resource,
                    id = ?record.primary_key_value(),
                    "nothing to update"
                );
                Ok(record)
            }
        }
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), CrudError> {
        if id.trim().is_empty() {
            return Err(CrudError::invalid_input("id is required"));
        }

        let key = RecordKey::parse(id);
        let affected = self
            .store
            .delete_by_key(&key)
            .await
            .map_err(|e| CrudError::store(StoreOperation::Delete, e))?;

        if affected == 0 {
            return Err(CrudError::not_found(T::resource_name(), key.to_string()));
        }

        tracing::info!(resource = T::resource_name(), id = %key, affected, "record deleted");
        Ok(())
    }

    async fn paginate(
        &self,
        page: i64,
        size: i64,
        filters: &FilterMap,
        orders: &[String],
    ) -> Result<PageResult<T>, CrudError> {
        let request = PageRequest::from_config(page, size, &self.config);
        let schema = self.schema();

        let filter = build_predicate(&parse_filters(filters), schema.allowlist());

        let total = self
            .store
            .count(&filter)
            .await
            .map_err(|e| CrudError::store(StoreOperation::Count, e))?;

        let mut resolved = resolve_order(orders, schema.allowlist());
        if resolved.is_empty() {
            resolved = self.fallback_order(&schema);
        }

        let items = self
            .store
            .fetch(&filter, &resolved, request.size(), request.offset())
            .await
            .map_err(|e| CrudError::store(StoreOperation::Fetch, e))?;

        tracing::debug!(
            resource = T::resource_name(),
            predicates = filter.len(),
            page = request.page(),
            size = request.size(),
            total,
            "page fetched"
        );

        Ok(PageResult::new(items, total, request))
    }
}
