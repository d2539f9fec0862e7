//! REST exposure of a [`CrudOperations`] service
//!
//! One router per record type, usually nested under the resource path:
//! - `POST /` save or update (JSON body, `null` is rejected)
//! - `GET /` filtered, ordered, paginated list (query string)
//! - `DELETE /?id=` delete by primary key

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{Json, Router, routing::get};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::core::error::CrudError;
use crate::core::query::ListQuery;
use crate::core::record::Record;
use crate::core::service::CrudOperations;
use crate::server::response::{ApiResponse, DeleteResponse, ListResponse};

/// Service handle shared with the handlers
pub type SharedService<T> = Arc<dyn CrudOperations<T>>;

/// Query string of a delete call
#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    pub id: Option<String>,
}

/// Build the router for one record type
///
/// # Example
/// ```rust,ignore
/// let members = CrudService::new(InMemoryStore::<Member>::new(), schemas);
/// let app = Router::new().nest("/members", rest::router::<Member>(Arc::new(members)));
/// ```
pub fn router<T>(service: SharedService<T>) -> Router
where
    T: Record + Serialize + DeserializeOwned,
{
    Router::new()
        .route(
            "/",
            get(list_records::<T>)
                .post(save_record::<T>)
                .delete(delete_record::<T>),
        )
        .layer(middleware::from_fn(log_failures))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// `POST /`
pub async fn save_record<T>(
    State(service): State<SharedService<T>>,
    body: Result<Json<Option<T>>, JsonRejection>,
) -> Result<ApiResponse<T>, CrudError>
where
    T: Record + Serialize + DeserializeOwned,
{
    let Json(record) = body.map_err(|rejection| CrudError::invalid_input(rejection.body_text()))?;
    let record = record.ok_or_else(|| CrudError::invalid_input("record is required"))?;

    let saved = service.save_or_update(record).await?;
    Ok(ApiResponse::ok(saved))
}

/// `GET /`
pub async fn list_records<T>(
    State(service): State<SharedService<T>>,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<ApiResponse<ListResponse<T>>, CrudError>
where
    T: Record + Serialize + DeserializeOwned,
{
    let Query(pairs) = pairs.map_err(|rejection| CrudError::invalid_input(rejection.body_text()))?;
    let query = ListQuery::from_pairs(pairs)?;

    let page = service.list(&query).await?;
    Ok(ApiResponse::ok(ListResponse {
        list: page.items,
        page: page.page,
        size: page.size,
        total: page.total,
    }))
}

/// `DELETE /?id=`
pub async fn delete_record<T>(
    State(service): State<SharedService<T>>,
    params: Result<Query<DeleteParams>, QueryRejection>,
) -> Result<ApiResponse<DeleteResponse>, CrudError>
where
    T: Record + Serialize + DeserializeOwned,
{
    let Query(params) = params.map_err(|rejection| CrudError::invalid_input(rejection.body_text()))?;
    let id = params.id.unwrap_or_default();

    service.delete_by_id(&id).await?;
    Ok(ApiResponse::ok(DeleteResponse {
        id: id.trim().to_string(),
    }))
}

/// Log every failed request with its method, path and status
async fn log_failures(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;
    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        tracing::error!(%method, %uri, status = status.as_u16(), "request failed");
    }
    response
}
