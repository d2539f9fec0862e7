//! CRUD API Example
//!
//! Two record types served from in-memory stores:
//! - `customers` keyed by a store-assigned integer
//! - `coupons` keyed by a generated UUID
//!
//! ```sh
//! cargo run --example crud_api
//! curl -X POST localhost:3000/customers -H 'content-type: application/json' \
//!      -d '{"name": "joe", "age": 30}'
//! curl 'localhost:3000/customers?age__gte=18&name__like=jo&order=-created_at&page=1&size=5'
//! curl -X DELETE 'localhost:3000/customers?id=1'
//! ```

use anyhow::Result;
use this_crud::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Customer {
    pub id: u64,
    pub name: String,
    pub email: Option<String>,
    pub age: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl_record!(Customer, "customers", {
    id: u64 [key],
    name: String,
    email: Option<String>,
    age: i64,
    created_at: Option<DateTime<Utc>> [readonly],
    updated_at: Option<DateTime<Utc>> [auto],
});

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    pub percent_off: f64,
    pub active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl_record!(Coupon, "coupons", {
    id: Uuid [key],
    code: String,
    percent_off: f64 as "discount",
    active: bool,
    created_at: Option<DateTime<Utc>> [readonly],
});

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,this_crud=debug")),
        )
        .init();

    let config_path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/crud_api/config.yaml");
    let config = EngineConfig::from_yaml_file(config_path)?;
    let schemas = Arc::new(SchemaRegistry::new());

    let customers = InMemoryStore::<Customer>::new();
    let now = Utc::now();
    for (name, age) in [("joe", 31), ("jolene", 17), ("bob", 45)] {
        customers
            .insert(Customer {
                name: name.to_string(),
                age,
                created_at: Some(now),
                ..Default::default()
            })
            .await?;
    }

    let customer_service =
        CrudService::new(customers, schemas.clone()).with_config(config.clone());
    let coupon_service =
        CrudService::new(InMemoryStore::<Coupon>::new(), schemas).with_config(config);

    let app = Router::new()
        .nest("/customers", rest::router::<Customer>(Arc::new(customer_service)))
        .nest("/coupons", rest::router::<Coupon>(Arc::new(coupon_service)));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
    tracing::info!(addr = %listener.local_addr()?, "crud_api listening");
    println!("  GET    /customers   /coupons   filtered, ordered, paginated list");
    println!("  POST   /customers   /coupons   save or update");
    println!("  DELETE /customers?id=  /coupons?id=");

    axum::serve(listener, app).await?;
    Ok(())
}
