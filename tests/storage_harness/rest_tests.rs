//! REST integration test macro for store backends.
//!
//! The `rest_integration_tests!` macro generates HTTP-level tests that run a
//! `CrudService<Member, _>` through full REST round-trips:
//! query string / JSON → HTTP request → handler → service → store → envelope.

/// Generate a REST integration test suite for a store backend.
///
/// `$store_factory` must produce an empty `impl Store<Member> + 'static`.
///
/// # Generated Tests
///
/// - `test_rest_create`: POST with a zero id creates and returns the key
/// - `test_rest_update_writes_non_zero_fields`: POST with an id patches
/// - `test_rest_null_body_rejected`: POST `null` answers 400
/// - `test_rest_list`: GET with filters, order and page returns the window
/// - `test_rest_list_defaults`: GET without parameters uses page 1 size 10
/// - `test_rest_list_invalid_page`: GET `page=abc` answers 400
/// - `test_rest_delete`: DELETE `?id=` echoes the id, then 404
/// - `test_rest_delete_blank_id`: DELETE without id answers 400
#[macro_export]
macro_rules! rest_integration_tests {
    ($store_factory:expr) => {
        mod rest_integration_tests {
            use super::*;
            use axum::Router;
            use axum::http::StatusCode;
            use axum_test::TestServer;
            use serde_json::{Value, json};
            use std::sync::Arc;
            use this_crud::core::schema::SchemaRegistry;
            use this_crud::core::service::CrudService;
            use this_crud::server::rest;

            async fn make_server() -> TestServer {
                let store = $store_factory;
                let service = CrudService::new(store, Arc::new(SchemaRegistry::new()));
                let router = Router::new().nest("/members", rest::router::<Member>(Arc::new(service)));
                TestServer::try_new(router).unwrap()
            }

            async fn create(server: &TestServer, name: &str, age: i64, minute: i64) -> Value {
                let response = server
                    .post("/members")
                    .json(&json!({
                        "name": name,
                        "age": age,
                        "status": 1,
                        "created_at": minutes_after_base(minute),
                    }))
                    .await;
                response.assert_status_ok();
                let body: Value = response.json();
                body["data"].clone()
            }

            // ==============================================================
            // Save
            // ==============================================================

            #[tokio::test]
            async fn test_rest_create() {
                let server = make_server().await;

                let response = server
                    .post("/members")
                    .json(&json!({"name": "alice", "age": 30, "email": "alice@test.com"}))
                    .await;

                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["code"], 0);
                assert_eq!(body["message"], "OK");
                assert_eq!(body["data"]["name"], "alice");
                assert_eq!(body["data"]["email"], "alice@test.com");
                assert!(body["data"]["id"].as_u64().unwrap() > 0);
                assert!(body["data"]["updated_at"].is_string());
            }

            #[tokio::test]
            async fn test_rest_update_writes_non_zero_fields() {
                let server = make_server().await;
                let created = create(&server, "bob", 25, 1).await;
                let id = created["id"].as_u64().unwrap();

                let response = server
                    .post("/members")
                    .json(&json!({"id": id, "age": 26}))
                    .await;
                response.assert_status_ok();

                let listed: Value = server
                    .get("/members")
                    .add_query_param("id", id)
                    .await
                    .json();
                let row = &listed["data"]["list"][0];
                assert_eq!(row["name"], "bob");
                assert_eq!(row["age"], 26);
                assert_eq!(row["created_at"], created["created_at"]);
            }

            #[tokio::test]
            async fn test_rest_null_body_rejected() {
                let server = make_server().await;

                let response = server.post("/members").json(&Value::Null).await;

                response.assert_status(StatusCode::BAD_REQUEST);
                let body: Value = response.json();
                assert_eq!(body["code"], 400);
                assert_eq!(body["data"]["error"], "INVALID_INPUT");
            }

            // ==============================================================
            // List
            // ==============================================================

            #[tokio::test]
            async fn test_rest_list() {
                let server = make_server().await;
                for n in 1..=5 {
                    create(&server, &format!("joe {}", n), 20 + n, n).await;
                }
                create(&server, "joe minor", 15, 10).await;
                create(&server, "bob", 40, 11).await;

                let response = server
                    .get("/members")
                    .add_query_param("name__like", "joe")
                    .add_query_param("age__gte", "18")
                    .add_query_param("order", "-created_at")
                    .add_query_param("page", "2")
                    .add_query_param("size", "2")
                    .await;

                response.assert_status_ok();
                let body: Value = response.json();
                let data = &body["data"];
                assert_eq!(data["page"], 2);
                assert_eq!(data["size"], 2);
                assert_eq!(data["total"], 5);
                let listed: Vec<&str> = data["list"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|row| row["name"].as_str().unwrap())
                    .collect();
                assert_eq!(listed, vec!["joe 3", "joe 2"]);
            }

            #[tokio::test]
            async fn test_rest_list_in_filter_and_unknown_keys() {
                let server = make_server().await;
                create(&server, "ann", 20, 1).await;
                create(&server, "ben", 30, 2).await;
                create(&server, "cid", 40, 3).await;

                let response = server
                    .get("/members")
                    .add_query_param("age__in", "20,40")
                    .add_query_param("name;drop table members", "x")
                    .add_query_param("order", "name:desc")
                    .await;

                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["data"]["total"], 2);
                assert_eq!(body["data"]["list"][0]["name"], "cid");
                assert_eq!(body["data"]["list"][1]["name"], "ann");
            }

            #[tokio::test]
            async fn test_rest_list_defaults() {
                let server = make_server().await;
                create(&server, "only", 20, 1).await;

                let body: Value = server.get("/members").await.json();

                assert_eq!(body["code"], 0);
                assert_eq!(body["data"]["page"], 1);
                assert_eq!(body["data"]["size"], 10);
                assert_eq!(body["data"]["total"], 1);
            }

            #[tokio::test]
            async fn test_rest_list_invalid_page() {
                let server = make_server().await;

                let response = server.get("/members").add_query_param("page", "abc").await;

                response.assert_status(StatusCode::BAD_REQUEST);
                let body: Value = response.json();
                assert_eq!(body["code"], 400);
                assert_eq!(body["data"]["error"], "INVALID_INPUT");
            }

            // ==============================================================
            // Delete
            // ==============================================================

            #[tokio::test]
            async fn test_rest_delete() {
                let server = make_server().await;
                let created = create(&server, "gone", 20, 1).await;
                let id = created["id"].as_u64().unwrap().to_string();

                let response = server.delete("/members").add_query_param("id", &id).await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["data"]["id"], id);

                let again = server.delete("/members").add_query_param("id", &id).await;
                again.assert_status(StatusCode::NOT_FOUND);
                let body: Value = again.json();
                assert_eq!(body["code"], 404);
                assert_eq!(body["data"]["error"], "RECORD_NOT_FOUND");
            }

            #[tokio::test]
            async fn test_rest_delete_blank_id() {
                let server = make_server().await;

                let response = server.delete("/members").await;

                response.assert_status(StatusCode::BAD_REQUEST);
                let body: Value = response.json();
                assert_eq!(body["data"]["error"], "INVALID_INPUT");
            }
        }
    };
}
