//! Macro-generated test suite for `Store<Member>` contract validation.
//!
//! The `store_contract_tests!` macro generates a test module that validates
//! any `Store<Member>` implementation: key assignment, predicate semantics
//! for every predicate shape, ordering, windows, column-restricted updates,
//! deletes and concurrent inserts.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//!
//! use storage_harness::*;
//! use this_crud::storage::InMemoryStore;
//!
//! store_contract_tests!(InMemoryStore::<Member>::new());
//! ```

/// Generate a full `Store<Member>` conformance test suite.
///
/// `$factory` must evaluate to an empty store implementing `Store<Member>`.
/// It is re-evaluated for each test to ensure isolation.
#[macro_export]
macro_rules! store_contract_tests {
    ($factory:expr) => {
        mod store_contract_tests {
            use super::*;
            use std::sync::Arc;
            use this_crud::core::order::OrderSpec;
            use this_crud::core::predicate::{Comparison, Predicate, QueryFilter};
            use this_crud::core::record::Record;
            use this_crud::core::store::{RecordKey, Store};

            fn compare(column: &str, op: Comparison, value: &str) -> Predicate {
                Predicate::Compare {
                    column: column.into(),
                    op,
                    value: value.into(),
                }
            }

            async fn seed<S: Store<Member>>(store: &S) -> Vec<Member> {
                let mut stored = Vec::new();
                for (n, (name, age, email)) in [
                    ("alice", 31, Some("alice@example.com")),
                    ("bob", 17, None),
                    ("carol", 45, Some("carol@example.com")),
                    ("dave", 31, None),
                ]
                .into_iter()
                .enumerate()
                {
                    let member = Member {
                        email: email.map(str::to_string),
                        score: n as f64 + 0.5,
                        active: n % 2 == 0,
                        created_at: minutes_after_base(n as i64),
                        ..new_member(name, age, 1)
                    };
                    stored.push(store.insert(member).await.unwrap());
                }
                stored
            }

            // ==============================================================
            // Insert
            // ==============================================================

            #[tokio::test]
            async fn test_insert_assigns_increasing_keys() {
                let store = $factory;
                let first = store.insert(new_member("a", 20, 1)).await.unwrap();
                let second = store.insert(new_member("b", 20, 1)).await.unwrap();

                assert!(first.id > 0);
                assert!(second.id > first.id);
                assert_eq!(second.name, "b");
            }

            #[tokio::test]
            async fn test_empty_store() {
                let store = $factory;
                let filter = QueryFilter::default();
                assert_eq!(store.count(&filter).await.unwrap(), 0);
                assert!(store
                    .fetch(&filter, &[OrderSpec::asc("id")], 10, 0)
                    .await
                    .unwrap()
                    .is_empty());
            }

            // ==============================================================
            // Predicates
            // ==============================================================

            #[tokio::test]
            async fn test_compare_predicates() {
                let store = $factory;
                seed(&store).await;

                let adults = QueryFilter::default().and(compare("age", Comparison::Gte, "18"));
                assert_eq!(store.count(&adults).await.unwrap(), 3);

                let exactly = QueryFilter::default().and(compare("age", Comparison::Eq, "31"));
                assert_eq!(store.count(&exactly).await.unwrap(), 2);

                let range = QueryFilter::default()
                    .and(compare("age", Comparison::Gt, "17"))
                    .and(compare("age", Comparison::Lt, "45"));
                assert_eq!(store.count(&range).await.unwrap(), 2);

                let not_bob = QueryFilter::default().and(compare("name", Comparison::Ne, "bob"));
                assert_eq!(store.count(&not_bob).await.unwrap(), 3);
            }

            #[tokio::test]
            async fn test_like_predicate() {
                let store = $factory;
                seed(&store).await;

                let like = QueryFilter::default().and(Predicate::Like {
                    column: "email".into(),
                    pattern: "%@example.com".into(),
                });
                assert_eq!(store.count(&like).await.unwrap(), 2);

                let single = QueryFilter::default().and(Predicate::Like {
                    column: "name".into(),
                    pattern: "_ob".into(),
                });
                assert_eq!(store.count(&single).await.unwrap(), 1);
            }

            #[tokio::test]
            async fn test_in_and_not_in_predicates() {
                let store = $factory;
                seed(&store).await;

                let within = QueryFilter::default().and(Predicate::In {
                    column: "name".into(),
                    values: vec!["alice".into(), "dave".into(), "zed".into()],
                });
                assert_eq!(store.count(&within).await.unwrap(), 2);

                let outside = QueryFilter::default().and(Predicate::NotIn {
                    column: "age".into(),
                    values: vec!["31".into()],
                });
                assert_eq!(store.count(&outside).await.unwrap(), 2);
            }

            #[tokio::test]
            async fn test_not_equal_and_single_not_in_agree() {
                let store = $factory;
                seed(&store).await;

                for (column, operand) in [
                    ("age", "31"),
                    ("age", "abc"),
                    ("email", "alice@example.com"),
                    ("name", "zed"),
                ] {
                    let ne = QueryFilter::default().and(compare(column, Comparison::Ne, operand));
                    let nin = QueryFilter::default().and(Predicate::NotIn {
                        column: column.into(),
                        values: vec![operand.into()],
                    });
                    assert_eq!(
                        store.count(&ne).await.unwrap(),
                        store.count(&nin).await.unwrap(),
                        "{} <> {} disagrees with NOT IN",
                        column,
                        operand
                    );
                }

                let nin = QueryFilter::default().and(Predicate::NotIn {
                    column: "age".into(),
                    values: vec!["31".into()],
                });
                assert_eq!(store.count(&nin).await.unwrap(), 2);
            }

            #[tokio::test]
            async fn test_null_predicates() {
                let store = $factory;
                seed(&store).await;

                let missing = QueryFilter::default().and(Predicate::IsNull {
                    column: "email".into(),
                });
                assert_eq!(store.count(&missing).await.unwrap(), 2);

                let present = QueryFilter::default().and(Predicate::IsNotNull {
                    column: "email".into(),
                });
                assert_eq!(store.count(&present).await.unwrap(), 2);

                // NULL never satisfies a comparison
                let ne = QueryFilter::default().and(compare(
                    "email",
                    Comparison::Ne,
                    "alice@example.com",
                ));
                assert_eq!(store.count(&ne).await.unwrap(), 1);
            }

            #[tokio::test]
            async fn test_boolean_and_float_predicates() {
                let store = $factory;
                seed(&store).await;

                let active = QueryFilter::default().and(compare("active", Comparison::Eq, "1"));
                assert_eq!(store.count(&active).await.unwrap(), 2);

                let scored = QueryFilter::default().and(compare("score", Comparison::Gt, "1.5"));
                assert_eq!(store.count(&scored).await.unwrap(), 2);
            }

            #[tokio::test]
            async fn test_datetime_predicate() {
                let store = $factory;
                seed(&store).await;

                let recent = QueryFilter::default().and(compare(
                    "created_at",
                    Comparison::Gte,
                    "2024-01-01 00:02:00",
                ));
                assert_eq!(store.count(&recent).await.unwrap(), 2);
            }

            // ==============================================================
            // Ordering and windows
            // ==============================================================

            #[tokio::test]
            async fn test_fetch_orders_by_multiple_columns() {
                let store = $factory;
                seed(&store).await;

                let rows = store
                    .fetch(
                        &QueryFilter::default(),
                        &[OrderSpec::desc("age"), OrderSpec::asc("name")],
                        10,
                        0,
                    )
                    .await
                    .unwrap();
                assert_eq!(names(&rows), vec!["carol", "alice", "dave", "bob"]);
            }

            #[tokio::test]
            async fn test_fetch_window() {
                let store = $factory;
                seed(&store).await;
                let filter = QueryFilter::default();
                let order = [OrderSpec::asc("created_at")];

                let page = store.fetch(&filter, &order, 2, 1).await.unwrap();
                assert_eq!(names(&page), vec!["bob", "carol"]);

                let past_end = store.fetch(&filter, &order, 2, 10).await.unwrap();
                assert!(past_end.is_empty());

                // the window never changes the count
                assert_eq!(store.count(&filter).await.unwrap(), 4);
            }

            #[tokio::test]
            async fn test_fetch_round_trips_fields() {
                let store = $factory;
                let stored = seed(&store).await;

                let rows = store
                    .fetch(
                        &QueryFilter::default().and(compare("name", Comparison::Eq, "carol")),
                        &[OrderSpec::asc("id")],
                        1,
                        0,
                    )
                    .await
                    .unwrap();
                assert_eq!(rows, vec![stored[2].clone()]);
                assert_field_value_integer(&rows[0].field_value("age").unwrap(), 45);
            }

            // ==============================================================
            // Updates and deletes
            // ==============================================================

            #[tokio::test]
            async fn test_update_columns_writes_only_listed_columns() {
                let store = $factory;
                let stored = seed(&store).await;

                let patch = Member {
                    id: stored[0].id,
                    name: "alicia".into(),
                    age: 99,
                    ..Member::default()
                };
                let affected = store.update_columns(&patch, &["name"]).await.unwrap();
                assert_eq!(affected, 1);

                let rows = store
                    .fetch(
                        &QueryFilter::default()
                            .and(compare("id", Comparison::Eq, &stored[0].id.to_string())),
                        &[],
                        1,
                        0,
                    )
                    .await
                    .unwrap();
                assert_eq!(rows[0].name, "alicia");
                assert_eq!(rows[0].age, 31);
                assert_eq!(rows[0].email.as_deref(), Some("alice@example.com"));
            }

            #[tokio::test]
            async fn test_update_unknown_key_affects_nothing() {
                let store = $factory;
                seed(&store).await;

                let patch = Member {
                    id: 999_999,
                    name: "ghost".into(),
                    ..Member::default()
                };
                assert_eq!(store.update_columns(&patch, &["name"]).await.unwrap(), 0);
            }

            #[tokio::test]
            async fn test_delete_by_key() {
                let store = $factory;
                let stored = seed(&store).await;
                let key = RecordKey::Numeric(stored[1].id);

                assert_eq!(store.delete_by_key(&key).await.unwrap(), 1);
                assert_eq!(store.delete_by_key(&key).await.unwrap(), 0);
                assert_eq!(store.count(&QueryFilter::default()).await.unwrap(), 3);
            }

            // ==============================================================
            // Concurrency
            // ==============================================================

            #[tokio::test]
            async fn test_concurrent_inserts() {
                let store = Arc::new($factory);
                let mut handles = Vec::new();
                for n in 0..10 {
                    let store = Arc::clone(&store);
                    handles.push(tokio::spawn(async move {
                        store
                            .insert(new_member(&format!("worker {}", n), 30, 1))
                            .await
                            .unwrap()
                    }));
                }

                let mut ids = Vec::new();
                for handle in handles {
                    ids.push(handle.await.unwrap().id);
                }
                ids.sort_unstable();
                ids.dedup();
                assert_eq!(ids.len(), 10);
                assert_eq!(store.count(&QueryFilter::default()).await.unwrap(), 10);
            }
        }
    };
}
