//! Shared test harness for store and engine testing
//!
//! Provides `Member`, a record with fields covering every `FieldValue`
//! kind, a fixed clock for deterministic timestamps, and the contract test
//! macros every store backend runs.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod store_contract_tests;
#[macro_use]
pub mod rest_tests;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use this_crud::core::field::FieldValue;
use this_crud::core::filter::FilterMap;
use this_crud::impl_record;

// ---------------------------------------------------------------------------
// Member: covers every FieldValue kind
// ---------------------------------------------------------------------------

/// A test record with fields spanning all `FieldValue` kinds.
///
/// - `id`: u64 primary key (Integer, store-assigned)
/// - `name`, `email`: String / nullable String
/// - `age`, `status`: Integer
/// - `score`: Float
/// - `active`: Boolean
/// - `created_at`: DateTime, never written by updates
/// - `updated_at`: auto-managed DateTime
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Member {
    pub id: u64,
    pub name: String,
    pub email: Option<String>,
    pub age: i64,
    pub status: i64,
    pub score: f64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl_record!(Member, "members", {
    id: u64 [key],
    name: String,
    email: Option<String>,
    age: i64,
    status: i64,
    score: f64,
    active: bool,
    created_at: DateTime<Utc> [readonly],
    updated_at: Option<DateTime<Utc>> [auto],
});

/// DDL for stores backed by a SQL table
pub const MEMBERS_TABLE_DDL: &str = "CREATE TABLE IF NOT EXISTS members (
    id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
    name VARCHAR(255) NOT NULL DEFAULT '',
    email VARCHAR(255) NULL,
    age BIGINT NOT NULL DEFAULT 0,
    status BIGINT NOT NULL DEFAULT 0,
    score DOUBLE NOT NULL DEFAULT 0,
    active BOOLEAN NOT NULL DEFAULT FALSE,
    created_at DATETIME(6) NOT NULL,
    updated_at DATETIME(6) NULL
)";

/// Fixed reference instant; every test timestamp is derived from it
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// `base_time()` plus some minutes
pub fn minutes_after_base(minutes: i64) -> DateTime<Utc> {
    base_time() + Duration::minutes(minutes)
}

/// A new (zero-key) member
pub fn new_member(name: &str, age: i64, status: i64) -> Member {
    Member {
        id: 0,
        name: name.to_string(),
        email: None,
        age,
        status,
        score: 0.0,
        active: true,
        created_at: base_time(),
        updated_at: None,
    }
}

/// The twelve matching rows plus three decoys of the listing scenario
///
/// Matching rows are `joe 1` to `joe 12` (adult, non-zero status), created
/// one minute apart. The decoys each fail exactly one filter.
pub fn listing_fixture() -> Vec<Member> {
    let mut members: Vec<Member> = (1..=12)
        .map(|n| Member {
            created_at: minutes_after_base(n),
            ..new_member(&format!("joe {}", n), 18 + n, 1)
        })
        .collect();

    members.push(Member {
        created_at: minutes_after_base(100),
        ..new_member("joe minor", 17, 1)
    });
    members.push(Member {
        created_at: minutes_after_base(101),
        ..new_member("joe inactive", 40, 0)
    });
    members.push(Member {
        created_at: minutes_after_base(102),
        ..new_member("bob", 40, 1)
    });
    members
}

/// Filters of the listing scenario
pub fn listing_filters() -> FilterMap {
    let mut filters = FilterMap::new();
    filters.insert("name__like".into(), vec!["joe".into()]);
    filters.insert("age__gte".into(), vec!["18".into()]);
    filters.insert("status__ne".into(), vec!["0".into()]);
    filters
}

/// Build a filter map from `(key, value)` pairs
pub fn filters(pairs: &[(&str, &str)]) -> FilterMap {
    let mut map = FilterMap::new();
    for (key, value) in pairs {
        map.entry(key.to_string())
            .or_default()
            .push(value.to_string());
    }
    map
}

/// Names of a page, in order
pub fn names(members: &[Member]) -> Vec<String> {
    members.iter().map(|m| m.name.clone()).collect()
}

// ---------------------------------------------------------------------------
// Assertion helpers
// ---------------------------------------------------------------------------

pub fn assert_field_value_integer(fv: &FieldValue, expected: i64) {
    match fv {
        FieldValue::Integer(i) => assert_eq!(*i, expected),
        other => panic!("Expected FieldValue::Integer({}), got {:?}", expected, other),
    }
}
