//! HTTP exposure of the engine
//!
//! The engine itself is transport-agnostic; this module adapts any
//! [`CrudOperations`](crate::core::service::CrudOperations) implementation
//! to an Axum router.

pub mod response;
pub mod rest;

pub use response::{ApiResponse, DeleteResponse, ListResponse};
pub use rest::{SharedService, router};
