//! Order resolver for untrusted sort directives
//!
//! A directive looks like `created_at desc`, `-created_at`, `name:asc` or
//! `age,desc`. Only allowlisted columns survive; the first directive for a
//! column wins.

use std::collections::HashSet;

use crate::core::schema::ColumnAllowlist;

/// Query keys whose values are order directives, in merge order
pub const ORDER_KEYS: [&str; 4] = ["order", "sort", "order_by", "orderBy"];

/// One resolved ordering term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSpec {
    pub column: String,
    pub descending: bool,
}

impl OrderSpec {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }

    /// SQL keyword for the direction
    pub fn direction(&self) -> &'static str {
        if self.descending { "DESC" } else { "ASC" }
    }
}

/// Parse a single directive
///
/// Returns `None` when no column name is left after stripping the sign.
pub fn parse_order_option(raw: &str) -> Option<OrderSpec> {
    let mut tokens = raw
        .split([' ', ':', ','])
        .map(str::trim)
        .filter(|token| !token.is_empty());

    let first = tokens.next()?;
    let (column, mut descending) = if let Some(rest) = first.strip_prefix('-') {
        (rest, true)
    } else if let Some(rest) = first.strip_prefix('+') {
        (rest, false)
    } else {
        (first, false)
    };

    if let Some(direction) = tokens.next() {
        descending = matches!(
            direction.to_lowercase().as_str(),
            "desc" | "descend" | "descending"
        );
    }

    let column = column.trim();
    if column.is_empty() {
        return None;
    }

    Some(OrderSpec {
        column: column.to_string(),
        descending,
    })
}

/// Parse every directive, keeping their order
pub fn parse_order_options(raw: &[String]) -> Vec<OrderSpec> {
    raw.iter()
        .filter_map(|directive| parse_order_option(directive))
        .collect()
}

/// Keep allowlisted columns only, first occurrence per column
pub fn sanitize_orders(orders: Vec<OrderSpec>, allowlist: &ColumnAllowlist) -> Vec<OrderSpec> {
    let mut seen = HashSet::new();
    orders
        .into_iter()
        .filter(|order| {
            if !allowlist.contains(&order.column) {
                tracing::debug!(column = %order.column, "dropping order on unknown column");
                return false;
            }
            seen.insert(order.column.clone())
        })
        .collect()
}

/// Resolve raw directives into validated ordering terms
///
/// An empty result means the caller falls back to the primary key.
pub fn resolve_order(raw: &[String], allowlist: &ColumnAllowlist) -> Vec<OrderSpec> {
    sanitize_orders(parse_order_options(raw), allowlist)
}
