//! Filter grammar for untrusted query-string input
//!
//! Filter keys take the form `<column>__<operator>`, e.g. `age__gte=18` or
//! `status__in=1,2`. A key without a recognised operator suffix is an
//! equality filter on the whole key, so columns that contain `__` keep
//! working.
//!
//! Nothing in this module fails: malformed input is normalised away and the
//! predicate builder later drops whatever is left unusable.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw filter input: each key maps to every value supplied for it, in the
/// order the keys were first seen
pub type FilterMap = IndexMap<String, Vec<String>>;

/// Separator between a column name and its operator suffix
const OPERATOR_SEPARATOR: &str = "__";

/// Filter operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    #[default]
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    In,
    #[serde(rename = "nin")]
    NotIn,
    Between,
    IsNull,
    NotNull,
}

impl FilterOp {
    /// Resolve an operator suffix, case-insensitively
    pub fn from_alias(raw: &str) -> Option<Self> {
        let op = match raw.trim().to_lowercase().as_str() {
            "eq" | "=" => FilterOp::Eq,
            "ne" | "neq" | "!=" | "<>" => FilterOp::Ne,
            "gt" | ">" => FilterOp::Gt,
            "gte" | "ge" | ">=" => FilterOp::Gte,
            "lt" | "<" => FilterOp::Lt,
            "lte" | "le" | "<=" => FilterOp::Lte,
            "like" | "contains" | "contain" => FilterOp::Like,
            "in" => FilterOp::In,
            "nin" | "notin" | "not_in" => FilterOp::NotIn,
            "between" | "range" => FilterOp::Between,
            "isnull" | "null" => FilterOp::IsNull,
            "notnull" | "not_null" | "isnotnull" => FilterOp::NotNull,
            _ => return None,
        };
        Some(op)
    }

    /// Canonical name of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Ne => "ne",
            FilterOp::Gt => "gt",
            FilterOp::Gte => "gte",
            FilterOp::Lt => "lt",
            FilterOp::Lte => "lte",
            FilterOp::Like => "like",
            FilterOp::In => "in",
            FilterOp::NotIn => "nin",
            FilterOp::Between => "between",
            FilterOp::IsNull => "isnull",
            FilterOp::NotNull => "notnull",
        }
    }

    /// Whether operand values may be comma-separated lists
    pub fn accepts_list(&self) -> bool {
        matches!(self, FilterOp::In | FilterOp::NotIn | FilterOp::Between)
    }

    /// Whether the operator is meaningful without any operand
    pub fn allows_empty_operands(&self) -> bool {
        matches!(self, FilterOp::IsNull | FilterOp::NotNull)
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed filter: a column, an operator and its normalised operands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterClause {
    pub column: String,
    pub op: FilterOp,
    pub values: Vec<String>,
}

impl FilterClause {
    /// Build a clause from raw operand values
    ///
    /// Values are trimmed and blanks dropped. List operators additionally
    /// split every value on commas.
    pub fn new(column: impl Into<String>, op: FilterOp, raw_values: &[String]) -> Self {
        let values = if op.accepts_list() {
            split_comma_values(raw_values)
        } else {
            normalize_values(raw_values)
        };

        Self {
            column: column.into(),
            op,
            values,
        }
    }

    /// First operand, or the empty string
    pub fn first_value(&self) -> &str {
        self.values.first().map(String::as_str).unwrap_or("")
    }
}

/// Split a filter key into its column and operator
///
/// The separator is the last `__` that is neither at the start of the key
/// nor its final characters. An unknown suffix, or no separator at all,
/// yields the whole (trimmed) key with [`FilterOp::Eq`]. A blank key yields
/// an empty column.
pub fn parse_filter_key(key: &str) -> (String, FilterOp) {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return (String::new(), FilterOp::Eq);
    }

    if let Some(idx) = trimmed.rfind(OPERATOR_SEPARATOR) {
        let suffix_start = idx + OPERATOR_SEPARATOR.len();
        if idx > 0 && suffix_start < trimmed.len() {
            if let Some(op) = FilterOp::from_alias(&trimmed[suffix_start..]) {
                return (trimmed[..idx].to_string(), op);
            }
        }
    }

    (trimmed.to_string(), FilterOp::Eq)
}

/// Parse every entry of a filter map into clauses
///
/// Keys that resolve to an empty column are skipped; clauses whose operands
/// all normalised away are kept so the predicate builder can apply the
/// operator-specific rules.
pub fn parse_filters(filters: &FilterMap) -> Vec<FilterClause> {
    filters
        .iter()
        .filter_map(|(key, raw_values)| {
            let (column, op) = parse_filter_key(key);
            if column.is_empty() {
                return None;
            }
            Some(FilterClause::new(column, op, raw_values))
        })
        .collect()
}

/// Trim values and drop the ones left empty
pub fn normalize_values(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|raw| raw.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split every value on commas, trim the parts and drop empty ones
pub fn split_comma_values(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|raw| raw.split(','))
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read a loosely formatted boolean
///
/// Returns `None` for anything that is not one of the recognised spellings.
pub fn parse_bool_value(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}
