//! Predicate builder: turns parsed filter clauses into a conjunction of
//! column predicates, restricted to the column allowlist

use crate::core::filter::{FilterClause, FilterOp, parse_bool_value};
use crate::core::schema::ColumnAllowlist;

/// Binary comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Comparison {
    /// SQL spelling of the operator
    pub fn sql(&self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Ne => "<>",
            Comparison::Gt => ">",
            Comparison::Gte => ">=",
            Comparison::Lt => "<",
            Comparison::Lte => "<=",
        }
    }
}

/// A boolean condition over one column
///
/// Operands stay strings; stores bind them as parameters (or coerce them to
/// the column's kind) and never splice them into query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Compare {
        column: String,
        op: Comparison,
        value: String,
    },
    Like {
        column: String,
        pattern: String,
    },
    In {
        column: String,
        values: Vec<String>,
    },
    NotIn {
        column: String,
        values: Vec<String>,
    },
    IsNull {
        column: String,
    },
    IsNotNull {
        column: String,
    },
}

impl Predicate {
    /// The column this predicate tests
    pub fn column(&self) -> &str {
        match self {
            Predicate::Compare { column, .. }
            | Predicate::Like { column, .. }
            | Predicate::In { column, .. }
            | Predicate::NotIn { column, .. }
            | Predicate::IsNull { column }
            | Predicate::IsNotNull { column } => column,
        }
    }

    fn compare(column: &str, op: Comparison, value: &str) -> Self {
        Predicate::Compare {
            column: column.to_string(),
            op,
            value: value.to_string(),
        }
    }
}

/// A conjunction (logical AND) of predicates
///
/// An empty filter matches every row. There is no OR and no nesting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFilter {
    predicates: Vec<Predicate>,
}

impl QueryFilter {
    pub fn new(predicates: Vec<Predicate>) -> Self {
        Self { predicates }
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Add a predicate to the conjunction
    pub fn and(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }
}

/// Wrap a `like` operand in `%…%` unless it already has a wildcard
pub fn like_pattern(value: &str) -> String {
    if value.is_empty() || value.contains(['%', '_']) {
        value.to_string()
    } else {
        format!("%{}%", value)
    }
}

/// Build the predicate conjunction for a set of clauses
///
/// Clauses on columns outside the allowlist, and clauses whose operands do
/// not satisfy their operator, are dropped without error.
pub fn build_predicate(clauses: &[FilterClause], allowlist: &ColumnAllowlist) -> QueryFilter {
    let mut predicates = Vec::with_capacity(clauses.len());

    for clause in clauses {
        let column = clause.column.as_str();
        if column.is_empty() || !allowlist.contains(column) {
            tracing::debug!(column, op = %clause.op, "dropping filter on unknown column");
            continue;
        }

        if clause.values.is_empty() && !clause.op.allows_empty_operands() {
            tracing::debug!(column, op = %clause.op, "dropping filter without operands");
            continue;
        }

        let first = clause.first_value();
        match clause.op {
            FilterOp::Eq => predicates.push(Predicate::compare(column, Comparison::Eq, first)),
            FilterOp::Ne => predicates.push(Predicate::compare(column, Comparison::Ne, first)),
            FilterOp::Gt => predicates.push(Predicate::compare(column, Comparison::Gt, first)),
            FilterOp::Gte => predicates.push(Predicate::compare(column, Comparison::Gte, first)),
            FilterOp::Lt => predicates.push(Predicate::compare(column, Comparison::Lt, first)),
            FilterOp::Lte => predicates.push(Predicate::compare(column, Comparison::Lte, first)),
            FilterOp::Like => {
                let pattern = like_pattern(first);
                if !pattern.is_empty() {
                    predicates.push(Predicate::Like {
                        column: column.to_string(),
                        pattern,
                    });
                }
            }
            FilterOp::In => predicates.push(Predicate::In {
                column: column.to_string(),
                values: clause.values.clone(),
            }),
            FilterOp::NotIn => predicates.push(Predicate::NotIn {
                column: column.to_string(),
                values: clause.values.clone(),
            }),
            FilterOp::Between => {
                if let [low, high, ..] = clause.values.as_slice() {
                    predicates.push(Predicate::compare(column, Comparison::Gte, low));
                    predicates.push(Predicate::compare(column, Comparison::Lte, high));
                } else {
                    tracing::debug!(column, "dropping between filter with a single bound");
                }
            }
            FilterOp::IsNull => {
                let predicate = match parse_bool_value(first) {
                    Some(false) => Predicate::IsNotNull {
                        column: column.to_string(),
                    },
                    _ => Predicate::IsNull {
                        column: column.to_string(),
                    },
                };
                predicates.push(predicate);
            }
            FilterOp::NotNull => predicates.push(Predicate::IsNotNull {
                column: column.to_string(),
            }),
        }
    }

    QueryFilter::new(predicates)
}
