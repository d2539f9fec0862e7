//! Field values, kinds and static field descriptors

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

use crate::core::filter::parse_bool_value;

/// A polymorphic field value that can hold different types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Uuid(Uuid),
    DateTime(DateTime<Utc>),
    Null,
}

impl FieldValue {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Check if the value is the type default ("not supplied")
    ///
    /// Empty strings, zero numbers, `false`, the nil UUID, the Unix epoch
    /// and null are all zero values.
    pub fn is_zero(&self) -> bool {
        match self {
            FieldValue::String(s) => s.is_empty(),
            FieldValue::Integer(i) => *i == 0,
            FieldValue::Float(f) => *f == 0.0,
            FieldValue::Boolean(b) => !b,
            FieldValue::Uuid(u) => u.is_nil(),
            FieldValue::DateTime(d) => *d == DateTime::<Utc>::default(),
            FieldValue::Null => true,
        }
    }

    /// Textual form used for pattern matching, `None` for null
    pub fn to_text(&self) -> Option<String> {
        match self {
            FieldValue::String(s) => Some(s.clone()),
            FieldValue::Integer(i) => Some(i.to_string()),
            FieldValue::Float(f) => Some(f.to_string()),
            FieldValue::Boolean(b) => Some(if *b { "1" } else { "0" }.to_string()),
            FieldValue::Uuid(u) => Some(u.to_string()),
            FieldValue::DateTime(d) => Some(d.to_rfc3339()),
            FieldValue::Null => None,
        }
    }

    /// Compare this value with a raw string operand, coercing the operand
    /// to this value's kind.
    ///
    /// Returns `None` when the value is null or the operand cannot be read
    /// as the value's kind; such comparisons never match.
    pub fn compare_operand(&self, operand: &str) -> Option<Ordering> {
        let operand = operand.trim();
        match self {
            FieldValue::String(s) => Some(s.as_str().cmp(operand)),
            FieldValue::Integer(i) => match operand.parse::<i64>() {
                Ok(o) => Some(i.cmp(&o)),
                Err(_) => operand
                    .parse::<f64>()
                    .ok()
                    .and_then(|o| (*i as f64).partial_cmp(&o)),
            },
            FieldValue::Float(f) => operand.parse::<f64>().ok().and_then(|o| f.partial_cmp(&o)),
            FieldValue::Boolean(b) => parse_bool_value(operand).map(|o| b.cmp(&o)),
            FieldValue::Uuid(u) => Uuid::parse_str(operand).ok().map(|o| u.cmp(&o)),
            FieldValue::DateTime(d) => parse_datetime(operand).map(|o| d.cmp(&o)),
            FieldValue::Null => None,
        }
    }

    /// Total ordering used when sorting records in process.
    ///
    /// Null sorts before every other value; integers and floats compare
    /// numerically; otherwise mismatched kinds compare by text.
    pub fn sort_cmp(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Null, FieldValue::Null) => Ordering::Equal,
            (FieldValue::Null, _) => Ordering::Less,
            (_, FieldValue::Null) => Ordering::Greater,
            (FieldValue::String(a), FieldValue::String(b)) => a.cmp(b),
            (FieldValue::Integer(a), FieldValue::Integer(b)) => a.cmp(b),
            (FieldValue::Integer(a), FieldValue::Float(b)) => {
                (*a as f64).partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (FieldValue::Float(a), FieldValue::Integer(b)) => {
                a.partial_cmp(&(*b as f64)).unwrap_or(Ordering::Equal)
            }
            (FieldValue::Float(a), FieldValue::Float(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (FieldValue::Boolean(a), FieldValue::Boolean(b)) => a.cmp(b),
            (FieldValue::Uuid(a), FieldValue::Uuid(b)) => a.cmp(b),
            (FieldValue::DateTime(a), FieldValue::DateTime(b)) => a.cmp(b),
            (a, b) => a.to_text().cmp(&b.to_text()),
        }
    }
}

/// Parse an RFC 3339 timestamp, a `YYYY-MM-DD HH:MM:SS` datetime or a bare
/// date (midnight UTC).
fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// The storage kind of a record field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Integer,
    Float,
    Boolean,
    Uuid,
    DateTime,
}

/// Static description of one record field
///
/// Produced by [`impl_record!`](crate::impl_record) for every field the
/// engine may address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Rust field name
    pub name: &'static str,

    /// Store-facing column name, when it differs from the field name
    pub column: Option<&'static str>,

    /// Storage kind of the field
    pub kind: FieldKind,

    /// Whether this field is the primary key
    pub primary_key: bool,

    /// Whether the engine refreshes this field on every write
    pub auto_managed: bool,

    /// Whether this field may be written by updates
    pub writable: bool,
}

impl FieldDescriptor {
    /// The column name used by the store
    pub const fn column_name(&self) -> &'static str {
        match self.column {
            Some(column) => column,
            None => self.name,
        }
    }
}

/// Conversion between Rust field types and [`FieldValue`]
pub trait FieldType {
    /// Storage kind of the type
    const KIND: FieldKind;

    /// Read the field as a [`FieldValue`]
    fn to_field_value(&self) -> FieldValue;

    /// Produce a store-assigned primary key from a sequence number
    ///
    /// Types that cannot be generated return `None`.
    fn generate_key(_sequence: u64) -> Option<Self>
    where
        Self: Sized,
    {
        None
    }

    /// Value an auto-managed field takes when written at `now`
    fn fresh(_now: DateTime<Utc>) -> Option<Self>
    where
        Self: Sized,
    {
        None
    }

    /// Refresh an auto-managed field on write
    fn refresh(&mut self, now: DateTime<Utc>)
    where
        Self: Sized,
    {
        if let Some(fresh) = Self::fresh(now) {
            *self = fresh;
        }
    }
}

macro_rules! integer_field_type {
    ($($int:ty),*) => {
        $(
            impl FieldType for $int {
                const KIND: FieldKind = FieldKind::Integer;

                fn to_field_value(&self) -> FieldValue {
                    FieldValue::Integer(i64::try_from(*self).unwrap_or(i64::MAX))
                }

                fn generate_key(sequence: u64) -> Option<Self> {
                    <$int>::try_from(sequence).ok()
                }
            }
        )*
    };
}

integer_field_type!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FieldType for f32 {
    const KIND: FieldKind = FieldKind::Float;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Float(f64::from(*self))
    }
}

impl FieldType for f64 {
    const KIND: FieldKind = FieldKind::Float;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Float(*self)
    }
}

impl FieldType for bool {
    const KIND: FieldKind = FieldKind::Boolean;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Boolean(*self)
    }
}

impl FieldType for String {
    const KIND: FieldKind = FieldKind::String;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::String(self.clone())
    }
}

impl FieldType for Uuid {
    const KIND: FieldKind = FieldKind::Uuid;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Uuid(*self)
    }

    fn generate_key(_sequence: u64) -> Option<Self> {
        Some(Uuid::new_v4())
    }
}

impl FieldType for DateTime<Utc> {
    const KIND: FieldKind = FieldKind::DateTime;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::DateTime(*self)
    }

    fn fresh(now: DateTime<Utc>) -> Option<Self> {
        Some(now)
    }
}

impl<T: FieldType> FieldType for Option<T> {
    const KIND: FieldKind = T::KIND;

    fn to_field_value(&self) -> FieldValue {
        match self {
            Some(value) => value.to_field_value(),
            None => FieldValue::Null,
        }
    }

    fn generate_key(sequence: u64) -> Option<Self> {
        T::generate_key(sequence).map(Some)
    }

    fn fresh(now: DateTime<Utc>) -> Option<Self> {
        T::fresh(now).map(Some)
    }
}
