//! Macros for reducing boilerplate when declaring records
//!
//! The engine never reflects on a type at runtime. [`impl_record!`] turns a
//! short field listing into the static descriptor table and the accessors
//! required by [`Record`](crate::core::record::Record).

/// Implement [`Record`](crate::core::record::Record) for an existing struct
///
/// Each listed field may carry a store column name (`as "column"`) and
/// flags in brackets:
///
/// - `key`: the primary key (exactly one field should carry it)
/// - `auto`: auto-managed, refreshed on every write and always part of an
///   update (timestamps)
/// - `readonly`: never written by updates
///
/// Fields left out of the listing are invisible to filtering, ordering and
/// partial updates.
///
/// # Example
///
/// ```rust,ignore
/// use this_crud::prelude::*;
///
/// #[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// pub struct Member {
///     pub id: u64,
///     pub name: String,
///     pub age: i64,
///     pub created_at: DateTime<Utc>,
///     pub updated_at: Option<DateTime<Utc>>,
/// }
///
/// impl_record!(Member, "members", {
///     id: u64 [key],
///     name: String,
///     age: i64 as "member_age",
///     created_at: DateTime<Utc> [readonly],
///     updated_at: Option<DateTime<Utc>> [auto],
/// });
/// ```
#[macro_export]
macro_rules! impl_record {
    (
        $type:ident,
        $table:expr,
        {
            $(
                $field:ident : $field_type:ty
                $( as $column:literal )?
                $( [ $( $flag:ident ),* $(,)? ] )?
            ),* $(,)?
        }
    ) => {
        impl $crate::core::record::Record for $type {
            fn resource_name() -> &'static str {
                $table
            }

            fn fields() -> &'static [$crate::core::field::FieldDescriptor] {
                const FIELDS: &[$crate::core::field::FieldDescriptor] = &[
                    $(
                        $crate::core::field::FieldDescriptor {
                            name: stringify!($field),
                            column: $crate::impl_record!(@column $( $column )?),
                            kind: <$field_type as $crate::core::field::FieldType>::KIND,
                            primary_key: $crate::impl_record!(@flag key $( $( $flag )* )?),
                            auto_managed: $crate::impl_record!(@flag auto $( $( $flag )* )?),
                            writable: !$crate::impl_record!(@flag readonly $( $( $flag )* )?),
                        },
                    )*
                ];
                FIELDS
            }

            fn field_value(&self, field: &str) -> Option<$crate::core::field::FieldValue> {
                match field {
                    $(
                        stringify!($field) => Some(
                            $crate::core::field::FieldType::to_field_value(&self.$field)
                        ),
                    )*
                    _ => None,
                }
            }

            #[allow(unreachable_code)]
            fn assign_generated_key(&mut self, sequence: u64) -> bool {
                $(
                    if $crate::impl_record!(@flag key $( $( $flag )* )?) {
                        return match <$field_type as $crate::core::field::FieldType>::generate_key(sequence) {
                            Some(key) => {
                                self.$field = key;
                                true
                            }
                            None => false,
                        };
                    }
                )*
                let _ = sequence;
                false
            }

            fn touch(&mut self, now: $crate::prelude::DateTime<$crate::prelude::Utc>) {
                $(
                    if $crate::impl_record!(@flag auto $( $( $flag )* )?) {
                        $crate::core::field::FieldType::refresh(&mut self.$field, now);
                    }
                )*
                let _ = now;
            }
        }
    };

    // Store column name
    (@column) => { None };
    (@column $column:literal) => { Some($column) };

    // Flag lookup
    (@flag $wanted:ident) => { false };
    (@flag key key $( $rest:ident )*) => { true };
    (@flag auto auto $( $rest:ident )*) => { true };
    (@flag readonly readonly $( $rest:ident )*) => { true };
    (@flag $wanted:ident $other:ident $( $rest:ident )*) => {
        $crate::impl_record!(@flag $wanted $( $rest )*)
    };
}
