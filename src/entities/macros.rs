//! Macros for reducing boilerplate when defining records and transfer objects
//!
//! The structs are written by hand; these macros generate the repetitive
//! trait implementations. Every struct must have an `id: Option<Id>` field and
//! an `audit: AuditFields` field, and every listed field must convert into a
//! [`FieldValue`](crate::core::field::FieldValue).

/// Implement `Record`, `Fields` and identity-based `PartialEq` for a record struct
///
/// # Example
///
/// ```rust,ignore
/// impl_record!(User, i64, [username, email, role, enabled], unique [username]);
/// ```
#[macro_export]
macro_rules! impl_record {
    ($type:ident, $id:ty, [$($field:ident),* $(,)?] $(, unique [$($unique:ident),* $(,)?])?) => {
        impl $crate::core::record::Record for $type {
            type Id = $id;

            fn id(&self) -> Option<$id> {
                self.id.clone()
            }

            fn set_id(&mut self, id: $id) {
                self.id = Some(id);
            }

            fn audit(&self) -> &$crate::core::record::AuditFields {
                &self.audit
            }

            fn audit_mut(&mut self) -> &mut $crate::core::record::AuditFields {
                &mut self.audit
            }

            $(
                fn unique_keys(&self) -> Vec<(&'static str, $crate::core::field::FieldValue)> {
                    vec![
                        $( (stringify!($unique), self.$unique.clone().into()), )*
                    ]
                }
            )?
        }

        $crate::impl_fields!($type, [$($field),*]);

        impl PartialEq for $type {
            fn eq(&self, other: &Self) -> bool {
                ::std::ptr::eq(self, other) || $crate::core::record::same_identity(self, other)
            }
        }
    };
}

/// Implement `TransferObject` and `Fields` for a transfer object struct
///
/// # Example
///
/// ```rust,ignore
/// impl_transfer_object!(WeightLogDto, i64, [reptile_id, measurement_date, weight_grams, notes]);
/// ```
#[macro_export]
macro_rules! impl_transfer_object {
    ($type:ident, $id:ty, [$($field:ident),* $(,)?]) => {
        impl $crate::core::record::TransferObject for $type {
            type Id = $id;

            fn id(&self) -> Option<$id> {
                self.id.clone()
            }

            fn set_id(&mut self, id: Option<$id>) {
                self.id = id;
            }

            fn audit(&self) -> &$crate::core::record::AuditFields {
                &self.audit
            }

            fn audit_mut(&mut self) -> &mut $crate::core::record::AuditFields {
                &mut self.audit
            }
        }

        $crate::impl_fields!($type, [$($field),*]);
    };
}

/// Implement `Fields` exposing `id`, the listed fields and the audit attributes
#[macro_export]
macro_rules! impl_fields {
    ($type:ident, [$($field:ident),*]) => {
        impl $crate::core::field::Fields for $type {
            fn field_values(&self) -> Vec<(&'static str, $crate::core::field::FieldValue)> {
                let mut values: Vec<(&'static str, $crate::core::field::FieldValue)> = vec![
                    ("id", self.id.clone().into()),
                    $( (stringify!($field), self.$field.clone().into()), )*
                ];
                values.extend(self.audit.field_values());
                values
            }
        }
    };
}
