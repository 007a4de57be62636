//! Entity row types
//!
//! Each entity is declared once with [`entity!`], which generates the row
//! struct (sqlx `FromRow` + serde), its static [`EntityDescriptor`] and the
//! [`Entity`] impl the generic repository needs. Field order in the
//! declaration is the bind order of the business columns.
//!
//! Ids, server-populated columns and audit timestamps default when absent
//! from a JSON body, so create payloads carry business fields only.
//!
//! A business field tagged `[write_only]` is inserted and patchable but is
//! hidden from filters and ordering, and skipped by full-row updates.

macro_rules! entity {
    (
        $(#[$meta:meta])*
        $name:ident as $label:literal in $table:literal,
        id: $id_ty:ty => $id_kind:ident ($source:ident) {
            $( $(#[$fmeta:meta])* $field:ident : $fty:ty => $kind:ident $([$flag:ident])? ),* $(,)?
        }
        $( generated { $( $gfield:ident : $gty:ty => $gkind:ident ),* $(,)? } )?
        $( extra { $( $(#[$xmeta:meta])* $xfield:ident : $xty:ty ),* $(,)? } )?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, ::serde::Serialize, ::serde::Deserialize, ::sqlx::FromRow)]
        pub struct $name {
            #[serde(default)]
            pub id: $id_ty,
            $( $(#[$fmeta])* pub $field: $fty, )*
            $($( #[serde(default)] pub $gfield: $gty, )*)?
            #[serde(default)]
            pub created_at: ::chrono::DateTime<::chrono::Utc>,
            #[serde(default)]
            pub updated_at: Option<::chrono::DateTime<::chrono::Utc>>,
            #[serde(default)]
            pub deleted_at: Option<::chrono::DateTime<::chrono::Utc>>,
            $($( $(#[$xmeta])* #[sqlx(skip)] #[serde(default)] pub $xfield: $xty, )*)?
        }

        impl $crate::db::Entity for $name {
            type Id = $id_ty;

            const DESCRIPTOR: &'static ::medbook_core::EntityDescriptor =
                &::medbook_core::EntityDescriptor {
                    name: $label,
                    table: $table,
                    id: ::medbook_core::Column::new(
                        ::medbook_core::entity::ID,
                        ::medbook_core::ColumnKind::$id_kind,
                    ),
                    id_source: ::medbook_core::IdSource::$source,
                    columns: &[
                        $( ::medbook_core::Column::new(stringify!($field), ::medbook_core::ColumnKind::$kind)$(.$flag())?, )*
                    ],
                    generated: &[
                        $($( ::medbook_core::Column::new(stringify!($gfield), ::medbook_core::ColumnKind::$gkind), )*)?
                    ],
                };

            fn id(&self) -> &$id_ty {
                &self.id
            }

            fn id_mut(&mut self) -> &mut $id_ty {
                &mut self.id
            }

            fn business_values(&self) -> Vec<::medbook_core::SqlValue> {
                vec![ $( ::medbook_core::SqlValue::from(Clone::clone(&self.$field)), )* ]
            }

            fn id_value(&self) -> ::medbook_core::SqlValue {
                ::medbook_core::SqlValue::from(self.id)
            }
        }
    };
}

pub(crate) use entity;

pub mod booking;
pub mod healthcare;
pub mod user;

pub use booking::{Appointment, DoctorNote, Patient, PatientPayment};
pub use healthcare::{
    Department, Doctor, DoctorService, DoctorWorkingHours, Reason, Specialization,
};
pub use user::{Session, User};

#[cfg(test)]
pub(crate) mod tests {
    use crate::db::Entity;
    use medbook_core::EntityDescriptor;

    /// Bound values must line up with the descriptor, kind for kind.
    pub(crate) fn assert_layout<E: Entity + Default>() {
        let d: &EntityDescriptor = E::DESCRIPTOR;
        let values = E::default().business_values();
        assert_eq!(values.len(), d.columns.len(), "{}: arity", d.name);
        for (column, value) in d.columns.iter().zip(&values) {
            assert_eq!(column.kind, value.kind(), "{}.{}", d.name, column.name);
        }
        assert_eq!(E::default().id_value().kind(), d.id.kind, "{}.id", d.name);
    }
}
