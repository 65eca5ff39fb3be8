//! Field-level copy support for live configuration objects.
use thiserror::Error;

/// Why a single field could not be copied.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldWriteError {
    #[error("field '{0}' is frozen on the live object")]
    Frozen(String),

    #[error("field '{0}' does not exist on this shape")]
    Unknown(String),

    #[error("field '{field}' cannot be copied between different shapes")]
    ShapeMismatch { field: String },
}

/// Generates `FIELDS` and `write_field` for a struct whose listed fields are `Clone`.
///
/// `write_field(name, other)` copies one named field from `other` into `self`.
macro_rules! patchable_fields {
    ($ty:ident { $($field:ident),+ $(,)? }) => {
        impl $ty {
            /// Names of every field that a patch copies.
            pub const FIELDS: &'static [&'static str] = &[$(stringify!($field)),+];

            /// Copies the field `name` from `other` into `self`.
            pub fn write_field(
                &mut self,
                name: &str,
                other: &Self,
            ) -> ::std::result::Result<(), $crate::registry::fields::FieldWriteError> {
                match name {
                    $(stringify!($field) => {
                        self.$field = ::std::clone::Clone::clone(&other.$field);
                        Ok(())
                    })+
                    _ => Err($crate::registry::fields::FieldWriteError::Unknown(name.to_owned())),
                }
            }
        }
    };
}

pub(crate) use patchable_fields;
