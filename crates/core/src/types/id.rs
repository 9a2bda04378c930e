//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.

use uuid::Uuid;

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around a `Copy` inner value with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `get()`
/// - `From` conversions in both directions
/// - `sqlx` `Type`, `Encode`, and `Decode` implementations (with `postgres` feature)
///
/// # Example
///
/// ```rust
/// # use eventpass_core::define_id;
/// define_id!(BadgeId, i64);
/// define_id!(PrintJobId, i64);
///
/// let badge = BadgeId::new(1);
/// let job = PrintJobId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: BadgeId = job;
/// # assert_eq!(badge.get(), job.get());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident, $inner:ty) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name($inner);

        impl $name {
            /// Wrap a raw ID value.
            #[must_use]
            pub const fn new(id: $inner) -> Self {
                Self(id)
            }

            /// Get the underlying value.
            #[must_use]
            pub const fn get(&self) -> $inner {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$inner> for $name {
            fn from(id: $inner) -> Self {
                Self(id)
            }
        }

        impl From<$name> for $inner {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <$inner as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <$inner as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let id = <$inner as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(id))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <$inner as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

define_id!(AttendeeId, Uuid);
define_id!(RedemptionLogId, i64);

impl AttendeeId {
    /// Generate a fresh random attendee ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::str::FromStr for AttendeeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_attendee_id_serializes_as_plain_uuid() {
        let raw = Uuid::parse_str("6f1c1f4e-8a47-4f3b-9f0e-1d2c3b4a5968").unwrap();
        let id = AttendeeId::new(raw);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"6f1c1f4e-8a47-4f3b-9f0e-1d2c3b4a5968\"");
    }

    #[test]
    fn test_attendee_id_from_str() {
        let id: AttendeeId = "6f1c1f4e-8a47-4f3b-9f0e-1d2c3b4a5968".parse().unwrap();
        assert_eq!(id.to_string(), "6f1c1f4e-8a47-4f3b-9f0e-1d2c3b4a5968");
        assert!("not-a-uuid".parse::<AttendeeId>().is_err());
    }

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(AttendeeId::generate(), AttendeeId::generate());
    }

    #[test]
    fn test_log_id_conversions() {
        let id = RedemptionLogId::from(42_i64);
        assert_eq!(i64::from(id), 42);
        assert_eq!(format!("{id}"), "42");
    }
}
