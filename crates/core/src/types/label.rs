//! Free-text identifiers typed in by people: employee numbers and booth names.
//!
//! Both are trimmed and must be non-empty. Comparison is exact (no case folding);
//! employee IDs are printed on badges and encoded in QR codes verbatim.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Errors that can occur when parsing an [`EmployeeId`] or [`BoothId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
    /// The input is empty after trimming.
    #[error("{field} cannot be empty")]
    Empty {
        /// Which label was being parsed.
        field: &'static str,
    },
    /// The input is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Which label was being parsed.
        field: &'static str,
        /// Maximum allowed length.
        max: usize,
    },
}

/// Maximum length, in characters, of a label.
const MAX_LABEL_LENGTH: usize = 64;

fn parse_label(s: &str, field: &'static str) -> Result<String, LabelError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(LabelError::Empty { field });
    }
    if s.chars().count() > MAX_LABEL_LENGTH {
        return Err(LabelError::TooLong {
            field,
            max: MAX_LABEL_LENGTH,
        });
    }
    Ok(s.to_owned())
}

macro_rules! define_label {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Maximum length in characters.
            pub const MAX_LENGTH: usize = MAX_LABEL_LENGTH;

            /// Parse and trim the label.
            ///
            /// # Errors
            ///
            /// Returns an error if the trimmed input is empty or too long.
            pub fn parse(s: &str) -> Result<Self, LabelError> {
                parse_label(s, $field).map(Self)
            }

            /// Returns the label as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the label and returns its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = LabelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Self::parse(&raw).map_err(serde::de::Error::custom)
            }
        }

        #[cfg(feature = "postgres")]
        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                Ok(Self(s))
            }
        }

        #[cfg(feature = "postgres")]
        impl sqlx::Encode<'_, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

define_label!(
    /// Human-facing employee number; unique per attendee and encoded in their QR code.
    EmployeeId,
    "employee_id"
);

define_label!(
    /// Identifier of a physical redemption station, e.g. `B1` or `Rooftop Bar`.
    BoothId,
    "booth_id"
);
