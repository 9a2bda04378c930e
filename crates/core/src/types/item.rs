//! Redeemable items.

use serde::{Deserialize, Serialize};

/// Quota change recorded for every redemption.
pub const REDEMPTION_DELTA: i32 = -1;

/// An item attendees can redeem at a booth, each backed by its own quota column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "event.redeem_item", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum Item {
    Indomie,
    Beer,
}

/// Error returned when an item string is not one of the known items.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid item: {0}")]
pub struct ParseItemError(pub String);

impl Item {
    /// All items, in display order.
    pub const ALL: [Self; 2] = [Self::Indomie, Self::Beer];

    /// Starting quota for a newly created attendee.
    #[must_use]
    pub const fn default_quota(self) -> u32 {
        match self {
            Self::Indomie => 1,
            Self::Beer => 3,
        }
    }

    /// Lowercase wire name, as used in JSON, CSV and the database enum.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Indomie => "indomie",
            Self::Beer => "beer",
        }
    }
}

impl std::fmt::Display for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Item {
    type Err = ParseItemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "indomie" => Ok(Self::Indomie),
            "beer" => Ok(Self::Beer),
            _ => Err(ParseItemError(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_quotas() {
        assert_eq!(Item::Indomie.default_quota(), 1);
        assert_eq!(Item::Beer.default_quota(), 3);
    }

    #[test]
    fn test_wire_names() {
        for item in Item::ALL {
            assert_eq!(item.as_str().parse::<Item>().unwrap(), item);
            assert_eq!(
                serde_json::to_string(&item).unwrap(),
                format!("\"{}\"", item.as_str())
            );
        }
        assert_eq!(
            "coffee".parse::<Item>(),
            Err(ParseItemError("coffee".to_string()))
        );
        assert_eq!(
            ParseItemError("coffee".to_string()).to_string(),
            "invalid item: coffee"
        );
    }

    #[test]
    fn test_unknown_item_fails_deserialize() {
        assert!(serde_json::from_str::<Item>("\"coffee\"").is_err());
    }

    #[test]
    fn test_redemption_delta_is_single_unit_decrement() {
        assert_eq!(REDEMPTION_DELTA, -1);
    }
}
