//! Order status values.
//!
//! The `orders.status` column is free text so that rows written by older
//! tooling stay readable. New writes from the admin console go through
//! [`OrderStatus`], which only admits the statuses the shop actually uses.

use serde::{Deserialize, Serialize};

/// Error returned when a string is not a known order status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status: {0}")]
pub struct UnknownOrderStatus(pub String);

/// Order lifecycle status.
///
/// Payment is cash on delivery, so there is no separate financial status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Placed by the customer, not yet reviewed.
    #[default]
    Pending,
    /// Confirmed with the customer by phone.
    Confirmed,
    /// Handed to the courier.
    Shipped,
    /// Delivered and paid.
    Delivered,
    /// Cancelled by the customer or the shop.
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order (used to build the admin dropdowns).
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Confirmed,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// The stored representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Shipped => "SHIPPED",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownOrderStatus(s.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_through_str() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert_eq!(" Pending ".parse::<OrderStatus>().unwrap(), OrderStatus::Pending);
    }

    #[test]
    fn test_parse_rejects_free_text() {
        let err = "LOST_IN_MAIL".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err.to_string(), "unknown order status: LOST_IN_MAIL");
    }

    #[test]
    fn test_serde_uses_stored_representation() {
        let json = serde_json::to_string(&OrderStatus::Cancelled).unwrap();
        assert_eq!(json, "\"CANCELLED\"");
    }
}
