//! Order lifecycle enums and the status state machine.
//!
//! The wire representation matches the storefront client contract:
//! statuses are SCREAMING_SNAKE_CASE, shipping modes lowercase, and
//! payment methods uppercase.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
///
/// Transitions move strictly forward through
/// `Placed -> Processing -> Shipped -> OutForDelivery -> Delivered`,
/// with `Cancelled` reachable from any non-terminal state. Both
/// `Delivered` and `Cancelled` are absorbing. The transition table is
/// enforced at the update path; there is no admin override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum OrderStatus {
    Placed,
    Processing,
    Shipped,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Wire representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Placed => "PLACED",
            Self::Processing => "PROCESSING",
            Self::Shipped => "SHIPPED",
            Self::OutForDelivery => "OUT_FOR_DELIVERY",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Human-readable label, used for timeline entries.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Placed => "Order placed",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::OutForDelivery => "Out for delivery",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Whether this status accepts no further transitions.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// The next status in the forward sequence, if any.
    #[must_use]
    pub const fn next(&self) -> Option<Self> {
        match self {
            Self::Placed => Some(Self::Processing),
            Self::Processing => Some(Self::Shipped),
            Self::Shipped => Some(Self::OutForDelivery),
            Self::OutForDelivery => Some(Self::Delivered),
            Self::Delivered | Self::Cancelled => None,
        }
    }

    /// Whether a transition from `self` to `to` is legal.
    ///
    /// Legal moves are exactly: one step forward in the sequence, or
    /// cancellation from any non-terminal state.
    #[must_use]
    pub fn can_transition_to(&self, to: Self) -> bool {
        if to == Self::Cancelled {
            return !self.is_terminal();
        }
        self.next() == Some(to)
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shipping mode chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(rename_all = "lowercase"))]
pub enum ShippingMode {
    #[default]
    Standard,
    Express,
}

impl ShippingMode {
    /// Wire representation of the mode.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Express => "express",
        }
    }
}

/// How the order is paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(rename_all = "UPPERCASE"))]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    Cod,
    /// Paid online through the gateway before order placement.
    Online,
}

impl PaymentMethod {
    /// Wire representation of the method.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cod => "COD",
            Self::Online => "ONLINE",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_walk_is_legal() {
        let mut status = OrderStatus::Placed;
        while let Some(next) = status.next() {
            assert!(status.can_transition_to(next));
            status = next;
        }
        assert_eq!(status, OrderStatus::Delivered);
    }

    #[test]
    fn test_skipping_ahead_is_illegal() {
        assert!(!OrderStatus::Placed.can_transition_to(OrderStatus::Shipped));
        assert!(!OrderStatus::Placed.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Processing.can_transition_to(OrderStatus::OutForDelivery));
    }

    #[test]
    fn test_moving_backwards_is_illegal() {
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Processing));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::OutForDelivery));
    }

    #[test]
    fn test_cancel_from_any_non_terminal_state() {
        for status in [
            OrderStatus::Placed,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::OutForDelivery,
        ] {
            assert!(status.can_transition_to(OrderStatus::Cancelled));
        }
    }

    #[test]
    fn test_terminal_states_are_absorbing() {
        for status in [OrderStatus::Delivered, OrderStatus::Cancelled] {
            assert!(status.is_terminal());
            assert!(!status.can_transition_to(OrderStatus::Cancelled));
            assert!(!status.can_transition_to(OrderStatus::Placed));
            assert_eq!(status.next(), None);
        }
    }

    #[test]
    fn test_self_transition_is_illegal() {
        assert!(!OrderStatus::Placed.can_transition_to(OrderStatus::Placed));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_string(&OrderStatus::OutForDelivery).unwrap();
        assert_eq!(json, "\"OUT_FOR_DELIVERY\"");

        let json = serde_json::to_string(&ShippingMode::Express).unwrap();
        assert_eq!(json, "\"express\"");

        let json = serde_json::to_string(&PaymentMethod::Cod).unwrap();
        assert_eq!(json, "\"COD\"");
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [
            OrderStatus::Placed,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            let back: OrderStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(back, status);
        }
    }
}
