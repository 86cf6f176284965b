//! Status and method enums for orders and checkout.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// The allowed flow is `new → cooking → delivering → completed`, with
/// `cancelled` reachable from `new` or `cooking`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    New,
    Cooking,
    Delivering,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Whether an order may move from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::New, Self::Cooking)
                | (Self::Cooking, Self::Delivering)
                | (Self::Delivering, Self::Completed)
                | (Self::New | Self::Cooking, Self::Cancelled)
        )
    }

    /// Whether this status is terminal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::Cooking => write!(f, "cooking"),
            Self::Delivering => write!(f, "delivering"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "cooking" => Ok(Self::Cooking),
            "delivering" => Ok(Self::Delivering),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Payment status, a separate axis from [`OrderStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    NotPaid,
    Paid,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotPaid => write!(f, "not_paid"),
            Self::Paid => write!(f, "paid"),
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_paid" => Ok(Self::NotPaid),
            "paid" => Ok(Self::Paid),
            _ => Err(format!("invalid payment status: {s}")),
        }
    }
}

/// How the customer receives the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    Pickup,
    Delivery,
}

impl std::fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pickup => write!(f, "pickup"),
            Self::Delivery => write!(f, "delivery"),
        }
    }
}

impl std::str::FromStr for DeliveryMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pickup" => Ok(Self::Pickup),
            "delivery" => Ok(Self::Delivery),
            _ => Err(format!("invalid delivery method: {s}")),
        }
    }
}

/// How the customer pays.
///
/// `Online` is offered in the dialog but answered with a "not available"
/// notice; it never reaches a committed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Online,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cash => write!(f, "cash"),
            Self::Card => write!(f, "card"),
            Self::Online => write!(f, "online"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(Self::Cash),
            "card" => Ok(Self::Card),
            "online" => Ok(Self::Online),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

/// Bill denominations a courier can break for change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeBill {
    Thousand,
    TwoThousand,
    FiveThousand,
}

impl ChangeBill {
    /// All denominations, in keyboard order.
    pub const ALL: [Self; 3] = [Self::Thousand, Self::TwoThousand, Self::FiveThousand];

    /// The denomination in rubles.
    #[must_use]
    pub const fn rubles(self) -> i64 {
        match self {
            Self::Thousand => 1000,
            Self::TwoThousand => 2000,
            Self::FiveThousand => 5000,
        }
    }

    /// Look up a denomination by its ruble value.
    #[must_use]
    pub const fn from_rubles(amount: i64) -> Option<Self> {
        match amount {
            1000 => Some(Self::Thousand),
            2000 => Some(Self::TwoThousand),
            5000 => Some(Self::FiveThousand),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChangeBill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ₽", self.rubles())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert!(OrderStatus::New.can_transition_to(OrderStatus::Cooking));
        assert!(OrderStatus::Cooking.can_transition_to(OrderStatus::Delivering));
        assert!(OrderStatus::Delivering.can_transition_to(OrderStatus::Completed));
    }

    #[test]
    fn test_cancellation_window() {
        assert!(OrderStatus::New.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Cooking.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Delivering.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_no_backward_or_skipping_transitions() {
        assert!(!OrderStatus::New.can_transition_to(OrderStatus::Delivering));
        assert!(!OrderStatus::Cooking.can_transition_to(OrderStatus::New));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Cooking));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::New));
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::New.is_terminal());
    }

    #[test]
    fn test_status_string_roundtrip() {
        for status in [
            OrderStatus::New,
            OrderStatus::Cooking,
            OrderStatus::Delivering,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            let parsed: OrderStatus = status.to_string().parse().expect("roundtrip");
            assert_eq!(parsed, status);
        }
        assert!("unknown".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_change_bill_lookup() {
        assert_eq!(ChangeBill::from_rubles(2000), Some(ChangeBill::TwoThousand));
        assert_eq!(ChangeBill::from_rubles(500), None);
        assert_eq!(ChangeBill::TwoThousand.rubles(), 2000);
    }
}
