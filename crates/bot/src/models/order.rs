//! Order aggregate domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chefport_core::{
    ChangeBill, ChatId, DeliveryMethod, Money, OrderId, OrderStatus, PaymentMethod, PaymentStatus,
    Phone,
};

use super::cart::CartLine;

/// Header and line items of an order about to be persisted.
///
/// Built from a commit-eligible draft; the total is always recomputed
/// from the line items, never accepted from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_phone: Phone,
    pub delivery_method: DeliveryMethod,
    pub delivery_address: String,
    pub payment_method: PaymentMethod,
    pub change_requested: bool,
    pub change_amount: Option<ChangeBill>,
    pub comment: Option<String>,
    pub total: Money,
    pub items: Vec<CartLine>,
}

/// A persisted order aggregate.
///
/// Immutable after creation except for `status`/`payment_status`
/// transitions, each of which appends a [`StatusHistoryEntry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: ChatId,
    pub customer_name: String,
    pub customer_phone: Phone,
    pub delivery_method: DeliveryMethod,
    pub delivery_address: String,
    pub payment_method: PaymentMethod,
    pub change_requested: bool,
    pub change_amount: Option<ChangeBill>,
    pub comment: Option<String>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub total: Money,
    pub items: Vec<CartLine>,
    pub history: Vec<StatusHistoryEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One row of the append-only status audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    /// Who triggered the change; `None` for system transitions.
    pub changed_by: Option<ChatId>,
    pub changed_at: DateTime<Utc>,
    pub comment: Option<String>,
}
