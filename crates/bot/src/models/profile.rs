//! Customer profile and saved address domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chefport_core::{AddressId, ChatId, DeliveryMethod, Phone};

/// A customer's saved contact profile (at most one per user).
///
/// Kept in sync on every committed order, not just the first one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: ChatId,
    pub full_name: String,
    pub phone: Phone,
    pub city: String,
    pub street: Option<String>,
    pub house: Option<String>,
    pub flat: Option<String>,
    pub entrance: Option<String>,
    pub floor: Option<String>,
    /// The delivery method the customer used last.
    pub delivery_type: DeliveryMethod,
    /// Marketing mailing consent.
    pub consent_marketing: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The profile fields a checkout commit writes.
///
/// Fields the dialog never collects (house, flat, …) are left untouched
/// on update and empty on first creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileFields {
    pub full_name: String,
    pub phone: Phone,
    pub city: String,
    pub street: Option<String>,
    pub delivery_type: DeliveryMethod,
}

/// A saved delivery address (zero or more per user).
///
/// At most one address per user carries `is_default`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub user_id: ChatId,
    /// Short human label: "Дом", "Работа".
    pub label: String,
    /// Full address text.
    pub text: String,
    pub is_default: bool,
}
