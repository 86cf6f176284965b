//! Inbound dialog events.
//!
//! Button presses arrive as callback-data strings; free text arrives as
//! plain messages. [`Event::from_callback_data`] is the single place
//! the string grammar is parsed.

use chefport_core::{AddressId, ChangeBill, DeliveryMethod, PaymentMethod};

/// One inbound user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Begin (or restart) the checkout dialog.
    Start,
    /// Abandon the dialog; the cart is preserved.
    Cancel,
    /// Re-collect name and phone despite a saved profile.
    EditProfile,
    Delivery(DeliveryMethod),
    SelectAddress(AddressId),
    EnterNewAddress,
    SaveNewAddress(bool),
    Payment(PaymentMethod),
    /// Whether the customer needs change from a large bill.
    Change(bool),
    Bill(ChangeBill),
    SkipComment,
    Confirm,
    /// Free-text message (name, phone, address, or comment depending
    /// on the current state).
    Text(String),
}

impl Event {
    /// Parse a callback-data string, `None` for unknown data.
    #[must_use]
    pub fn from_callback_data(data: &str) -> Option<Self> {
        match data {
            "checkout" => Some(Self::Start),
            "cancel_checkout" => Some(Self::Cancel),
            "checkout:edit_profile" => Some(Self::EditProfile),
            "delivery:pickup" => Some(Self::Delivery(DeliveryMethod::Pickup)),
            "delivery:delivery" => Some(Self::Delivery(DeliveryMethod::Delivery)),
            "enter_new_delivery_address" => Some(Self::EnterNewAddress),
            "save_new_addr:yes" => Some(Self::SaveNewAddress(true)),
            "save_new_addr:no" => Some(Self::SaveNewAddress(false)),
            "payment:cash" => Some(Self::Payment(PaymentMethod::Cash)),
            "payment:card" => Some(Self::Payment(PaymentMethod::Card)),
            "payment:online" => Some(Self::Payment(PaymentMethod::Online)),
            "change:yes" => Some(Self::Change(true)),
            "change:no" => Some(Self::Change(false)),
            "skip_comment" => Some(Self::SkipComment),
            "confirm_order" => Some(Self::Confirm),
            _ => {
                if let Some(raw) = data.strip_prefix("select_delivery_address:") {
                    return raw.parse().ok().map(|id: i32| Self::SelectAddress(id.into()));
                }
                if let Some(raw) = data.strip_prefix("bill:") {
                    return raw
                        .parse()
                        .ok()
                        .and_then(ChangeBill::from_rubles)
                        .map(Self::Bill);
                }
                None
            }
        }
    }
}
