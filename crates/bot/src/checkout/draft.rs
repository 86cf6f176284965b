//! Dialog state and the draft order it accumulates.

use chefport_core::{ChangeBill, DeliveryMethod, Money, PaymentMethod, Phone};

use crate::models::{CartLine, NewOrder};

/// Where the dialog currently waits for input.
///
/// Terminal outcomes (committed, cancelled) are not states: the session
/// is dropped instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    CollectingName,
    CollectingPhone,
    ChoosingDeliveryMethod,
    /// Picking one of the saved addresses or "enter new".
    ChoosingAddress,
    CollectingAddress,
    /// Offering to persist the freshly typed address.
    ConfirmingNewAddressSave,
    ChoosingPaymentMethod,
    /// Cash only: does the customer need change?
    ChoosingChange,
    /// Cash only: which bill will the customer pay with?
    ChoosingChangeAmount,
    CollectingComment,
    ConfirmingOrder,
}

/// The in-progress, uncommitted order of one checkout dialog.
///
/// Mutated only by the flow controller; nothing is persisted from here
/// until the final commit.
#[derive(Debug, Clone, Default)]
pub struct DraftOrder {
    /// Cart contents captured at checkout start.
    pub cart_snapshot: Vec<CartLine>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<Phone>,
    pub delivery_method: Option<DeliveryMethod>,
    pub delivery_address: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub change_requested: bool,
    pub change_amount: Option<ChangeBill>,
    pub comment: Option<String>,
}

impl DraftOrder {
    /// Order total, always recomputed from the snapshot.
    #[must_use]
    pub fn total(&self) -> Money {
        self.cart_snapshot.iter().map(CartLine::line_total).sum()
    }

    /// Whether every field required for a commit is filled.
    #[must_use]
    pub fn is_commit_eligible(&self) -> bool {
        !self.cart_snapshot.is_empty()
            && self.customer_name.is_some()
            && self.customer_phone.is_some()
            && self.delivery_method.is_some()
            && self.payment_method.is_some()
            && self.delivery_address.is_some()
    }

    /// Convert into a persistable order, or `None` when fields are
    /// still missing.
    #[must_use]
    pub fn to_new_order(&self) -> Option<NewOrder> {
        if !self.is_commit_eligible() {
            return None;
        }
        Some(NewOrder {
            customer_name: self.customer_name.clone()?,
            customer_phone: self.customer_phone.clone()?,
            delivery_method: self.delivery_method?,
            delivery_address: self.delivery_address.clone()?,
            payment_method: self.payment_method?,
            change_requested: self.change_requested,
            change_amount: self.change_amount,
            comment: self.comment.clone(),
            total: self.total(),
            items: self.cart_snapshot.clone(),
        })
    }
}

/// One user's live checkout dialog.
#[derive(Debug, Clone)]
pub struct Session {
    pub state: CheckoutState,
    pub draft: DraftOrder,
}

impl Session {
    #[must_use]
    pub fn new(state: CheckoutState, draft: DraftOrder) -> Self {
        Self { state, draft }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn snapshot() -> Vec<CartLine> {
        vec![CartLine {
            product_code: "salmon".to_string(),
            name: "Филе лосося".to_string(),
            unit_price: Money::rubles(1780),
            quantity: dec!(0.5),
        }]
    }

    #[test]
    fn test_total_recomputed_from_snapshot() {
        let draft = DraftOrder {
            cart_snapshot: snapshot(),
            ..DraftOrder::default()
        };
        assert_eq!(draft.total(), Money::rubles(890));
    }

    #[test]
    fn test_commit_eligibility_requires_all_fields() {
        let mut draft = DraftOrder {
            cart_snapshot: snapshot(),
            customer_name: Some("Иван".to_string()),
            customer_phone: Some(Phone::parse("89991234567").unwrap()),
            delivery_method: Some(DeliveryMethod::Pickup),
            delivery_address: Some("самовывоз".to_string()),
            payment_method: Some(PaymentMethod::Cash),
            ..DraftOrder::default()
        };
        assert!(draft.is_commit_eligible());

        draft.cart_snapshot.clear();
        assert!(!draft.is_commit_eligible());
        assert!(draft.to_new_order().is_none());
    }

    #[test]
    fn test_to_new_order_carries_total() {
        let draft = DraftOrder {
            cart_snapshot: snapshot(),
            customer_name: Some("Иван".to_string()),
            customer_phone: Some(Phone::parse("+79991234567").unwrap()),
            delivery_method: Some(DeliveryMethod::Pickup),
            delivery_address: Some("самовывоз".to_string()),
            payment_method: Some(PaymentMethod::Cash),
            ..DraftOrder::default()
        };
        let order = draft.to_new_order().unwrap();
        assert_eq!(order.total, Money::rubles(890));
        assert_eq!(order.items.len(), 1);
    }
}
