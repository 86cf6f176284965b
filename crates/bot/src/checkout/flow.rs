//! The checkout flow controller.
//!
//! Pure dialog logic over the store contracts: takes the current
//! [`Session`] plus one [`Event`], returns the next session and the
//! single [`Reply`] to deliver. Nothing is persisted before the final
//! commit; validation failures re-prompt in place.

use thiserror::Error;

use chefport_core::{ChatId, DeliveryMethod, OrderId, PaymentMethod, Phone};

use crate::config::BotConfig;
use crate::models::ProfileFields;
use crate::notify::NotifySink;
use crate::stores::{Backend, StoreError};

use super::draft::{CheckoutState, DraftOrder, Session};
use super::event::Event;
use super::render::{self, Reply};
use super::validate;

/// Injected checkout policy and constants.
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    /// Address substituted when the customer chooses pickup.
    pub pickup_address: String,
    /// City written into profiles; the shop delivers in one city.
    pub shop_city: String,
    /// Operators notified about every committed order.
    pub admin_chat_ids: Vec<ChatId>,
    /// Reject checkout when a cart product is marked unavailable.
    pub enforce_availability: bool,
}

impl From<&BotConfig> for CheckoutSettings {
    fn from(config: &BotConfig) -> Self {
        Self {
            pickup_address: config.pickup_address.clone(),
            shop_city: config.shop_city.clone(),
            admin_chat_ids: config.admin_chat_ids.clone(),
            enforce_availability: config.enforce_availability,
        }
    }
}

/// Errors escaping the dialog (everything user-recoverable is a
/// re-prompting [`Reply`] instead).
#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Commit reached with required draft fields missing. Indicates a
    /// transition bug, not bad user input.
    #[error("draft order is not commit-eligible")]
    DraftIncomplete,
}

/// Result of feeding one event into the flow.
#[derive(Debug)]
pub enum StepOutcome {
    /// Dialog continues; store this session and deliver the reply.
    InProgress(Session, Reply),
    /// Dialog over without an order (cancel, empty cart); drop the
    /// session.
    Finished(Reply),
    /// Order committed; drop the session.
    Committed(OrderId, Reply),
}

/// The per-user checkout dialog driver.
///
/// Stateless itself: every call receives the session explicitly, so one
/// instance serves all users concurrently.
pub struct CheckoutFlow<B, N> {
    backend: B,
    notifier: N,
    settings: CheckoutSettings,
}

impl<B: Backend, N: NotifySink> CheckoutFlow<B, N> {
    pub fn new(backend: B, notifier: N, settings: CheckoutSettings) -> Self {
        Self {
            backend,
            notifier,
            settings,
        }
    }

    pub const fn backend(&self) -> &B {
        &self.backend
    }

    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    pub const fn settings(&self) -> &CheckoutSettings {
        &self.settings
    }

    /// Begin a checkout dialog, replacing any stale session.
    ///
    /// With a saved profile the name/phone steps are skipped and the
    /// dialog starts at the delivery-method choice.
    pub async fn start(&self, user: ChatId) -> Result<StepOutcome, FlowError> {
        let cart_snapshot = self.backend.cart(user).await?;
        if cart_snapshot.is_empty() {
            return Ok(StepOutcome::Finished(render::empty_cart()));
        }

        if self.settings.enforce_availability {
            let mut missing = Vec::new();
            for line in &cart_snapshot {
                if !self.backend.product_available(&line.product_code).await? {
                    missing.push(line.name.clone());
                }
            }
            if !missing.is_empty() {
                return Ok(StepOutcome::Finished(render::unavailable_products(&missing)));
            }
        }

        let mut draft = DraftOrder {
            cart_snapshot,
            ..DraftOrder::default()
        };

        if let Some(profile) = self.backend.profile(user).await? {
            draft.customer_name = Some(profile.full_name);
            draft.customer_phone = Some(profile.phone);
            let reply = render::ask_delivery_method(prefilled_contact(&draft));
            return Ok(StepOutcome::InProgress(
                Session::new(CheckoutState::ChoosingDeliveryMethod, draft),
                reply,
            ));
        }

        Ok(StepOutcome::InProgress(
            Session::new(CheckoutState::CollectingName, draft),
            render::ask_name(),
        ))
    }

    /// Feed one event into a live dialog.
    pub async fn handle(
        &self,
        user: ChatId,
        mut session: Session,
        event: Event,
    ) -> Result<StepOutcome, FlowError> {
        // Global escapes, valid in every state.
        match event {
            Event::Cancel => return Ok(StepOutcome::Finished(render::cancelled())),
            Event::Start => return self.start(user).await,
            _ => {}
        }

        match (session.state, event) {
            (CheckoutState::CollectingName, Event::Text(input)) => {
                match validate::validate_name(&input) {
                    Ok(name) => {
                        let reply = render::ask_phone(&name);
                        session.draft.customer_name = Some(name);
                        session.state = CheckoutState::CollectingPhone;
                        Ok(StepOutcome::InProgress(session, reply))
                    }
                    Err(_) => Ok(StepOutcome::InProgress(session, render::invalid_name())),
                }
            }

            (CheckoutState::CollectingPhone, Event::Text(input)) => {
                match Phone::parse(&input) {
                    Ok(phone) => {
                        session.draft.customer_phone = Some(phone);
                        session.state = CheckoutState::ChoosingDeliveryMethod;
                        let reply = render::ask_delivery_method(prefilled_contact(&session.draft));
                        Ok(StepOutcome::InProgress(session, reply))
                    }
                    Err(_) => Ok(StepOutcome::InProgress(session, render::invalid_phone())),
                }
            }

            (CheckoutState::ChoosingDeliveryMethod, Event::EditProfile) => {
                session.draft.customer_name = None;
                session.draft.customer_phone = None;
                session.state = CheckoutState::CollectingName;
                Ok(StepOutcome::InProgress(session, render::ask_name()))
            }

            (CheckoutState::ChoosingDeliveryMethod, Event::Delivery(DeliveryMethod::Pickup)) => {
                session.draft.delivery_method = Some(DeliveryMethod::Pickup);
                session.draft.delivery_address = Some(self.settings.pickup_address.clone());
                session.state = CheckoutState::ChoosingPaymentMethod;
                Ok(StepOutcome::InProgress(session, render::ask_payment_method()))
            }

            (CheckoutState::ChoosingDeliveryMethod, Event::Delivery(DeliveryMethod::Delivery)) => {
                session.draft.delivery_method = Some(DeliveryMethod::Delivery);
                let addresses = self.backend.addresses(user).await?;
                if addresses.is_empty() {
                    session.state = CheckoutState::CollectingAddress;
                    Ok(StepOutcome::InProgress(session, render::ask_new_address()))
                } else {
                    session.state = CheckoutState::ChoosingAddress;
                    Ok(StepOutcome::InProgress(
                        session,
                        render::ask_saved_address(&addresses),
                    ))
                }
            }

            (CheckoutState::ChoosingAddress, Event::SelectAddress(id)) => {
                let addresses = self.backend.addresses(user).await?;
                let Some(address) = addresses.iter().find(|a| a.id == id) else {
                    // Stale button; re-list without touching the draft.
                    let reply = if addresses.is_empty() {
                        render::address_not_found()
                    } else {
                        render::ask_saved_address(&addresses)
                    };
                    return Ok(StepOutcome::InProgress(session, reply));
                };
                session.draft.delivery_address = Some(address.text.clone());
                session.state = CheckoutState::ChoosingPaymentMethod;
                Ok(StepOutcome::InProgress(session, render::ask_payment_method()))
            }

            (CheckoutState::ChoosingAddress, Event::EnterNewAddress) => {
                session.state = CheckoutState::CollectingAddress;
                Ok(StepOutcome::InProgress(session, render::ask_new_address()))
            }

            (CheckoutState::CollectingAddress, Event::Text(input)) => {
                match validate::validate_address(&input) {
                    Ok(address) => {
                        let reply = render::ask_save_address(&address);
                        session.draft.delivery_address = Some(address);
                        session.state = CheckoutState::ConfirmingNewAddressSave;
                        Ok(StepOutcome::InProgress(session, reply))
                    }
                    Err(_) => Ok(StepOutcome::InProgress(session, render::invalid_address())),
                }
            }

            (CheckoutState::ConfirmingNewAddressSave, Event::SaveNewAddress(save)) => {
                if save && let Some(address) = &session.draft.delivery_address {
                    // The first address a user ever saves becomes the
                    // default.
                    let first = self.backend.addresses(user).await?.is_empty();
                    self.backend
                        .add_address(user, address, "Адрес", first)
                        .await?;
                }
                session.state = CheckoutState::ChoosingPaymentMethod;
                Ok(StepOutcome::InProgress(session, render::ask_payment_method()))
            }

            (CheckoutState::ChoosingPaymentMethod, Event::Payment(PaymentMethod::Online)) => Ok(
                StepOutcome::InProgress(session, render::online_payment_unavailable()),
            ),

            (CheckoutState::ChoosingPaymentMethod, Event::Payment(PaymentMethod::Card)) => {
                session.draft.payment_method = Some(PaymentMethod::Card);
                session.state = CheckoutState::CollectingComment;
                Ok(StepOutcome::InProgress(session, render::ask_comment()))
            }

            (CheckoutState::ChoosingPaymentMethod, Event::Payment(PaymentMethod::Cash)) => {
                session.draft.payment_method = Some(PaymentMethod::Cash);
                session.state = CheckoutState::ChoosingChange;
                Ok(StepOutcome::InProgress(session, render::ask_change()))
            }

            (CheckoutState::ChoosingChange, Event::Change(false)) => {
                session.draft.change_requested = false;
                session.draft.change_amount = None;
                session.state = CheckoutState::CollectingComment;
                Ok(StepOutcome::InProgress(session, render::ask_comment()))
            }

            (CheckoutState::ChoosingChange, Event::Change(true)) => {
                session.draft.change_requested = true;
                session.state = CheckoutState::ChoosingChangeAmount;
                Ok(StepOutcome::InProgress(session, render::ask_change_amount()))
            }

            (CheckoutState::ChoosingChangeAmount, Event::Bill(bill)) => {
                // Deliberately not validated against the total.
                session.draft.change_amount = Some(bill);
                session.state = CheckoutState::CollectingComment;
                Ok(StepOutcome::InProgress(session, render::ask_comment()))
            }

            (CheckoutState::CollectingComment, Event::Text(input)) => {
                let trimmed = input.trim();
                session.draft.comment =
                    (!trimmed.is_empty()).then(|| trimmed.to_string());
                session.state = CheckoutState::ConfirmingOrder;
                let reply = render::confirmation(&session.draft);
                Ok(StepOutcome::InProgress(session, reply))
            }

            (CheckoutState::CollectingComment, Event::SkipComment) => {
                session.draft.comment = None;
                session.state = CheckoutState::ConfirmingOrder;
                let reply = render::confirmation(&session.draft);
                Ok(StepOutcome::InProgress(session, reply))
            }

            (CheckoutState::ConfirmingOrder, Event::Confirm) => self.commit(user, session).await,

            // Anything else re-prompts the current state unchanged.
            (_, _) => {
                let reply = self.reprompt(user, &session).await?;
                Ok(StepOutcome::InProgress(session, reply))
            }
        }
    }

    /// The only point where the dialog writes to the order store.
    async fn commit(&self, user: ChatId, session: Session) -> Result<StepOutcome, FlowError> {
        let draft = &session.draft;
        let order = draft.to_new_order().ok_or(FlowError::DraftIncomplete)?;

        let street = match order.delivery_method {
            DeliveryMethod::Delivery => Some(order.delivery_address.clone()),
            DeliveryMethod::Pickup => None,
        };
        self.backend
            .upsert_profile(
                user,
                &ProfileFields {
                    full_name: order.customer_name.clone(),
                    phone: order.customer_phone.clone(),
                    city: self.settings.shop_city.clone(),
                    street,
                    delivery_type: order.delivery_method,
                },
            )
            .await?;

        let id = self.backend.create_order(user, &order).await?;
        self.backend.clear(user).await?;

        // Best-effort: a bounced notification never affects the
        // committed order.
        let admin_text = render::admin_order_text(id, user, draft);
        for &admin in &self.settings.admin_chat_ids {
            if let Err(error) = self.notifier.send(admin, &admin_text).await {
                tracing::warn!(%error, order_id = %id, chat = %admin, "admin notification failed");
            }
        }

        tracing::info!(order_id = %id, user = %user, total = %order.total, "order committed");
        Ok(StepOutcome::Committed(id, render::committed(id, order.total)))
    }

    /// Re-render the prompt of the current state after an unexpected
    /// event (e.g. free text where a button press was awaited).
    async fn reprompt(&self, user: ChatId, session: &Session) -> Result<Reply, FlowError> {
        Ok(match session.state {
            CheckoutState::CollectingName => render::ask_name(),
            CheckoutState::CollectingPhone => {
                let name = session.draft.customer_name.as_deref().unwrap_or("");
                render::ask_phone(name)
            }
            CheckoutState::ChoosingDeliveryMethod => {
                render::ask_delivery_method(prefilled_contact(&session.draft))
            }
            CheckoutState::ChoosingAddress => {
                let addresses = self.backend.addresses(user).await?;
                render::ask_saved_address(&addresses)
            }
            CheckoutState::CollectingAddress => render::ask_new_address(),
            CheckoutState::ConfirmingNewAddressSave => {
                let address = session.draft.delivery_address.as_deref().unwrap_or("");
                render::ask_save_address(address)
            }
            CheckoutState::ChoosingPaymentMethod => render::ask_payment_method(),
            CheckoutState::ChoosingChange => render::ask_change(),
            CheckoutState::ChoosingChangeAmount => render::ask_change_amount(),
            CheckoutState::CollectingComment => render::ask_comment(),
            CheckoutState::ConfirmingOrder => render::confirmation(&session.draft),
        })
    }
}

fn prefilled_contact(draft: &DraftOrder) -> Option<(&str, &str)> {
    match (&draft.customer_name, &draft.customer_phone) {
        (Some(name), Some(phone)) => Some((name.as_str(), phone.as_ref())),
        _ => None,
    }
}
