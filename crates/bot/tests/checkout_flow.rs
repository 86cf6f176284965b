//! End-to-end dialog scenarios over the in-memory backend.

use std::sync::Mutex;

use rust_decimal_macros::dec;

use chefport_bot::checkout::{
    CheckoutFlow, CheckoutSettings, CheckoutState, Event, StepOutcome,
};
use chefport_bot::notify::{NotifyError, NotifySink};
use chefport_bot::stores::memory::MemoryBackend;
use chefport_bot::stores::{AddressStore as _, CartStore as _, OrderStore as _, StoreError};
use chefport_core::{ChangeBill, ChatId, DeliveryMethod, Money, OrderId, OrderStatus, PaymentStatus};

const PICKUP_ADDRESS: &str = "г. Смоленск, ул. Багратиона, д. 2Б";
const ADMIN: ChatId = ChatId::new(878_283_648);

/// Captures every sent message instead of delivering it.
#[derive(Default)]
struct RecordingNotifier {
    messages: Mutex<Vec<(ChatId, String)>>,
}

impl RecordingNotifier {
    fn messages(&self) -> Vec<(ChatId, String)> {
        self.messages.lock().unwrap().clone()
    }
}

impl NotifySink for RecordingNotifier {
    async fn send(&self, chat: ChatId, text: &str) -> Result<(), NotifyError> {
        self.messages.lock().unwrap().push((chat, text.to_string()));
        Ok(())
    }
}

/// Fails every delivery.
struct FailingNotifier;

impl NotifySink for FailingNotifier {
    async fn send(&self, _chat: ChatId, _text: &str) -> Result<(), NotifyError> {
        Err(NotifyError::Rejected("chat not found".to_string()))
    }
}

fn settings() -> CheckoutSettings {
    CheckoutSettings {
        pickup_address: PICKUP_ADDRESS.to_string(),
        shop_city: "Смоленск".to_string(),
        admin_chat_ids: vec![ADMIN],
        enforce_availability: false,
    }
}

fn flow_with<N: NotifySink>(notifier: N) -> CheckoutFlow<MemoryBackend, N> {
    let backend = MemoryBackend::new();
    backend.add_product("salmon", "Филе Атлантического лосося", Money::rubles(1780));
    backend.add_product("seabass", "Сибас", Money::rubles(1300));
    CheckoutFlow::new(backend, notifier, settings())
}

async fn seed_cart(flow: &CheckoutFlow<MemoryBackend, impl NotifySink>, user: ChatId) {
    flow.backend()
        .apply_delta(user, "salmon", dec!(0.5))
        .await
        .unwrap();
}

/// Feed one event into an in-progress dialog, panicking if it already
/// ended.
async fn step<N: NotifySink>(
    flow: &CheckoutFlow<MemoryBackend, N>,
    user: ChatId,
    outcome: StepOutcome,
    event: Event,
) -> StepOutcome {
    match outcome {
        StepOutcome::InProgress(session, _) => flow.handle(user, session, event).await.unwrap(),
        other => panic!("dialog ended early: {other:?}"),
    }
}

fn callback(data: &str) -> Event {
    Event::from_callback_data(data).expect("known callback data")
}

#[tokio::test]
async fn pickup_cash_no_change() {
    let flow = flow_with(RecordingNotifier::default());
    let user = ChatId::new(1);
    seed_cart(&flow, user).await;

    let mut outcome = flow.start(user).await.unwrap();
    outcome = step(&flow, user, outcome, Event::Text("Иван".to_string())).await;
    outcome = step(&flow, user, outcome, Event::Text("89991234567".to_string())).await;
    outcome = step(&flow, user, outcome, callback("delivery:pickup")).await;
    outcome = step(&flow, user, outcome, callback("payment:cash")).await;
    outcome = step(&flow, user, outcome, callback("change:no")).await;
    outcome = step(&flow, user, outcome, callback("skip_comment")).await;
    let outcome = step(&flow, user, outcome, callback("confirm_order")).await;

    let StepOutcome::Committed(id, reply) = outcome else {
        panic!("expected a committed order, got {outcome:?}");
    };
    assert!(reply.text.contains("890 ₽"));

    let order = flow.backend().order(id).await.unwrap();
    assert_eq!(order.total, Money::rubles(890));
    assert_eq!(order.delivery_address, PICKUP_ADDRESS);
    assert_eq!(order.delivery_method, DeliveryMethod::Pickup);
    assert_eq!(order.customer_phone.as_ref(), "+79991234567");
    assert_eq!(order.status, OrderStatus::New);
    assert_eq!(order.payment_status, PaymentStatus::NotPaid);
    assert_eq!(order.history.len(), 1);
    assert_eq!(order.history[0].status, OrderStatus::New);
    assert!(!order.change_requested);
    assert!(order.comment.is_none());

    // Cart cleared, admin notified.
    assert!(flow.backend().cart(user).await.unwrap().is_empty());
    let messages = flow.notifier().messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, ADMIN);
    assert!(messages[0].1.contains("890 ₽"));
}

#[tokio::test]
async fn saved_profile_skips_contact_collection() {
    let flow = flow_with(RecordingNotifier::default());
    let user = ChatId::new(2);
    seed_cart(&flow, user).await;
    flow.backend()
        .seed_profile(user, "Анна", "+79012345678", "Смоленск")
        .unwrap();
    flow.backend()
        .add_address(user, "ул. Ленина, д. 5, кв. 12", "Дом", true)
        .await
        .unwrap();

    let outcome = flow.start(user).await.unwrap();
    let StepOutcome::InProgress(session, reply) = &outcome else {
        panic!("expected an in-progress dialog");
    };
    assert_eq!(session.state, CheckoutState::ChoosingDeliveryMethod);
    assert!(reply.text.contains("Анна"));
    assert!(reply.text.contains("+79012345678"));

    let outcome = step(&flow, user, outcome, callback("delivery:delivery")).await;
    let StepOutcome::InProgress(session, reply) = &outcome else {
        panic!("expected the saved-address list");
    };
    assert_eq!(session.state, CheckoutState::ChoosingAddress);
    assert!(reply.keyboard[0][0].label.starts_with('⭐'));

    let data = reply.keyboard[0][0].data.clone();
    let outcome = step(&flow, user, outcome, callback(&data)).await;
    let StepOutcome::InProgress(session, _) = &outcome else {
        panic!("expected the payment prompt");
    };
    assert_eq!(session.state, CheckoutState::ChoosingPaymentMethod);
    assert_eq!(
        session.draft.delivery_address.as_deref(),
        Some("ул. Ленина, д. 5, кв. 12")
    );
}

#[tokio::test]
async fn invalid_phone_reprompts_without_mutation() {
    let flow = flow_with(RecordingNotifier::default());
    let user = ChatId::new(3);
    seed_cart(&flow, user).await;

    let outcome = flow.start(user).await.unwrap();
    let outcome = step(&flow, user, outcome, Event::Text("Иван".to_string())).await;
    let outcome = step(&flow, user, outcome, Event::Text("12345".to_string())).await;

    let StepOutcome::InProgress(session, reply) = &outcome else {
        panic!("expected a re-prompt");
    };
    assert_eq!(session.state, CheckoutState::CollectingPhone);
    assert!(session.draft.customer_phone.is_none());
    assert!(reply.text.contains("Неверный формат"));

    // A second bad attempt changes nothing either.
    let outcome = step(&flow, user, outcome, Event::Text("not a phone".to_string())).await;
    let StepOutcome::InProgress(session, _) = &outcome else {
        panic!("expected a re-prompt");
    };
    assert_eq!(session.state, CheckoutState::CollectingPhone);
    assert!(session.draft.customer_phone.is_none());
}

#[tokio::test]
async fn change_from_2000_not_validated_against_total() {
    let flow = flow_with(RecordingNotifier::default());
    let user = ChatId::new(4);
    seed_cart(&flow, user).await;

    let mut outcome = flow.start(user).await.unwrap();
    outcome = step(&flow, user, outcome, Event::Text("Иван".to_string())).await;
    outcome = step(&flow, user, outcome, Event::Text("+79991234567".to_string())).await;
    outcome = step(&flow, user, outcome, callback("delivery:pickup")).await;
    outcome = step(&flow, user, outcome, callback("payment:cash")).await;
    outcome = step(&flow, user, outcome, callback("change:yes")).await;
    outcome = step(&flow, user, outcome, callback("bill:2000")).await;
    outcome = step(&flow, user, outcome, callback("skip_comment")).await;
    let outcome = step(&flow, user, outcome, callback("confirm_order")).await;

    let StepOutcome::Committed(id, _) = outcome else {
        panic!("expected a committed order");
    };
    let order = flow.backend().order(id).await.unwrap();
    // The bill is below nothing: 2000 on an 890 order is stored as-is.
    assert_eq!(order.total, Money::rubles(890));
    assert!(order.change_requested);
    assert_eq!(order.change_amount, Some(ChangeBill::TwoThousand));
}

#[tokio::test]
async fn online_payment_reprompts_in_place() {
    let flow = flow_with(RecordingNotifier::default());
    let user = ChatId::new(5);
    seed_cart(&flow, user).await;

    let mut outcome = flow.start(user).await.unwrap();
    outcome = step(&flow, user, outcome, Event::Text("Иван".to_string())).await;
    outcome = step(&flow, user, outcome, Event::Text("+79991234567".to_string())).await;
    outcome = step(&flow, user, outcome, callback("delivery:pickup")).await;
    let outcome = step(&flow, user, outcome, callback("payment:online")).await;

    let StepOutcome::InProgress(session, reply) = &outcome else {
        panic!("expected a re-prompt");
    };
    assert_eq!(session.state, CheckoutState::ChoosingPaymentMethod);
    assert!(session.draft.payment_method.is_none());
    assert!(reply.text.contains("в разработке"));
}

#[tokio::test]
async fn cancel_preserves_cart_from_any_state() {
    let flow = flow_with(RecordingNotifier::default());
    let user = ChatId::new(6);

    // Drive the dialog to each state, cancel, and verify the cart
    // survives.
    let scripts: &[&[Event]] = &[
        &[],
        &[Event::Text("Иван".to_string())],
        &[
            Event::Text("Иван".to_string()),
            Event::Text("+79991234567".to_string()),
        ],
        &[
            Event::Text("Иван".to_string()),
            Event::Text("+79991234567".to_string()),
            callback("delivery:delivery"),
        ],
        &[
            Event::Text("Иван".to_string()),
            Event::Text("+79991234567".to_string()),
            callback("delivery:delivery"),
            Event::Text("ул. Николаева, д. 12, кв. 3".to_string()),
        ],
        &[
            Event::Text("Иван".to_string()),
            Event::Text("+79991234567".to_string()),
            callback("delivery:pickup"),
        ],
        &[
            Event::Text("Иван".to_string()),
            Event::Text("+79991234567".to_string()),
            callback("delivery:pickup"),
            callback("payment:cash"),
        ],
        &[
            Event::Text("Иван".to_string()),
            Event::Text("+79991234567".to_string()),
            callback("delivery:pickup"),
            callback("payment:cash"),
            callback("change:yes"),
        ],
        &[
            Event::Text("Иван".to_string()),
            Event::Text("+79991234567".to_string()),
            callback("delivery:pickup"),
            callback("payment:card"),
        ],
        &[
            Event::Text("Иван".to_string()),
            Event::Text("+79991234567".to_string()),
            callback("delivery:pickup"),
            callback("payment:card"),
            callback("skip_comment"),
        ],
    ];

    for script in scripts {
        seed_cart(&flow, user).await;
        let mut outcome = flow.start(user).await.unwrap();
        for event in *script {
            outcome = step(&flow, user, outcome, event.clone()).await;
        }
        let outcome = step(&flow, user, outcome, Event::Cancel).await;
        assert!(matches!(outcome, StepOutcome::Finished(_)));
        assert_eq!(flow.backend().cart(user).await.unwrap().len(), 1);
        flow.backend().clear(user).await.unwrap();
    }
}

#[tokio::test]
async fn confirm_outside_confirmation_state_does_not_commit() {
    let flow = flow_with(RecordingNotifier::default());
    let user = ChatId::new(7);
    seed_cart(&flow, user).await;

    let mut outcome = flow.start(user).await.unwrap();
    outcome = step(&flow, user, outcome, Event::Text("Иван".to_string())).await;
    outcome = step(&flow, user, outcome, Event::Text("+79991234567".to_string())).await;
    outcome = step(&flow, user, outcome, callback("delivery:pickup")).await;

    // Premature confirm: the payment prompt is repeated, nothing is
    // persisted.
    let outcome = step(&flow, user, outcome, callback("confirm_order")).await;
    let StepOutcome::InProgress(session, _) = &outcome else {
        panic!("expected a re-prompt");
    };
    assert_eq!(session.state, CheckoutState::ChoosingPaymentMethod);
    assert!(matches!(
        flow.backend().order(OrderId::new(1)).await,
        Err(StoreError::NotFound)
    ));
    assert_eq!(flow.backend().cart(user).await.unwrap().len(), 1);
}

#[tokio::test]
async fn empty_cart_refuses_checkout() {
    let flow = flow_with(RecordingNotifier::default());
    let outcome = flow.start(ChatId::new(8)).await.unwrap();
    let StepOutcome::Finished(reply) = outcome else {
        panic!("expected an immediate finish");
    };
    assert!(reply.text.contains("пуста"));
}

#[tokio::test]
async fn new_address_saved_as_first_default() {
    let flow = flow_with(RecordingNotifier::default());
    let user = ChatId::new(9);
    seed_cart(&flow, user).await;

    let mut outcome = flow.start(user).await.unwrap();
    outcome = step(&flow, user, outcome, Event::Text("Иван".to_string())).await;
    outcome = step(&flow, user, outcome, Event::Text("+79991234567".to_string())).await;
    outcome = step(&flow, user, outcome, callback("delivery:delivery")).await;

    // No saved addresses: straight to free-text collection; too-short
    // input re-prompts.
    let outcome = step(&flow, user, outcome, Event::Text("коротко".to_string())).await;
    let StepOutcome::InProgress(session, _) = &outcome else {
        panic!("expected a re-prompt");
    };
    assert_eq!(session.state, CheckoutState::CollectingAddress);
    assert!(session.draft.delivery_address.is_none());

    let outcome = step(
        &flow,
        user,
        outcome,
        Event::Text("ул. Николаева, д. 12, кв. 3".to_string()),
    )
    .await;
    let outcome = step(&flow, user, outcome, callback("save_new_addr:yes")).await;
    let StepOutcome::InProgress(session, _) = &outcome else {
        panic!("expected the payment prompt");
    };
    assert_eq!(session.state, CheckoutState::ChoosingPaymentMethod);

    let addresses = flow.backend().addresses(user).await.unwrap();
    assert_eq!(addresses.len(), 1);
    assert!(addresses[0].is_default);
    assert_eq!(addresses[0].text, "ул. Николаева, д. 12, кв. 3");
}

#[tokio::test]
async fn notification_failure_does_not_fail_commit() {
    let flow = flow_with(FailingNotifier);
    let user = ChatId::new(10);
    seed_cart(&flow, user).await;

    let mut outcome = flow.start(user).await.unwrap();
    outcome = step(&flow, user, outcome, Event::Text("Иван".to_string())).await;
    outcome = step(&flow, user, outcome, Event::Text("+79991234567".to_string())).await;
    outcome = step(&flow, user, outcome, callback("delivery:pickup")).await;
    outcome = step(&flow, user, outcome, callback("payment:card")).await;
    outcome = step(&flow, user, outcome, callback("skip_comment")).await;
    let outcome = step(&flow, user, outcome, callback("confirm_order")).await;

    let StepOutcome::Committed(id, _) = outcome else {
        panic!("expected a committed order despite failing notifications");
    };
    assert!(flow.backend().order(id).await.is_ok());
    assert!(flow.backend().cart(user).await.unwrap().is_empty());
}

#[tokio::test]
async fn commit_upserts_profile_and_restart_prefills() {
    let flow = flow_with(RecordingNotifier::default());
    let user = ChatId::new(11);
    seed_cart(&flow, user).await;

    let mut outcome = flow.start(user).await.unwrap();
    outcome = step(&flow, user, outcome, Event::Text("Пётр".to_string())).await;
    outcome = step(&flow, user, outcome, Event::Text("89219876543".to_string())).await;
    outcome = step(&flow, user, outcome, callback("delivery:pickup")).await;
    outcome = step(&flow, user, outcome, callback("payment:card")).await;
    outcome = step(&flow, user, outcome, Event::Text("позвоните заранее".to_string())).await;
    let outcome = step(&flow, user, outcome, callback("confirm_order")).await;
    let StepOutcome::Committed(id, _) = outcome else {
        panic!("expected a committed order");
    };
    let order = flow.backend().order(id).await.unwrap();
    assert_eq!(order.comment.as_deref(), Some("позвоните заранее"));

    // Second checkout starts at the delivery choice with the saved
    // contact.
    seed_cart(&flow, user).await;
    let outcome = flow.start(user).await.unwrap();
    let StepOutcome::InProgress(session, reply) = outcome else {
        panic!("expected an in-progress dialog");
    };
    assert_eq!(session.state, CheckoutState::ChoosingDeliveryMethod);
    assert_eq!(session.draft.customer_name.as_deref(), Some("Пётр"));
    assert!(reply.text.contains("+79219876543"));
}

#[tokio::test]
async fn unavailable_product_blocks_checkout_when_enforced() {
    let backend = MemoryBackend::new();
    backend.add_product("salmon", "Филе лосося", Money::rubles(1780));
    let mut settings = settings();
    settings.enforce_availability = true;
    let flow = CheckoutFlow::new(backend, RecordingNotifier::default(), settings);
    let user = ChatId::new(12);

    flow.backend()
        .apply_delta(user, "salmon", dec!(0.5))
        .await
        .unwrap();
    flow.backend().set_available("salmon", false);

    let outcome = flow.start(user).await.unwrap();
    let StepOutcome::Finished(reply) = outcome else {
        panic!("expected checkout to be refused");
    };
    assert!(reply.text.contains("Филе лосося"));

    // Back in stock: checkout proceeds and the cart was untouched.
    flow.backend().set_available("salmon", true);
    let outcome = flow.start(user).await.unwrap();
    assert!(matches!(outcome, StepOutcome::InProgress(_, _)));
}
