//! Outbound message rendering.
//!
//! Every dialog step produces exactly one [`Reply`]: the text shown to
//! the customer plus an inline keyboard of next actions. The transport
//! layer decides how to deliver it based on [`ReplyKind`].

use serde::Serialize;

use chefport_core::{ChangeBill, DeliveryMethod, Money, OrderId, PaymentMethod};

use crate::models::Address;

use super::draft::DraftOrder;

/// How the transport should deliver a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    /// Edit the current dialog message in place (preferred).
    Edit,
    /// Send a fresh message.
    Send,
    /// Short popup notice, no message mutation.
    Alert,
}

/// One inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Button {
    pub label: String,
    /// Callback data fed back into [`super::Event::from_callback_data`].
    pub data: String,
}

impl Button {
    fn new(label: &str, data: &str) -> Self {
        Self {
            label: label.to_string(),
            data: data.to_string(),
        }
    }
}

/// The single outbound rendering of a dialog step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub kind: ReplyKind,
    pub text: String,
    /// Rows of inline buttons; empty for plain texts and alerts.
    pub keyboard: Vec<Vec<Button>>,
}

impl Reply {
    fn edit(text: String, keyboard: Vec<Vec<Button>>) -> Self {
        Self {
            kind: ReplyKind::Edit,
            text,
            keyboard,
        }
    }

    fn send(text: String, keyboard: Vec<Vec<Button>>) -> Self {
        Self {
            kind: ReplyKind::Send,
            text,
            keyboard,
        }
    }

    fn alert(text: &str) -> Self {
        Self {
            kind: ReplyKind::Alert,
            text: text.to_string(),
            keyboard: Vec::new(),
        }
    }
}

fn cancel_row() -> Vec<Button> {
    vec![Button::new("❌ Отменить", "cancel_checkout")]
}

pub fn empty_cart() -> Reply {
    Reply::alert("Ваша корзина пуста")
}

pub fn unavailable_products(names: &[String]) -> Reply {
    Reply::alert(&format!(
        "Эти товары сейчас недоступны: {}. Обновите корзину и попробуйте снова.",
        names.join(", ")
    ))
}

pub fn ask_name() -> Reply {
    Reply::send(
        "📝 Оформление заказа\n\nКак вас зовут?".to_string(),
        vec![cancel_row()],
    )
}

pub fn invalid_name() -> Reply {
    Reply::send(
        "Имя слишком короткое. Введите имя (минимум 2 символа):".to_string(),
        vec![cancel_row()],
    )
}

pub fn ask_phone(name: &str) -> Reply {
    Reply::send(
        format!("Приятно познакомиться, {name}!\n\n📞 Введите номер телефона (например, +79991234567):"),
        vec![cancel_row()],
    )
}

pub fn invalid_phone() -> Reply {
    Reply::send(
        "Неверный формат номера. Введите телефон, начиная с +7 или 8, например +79991234567:"
            .to_string(),
        vec![cancel_row()],
    )
}

/// Delivery-method choice. With a saved profile the contact details are
/// shown with an option to edit them.
pub fn ask_delivery_method(prefilled: Option<(&str, &str)>) -> Reply {
    let mut text = String::new();
    let mut keyboard = Vec::new();

    if let Some((name, phone)) = prefilled {
        text.push_str(&format!("👤 {name}, {phone}\n\n"));
        keyboard.push(vec![Button::new(
            "✏️ Изменить контакты",
            "checkout:edit_profile",
        )]);
    }
    text.push_str("🚚 Как вы хотите получить заказ?");

    keyboard.insert(
        0,
        vec![
            Button::new("🏪 Самовывоз", "delivery:pickup"),
            Button::new("🚗 Доставка", "delivery:delivery"),
        ],
    );
    keyboard.push(cancel_row());
    Reply::edit(text, keyboard)
}

pub fn ask_saved_address(addresses: &[Address]) -> Reply {
    let mut keyboard: Vec<Vec<Button>> = addresses
        .iter()
        .map(|a| {
            let marker = if a.is_default { "⭐ " } else { "" };
            vec![Button::new(
                &format!("{marker}{}: {}", a.label, a.text),
                &format!("select_delivery_address:{}", a.id),
            )]
        })
        .collect();
    keyboard.push(vec![Button::new(
        "➕ Новый адрес",
        "enter_new_delivery_address",
    )]);
    keyboard.push(cancel_row());
    Reply::edit("📍 Выберите адрес доставки:".to_string(), keyboard)
}

pub fn ask_new_address() -> Reply {
    Reply::send(
        "📍 Введите адрес доставки (улица, дом, квартира):".to_string(),
        vec![cancel_row()],
    )
}

pub fn invalid_address() -> Reply {
    Reply::send(
        "Адрес слишком короткий. Укажите улицу, дом и квартиру (минимум 10 символов):".to_string(),
        vec![cancel_row()],
    )
}

pub fn ask_save_address(address: &str) -> Reply {
    Reply::send(
        format!("Сохранить адрес «{address}» для следующих заказов?"),
        vec![
            vec![
                Button::new("✅ Да", "save_new_addr:yes"),
                Button::new("Нет", "save_new_addr:no"),
            ],
            cancel_row(),
        ],
    )
}

pub fn ask_payment_method() -> Reply {
    Reply::edit(
        "💳 Выберите способ оплаты:".to_string(),
        vec![
            vec![
                Button::new("💵 Наличными", "payment:cash"),
                Button::new("💳 Картой при получении", "payment:card"),
            ],
            vec![Button::new("🌐 Онлайн", "payment:online")],
            cancel_row(),
        ],
    )
}

pub fn online_payment_unavailable() -> Reply {
    Reply::alert("Онлайн-оплата пока в разработке. Выберите другой способ.")
}

pub fn ask_change() -> Reply {
    Reply::edit(
        "💵 Нужна сдача?".to_string(),
        vec![
            vec![
                Button::new("Да", "change:yes"),
                Button::new("Нет", "change:no"),
            ],
            cancel_row(),
        ],
    )
}

pub fn ask_change_amount() -> Reply {
    let bills: Vec<Button> = ChangeBill::ALL
        .iter()
        .map(|b| Button::new(&b.to_string(), &format!("bill:{}", b.rubles())))
        .collect();
    Reply::edit("С какой купюры подготовить сдачу?".to_string(), vec![bills, cancel_row()])
}

pub fn ask_comment() -> Reply {
    Reply::send(
        "💬 Комментарий к заказу (домофон, время, пожелания) — или пропустите:".to_string(),
        vec![
            vec![Button::new("⏭ Пропустить", "skip_comment")],
            cancel_row(),
        ],
    )
}

/// Full draft summary with Confirm/Cancel.
pub fn confirmation(draft: &DraftOrder) -> Reply {
    let mut text = String::from("🧾 Проверьте заказ:\n\n");

    for line in &draft.cart_snapshot {
        text.push_str(&format!(
            "• {} — {} × {} = {}\n",
            line.name,
            line.quantity.normalize(),
            line.unit_price,
            line.line_total()
        ));
    }
    text.push_str(&format!("\n💰 Итого: {}\n", draft.total()));

    if let (Some(name), Some(phone)) = (&draft.customer_name, &draft.customer_phone) {
        text.push_str(&format!("\n👤 {name}, {phone}\n"));
    }
    match draft.delivery_method {
        Some(DeliveryMethod::Pickup) => {
            if let Some(address) = &draft.delivery_address {
                text.push_str(&format!("🏪 Самовывоз: {address}\n"));
            }
        }
        Some(DeliveryMethod::Delivery) => {
            if let Some(address) = &draft.delivery_address {
                text.push_str(&format!("🚗 Доставка: {address}\n"));
            }
        }
        None => {}
    }
    match draft.payment_method {
        Some(PaymentMethod::Cash) => {
            text.push_str("💵 Оплата наличными");
            if let Some(bill) = draft.change_amount {
                text.push_str(&format!(", сдача с {bill}"));
            }
            text.push('\n');
        }
        Some(PaymentMethod::Card) => text.push_str("💳 Оплата картой при получении\n"),
        Some(PaymentMethod::Online) | None => {}
    }
    if let Some(comment) = &draft.comment {
        text.push_str(&format!("💬 {comment}\n"));
    }

    Reply::send(
        text,
        vec![
            vec![Button::new("✅ Подтвердить", "confirm_order")],
            cancel_row(),
        ],
    )
}

pub fn committed(id: OrderId, total: Money) -> Reply {
    Reply::send(
        format!(
            "🎉 Заказ №{id} оформлен!\n\n💰 Сумма: {total}\n\nМы свяжемся с вами для подтверждения."
        ),
        Vec::new(),
    )
}

pub fn cancelled() -> Reply {
    Reply::send(
        "Оформление отменено. Корзина сохранена — вернуться к заказу можно в любой момент."
            .to_string(),
        Vec::new(),
    )
}

pub fn no_active_session() -> Reply {
    Reply::alert("Оформление не начато. Нажмите «Оформить заказ» в корзине.")
}

pub fn address_not_found() -> Reply {
    Reply::alert("Адрес не найден, выберите другой")
}

/// Order detail sent to operators after a commit.
#[must_use]
pub fn admin_order_text(id: OrderId, user: chefport_core::ChatId, draft: &DraftOrder) -> String {
    let mut text = format!("🆕 Новый заказ №{id} (клиент {user})\n\n");
    for line in &draft.cart_snapshot {
        text.push_str(&format!(
            "• {} — {} × {}\n",
            line.name,
            line.quantity.normalize(),
            line.unit_price
        ));
    }
    text.push_str(&format!("\n💰 Итого: {}\n", draft.total()));
    if let (Some(name), Some(phone)) = (&draft.customer_name, &draft.customer_phone) {
        text.push_str(&format!("👤 {name}, {phone}\n"));
    }
    if let Some(address) = &draft.delivery_address {
        text.push_str(&format!("📍 {address}\n"));
    }
    if let Some(comment) = &draft.comment {
        text.push_str(&format!("💬 {comment}\n"));
    }
    text
}
