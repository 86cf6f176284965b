//! Process-local store backend.
//!
//! Mirrors the `PostgreSQL` backend's semantics over plain maps, for
//! tests and demo runs without a database. Guarded by a synchronous
//! mutex; no lock is held across an await point.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use rust_decimal::Decimal;

use chefport_core::{
    AddressId, ChatId, Money, OrderId, OrderStatus, PaymentStatus, Phone,
};

use crate::models::{Address, CartLine, NewOrder, Order, ProfileFields, StatusHistoryEntry, UserProfile};

use super::{AddressStore, CartStore, OrderStore, ProfileStore, StoreError};

#[derive(Debug, Clone)]
struct Product {
    name: String,
    unit_price: Money,
    is_available: bool,
}

#[derive(Debug, Default)]
struct Inner {
    products: HashMap<String, Product>,
    /// Per-user cart lines in insertion order.
    carts: HashMap<ChatId, Vec<(String, Decimal)>>,
    profiles: HashMap<ChatId, UserProfile>,
    addresses: Vec<Address>,
    next_address_id: i32,
    orders: Vec<Order>,
    next_order_id: i32,
}

/// In-memory backend with the same observable behaviour as
/// [`super::pg::PgBackend`].
#[derive(Debug, Default)]
pub struct MemoryBackend {
    inner: Mutex<Inner>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed a catalog product, available by default.
    pub fn add_product(&self, code: &str, name: &str, unit_price: Money) {
        self.lock().products.insert(
            code.to_string(),
            Product {
                name: name.to_string(),
                unit_price,
                is_available: true,
            },
        );
    }

    /// Toggle a seeded product's availability.
    pub fn set_available(&self, code: &str, is_available: bool) {
        if let Some(product) = self.lock().products.get_mut(code) {
            product.is_available = is_available;
        }
    }
}

impl CartStore for MemoryBackend {
    async fn cart(&self, user: ChatId) -> Result<Vec<CartLine>, StoreError> {
        let inner = self.lock();
        let Some(lines) = inner.carts.get(&user) else {
            return Ok(Vec::new());
        };
        // Lines whose product vanished from the catalog are dropped,
        // matching the SQL join.
        Ok(lines
            .iter()
            .filter_map(|(code, quantity)| {
                inner.products.get(code).map(|product| CartLine {
                    product_code: code.clone(),
                    name: product.name.clone(),
                    unit_price: product.unit_price,
                    quantity: *quantity,
                })
            })
            .collect())
    }

    async fn apply_delta(
        &self,
        user: ChatId,
        product_code: &str,
        delta: Decimal,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let lines = inner.carts.entry(user).or_default();

        match lines.iter_mut().find(|(code, _)| code == product_code) {
            Some((_, quantity)) => {
                *quantity += delta;
                if *quantity <= Decimal::ZERO {
                    lines.retain(|(code, _)| code != product_code);
                }
            }
            None if delta > Decimal::ZERO => {
                lines.push((product_code.to_string(), delta));
            }
            None => {}
        }
        Ok(())
    }

    async fn clear(&self, user: ChatId) -> Result<(), StoreError> {
        self.lock().carts.remove(&user);
        Ok(())
    }

    async fn product_available(&self, product_code: &str) -> Result<bool, StoreError> {
        Ok(self
            .lock()
            .products
            .get(product_code)
            .is_some_and(|p| p.is_available))
    }
}

impl ProfileStore for MemoryBackend {
    async fn profile(&self, user: ChatId) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.lock().profiles.get(&user).cloned())
    }

    async fn upsert_profile(
        &self,
        user: ChatId,
        fields: &ProfileFields,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let now = Utc::now();
        match inner.profiles.get_mut(&user) {
            Some(profile) => {
                profile.full_name.clone_from(&fields.full_name);
                profile.phone = fields.phone.clone();
                profile.city.clone_from(&fields.city);
                profile.street.clone_from(&fields.street);
                profile.delivery_type = fields.delivery_type;
                profile.updated_at = now;
            }
            None => {
                inner.profiles.insert(
                    user,
                    UserProfile {
                        user_id: user,
                        full_name: fields.full_name.clone(),
                        phone: fields.phone.clone(),
                        city: fields.city.clone(),
                        street: fields.street.clone(),
                        house: None,
                        flat: None,
                        entrance: None,
                        floor: None,
                        delivery_type: fields.delivery_type,
                        consent_marketing: false,
                        created_at: now,
                        updated_at: now,
                    },
                );
            }
        }
        Ok(())
    }
}

impl AddressStore for MemoryBackend {
    async fn addresses(&self, user: ChatId) -> Result<Vec<Address>, StoreError> {
        let inner = self.lock();
        let mut addresses: Vec<Address> = inner
            .addresses
            .iter()
            .filter(|a| a.user_id == user)
            .cloned()
            .collect();
        // Default first, then newest first.
        addresses.sort_by_key(|a| (!a.is_default, std::cmp::Reverse(a.id.as_i32())));
        Ok(addresses)
    }

    async fn add_address(
        &self,
        user: ChatId,
        text: &str,
        label: &str,
        is_default: bool,
    ) -> Result<AddressId, StoreError> {
        let mut inner = self.lock();
        if is_default {
            for address in inner.addresses.iter_mut().filter(|a| a.user_id == user) {
                address.is_default = false;
            }
        }
        inner.next_address_id += 1;
        let id = AddressId::new(inner.next_address_id);
        inner.addresses.push(Address {
            id,
            user_id: user,
            label: label.to_string(),
            text: text.to_string(),
            is_default,
        });
        Ok(id)
    }

    async fn set_default(&self, user: ChatId, id: AddressId) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if !inner
            .addresses
            .iter()
            .any(|a| a.id == id && a.user_id == user)
        {
            return Err(StoreError::NotFound);
        }
        for address in inner.addresses.iter_mut().filter(|a| a.user_id == user) {
            address.is_default = address.id == id;
        }
        Ok(())
    }

    async fn delete_address(&self, user: ChatId, id: AddressId) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let before = inner.addresses.len();
        inner.addresses.retain(|a| !(a.id == id && a.user_id == user));
        if inner.addresses.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

impl OrderStore for MemoryBackend {
    async fn create_order(&self, user: ChatId, order: &NewOrder) -> Result<OrderId, StoreError> {
        let mut inner = self.lock();
        inner.next_order_id += 1;
        let id = OrderId::new(inner.next_order_id);
        let now = Utc::now();
        inner.orders.push(Order {
            id,
            user_id: user,
            customer_name: order.customer_name.clone(),
            customer_phone: order.customer_phone.clone(),
            delivery_method: order.delivery_method,
            delivery_address: order.delivery_address.clone(),
            payment_method: order.payment_method,
            change_requested: order.change_requested,
            change_amount: order.change_amount,
            comment: order.comment.clone(),
            status: OrderStatus::New,
            payment_status: PaymentStatus::NotPaid,
            total: order.total,
            items: order.items.clone(),
            history: vec![StatusHistoryEntry {
                status: OrderStatus::New,
                payment_status: PaymentStatus::NotPaid,
                changed_by: Some(user),
                changed_at: now,
                comment: Some("Создан заказ".to_string()),
            }],
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn order(&self, id: OrderId) -> Result<Order, StoreError> {
        self.lock()
            .orders
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn append_history(
        &self,
        id: OrderId,
        status: OrderStatus,
        payment_status: PaymentStatus,
        actor: Option<ChatId>,
        comment: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let order = inner
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(StoreError::NotFound)?;
        order.history.push(StatusHistoryEntry {
            status,
            payment_status,
            changed_by: actor,
            changed_at: Utc::now(),
            comment: comment.map(ToString::to_string),
        });
        Ok(())
    }

    async fn update_status(
        &self,
        id: OrderId,
        next: OrderStatus,
        payment_status: Option<PaymentStatus>,
        actor: Option<ChatId>,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let order = inner
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(StoreError::NotFound)?;

        if !order.status.can_transition_to(next) {
            return Err(StoreError::InvalidTransition {
                from: order.status,
                to: next,
            });
        }

        let now = Utc::now();
        order.status = next;
        if let Some(payment) = payment_status {
            order.payment_status = payment;
        }
        order.updated_at = now;
        order.history.push(StatusHistoryEntry {
            status: next,
            payment_status: order.payment_status,
            changed_by: actor,
            changed_at: now,
            comment: Some(format!("Статус изменён на {next}")),
        });
        Ok(())
    }
}

/// Profile seeding helpers.
impl MemoryBackend {
    /// Seed a profile directly, bypassing the upsert path.
    pub fn add_profile(&self, profile: UserProfile) {
        self.lock().profiles.insert(profile.user_id, profile);
    }

    /// Parse-and-seed convenience for tests.
    pub fn seed_profile(
        &self,
        user: ChatId,
        full_name: &str,
        phone: &str,
        city: &str,
    ) -> Result<(), chefport_core::PhoneError> {
        let now = Utc::now();
        self.add_profile(UserProfile {
            user_id: user,
            full_name: full_name.to_string(),
            phone: Phone::parse(phone)?,
            city: city.to_string(),
            street: None,
            house: None,
            flat: None,
            entrance: None,
            floor: None,
            delivery_type: chefport_core::DeliveryMethod::Pickup,
            consent_marketing: false,
            created_at: now,
            updated_at: now,
        });
        Ok(())
    }
}
