//! Store contracts the checkout flow depends on.
//!
//! The controller only sees these traits; [`pg::PgBackend`] implements
//! them over `PostgreSQL` for production and [`memory::MemoryBackend`]
//! over process-local maps for tests and DB-less runs.

pub mod memory;
pub mod pg;

use rust_decimal::Decimal;
use thiserror::Error;

use chefport_core::{AddressId, ChatId, OrderId, OrderStatus, PaymentStatus};

use crate::models::{Address, CartLine, NewOrder, Order, ProfileFields, UserProfile};

/// Errors surfaced by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The referenced row does not exist (or belongs to another user).
    #[error("not found")]
    NotFound,

    /// A stored value could not be mapped back into a domain type.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// The requested order status change violates the status graph.
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: OrderStatus,
        to: OrderStatus,
    },
}

/// Cart persistence: one row per (user, product) with a signed
/// quantity accumulator.
pub trait CartStore {
    /// The user's cart, joined with live catalog name and price.
    async fn cart(&self, user: ChatId) -> Result<Vec<CartLine>, StoreError>;

    /// Add `delta` (possibly negative) to the quantity of a product.
    ///
    /// A resulting quantity ≤ 0 deletes the row; the cart never holds a
    /// non-positive quantity.
    async fn apply_delta(
        &self,
        user: ChatId,
        product_code: &str,
        delta: Decimal,
    ) -> Result<(), StoreError>;

    /// Remove every cart row of the user.
    async fn clear(&self, user: ChatId) -> Result<(), StoreError>;

    /// Whether the product is still in the catalog and marked
    /// available.
    async fn product_available(&self, product_code: &str) -> Result<bool, StoreError>;
}

/// Per-user saved contact profile.
pub trait ProfileStore {
    async fn profile(&self, user: ChatId) -> Result<Option<UserProfile>, StoreError>;

    /// Create the profile or update it in place.
    async fn upsert_profile(&self, user: ChatId, fields: &ProfileFields)
    -> Result<(), StoreError>;
}

/// Saved delivery addresses with the at-most-one-default invariant.
pub trait AddressStore {
    /// All addresses of the user, default first.
    async fn addresses(&self, user: ChatId) -> Result<Vec<Address>, StoreError>;

    async fn add_address(
        &self,
        user: ChatId,
        text: &str,
        label: &str,
        is_default: bool,
    ) -> Result<AddressId, StoreError>;

    /// Make `id` the user's single default address.
    ///
    /// Clears the flag on every other address and sets it on the target
    /// in one transaction, so no observer sees zero or two defaults.
    async fn set_default(&self, user: ChatId, id: AddressId) -> Result<(), StoreError>;

    async fn delete_address(&self, user: ChatId, id: AddressId) -> Result<(), StoreError>;
}

/// Order aggregate persistence.
pub trait OrderStore {
    /// Persist the order header, its line items, and the initial `new`
    /// history row in one transaction.
    async fn create_order(&self, user: ChatId, order: &NewOrder) -> Result<OrderId, StoreError>;

    /// Load a full order aggregate with items and history.
    async fn order(&self, id: OrderId) -> Result<Order, StoreError>;

    /// Append a status audit row without touching the header.
    async fn append_history(
        &self,
        id: OrderId,
        status: OrderStatus,
        payment_status: PaymentStatus,
        actor: Option<ChatId>,
        comment: Option<&str>,
    ) -> Result<(), StoreError>;

    /// Move the order to `next`, validating against the status graph,
    /// and append the matching history row.
    async fn update_status(
        &self,
        id: OrderId,
        next: OrderStatus,
        payment_status: Option<PaymentStatus>,
        actor: Option<ChatId>,
    ) -> Result<(), StoreError>;
}

/// Everything the checkout flow needs from persistence.
pub trait Backend: CartStore + ProfileStore + AddressStore + OrderStore + Send + Sync {}

impl<T> Backend for T where T: CartStore + ProfileStore + AddressStore + OrderStore + Send + Sync {}
