//! `PostgreSQL` store backend.
//!
//! One backend struct implements every store contract over a shared
//! connection pool. Multi-row writes (order creation, default-address
//! switching) run inside transactions.

use rust_decimal::Decimal;
use sqlx::{PgPool, Row as _, postgres::PgRow};

use chefport_core::{
    AddressId, ChangeBill, ChatId, Money, OrderId, OrderStatus, PaymentStatus, Phone,
};

use crate::models::{Address, CartLine, NewOrder, Order, ProfileFields, StatusHistoryEntry, UserProfile};

use super::{AddressStore, CartStore, OrderStore, ProfileStore, StoreError};

/// Store backend over `PostgreSQL`.
#[derive(Clone)]
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    /// Create a backend over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Parse a status-like TEXT column into its domain enum.
fn parse_column<T>(row: &PgRow, column: &str) -> Result<T, StoreError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw: String = row.try_get(column)?;
    raw.parse()
        .map_err(|e| StoreError::DataCorruption(format!("column {column}: {e}")))
}

fn change_amount_from_row(row: &PgRow) -> Result<Option<ChangeBill>, StoreError> {
    let raw: Option<i64> = row.try_get("change_amount")?;
    raw.map(|amount| {
        ChangeBill::from_rubles(amount).ok_or_else(|| {
            StoreError::DataCorruption(format!("unknown change denomination: {amount}"))
        })
    })
    .transpose()
}

impl CartStore for PgBackend {
    async fn cart(&self, user: ChatId) -> Result<Vec<CartLine>, StoreError> {
        let rows = sqlx::query(
            r"
            SELECT c.product_code, p.name, p.price_per_kg AS unit_price, c.quantity
            FROM cart_lines c
            JOIN products p ON p.code = c.product_code
            WHERE c.user_id = $1
            ORDER BY c.id
            ",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        let mut lines = Vec::with_capacity(rows.len());
        for row in rows {
            lines.push(CartLine {
                product_code: row.try_get("product_code")?,
                name: row.try_get("name")?,
                unit_price: row.try_get("unit_price")?,
                quantity: row.try_get("quantity")?,
            });
        }
        Ok(lines)
    }

    async fn apply_delta(
        &self,
        user: ChatId,
        product_code: &str,
        delta: Decimal,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<Decimal> = sqlx::query_scalar(
            r"
            SELECT quantity FROM cart_lines
            WHERE user_id = $1 AND product_code = $2
            FOR UPDATE
            ",
        )
        .bind(user)
        .bind(product_code)
        .fetch_optional(&mut *tx)
        .await?;

        let new_quantity = current.unwrap_or(Decimal::ZERO) + delta;

        if new_quantity <= Decimal::ZERO {
            sqlx::query(
                r"
                DELETE FROM cart_lines
                WHERE user_id = $1 AND product_code = $2
                ",
            )
            .bind(user)
            .bind(product_code)
            .execute(&mut *tx)
            .await?;
        } else {
            sqlx::query(
                r"
                INSERT INTO cart_lines (user_id, product_code, quantity)
                VALUES ($1, $2, $3)
                ON CONFLICT (user_id, product_code)
                DO UPDATE SET quantity = EXCLUDED.quantity
                ",
            )
            .bind(user)
            .bind(product_code)
            .bind(new_quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn clear(&self, user: ChatId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM cart_lines WHERE user_id = $1")
            .bind(user)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn product_available(&self, product_code: &str) -> Result<bool, StoreError> {
        let available: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM products WHERE code = $1 AND is_available)",
        )
        .bind(product_code)
        .fetch_one(&self.pool)
        .await?;
        Ok(available)
    }
}

impl ProfileStore for PgBackend {
    async fn profile(&self, user: ChatId) -> Result<Option<UserProfile>, StoreError> {
        let row = sqlx::query(
            r"
            SELECT user_id, full_name, phone, city, street, house, flat, entrance, floor,
                   delivery_type, consent_marketing, created_at, updated_at
            FROM user_profiles
            WHERE user_id = $1
            ",
        )
        .bind(user)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let phone: String = row.try_get("phone")?;
        let phone = Phone::parse(&phone)
            .map_err(|e| StoreError::DataCorruption(format!("invalid phone in profile: {e}")))?;

        Ok(Some(UserProfile {
            user_id: row.try_get("user_id")?,
            full_name: row.try_get("full_name")?,
            phone,
            city: row.try_get("city")?,
            street: row.try_get("street")?,
            house: row.try_get("house")?,
            flat: row.try_get("flat")?,
            entrance: row.try_get("entrance")?,
            floor: row.try_get("floor")?,
            delivery_type: parse_column(&row, "delivery_type")?,
            consent_marketing: row.try_get("consent_marketing")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        }))
    }

    async fn upsert_profile(
        &self,
        user: ChatId,
        fields: &ProfileFields,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO user_profiles (user_id, full_name, phone, city, street, delivery_type)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO UPDATE SET
                full_name = EXCLUDED.full_name,
                phone = EXCLUDED.phone,
                city = EXCLUDED.city,
                street = EXCLUDED.street,
                delivery_type = EXCLUDED.delivery_type,
                updated_at = now()
            ",
        )
        .bind(user)
        .bind(&fields.full_name)
        .bind(&fields.phone)
        .bind(&fields.city)
        .bind(&fields.street)
        .bind(fields.delivery_type.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

impl AddressStore for PgBackend {
    async fn addresses(&self, user: ChatId) -> Result<Vec<Address>, StoreError> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, label, address, is_default
            FROM user_addresses
            WHERE user_id = $1
            ORDER BY is_default DESC, id DESC
            ",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        let mut addresses = Vec::with_capacity(rows.len());
        for row in rows {
            addresses.push(Address {
                id: row.try_get("id")?,
                user_id: row.try_get("user_id")?,
                label: row.try_get("label")?,
                text: row.try_get("address")?,
                is_default: row.try_get("is_default")?,
            });
        }
        Ok(addresses)
    }

    async fn add_address(
        &self,
        user: ChatId,
        text: &str,
        label: &str,
        is_default: bool,
    ) -> Result<AddressId, StoreError> {
        let mut tx = self.pool.begin().await?;

        if is_default {
            sqlx::query("UPDATE user_addresses SET is_default = FALSE WHERE user_id = $1")
                .bind(user)
                .execute(&mut *tx)
                .await?;
        }

        let id: AddressId = sqlx::query_scalar(
            r"
            INSERT INTO user_addresses (user_id, label, address, is_default)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(user)
        .bind(label)
        .bind(text)
        .bind(is_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(id)
    }

    async fn set_default(&self, user: ChatId, id: AddressId) -> Result<(), StoreError> {
        // Clear-then-set runs inside one transaction so there is no
        // window with zero or two defaults.
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE user_addresses SET is_default = FALSE WHERE user_id = $1")
            .bind(user)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query(
            "UPDATE user_addresses SET is_default = TRUE WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_address(&self, user: ChatId, id: AddressId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM user_addresses WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

impl OrderStore for PgBackend {
    async fn create_order(&self, user: ChatId, order: &NewOrder) -> Result<OrderId, StoreError> {
        let mut tx = self.pool.begin().await?;

        let id: OrderId = sqlx::query_scalar(
            r"
            INSERT INTO orders (user_id, customer_name, customer_phone, delivery_method,
                                delivery_address, payment_method, change_requested,
                                change_amount, comment, status, payment_status, total)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            ",
        )
        .bind(user)
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .bind(order.delivery_method.to_string())
        .bind(&order.delivery_address)
        .bind(order.payment_method.to_string())
        .bind(order.change_requested)
        .bind(order.change_amount.map(ChangeBill::rubles))
        .bind(&order.comment)
        .bind(OrderStatus::New.to_string())
        .bind(PaymentStatus::NotPaid.to_string())
        .bind(order.total)
        .fetch_one(&mut *tx)
        .await?;

        for item in &order.items {
            sqlx::query(
                r"
                INSERT INTO order_items (order_id, product_code, name, unit_price, quantity)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(id)
            .bind(&item.product_code)
            .bind(&item.name)
            .bind(item.unit_price)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r"
            INSERT INTO order_history (order_id, status, payment_status, changed_by, comment)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(id)
        .bind(OrderStatus::New.to_string())
        .bind(PaymentStatus::NotPaid.to_string())
        .bind(user)
        .bind("Создан заказ")
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(id)
    }

    async fn order(&self, id: OrderId) -> Result<Order, StoreError> {
        let header = sqlx::query(
            r"
            SELECT id, user_id, customer_name, customer_phone, delivery_method,
                   delivery_address, payment_method, change_requested, change_amount,
                   comment, status, payment_status, total, created_at, updated_at
            FROM orders
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        let item_rows = sqlx::query(
            r"
            SELECT product_code, name, unit_price, quantity
            FROM order_items
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let mut items = Vec::with_capacity(item_rows.len());
        for row in item_rows {
            items.push(CartLine {
                product_code: row.try_get("product_code")?,
                name: row.try_get("name")?,
                unit_price: row.try_get("unit_price")?,
                quantity: row.try_get("quantity")?,
            });
        }

        let history_rows = sqlx::query(
            r"
            SELECT status, payment_status, changed_by, changed_at, comment
            FROM order_history
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let mut history = Vec::with_capacity(history_rows.len());
        for row in history_rows {
            history.push(StatusHistoryEntry {
                status: parse_column(&row, "status")?,
                payment_status: parse_column(&row, "payment_status")?,
                changed_by: row.try_get("changed_by")?,
                changed_at: row.try_get("changed_at")?,
                comment: row.try_get("comment")?,
            });
        }

        let phone: String = header.try_get("customer_phone")?;
        let customer_phone = Phone::parse(&phone)
            .map_err(|e| StoreError::DataCorruption(format!("invalid phone in order: {e}")))?;

        Ok(Order {
            id: header.try_get("id")?,
            user_id: header.try_get("user_id")?,
            customer_name: header.try_get("customer_name")?,
            customer_phone,
            delivery_method: parse_column(&header, "delivery_method")?,
            delivery_address: header.try_get("delivery_address")?,
            payment_method: parse_column(&header, "payment_method")?,
            change_requested: header.try_get("change_requested")?,
            change_amount: change_amount_from_row(&header)?,
            comment: header.try_get("comment")?,
            status: parse_column(&header, "status")?,
            payment_status: parse_column(&header, "payment_status")?,
            total: header.try_get::<Money, _>("total")?,
            items,
            history,
            created_at: header.try_get("created_at")?,
            updated_at: header.try_get("updated_at")?,
        })
    }

    async fn append_history(
        &self,
        id: OrderId,
        status: OrderStatus,
        payment_status: PaymentStatus,
        actor: Option<ChatId>,
        comment: Option<&str>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO order_history (order_id, status, payment_status, changed_by, comment)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(id)
        .bind(status.to_string())
        .bind(payment_status.to_string())
        .bind(actor)
        .bind(comment)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_status(
        &self,
        id: OrderId,
        next: OrderStatus,
        payment_status: Option<PaymentStatus>,
        actor: Option<ChatId>,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT status, payment_status FROM orders WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::NotFound)?;

        let current: OrderStatus = parse_column(&row, "status")?;
        let current_payment: PaymentStatus = parse_column(&row, "payment_status")?;

        if !current.can_transition_to(next) {
            return Err(StoreError::InvalidTransition {
                from: current,
                to: next,
            });
        }

        let resolved_payment = payment_status.unwrap_or(current_payment);

        sqlx::query(
            r"
            UPDATE orders
            SET status = $1, payment_status = $2, updated_at = now()
            WHERE id = $3
            ",
        )
        .bind(next.to_string())
        .bind(resolved_payment.to_string())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
            INSERT INTO order_history (order_id, status, payment_status, changed_by, comment)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(id)
        .bind(next.to_string())
        .bind(resolved_payment.to_string())
        .bind(actor)
        .bind(format!("Статус изменён на {next}"))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
