//! Order inspection and status management.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use chefport_core::{ChatId, OrderId, OrderStatus, PaymentStatus};

use crate::error::Result;
use crate::models::Order;
use crate::state::AppState;
use crate::stores::OrderStore as _;

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = state.flow().backend().order(id).await?;
    Ok(Json(order))
}

/// Status change request from an operator tool.
#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: OrderStatus,
    pub payment_status: Option<PaymentStatus>,
    /// Operator chat id, for the audit trail.
    pub actor: Option<i64>,
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(change): Json<StatusChange>,
) -> Result<Json<Order>> {
    let backend = state.flow().backend();
    backend
        .update_status(
            id,
            change.status,
            change.payment_status,
            change.actor.map(ChatId::new),
        )
        .await?;
    let order = backend.order(id).await?;
    Ok(Json(order))
}
