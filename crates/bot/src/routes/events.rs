//! The dialog event endpoint.
//!
//! The messaging transport (a webhook bridge or a poller) posts each
//! inbound user action here and delivers the returned [`Reply`] back to
//! the chat.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use chefport_core::ChatId;

use crate::checkout::{Event, Reply};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// One inbound user action: a button press (`callback_data`) or a
/// free-text message (`text`). `callback_data` wins when both are set.
#[derive(Debug, Deserialize)]
pub struct BotEvent {
    pub user_id: i64,
    pub callback_data: Option<String>,
    pub text: Option<String>,
}

impl BotEvent {
    fn into_event(self) -> Result<(ChatId, Event)> {
        let user = ChatId::new(self.user_id);
        if let Some(data) = self.callback_data {
            let event = Event::from_callback_data(&data)
                .ok_or_else(|| AppError::BadRequest(format!("unknown callback data: {data}")))?;
            return Ok((user, event));
        }
        match self.text {
            Some(text) => Ok((user, Event::Text(text))),
            None => Err(AppError::BadRequest(
                "event carries neither callback_data nor text".to_string(),
            )),
        }
    }
}

pub async fn handle_event(
    State(state): State<AppState>,
    Json(payload): Json<BotEvent>,
) -> Result<Json<Reply>> {
    let (user, event) = payload.into_event()?;
    let reply = state.sessions().turn(state.flow(), user, event).await?;
    Ok(Json(reply))
}
