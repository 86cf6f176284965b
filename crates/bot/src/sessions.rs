//! Live checkout dialogs, one per chat.
//!
//! The map lock is held only while a session is taken out or put back,
//! never across a store query or an outbound notification, so dialogs
//! of different users proceed independently.

use std::collections::HashMap;

use tokio::sync::Mutex;

use chefport_core::ChatId;

use crate::checkout::{CheckoutFlow, Event, FlowError, Reply, Session, StepOutcome, render};
use crate::notify::NotifySink;
use crate::stores::Backend;

/// Session map keyed by chat.
///
/// An abandoned session stays here until the user restarts checkout,
/// which silently replaces it.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<ChatId, Session>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one dialog turn: take the user's session out, feed the event
    /// through the flow, and put the follow-up session back.
    ///
    /// A failed turn puts the taken session back unchanged, so the user
    /// retries the current step instead of starting over.
    pub async fn turn<B: Backend, N: NotifySink>(
        &self,
        flow: &CheckoutFlow<B, N>,
        user: ChatId,
        event: Event,
    ) -> Result<Reply, FlowError> {
        let session = self.sessions.lock().await.remove(&user);

        let result = match &session {
            // `Start` always replaces a stale session.
            Some(session) => flow.handle(user, session.clone(), event).await,
            None if event == Event::Start => flow.start(user).await,
            None => {
                tracing::debug!(user = %user, "event without a live session");
                return Ok(render::no_active_session());
            }
        };

        match result {
            Ok(StepOutcome::InProgress(next, reply)) => {
                self.sessions.lock().await.insert(user, next);
                Ok(reply)
            }
            Ok(StepOutcome::Finished(reply) | StepOutcome::Committed(_, reply)) => Ok(reply),
            Err(error) => {
                if let Some(session) = session {
                    self.sessions.lock().await.insert(user, session);
                }
                Err(error)
            }
        }
    }
}
