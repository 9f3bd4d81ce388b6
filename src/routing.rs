//! Routing of bare (non-command) messages to pending-action handlers.

use crate::pending::{PendingAction, PendingActionStore, PendingKey};
use anyhow::{bail, Result};
use std::collections::HashMap;
use tracing::debug;

/// The parts of an incoming chat message routing needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// Absent for channel posts and service messages
    pub sender_id: Option<i64>,
    pub chat_id: i64,
    pub text: Option<String>,
}

pub type PendingActionHandler = fn(&IncomingMessage) -> Result<()>;

#[derive(Clone, Default)]
pub struct PendingActionRouter {
    handlers: HashMap<PendingAction, PendingActionHandler>,
}

impl PendingActionRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, action: PendingAction, handler: PendingActionHandler) -> Self {
        self.handlers.insert(action, handler);
        self
    }

    /// Consume the sender's pending action in this chat and run its handler.
    ///
    /// Returns whether a handler ran. Messages without a sender or without
    /// text are left alone.
    pub fn dispatch_bare_message<S>(&self, store: &S, message: &IncomingMessage) -> Result<bool>
    where
        S: PendingActionStore + ?Sized,
    {
        let (Some(sender_id), Some(_)) = (message.sender_id, &message.text) else {
            return Ok(false);
        };

        let key = PendingKey::new(sender_id, message.chat_id);
        let Some(action) = store.reset(key, None)? else {
            return Ok(false);
        };

        let Some(handler) = self.handlers.get(&action) else {
            bail!("No handler registered for pending action '{}'", action);
        };

        debug!(user_id = sender_id, chat_id = message.chat_id, action = %action, "Dispatching pending action");
        handler(message)?;
        Ok(true)
    }
}
