//! Pending actions: what a user asked the bot to do next in a given chat.
//!
//! A user who starts a multi-step command (e.g. a report) leaves a pending
//! action behind; the next bare message from that user in that chat is routed
//! to the action's handler.

use anyhow::{anyhow, bail, Result};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

/// One pending action per user per chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PendingKey {
    pub user_id: i64,
    pub chat_id: i64,
}

impl PendingKey {
    pub fn new(user_id: i64, chat_id: i64) -> Self {
        Self { user_id, chat_id }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PendingAction {
    /// The next message is the body of a user report
    Report,
}

impl PendingAction {
    /// Code stored in the database.
    pub fn code(&self) -> &'static str {
        match self {
            PendingAction::Report => "report",
        }
    }
}

impl FromStr for PendingAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "report" => Ok(PendingAction::Report),
            other => bail!("Unknown pending action '{}'", other),
        }
    }
}

impl fmt::Display for PendingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Keyed storage of pending actions.
pub trait PendingActionStore {
    fn lookup(&self, key: PendingKey) -> Result<Option<PendingAction>>;

    /// Insert or replace.
    fn set(&self, key: PendingKey, action: PendingAction) -> Result<()>;

    /// Remove and return the action, if any.
    fn clear(&self, key: PendingKey) -> Result<Option<PendingAction>>;

    /// Replace the pending action for `key`; `None` clears it.
    ///
    /// Returns the previous action only when it was actually cleared or
    /// replaced by a different one.
    fn reset(&self, key: PendingKey, action: Option<PendingAction>) -> Result<Option<PendingAction>> {
        match (self.lookup(key)?, action) {
            (Some(_), None) => self.clear(key),
            (Some(previous), Some(next)) if previous != next => {
                self.set(key, next)?;
                Ok(Some(previous))
            }
            (Some(_), Some(_)) => Ok(None),
            (None, Some(next)) => {
                self.set(key, next)?;
                Ok(None)
            }
            (None, None) => Ok(None),
        }
    }
}

/// Process-local store, for tests and single-process bots.
#[derive(Debug, Default)]
pub struct InMemoryPendingActions {
    actions: Mutex<HashMap<PendingKey, PendingAction>>,
}

impl InMemoryPendingActions {
    pub fn new() -> Self {
        Self::default()
    }

    fn actions(&self) -> Result<std::sync::MutexGuard<'_, HashMap<PendingKey, PendingAction>>> {
        self.actions
            .lock()
            .map_err(|_| anyhow!("Pending action store lock poisoned"))
    }
}

impl PendingActionStore for InMemoryPendingActions {
    fn lookup(&self, key: PendingKey) -> Result<Option<PendingAction>> {
        Ok(self.actions()?.get(&key).copied())
    }

    fn set(&self, key: PendingKey, action: PendingAction) -> Result<()> {
        self.actions()?.insert(key, action);
        Ok(())
    }

    fn clear(&self, key: PendingKey) -> Result<Option<PendingAction>> {
        Ok(self.actions()?.remove(&key))
    }
}
