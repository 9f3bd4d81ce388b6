//! Translation catalog synchronization for the bot, plus the pending-action
//! storage its message routing relies on.

pub mod config;
pub mod db;
pub mod i18n;
pub mod logging;
pub mod pending;
pub mod routing;
