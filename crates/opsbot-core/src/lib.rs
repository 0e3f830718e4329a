//! Core domain + application logic for the remote-administration bot.
//!
//! This crate is intentionally framework-agnostic. Telegram / SSH / PostgreSQL
//! live behind ports (traits) implemented in adapter crates.

pub mod commands;
pub mod config;
pub mod conversation;
pub mod domain;
pub mod errors;
pub mod extract;
pub mod logging;
pub mod messaging;
pub mod remote;
pub mod router;
pub mod session;
pub mod store;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::{Error, Result};
