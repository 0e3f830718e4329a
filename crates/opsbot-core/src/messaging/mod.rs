//! Transport-neutral messaging types (Telegram today).

pub mod port;
pub mod types;
