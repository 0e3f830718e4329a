use std::time::Duration;

/// Core error type for the bot.
///
/// Adapter crates map their library errors (ssh2, sqlx, teloxide) into this
/// type so the router can turn any failure into a single reply instead of
/// unwinding the dispatch loop.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    /// Network or authentication failure while reaching the remote host.
    #[error("{0}")]
    RemoteConnection(String),

    /// The session was established but running or reading the command failed.
    #[error("{0}")]
    RemoteExecution(String),

    #[error("remote command timed out after {0:?}")]
    RemoteTimeout(Duration),

    #[error("{0}")]
    Store(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("external error: {0}")]
    External(String),
}

impl Error {
    pub fn is_remote_connection(&self) -> bool {
        matches!(self, Error::RemoteConnection(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
