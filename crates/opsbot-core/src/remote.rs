//! Remote-execution bridge: command string in, reply text out.

use async_trait::async_trait;
use tracing::{error, warn};

use crate::{errors::Error, utils::redact_secrets, Result};

/// Raw result of one remote command.
#[derive(Clone, Debug, Default)]
pub struct RemoteOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Hexagonal port for running a shell command on the configured host.
///
/// Implementations open a fresh connection per call and must release it on
/// every exit path.
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    async fn execute(&self, command: &str) -> Result<RemoteOutput>;
}

/// Turn raw output into reply text: stdout then stderr, decoded as UTF-8,
/// literal `\n` / `\t` escapes unfolded, one trailing newline removed.
pub fn combined_text(output: RemoteOutput) -> Result<String> {
    let mut bytes = output.stdout;
    bytes.extend_from_slice(&output.stderr);

    let text = String::from_utf8(bytes)
        .map_err(|e| Error::RemoteExecution(format!("output is not valid UTF-8: {e}")))?;

    let mut text = text.replace("\\n", "\n").replace("\\t", "\t");
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

/// Run `command` and decode its output, keeping the typed error.
pub async fn run_text(remote: &dyn RemoteExecutor, command: &str) -> Result<String> {
    let output = remote.execute(command).await?;
    combined_text(output)
}

/// Run `command` and always produce a reply: output on success, an error
/// message embedding the cause otherwise.
pub async fn run_for_reply(
    remote: &dyn RemoteExecutor,
    command: &str,
    secrets: &[String],
) -> String {
    match run_text(remote, command).await {
        Ok(text) => text,
        Err(e) => error_reply(command, &e, secrets),
    }
}

/// Error reply with `secrets` masked; the cause may quote connection parameters.
pub fn error_reply(command: &str, e: &Error, secrets: &[String]) -> String {
    let reply = if e.is_remote_connection() {
        warn!(command, error = %e, "ssh connection failed");
        format!("Ошибка подключения к SSH: {e}")
    } else {
        error!(command, error = %e, "remote command failed");
        format!("Произошла ошибка: {e}")
    };
    redact_secrets(&reply, secrets)
}
