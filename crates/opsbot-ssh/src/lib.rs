//! SSH adapter (ssh2 / libssh2).
//!
//! Implements the `opsbot-core` RemoteExecutor port: one connection per command,
//! password authentication, host key accepted on first use.

use std::{
    io::Read,
    net::{TcpStream, ToSocketAddrs},
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;
use secrecy::ExposeSecret;
use ssh2::{HashType, Session};
use tracing::debug;

use opsbot_core::{
    config::{Config, SshConfig},
    errors::Error,
    remote::{RemoteExecutor, RemoteOutput},
    Result,
};

/// Extra time granted to the blocking task after libssh2's own timeout.
const JOIN_GRACE: Duration = Duration::from_secs(2);

#[derive(Clone, Debug)]
pub struct SshExecutor {
    target: Arc<SshConfig>,
    timeout: Duration,
}

impl SshExecutor {
    pub fn new(cfg: &Config) -> Self {
        Self::with_target(cfg.ssh.clone(), cfg.remote_timeout)
    }

    pub fn with_target(target: SshConfig, timeout: Duration) -> Self {
        Self {
            target: Arc::new(target),
            timeout,
        }
    }
}

#[async_trait]
impl RemoteExecutor for SshExecutor {
    async fn execute(&self, command: &str) -> Result<RemoteOutput> {
        let target = self.target.clone();
        let timeout = self.timeout;
        let command = command.to_string();

        let task = tokio::task::spawn_blocking(move || exec_blocking(&target, timeout, &command));

        match tokio::time::timeout(timeout + JOIN_GRACE, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join)) => Err(Error::RemoteExecution(format!("ssh task failed: {join}"))),
            Err(_) => Err(Error::RemoteTimeout(timeout)),
        }
    }
}

/// Authenticated session that disconnects when dropped, whatever the exit path.
struct Connection {
    session: Session,
}

impl Drop for Connection {
    fn drop(&mut self) {
        let _ = self.session.disconnect(None, "bye", None);
    }
}

fn connect(target: &SshConfig, timeout: Duration) -> Result<Connection> {
    let conn_err = |e: &dyn std::fmt::Display| Error::RemoteConnection(e.to_string());

    let addr = (target.host.as_str(), target.port)
        .to_socket_addrs()
        .map_err(|e| conn_err(&e))?
        .next()
        .ok_or_else(|| {
            Error::RemoteConnection(format!("cannot resolve {}:{}", target.host, target.port))
        })?;
    let tcp = TcpStream::connect_timeout(&addr, timeout).map_err(|e| conn_err(&e))?;

    let mut session = Session::new().map_err(|e| conn_err(&e))?;
    session.set_tcp_stream(tcp);
    session.set_timeout(u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX));
    session.handshake().map_err(|e| conn_err(&e))?;
    let conn = Connection { session };

    // No pinning: whatever key the host presents is accepted.
    if let Some(hash) = conn.session.host_key_hash(HashType::Sha256) {
        debug!(host = %target.host, fingerprint = %hex(hash), "ssh host key");
    }

    conn.session
        .userauth_password(&target.username, target.password.expose_secret())
        .map_err(|e| conn_err(&e))?;
    if !conn.session.authenticated() {
        return Err(Error::RemoteConnection(
            "SSH authentication failed".to_string(),
        ));
    }

    Ok(conn)
}

fn exec_blocking(target: &SshConfig, timeout: Duration, command: &str) -> Result<RemoteOutput> {
    let conn = connect(target, timeout)?;
    let exec_err = |e: &dyn std::fmt::Display| Error::RemoteExecution(e.to_string());

    let mut channel = conn.session.channel_session().map_err(|e| exec_err(&e))?;
    channel.exec(command).map_err(|e| exec_err(&e))?;

    let mut out = RemoteOutput::default();
    channel
        .read_to_end(&mut out.stdout)
        .map_err(|e| exec_err(&e))?;
    channel
        .stderr()
        .read_to_end(&mut out.stderr)
        .map_err(|e| exec_err(&e))?;

    let _ = channel.wait_close();
    debug!(
        command,
        exit_status = channel.exit_status().unwrap_or(-1),
        stdout_bytes = out.stdout.len(),
        stderr_bytes = out.stderr.len(),
        "remote command finished"
    );

    Ok(out)
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
