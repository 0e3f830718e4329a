use std::{env, path::PathBuf, time::Duration};

use secrecy::{ExposeSecret, SecretString};

use crate::{errors::Error, Result};

/// Typed configuration, built once at startup and shared by `Arc`.
///
/// Variable names follow the deployment's `.env` layout (`TOKEN`, `HOST`,
/// `USER`, `POSTGRES_*`, ...).
#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_bot_token: SecretString,
    pub telegram_safe_limit: usize,

    pub ssh: SshConfig,
    pub remote_timeout: Duration,

    pub postgres: PostgresConfig,

    /// Replica credentials. Accepted for deployment parity; no handler uses them.
    pub replica: ReplicaConfig,

    pub log_file: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct SshConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
}

#[derive(Clone, Debug)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub database: String,
}

#[derive(Clone, Debug, Default)]
pub struct ReplicaConfig {
    pub host: Option<String>,
    pub password: Option<SecretString>,
    pub port: Option<u16>,
}

impl ReplicaConfig {
    pub fn is_configured(&self) -> bool {
        self.host.is_some() || self.password.is_some() || self.port.is_some()
    }
}

impl Config {
    /// Load from the process environment, seeding it from `.env` first.
    ///
    /// Values already present in the environment win over `.env`.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).and_then(non_empty);
        let required = |key: &str| {
            var(key).ok_or_else(|| {
                Error::Config(format!("{key} environment variable is required"))
            })
        };
        let port = |key: &str, default: u16| -> Result<u16> {
            match var(key) {
                None => Ok(default),
                Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                    Error::Config(format!("{key} must be a port number, got {raw:?}"))
                }),
            }
        };

        let telegram_bot_token = SecretString::new(required("TOKEN")?);
        let telegram_safe_limit = var("TELEGRAM_SAFE_LIMIT")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(4000)
            .max(16);

        let ssh = SshConfig {
            host: required("HOST")?,
            port: port("SSH_PORT", 22)?,
            username: required("USER")?,
            password: SecretString::new(required("PASSWORD")?),
        };
        let remote_timeout = Duration::from_secs(
            var("REMOTE_TIMEOUT_SECS")
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(30)
                .max(1),
        );

        let postgres = PostgresConfig {
            host: required("POSTGRES_HOST")?,
            port: port("POSTGRES_PORT", 5432)?,
            username: required("POSTGRES_USER")?,
            password: SecretString::new(required("POSTGRES_PASSWORD")?),
            database: required("POSTGRES_DB")?,
        };

        let replica = ReplicaConfig {
            host: var("REPL_HOST"),
            password: var("REPL_PASSWORD").map(SecretString::new),
            port: match var("PORT") {
                Some(_) => Some(port("PORT", 0)?),
                None => None,
            },
        };

        let log_file = var("LOG_FILE").map(PathBuf::from);

        Ok(Self {
            telegram_bot_token,
            telegram_safe_limit,
            ssh,
            remote_timeout,
            postgres,
            replica,
            log_file,
        })
    }

    /// Secret values that must never appear in a reply.
    pub fn secrets(&self) -> Vec<String> {
        let mut out = vec![
            self.ssh.password.expose_secret().clone(),
            self.postgres.password.expose_secret().clone(),
        ];
        if let Some(p) = &self.replica.password {
            out.push(p.expose_secret().clone());
        }
        out
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
