//! PostgreSQL adapter (sqlx).
//!
//! Implements the `opsbot-core` Store port. Every call opens its own
//! connection and closes it before returning; values are always bound as
//! parameters.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::{
    postgres::{PgConnectOptions, PgConnection, PgRow},
    Connection, Row,
};
use tracing::{debug, warn};

use opsbot_core::{
    config::{Config, PostgresConfig},
    errors::Error,
    store::{Record, Store, Table},
    Result,
};

/// Not `Debug`: the connect options carry the password.
#[derive(Clone)]
pub struct PostgresStore {
    options: PgConnectOptions,
}

impl PostgresStore {
    pub fn new(cfg: &Config) -> Self {
        Self::from_config(&cfg.postgres)
    }

    pub fn from_config(pg: &PostgresConfig) -> Self {
        let options = PgConnectOptions::new()
            .host(&pg.host)
            .port(pg.port)
            .username(&pg.username)
            .password(pg.password.expose_secret())
            .database(&pg.database)
            .application_name("opsbot");
        Self { options }
    }

    async fn connect(&self) -> Result<PgConnection> {
        PgConnection::connect_with(&self.options)
            .await
            .map_err(store_err)
    }

    async fn release(conn: PgConnection) {
        if let Err(e) = conn.close().await {
            warn!(error = %e, "failed to close postgres connection");
        }
    }
}

fn select_all_sql(table: Table) -> &'static str {
    match table {
        Table::Emails => "SELECT id::bigint AS id, email::text AS value FROM emails ORDER BY id",
        Table::Phones => "SELECT id::bigint AS id, phone::text AS value FROM phones ORDER BY id",
    }
}

fn insert_sql(table: Table) -> &'static str {
    match table {
        Table::Emails => "INSERT INTO emails (email) VALUES ($1)",
        Table::Phones => "INSERT INTO phones (phone) VALUES ($1)",
    }
}

fn render_row(row: &PgRow) -> std::result::Result<String, sqlx::Error> {
    let id: i64 = row.try_get("id")?;
    let value: String = row.try_get("value")?;
    Ok(format!("{id}. {value}"))
}

fn store_err(e: sqlx::Error) -> Error {
    Error::Store(e.to_string())
}

#[async_trait]
impl Store for PostgresStore {
    async fn fetch_all(&self, table: Table) -> Result<Vec<String>> {
        let mut conn = self.connect().await?;
        let rows = sqlx::query(select_all_sql(table))
            .fetch_all(&mut conn)
            .await;
        Self::release(conn).await;

        let rows = rows.map_err(store_err)?;
        debug!(?table, rows = rows.len(), "fetched rows");
        rows.iter()
            .map(render_row)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(store_err)
    }

    async fn insert(&self, record: &Record) -> Result<()> {
        let mut conn = self.connect().await?;
        let result = sqlx::query(insert_sql(record.table()))
            .bind(record.value())
            .execute(&mut conn)
            .await;
        Self::release(conn).await;

        let done = result.map_err(store_err)?;
        debug!(table = ?record.table(), rows = done.rows_affected(), "inserted record");
        Ok(())
    }
}
