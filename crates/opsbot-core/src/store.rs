//! Persistence port for extracted contacts.

use async_trait::async_trait;
use tracing::error;

use crate::{
    domain::{EmailRecord, PhoneRecord},
    errors::Error,
    utils::redact_secrets,
    Result,
};

/// The two logical tables the bot reads and writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Table {
    Emails,
    Phones,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Record {
    Email(EmailRecord),
    Phone(PhoneRecord),
}

impl Record {
    pub fn table(&self) -> Table {
        match self {
            Record::Email(_) => Table::Emails,
            Record::Phone(_) => Table::Phones,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Record::Email(r) => &r.address,
            Record::Phone(r) => &r.number,
        }
    }
}

/// Hexagonal port for the relational store.
///
/// Implementations acquire a connection per call, bind every user-supplied
/// value as a parameter, and release the connection on every exit path.
#[async_trait]
pub trait Store: Send + Sync {
    /// Every row of `table`, rendered as one line of text each.
    async fn fetch_all(&self, table: Table) -> Result<Vec<String>>;

    /// Insert one record. Duplicates are allowed.
    async fn insert(&self, record: &Record) -> Result<()>;
}

/// Rows joined one per line; an empty table yields an empty reply.
pub async fn fetch_for_reply(store: &dyn Store, table: Table, secrets: &[String]) -> String {
    match store.fetch_all(table).await {
        Ok(rows) => rows.iter().map(|r| format!("{r}\n")).collect(),
        Err(e) => {
            error!(?table, error = %e, "store query failed");
            store_error_reply(&e, secrets)
        }
    }
}

/// Store failure as a reply, with `secrets` masked.
pub fn store_error_reply(e: &Error, secrets: &[String]) -> String {
    redact_secrets(&format!("Ошибка при работе с PostgreSQL: {e}"), secrets)
}
