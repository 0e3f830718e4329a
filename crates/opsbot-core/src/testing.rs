//! Port fakes shared by the unit tests.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;

use crate::{
    errors::Error,
    remote::{RemoteExecutor, RemoteOutput},
    store::{Record, Store, Table},
    Result,
};

#[derive(Clone, Debug)]
enum Failure {
    Connection(String),
    Execution(String),
}

/// Remote executor that records every command and answers with canned output.
#[derive(Clone, Default)]
pub struct FakeRemote {
    stdout: String,
    failure: Option<Failure>,
    commands: Arc<Mutex<Vec<String>>>,
}

impl FakeRemote {
    pub fn replying(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            ..Self::default()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            failure: Some(Failure::Connection("connection refused".to_string())),
            ..Self::default()
        }
    }

    pub fn failing(e: Error) -> Self {
        let failure = match e {
            Error::RemoteConnection(m) => Failure::Connection(m),
            other => Failure::Execution(other.to_string()),
        };
        Self {
            failure: Some(failure),
            ..Self::default()
        }
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteExecutor for FakeRemote {
    async fn execute(&self, command: &str) -> Result<RemoteOutput> {
        self.commands.lock().unwrap().push(command.to_string());
        match &self.failure {
            Some(Failure::Connection(m)) => Err(Error::RemoteConnection(m.clone())),
            Some(Failure::Execution(m)) => Err(Error::RemoteExecution(m.clone())),
            None => Ok(RemoteOutput {
                stdout: self.stdout.as_bytes().to_vec(),
                stderr: Vec::new(),
            }),
        }
    }
}

/// In-memory store numbering rows from 1, like a SERIAL id column.
#[derive(Clone, Default)]
pub struct MemoryStore {
    rows: Arc<Mutex<HashMap<Table, Vec<String>>>>,
    inserts: Arc<Mutex<Vec<Record>>>,
    broken: Option<String>,
}

impl MemoryStore {
    pub fn broken(reason: &str) -> Self {
        Self {
            broken: Some(reason.to_string()),
            ..Self::default()
        }
    }

    pub fn inserts(&self) -> Vec<Record> {
        self.inserts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn fetch_all(&self, table: Table) -> Result<Vec<String>> {
        if let Some(reason) = &self.broken {
            return Err(Error::Store(reason.clone()));
        }
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .get(&table)
            .map(|values| {
                values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| format!("{}. {v}", i + 1))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(&self, record: &Record) -> Result<()> {
        self.inserts.lock().unwrap().push(record.clone());
        if let Some(reason) = &self.broken {
            return Err(Error::Store(reason.clone()));
        }
        self.rows
            .lock()
            .unwrap()
            .entry(record.table())
            .or_default()
            .push(record.value().to_string());
        Ok(())
    }
}
