#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;
use tokio::sync::Notify;
use vizql_lib::{AppEvent, Backend, ColumnMetadata, ConnectParams, CreateTableRequest, Error, EventSink, NewUser};

/// A backend answering from in-memory tables, with switchable failures and a call log.
#[derive(Default)]
pub struct MockBackend {
    pub tables: Mutex<HashMap<String, Vec<ColumnMetadata>>>,
    pub fail_connect: Mutex<Option<String>>,
    pub fail_list_tables: Mutex<Option<String>>,
    pub fail_create_table: Mutex<Option<String>>,
    pub created: Mutex<Vec<CreateTableRequest>>,
    pub users: Mutex<Vec<NewUser>>,
    pub calls: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn with_tables(tables: &[(&str, &[(&str, &str)])]) -> Self {
        let backend = MockBackend::default();
        {
            let mut map = backend.tables.lock().unwrap();
            for (name, columns) in tables {
                map.insert(
                    name.to_string(),
                    columns.iter().map(|(c, t)| ColumnMetadata::new(*c, *t)).collect(),
                );
            }
        }
        backend
    }

    pub fn fail_connect_with(&self, message: &str) {
        *self.fail_connect.lock().unwrap() = Some(message.to_string());
    }

    pub fn fail_list_tables_with(&self, message: &str) {
        *self.fail_list_tables.lock().unwrap() = Some(message.to_string());
    }

    pub fn fail_create_table_with(&self, message: Option<&str>) {
        *self.fail_create_table.lock().unwrap() = message.map(str::to_string);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn connect(&self, params: &ConnectParams) -> Result<(), Error> {
        self.record(format!("connect {}", params.dbname));
        match self.fail_connect.lock().unwrap().clone() {
            Some(message) => Err(Error::Backend(message)),
            None => Ok(()),
        }
    }

    async fn list_tables(&self) -> Result<Vec<String>, Error> {
        self.record("list_tables");
        if let Some(message) = self.fail_list_tables.lock().unwrap().clone() {
            return Err(Error::Backend(message));
        }
        Ok(self.tables.lock().unwrap().keys().cloned().collect())
    }

    async fn list_table_columns(&self, table_name: &str) -> Result<Vec<ColumnMetadata>, Error> {
        self.record(format!("list_table_columns {}", table_name));
        self.tables
            .lock()
            .unwrap()
            .get(table_name)
            .cloned()
            .ok_or_else(|| Error::UnknownTable(table_name.to_string()))
    }

    async fn create_table(&self, request: &CreateTableRequest) -> Result<(), Error> {
        self.record(format!("create_table {}", request.table_name));
        if let Some(message) = self.fail_create_table.lock().unwrap().clone() {
            return Err(Error::Backend(message));
        }
        self.created.lock().unwrap().push(request.clone());
        self.tables.lock().unwrap().insert(
            request.table_name.clone(),
            request.columns.iter().map(|c| ColumnMetadata::new(c.name.clone(), c.column_type.clone())).collect(),
        );
        Ok(())
    }

    async fn create_user(&self, user: &NewUser) -> Result<(), Error> {
        self.record(format!("create_user {}", user.username));
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == user.username) {
            return Err(Error::Backend(format!("user {} already exists", user.username)));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), Error> {
        self.record("disconnect");
        Ok(())
    }
}

/// Wraps a [`MockBackend`] so chosen calls wait until the test releases them.
///
/// Gate keys: `connect`, `list_tables`, `columns <table>` and `create <table>`.
pub struct GatedBackend {
    pub inner: MockBackend,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
}

impl GatedBackend {
    pub fn new(inner: MockBackend) -> Self {
        GatedBackend { inner, gates: Mutex::new(HashMap::new()) }
    }

    /// Holds every later call under `key` until [`GatedBackend::release`].
    pub fn gate(&self, key: &str) {
        self.gates.lock().unwrap().insert(key.to_string(), Arc::new(Notify::new()));
    }

    /// Lets one held (or the next) call under `key` through.
    pub fn release(&self, key: &str) {
        let gate = self.gates.lock().unwrap().get(key).cloned();
        if let Some(gate) = gate {
            gate.notify_one();
        }
    }

    async fn pass(&self, key: String) {
        let gate = self.gates.lock().unwrap().get(&key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl Backend for GatedBackend {
    async fn connect(&self, params: &ConnectParams) -> Result<(), Error> {
        self.pass(String::from("connect")).await;
        self.inner.connect(params).await
    }

    async fn list_tables(&self) -> Result<Vec<String>, Error> {
        self.pass(String::from("list_tables")).await;
        self.inner.list_tables().await
    }

    async fn list_table_columns(&self, table_name: &str) -> Result<Vec<ColumnMetadata>, Error> {
        self.pass(format!("columns {}", table_name)).await;
        self.inner.list_table_columns(table_name).await
    }

    async fn create_table(&self, request: &CreateTableRequest) -> Result<(), Error> {
        self.pass(format!("create {}", request.table_name)).await;
        self.inner.create_table(request).await
    }

    async fn create_user(&self, user: &NewUser) -> Result<(), Error> {
        self.inner.create_user(user).await
    }

    async fn disconnect(&self) -> Result<(), Error> {
        self.inner.disconnect().await
    }
}

/// Collects the events sent to the frontend.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<AppEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<AppEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn send(&self, event: &AppEvent) -> Result<(), Error> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Yields to spawned tasks until `condition` holds.
pub async fn wait_until<F: FnMut() -> bool>(mut condition: F) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition never became true");
}
