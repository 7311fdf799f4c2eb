//! Connection and navigation state.
//!
//! The session is `Disconnected` until a connect succeeds, then `Connected` with either no selection or one
//! selected table. Each transition that needs the backend is split into a synchronous start and a synchronous
//! completion so callers can release their lock while the request is in flight. Columns fetches carry a
//! [`FetchTag`]; a response whose tag is no longer current is dropped.

use serde::{Deserialize, Serialize};
use crate::backend::{Backend, ColumnMetadata, ConnectParams};
use crate::util::error;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", content = "table", rename_all = "camelCase")]
/// Which view the frontend shows.
pub enum View {
    Connect,
    Tables,
    Table(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FetchTag(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
/// An outstanding columns fetch, as issued by [`Session::select`].
pub struct ColumnsFetch {
    tag: FetchTag,
    table: String,
}

impl ColumnsFetch {
    pub fn tag(&self) -> FetchTag {
        self.tag
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

#[derive(Debug, Default)]
pub struct Session {
    status: ConnectionStatus,
    connecting: bool,
    known_tables: Vec<String>,
    selected_table: Option<String>,
    selected_table_columns: Vec<ColumnMetadata>,
    pending_columns: Option<FetchTag>,
    next_tag: u64,
    message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Serializable copy of the session for the frontend.
pub struct SessionSnapshot {
    pub status: ConnectionStatus,
    pub connecting: bool,
    pub view: View,
    pub known_tables: Vec<String>,
    pub selected_table: Option<String>,
    pub selected_table_columns: Vec<ColumnMetadata>,
    pub loading_columns: bool,
    pub message: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    /// Whether a connection attempt is in flight.
    pub fn is_connecting(&self) -> bool {
        self.connecting
    }

    /// Table names, sorted.
    pub fn known_tables(&self) -> &[String] {
        &self.known_tables
    }

    pub fn selected_table(&self) -> Option<&str> {
        self.selected_table.as_deref()
    }

    /// Columns of the selected table. Empty until its fetch resolves.
    pub fn selected_table_columns(&self) -> &[ColumnMetadata] {
        &self.selected_table_columns
    }

    pub fn is_loading_columns(&self) -> bool {
        self.pending_columns.is_some()
    }

    /// The most recent status or error message.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn view(&self) -> View {
        match (&self.status, &self.selected_table) {
            (ConnectionStatus::Disconnected, _) => View::Connect,
            (ConnectionStatus::Connected, None) => View::Tables,
            (ConnectionStatus::Connected, Some(table)) => View::Table(table.clone()),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            connecting: self.connecting,
            view: self.view(),
            known_tables: self.known_tables.clone(),
            selected_table: self.selected_table.clone(),
            selected_table_columns: self.selected_table_columns.clone(),
            loading_columns: self.is_loading_columns(),
            message: self.message.clone(),
        }
    }

    fn next_fetch_tag(&mut self) -> FetchTag {
        let tag = FetchTag(self.next_tag);
        self.next_tag += 1;
        return tag;
    }

    /// Starts a connection attempt, clearing any previous message. Only one attempt may be in flight.
    pub fn begin_connect(&mut self) -> Result<(), error::Error> {
        if self.is_connected() {
            return Err(error::Error::AlreadyConnected);
        }
        if self.connecting {
            return Err(error::Error::Busy);
        }
        self.connecting = true;
        self.message = None;
        return Ok(());
    }

    /// Completes a connection attempt with the table list fetched after connecting.
    /// Nothing changes on failure apart from the message.
    pub fn finish_connect(&mut self, outcome: Result<Vec<String>, error::Error>) -> Result<(), error::Error> {
        self.connecting = false;
        match outcome {
            Ok(tables) => {
                self.status = ConnectionStatus::Connected;
                self.selected_table = None;
                self.selected_table_columns.clear();
                self.pending_columns = None;
                self.set_known_tables(tables);
                tracing::info!(tables = self.known_tables.len(), "connected");
                return Ok(());
            },
            Err(e) => {
                tracing::warn!(error = %e, "failed to connect to database");
                self.message = Some(e.to_string());
                return Err(e);
            }
        }
    }

    /// Connects and loads the table list. The session only becomes connected if both succeed.
    pub async fn connect<B: Backend + ?Sized>(&mut self, backend: &B, params: &ConnectParams) -> Result<(), error::Error> {
        self.begin_connect()?;
        tracing::debug!(?params, "connecting");
        let outcome = match backend.connect(params).await {
            Ok(()) => backend.list_tables().await,
            Err(e) => Err(e),
        };
        return self.finish_connect(outcome);
    }

    /// Replaces the table list.
    pub fn set_known_tables(&mut self, mut tables: Vec<String>) {
        tables.sort();
        tables.dedup();
        self.known_tables = tables;
    }

    /// Selects a table and returns the columns fetch to issue for it.
    /// The previous table's columns are cleared and any earlier fetch becomes stale.
    pub fn select(&mut self, table: impl Into<String>) -> Result<ColumnsFetch, error::Error> {
        if !self.is_connected() {
            return Err(error::Error::NotConnected);
        }
        let table = table.into();
        let tag = self.next_fetch_tag();
        tracing::debug!(table = %table, tag = tag.0, "selected table");
        self.selected_table = Some(table.clone());
        self.selected_table_columns.clear();
        self.pending_columns = Some(tag);
        self.message = None;
        return Ok(ColumnsFetch { tag, table });
    }

    /// Applies the response to a columns fetch. Returns false, changing nothing, if the fetch is stale.
    pub fn apply_columns(&mut self, fetch: &ColumnsFetch, outcome: Result<Vec<ColumnMetadata>, error::Error>) -> bool {
        if self.pending_columns != Some(fetch.tag) || self.selected_table.as_deref() != Some(fetch.table.as_str()) {
            tracing::debug!(table = %fetch.table, tag = fetch.tag.0, "discarding stale columns response");
            return false;
        }
        self.pending_columns = None;
        match outcome {
            Ok(columns) => {
                self.selected_table_columns = columns;
            },
            Err(e) => {
                tracing::warn!(table = %fetch.table, error = %e, "failed to fetch columns");
                self.selected_table_columns.clear();
                self.message = Some(e.to_string());
            }
        }
        return true;
    }

    /// Selects a table and waits for its columns.
    pub async fn select_table<B: Backend + ?Sized>(&mut self, backend: &B, table: impl Into<String>) -> Result<(), error::Error> {
        let fetch = self.select(table)?;
        let outcome = backend.list_table_columns(fetch.table()).await;
        self.apply_columns(&fetch, outcome);
        return Ok(());
    }

    /// Returns to the table list without a selection. Any outstanding fetch becomes stale.
    pub fn clear_selection(&mut self) {
        self.selected_table = None;
        self.selected_table_columns.clear();
        self.pending_columns = None;
    }

    /// Checks that a table list refresh can be issued.
    pub fn begin_refresh(&self) -> Result<(), error::Error> {
        if !self.is_connected() {
            return Err(error::Error::NotConnected);
        }
        return Ok(());
    }

    /// Applies a refreshed table list. The selection is left alone. A list that arrives after a disconnect is
    /// dropped; a failure is kept as the session message.
    pub fn finish_refresh(&mut self, outcome: Result<Vec<String>, error::Error>) -> Result<(), error::Error> {
        if !self.is_connected() {
            tracing::debug!("discarding table list for a closed session");
            return Ok(());
        }
        match outcome {
            Ok(tables) => {
                self.set_known_tables(tables);
                return Ok(());
            },
            Err(e) => {
                tracing::warn!(error = %e, "failed to refresh table list");
                self.message = Some(e.to_string());
                return Err(e);
            }
        }
    }

    /// Refreshes the table list after a table was created.
    pub async fn table_created<B: Backend + ?Sized>(&mut self, backend: &B, name: &str) -> Result<(), error::Error> {
        self.begin_refresh()?;
        tracing::debug!(table = %name, "refreshing table list");
        let outcome = backend.list_tables().await;
        return self.finish_refresh(outcome);
    }

    /// Returns to the disconnected state, forgetting tables and selection.
    pub fn disconnect(&mut self) {
        self.status = ConnectionStatus::Disconnected;
        self.known_tables.clear();
        self.clear_selection();
        self.message = None;
        tracing::info!("disconnected");
    }
}
