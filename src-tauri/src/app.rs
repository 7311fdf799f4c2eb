//! The operations the desktop shell exposes, over shared application state.
//!
//! Every lock here guards plain state and is released before a backend call is awaited, so a slow request
//! never blocks reads of the session or the form. Notifications for the frontend go through an [`EventSink`].

use std::sync::Arc;
use parking_lot::Mutex;
use serde::Serialize;
use crate::backend::{Backend, ColumnType, ConnectParams};
use crate::form::{CreateTableDialog, RowId, TableForm, TableFormView, UserForm, UserFormView};
use crate::session::{Session, SessionSnapshot};
use crate::util::config::Config;
use crate::util::error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "table", rename_all = "camelCase")]
/// A notification for the frontend.
pub enum AppEvent {
    /// The table list changed.
    TableList,
    /// Columns of the named table arrived and were applied.
    TableColumns(String),
    TableCreated(String),
}

impl AppEvent {
    /// The event name the frontend listens for.
    pub fn name(&self) -> &'static str {
        match self {
            AppEvent::TableList => "update-table-list",
            AppEvent::TableColumns(_) => "update-table-columns",
            AppEvent::TableCreated(_) => "table-created",
        }
    }

    /// The table the event is about, if any.
    pub fn table(&self) -> Option<&str> {
        match self {
            AppEvent::TableList => None,
            AppEvent::TableColumns(table) | AppEvent::TableCreated(table) => Some(table),
        }
    }
}

/// Delivers [`AppEvent`]s to the frontend.
pub trait EventSink: Send + Sync {
    fn send(&self, event: &AppEvent) -> Result<(), error::Error>;
}

/// Sends an event. A frontend that cannot be reached does not fail the operation.
fn notify<E: EventSink + ?Sized>(events: &E, event: AppEvent) {
    if let Err(e) = events.send(&event) {
        tracing::warn!(event = event.name(), error = %e, "failed to emit event");
    }
}

/// Everything the commands share.
pub struct AppState {
    backend: Arc<dyn Backend>,
    config: Config,
    session: Mutex<Session>,
    create_table: Mutex<CreateTableDialog>,
    user_form: Mutex<UserForm>,
}

impl AppState {
    pub fn new(backend: Arc<dyn Backend>, config: Config) -> Self {
        AppState {
            backend,
            config,
            session: Mutex::new(Session::new()),
            create_table: Mutex::new(CreateTableDialog::new()),
            user_form: Mutex::new(UserForm::new()),
        }
    }

    /// Values used to prefill the connection form. The password is never sent.
    pub fn connection_defaults(&self) -> ConnectParams {
        return self.config.connection_defaults().without_password();
    }

    /// Connect to a database and load its tables.
    pub async fn connect<E: EventSink + ?Sized>(&self, events: &E, params: ConnectParams) -> Result<SessionSnapshot, error::Error> {
        self.session.lock().begin_connect()?;
        tracing::debug!(?params, "connecting");
        let outcome = match self.backend.connect(&params).await {
            Ok(()) => self.backend.list_tables().await,
            Err(e) => Err(e),
        };

        let snapshot = {
            let mut session = self.session.lock();
            session.finish_connect(outcome)?;
            session.snapshot()
        };
        notify(events, AppEvent::TableList);
        return Ok(snapshot);
    }

    /// Drop the connection and return to the connection form. Refused while a connect or a table submission
    /// is in flight.
    pub async fn disconnect(&self) -> Result<SessionSnapshot, error::Error> {
        if self.session.lock().is_connecting() {
            return Err(error::Error::Busy);
        }
        self.create_table.lock().close()?;
        let snapshot = {
            let mut session = self.session.lock();
            session.disconnect();
            session.snapshot()
        };

        if let Err(e) = self.backend.disconnect().await {
            tracing::warn!(error = %e, "backend failed to disconnect cleanly");
        }
        return Ok(snapshot);
    }

    pub fn session(&self) -> SessionSnapshot {
        return self.session.lock().snapshot();
    }

    /// Select a table and load its columns. A response for a table that is no longer selected is dropped.
    pub async fn select_table<E: EventSink + ?Sized>(&self, events: &E, table_name: String) -> Result<SessionSnapshot, error::Error> {
        let fetch = self.session.lock().select(table_name)?;
        let outcome = self.backend.list_table_columns(fetch.table()).await;

        let (applied, snapshot) = {
            let mut session = self.session.lock();
            let applied = session.apply_columns(&fetch, outcome);
            (applied, session.snapshot())
        };
        if applied {
            notify(events, AppEvent::TableColumns(fetch.table().to_string()));
        }
        return Ok(snapshot);
    }

    pub fn clear_selection(&self) -> SessionSnapshot {
        let mut session = self.session.lock();
        session.clear_selection();
        return session.snapshot();
    }

    /// The column types offered by the type dropdown, in display order.
    pub fn column_types(&self) -> Vec<ColumnType> {
        return ColumnType::ALL.to_vec();
    }

    pub fn open_create_table_form(&self) -> Result<TableFormView, error::Error> {
        if !self.session.lock().is_connected() {
            return Err(error::Error::NotConnected);
        }
        return Ok(self.create_table.lock().open().view());
    }

    pub fn close_create_table_form(&self) -> Result<(), error::Error> {
        return self.create_table.lock().close();
    }

    pub fn create_table_form(&self) -> Option<TableFormView> {
        return self.create_table.lock().view();
    }

    /// Applies one edit to the open form and returns its new state.
    fn edit_form<F: FnOnce(&mut TableForm) -> Result<(), error::Error>>(&self, edit: F) -> Result<TableFormView, error::Error> {
        let mut dialog = self.create_table.lock();
        let form = dialog.form_mut()?;
        edit(form)?;
        return Ok(form.view());
    }

    pub fn set_table_name(&self, table_name: String) -> Result<TableFormView, error::Error> {
        return self.edit_form(|form| form.set_table_name(table_name));
    }

    pub fn add_column(&self) -> Result<TableFormView, error::Error> {
        return self.edit_form(|form| form.add_column().map(|_| ()));
    }

    pub fn remove_column(&self, id: RowId) -> Result<TableFormView, error::Error> {
        return self.edit_form(|form| form.remove_column(id).map(|_| ()));
    }

    pub fn set_column_name(&self, id: RowId, name: String) -> Result<TableFormView, error::Error> {
        return self.edit_form(|form| form.set_column_name(id, name));
    }

    pub fn set_column_type(&self, id: RowId, column_type: ColumnType) -> Result<TableFormView, error::Error> {
        return self.edit_form(|form| form.set_column_type(id, column_type.as_str()));
    }

    /// Submit the create-table form. On success the form closes and the table list is refreshed.
    ///
    /// Once the table exists the submission counts as done: a failed refresh is reported through the
    /// session message.
    pub async fn submit_create_table_form<E: EventSink + ?Sized>(&self, events: &E) -> Result<SessionSnapshot, error::Error> {
        let request = self.create_table.lock().begin_submit()?;
        let outcome = self.backend.create_table(&request).await;
        self.create_table.lock().complete_submit(&request, outcome, |name| {
            notify(events, AppEvent::TableCreated(name.to_string()));
        })?;

        let can_refresh = self.session.lock().begin_refresh().is_ok();
        if can_refresh {
            tracing::debug!(table = %request.table_name, "refreshing table list");
            let outcome = self.backend.list_tables().await;
            let refreshed = self.session.lock().finish_refresh(outcome).is_ok();
            if refreshed {
                notify(events, AppEvent::TableList);
            }
        }
        return Ok(self.session());
    }

    /// Create an application user.
    pub async fn create_user(&self, username: String, email: String) -> Result<UserFormView, error::Error> {
        let new_user = {
            let mut form = self.user_form.lock();
            form.set_username(username)?;
            form.set_email(email)?;
            form.begin_submit()?
        };
        let outcome = self.backend.create_user(&new_user).await;

        let mut form = self.user_form.lock();
        form.complete_submit(outcome)?;
        return Ok(form.view());
    }
}
