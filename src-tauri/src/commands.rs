use tauri::{AppHandle, Emitter, State};
use crate::app::{AppEvent, AppState, EventSink};
use crate::backend::{ColumnType, ConnectParams};
use crate::form::{RowId, TableFormView, UserFormView};
use crate::session::SessionSnapshot;
use crate::util::error;

impl EventSink for AppHandle {
    /// Sends a message to the frontend. Table events carry the table name.
    fn send(&self, event: &AppEvent) -> Result<(), error::Error> {
        match event.table() {
            Some(table) => Emitter::emit(self, event.name(), table)?,
            None => Emitter::emit(self, event.name(), ())?,
        }
        return Ok(());
    }
}

#[tauri::command]
/// Values used to prefill the connection form. The password is never sent.
pub fn get_connection_defaults(state: State<'_, AppState>) -> ConnectParams {
    return state.connection_defaults();
}

#[tauri::command]
/// Connect to a database and load its tables.
pub async fn connect(app: AppHandle, state: State<'_, AppState>, params: ConnectParams) -> Result<SessionSnapshot, error::Error> {
    return state.connect(&app, params).await;
}

#[tauri::command]
pub async fn disconnect(state: State<'_, AppState>) -> Result<SessionSnapshot, error::Error> {
    return state.disconnect().await;
}

#[tauri::command]
pub fn get_session(state: State<'_, AppState>) -> SessionSnapshot {
    return state.session();
}

#[tauri::command]
pub async fn select_table(app: AppHandle, state: State<'_, AppState>, table_name: String) -> Result<SessionSnapshot, error::Error> {
    return state.select_table(&app, table_name).await;
}

#[tauri::command]
pub fn clear_selection(state: State<'_, AppState>) -> SessionSnapshot {
    return state.clear_selection();
}

#[tauri::command]
pub fn get_column_types(state: State<'_, AppState>) -> Vec<ColumnType> {
    return state.column_types();
}

#[tauri::command]
pub fn open_create_table_form(state: State<'_, AppState>) -> Result<TableFormView, error::Error> {
    return state.open_create_table_form();
}

#[tauri::command]
pub fn close_create_table_form(state: State<'_, AppState>) -> Result<(), error::Error> {
    return state.close_create_table_form();
}

#[tauri::command]
pub fn get_create_table_form(state: State<'_, AppState>) -> Option<TableFormView> {
    return state.create_table_form();
}

#[tauri::command]
pub fn set_table_name(state: State<'_, AppState>, table_name: String) -> Result<TableFormView, error::Error> {
    return state.set_table_name(table_name);
}

#[tauri::command]
pub fn add_column(state: State<'_, AppState>) -> Result<TableFormView, error::Error> {
    return state.add_column();
}

#[tauri::command]
pub fn remove_column(state: State<'_, AppState>, id: RowId) -> Result<TableFormView, error::Error> {
    return state.remove_column(id);
}

#[tauri::command]
pub fn set_column_name(state: State<'_, AppState>, id: RowId, name: String) -> Result<TableFormView, error::Error> {
    return state.set_column_name(id, name);
}

#[tauri::command]
pub fn set_column_type(state: State<'_, AppState>, id: RowId, column_type: ColumnType) -> Result<TableFormView, error::Error> {
    return state.set_column_type(id, column_type);
}

#[tauri::command]
pub async fn submit_create_table_form(app: AppHandle, state: State<'_, AppState>) -> Result<SessionSnapshot, error::Error> {
    return state.submit_create_table_form(&app).await;
}

#[tauri::command]
pub async fn create_user(state: State<'_, AppState>, username: String, email: String) -> Result<UserFormView, error::Error> {
    return state.create_user(username, email).await;
}
