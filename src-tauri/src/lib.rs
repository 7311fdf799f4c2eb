//! Client-side state of the VizQL database desktop client: the create-table form with its stable-row field
//! registry, the connection and navigation session, and the backend operations they drive.

pub mod app;
pub mod backend;
pub mod form;
pub mod session;
pub mod util;
#[cfg(feature = "desktop")]
mod commands;

pub use app::{AppEvent, AppState, EventSink};
pub use backend::{Backend, BackendKind, ColumnMetadata, ColumnSpec, ColumnType, ConnectParams, CreateTableRequest, NewUser, SqliteBackend};
#[cfg(feature = "postgres")]
pub use backend::PostgresBackend;
pub use session::{ColumnsFetch, ConnectionStatus, Session, SessionSnapshot, View};
pub use util::config::Config;
pub use util::error::{Error, ValidationError};

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let (config, config_error) = match Config::from_env() {
        Ok(c) => (c, None),
        Err(e) => (Config::default(), Some(e)),
    };
    util::logging::init(&config.log_filter);
    if let Some(e) = config_error {
        tracing::warn!(error = %e, "using default configuration");
    }

    let backend = match config.backend.create() {
        Ok(backend) => backend,
        Err(e) => {
            tracing::error!(backend = ?config.backend, error = %e, "cannot start without a backend");
            return;
        }
    };
    let state = AppState::new(backend, config);
    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .manage(state)
        .invoke_handler(tauri::generate_handler![
            commands::get_connection_defaults,
            commands::connect,
            commands::disconnect,
            commands::get_session,
            commands::select_table,
            commands::clear_selection,
            commands::get_column_types,
            commands::open_create_table_form,
            commands::close_create_table_form,
            commands::get_create_table_form,
            commands::set_table_name,
            commands::add_column,
            commands::remove_column,
            commands::set_column_name,
            commands::set_column_type,
            commands::submit_create_table_form,
            commands::create_user,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
