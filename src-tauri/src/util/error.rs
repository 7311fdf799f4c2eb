use rusqlite::Error as RusqliteError;
use serde::{Serialize, Serializer};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    AdhocError(&'static str),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// An opaque failure reported by the backend collaborator.
    #[error("{0}")]
    Backend(String),
    #[error("Not connected to a database")]
    NotConnected,
    #[error("Already connected to a database")]
    AlreadyConnected,
    #[error("A request is already in progress")]
    Busy,
    #[error("The create table form is not open")]
    FormClosed,
    #[error("Unknown column row: {0}")]
    UnknownRow(u64),
    #[error("Unknown table: {0}")]
    UnknownTable(String),
    #[error("Unknown column type: {0}")]
    UnknownColumnType(String),
    #[error("Could not read configuration: {0}")]
    ConfigError(String),
    #[error("SQLite error occurred: {0}")]
    RusqliteError(#[from] RusqliteError),
    #[cfg(feature = "desktop")]
    #[error("Tauri error occurred: {0}")]
    TauriError(#[from] tauri::Error),
}

impl Error {
    /// Wraps any displayable failure as an opaque backend error.
    pub fn backend(e: impl std::fmt::Display) -> Error {
        Error::Backend(e.to_string())
    }
}

impl Serialize for Error {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<Error> for String {
    fn from(e: Error) -> String {
        e.to_string()
    }
}

/// A validation check that was not passed. The display string is shown to the user as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Table name required")]
    MissingTableName,
    #[error("All columns must have a name")]
    MissingColumnName,
    #[error("At least one column required")]
    NoColumns,
    #[error("Username required")]
    MissingUsername,
    #[error("Email required")]
    MissingEmail,
}
