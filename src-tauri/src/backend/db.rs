use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{Connection, Params, Row};
use crate::backend::{table, column, user, Backend, ColumnMetadata, ConnectParams, CreateTableRequest, NewUser};
use crate::util::error;

/// Opens an in-memory database instead of a file when given as the database name.
pub const IN_MEMORY: &str = ":memory:";

/// A backend executing every operation against a local SQLite database.
///
/// The database name of the connect parameters is the path of the database file. Parameters naming a
/// server (a host, user or password) are refused rather than silently ignored.
pub struct SqliteBackend {
    conn: Mutex<Option<Connection>>,
}

impl Default for SqliteBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SqliteBackend {
    pub fn new() -> Self {
        SqliteBackend { conn: Mutex::new(None) }
    }

    /// Whether a connection is currently open.
    pub fn is_connected(&self) -> bool {
        self.conn.lock().is_some()
    }

    /// Runs `f` with the open connection, holding the connection lock for the duration.
    fn with_connection<T, F: FnOnce(&mut Connection) -> Result<T, error::Error>>(&self, f: F) -> Result<T, error::Error> {
        let mut guard = self.conn.lock();
        match guard.as_mut() {
            Some(conn) => f(conn),
            None => Err(error::Error::NotConnected),
        }
    }
}

/// Opens a connection to the database file named by the parameters.
fn open(params: &ConnectParams) -> Result<Connection, error::Error> {
    if !params.host.trim().is_empty() || !params.user.trim().is_empty() || !params.password.is_empty() {
        return Err(error::Error::AdhocError("SQLite databases are opened by file path only; leave host, user and password empty"));
    }
    let path = params.dbname.trim();
    if path.is_empty() {
        return Err(error::Error::AdhocError("A database name is required"));
    }

    let conn = if path == IN_MEMORY {
        Connection::open_in_memory()?
    } else {
        let conn = Connection::open(path)?;
        let _mode: String = conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
        conn
    };
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    return Ok(conn);
}

/// Convenience method to execute a query that returns multiple rows, then execute a function for each row.
pub fn query_iterate<P: Params, F: FnMut(&Row<'_>) -> Result<(), error::Error>>(conn: &Connection, sql: &str, p: P, f: &mut F) -> Result<(), error::Error> {
    let mut stmt = conn.prepare(sql)?;

    let mut rows = stmt.query(p)?;
    while let Some(row) = rows.next()? {
        f(row)?;
    }
    return Ok(());
}

/// Quotes an SQL identifier, doubling any embedded quote characters.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[async_trait]
impl Backend for SqliteBackend {
    async fn connect(&self, params: &ConnectParams) -> Result<(), error::Error> {
        let conn = open(params)?;
        tracing::info!(dbname = %params.dbname, "opened SQLite database");
        let previous = self.conn.lock().replace(conn);
        if previous.is_some() {
            tracing::debug!("replaced previous SQLite connection");
        }
        return Ok(());
    }

    async fn list_tables(&self) -> Result<Vec<String>, error::Error> {
        return self.with_connection(|conn| table::list(conn));
    }

    async fn list_table_columns(&self, table_name: &str) -> Result<Vec<ColumnMetadata>, error::Error> {
        return self.with_connection(|conn| column::list(conn, table_name));
    }

    async fn create_table(&self, request: &CreateTableRequest) -> Result<(), error::Error> {
        return self.with_connection(|conn| table::create(conn, request));
    }

    async fn create_user(&self, new_user: &NewUser) -> Result<(), error::Error> {
        return self.with_connection(|conn| user::create(conn, new_user));
    }

    async fn disconnect(&self) -> Result<(), error::Error> {
        if let Some(conn) = self.conn.lock().take() {
            conn.close().map_err(|(_, e)| error::Error::RusqliteError(e))?;
            tracing::info!("closed SQLite database");
        }
        return Ok(());
    }
}
