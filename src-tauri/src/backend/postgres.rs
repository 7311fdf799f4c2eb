use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio_postgres::{Client, NoTls};
use crate::backend::{table, Backend, ColumnMetadata, ConnectParams, CreateTableRequest, NewUser};
use crate::util::error;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A backend talking to a PostgreSQL server. Tables are listed from and created in the `public` schema.
pub struct PostgresBackend {
    client: Mutex<Option<Arc<Client>>>,
}

impl Default for PostgresBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PostgresBackend {
    pub fn new() -> Self {
        PostgresBackend { client: Mutex::new(None) }
    }

    pub fn is_connected(&self) -> bool {
        self.client.lock().is_some()
    }

    /// The open client. The slot lock is released before any query runs.
    fn client(&self) -> Result<Arc<Client>, error::Error> {
        self.client.lock().clone().ok_or(error::Error::NotConnected)
    }
}

/// The server's message with its detail and hint, if any.
fn describe(e: &tokio_postgres::Error) -> String {
    let Some(db_error) = e.as_db_error() else {
        return e.to_string();
    };
    let mut message = db_error.message().to_string();
    if let Some(detail) = db_error.detail().filter(|d| !d.trim().is_empty()) {
        message.push_str(&format!(" (detail: {})", detail));
    }
    if let Some(hint) = db_error.hint().filter(|h| !h.trim().is_empty()) {
        message.push_str(&format!(" (hint: {})", hint));
    }
    return message;
}

fn pg_error(e: tokio_postgres::Error) -> error::Error {
    error::Error::Backend(describe(&e))
}

fn config(params: &ConnectParams) -> Result<tokio_postgres::Config, error::Error> {
    if params.host.trim().is_empty() {
        return Err(error::Error::AdhocError("A host is required"));
    }
    if params.dbname.trim().is_empty() {
        return Err(error::Error::AdhocError("A database name is required"));
    }

    let mut config = tokio_postgres::Config::new();
    config
        .host(params.host.trim())
        .port(params.port)
        .dbname(params.dbname.trim())
        .user(params.user.trim())
        .connect_timeout(CONNECT_TIMEOUT);
    if !params.password.is_empty() {
        config.password(&params.password);
    }
    return Ok(config);
}

#[async_trait]
impl Backend for PostgresBackend {
    async fn connect(&self, params: &ConnectParams) -> Result<(), error::Error> {
        let config = config(params)?;
        tracing::info!(host = %params.host, port = params.port, dbname = %params.dbname, "connecting to PostgreSQL");

        let (client, connection) = config.connect(NoTls).await.map_err(pg_error)?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "PostgreSQL connection error");
            }
        });

        let previous = self.client.lock().replace(Arc::new(client));
        if previous.is_some() {
            tracing::debug!("replaced previous PostgreSQL connection");
        }
        tracing::info!(dbname = %params.dbname, "PostgreSQL connection established");
        return Ok(());
    }

    async fn list_tables(&self) -> Result<Vec<String>, error::Error> {
        let client = self.client()?;
        let rows = client.query(
            "SELECT table_name::text
            FROM information_schema.tables
            WHERE table_schema = 'public' AND table_type = 'BASE TABLE'
            ORDER BY table_name", &[]
        ).await.map_err(pg_error)?;
        return Ok(rows.iter().map(|row| row.get::<_, String>(0)).collect());
    }

    async fn list_table_columns(&self, table_name: &str) -> Result<Vec<ColumnMetadata>, error::Error> {
        let client = self.client()?;
        let exists = client.query_one(
            "SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1::text
            )", &[&table_name]
        ).await.map_err(pg_error)?;
        if !exists.get::<_, bool>(0) {
            return Err(error::Error::UnknownTable(table_name.to_string()));
        }

        let rows = client.query(
            "SELECT
                c.column_name::text,
                upper(c.data_type)::text,
                c.is_nullable = 'YES',
                EXISTS (
                    SELECT 1
                    FROM information_schema.table_constraints tc
                    JOIN information_schema.key_column_usage kcu
                      ON tc.constraint_name = kcu.constraint_name
                      AND tc.table_schema = kcu.table_schema
                    WHERE tc.constraint_type = 'PRIMARY KEY'
                      AND tc.table_schema = c.table_schema
                      AND tc.table_name = c.table_name
                      AND kcu.column_name = c.column_name
                )
            FROM information_schema.columns c
            WHERE c.table_schema = 'public' AND c.table_name = $1::text
            ORDER BY c.ordinal_position", &[&table_name]
        ).await.map_err(pg_error)?;

        return Ok(rows.iter().map(|row| ColumnMetadata {
            name: row.get(0),
            data_type: row.get(1),
            nullable: row.get(2),
            primary_key: row.get(3),
        }).collect());
    }

    async fn create_table(&self, request: &CreateTableRequest) -> Result<(), error::Error> {
        let create_table_cmd = table::create_table_sql(request)?;
        let client = self.client()?;
        client.batch_execute(&create_table_cmd).await.map_err(pg_error)?;
        tracing::info!(table = %request.table_name.trim(), columns = request.columns.len(), "created table");
        return Ok(());
    }

    async fn create_user(&self, new_user: &NewUser) -> Result<(), error::Error> {
        let client = self.client()?;
        client.batch_execute("
        CREATE TABLE IF NOT EXISTS app_users (
            username TEXT PRIMARY KEY,
            email TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        );").await.map_err(pg_error)?;
        client.execute(
            "INSERT INTO app_users (username, email) VALUES ($1, $2)",
            &[&new_user.username.trim(), &new_user.email.trim()]
        ).await.map_err(pg_error)?;
        tracing::info!(username = %new_user.username.trim(), "created user");
        return Ok(());
    }

    async fn disconnect(&self) -> Result<(), error::Error> {
        if self.client.lock().take().is_some() {
            tracing::info!("closed PostgreSQL connection");
        }
        return Ok(());
    }
}
