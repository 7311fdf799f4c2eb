mod db;
mod table;
mod column;
mod column_type;
mod user;
#[cfg(feature = "postgres")]
mod postgres;
use std::fmt;
use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::util::error;

pub use column_type::ColumnType;
pub use db::SqliteBackend;
#[cfg(feature = "postgres")]
pub use postgres::PostgresBackend;

/// The remote operations the client relies on.
///
/// Every call is a single outstanding request; failures are opaque and only ever shown to the user
/// through their display string.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Opens a connection to the database described by `params`.
    async fn connect(&self, params: &ConnectParams) -> Result<(), error::Error>;

    /// Names of the tables in the connected database, in no particular order.
    async fn list_tables(&self) -> Result<Vec<String>, error::Error>;

    /// Column metadata for one table, in column order.
    async fn list_table_columns(&self, table_name: &str) -> Result<Vec<ColumnMetadata>, error::Error>;

    async fn create_table(&self, request: &CreateTableRequest) -> Result<(), error::Error>;

    async fn create_user(&self, user: &NewUser) -> Result<(), error::Error>;

    /// Drops the current connection, if any.
    async fn disconnect(&self) -> Result<(), error::Error> {
        return Ok(());
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Which kind of database the desktop client talks to.
pub enum BackendKind {
    #[default]
    Postgres,
    Sqlite,
}

impl BackendKind {
    /// Values that prefill the connection form for this kind of database.
    pub fn default_params(self) -> ConnectParams {
        match self {
            BackendKind::Postgres => ConnectParams::default(),
            BackendKind::Sqlite => ConnectParams::sqlite(db::IN_MEMORY),
        }
    }

    pub fn create(self) -> Result<Arc<dyn Backend>, error::Error> {
        match self {
            #[cfg(feature = "postgres")]
            BackendKind::Postgres => Ok(Arc::new(PostgresBackend::new())),
            #[cfg(not(feature = "postgres"))]
            BackendKind::Postgres => Err(error::Error::AdhocError("This build has no PostgreSQL support")),
            BackendKind::Sqlite => Ok(Arc::new(SqliteBackend::new())),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// Parameters of the connect operation. The defaults describe a local PostgreSQL server.
pub struct ConnectParams {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
}

impl Default for ConnectParams {
    fn default() -> Self {
        ConnectParams {
            host: String::from("localhost"),
            port: 5432,
            dbname: String::from("postgres"),
            user: String::from("postgres"),
            password: String::new(),
        }
    }
}

impl ConnectParams {
    /// Parameters for a SQLite database, which is named by its file path alone.
    pub fn sqlite(path: impl Into<String>) -> ConnectParams {
        ConnectParams {
            host: String::new(),
            port: 0,
            dbname: path.into(),
            user: String::new(),
            password: String::new(),
        }
    }

    /// A copy that is safe to hand to the frontend for prefilling the connection form.
    pub fn without_password(&self) -> ConnectParams {
        ConnectParams { password: String::new(), ..self.clone() }
    }
}

impl fmt::Debug for ConnectParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One column of a table to be created.
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTableRequest {
    pub table_name: String,
    pub columns: Vec<ColumnSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Metadata of an existing table column.
pub struct ColumnMetadata {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
    pub primary_key: bool,
}

impl ColumnMetadata {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        ColumnMetadata {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            primary_key: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_never_prints_the_password() {
        let params = ConnectParams { password: String::from("hunter2"), ..ConnectParams::default() };
        let printed = format!("{:?}", params);
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("localhost"));
        assert_eq!(params.without_password().password, "");
    }

    #[test]
    fn create_table_request_wire_shape() {
        let request = CreateTableRequest {
            table_name: String::from("users"),
            columns: vec![ColumnSpec { name: String::from("id"), column_type: String::from("INTEGER") }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({
            "tableName": "users",
            "columns": [{ "name": "id", "type": "INTEGER" }]
        }));
    }

    #[test]
    fn each_backend_kind_has_its_own_defaults() {
        let postgres = BackendKind::Postgres.default_params();
        assert_eq!((postgres.host.as_str(), postgres.port, postgres.dbname.as_str()), ("localhost", 5432, "postgres"));

        let sqlite = BackendKind::Sqlite.default_params();
        assert_eq!(sqlite, ConnectParams::sqlite(":memory:"));
        assert!(sqlite.host.is_empty());

        let kind: BackendKind = serde_json::from_str("\"sqlite\"").unwrap();
        assert_eq!(kind, BackendKind::Sqlite);
        assert!(BackendKind::Sqlite.create().is_ok());
    }

    #[test]
    fn connect_params_fill_missing_fields() {
        let params: ConnectParams = serde_json::from_str(r#"{ "dbname": "shop" }"#).unwrap();
        assert_eq!(params.dbname, "shop");
        assert_eq!(params.port, 5432);
    }
}
