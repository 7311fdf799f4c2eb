use rusqlite::{Connection, params};
use crate::backend::NewUser;
use crate::util::error;

/// Registers an application user, creating the user table on first use.
pub fn create(conn: &mut Connection, new_user: &NewUser) -> Result<(), error::Error> {
    let trans = conn.transaction()?;
    trans.execute_batch("
    CREATE TABLE IF NOT EXISTS app_users (
        username TEXT PRIMARY KEY,
        email TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    );")?;
    trans.execute(
        "INSERT INTO app_users (username, email) VALUES (?1, ?2);",
        params![new_user.username.trim(), new_user.email.trim()]
    )?;
    trans.commit()?;
    tracing::info!(username = %new_user.username.trim(), "created user");
    return Ok(());
}
