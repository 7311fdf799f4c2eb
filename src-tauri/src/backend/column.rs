use rusqlite::{Connection, params};
use crate::backend::{db, table, ColumnMetadata};
use crate::util::error;

/// Lists the columns of a table in declaration order.
pub fn list(conn: &Connection, table_name: &str) -> Result<Vec<ColumnMetadata>, error::Error> {
    if !table::exists(conn, table_name)? {
        return Err(error::Error::UnknownTable(table_name.to_string()));
    }

    let mut columns: Vec<ColumnMetadata> = Vec::new();
    db::query_iterate(conn,
        "SELECT
            name,
            type,
            \"notnull\",
            pk
        FROM pragma_table_info(?1)
        ORDER BY cid;",
        params![table_name],
        &mut |row| {
            columns.push(ColumnMetadata {
                name: row.get(0)?,
                data_type: row.get(1)?,
                nullable: row.get::<_, i64>(2)? == 0,
                primary_key: row.get::<_, i64>(3)? > 0,
            });
            return Ok(());
        }
    )?;
    return Ok(columns);
}
