use rusqlite::{Connection, params};
use crate::backend::{db, ColumnType, CreateTableRequest};
use crate::util::error;

/// Lists the names of all user tables, in name order.
pub fn list(conn: &Connection) -> Result<Vec<String>, error::Error> {
    let mut names: Vec<String> = Vec::new();
    db::query_iterate(conn,
        "SELECT
            name
        FROM sqlite_master
        WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
        ORDER BY name ASC;", [],
        &mut |row| {
            names.push(row.get::<_, String>(0)?);
            return Ok(());
        }
    )?;
    return Ok(names);
}

/// Whether a table with exactly this name exists.
pub fn exists(conn: &Connection, name: &str) -> Result<bool, error::Error> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1;",
        params![name],
        |row| row.get(0)
    )?;
    return Ok(count > 0);
}

/// Builds the CREATE TABLE statement for a request, rejecting anything that cannot be expressed safely.
pub fn create_table_sql(request: &CreateTableRequest) -> Result<String, error::Error> {
    let table_name = request.table_name.trim();
    if table_name.is_empty() {
        return Err(error::Error::AdhocError("Table name required"));
    }
    if request.columns.is_empty() {
        return Err(error::Error::AdhocError("At least one column required"));
    }

    let mut column_defs: Vec<String> = Vec::with_capacity(request.columns.len());
    for column in &request.columns {
        let column_name = column.name.trim();
        if column_name.is_empty() {
            return Err(error::Error::AdhocError("All columns must have a name"));
        }
        let column_type: ColumnType = column.column_type.parse()?;
        column_defs.push(format!("{} {}", db::quote_ident(column_name), column_type));
    }

    return Ok(format!("CREATE TABLE {} ({});", db::quote_ident(table_name), column_defs.join(", ")));
}

/// Creates a new table.
pub fn create(conn: &mut Connection, request: &CreateTableRequest) -> Result<(), error::Error> {
    let create_table_cmd = create_table_sql(request)?;
    let trans = conn.transaction()?;
    trans.execute(&create_table_cmd, [])?;
    trans.commit()?;
    tracing::info!(table = %request.table_name.trim(), columns = request.columns.len(), "created table");
    return Ok(());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ColumnSpec;

    fn spec(name: &str, column_type: &str) -> ColumnSpec {
        ColumnSpec { name: name.to_string(), column_type: column_type.to_string() }
    }

    #[test]
    fn ddl_keeps_column_order_and_quotes_names() {
        let request = CreateTableRequest {
            table_name: String::from("order items"),
            columns: vec![spec("id", "INTEGER"), spec("unit price", "double precision"), spec("note", "TEXT")],
        };
        assert_eq!(
            create_table_sql(&request).unwrap(),
            "CREATE TABLE \"order items\" (\"id\" INTEGER, \"unit price\" DOUBLE PRECISION, \"note\" TEXT);"
        );
    }

    #[test]
    fn ddl_rejects_unknown_types() {
        let request = CreateTableRequest {
            table_name: String::from("t"),
            columns: vec![spec("a", "TEXT); DROP TABLE t; --")],
        };
        assert!(matches!(create_table_sql(&request), Err(error::Error::UnknownColumnType(_))));
    }

    #[test]
    fn ddl_rejects_empty_requests() {
        let request = CreateTableRequest { table_name: String::from("t"), columns: vec![] };
        assert!(create_table_sql(&request).is_err());
    }
}
