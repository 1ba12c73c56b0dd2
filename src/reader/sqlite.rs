//! SQLite reader backed by rusqlite

use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::Connection;

use super::connection::{parse_connection_string, ConnectionInfo};
use crate::{DbplotError, Result, Row, Value};

impl rusqlite::ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Number(n) => ToSqlOutput::Owned(rusqlite::types::Value::Real(*n)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

/// Reader for SQLite databases (in-memory or file-based).
pub struct SqliteReader {
    conn: Connection,
}

impl SqliteReader {
    /// Open from a `sqlite://` connection string.
    pub fn from_connection_string(uri: &str) -> Result<SqliteReader> {
        let conn = match parse_connection_string(uri)? {
            ConnectionInfo::SqliteMemory => Connection::open_in_memory(),
            ConnectionInfo::SqliteFile(path) => Connection::open(path),
            other => {
                return Err(DbplotError::Reader(format!(
                    "not a SQLite connection string: {:?}",
                    other
                )))
            }
        }
        .map_err(|e| DbplotError::Reader(e.to_string()))?;
        Ok(SqliteReader { conn })
    }

    /// Wrap an existing connection (useful for pre-seeded test databases).
    pub fn from_connection(conn: Connection) -> SqliteReader {
        SqliteReader { conn }
    }

    /// Run a statement that returns no rows (schema setup, inserts).
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| DbplotError::Query(e.to_string()))
    }
}

impl super::Reader for SqliteReader {
    fn execute_sql(&self, sql: &str, binds: &[Value]) -> Result<Vec<Row>> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| DbplotError::Query(e.to_string()))?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

        let mut rows = Vec::new();
        let mut result = stmt
            .query(rusqlite::params_from_iter(binds))
            .map_err(|e| DbplotError::Query(e.to_string()))?;
        while let Some(sqlite_row) = result.next().map_err(|e| DbplotError::Query(e.to_string()))? {
            let mut values = Vec::with_capacity(columns.len());
            for (i, name) in columns.iter().enumerate() {
                let value = match sqlite_row.get_ref(i) {
                    Ok(ValueRef::Null) => Value::Null,
                    Ok(ValueRef::Integer(n)) => Value::Number(n as f64),
                    Ok(ValueRef::Real(f)) => Value::Number(f),
                    Ok(ValueRef::Text(t)) => Value::Text(String::from_utf8_lossy(t).into_owned()),
                    // blobs are not plottable
                    Ok(ValueRef::Blob(_)) | Err(_) => Value::Null,
                };
                values.push((name.clone(), value));
            }
            rows.push(Row::new(values));
        }
        Ok(rows)
    }
}
