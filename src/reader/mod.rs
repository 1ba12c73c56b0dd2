//! Data source abstraction layer
//!
//! Readers execute SQL queries against a backend and return ordered [`Row`]s.
//! The engine treats the query as a blocking call with no retry or timeout of
//! its own; both belong to the connection layer. Failures surface as
//! [`DbplotError::Query`] and are propagated untouched.

use crate::{Result, Row, Value};

pub mod connection;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteReader;

#[cfg(feature = "postgres")]
pub use postgres::PostgresReader;

/// Trait for data source readers.
pub trait Reader {
    /// Execute a SQL query with positional bind parameters and return the
    /// result rows in query order.
    fn execute_sql(&self, sql: &str, binds: &[Value]) -> Result<Vec<Row>>;
}

/// Open a reader for a connection string, picking the backend by scheme.
pub fn open(uri: &str) -> Result<Box<dyn Reader>> {
    #[cfg(not(all(feature = "sqlite", feature = "postgres")))]
    use crate::DbplotError;
    use connection::ConnectionInfo;

    match connection::parse_connection_string(uri)? {
        ConnectionInfo::SqliteMemory | ConnectionInfo::SqliteFile(_) => {
            #[cfg(feature = "sqlite")]
            {
                return Ok(Box::new(SqliteReader::from_connection_string(uri)?));
            }
            #[cfg(not(feature = "sqlite"))]
            Err(DbplotError::Reader(
                "sqlite support not compiled in; rebuild with --features sqlite".to_string(),
            ))
        }
        ConnectionInfo::Postgres(_uri) => {
            #[cfg(feature = "postgres")]
            {
                return Ok(Box::new(PostgresReader::connect(&_uri)?));
            }
            #[cfg(not(feature = "postgres"))]
            Err(DbplotError::Reader(
                "postgres support not compiled in; rebuild with --features postgres".to_string(),
            ))
        }
    }
}
