use rusqlite::types::Type;
use rusqlite::Row;
use tracing::debug;

use crate::database::{get_db_pool, DatabasePool};
use super::in_memory::InMemoryTable;

/// Where a repository keeps its records.
///
/// The choice is made once, when the repository is constructed.
#[derive(Debug, Clone)]
pub enum StorageBackend<T> {
    /// Shared SQLite pool
    Database(DatabasePool),
    /// Process-local table
    Memory(InMemoryTable<T>),
}

impl<T> StorageBackend<T> {
    /// Use the global pool when it has been initialized, in-memory storage otherwise
    pub fn detect(table: &str) -> Self {
        match get_db_pool() {
            Ok(pool) => {
                debug!("Using database storage for {}", table);
                StorageBackend::Database(pool)
            }
            Err(e) => {
                debug!("Database not available ({}), using in-memory storage for {}", e, table);
                StorageBackend::Memory(InMemoryTable::new())
            }
        }
    }

    /// Always keep records in memory
    pub fn memory() -> Self {
        StorageBackend::Memory(InMemoryTable::new())
    }
}

/// SQLite treats a negative LIMIT as "no limit"
pub fn sql_limit(limit: Option<usize>) -> i64 {
    limit.map(|l| l as i64).unwrap_or(-1)
}

/// Truncate an already-sorted list
pub fn take_limit<T>(rows: Vec<T>, limit: Option<usize>) -> Vec<T> {
    match limit {
        Some(limit) => rows.into_iter().take(limit).collect(),
        None => rows,
    }
}

/// Encode a string list as a JSON text column
pub fn encode_list(values: &[String]) -> Result<String, serde_json::Error> {
    serde_json::to_string(values)
}

/// Decode a nullable JSON text column into a string list
pub fn list_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Vec<String>>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(text) => serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_limit() {
        assert_eq!(sql_limit(None), -1);
        assert_eq!(sql_limit(Some(5)), 5);
    }

    #[test]
    fn test_take_limit() {
        assert_eq!(take_limit(vec![1, 2, 3], Some(2)), vec![1, 2]);
        assert_eq!(take_limit(vec![1, 2, 3], None), vec![1, 2, 3]);
    }
}
