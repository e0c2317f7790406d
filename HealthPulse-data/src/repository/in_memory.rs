use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::errors::RepositoryError;

/// In-process table keyed by record id.
///
/// Used when no database pool has been initialized, and by tests. Clones
/// share the same underlying rows.
#[derive(Debug)]
pub struct InMemoryTable<T> {
    rows: Arc<Mutex<HashMap<String, T>>>,
}

impl<T> Clone for InMemoryTable<T> {
    fn clone(&self) -> Self {
        Self { rows: Arc::clone(&self.rows) }
    }
}

impl<T> Default for InMemoryTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> InMemoryTable<T> {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            rows: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<T: Clone> InMemoryTable<T> {
    /// Insert or replace a row
    pub fn insert(&self, id: &str, row: T) -> Result<T, RepositoryError> {
        let mut rows = self.rows.lock()?;
        rows.insert(id.to_string(), row.clone());
        Ok(row)
    }

    /// Fetch a row by id
    pub fn get(&self, id: &str) -> Result<Option<T>, RepositoryError> {
        let rows = self.rows.lock()?;
        Ok(rows.get(id).cloned())
    }

    /// All rows matching a predicate, in no particular order
    pub fn select<F>(&self, filter: F) -> Result<Vec<T>, RepositoryError>
    where
        F: Fn(&T) -> bool,
    {
        let rows = self.rows.lock()?;
        Ok(rows.values().filter(|row| filter(row)).cloned().collect())
    }

    /// Apply `change` to the row with the given id if it passes `filter`
    pub fn update<P, F>(&self, id: &str, filter: P, change: F) -> Result<Option<T>, RepositoryError>
    where
        P: Fn(&T) -> bool,
        F: FnOnce(&mut T),
    {
        let mut rows = self.rows.lock()?;
        match rows.get_mut(id) {
            Some(row) if filter(row) => {
                change(row);
                Ok(Some(row.clone()))
            }
            _ => Ok(None),
        }
    }

    /// Remove every row matching a predicate, returning how many were removed
    pub fn delete_where<F>(&self, filter: F) -> Result<usize, RepositoryError>
    where
        F: Fn(&T) -> bool,
    {
        let mut rows = self.rows.lock()?;
        let before = rows.len();
        rows.retain(|_, row| !filter(row));
        Ok(before - rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_rows() {
        let table: InMemoryTable<String> = InMemoryTable::new();
        let other = table.clone();

        table.insert("a", "first".to_string()).unwrap();
        assert_eq!(other.get("a").unwrap(), Some("first".to_string()));
    }

    #[test]
    fn test_update_respects_filter() {
        let table: InMemoryTable<(String, u32)> = InMemoryTable::new();
        table.insert("a", ("owner-1".to_string(), 1)).unwrap();

        let missed = table.update("a", |row| row.0 == "owner-2", |row| row.1 = 99).unwrap();
        assert!(missed.is_none());

        let hit = table.update("a", |row| row.0 == "owner-1", |row| row.1 = 2).unwrap();
        assert_eq!(hit, Some(("owner-1".to_string(), 2)));
    }

    #[test]
    fn test_delete_where_counts_removed_rows() {
        let table: InMemoryTable<u32> = InMemoryTable::new();
        for i in 0..5 {
            table.insert(&i.to_string(), i).unwrap();
        }

        let removed = table.delete_where(|value| value % 2 == 0).unwrap();
        assert_eq!(removed, 3);
        assert_eq!(table.select(|_| true).unwrap().len(), 2);
    }
}
