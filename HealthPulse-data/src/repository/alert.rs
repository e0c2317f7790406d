use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;
use uuid::Uuid;

use crate::database::DatabasePool;
use crate::models::{now_timestamp, CreateHealthAlertRequest, HealthAlert};
use super::errors::RepositoryError;
use super::storage::{sql_limit, take_limit, StorageBackend};

/// Repository trait for health alerts
#[async_trait]
pub trait HealthAlertRepositoryTrait {
    /// Store a new, unread and unresolved alert
    async fn create(&self, request: CreateHealthAlertRequest) -> Result<HealthAlert, RepositoryError>;

    /// A user's alerts, newest first
    async fn list_for_user(
        &self,
        user_id: &str,
        unresolved_only: bool,
        limit: Option<usize>,
    ) -> Result<Vec<HealthAlert>, RepositoryError>;

    /// Flag an alert as read. Returns None when nothing matched.
    async fn mark_read(&self, user_id: &str, id: &str) -> Result<Option<HealthAlert>, RepositoryError>;

    /// Flag an alert as resolved at `resolved_at`. Returns None when nothing matched.
    async fn resolve(&self, user_id: &str, id: &str, resolved_at: &str) -> Result<Option<HealthAlert>, RepositoryError>;

    /// Delete an alert. Returns false when nothing matched.
    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, RepositoryError>;
}

/// Repository for health alerts
#[derive(Debug, Clone)]
pub struct HealthAlertRepository {
    backend: StorageBackend<HealthAlert>,
}

impl Default for HealthAlertRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthAlertRepository {
    pub fn new() -> Self {
        Self { backend: StorageBackend::detect("health_alerts") }
    }

    pub fn in_memory() -> Self {
        Self { backend: StorageBackend::memory() }
    }

    pub fn with_pool(pool: DatabasePool) -> Self {
        Self { backend: StorageBackend::Database(pool) }
    }

    fn fetch(&self, pool: &DatabasePool, user_id: &str, id: &str) -> Result<Option<HealthAlert>, RepositoryError> {
        let conn = pool.connection()?;
        let alert = conn.query_row(
            &format!("{} WHERE id = ?1 AND user_id = ?2", SELECT_COLUMNS),
            params![id, user_id],
            map_row,
        ).optional()?;
        Ok(alert)
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, user_id, alert_type, severity, title, message, related_metric_id,
            related_medication_id, is_read, is_resolved, created_at, resolved_at
     FROM health_alerts";

fn map_row(row: &Row<'_>) -> rusqlite::Result<HealthAlert> {
    Ok(HealthAlert {
        id: row.get(0)?,
        user_id: row.get(1)?,
        alert_type: row.get(2)?,
        severity: row.get(3)?,
        title: row.get(4)?,
        message: row.get(5)?,
        related_metric_id: row.get(6)?,
        related_medication_id: row.get(7)?,
        is_read: row.get(8)?,
        is_resolved: row.get(9)?,
        created_at: row.get(10)?,
        resolved_at: row.get(11)?,
    })
}

#[async_trait]
impl HealthAlertRepositoryTrait for HealthAlertRepository {
    async fn create(&self, request: CreateHealthAlertRequest) -> Result<HealthAlert, RepositoryError> {
        let alert = HealthAlert {
            id: Uuid::new_v4().to_string(),
            user_id: request.user_id,
            alert_type: request.alert_type,
            severity: request.severity,
            title: request.title,
            message: request.message,
            related_metric_id: request.related_metric_id,
            related_medication_id: request.related_medication_id,
            is_read: false,
            is_resolved: false,
            created_at: now_timestamp(),
            resolved_at: None,
        };

        match &self.backend {
            StorageBackend::Database(pool) => {
                debug!("Storing health alert in database: {}", alert.id);
                let conn = pool.connection()?;
                conn.execute(
                    "INSERT INTO health_alerts
                     (id, user_id, alert_type, severity, title, message, related_metric_id,
                      related_medication_id, is_read, is_resolved, created_at, resolved_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                    params![
                        alert.id,
                        alert.user_id,
                        alert.alert_type,
                        alert.severity,
                        alert.title,
                        alert.message,
                        alert.related_metric_id,
                        alert.related_medication_id,
                        alert.is_read,
                        alert.is_resolved,
                        alert.created_at,
                        alert.resolved_at,
                    ],
                )?;
                Ok(alert)
            }
            StorageBackend::Memory(table) => table.insert(&alert.id.clone(), alert),
        }
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        unresolved_only: bool,
        limit: Option<usize>,
    ) -> Result<Vec<HealthAlert>, RepositoryError> {
        match &self.backend {
            StorageBackend::Database(pool) => {
                let conn = pool.connection()?;
                let mut stmt = conn.prepare(&format!(
                    "{} WHERE user_id = ?1 AND (?2 = 0 OR is_resolved = 0)
                     ORDER BY created_at DESC LIMIT ?3",
                    SELECT_COLUMNS
                ))?;
                let rows = stmt.query_map(params![user_id, unresolved_only, sql_limit(limit)], map_row)?;
                Ok(rows.collect::<Result<Vec<_>, _>>()?)
            }
            StorageBackend::Memory(table) => {
                let mut alerts = table.select(|a| {
                    a.user_id == user_id && (!unresolved_only || !a.is_resolved)
                })?;
                alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                Ok(take_limit(alerts, limit))
            }
        }
    }

    async fn mark_read(&self, user_id: &str, id: &str) -> Result<Option<HealthAlert>, RepositoryError> {
        match &self.backend {
            StorageBackend::Database(pool) => {
                let changed = pool.connection()?.execute(
                    "UPDATE health_alerts SET is_read = 1 WHERE id = ?1 AND user_id = ?2",
                    params![id, user_id],
                )?;
                if changed == 0 {
                    return Ok(None);
                }
                self.fetch(pool, user_id, id)
            }
            StorageBackend::Memory(table) => {
                table.update(id, |a| a.user_id == user_id, |a| a.is_read = true)
            }
        }
    }

    async fn resolve(&self, user_id: &str, id: &str, resolved_at: &str) -> Result<Option<HealthAlert>, RepositoryError> {
        match &self.backend {
            StorageBackend::Database(pool) => {
                let changed = pool.connection()?.execute(
                    "UPDATE health_alerts SET is_resolved = 1, resolved_at = ?1 WHERE id = ?2 AND user_id = ?3",
                    params![resolved_at, id, user_id],
                )?;
                if changed == 0 {
                    return Ok(None);
                }
                self.fetch(pool, user_id, id)
            }
            StorageBackend::Memory(table) => table.update(
                id,
                |a| a.user_id == user_id,
                |a| {
                    a.is_resolved = true;
                    a.resolved_at = Some(resolved_at.to_string());
                },
            ),
        }
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, RepositoryError> {
        match &self.backend {
            StorageBackend::Database(pool) => {
                let removed = pool.connection()?.execute(
                    "DELETE FROM health_alerts WHERE id = ?1 AND user_id = ?2",
                    params![id, user_id],
                )?;
                Ok(removed > 0)
            }
            StorageBackend::Memory(table) => {
                Ok(table.delete_where(|a| a.id == id && a.user_id == user_id)? > 0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_in_memory_pool;

    fn request(user_id: &str, title: &str) -> CreateHealthAlertRequest {
        CreateHealthAlertRequest {
            user_id: user_id.to_string(),
            alert_type: "abnormal_reading".to_string(),
            severity: "medium".to_string(),
            title: title.to_string(),
            message: "Check your readings".to_string(),
            related_metric_id: None,
            related_medication_id: None,
        }
    }

    async fn exercise_repository(repo: HealthAlertRepository) {
        let first = repo.create(request("u1", "First")).await.unwrap();
        let second = repo.create(request("u1", "Second")).await.unwrap();
        repo.create(request("u2", "Elsewhere")).await.unwrap();

        let read = repo.mark_read("u1", &first.id).await.unwrap().unwrap();
        assert!(read.is_read);
        assert!(!read.is_resolved);

        let resolved = repo.resolve("u1", &second.id, "2024-05-01T10:00:00.000000Z").await.unwrap().unwrap();
        assert!(resolved.is_resolved);
        assert_eq!(resolved.resolved_at.as_deref(), Some("2024-05-01T10:00:00.000000Z"));

        assert_eq!(repo.list_for_user("u1", false, None).await.unwrap().len(), 2);
        let open = repo.list_for_user("u1", true, None).await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, first.id);

        assert!(repo.mark_read("u2", &first.id).await.unwrap().is_none());
        assert!(!repo.delete("u2", &first.id).await.unwrap());
        assert!(repo.delete("u1", &first.id).await.unwrap());
        assert_eq!(repo.list_for_user("u1", false, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_in_memory_repository() {
        exercise_repository(HealthAlertRepository::in_memory()).await;
    }

    #[tokio::test]
    async fn test_sqlite_repository() {
        let pool = create_in_memory_pool().unwrap();
        exercise_repository(HealthAlertRepository::with_pool(pool)).await;
    }
}
