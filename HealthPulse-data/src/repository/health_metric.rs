use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;
use uuid::Uuid;

use crate::database::DatabasePool;
use crate::models::{now_timestamp, CreateHealthMetricRequest, HealthMetric};
use super::errors::RepositoryError;
use super::storage::{sql_limit, take_limit, StorageBackend};

/// Repository trait for health metrics
#[async_trait]
pub trait HealthMetricRepositoryTrait {
    /// Store a new metric
    async fn create(&self, request: CreateHealthMetricRequest) -> Result<HealthMetric, RepositoryError>;

    /// A user's metrics, newest `recorded_at` first, optionally narrowed to one type
    async fn list_for_user(
        &self,
        user_id: &str,
        metric_type: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<HealthMetric>, RepositoryError>;

    /// Get one of a user's metrics by id
    async fn get_by_id(&self, user_id: &str, id: &str) -> Result<Option<HealthMetric>, RepositoryError>;

    /// Delete one of a user's metrics. Returns false when nothing matched.
    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, RepositoryError>;
}

/// Repository for health metrics
#[derive(Debug, Clone)]
pub struct HealthMetricRepository {
    backend: StorageBackend<HealthMetric>,
}

impl Default for HealthMetricRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthMetricRepository {
    /// Create a repository on the global pool, or in memory when there is none
    pub fn new() -> Self {
        Self { backend: StorageBackend::detect("health_metrics") }
    }

    /// Create a repository that keeps everything in memory
    pub fn in_memory() -> Self {
        Self { backend: StorageBackend::memory() }
    }

    /// Create a repository on an explicit pool
    pub fn with_pool(pool: DatabasePool) -> Self {
        Self { backend: StorageBackend::Database(pool) }
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, user_id, metric_type, value, unit, systolic, diastolic, notes, recorded_at, created_at
     FROM health_metrics";

fn map_row(row: &Row<'_>) -> rusqlite::Result<HealthMetric> {
    Ok(HealthMetric {
        id: row.get(0)?,
        user_id: row.get(1)?,
        metric_type: row.get(2)?,
        value: row.get(3)?,
        unit: row.get(4)?,
        systolic: row.get(5)?,
        diastolic: row.get(6)?,
        notes: row.get(7)?,
        recorded_at: row.get(8)?,
        created_at: row.get(9)?,
    })
}

#[async_trait]
impl HealthMetricRepositoryTrait for HealthMetricRepository {
    async fn create(&self, request: CreateHealthMetricRequest) -> Result<HealthMetric, RepositoryError> {
        let metric = HealthMetric {
            id: Uuid::new_v4().to_string(),
            user_id: request.user_id,
            metric_type: request.metric_type,
            value: request.value,
            unit: request.unit,
            systolic: request.systolic,
            diastolic: request.diastolic,
            notes: request.notes,
            recorded_at: request.recorded_at,
            created_at: now_timestamp(),
        };

        match &self.backend {
            StorageBackend::Database(pool) => {
                debug!("Storing health metric in database: {}", metric.id);
                let conn = pool.connection()?;
                conn.execute(
                    "INSERT INTO health_metrics
                     (id, user_id, metric_type, value, unit, systolic, diastolic, notes, recorded_at, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    params![
                        metric.id,
                        metric.user_id,
                        metric.metric_type,
                        metric.value,
                        metric.unit,
                        metric.systolic,
                        metric.diastolic,
                        metric.notes,
                        metric.recorded_at,
                        metric.created_at,
                    ],
                )?;
                Ok(metric)
            }
            StorageBackend::Memory(table) => table.insert(&metric.id.clone(), metric),
        }
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        metric_type: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<HealthMetric>, RepositoryError> {
        match &self.backend {
            StorageBackend::Database(pool) => {
                let conn = pool.connection()?;
                let mut stmt = conn.prepare(&format!(
                    "{} WHERE user_id = ?1 AND (?2 IS NULL OR metric_type = ?2)
                     ORDER BY recorded_at DESC LIMIT ?3",
                    SELECT_COLUMNS
                ))?;
                let rows = stmt.query_map(params![user_id, metric_type, sql_limit(limit)], map_row)?;
                Ok(rows.collect::<Result<Vec<_>, _>>()?)
            }
            StorageBackend::Memory(table) => {
                let mut metrics = table.select(|m| {
                    m.user_id == user_id && metric_type.map_or(true, |t| m.metric_type == t)
                })?;
                metrics.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
                Ok(take_limit(metrics, limit))
            }
        }
    }

    async fn get_by_id(&self, user_id: &str, id: &str) -> Result<Option<HealthMetric>, RepositoryError> {
        match &self.backend {
            StorageBackend::Database(pool) => {
                let conn = pool.connection()?;
                let metric = conn.query_row(
                    &format!("{} WHERE id = ?1 AND user_id = ?2", SELECT_COLUMNS),
                    params![id, user_id],
                    map_row,
                ).optional()?;
                Ok(metric)
            }
            StorageBackend::Memory(table) => {
                Ok(table.get(id)?.filter(|m| m.user_id == user_id))
            }
        }
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, RepositoryError> {
        match &self.backend {
            StorageBackend::Database(pool) => {
                let conn = pool.connection()?;
                let removed = conn.execute(
                    "DELETE FROM health_metrics WHERE id = ?1 AND user_id = ?2",
                    params![id, user_id],
                )?;
                Ok(removed > 0)
            }
            StorageBackend::Memory(table) => {
                Ok(table.delete_where(|m| m.id == id && m.user_id == user_id)? > 0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_in_memory_pool;

    fn request(user_id: &str, metric_type: &str, value: f64, recorded_at: &str) -> CreateHealthMetricRequest {
        CreateHealthMetricRequest {
            user_id: user_id.to_string(),
            metric_type: metric_type.to_string(),
            value,
            unit: "bpm".to_string(),
            systolic: None,
            diastolic: None,
            notes: None,
            recorded_at: recorded_at.to_string(),
        }
    }

    async fn exercise_repository(repo: HealthMetricRepository) {
        repo.create(request("u1", "heart_rate", 70.0, "2024-01-01T08:00:00.000000Z")).await.unwrap();
        repo.create(request("u1", "heart_rate", 75.0, "2024-01-03T08:00:00.000000Z")).await.unwrap();
        repo.create(request("u1", "weight", 160.0, "2024-01-02T08:00:00.000000Z")).await.unwrap();
        let other = repo.create(request("u2", "heart_rate", 90.0, "2024-01-04T08:00:00.000000Z")).await.unwrap();

        let all = repo.list_for_user("u1", None, None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].value, 75.0);
        assert_eq!(all[2].value, 70.0);

        let heart = repo.list_for_user("u1", Some("heart_rate"), Some(1)).await.unwrap();
        assert_eq!(heart.len(), 1);
        assert_eq!(heart[0].value, 75.0);

        // Another user's record is invisible
        assert!(repo.get_by_id("u1", &other.id).await.unwrap().is_none());
        assert!(!repo.delete("u1", &other.id).await.unwrap());
        assert!(repo.delete("u2", &other.id).await.unwrap());
        assert!(repo.get_by_id("u2", &other.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_in_memory_repository() {
        exercise_repository(HealthMetricRepository::in_memory()).await;
    }

    #[tokio::test]
    async fn test_sqlite_repository() {
        let pool = create_in_memory_pool().unwrap();
        exercise_repository(HealthMetricRepository::with_pool(pool)).await;
    }
}
