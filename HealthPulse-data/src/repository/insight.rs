use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;
use uuid::Uuid;

use crate::database::DatabasePool;
use crate::models::{now_timestamp, AiInsight, CreateAiInsightRequest};
use super::errors::RepositoryError;
use super::storage::{encode_list, list_column, sql_limit, take_limit, StorageBackend};

/// Repository trait for generated insights
#[async_trait]
pub trait InsightRepositoryTrait {
    /// Store a new, unread insight
    async fn create(&self, request: CreateAiInsightRequest) -> Result<AiInsight, RepositoryError>;

    /// A user's insights, newest first
    async fn list_for_user(&self, user_id: &str, limit: Option<usize>) -> Result<Vec<AiInsight>, RepositoryError>;

    /// Flag an insight as read. Returns None when nothing matched.
    async fn mark_read(&self, user_id: &str, id: &str) -> Result<Option<AiInsight>, RepositoryError>;
}

/// Repository for generated insights
#[derive(Debug, Clone)]
pub struct InsightRepository {
    backend: StorageBackend<AiInsight>,
}

impl Default for InsightRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightRepository {
    pub fn new() -> Self {
        Self { backend: StorageBackend::detect("ai_insights") }
    }

    pub fn in_memory() -> Self {
        Self { backend: StorageBackend::memory() }
    }

    pub fn with_pool(pool: DatabasePool) -> Self {
        Self { backend: StorageBackend::Database(pool) }
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, user_id, insight_type, title, content, recommendations, confidence_score, is_read, created_at
     FROM ai_insights";

fn map_row(row: &Row<'_>) -> rusqlite::Result<AiInsight> {
    Ok(AiInsight {
        id: row.get(0)?,
        user_id: row.get(1)?,
        insight_type: row.get(2)?,
        title: row.get(3)?,
        content: row.get(4)?,
        recommendations: list_column(row, 5)?.unwrap_or_default(),
        confidence_score: row.get(6)?,
        is_read: row.get(7)?,
        created_at: row.get(8)?,
    })
}

#[async_trait]
impl InsightRepositoryTrait for InsightRepository {
    async fn create(&self, request: CreateAiInsightRequest) -> Result<AiInsight, RepositoryError> {
        let insight = AiInsight {
            id: Uuid::new_v4().to_string(),
            user_id: request.user_id,
            insight_type: request.insight_type,
            title: request.title,
            content: request.content,
            recommendations: request.recommendations,
            confidence_score: request.confidence_score,
            is_read: false,
            created_at: now_timestamp(),
        };

        match &self.backend {
            StorageBackend::Database(pool) => {
                debug!("Storing insight in database: {}", insight.id);
                let recommendations = encode_list(&insight.recommendations)?;
                let conn = pool.connection()?;
                conn.execute(
                    "INSERT INTO ai_insights
                     (id, user_id, insight_type, title, content, recommendations, confidence_score, is_read, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                    params![
                        insight.id,
                        insight.user_id,
                        insight.insight_type,
                        insight.title,
                        insight.content,
                        recommendations,
                        insight.confidence_score,
                        insight.is_read,
                        insight.created_at,
                    ],
                )?;
                Ok(insight)
            }
            StorageBackend::Memory(table) => table.insert(&insight.id.clone(), insight),
        }
    }

    async fn list_for_user(&self, user_id: &str, limit: Option<usize>) -> Result<Vec<AiInsight>, RepositoryError> {
        match &self.backend {
            StorageBackend::Database(pool) => {
                let conn = pool.connection()?;
                let mut stmt = conn.prepare(&format!(
                    "{} WHERE user_id = ?1 ORDER BY created_at DESC LIMIT ?2",
                    SELECT_COLUMNS
                ))?;
                let rows = stmt.query_map(params![user_id, sql_limit(limit)], map_row)?;
                Ok(rows.collect::<Result<Vec<_>, _>>()?)
            }
            StorageBackend::Memory(table) => {
                let mut insights = table.select(|i| i.user_id == user_id)?;
                insights.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                Ok(take_limit(insights, limit))
            }
        }
    }

    async fn mark_read(&self, user_id: &str, id: &str) -> Result<Option<AiInsight>, RepositoryError> {
        match &self.backend {
            StorageBackend::Database(pool) => {
                let changed = pool.connection()?.execute(
                    "UPDATE ai_insights SET is_read = 1 WHERE id = ?1 AND user_id = ?2",
                    params![id, user_id],
                )?;
                if changed == 0 {
                    return Ok(None);
                }
                let conn = pool.connection()?;
                let insight = conn.query_row(
                    &format!("{} WHERE id = ?1 AND user_id = ?2", SELECT_COLUMNS),
                    params![id, user_id],
                    map_row,
                ).optional()?;
                Ok(insight)
            }
            StorageBackend::Memory(table) => {
                table.update(id, |i| i.user_id == user_id, |i| i.is_read = true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_in_memory_pool;

    fn request(user_id: &str, title: &str) -> CreateAiInsightRequest {
        CreateAiInsightRequest {
            user_id: user_id.to_string(),
            insight_type: "nutrition".to_string(),
            title: title.to_string(),
            content: "Eat well".to_string(),
            recommendations: vec!["Drink water".to_string(), "Eat vegetables".to_string()],
            confidence_score: Some(0.85),
        }
    }

    async fn exercise_repository(repo: InsightRepository) {
        let created = repo.create(request("u1", "Balanced Nutrition")).await.unwrap();
        repo.create(request("u2", "Someone else")).await.unwrap();

        let listed = repo.list_for_user("u1", Some(3)).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].recommendations.len(), 2);
        assert_eq!(listed[0].confidence_score, Some(0.85));
        assert!(!listed[0].is_read);

        assert!(repo.mark_read("u2", &created.id).await.unwrap().is_none());
        let read = repo.mark_read("u1", &created.id).await.unwrap().unwrap();
        assert!(read.is_read);
    }

    #[tokio::test]
    async fn test_in_memory_repository() {
        exercise_repository(InsightRepository::in_memory()).await;
    }

    #[tokio::test]
    async fn test_sqlite_repository() {
        let pool = create_in_memory_pool().unwrap();
        exercise_repository(InsightRepository::with_pool(pool)).await;
    }
}
