use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;
use uuid::Uuid;

use crate::entities::conversions;
use crate::entities::{AiInsight, GeneratedInsight};
use super::errors::ServiceError;
use super::{effective_limit, Repositories, SharedInsightRepository};

/// Trait for insight service operations
#[async_trait]
pub trait InsightServiceTrait: Send + Sync {
    /// Store a generated insight for the user
    async fn save_insight(&self, user_id: Uuid, insight: &GeneratedInsight) -> Result<AiInsight, ServiceError>;

    /// The caller's insights, newest first
    async fn list_insights(&self, user_id: Uuid, limit: Option<usize>) -> Result<Vec<AiInsight>, ServiceError>;

    async fn mark_insight_read(&self, user_id: Uuid, id: Uuid) -> Result<AiInsight, ServiceError>;
}

/// Insight service for domain logic
pub struct InsightService {
    insights: SharedInsightRepository,
}

impl InsightService {
    pub fn new(insights: SharedInsightRepository) -> Self {
        Self { insights }
    }
}

#[async_trait]
impl InsightServiceTrait for InsightService {
    #[instrument(skip(self, insight))]
    async fn save_insight(&self, user_id: Uuid, insight: &GeneratedInsight) -> Result<AiInsight, ServiceError> {
        let stored = self
            .insights
            .create(conversions::convert_to_data_insight_request(user_id, insight))
            .await?;
        conversions::convert_to_domain_insight(stored).map_err(ServiceError::Repository)
    }

    #[instrument(skip(self))]
    async fn list_insights(&self, user_id: Uuid, limit: Option<usize>) -> Result<Vec<AiInsight>, ServiceError> {
        self.insights
            .list_for_user(&user_id.to_string(), Some(effective_limit(limit)))
            .await?
            .into_iter()
            .map(conversions::convert_to_domain_insight)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ServiceError::Repository)
    }

    #[instrument(skip(self))]
    async fn mark_insight_read(&self, user_id: Uuid, id: Uuid) -> Result<AiInsight, ServiceError> {
        let updated = self
            .insights
            .mark_read(&user_id.to_string(), &id.to_string())
            .await?
            .ok_or_else(|| ServiceError::not_found("Insight", id))?;
        conversions::convert_to_domain_insight(updated).map_err(ServiceError::Repository)
    }
}

/// Create an insight service over the given repositories
pub fn create_insight_service(repositories: &Repositories) -> Arc<dyn InsightServiceTrait + Send + Sync> {
    Arc::new(InsightService::new(repositories.insights.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::InsightType;

    #[tokio::test]
    async fn test_save_list_and_mark_read() {
        let service = InsightService::new(Repositories::in_memory().insights);
        let user_id = Uuid::new_v4();
        let generated = GeneratedInsight {
            insight_type: InsightType::Exercise,
            title: "Regular Physical Activity".to_string(),
            content: "Aim for 150 minutes a week".to_string(),
            recommendations: vec!["Take a brisk walk".to_string()],
            confidence_score: 0.9,
        };

        let saved = service.save_insight(user_id, &generated).await.unwrap();
        assert_eq!(saved.insight_type, InsightType::Exercise);
        assert_eq!(saved.confidence_score, Some(0.9));

        let listed = service.list_insights(user_id, Some(3)).await.unwrap();
        assert_eq!(listed.len(), 1);

        assert!(matches!(
            service.mark_insight_read(Uuid::new_v4(), saved.id).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(service.mark_insight_read(user_id, saved.id).await.unwrap().is_read);
    }
}
