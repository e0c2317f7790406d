use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;

use health_pulse_data::models::format_timestamp;

use crate::entities::conversions;
use crate::entities::{HealthAlert, NewHealthAlert};
use super::errors::ServiceError;
use super::{effective_limit, Repositories, SharedAlertRepository};

/// Trait for alert service operations
#[async_trait]
pub trait AlertServiceTrait: Send + Sync {
    /// Store a new alert for the user
    async fn raise_alert(&self, user_id: Uuid, alert: NewHealthAlert) -> Result<HealthAlert, ServiceError>;

    /// The caller's alerts, newest first
    async fn list_alerts(
        &self,
        user_id: Uuid,
        unresolved_only: bool,
        limit: Option<usize>,
    ) -> Result<Vec<HealthAlert>, ServiceError>;

    async fn mark_alert_read(&self, user_id: Uuid, id: Uuid) -> Result<HealthAlert, ServiceError>;

    /// Mark the alert resolved as of now
    async fn resolve_alert(&self, user_id: Uuid, id: Uuid) -> Result<HealthAlert, ServiceError>;

    async fn delete_alert(&self, user_id: Uuid, id: Uuid) -> Result<(), ServiceError>;
}

/// Alert service for domain logic
pub struct AlertService {
    alerts: SharedAlertRepository,
}

impl AlertService {
    pub fn new(alerts: SharedAlertRepository) -> Self {
        Self { alerts }
    }
}

fn found(alert: Option<health_pulse_data::models::HealthAlert>, id: Uuid) -> Result<HealthAlert, ServiceError> {
    let alert = alert.ok_or_else(|| ServiceError::not_found("Alert", id))?;
    conversions::convert_to_domain_alert(alert).map_err(ServiceError::Repository)
}

#[async_trait]
impl AlertServiceTrait for AlertService {
    #[instrument(skip(self, alert))]
    async fn raise_alert(&self, user_id: Uuid, alert: NewHealthAlert) -> Result<HealthAlert, ServiceError> {
        let stored = self
            .alerts
            .create(conversions::convert_to_data_alert_request(user_id, alert))
            .await?;
        conversions::convert_to_domain_alert(stored).map_err(ServiceError::Repository)
    }

    #[instrument(skip(self))]
    async fn list_alerts(
        &self,
        user_id: Uuid,
        unresolved_only: bool,
        limit: Option<usize>,
    ) -> Result<Vec<HealthAlert>, ServiceError> {
        self.alerts
            .list_for_user(&user_id.to_string(), unresolved_only, Some(effective_limit(limit)))
            .await?
            .into_iter()
            .map(conversions::convert_to_domain_alert)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ServiceError::Repository)
    }

    #[instrument(skip(self))]
    async fn mark_alert_read(&self, user_id: Uuid, id: Uuid) -> Result<HealthAlert, ServiceError> {
        let updated = self.alerts.mark_read(&user_id.to_string(), &id.to_string()).await?;
        found(updated, id)
    }

    #[instrument(skip(self))]
    async fn resolve_alert(&self, user_id: Uuid, id: Uuid) -> Result<HealthAlert, ServiceError> {
        let resolved_at = format_timestamp(Utc::now());
        let updated = self
            .alerts
            .resolve(&user_id.to_string(), &id.to_string(), &resolved_at)
            .await?;
        found(updated, id)
    }

    #[instrument(skip(self))]
    async fn delete_alert(&self, user_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        if self.alerts.delete(&user_id.to_string(), &id.to_string()).await? {
            Ok(())
        } else {
            Err(ServiceError::not_found("Alert", id))
        }
    }
}

/// Create an alert service over the given repositories
pub fn create_alert_service(repositories: &Repositories) -> Arc<dyn AlertServiceTrait + Send + Sync> {
    Arc::new(AlertService::new(repositories.alerts.clone()))
}
