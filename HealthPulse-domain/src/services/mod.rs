// Domain services
// This module contains business logic implementations.

use std::sync::Arc;

use health_pulse_data::repository::{
    HealthAlertRepository, HealthAlertRepositoryTrait, HealthMetricRepository, HealthMetricRepositoryTrait,
    InsightRepository, InsightRepositoryTrait, MedicationRepository, MedicationRepositoryTrait,
    ProfileRepository, ProfileRepositoryTrait,
};

pub mod alerts;
pub mod analysis;
pub mod chat;
pub mod classifier;
pub mod errors;
pub mod insights;
pub mod medications;
pub mod metrics;
pub mod profile;
pub mod rules;

pub use alerts::{create_alert_service, AlertServiceTrait};
pub use analysis::{create_analysis_service, AnalysisServiceTrait};
pub use chat::{create_chat_service, ChatServiceTrait};
pub use errors::ServiceError;
pub use insights::{create_insight_service, InsightServiceTrait};
pub use medications::{create_medication_service, MedicationServiceTrait};
pub use metrics::{create_metric_service, MetricServiceTrait};
pub use profile::{create_profile_service, ProfileServiceTrait};

pub type SharedProfileRepository = Arc<dyn ProfileRepositoryTrait + Send + Sync>;
pub type SharedMetricRepository = Arc<dyn HealthMetricRepositoryTrait + Send + Sync>;
pub type SharedMedicationRepository = Arc<dyn MedicationRepositoryTrait + Send + Sync>;
pub type SharedAlertRepository = Arc<dyn HealthAlertRepositoryTrait + Send + Sync>;
pub type SharedInsightRepository = Arc<dyn InsightRepositoryTrait + Send + Sync>;

/// One handle per table. Services that read across tables share these, so
/// the in-memory backend sees a single store.
#[derive(Clone)]
pub struct Repositories {
    pub profiles: SharedProfileRepository,
    pub metrics: SharedMetricRepository,
    pub medications: SharedMedicationRepository,
    pub alerts: SharedAlertRepository,
    pub insights: SharedInsightRepository,
}

impl Repositories {
    /// Repositories on the global pool, or in memory when no pool was initialized
    pub fn detect() -> Self {
        Self {
            profiles: Arc::new(ProfileRepository::new()),
            metrics: Arc::new(HealthMetricRepository::new()),
            medications: Arc::new(MedicationRepository::new()),
            alerts: Arc::new(HealthAlertRepository::new()),
            insights: Arc::new(InsightRepository::new()),
        }
    }

    /// Fresh in-memory repositories
    pub fn in_memory() -> Self {
        Self {
            profiles: Arc::new(ProfileRepository::in_memory()),
            metrics: Arc::new(HealthMetricRepository::in_memory()),
            medications: Arc::new(MedicationRepository::in_memory()),
            alerts: Arc::new(HealthAlertRepository::in_memory()),
            insights: Arc::new(InsightRepository::in_memory()),
        }
    }
}

/// Default list size when the caller gives none
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// Largest list size a caller may ask for
pub const MAX_LIST_LIMIT: usize = 500;

/// Apply the default and clamp to the maximum
pub fn effective_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_limit() {
        assert_eq!(effective_limit(None), 100);
        assert_eq!(effective_limit(Some(5)), 5);
        assert_eq!(effective_limit(Some(0)), 1);
        assert_eq!(effective_limit(Some(10_000)), 500);
    }
}
