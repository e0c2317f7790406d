use std::sync::Arc;

use health_pulse_domain::health::{create_health_service, HealthServiceTrait};
use health_pulse_domain::llm::SharedLanguageModel;
use health_pulse_domain::services::{
    create_alert_service, create_analysis_service, create_chat_service, create_insight_service,
    create_medication_service, create_metric_service, create_profile_service, AlertServiceTrait,
    AnalysisServiceTrait, ChatServiceTrait, InsightServiceTrait, MedicationServiceTrait, MetricServiceTrait,
    ProfileServiceTrait, Repositories,
};

/// Services shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub profiles: Arc<dyn ProfileServiceTrait + Send + Sync>,
    pub metrics: Arc<dyn MetricServiceTrait + Send + Sync>,
    pub medications: Arc<dyn MedicationServiceTrait + Send + Sync>,
    pub alerts: Arc<dyn AlertServiceTrait + Send + Sync>,
    pub insights: Arc<dyn InsightServiceTrait + Send + Sync>,
    pub analysis: Arc<dyn AnalysisServiceTrait + Send + Sync>,
    pub chat: Arc<dyn ChatServiceTrait + Send + Sync>,
    pub health: Arc<dyn HealthServiceTrait + Send + Sync>,
}

impl AppState {
    /// Wire every service over the same repositories
    pub fn new(repositories: &Repositories, language_model: Option<SharedLanguageModel>) -> Self {
        Self {
            profiles: create_profile_service(repositories),
            metrics: create_metric_service(repositories),
            medications: create_medication_service(repositories),
            alerts: create_alert_service(repositories),
            insights: create_insight_service(repositories),
            health: create_health_service(language_model.is_some()),
            analysis: create_analysis_service(repositories, language_model.clone()),
            chat: create_chat_service(repositories, language_model),
        }
    }
}
