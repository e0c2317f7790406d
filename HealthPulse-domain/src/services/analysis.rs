use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::entities::conversions;
use crate::entities::{
    AbnormalReadingRequest, AlertType, HealthAnalysis, HealthDataSummary, HealthMetric, Medication,
    MetricType, NewHealthAlert, Profile, ReadingAssessment, ReadingContext,
};
use crate::entities::analysis::{SummaryMedication, SummaryMetric};
use crate::llm::SharedLanguageModel;
use super::classifier::{classify_reading, ReadingValue};
use super::errors::ServiceError;
use super::medications::convert_medications;
use super::metrics::convert_metrics;
use super::rules::evaluate_health;
use super::Repositories;

/// Recent readings fed into the analysis
pub const ANALYSIS_METRIC_WINDOW: usize = 30;

/// Same-type readings averaged for the abnormal check
pub const HISTORY_WINDOW: usize = 10;

const NOT_SPECIFIED: &str = "not specified";

const ASSESSMENT_SYSTEM_PROMPT: &str = "You are a medical data analyst. Assess single health readings \
against standard healthy ranges and the user's context. Respond only with a JSON object.";

/// Trait for analysis service operations
#[async_trait]
pub trait AnalysisServiceTrait: Send + Sync {
    /// Score the user's recent data, then store the resulting insights and alerts
    async fn analyze_health(&self, user_id: Uuid) -> Result<HealthAnalysis, ServiceError>;

    /// Assess one reading, raising an alert when it is abnormal
    async fn check_abnormal_reading(
        &self,
        user_id: Uuid,
        request: AbnormalReadingRequest,
    ) -> Result<ReadingAssessment, ServiceError>;
}

/// Analysis service for domain logic
pub struct AnalysisService {
    repositories: Repositories,
    language_model: Option<SharedLanguageModel>,
}

impl AnalysisService {
    pub fn new(repositories: Repositories, language_model: Option<SharedLanguageModel>) -> Self {
        Self { repositories, language_model }
    }

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, ServiceError> {
        self.repositories
            .profiles
            .get_by_id(&user_id.to_string())
            .await?
            .map(conversions::convert_to_domain_profile)
            .transpose()
            .map_err(ServiceError::Repository)
    }

    async fn recent_metrics(
        &self,
        user_id: Uuid,
        metric_type: Option<MetricType>,
        limit: usize,
    ) -> Result<Vec<HealthMetric>, ServiceError> {
        let rows = self
            .repositories
            .metrics
            .list_for_user(&user_id.to_string(), metric_type.map(|t| t.as_str()), Some(limit))
            .await?;
        convert_metrics(rows)
    }

    async fn active_medications(&self, user_id: Uuid) -> Result<Vec<Medication>, ServiceError> {
        let rows = self
            .repositories
            .medications
            .list_for_user(&user_id.to_string(), Some(true), None)
            .await?;
        convert_medications(rows)
    }

    /// Store the analysis results. Failures are logged and skipped.
    async fn persist_analysis(&self, user_id: Uuid, analysis: &HealthAnalysis) {
        for insight in &analysis.insights {
            let request = conversions::convert_to_data_insight_request(user_id, insight);
            if let Err(e) = self.repositories.insights.create(request).await {
                warn!("Failed to store insight '{}': {}", insight.title, e);
            }
        }

        for alert in &analysis.alerts {
            let request = conversions::convert_to_data_alert_request(user_id, NewHealthAlert {
                alert_type: alert.alert_type,
                severity: alert.severity,
                title: alert.title.clone(),
                message: alert.message.clone(),
                related_metric_id: None,
                related_medication_id: None,
            });
            if let Err(e) = self.repositories.alerts.create(request).await {
                warn!("Failed to store alert '{}': {}", alert.title, e);
            }
        }
    }

    async fn assess_with_model(
        &self,
        model: &SharedLanguageModel,
        request: &AbnormalReadingRequest,
        unit: &str,
        context: &ReadingContext,
    ) -> Result<ReadingAssessment, ServiceError> {
        let prompt = assessment_prompt(request, unit, context)?;
        let reply = model.generate_json(ASSESSMENT_SYSTEM_PROMPT, &prompt).await?;
        parse_assessment(reply)
    }
}

/// What the analysis knew about the user
pub fn summarize(profile: Option<&Profile>, metrics: &[HealthMetric], medications: &[Medication]) -> HealthDataSummary {
    let today = Utc::now().date_naive();
    let text = |value: Option<&String>| value.cloned().unwrap_or_else(|| NOT_SPECIFIED.to_string());

    HealthDataSummary {
        age: profile.and_then(|p| p.age_on(today)),
        gender: text(profile.and_then(|p| p.gender.as_ref())),
        blood_type: text(profile.and_then(|p| p.blood_type.as_ref())),
        allergies: profile.map(|p| p.allergies.clone()).unwrap_or_default(),
        chronic_conditions: profile.map(|p| p.chronic_conditions.clone()).unwrap_or_default(),
        metrics: metrics
            .iter()
            .map(|m| SummaryMetric {
                metric_type: m.metric_type,
                value: m.display_value(),
                unit: m.unit.clone(),
                recorded_at: m.recorded_at.to_rfc3339(),
            })
            .collect(),
        medications: medications
            .iter()
            .map(|m| SummaryMedication {
                name: m.name.clone(),
                dosage: m.dosage.clone(),
                frequency: m.frequency.to_string(),
            })
            .collect(),
    }
}

/// Mean of the given readings, None when there are none
pub fn historical_average(readings: &[HealthMetric]) -> Option<f64> {
    if readings.is_empty() {
        return None;
    }
    Some(readings.iter().map(|m| m.value).sum::<f64>() / readings.len() as f64)
}

/// Pretty JSON for embedding in a prompt
fn prompt_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ServiceError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ServiceError::LanguageModel(format!("Could not encode prompt: {}", e)))
}

fn assessment_prompt(
    request: &AbnormalReadingRequest,
    unit: &str,
    context: &ReadingContext,
) -> Result<String, ServiceError> {
    let metric = serde_json::json!({
        "metricType": request.metric_type,
        "value": request.value,
        "systolic": request.systolic,
        "diastolic": request.diastolic,
        "unit": unit,
    });
    let metric = prompt_json(&metric)?;
    let context = prompt_json(context)?;

    Ok(format!(
        "Analyze this health reading and determine if it's abnormal:\n\n\
         Metric: {metric}\n\n\
         User Context: {context}\n\n\
         Standard healthy ranges:\n\
         - Heart Rate: 60-100 bpm (resting)\n\
         - Blood Pressure: Systolic 90-120, Diastolic 60-80 mmHg\n\
         - Oxygen Level: 95-100%\n\
         - Temperature: 97-99°F (36.1-37.2°C)\n\
         - Weight: Varies by individual\n\n\
         Respond with a JSON object with these fields:\n\
         - isAbnormal: boolean\n\
         - severity: one of \"low\", \"medium\", \"high\", \"critical\"\n\
         - reason: short explanation\n\
         - recommendations: array of strings\n\
         - requiresImmediateAttention: boolean"
    ))
}

/// Read the model's verdict, rejecting anything that does not fit
pub fn parse_assessment(reply: serde_json::Value) -> Result<ReadingAssessment, ServiceError> {
    let assessment: ReadingAssessment = serde_json::from_value(reply)
        .map_err(|e| ServiceError::LanguageModel(format!("Unexpected assessment format: {}", e)))?;

    if assessment.reason.trim().is_empty() {
        return Err(ServiceError::LanguageModel("Assessment has no reason".to_string()));
    }
    Ok(assessment)
}

#[async_trait]
impl AnalysisServiceTrait for AnalysisService {
    #[instrument(skip(self))]
    async fn analyze_health(&self, user_id: Uuid) -> Result<HealthAnalysis, ServiceError> {
        let profile = self.find_profile(user_id).await?;
        let metrics = self.recent_metrics(user_id, None, ANALYSIS_METRIC_WINDOW).await?;
        let medications = self.active_medications(user_id).await?;

        let summary = summarize(profile.as_ref(), &metrics, &medications);
        match serde_json::to_string(&summary) {
            Ok(json) => debug!("Health data summary: {}", json),
            Err(e) => debug!("Health data summary could not be serialized: {}", e),
        }

        let analysis = evaluate_health(&metrics, medications.len());
        info!(
            score = analysis.overall_health_score,
            insights = analysis.insights.len(),
            alerts = analysis.alerts.len(),
            "Health analysis complete"
        );

        self.persist_analysis(user_id, &analysis).await;
        Ok(analysis)
    }

    #[instrument(skip(self, request), fields(metric_type = %request.metric_type))]
    async fn check_abnormal_reading(
        &self,
        user_id: Uuid,
        request: AbnormalReadingRequest,
    ) -> Result<ReadingAssessment, ServiceError> {
        let reading = ReadingValue::from_parts(request.metric_type, request.value, request.systolic, request.diastolic)
            .map_err(ServiceError::Validation)?;
        let unit = request
            .unit
            .clone()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| request.metric_type.unit().to_string());

        let assessment = match &self.language_model {
            Some(model) => {
                let profile = self.find_profile(user_id).await?;
                let history = self.recent_metrics(user_id, Some(request.metric_type), HISTORY_WINDOW).await?;
                let context = ReadingContext {
                    age: profile.as_ref().and_then(|p| p.age_on(Utc::now().date_naive())),
                    gender: profile.as_ref().and_then(|p| p.gender.clone()),
                    chronic_conditions: profile.map(|p| p.chronic_conditions).unwrap_or_default(),
                    historical_average: historical_average(&history),
                };
                self.assess_with_model(model, &request, &unit, &context).await?
            }
            None => {
                debug!("No language model configured, using threshold classifier");
                classify_reading(request.metric_type, reading, Some(&unit))
            }
        };

        if assessment.is_abnormal {
            let alert = NewHealthAlert {
                alert_type: AlertType::AbnormalReading,
                severity: assessment.severity,
                title: format!("Abnormal {} Reading", request.metric_type),
                message: assessment.reason.clone(),
                related_metric_id: request.metric_id,
                related_medication_id: None,
            };
            let stored = self
                .repositories
                .alerts
                .create(conversions::convert_to_data_alert_request(user_id, alert))
                .await;
            if let Err(e) = stored {
                warn!("Failed to store abnormal reading alert: {}", e);
            }
        }

        Ok(assessment)
    }
}

/// Create an analysis service. Without a language model the abnormal check
/// falls back to fixed thresholds.
pub fn create_analysis_service(
    repositories: &Repositories,
    language_model: Option<SharedLanguageModel>,
) -> Arc<dyn AnalysisServiceTrait + Send + Sync> {
    Arc::new(AnalysisService::new(repositories.clone(), language_model))
}
