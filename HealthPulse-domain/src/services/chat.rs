use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::entities::conversions;
use crate::entities::{ChatRequest, HealthAlert, HealthMetric, Medication, Profile};
use crate::llm::{LlmError, SharedLanguageModel, TextStream};
use super::errors::{validation_message, ServiceError};
use super::medications::convert_medications;
use super::metrics::convert_metrics;
use super::Repositories;

/// Recent metrics shown to the assistant
pub const CONTEXT_METRICS: usize = 10;

/// Unresolved alerts shown to the assistant
pub const CONTEXT_ALERTS: usize = 5;

const ASSISTANT_PROMPT: &str = "You are a compassionate and knowledgeable health assistant. You help users \
understand their health data, offer wellness advice and answer health-related questions.

Important guidelines:
- Be supportive and encouraging
- Give evidence-based health information
- Remind users that you are not a replacement for professional medical advice
- Encourage users to see a healthcare professional for serious concerns
- Focus on preventive care and wellness
- Make recommendations specific and actionable";

/// Trait for chat service operations
#[async_trait]
pub trait ChatServiceTrait: Send + Sync {
    /// Render what the assistant is told about the user
    async fn build_health_context(&self, user_id: Uuid) -> Result<String, ServiceError>;

    /// Start a streamed assistant reply to the conversation
    async fn stream_reply(&self, user_id: Uuid, request: ChatRequest) -> Result<TextStream, ServiceError>;
}

/// Chat service for domain logic
pub struct ChatService {
    repositories: Repositories,
    language_model: Option<SharedLanguageModel>,
}

impl ChatService {
    pub fn new(repositories: Repositories, language_model: Option<SharedLanguageModel>) -> Self {
        Self { repositories, language_model }
    }
}

fn or_default(items: Vec<String>, empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join("\n")
    }
}

fn joined(values: &[String]) -> String {
    if values.is_empty() {
        "None".to_string()
    } else {
        values.join(", ")
    }
}

/// The context block embedded in the assistant prompt
pub fn render_health_context(
    profile: Option<&Profile>,
    metrics: &[HealthMetric],
    medications: &[Medication],
    alerts: &[HealthAlert],
) -> String {
    let name = profile.and_then(|p| p.full_name.as_deref()).unwrap_or("User");
    let blood_type = profile.and_then(|p| p.blood_type.as_deref()).unwrap_or("Not specified");
    let allergies = profile.map(|p| joined(&p.allergies)).unwrap_or_else(|| "None".to_string());
    let conditions = profile.map(|p| joined(&p.chronic_conditions)).unwrap_or_else(|| "None".to_string());

    let metrics = or_default(
        metrics
            .iter()
            .map(|m| format!(
                "- {}: {} {} ({})",
                m.metric_type,
                m.display_value(),
                m.unit,
                m.recorded_at.format("%-m/%-d/%Y")
            ))
            .collect(),
        "No recent metrics",
    );
    let medications = or_default(
        medications
            .iter()
            .map(|m| format!("- {} ({}) - {}", m.name, m.dosage, m.frequency))
            .collect(),
        "No active medications",
    );
    let alerts = or_default(
        alerts
            .iter()
            .map(|a| format!("- [{}] {}: {}", a.severity, a.title, a.message))
            .collect(),
        "No active alerts",
    );

    format!(
        "User Health Profile:\n\
         - Name: {name}\n\
         - Blood Type: {blood_type}\n\
         - Allergies: {allergies}\n\
         - Chronic Conditions: {conditions}\n\n\
         Recent Health Metrics:\n{metrics}\n\n\
         Current Medications:\n{medications}\n\n\
         Active Health Alerts:\n{alerts}\n"
    )
}

/// Full system prompt for a conversation
pub fn system_prompt(health_context: &str) -> String {
    format!("{}\n\nUser's Health Context:\n{}", ASSISTANT_PROMPT, health_context)
}

#[async_trait]
impl ChatServiceTrait for ChatService {
    #[instrument(skip(self))]
    async fn build_health_context(&self, user_id: Uuid) -> Result<String, ServiceError> {
        let user = user_id.to_string();

        let profile = self
            .repositories
            .profiles
            .get_by_id(&user)
            .await?
            .map(conversions::convert_to_domain_profile)
            .transpose()
            .map_err(ServiceError::Repository)?;
        let metrics = convert_metrics(
            self.repositories.metrics.list_for_user(&user, None, Some(CONTEXT_METRICS)).await?,
        )?;
        let medications = convert_medications(
            self.repositories.medications.list_for_user(&user, Some(true), None).await?,
        )?;
        let alerts = self
            .repositories
            .alerts
            .list_for_user(&user, true, Some(CONTEXT_ALERTS))
            .await?
            .into_iter()
            .map(conversions::convert_to_domain_alert)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ServiceError::Repository)?;

        Ok(render_health_context(profile.as_ref(), &metrics, &medications, &alerts))
    }

    #[instrument(skip(self, request), fields(messages = request.messages.len()))]
    async fn stream_reply(&self, user_id: Uuid, request: ChatRequest) -> Result<TextStream, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::Validation(validation_message(&e)))?;

        let model = self
            .language_model
            .as_ref()
            .ok_or(LlmError::NotConfigured)?;

        let context = self.build_health_context(user_id).await?;
        debug!("Health context has {} characters", context.len());

        Ok(model.stream_chat(&system_prompt(&context), &request.messages).await?)
    }
}

/// Create a chat service. Without a language model every reply fails.
pub fn create_chat_service(
    repositories: &Repositories,
    language_model: Option<SharedLanguageModel>,
) -> Arc<dyn ChatServiceTrait + Send + Sync> {
    Arc::new(ChatService::new(repositories.clone(), language_model))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use futures::StreamExt;

    use crate::entities::{
        AlertSeverity, AlertType, ChatMessage, ChatRole, MedicationFrequency, MetricType,
    };
    use crate::llm::MockLanguageModelClient;

    fn metric() -> HealthMetric {
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 8, 0, 0).unwrap();
        HealthMetric {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            metric_type: MetricType::BloodPressure,
            value: 128.0,
            unit: "mmHg".to_string(),
            systolic: Some(128.0),
            diastolic: Some(84.0),
            notes: None,
            recorded_at: at,
            created_at: at,
        }
    }

    fn question() -> ChatRequest {
        ChatRequest {
            messages: vec![ChatMessage { role: ChatRole::User, content: "How is my blood pressure?".to_string() }],
        }
    }

    #[test]
    fn test_context_defaults() {
        let context = render_health_context(None, &[], &[], &[]);
        assert!(context.contains("- Name: User"));
        assert!(context.contains("- Blood Type: Not specified"));
        assert!(context.contains("- Allergies: None"));
        assert!(context.contains("No recent metrics"));
        assert!(context.contains("No active medications"));
        assert!(context.contains("No active alerts"));
    }

    #[test]
    fn test_context_lines() {
        let mut profile = Profile::empty(Uuid::new_v4());
        profile.full_name = Some("Asha Rao".to_string());
        profile.allergies = vec!["penicillin".to_string(), "latex".to_string()];

        let medication = Medication {
            id: Uuid::new_v4(),
            user_id: profile.id,
            name: "Lisinopril".to_string(),
            dosage: "10mg".to_string(),
            frequency: MedicationFrequency::Daily,
            time_of_day: vec!["08:00".to_string()],
            start_date: Utc::now().date_naive(),
            end_date: None,
            instructions: None,
            prescribing_doctor: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let alert = HealthAlert {
            id: Uuid::new_v4(),
            user_id: profile.id,
            alert_type: AlertType::AbnormalReading,
            severity: AlertSeverity::Medium,
            title: "Elevated Blood Pressure Detected".to_string(),
            message: "Recent readings are above the normal range".to_string(),
            related_metric_id: None,
            related_medication_id: None,
            is_read: false,
            is_resolved: false,
            created_at: Utc::now(),
            resolved_at: None,
        };

        let context = render_health_context(Some(&profile), &[metric()], &[medication], &[alert]);
        assert!(context.contains("- Name: Asha Rao"));
        assert!(context.contains("- Allergies: penicillin, latex"));
        assert!(context.contains("- blood_pressure: 128/84 mmHg (3/7/2024)"));
        assert!(context.contains("- Lisinopril (10mg) - daily"));
        assert!(context.contains("- [medium] Elevated Blood Pressure Detected: Recent readings are above the normal range"));
    }

    #[tokio::test]
    async fn test_reply_without_model_fails() {
        let service = ChatService::new(Repositories::in_memory(), None);
        let result = service.stream_reply(Uuid::new_v4(), question()).await;
        assert!(matches!(
            result,
            Err(ServiceError::LanguageModel(msg)) if msg == LlmError::NotConfigured.to_string()
        ));
    }

    #[tokio::test]
    async fn test_empty_conversation_is_rejected() {
        let service = ChatService::new(Repositories::in_memory(), None);
        let result = service.stream_reply(Uuid::new_v4(), ChatRequest { messages: vec![] }).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_reply_streams_model_output() {
        let mut model = MockLanguageModelClient::new();
        model
            .expect_stream_chat()
            .withf(|system, messages| system.contains("User's Health Context:") && messages.len() == 1)
            .times(1)
            .returning(|_, _| {
                let chunks = vec![Ok("Your ".to_string()), Ok("readings look fine.".to_string())];
                Ok(futures::stream::iter(chunks).boxed())
            });

        let service = ChatService::new(Repositories::in_memory(), Some(Arc::new(model)));
        let stream = service.stream_reply(Uuid::new_v4(), question()).await.unwrap();
        let text: Vec<String> = stream.map(|chunk| chunk.unwrap()).collect().await;
        assert_eq!(text.concat(), "Your readings look fine.");
    }
}
