// Domain entities and value objects
pub mod alert;
pub mod analysis;
pub mod chat;
pub mod conversions;
pub mod emergency;
pub mod insight;
pub mod medication;
pub mod metric;
pub mod profile;
pub mod validation;

// Re-export common types for easier imports
pub use alert::{AlertSeverity, AlertType, HealthAlert, NewHealthAlert};
pub use analysis::{
    AbnormalReadingRequest, GeneratedAlert, GeneratedInsight, HealthAnalysis, HealthDataSummary,
    ReadingAssessment, ReadingContext,
};
pub use chat::{ChatMessage, ChatRequest, ChatRole};
pub use emergency::{EmergencyContact, EmergencyInfo, EmergencyNumber, MedicalInfo, NearbySearch};
pub use insight::{AiInsight, InsightType};
pub use medication::{
    CreateMedicationLogRequest, CreateMedicationRequest, Medication, MedicationFrequency, MedicationLog,
    MedicationLogStatus, NewMedication, NewMedicationLog, SetMedicationActiveRequest,
};
pub use metric::{
    format_number, CreateHealthMetricRequest, HealthMetric, MetricPoint, MetricSnapshot, MetricType,
    MetricsOverview, NewHealthMetric, Trend,
};
pub use profile::{Profile, UpdateProfileRequest};
