use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::alert::{AlertSeverity, AlertType};
use super::insight::InsightType;
use super::metric::MetricType;

/// Result of the rule-based health analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct HealthAnalysis {
    /// Between 0 and 100
    pub overall_health_score: u8,
    pub insights: Vec<GeneratedInsight>,
    pub alerts: Vec<GeneratedAlert>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct GeneratedInsight {
    #[serde(rename = "type")]
    pub insight_type: InsightType,
    pub title: String,
    pub content: String,
    pub recommendations: Vec<String>,
    pub confidence_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct GeneratedAlert {
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    pub alert_type: AlertType,
}

/// What the analysis knows about the user, logged for diagnostics
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthDataSummary {
    pub age: Option<u32>,
    pub gender: String,
    pub blood_type: String,
    pub allergies: Vec<String>,
    pub chronic_conditions: Vec<String>,
    pub metrics: Vec<SummaryMetric>,
    pub medications: Vec<SummaryMedication>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetric {
    pub metric_type: MetricType,
    pub value: String,
    pub unit: String,
    pub recorded_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMedication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
}

/// A single reading to assess
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AbnormalReadingRequest {
    pub metric_type: MetricType,
    /// Required for every type except blood pressure
    pub value: Option<f64>,
    /// Required for blood pressure
    pub systolic: Option<f64>,
    /// Required for blood pressure
    pub diastolic: Option<f64>,
    /// Defaults to the metric type's unit
    pub unit: Option<String>,
    /// Stored metric the reading belongs to, linked from any alert raised
    pub metric_id: Option<Uuid>,
}

/// Verdict on a single reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ReadingAssessment {
    pub is_abnormal: bool,
    pub severity: AlertSeverity,
    pub reason: String,
    pub recommendations: Vec<String>,
    pub requires_immediate_attention: bool,
}

/// Profile facts passed to the model alongside a reading
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingContext {
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub chronic_conditions: Vec<String>,
    pub historical_average: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_serializes_in_camel_case() {
        let analysis = HealthAnalysis {
            overall_health_score: 80,
            insights: vec![GeneratedInsight {
                insight_type: InsightType::PreventiveCare,
                title: "Blood Pressure Tracking".to_string(),
                content: "Keep tracking".to_string(),
                recommendations: vec![],
                confidence_score: 0.8,
            }],
            alerts: vec![],
        };
        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["overallHealthScore"], 80);
        assert_eq!(json["insights"][0]["type"], "preventive_care");
        assert_eq!(json["insights"][0]["confidenceScore"], 0.8);
    }

    #[test]
    fn test_assessment_parses_model_reply() {
        let reply = serde_json::json!({
            "isAbnormal": true,
            "severity": "high",
            "reason": "Heart rate is well above the resting range",
            "recommendations": ["Rest and re-measure"],
            "requiresImmediateAttention": false
        });
        let assessment: ReadingAssessment = serde_json::from_value(reply).unwrap();
        assert!(assessment.is_abnormal);
        assert_eq!(assessment.severity, AlertSeverity::High);
    }
}
