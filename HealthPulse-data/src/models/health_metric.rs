use serde::{Deserialize, Serialize};

/// Storage model for a recorded health metric
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthMetric {
    pub id: String,
    pub user_id: String,
    /// Metric kind, e.g. `heart_rate` or `blood_pressure`
    pub metric_type: String,
    /// Primary value. For blood pressure this is the systolic reading.
    pub value: f64,
    pub unit: String,
    pub systolic: Option<f64>,
    pub diastolic: Option<f64>,
    pub notes: Option<String>,
    /// When the measurement was taken
    pub recorded_at: String,
    pub created_at: String,
}

/// Input data for creating a new health metric
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHealthMetricRequest {
    pub user_id: String,
    pub metric_type: String,
    pub value: f64,
    pub unit: String,
    pub systolic: Option<f64>,
    pub diastolic: Option<f64>,
    pub notes: Option<String>,
    pub recorded_at: String,
}
