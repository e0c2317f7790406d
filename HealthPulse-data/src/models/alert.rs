use serde::{Deserialize, Serialize};

/// Storage model for a health alert
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthAlert {
    pub id: String,
    pub user_id: String,
    pub alert_type: String,
    pub severity: String,
    pub title: String,
    pub message: String,
    pub related_metric_id: Option<String>,
    pub related_medication_id: Option<String>,
    pub is_read: bool,
    pub is_resolved: bool,
    pub created_at: String,
    pub resolved_at: Option<String>,
}

/// Input data for raising a new alert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHealthAlertRequest {
    pub user_id: String,
    pub alert_type: String,
    pub severity: String,
    pub title: String,
    pub message: String,
    pub related_metric_id: Option<String>,
    pub related_medication_id: Option<String>,
}
