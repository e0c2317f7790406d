use serde::{Deserialize, Serialize};

/// Storage model for a generated insight
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AiInsight {
    pub id: String,
    pub user_id: String,
    pub insight_type: String,
    pub title: String,
    pub content: String,
    pub recommendations: Vec<String>,
    pub confidence_score: Option<f64>,
    pub is_read: bool,
    pub created_at: String,
}

/// Input data for storing a new insight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAiInsightRequest {
    pub user_id: String,
    pub insight_type: String,
    pub title: String,
    pub content: String,
    pub recommendations: Vec<String>,
    pub confidence_score: Option<f64>,
}
