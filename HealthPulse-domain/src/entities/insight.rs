use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    Lifestyle,
    Nutrition,
    Exercise,
    Sleep,
    PreventiveCare,
}

impl InsightType {
    pub const ALL: [InsightType; 5] = [
        InsightType::Lifestyle,
        InsightType::Nutrition,
        InsightType::Exercise,
        InsightType::Sleep,
        InsightType::PreventiveCare,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InsightType::Lifestyle => "lifestyle",
            InsightType::Nutrition => "nutrition",
            InsightType::Exercise => "exercise",
            InsightType::Sleep => "sleep",
            InsightType::PreventiveCare => "preventive_care",
        }
    }
}

impl fmt::Display for InsightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InsightType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InsightType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown insight type: {}", s))
    }
}

/// A stored wellness insight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct AiInsight {
    pub id: Uuid,
    pub user_id: Uuid,
    pub insight_type: InsightType,
    pub title: String,
    pub content: String,
    pub recommendations: Vec<String>,
    /// Between 0 and 1
    pub confidence_score: Option<f64>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
