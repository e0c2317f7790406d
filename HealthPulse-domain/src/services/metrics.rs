use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::{debug, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::entities::conversions;
use crate::entities::{
    format_number, CreateHealthMetricRequest, HealthMetric, MetricPoint, MetricSnapshot, MetricType,
    MetricsOverview, NewHealthMetric, Trend,
};
use super::errors::{validation_message, ServiceError};
use super::{effective_limit, Repositories, SharedMetricRepository};

/// How far ahead of the server clock a reading may be stamped
const MAX_CLOCK_SKEW_MINUTES: i64 = 5;

/// Readings considered by the overview
const OVERVIEW_WINDOW: usize = 50;

/// Points on the heart rate chart
pub const HEART_RATE_SERIES_POINTS: usize = 7;

/// Metric types shown as cards on the overview
const OVERVIEW_TYPES: [MetricType; 4] = [
    MetricType::HeartRate,
    MetricType::BloodPressure,
    MetricType::OxygenLevel,
    MetricType::Temperature,
];

const SYSTOLIC_RANGE: (f64, f64) = (40.0, 300.0);
const DIASTOLIC_RANGE: (f64, f64) = (20.0, 200.0);

/// Trait for metric service operations
#[async_trait]
pub trait MetricServiceTrait: Send + Sync {
    /// Check a create request and turn it into what gets stored
    fn validate_create_request(&self, request: &CreateHealthMetricRequest) -> Result<NewHealthMetric, ServiceError>;

    /// Record a measurement
    async fn create_metric(&self, user_id: Uuid, request: CreateHealthMetricRequest) -> Result<HealthMetric, ServiceError>;

    /// The caller's metrics, newest first
    async fn list_metrics(
        &self,
        user_id: Uuid,
        metric_type: Option<MetricType>,
        limit: Option<usize>,
    ) -> Result<Vec<HealthMetric>, ServiceError>;

    /// Delete one of the caller's metrics
    async fn delete_metric(&self, user_id: Uuid, id: Uuid) -> Result<(), ServiceError>;

    /// Latest vitals with trends, plus the heart rate chart series
    async fn metrics_overview(&self, user_id: Uuid) -> Result<MetricsOverview, ServiceError>;
}

/// Metric service for domain logic
pub struct MetricService {
    metrics: SharedMetricRepository,
}

impl MetricService {
    pub fn new(metrics: SharedMetricRepository) -> Self {
        Self { metrics }
    }
}

fn check_range(field: &str, value: f64, (min, max): (f64, f64)) -> Result<(), ServiceError> {
    if !value.is_finite() || value < min || value > max {
        return Err(ServiceError::Validation(format!(
            "{}: must be between {} and {}",
            field,
            format_number(min),
            format_number(max)
        )));
    }
    Ok(())
}

/// Convert stored rows, failing on the first corrupt one
pub(crate) fn convert_metrics(rows: Vec<health_pulse_data::models::HealthMetric>) -> Result<Vec<HealthMetric>, ServiceError> {
    rows.into_iter()
        .map(conversions::convert_to_domain_metric)
        .collect::<Result<Vec<_>, _>>()
        .map_err(ServiceError::Repository)
}

/// Build the overview from readings sorted newest first
pub fn build_overview(metrics: &[HealthMetric]) -> MetricsOverview {
    let latest = OVERVIEW_TYPES
        .iter()
        .filter_map(|metric_type| {
            let mut readings = metrics.iter().filter(|m| m.metric_type == *metric_type);
            let current = readings.next()?;
            let trend = readings.next().map(|previous| {
                if current.value > previous.value {
                    Trend::Up
                } else {
                    Trend::Down
                }
            });
            Some(MetricSnapshot {
                metric_type: *metric_type,
                label: metric_type.label().to_string(),
                display_value: current.display_value(),
                unit: current.unit.clone(),
                recorded_at: current.recorded_at,
                trend,
            })
        })
        .collect();

    let mut heart_rate_series: Vec<MetricPoint> = metrics
        .iter()
        .filter(|m| m.metric_type == MetricType::HeartRate)
        .take(HEART_RATE_SERIES_POINTS)
        .map(|m| MetricPoint { recorded_at: m.recorded_at, value: m.value })
        .collect();
    heart_rate_series.reverse();

    MetricsOverview { latest, heart_rate_series }
}

#[async_trait]
impl MetricServiceTrait for MetricService {
    fn validate_create_request(&self, request: &CreateHealthMetricRequest) -> Result<NewHealthMetric, ServiceError> {
        if let Err(errors) = request.validate() {
            return Err(ServiceError::Validation(validation_message(&errors)));
        }

        let (value, systolic, diastolic) = if request.metric_type == MetricType::BloodPressure {
            let (Some(systolic), Some(diastolic)) = (request.systolic, request.diastolic) else {
                return Err(ServiceError::Validation(
                    "Blood pressure requires both systolic and diastolic values".to_string(),
                ));
            };
            check_range("systolic", systolic, SYSTOLIC_RANGE)?;
            check_range("diastolic", diastolic, DIASTOLIC_RANGE)?;
            if systolic <= diastolic {
                return Err(ServiceError::Validation(
                    "Systolic pressure must be greater than diastolic pressure".to_string(),
                ));
            }
            (systolic, Some(systolic), Some(diastolic))
        } else {
            let value = request.value.ok_or_else(|| {
                ServiceError::Validation(format!("value: required for {}", request.metric_type))
            })?;
            check_range("value", value, request.metric_type.plausible_range())?;
            (value, None, None)
        };

        let now = Utc::now();
        let recorded_at = request.recorded_at.unwrap_or(now);
        if recorded_at > now + Duration::minutes(MAX_CLOCK_SKEW_MINUTES) {
            return Err(ServiceError::Validation(
                "recorded_at: cannot be in the future".to_string(),
            ));
        }

        Ok(NewHealthMetric {
            metric_type: request.metric_type,
            value,
            systolic,
            diastolic,
            notes: request.notes.clone().filter(|n| !n.trim().is_empty()),
            recorded_at,
        })
    }

    #[instrument(skip(self, request))]
    async fn create_metric(&self, user_id: Uuid, request: CreateHealthMetricRequest) -> Result<HealthMetric, ServiceError> {
        let metric = self.validate_create_request(&request)?;
        let stored = self
            .metrics
            .create(conversions::convert_to_data_metric_request(user_id, metric))
            .await?;
        debug!("Recorded {} metric {}", stored.metric_type, stored.id);
        conversions::convert_to_domain_metric(stored).map_err(ServiceError::Repository)
    }

    #[instrument(skip(self))]
    async fn list_metrics(
        &self,
        user_id: Uuid,
        metric_type: Option<MetricType>,
        limit: Option<usize>,
    ) -> Result<Vec<HealthMetric>, ServiceError> {
        let rows = self
            .metrics
            .list_for_user(
                &user_id.to_string(),
                metric_type.map(|t| t.as_str()),
                Some(effective_limit(limit)),
            )
            .await?;
        convert_metrics(rows)
    }

    #[instrument(skip(self))]
    async fn delete_metric(&self, user_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        if self.metrics.delete(&user_id.to_string(), &id.to_string()).await? {
            Ok(())
        } else {
            Err(ServiceError::not_found("Metric", id))
        }
    }

    #[instrument(skip(self))]
    async fn metrics_overview(&self, user_id: Uuid) -> Result<MetricsOverview, ServiceError> {
        let rows = self
            .metrics
            .list_for_user(&user_id.to_string(), None, Some(OVERVIEW_WINDOW))
            .await?;
        Ok(build_overview(&convert_metrics(rows)?))
    }
}

/// Create a metric service over the given repositories
pub fn create_metric_service(repositories: &Repositories) -> Arc<dyn MetricServiceTrait + Send + Sync> {
    Arc::new(MetricService::new(repositories.metrics.clone()))
}
