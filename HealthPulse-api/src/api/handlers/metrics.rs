use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    Extension,
};
use tracing::{info, instrument};
use uuid::Uuid;

use health_pulse_domain::auth::UserInfo;
use health_pulse_domain::entities::{CreateHealthMetricRequest, HealthMetric, MetricsOverview};

use crate::api::state::AppState;
use crate::entities::{ErrorResponse, ListResponse, MetricListQuery};
use crate::entities::common::MetricListResponse;

/// List the caller's metrics, newest first
#[utoipa::path(
    get,
    path = "/api/v1/metrics",
    params(MetricListQuery),
    responses(
        (status = 200, description = "Metrics", body = MetricListResponse),
    ),
    security(("jwt_auth" = [])),
    tag = "metrics"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn list_metrics(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Query(query): Query<MetricListQuery>,
) -> Result<Json<MetricListResponse>, ErrorResponse> {
    let metrics = state
        .metrics
        .list_metrics(user.user_id, query.metric_type, query.limit)
        .await?;
    Ok(Json(ListResponse::from(metrics)))
}

/// Record a measurement
#[utoipa::path(
    post,
    path = "/api/v1/metrics",
    request_body = CreateHealthMetricRequest,
    responses(
        (status = 201, description = "Metric recorded", body = HealthMetric),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    ),
    security(("jwt_auth" = [])),
    tag = "metrics"
)]
#[instrument(skip(state, user, request), fields(user_id = %user.user_id, metric_type = %request.metric_type))]
pub async fn create_metric(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Json(request): Json<CreateHealthMetricRequest>,
) -> Result<(StatusCode, Json<HealthMetric>), ErrorResponse> {
    let metric = state.metrics.create_metric(user.user_id, request).await?;
    info!("Metric recorded with ID: {}", metric.id);
    Ok((StatusCode::CREATED, Json(metric)))
}

/// Latest vitals with trends and the heart rate series
#[utoipa::path(
    get,
    path = "/api/v1/metrics/overview",
    responses(
        (status = 200, description = "Metrics overview", body = MetricsOverview),
    ),
    security(("jwt_auth" = [])),
    tag = "metrics"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn get_metrics_overview(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
) -> Result<Json<MetricsOverview>, ErrorResponse> {
    let overview = state.metrics.metrics_overview(user.user_id).await?;
    Ok(Json(overview))
}

/// Delete one of the caller's metrics
#[utoipa::path(
    delete,
    path = "/api/v1/metrics/{id}",
    params(("id" = Uuid, Path, description = "Metric ID")),
    responses(
        (status = 204, description = "Metric deleted"),
        (status = 404, description = "Metric not found", body = ErrorResponse),
    ),
    security(("jwt_auth" = [])),
    tag = "metrics"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn delete_metric(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ErrorResponse> {
    state.metrics.delete_metric(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
