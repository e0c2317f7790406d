use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    Extension,
};
use tracing::instrument;
use uuid::Uuid;

use health_pulse_domain::auth::UserInfo;
use health_pulse_domain::entities::HealthAlert;

use crate::api::state::AppState;
use crate::entities::common::AlertListResponse;
use crate::entities::{AlertListQuery, ErrorResponse, ListResponse};

/// List the caller's alerts, newest first
#[utoipa::path(
    get,
    path = "/api/v1/alerts",
    params(AlertListQuery),
    responses(
        (status = 200, description = "Alerts", body = AlertListResponse),
    ),
    security(("jwt_auth" = [])),
    tag = "alerts"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn list_alerts(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Query(query): Query<AlertListQuery>,
) -> Result<Json<AlertListResponse>, ErrorResponse> {
    let alerts = state
        .alerts
        .list_alerts(user.user_id, query.unresolved, query.limit)
        .await?;
    Ok(Json(ListResponse::from(alerts)))
}

#[utoipa::path(
    post,
    path = "/api/v1/alerts/{id}/read",
    params(("id" = Uuid, Path, description = "Alert ID")),
    responses(
        (status = 200, description = "Alert marked read", body = HealthAlert),
        (status = 404, description = "Alert not found", body = ErrorResponse),
    ),
    security(("jwt_auth" = [])),
    tag = "alerts"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn mark_alert_read(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<Uuid>,
) -> Result<Json<HealthAlert>, ErrorResponse> {
    Ok(Json(state.alerts.mark_alert_read(user.user_id, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/alerts/{id}/resolve",
    params(("id" = Uuid, Path, description = "Alert ID")),
    responses(
        (status = 200, description = "Alert resolved", body = HealthAlert),
        (status = 404, description = "Alert not found", body = ErrorResponse),
    ),
    security(("jwt_auth" = [])),
    tag = "alerts"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn resolve_alert(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<Uuid>,
) -> Result<Json<HealthAlert>, ErrorResponse> {
    Ok(Json(state.alerts.resolve_alert(user.user_id, id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/alerts/{id}",
    params(("id" = Uuid, Path, description = "Alert ID")),
    responses(
        (status = 204, description = "Alert deleted"),
        (status = 404, description = "Alert not found", body = ErrorResponse),
    ),
    security(("jwt_auth" = [])),
    tag = "alerts"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn delete_alert(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ErrorResponse> {
    state.alerts.delete_alert(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
