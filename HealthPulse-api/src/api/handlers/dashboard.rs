use axum::{
    extract::{Json, State},
    response::IntoResponse,
    Extension,
};
use tracing::instrument;

use health_pulse_domain::auth::UserInfo;
use health_pulse_domain::services::ServiceError;

use crate::api::state::AppState;
use crate::entities::{DashboardResponse, ErrorResponse};

const DASHBOARD_ALERTS: usize = 5;
const DASHBOARD_MEDICATIONS: usize = 5;
const DASHBOARD_INSIGHTS: usize = 3;

/// Everything the home screen shows, in one round trip
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Dashboard data", body = DashboardResponse),
    ),
    security(("jwt_auth" = [])),
    tag = "dashboard"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let user_id = user.user_id;
    let (profile, metrics, alerts, medications, insights) = tokio::join!(
        state.profiles.get_profile(user_id),
        state.metrics.metrics_overview(user_id),
        state.alerts.list_alerts(user_id, true, Some(DASHBOARD_ALERTS)),
        state.medications.list_medications(user_id, Some(true), Some(DASHBOARD_MEDICATIONS)),
        state.insights.list_insights(user_id, Some(DASHBOARD_INSIGHTS)),
    );

    let profile = match profile {
        Ok(profile) => Some(profile),
        Err(ServiceError::NotFound(_)) => None,
        Err(err) => return Err(err.into()),
    };

    Ok(Json(DashboardResponse {
        profile,
        metrics: metrics?,
        alerts: alerts?,
        medications: medications?,
        insights: insights?,
    }))
}
