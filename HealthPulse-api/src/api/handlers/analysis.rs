use axum::{
    extract::{Json, State},
    response::IntoResponse,
    Extension,
};
use tracing::{info, instrument};

use health_pulse_domain::auth::UserInfo;
use health_pulse_domain::entities::AbnormalReadingRequest;

use crate::api::state::AppState;
use crate::entities::{AnalysisResponse, ErrorResponse, ReadingCheckResponse};

/// Score the caller's recent data and store the generated insights and alerts
#[utoipa::path(
    post,
    path = "/api/v1/analyze-health",
    responses(
        (status = 200, description = "Health analysis", body = AnalysisResponse),
        (status = 500, description = "Analysis failed", body = ErrorResponse),
    ),
    security(("jwt_auth" = [])),
    tag = "analysis"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn analyze_health(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let analysis = state.analysis.analyze_health(user.user_id).await?;
    info!(
        "Health analysis complete: score {}, {} insights, {} alerts",
        analysis.overall_health_score,
        analysis.insights.len(),
        analysis.alerts.len()
    );
    Ok(Json(AnalysisResponse { success: true, analysis }))
}

/// Assess a single reading, raising an alert when it is abnormal
#[utoipa::path(
    post,
    path = "/api/v1/check-abnormal-readings",
    request_body = AbnormalReadingRequest,
    responses(
        (status = 200, description = "Reading assessment", body = ReadingCheckResponse),
        (status = 400, description = "Invalid reading", body = ErrorResponse),
        (status = 500, description = "Assessment failed", body = ErrorResponse),
    ),
    security(("jwt_auth" = [])),
    tag = "analysis"
)]
#[instrument(skip(state, user, request), fields(user_id = %user.user_id, metric_type = %request.metric_type))]
pub async fn check_abnormal_readings(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Json(request): Json<AbnormalReadingRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let analysis = state.analysis.check_abnormal_reading(user.user_id, request).await?;
    Ok(Json(ReadingCheckResponse { success: true, analysis }))
}
