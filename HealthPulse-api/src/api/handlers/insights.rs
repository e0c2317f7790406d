use axum::{
    extract::{Json, Path, Query, State},
    Extension,
};
use tracing::instrument;
use uuid::Uuid;

use health_pulse_domain::auth::UserInfo;
use health_pulse_domain::entities::AiInsight;

use crate::api::state::AppState;
use crate::entities::common::InsightListResponse;
use crate::entities::{ErrorResponse, ListQuery, ListResponse};

/// List the caller's insights, newest first
#[utoipa::path(
    get,
    path = "/api/v1/insights",
    params(ListQuery),
    responses(
        (status = 200, description = "Insights", body = InsightListResponse),
    ),
    security(("jwt_auth" = [])),
    tag = "insights"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn list_insights(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Query(query): Query<ListQuery>,
) -> Result<Json<InsightListResponse>, ErrorResponse> {
    let insights = state.insights.list_insights(user.user_id, query.limit).await?;
    Ok(Json(ListResponse::from(insights)))
}

#[utoipa::path(
    post,
    path = "/api/v1/insights/{id}/read",
    params(("id" = Uuid, Path, description = "Insight ID")),
    responses(
        (status = 200, description = "Insight marked read", body = AiInsight),
        (status = 404, description = "Insight not found", body = ErrorResponse),
    ),
    security(("jwt_auth" = [])),
    tag = "insights"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn mark_insight_read(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<Uuid>,
) -> Result<Json<AiInsight>, ErrorResponse> {
    Ok(Json(state.insights.mark_insight_read(user.user_id, id).await?))
}
