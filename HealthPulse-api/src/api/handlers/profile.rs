use axum::{
    extract::{Json, State},
    Extension,
};
use tracing::{info, instrument};

use health_pulse_domain::auth::UserInfo;
use health_pulse_domain::entities::{EmergencyInfo, Profile, UpdateProfileRequest};

use crate::api::state::AppState;
use crate::entities::ErrorResponse;

/// Get the caller's profile
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Profile found", body = Profile),
        (status = 404, description = "No profile saved yet", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("jwt_auth" = [])),
    tag = "profile"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
) -> Result<Json<Profile>, ErrorResponse> {
    let profile = state.profiles.get_profile(user.user_id).await?;
    Ok(Json(profile))
}

/// Create or replace the caller's profile
#[utoipa::path(
    put,
    path = "/api/v1/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile saved", body = Profile),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    ),
    security(("jwt_auth" = [])),
    tag = "profile"
)]
#[instrument(skip(state, user, request), fields(user_id = %user.user_id))]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<Profile>, ErrorResponse> {
    let profile = state.profiles.update_profile(user.user_id, request).await?;
    info!("Profile updated");
    Ok(Json(profile))
}

/// Emergency numbers and the caller's emergency details
#[utoipa::path(
    get,
    path = "/api/v1/emergency",
    responses(
        (status = 200, description = "Emergency information", body = EmergencyInfo),
    ),
    security(("jwt_auth" = [])),
    tag = "profile"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn get_emergency_info(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
) -> Result<Json<EmergencyInfo>, ErrorResponse> {
    let info = state.profiles.emergency_info(user.user_id).await?;
    Ok(Json(info))
}
