use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    Extension,
};
use tracing::{info, instrument};
use uuid::Uuid;

use health_pulse_domain::auth::UserInfo;
use health_pulse_domain::entities::{
    CreateMedicationLogRequest, CreateMedicationRequest, Medication, MedicationLog, SetMedicationActiveRequest,
};

use crate::api::state::AppState;
use crate::entities::common::{MedicationListResponse, MedicationLogListResponse};
use crate::entities::{ErrorResponse, ListQuery, ListResponse, MedicationListQuery};

/// List the caller's medications, newest first
#[utoipa::path(
    get,
    path = "/api/v1/medications",
    params(MedicationListQuery),
    responses(
        (status = 200, description = "Medications", body = MedicationListResponse),
    ),
    security(("jwt_auth" = [])),
    tag = "medications"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn list_medications(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Query(query): Query<MedicationListQuery>,
) -> Result<Json<MedicationListResponse>, ErrorResponse> {
    let medications = state
        .medications
        .list_medications(user.user_id, query.active, query.limit)
        .await?;
    Ok(Json(ListResponse::from(medications)))
}

/// Add a medication
#[utoipa::path(
    post,
    path = "/api/v1/medications",
    request_body = CreateMedicationRequest,
    responses(
        (status = 201, description = "Medication added", body = Medication),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    ),
    security(("jwt_auth" = [])),
    tag = "medications"
)]
#[instrument(skip(state, user, request), fields(user_id = %user.user_id))]
pub async fn create_medication(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Json(request): Json<CreateMedicationRequest>,
) -> Result<(StatusCode, Json<Medication>), ErrorResponse> {
    let medication = state.medications.create_medication(user.user_id, request).await?;
    info!("Medication added with ID: {}", medication.id);
    Ok((StatusCode::CREATED, Json(medication)))
}

/// Switch a medication on or off
#[utoipa::path(
    patch,
    path = "/api/v1/medications/{id}",
    params(("id" = Uuid, Path, description = "Medication ID")),
    request_body = SetMedicationActiveRequest,
    responses(
        (status = 200, description = "Medication updated", body = Medication),
        (status = 404, description = "Medication not found", body = ErrorResponse),
    ),
    security(("jwt_auth" = [])),
    tag = "medications"
)]
#[instrument(skip(state, user, request), fields(user_id = %user.user_id))]
pub async fn set_medication_active(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<Uuid>,
    Json(request): Json<SetMedicationActiveRequest>,
) -> Result<Json<Medication>, ErrorResponse> {
    let medication = state
        .medications
        .set_medication_active(user.user_id, id, request.is_active)
        .await?;
    Ok(Json(medication))
}

/// Delete a medication and its dose logs
#[utoipa::path(
    delete,
    path = "/api/v1/medications/{id}",
    params(("id" = Uuid, Path, description = "Medication ID")),
    responses(
        (status = 204, description = "Medication deleted"),
        (status = 404, description = "Medication not found", body = ErrorResponse),
    ),
    security(("jwt_auth" = [])),
    tag = "medications"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn delete_medication(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ErrorResponse> {
    state.medications.delete_medication(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Dose logs for a medication, newest first
#[utoipa::path(
    get,
    path = "/api/v1/medications/{id}/logs",
    params(("id" = Uuid, Path, description = "Medication ID"), ListQuery),
    responses(
        (status = 200, description = "Dose logs", body = MedicationLogListResponse),
        (status = 404, description = "Medication not found", body = ErrorResponse),
    ),
    security(("jwt_auth" = [])),
    tag = "medications"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn list_medication_logs(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<Json<MedicationLogListResponse>, ErrorResponse> {
    let logs = state
        .medications
        .list_medication_logs(user.user_id, id, query.limit)
        .await?;
    Ok(Json(ListResponse::from(logs)))
}

/// Record what happened to a scheduled dose
#[utoipa::path(
    post,
    path = "/api/v1/medications/{id}/logs",
    params(("id" = Uuid, Path, description = "Medication ID")),
    request_body = CreateMedicationLogRequest,
    responses(
        (status = 201, description = "Dose logged", body = MedicationLog),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Medication not found", body = ErrorResponse),
    ),
    security(("jwt_auth" = [])),
    tag = "medications"
)]
#[instrument(skip(state, user, request), fields(user_id = %user.user_id))]
pub async fn log_medication(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<Uuid>,
    Json(request): Json<CreateMedicationLogRequest>,
) -> Result<(StatusCode, Json<MedicationLog>), ErrorResponse> {
    let log = state.medications.log_medication(user.user_id, id, request).await?;
    info!("Dose logged for medication {}", id);
    Ok((StatusCode::CREATED, Json(log)))
}
