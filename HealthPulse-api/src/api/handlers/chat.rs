use std::convert::Infallible;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Extension,
};
use futures::StreamExt;
use serde_json::json;
use tracing::{error, instrument, warn};

use health_pulse_domain::auth::UserInfo;
use health_pulse_domain::entities::ChatRequest;
use health_pulse_domain::services::ServiceError;

use crate::api::state::AppState;
use crate::entities::ErrorResponse;

fn event(payload: serde_json::Value) -> Event {
    Event::default().data(payload.to_string())
}

/// Stream an assistant reply grounded in the caller's health data
///
/// Each token arrives as a `text-delta` event and the stream ends with `finish`.
/// A model failure after streaming has started is reported as an `error` event.
#[utoipa::path(
    post,
    path = "/api/v1/chat-health",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Server-sent events with the reply", body = String, content_type = "text/event-stream"),
        (status = 400, description = "Invalid conversation", body = ErrorResponse),
        (status = 500, description = "Chat could not start"),
    ),
    security(("jwt_auth" = [])),
    tag = "chat"
)]
#[instrument(skip(state, user, request), fields(user_id = %user.user_id, messages = request.messages.len()))]
pub async fn chat_health(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Json(request): Json<ChatRequest>,
) -> Response {
    let mut replies = match state.chat.stream_reply(user.user_id, request).await {
        Ok(replies) => replies,
        Err(err @ ServiceError::Validation(_)) => return ErrorResponse::from(err).into_response(),
        Err(err) => {
            error!("Chat request failed: {}", err);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to process chat" })),
            )
                .into_response();
        }
    };

    let stream = async_stream::stream! {
        while let Some(delta) = replies.next().await {
            match delta {
                Ok(delta) => {
                    yield Ok::<_, Infallible>(event(json!({ "type": "text-delta", "delta": delta })));
                }
                Err(err) => {
                    warn!("Chat stream interrupted: {}", err);
                    yield Ok(event(json!({ "type": "error", "error": err.to_string() })));
                    return;
                }
            }
        }
        yield Ok(event(json!({ "type": "finish" })));
    };

    Sse::new(stream).keep_alive(KeepAlive::default()).into_response()
}
