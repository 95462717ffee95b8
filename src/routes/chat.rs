use axum::Json;
use axum::extract::State;

use crate::routes::constants::MSG_CHAT_MESSAGE_REQUIRED;
use crate::routes::{ApiError, ApiResponse};
use crate::startup::AppState;

#[derive(serde::Deserialize, utoipa::ToSchema)]
pub struct ChatForm {
    /// The message to send to the AI assistant
    #[serde(default)]
    pub message: String,
}

/// Chat with the AI assistant
///
/// Forwards the message to the upstream chat completion API and returns the
/// normalized reply text in `data`.
#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "chat",
    request_body = ChatForm,
    responses(
        (status = 200, description = "Reply from the assistant", body = ApiResponse),
        (status = 400, description = "Message is missing", body = ApiResponse),
        (status = 500, description = "Upstream API failure", body = ApiResponse),
    )
)]
#[tracing::instrument(name = "Handling chat request", skip(state, form))]
pub async fn chat(
    State(state): State<AppState>,
    Json(form): Json<ChatForm>,
) -> Result<Json<ApiResponse>, ApiError> {
    if form.message.is_empty() {
        return Err(ApiError::InvalidInput(MSG_CHAT_MESSAGE_REQUIRED.into()));
    }

    let reply = state.chat_client.chat(&form.message).await.map_err(|e| {
        // Unlike the other routes, the upstream error message is always
        // passed through to the caller, regardless of environment.
        let message = e.to_string();
        ApiError::Unexpected {
            message,
            source: anyhow::Error::new(e),
        }
    })?;

    Ok(Json(ApiResponse::data(reply)))
}
