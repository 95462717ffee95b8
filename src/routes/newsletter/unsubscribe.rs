use axum::Json;
use axum::extract::{Query, State};

use crate::routes::constants::{
    MSG_INVALID_UNSUBSCRIBE_LINK, MSG_INVALID_UNSUBSCRIBE_REQUEST, MSG_UNSUBSCRIBE_FAILURE,
    MSG_UNSUBSCRIBED,
};
use crate::routes::newsletter::store::{deactivate_subscriber, get_subscriber_for_unsubscribe};
use crate::routes::{ApiError, ApiResponse};
use crate::startup::AppState;

#[derive(serde::Deserialize, utoipa::IntoParams)]
pub struct UnsubscribeParameters {
    /// Email address the unsubscribe link was issued for
    #[serde(default)]
    pub email: String,
    /// Unsubscribe token received via the welcome email
    #[serde(default)]
    pub token: String,
}

/// Unsubscribe from the newsletter
///
/// Deactivates the subscriber matching the email/token pair. Idempotent; no
/// email is sent. A wrong token and an unknown email are indistinguishable.
#[utoipa::path(
    get,
    path = "/api/newsletter/unsubscribe",
    tag = "newsletter",
    params(UnsubscribeParameters),
    responses(
        (status = 200, description = "Successfully unsubscribed", body = ApiResponse),
        (status = 400, description = "Missing email or token", body = ApiResponse),
        (status = 404, description = "No subscriber matches the email/token pair", body = ApiResponse),
        (status = 500, description = "Store failure", body = ApiResponse),
    )
)]
#[tracing::instrument(name = "Unsubscribing from the newsletter", skip(state, parameters))]
pub async fn unsubscribe(
    State(state): State<AppState>,
    Query(parameters): Query<UnsubscribeParameters>,
) -> Result<Json<ApiResponse>, ApiError> {
    if parameters.email.trim().is_empty() || parameters.token.is_empty() {
        return Err(ApiError::InvalidInput(
            MSG_INVALID_UNSUBSCRIBE_REQUEST.into(),
        ));
    }

    // Normalize without validating: a malformed email simply fails the
    // lookup and comes back as the same 404 as a wrong token.
    let email = parameters.email.trim().to_lowercase();

    let subscriber = get_subscriber_for_unsubscribe(&state.db, &email, &parameters.token)
        .await
        .map_err(|e| state.internal_error(e.into(), MSG_UNSUBSCRIBE_FAILURE))?
        .ok_or_else(|| ApiError::NotFound(MSG_INVALID_UNSUBSCRIBE_LINK.into()))?;

    deactivate_subscriber(&state.db, subscriber.id)
        .await
        .map_err(|e| state.internal_error(e.into(), MSG_UNSUBSCRIBE_FAILURE))?;

    tracing::info!("Unsubscribed: {}", subscriber.email);
    Ok(Json(ApiResponse::message(MSG_UNSUBSCRIBED)))
}
