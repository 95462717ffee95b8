use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::domain::{EmailAddress, NewSubscriber, PersonName};
use crate::routes::constants::{
    MSG_ALREADY_SUBSCRIBED, MSG_EMAIL_REQUIRED, MSG_RESUBSCRIBED, MSG_SUBSCRIBE_FAILURE,
    MSG_SUBSCRIBED,
};
use crate::routes::newsletter::store::{
    get_subscriber_by_email, insert_subscriber, reactivate_subscriber,
};
use crate::routes::{ApiError, ApiResponse};
use crate::startup::AppState;

#[derive(serde::Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl TryFrom<SubscribeForm> for NewSubscriber {
    type Error = String;

    fn try_from(form: SubscribeForm) -> Result<Self, Self::Error> {
        if form.email.trim().is_empty() {
            return Err(MSG_EMAIL_REQUIRED.into());
        }
        let email = EmailAddress::parse(form.email)?;
        let first_name = parse_optional_name(form.first_name)?;
        let last_name = parse_optional_name(form.last_name)?;
        Ok(Self {
            email,
            first_name,
            last_name,
        })
    }
}

/// Absent or blank names are simply dropped; present ones must be valid.
fn parse_optional_name(name: Option<String>) -> Result<Option<PersonName>, String> {
    match name {
        Some(name) if !name.trim().is_empty() => PersonName::parse(name).map(Some),
        _ => Ok(None),
    }
}

/// Subscribe to the newsletter
///
/// Creates a subscriber (or reactivates a previously unsubscribed one) and
/// sends the welcome email. New subscriptions also notify the admin.
#[utoipa::path(
    post,
    path = "/api/newsletter/subscribe",
    tag = "newsletter",
    request_body = SubscribeForm,
    responses(
        (status = 201, description = "New subscription created", body = ApiResponse),
        (status = 200, description = "Already subscribed, or resubscribed", body = ApiResponse),
        (status = 400, description = "Missing or invalid email address", body = ApiResponse),
        (status = 429, description = "Rate limit exceeded", body = ApiResponse),
        (status = 500, description = "Store or mail transport failure", body = ApiResponse),
    )
)]
#[tracing::instrument(
    name = "Subscribing to the newsletter",
    skip(state, form),
    fields(subscriber_email = %form.email)
)]
pub async fn subscribe(
    State(state): State<AppState>,
    Json(form): Json<SubscribeForm>,
) -> Result<(StatusCode, Json<ApiResponse>), ApiError> {
    let new_subscriber: NewSubscriber = form.try_into().map_err(ApiError::InvalidInput)?;

    let existing = get_subscriber_by_email(&state.db, new_subscriber.email.as_ref())
        .await
        .map_err(|e| state.internal_error(e.into(), MSG_SUBSCRIBE_FAILURE))?;

    match existing {
        // Already active: no state change, no notifications.
        Some(subscriber) if subscriber.active => {
            tracing::info!("Subscriber already active: {}", subscriber.email);
            Ok((StatusCode::OK, Json(ApiResponse::message(MSG_ALREADY_SUBSCRIBED))))
        }
        // Previously unsubscribed: reactivate, welcome email only.
        Some(subscriber) => {
            reactivate_subscriber(&state.db, subscriber.id)
                .await
                .map_err(|e| state.internal_error(e.into(), MSG_SUBSCRIBE_FAILURE))?;
            state
                .notifier
                .send_welcome_email(&state.db, &subscriber)
                .await
                .map_err(|e| state.internal_error(e.into(), MSG_SUBSCRIBE_FAILURE))?;
            tracing::info!("Subscriber reactivated: {}", subscriber.email);
            Ok((StatusCode::OK, Json(ApiResponse::message(MSG_RESUBSCRIBED))))
        }
        // Brand new: create, welcome email, admin notification.
        None => {
            let subscriber = insert_subscriber(&state.db, &new_subscriber)
                .await
                .map_err(|e| state.internal_error(e.into(), MSG_SUBSCRIBE_FAILURE))?;
            state
                .notifier
                .send_welcome_email(&state.db, &subscriber)
                .await
                .map_err(|e| state.internal_error(e.into(), MSG_SUBSCRIBE_FAILURE))?;
            state
                .notifier
                .send_new_subscriber_notification(&subscriber)
                .await
                .map_err(|e| state.internal_error(e.into(), MSG_SUBSCRIBE_FAILURE))?;
            tracing::info!("New newsletter subscription: {}", subscriber.email);
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse::message(MSG_SUBSCRIBED)),
            ))
        }
    }
}
