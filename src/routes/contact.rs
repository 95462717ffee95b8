use axum::Json;
use axum::extract::State;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Contact, EmailAddress, NewContact, PersonName};
use crate::routes::constants::{
    MSG_CONTACT_FAILURE, MSG_CONTACT_FIELDS_REQUIRED, MSG_CONTACT_SUCCESS,
};
use crate::routes::{ApiError, ApiResponse};
use crate::startup::AppState;

#[derive(serde::Deserialize, utoipa::ToSchema)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

impl TryFrom<ContactForm> for NewContact {
    type Error = String;

    fn try_from(form: ContactForm) -> Result<Self, Self::Error> {
        // Missing fields get the canonical message; present-but-invalid
        // fields surface the specific parse error.
        if form.name.trim().is_empty()
            || form.email.trim().is_empty()
            || form.message.trim().is_empty()
        {
            return Err(MSG_CONTACT_FIELDS_REQUIRED.into());
        }
        let name = PersonName::parse(form.name)?;
        let email = EmailAddress::parse(form.email)?;
        Ok(Self {
            name,
            email,
            message: form.message,
        })
    }
}

/// Submit a contact form
///
/// Persists the message and notifies the admin by email.
#[utoipa::path(
    post,
    path = "/api/contact",
    tag = "contact",
    request_body = ContactForm,
    responses(
        (status = 200, description = "Message stored and admin notified", body = ApiResponse),
        (status = 400, description = "A required field is missing or invalid", body = ApiResponse),
        (status = 429, description = "Rate limit exceeded", body = ApiResponse),
        (status = 500, description = "Store or mail transport failure", body = ApiResponse),
    )
)]
#[tracing::instrument(
    name = "Submitting a contact form",
    skip(state, form),
    fields(contact_email = %form.email)
)]
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(form): Json<ContactForm>,
) -> Result<Json<ApiResponse>, ApiError> {
    let new_contact: NewContact = form.try_into().map_err(ApiError::InvalidInput)?;

    let contact = insert_contact(&state.db, &new_contact)
        .await
        .map_err(|e| state.internal_error(e.into(), MSG_CONTACT_FAILURE))?;

    state
        .notifier
        .send_contact_notification(&contact)
        .await
        .map_err(|e| state.internal_error(e.into(), MSG_CONTACT_FAILURE))?;

    tracing::info!("New contact form submitted: {}", contact.email);
    Ok(Json(ApiResponse::message(MSG_CONTACT_SUCCESS)))
}

#[tracing::instrument(name = "Saving contact submission in the database", skip(pool, new_contact))]
pub async fn insert_contact(
    pool: &PgPool,
    new_contact: &NewContact,
) -> Result<Contact, sqlx::Error> {
    let contact = Contact {
        id: Uuid::new_v4(),
        name: new_contact.name.as_ref().to_string(),
        email: new_contact.email.as_ref().to_string(),
        message: new_contact.message.clone(),
        created_at: Utc::now(),
    };
    sqlx::query(
        "INSERT INTO contacts (id, name, email, message, responded, created_at, updated_at)
        VALUES ($1, $2, $3, $4, false, $5, $5)",
    )
    .bind(contact.id)
    .bind(&contact.name)
    .bind(&contact.email)
    .bind(&contact.message)
    .bind(contact.created_at)
    .execute(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to execute query: {:?}", e);
        e
    })?;
    Ok(contact)
}
