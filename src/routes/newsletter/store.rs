//! Subscriber persistence operations shared by the subscribe and unsubscribe
//! flows. All lookups expect the caller to pass the normalized email form.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{NewSubscriber, Subscriber};

#[tracing::instrument(name = "Looking up subscriber by email", skip(pool))]
pub async fn get_subscriber_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<Subscriber>, sqlx::Error> {
    sqlx::query_as::<_, Subscriber>(
        "SELECT id, email, first_name, last_name, subscription_date,
                pdf_sent, active, unsubscribe_token
        FROM subscribers WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to execute query: {:?}", e);
        e
    })
}

/// Looks up a subscriber matching both the normalized email and the exact
/// token. A miss is indistinguishable from a token that never existed, so the
/// unsubscribe endpoint cannot be used to probe for subscriber existence.
#[tracing::instrument(name = "Looking up subscriber for unsubscribe", skip(pool, unsubscribe_token))]
pub async fn get_subscriber_for_unsubscribe(
    pool: &PgPool,
    email: &str,
    unsubscribe_token: &str,
) -> Result<Option<Subscriber>, sqlx::Error> {
    sqlx::query_as::<_, Subscriber>(
        "SELECT id, email, first_name, last_name, subscription_date,
                pdf_sent, active, unsubscribe_token
        FROM subscribers WHERE email = $1 AND unsubscribe_token = $2",
    )
    .bind(email)
    .bind(unsubscribe_token)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to execute query: {:?}", e);
        e
    })
}

/// Inserts a brand-new active subscriber. The unique index on `email` is the
/// only guard against concurrent creation of the same address; a losing
/// racer's insert fails and surfaces through the generic error path.
#[tracing::instrument(name = "Saving new subscriber in the database", skip(pool, new_subscriber))]
pub async fn insert_subscriber(
    pool: &PgPool,
    new_subscriber: &NewSubscriber,
) -> Result<Subscriber, sqlx::Error> {
    let now = Utc::now();
    let subscriber = Subscriber {
        id: Uuid::new_v4(),
        email: new_subscriber.email.as_ref().to_string(),
        first_name: new_subscriber
            .first_name
            .as_ref()
            .map(|name| name.as_ref().to_string()),
        last_name: new_subscriber
            .last_name
            .as_ref()
            .map(|name| name.as_ref().to_string()),
        subscription_date: now,
        pdf_sent: false,
        active: true,
        unsubscribe_token: None,
    };
    sqlx::query(
        "INSERT INTO subscribers
            (id, email, first_name, last_name, subscription_date,
             pdf_sent, active, unsubscribe_token, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)",
    )
    .bind(subscriber.id)
    .bind(&subscriber.email)
    .bind(&subscriber.first_name)
    .bind(&subscriber.last_name)
    .bind(subscriber.subscription_date)
    .bind(subscriber.pdf_sent)
    .bind(subscriber.active)
    .bind(&subscriber.unsubscribe_token)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to execute query: {:?}", e);
        e
    })?;
    Ok(subscriber)
}

#[tracing::instrument(name = "Reactivating subscriber", skip(pool))]
pub async fn reactivate_subscriber(pool: &PgPool, subscriber_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE subscribers SET active = true, updated_at = $1 WHERE id = $2")
        .bind(Utc::now())
        .bind(subscriber_id)
        .execute(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to execute query: {:?}", e);
            e
        })?;
    Ok(())
}

/// Idempotent: deactivating an already-inactive subscriber repeats the same
/// state transition with no observable difference.
#[tracing::instrument(name = "Deactivating subscriber", skip(pool))]
pub async fn deactivate_subscriber(pool: &PgPool, subscriber_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE subscribers SET active = false, updated_at = $1 WHERE id = $2")
        .bind(Utc::now())
        .bind(subscriber_id)
        .execute(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to execute query: {:?}", e);
            e
        })?;
    Ok(())
}
