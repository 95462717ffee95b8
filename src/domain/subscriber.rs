use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A persisted newsletter subscriber.
///
/// `email` is stored in normalized form (trimmed, lowercased) and is unique
/// across the table. Records are never deleted; `active` distinguishes a
/// subscribed from an unsubscribed record.
#[derive(Debug, sqlx::FromRow)]
pub struct Subscriber {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub subscription_date: DateTime<Utc>,
    /// Whether the welcome email carried the PDF guide. Informational only.
    pub pdf_sent: bool,
    pub active: bool,
    pub unsubscribe_token: Option<String>,
}
