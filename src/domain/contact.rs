use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A persisted contact-form submission.
#[derive(Debug)]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
