use std::path::{Path, PathBuf};

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::{Rng, thread_rng};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Contact, EmailAddress, Subscriber};
use crate::email_client::{Attachment, EmailClient, EmailData};
use crate::routes::constants::unsubscribe_url;
use crate::telemetry::error_chain_fmt;

/// Alphanumeric characters carry just under 6 bits of entropy each, so 64 of
/// them comfortably clear 256 bits.
const UNSUBSCRIBE_TOKEN_LENGTH: usize = 64;

/// Sends the three transactional emails triggered by lifecycle transitions.
///
/// Constructed once at startup and injected through the application state;
/// the mail transport lives and dies with the application.
#[derive(Clone, Debug)]
pub struct NotificationSender {
    email_client: EmailClient,
    admin_email: EmailAddress,
    frontend_base_url: String,
    pdf_guide_path: PathBuf,
}

#[derive(thiserror::Error)]
pub enum NotificationError {
    #[error("Failed to update the subscriber record")]
    Store(#[from] sqlx::Error),
    #[error("Failed to deliver the email")]
    Transport(#[from] reqwest::Error),
    #[error("Stored subscriber email is not a valid address: {0}")]
    InvalidRecipient(String),
}

impl std::fmt::Debug for NotificationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl NotificationSender {
    pub fn new(
        email_client: EmailClient,
        admin_email: EmailAddress,
        frontend_base_url: String,
        pdf_guide_path: PathBuf,
    ) -> Self {
        Self {
            email_client,
            admin_email,
            frontend_base_url,
            pdf_guide_path,
        }
    }

    /// Notifies the admin about a new contact form submission.
    #[tracing::instrument(name = "Sending contact notification", skip(self, contact), fields(contact_email = %contact.email))]
    pub async fn send_contact_notification(
        &self,
        contact: &Contact,
    ) -> Result<(), NotificationError> {
        let subject = format!("New contact form submission from {}", contact.name);
        let html_content = format!(
            "<h3>New Contact Form Submission</h3>\
            <p><strong>Name:</strong> {}</p>\
            <p><strong>Email:</strong> {}</p>\
            <p><strong>Message:</strong></p>\
            <p>{}</p>\
            <p><strong>Submitted:</strong> {}</p>",
            contact.name, contact.email, contact.message, contact.created_at
        );
        let text_content = format!(
            "New contact form submission\n\nName: {}\nEmail: {}\nMessage:\n{}\n\nSubmitted: {}",
            contact.name, contact.email, contact.message, contact.created_at
        );
        self.email_client
            .send_email(EmailData {
                recipient: &self.admin_email,
                subject: &subject,
                html_content: &html_content,
                text_content: &text_content,
                attachments: &[],
            })
            .await?;
        tracing::info!("Contact notification sent for {}", contact.email);
        Ok(())
    }

    /// Sends the welcome email to a subscriber.
    ///
    /// Generates and persists a fresh unsubscribe token first, then sends the
    /// email (with the PDF guide attached when the asset is present on disk)
    /// and finally records whether the attachment went out. The two writes are
    /// deliberately not transactional: a token without a recorded `pdf_sent`
    /// is harmless, since `pdf_sent` is informational only.
    #[tracing::instrument(name = "Sending welcome email", skip(self, pool, subscriber), fields(subscriber_email = %subscriber.email))]
    pub async fn send_welcome_email(
        &self,
        pool: &PgPool,
        subscriber: &Subscriber,
    ) -> Result<(), NotificationError> {
        let recipient = EmailAddress::parse(subscriber.email.clone())
            .map_err(NotificationError::InvalidRecipient)?;

        let unsubscribe_token = generate_unsubscribe_token();
        store_unsubscribe_token(pool, subscriber.id, &unsubscribe_token).await?;

        let attachment = load_pdf_guide(&self.pdf_guide_path).await;
        let pdf_sent = attachment.is_some();

        let link = unsubscribe_url(
            &self.frontend_base_url,
            &unsubscribe_token,
            subscriber.email.as_str(),
        );
        let guide_paragraph = if pdf_sent {
            "<p>Attached you'll find our PDF guide on \"AI Tricks for Developers\" \
            that will help you get started.</p>"
        } else {
            ""
        };
        let html_content = format!(
            "<h2>Thank you for subscribing!</h2>\
            <p>We're excited to have you join our community of AI enthusiasts.</p>\
            {}\
            <p>You'll receive our regular newsletter with tips, tricks, and updates on AI development.</p>\
            <p>Best regards,<br>Your Mentorship Team</p>\
            <hr>\
            <p style=\"font-size: 12px; color: #666;\">\
            If you'd like to unsubscribe, <a href=\"{}\">click here</a>\
            </p>",
            guide_paragraph, link
        );
        let text_content = format!(
            "Thank you for subscribing!\n\n\
            We're excited to have you join our community of AI enthusiasts.\n\
            You'll receive our regular newsletter with tips, tricks, and updates on AI development.\n\n\
            Best regards,\nYour Mentorship Team\n\n\
            To unsubscribe, visit: {}",
            link
        );

        let attachments: Vec<Attachment> = attachment.into_iter().collect();
        self.email_client
            .send_email(EmailData {
                recipient: &recipient,
                subject: "Welcome to Our AI Mentorship Newsletter!",
                html_content: &html_content,
                text_content: &text_content,
                attachments: &attachments,
            })
            .await?;

        record_pdf_delivery(pool, subscriber.id, pdf_sent).await?;
        tracing::info!("Welcome email sent to {}", subscriber.email);
        Ok(())
    }

    /// Notifies the admin that a new subscriber signed up.
    #[tracing::instrument(name = "Sending new-subscriber notification", skip(self, subscriber), fields(subscriber_email = %subscriber.email))]
    pub async fn send_new_subscriber_notification(
        &self,
        subscriber: &Subscriber,
    ) -> Result<(), NotificationError> {
        let html_content = format!(
            "<h3>New Newsletter Subscriber</h3>\
            <p><strong>Email:</strong> {}</p>\
            <p><strong>Date:</strong> {}</p>",
            subscriber.email, subscriber.subscription_date
        );
        let text_content = format!(
            "New newsletter subscriber\n\nEmail: {}\nDate: {}",
            subscriber.email, subscriber.subscription_date
        );
        self.email_client
            .send_email(EmailData {
                recipient: &self.admin_email,
                subject: "New Newsletter Subscriber",
                html_content: &html_content,
                text_content: &text_content,
                attachments: &[],
            })
            .await?;
        tracing::info!(
            "Admin notification sent for new subscriber: {}",
            subscriber.email
        );
        Ok(())
    }
}

/// Generates a random unsubscribe token with at least 256 bits of entropy.
pub fn generate_unsubscribe_token() -> String {
    let mut rng = thread_rng();
    std::iter::repeat_with(|| rng.sample(Alphanumeric))
        .map(char::from)
        .take(UNSUBSCRIBE_TOKEN_LENGTH)
        .collect()
}

/// Reads the PDF guide from disk, or returns `None` when the asset is absent.
async fn load_pdf_guide(path: &Path) -> Option<Attachment> {
    match tokio::fs::read(path).await {
        Ok(content) => Some(Attachment {
            name: "AI-Tricks-Guide.pdf".into(),
            content,
            content_type: "application/pdf".into(),
        }),
        Err(error) => {
            tracing::warn!(
                "PDF attachment not found at {}: {}. Sending email without attachment.",
                path.display(),
                error
            );
            None
        }
    }
}

#[tracing::instrument(name = "Storing unsubscribe token", skip(pool, unsubscribe_token))]
async fn store_unsubscribe_token(
    pool: &PgPool,
    subscriber_id: Uuid,
    unsubscribe_token: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE subscribers SET unsubscribe_token = $1, updated_at = $2 WHERE id = $3",
    )
    .bind(unsubscribe_token)
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

#[tracing::instrument(name = "Recording PDF delivery state", skip(pool))]
async fn record_pdf_delivery(
    pool: &PgPool,
    subscriber_id: Uuid,
    pdf_sent: bool,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE subscribers SET pdf_sent = $1, updated_at = $2 WHERE id = $3")
        .bind(pdf_sent)
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
