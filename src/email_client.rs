use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};

use crate::domain::EmailAddress;

/// Client for a Postmark-style transactional email API.
#[derive(Clone, Debug)]
pub struct EmailClient {
    base_url: String,
    http_client: Client,
    sender: EmailAddress,
    authorization_token: Secret<String>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<AttachmentPayload<'a>>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "PascalCase")]
struct AttachmentPayload<'a> {
    name: &'a str,
    /// Base64-encoded file content, as the provider API expects.
    content: String,
    content_type: &'a str,
}

/// A file to attach to an outgoing email.
#[derive(Debug)]
pub struct Attachment {
    pub name: String,
    pub content: Vec<u8>,
    pub content_type: String,
}

#[derive(Debug)]
pub struct EmailData<'a> {
    pub recipient: &'a EmailAddress,
    pub subject: &'a str,
    pub html_content: &'a str,
    pub text_content: &'a str,
    pub attachments: &'a [Attachment],
}

impl EmailClient {
    pub fn new(
        base_url: String,
        sender: EmailAddress,
        authorization_token: Secret<String>,
        timeout: std::time::Duration,
    ) -> Self {
        let http_client = Client::builder().timeout(timeout).build().unwrap();
        Self {
            http_client,
            base_url,
            sender,
            authorization_token,
        }
    }

    #[tracing::instrument(name = "Sending email", skip(self, data), fields(recipient = %data.recipient))]
    pub async fn send_email<'a>(&self, data: EmailData<'a>) -> Result<(), reqwest::Error> {
        let url = format!("{}/email", self.base_url);
        let request_body = SendEmailRequest {
            from: self.sender.as_ref(),
            to: data.recipient.as_ref(),
            subject: data.subject,
            html_body: data.html_content,
            text_body: data.text_content,
            attachments: data
                .attachments
                .iter()
                .map(|attachment| AttachmentPayload {
                    name: &attachment.name,
                    content: BASE64.encode(&attachment.content),
                    content_type: &attachment.content_type,
                })
                .collect(),
        };
        self.http_client
            .post(&url)
            .header(
                "X-Postmark-Server-Token",
                self.authorization_token.expose_secret(),
            )
            .json(&request_body)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| {
                tracing::error!("Failed to send email: {:?}", e);
                e
            })?;
        Ok(())
    }
}
