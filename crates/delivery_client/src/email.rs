use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::{build_http, parse_endpoint, rejection_message, DeliveryError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attachment {
    pub filename: String,
    /// Base64 encoded file content
    pub content: String,
    #[serde(rename = "type")]
    pub content_type: String,
}

impl Attachment {
    pub fn html(filename: impl Into<String>, document: &str) -> Self {
        Self {
            filename: filename.into(),
            content: STANDARD.encode(document.as_bytes()),
            content_type: "text/html".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Serialize)]
struct EmailPayload<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: &'a str,
    attachments: &'a [Attachment],
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EmailReceipt {
    #[serde(default)]
    pub id: Option<String>,
}

/// Client for a Resend-style transactional email API.
#[derive(Debug, Clone)]
pub struct EmailClient {
    http: Client,
    endpoint: Url,
    from: String,
}

impl EmailClient {
    pub fn new(endpoint: &str, from: impl Into<String>, timeout: Duration) -> Result<Self, DeliveryError> {
        Ok(Self {
            http: build_http(timeout)?,
            endpoint: parse_endpoint(endpoint)?,
            from: from.into(),
        })
    }

    /// Sends one email with bearer auth. Any non-2xx status is `Rejected`.
    pub async fn send(&self, api_key: &str, email: &OutgoingEmail) -> Result<EmailReceipt, DeliveryError> {
        let payload = EmailPayload {
            from: &self.from,
            to: &email.to,
            subject: &email.subject,
            html: &email.html,
            attachments: &email.attachments,
        };

        tracing::debug!(recipients = ?email.to, subject = %email.subject, "Sending email");

        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(DeliveryError::Rejected {
                service: "email provider",
                status: status.as_u16(),
                message: rejection_message(status, &body),
            });
        }

        // A 2xx without a parseable body still counts as delivered
        let receipt = serde_json::from_str::<EmailReceipt>(&body).unwrap_or_default();
        tracing::info!(id = ?receipt.id, "Email accepted by provider");
        Ok(receipt)
    }
}
