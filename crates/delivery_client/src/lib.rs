//! HTTP clients for the two outside services a submission talks to: the
//! transactional-email provider and the CRM form-ingestion endpoint.
//!
//! Both are single-attempt. Callers decide what a failure means.

pub mod crm;
pub mod email;

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;
use thiserror::Error;

pub use crm::{CrmClient, CrmField, CrmSubmission};
pub use email::{Attachment, EmailClient, EmailReceipt, OutgoingEmail};

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Invalid endpoint URL '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} rejected the request ({status}): {message}")]
    Rejected {
        service: &'static str,
        status: u16,
        message: String,
    },
}

pub(crate) fn parse_endpoint(raw: &str) -> Result<Url, DeliveryError> {
    let url = Url::parse(raw).map_err(|e| DeliveryError::InvalidEndpoint {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(DeliveryError::InvalidEndpoint {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

pub(crate) fn build_http(timeout: Duration) -> Result<Client, DeliveryError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: Option<String>,
}

/// Best human-readable reason from a non-2xx body: the provider's JSON
/// `message` when there is one, else the raw body, else the status text.
pub(crate) fn rejection_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<ProviderErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.chars().take(500).collect())
        })
        .unwrap_or_else(|| status.to_string())
}
