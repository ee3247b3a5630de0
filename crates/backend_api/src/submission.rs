use std::sync::Arc;

use async_trait::async_trait;
use delivery_client::{
    Attachment, CrmClient, CrmSubmission, DeliveryError, EmailClient, EmailReceipt, OutgoingEmail,
};
use models::{CalculationMethod, CalculationResult, CalculatorForm, ContactProfile, ReportRequest};
use rand::{distributions::Alphanumeric, Rng};
use report_renderer::{email_subject, render_email_body, render_report, ReportContext, ReportMeta};
use serde::Serialize;
use settings_loader::{ConfigError, EmailApiKey};

use crate::error::{ApiError, Result};

pub const DOWNLOAD_TOKEN_LEN: usize = 16;
/// Tokens are only checked for length; there is no token store.
pub const MIN_DOWNLOAD_TOKEN_LEN: usize = 10;

/// Where leads are forwarded. Failures never stop a submission.
#[async_trait]
pub trait LeadSink: Send + Sync {
    async fn submit_lead(&self, submission: &CrmSubmission) -> std::result::Result<u16, DeliveryError>;
}

/// Sends the finished report by email.
#[async_trait]
pub trait ReportMailer: Send + Sync {
    async fn send_report(
        &self,
        api_key: &EmailApiKey,
        email: &OutgoingEmail,
    ) -> std::result::Result<EmailReceipt, DeliveryError>;
}

#[async_trait]
impl LeadSink for CrmClient {
    async fn submit_lead(&self, submission: &CrmSubmission) -> std::result::Result<u16, DeliveryError> {
        self.submit(submission).await
    }
}

#[async_trait]
impl ReportMailer for EmailClient {
    async fn send_report(
        &self,
        api_key: &EmailApiKey,
        email: &OutgoingEmail,
    ) -> std::result::Result<EmailReceipt, DeliveryError> {
        self.send(api_key.expose(), email).await
    }
}

/// A submission that passed request validation.
#[derive(Debug, Clone)]
pub struct ValidatedSubmission {
    pub contact: ContactProfile,
    pub method: CalculationMethod,
    pub form: CalculatorForm,
    pub client_result: Option<CalculationResult>,
}

/// Rejects payloads missing the contact or calculator sections, or with an
/// unusable name or email address.
pub fn validate(request: ReportRequest) -> Result<ValidatedSubmission> {
    let method = request.method();
    let (contact, form) = match (request.email_data, request.calculator_data) {
        (Some(contact), Some(form)) => (contact, form),
        _ => {
            return Err(ApiError::BadRequest(
                "Missing required fields: emailData or calculatorData".to_string(),
            ))
        }
    };

    if contact.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Missing required field: emailData.name".to_string()));
    }
    let email = contact.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::BadRequest(
            "Missing or invalid field: emailData.email".to_string(),
        ));
    }

    Ok(ValidatedSubmission {
        contact,
        method,
        form,
        client_result: request.results,
    })
}

pub fn generate_download_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(DOWNLOAD_TOKEN_LEN)
        .map(char::from)
        .collect()
}

pub fn token_is_acceptable(token: Option<&str>) -> bool {
    token.is_some_and(|t| t.trim().len() >= MIN_DOWNLOAD_TOKEN_LEN)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub success: bool,
    pub message: String,
    pub report_id: String,
    pub report_filename: String,
    pub download_token: String,
    pub result: CalculationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_error: Option<String>,
}

fn differs(client: f64, server: f64) -> bool {
    (client - server).abs() > 0.5
}

/// Validate -> calculate -> render -> CRM -> email, sequentially.
pub struct SubmissionService {
    crm: Arc<dyn LeadSink>,
    mailer: Arc<dyn ReportMailer>,
    api_key: std::result::Result<EmailApiKey, ConfigError>,
    internal_recipient: String,
}

impl SubmissionService {
    pub fn new(
        crm: Arc<dyn LeadSink>,
        mailer: Arc<dyn ReportMailer>,
        api_key: std::result::Result<EmailApiKey, ConfigError>,
        internal_recipient: impl Into<String>,
    ) -> Self {
        Self {
            crm,
            mailer,
            api_key,
            internal_recipient: internal_recipient.into(),
        }
    }

    pub async fn submit(&self, submission: ValidatedSubmission, meta: ReportMeta) -> Result<SubmissionOutcome> {
        let ValidatedSubmission {
            contact,
            method,
            form,
            client_result,
        } = submission;

        tracing::info!(
            email = %contact.email,
            company = %contact.company,
            method = method.as_str(),
            "Processing report submission"
        );

        let ctx = ReportContext::build(contact, method, form, meta);
        let result = ctx.breakdown.result();

        if let Some(client) = client_result {
            if differs(client.annual_cost, result.annual_cost) || differs(client.annual_waste, result.annual_waste) {
                tracing::warn!(
                    client_cost = client.annual_cost,
                    server_cost = result.annual_cost,
                    client_waste = client.annual_waste,
                    server_waste = result.annual_waste,
                    "Client results disagree with server calculation, using server values"
                );
            }
        }

        let report_html = render_report(&ctx);
        let filename = ctx.filename();

        let lead = CrmSubmission::from_lead(&ctx.contact, &ctx.form, &result);
        match self.crm.submit_lead(&lead).await {
            Ok(status) => tracing::info!(status, "Lead forwarded to CRM"),
            Err(e) => tracing::warn!("CRM submission failed, continuing: {}", e),
        }

        let api_key = self.api_key.as_ref().map_err(|e| ApiError::Configuration(e.clone()))?;

        let email = OutgoingEmail {
            to: vec![ctx.contact.email.trim().to_string(), self.internal_recipient.clone()],
            subject: email_subject(&ctx.breakdown),
            html: render_email_body(&ctx),
            attachments: vec![Attachment::html(filename.clone(), &report_html)],
        };

        let mut outcome = SubmissionOutcome {
            success: true,
            message: "Report sent successfully".to_string(),
            report_id: ctx.meta.report_id.clone(),
            report_filename: filename,
            download_token: generate_download_token(),
            result,
            email_id: None,
            email_error: None,
        };

        match self.mailer.send_report(api_key, &email).await {
            Ok(receipt) => {
                tracing::info!(id = ?receipt.id, recipients = ?email.to, "Report emailed");
                outcome.email_id = receipt.id;
            }
            Err(e) => {
                tracing::error!("Email delivery failed: {}", e);
                outcome.message = "Report generated successfully, but email delivery failed".to_string();
                outcome.email_error = Some(e.to_string());
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct FakeCrm {
        pub fail: bool,
        pub received: Mutex<Vec<CrmSubmission>>,
    }

    #[async_trait]
    impl LeadSink for FakeCrm {
        async fn submit_lead(&self, submission: &CrmSubmission) -> std::result::Result<u16, DeliveryError> {
            self.received.lock().unwrap().push(submission.clone());
            if self.fail {
                Err(DeliveryError::Rejected {
                    service: "CRM",
                    status: 503,
                    message: "unavailable".to_string(),
                })
            } else {
                Ok(200)
            }
        }
    }

    #[derive(Default)]
    pub struct FakeMailer {
        pub fail: bool,
        pub sent: Mutex<Vec<OutgoingEmail>>,
    }

    #[async_trait]
    impl ReportMailer for FakeMailer {
        async fn send_report(
            &self,
            _api_key: &EmailApiKey,
            email: &OutgoingEmail,
        ) -> std::result::Result<EmailReceipt, DeliveryError> {
            self.sent.lock().unwrap().push(email.clone());
            if self.fail {
                Err(DeliveryError::Rejected {
                    service: "email provider",
                    status: 422,
                    message: "Invalid `to` field".to_string(),
                })
            } else {
                Ok(EmailReceipt {
                    id: Some("email_1".to_string()),
                })
            }
        }
    }

    pub fn valid_key() -> std::result::Result<EmailApiKey, ConfigError> {
        EmailApiKey::parse(Some("re_test_key"))
    }

    pub fn service(
        crm: Arc<FakeCrm>,
        mailer: Arc<FakeMailer>,
        api_key: std::result::Result<EmailApiKey, ConfigError>,
    ) -> SubmissionService {
        SubmissionService::new(crm, mailer, api_key, "leads@example.com")
    }
}
