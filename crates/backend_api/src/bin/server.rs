use anyhow::Context;
use backend_api::{init_tracing, run_server, SubmissionService};
use delivery_client::{CrmClient, EmailClient};
use settings_loader::load_app_settings;
use std::{env, path::PathBuf, sync::Arc, time::Duration};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let settings_path = env::var("SETTINGS_PATH").ok().map(PathBuf::from);
    let settings = load_app_settings(settings_path.as_deref())?;
    let timeout = Duration::from_secs(settings.http_timeout_secs);

    let crm = CrmClient::new(&settings.crm_form_url, timeout).context("Configuring CRM client")?;
    let mailer = EmailClient::new(&settings.email_api_url, settings.email_from.clone(), timeout)
        .context("Configuring email client")?;

    tracing::info!(
        email_api = %settings.email_api_url,
        crm = %settings.crm_form_url,
        internal_recipient = %settings.internal_recipient,
        timeout_secs = settings.http_timeout_secs,
        "Savings Calculator API"
    );

    let service = Arc::new(SubmissionService::new(
        Arc::new(crm),
        Arc::new(mailer),
        settings.email_api_key.clone(),
        settings.internal_recipient.clone(),
    ));

    run_server(service, &settings.bind_address()).await
}
