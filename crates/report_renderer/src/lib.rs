//! # Report Renderer
//!
//! Turns a savings calculation plus the visitor's contact details into the
//! HTML documents the service hands out: the full downloadable report and the
//! shorter email body that carries it as an attachment.
//!
//! Rendering is pure. Anything time dependent (report id, date) lives in
//! [`ReportMeta`] so the same context always renders the same bytes.

pub mod currency;
pub mod email;
pub mod report;

use chrono::{Local, NaiveDate};
use models::{
    CalculationBreakdown, CalculationMethod, CalculatorForm, CalculatorInput, ContactProfile,
};

pub use currency::{format_currency, format_millions, format_percent, parse_currency};
pub use email::{email_subject, render_email_body};
pub use report::render_report;

/// Utilization the report promises after moving to flexible workspace.
pub const TARGET_UTILIZATION: f64 = 85.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ReportMeta {
    pub report_id: String,
    pub generated_on: NaiveDate,
}

impl ReportMeta {
    /// Fresh id (`roi-<unix millis>`) and today's local date.
    pub fn now() -> Self {
        let now = Local::now();
        Self {
            report_id: format!("roi-{}", now.timestamp_millis()),
            generated_on: now.date_naive(),
        }
    }
}

/// Everything a report needs, already calculated.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub contact: ContactProfile,
    pub form: CalculatorForm,
    pub input: CalculatorInput,
    pub breakdown: CalculationBreakdown,
    pub meta: ReportMeta,
}

impl ReportContext {
    /// Runs the calculator on the form and bundles the outcome.
    pub fn build(
        contact: ContactProfile,
        method: CalculationMethod,
        form: CalculatorForm,
        meta: ReportMeta,
    ) -> Self {
        let input = savings_engine::build_input(method, &form);
        let breakdown = savings_engine::breakdown(&input);
        Self {
            contact,
            form,
            input,
            breakdown,
            meta,
        }
    }

    pub fn filename(&self) -> String {
        report_filename(&self.contact.company, self.meta.generated_on)
    }
}

/// `savings-report-<company-slug>-<YYYY-MM-DD>.html`
///
/// The slug keeps ASCII letters, digits, `-` and `_` so the name is safe in a
/// `Content-Disposition` header.
pub fn report_filename(company: &str, date: NaiveDate) -> String {
    let slug: String = company
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    let slug = if slug.is_empty() { "company".to_string() } else { slug };
    format!("savings-report-{}-{}.html", slug, date.format("%Y-%m-%d"))
}
