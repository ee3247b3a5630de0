use html_escape::encode_text;
use models::{CalculationBreakdown, CostBasis};

use crate::currency::{format_currency, format_integer, format_percent, format_plain};
use crate::{ReportContext, TARGET_UTILIZATION};

pub fn email_subject(breakdown: &CalculationBreakdown) -> String {
    format!(
        "Your Flexible Workspace ROI Analysis - {} Potential Savings",
        format_currency(breakdown.recoverable_savings)
    )
}

/// Short HTML body for the delivery email. The full report travels as an
/// attachment.
pub fn render_email_body(ctx: &ReportContext) -> String {
    let b = &ctx.breakdown;
    let (volume_label, volume) = match &ctx.input.basis {
        CostBasis::Workstations(w) => ("Current Workstations", format_integer(w.workstations)),
        CostBasis::FloorArea(a) => ("Office Space", format!("{} m²", format_integer(a.office_size_m2))),
    };
    let utilization = format_plain(b.utilization);

    let mut html = String::with_capacity(4 * 1024);
    html.push_str(&format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Flexible Workspace ROI Analysis</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
    <div style="background: #000053; color: white; padding: 20px; text-align: center;">
        <h1>Flexible Workspace ROI Analysis</h1>
        <p>Personalized Report for {name}, {company}</p>
        <p>Date: {date} | Location: {location}</p>
    </div>
    <div style="background: #f8fafc; padding: 30px;">
        <p>Your complete report is attached as an HTML document, including every calculation step.</p>
        <h2>Executive Summary</h2>
        <p>By transitioning to a flexible workspace strategy, <strong>{company}</strong> can reduce real estate costs by <strong>{pct}</strong>, optimising a <strong>{annual}</strong> annual expense.</p>
        <h3>Key Findings</h3>
        <ul>
            <li>{volume_label}: <strong>{volume}</strong></li>
            <li>Utilization: <strong>{utilization}% → {target}%</strong></li>
            <li>Annual waste on unused space: <strong>{waste}</strong></li>
            <li>Monthly waste: <strong>{monthly}</strong></li>
            <li>Potential savings: <strong>{savings}</strong></li>
            <li>Potential cost reduction: <strong>{pct}</strong></li>
        </ul>
        <p style="font-size: 12px; color: #6b7280; margin-top: 30px;">Report ID: {id}</p>
    </div>
</body>
</html>
"#,
        name = encode_text(&ctx.contact.name),
        company = encode_text(&ctx.contact.company),
        location = encode_text(&ctx.contact.location),
        date = ctx.meta.generated_on.format("%d/%m/%Y"),
        pct = format_percent(b.cost_cut_percentage),
        annual = format_currency(b.annual_cost),
        target = format_plain(TARGET_UTILIZATION),
        waste = format_currency(b.annual_waste),
        monthly = format_currency(b.monthly_waste),
        savings = format_currency(b.recoverable_savings),
        id = encode_text(&ctx.meta.report_id),
    ));
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReportMeta;
    use chrono::NaiveDate;
    use models::{CalculationMethod, CalculatorForm, ContactProfile, FieldValue, WorkModel};

    fn ctx() -> ReportContext {
        let form = CalculatorForm {
            number_of_employees: FieldValue::from("1000"),
            workstation_utilization: FieldValue::Number(50.0),
            work_model: WorkModel::Hybrid,
            ..Default::default()
        };
        ReportContext::build(
            ContactProfile {
                name: "Sam".to_string(),
                email: "sam@example.com".to_string(),
                company: "Globex".to_string(),
                location: "Rotterdam".to_string(),
            },
            CalculationMethod::Workstations,
            form,
            ReportMeta {
                report_id: "roi-42".to_string(),
                generated_on: NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
            },
        )
    }

    #[test]
    fn test_subject_carries_savings() {
        assert_eq!(
            email_subject(&ctx().breakdown),
            "Your Flexible Workspace ROI Analysis - 3.037.500\u{a0}€ Potential Savings"
        );
    }

    #[test]
    fn test_email_body_summary() {
        let html = render_email_body(&ctx());
        assert!(html.contains("Personalized Report for Sam, Globex"));
        assert!(html.contains("Current Workstations: <strong>1.000</strong>"));
        assert!(html.contains("50% → 85%"));
        assert!(html.contains("4.050.000\u{a0}€"));
        assert!(html.contains("33.8%"));
        assert!(html.contains("Report ID: roi-42"));
        assert!(html.contains("02/01/2026"));
    }
}
