use html_escape::encode_text;
use models::{CalculationBreakdown, CostBasis, WorkModel};
use savings_engine::RECOVERY_RATE;

use crate::currency::{format_currency, format_integer, format_millions, format_percent, format_plain};
use crate::{ReportContext, TARGET_UTILIZATION};

const STYLE: &str = r#"
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; background: #f8fafc; }
        .container { max-width: 800px; margin: 0 auto; background: white; }
        .header { background: #000053; color: white; padding: 40px 30px; }
        .header h1 { font-size: 28px; margin-bottom: 10px; font-weight: 600; }
        .executive-summary { padding: 30px; background: #f1f5f9; }
        .metrics-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(180px, 1fr)); gap: 20px; margin-top: 20px; }
        .metric-card { background: white; padding: 20px; border-radius: 8px; text-align: center; }
        .metric-value { font-size: 24px; font-weight: bold; color: #000053; }
        .metric-label { font-size: 14px; color: #64748b; }
        .savings { color: #16a34a; }
        .waste { color: #dc2626; }
        .section { padding: 30px; border-bottom: 1px solid #e2e8f0; }
        .section h2 { font-size: 22px; margin-bottom: 20px; color: #000053; }
        .calculation-step { background: #f8fafc; padding: 15px; margin: 10px 0; border-left: 4px solid #000053; }
        .formula { font-family: 'Courier New', monospace; background: #e2e8f0; padding: 8px; margin: 6px 0; }
        .client-info { background: #f1f5f9; padding: 20px 30px; }
        .benefits-list { list-style: none; }
        .benefits-list li { padding: 4px 0; }
        .footer { background: #1e293b; color: white; padding: 20px 30px; font-size: 12px; }
        @media print { body { background: white; } }
"#;

/// Renders the full, self-contained HTML report.
pub fn render_report(ctx: &ReportContext) -> String {
    let b = &ctx.breakdown;
    let company = encode_text(&ctx.contact.company);
    let mut html = String::with_capacity(16 * 1024);

    html.push_str(&format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Workspace Savings Analysis - {company}</title>
    <style>{STYLE}    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>Workspace Savings Analysis</h1>
            <p>Executive Summary</p>
        </div>
"#
    ));

    write_summary(&mut html, ctx);
    write_client_info(&mut html, ctx);
    write_current_situation(&mut html, ctx);
    write_breakdown(&mut html, ctx);
    write_methodology(&mut html, ctx);

    html.push_str(&format!(
        r#"        <div class="footer">
            <p>Report ID: {id} | Generated: {date} | Annual cost analysed: <span data-field="annual-cost">{cost}</span></p>
        </div>
    </div>
</body>
</html>
"#,
        id = encode_text(&ctx.meta.report_id),
        date = ctx.meta.generated_on.format("%d/%m/%Y"),
        cost = format_currency(b.annual_cost),
    ));

    html
}

fn efficiency_gain(b: &CalculationBreakdown) -> String {
    format!("{}% → {}%", format_plain(b.utilization), format_plain(TARGET_UTILIZATION))
}

fn write_summary(html: &mut String, ctx: &ReportContext) {
    let b = &ctx.breakdown;
    let efficiency_label = if b.calculation_method.is_workstations() {
        "Workstation"
    } else {
        "Space"
    };

    html.push_str(&format!(
        r#"        <div class="executive-summary">
            <p>By moving to a flexible workspace strategy you can in time reduce real estate costs by <strong>{pct}</strong>, optimising a <strong>{cost_m}</strong> annual expense with minimal disruption.</p>
            <div class="metrics-grid">
                <div class="metric-card">
                    <div class="metric-value waste" data-field="annual-waste">{waste}</div>
                    <div class="metric-label">Annual Waste</div>
                </div>
                <div class="metric-card">
                    <div class="metric-value waste" data-field="monthly-waste">{monthly}</div>
                    <div class="metric-label">Monthly Waste</div>
                </div>
                <div class="metric-card">
                    <div class="metric-value savings" data-field="potential-savings">{savings}</div>
                    <div class="metric-label">Potential Savings</div>
                </div>
                <div class="metric-card">
                    <div class="metric-value savings" data-field="cost-cut-percentage">{pct}</div>
                    <div class="metric-label">Cost Reduction</div>
                </div>
                <div class="metric-card">
                    <div class="metric-value">{gain}</div>
                    <div class="metric-label">{efficiency_label} Efficiency</div>
                </div>
            </div>
        </div>
"#,
        pct = format_percent(b.cost_cut_percentage),
        cost_m = format_millions(b.annual_cost),
        waste = format_currency(b.annual_waste),
        monthly = format_currency(b.monthly_waste),
        savings = format_currency(b.recoverable_savings),
        gain = encode_text(&efficiency_gain(b)),
    ));
}

fn write_client_info(html: &mut String, ctx: &ReportContext) {
    let method_label = if ctx.breakdown.calculation_method.is_workstations() {
        "Workstation-based Analysis"
    } else {
        "Office Space (M²) Analysis"
    };
    html.push_str(&format!(
        r#"        <div class="client-info">
            <h3>Personalized Report for {company}</h3>
            <p><strong>Prepared for:</strong> {name}, {company}</p>
            <p><strong>Date:</strong> {date} | <strong>Location:</strong> {location} | <strong>Report ID:</strong> {id}</p>
            <p><strong>Calculation Method:</strong> {method_label}</p>
        </div>
"#,
        company = encode_text(&ctx.contact.company),
        name = encode_text(&ctx.contact.name),
        location = encode_text(&ctx.contact.location),
        date = ctx.meta.generated_on.format("%d/%m/%Y"),
        id = encode_text(&ctx.meta.report_id),
    ));
}

fn write_current_situation(html: &mut String, ctx: &ReportContext) {
    let b = &ctx.breakdown;
    let team_size = ctx.form.number_of_employees.display_or("Not specified");

    let (heading, items) = match &ctx.input.basis {
        CostBasis::Workstations(w) => (
            "Workstation Portfolio",
            format!(
                r#"                        <li><strong>Current Workstations:</strong> {count}</li>
                        <li><strong>Workstation Cost:</strong> {cost} per workstation annually</li>
                        <li><strong>Annual Cost:</strong> {annual}</li>
                        <li><strong>Workstation Utilization:</strong> {util}%</li>
"#,
                count = format_integer(w.workstations),
                cost = format_currency(w.cost_per_workstation),
                annual = format_currency(b.annual_cost),
                util = format_plain(w.utilization),
            ),
        ),
        CostBasis::FloorArea(a) => (
            "Office Portfolio",
            format!(
                r#"                        <li><strong>Office Space:</strong> {size} m²</li>
                        <li><strong>Monthly Cost:</strong> {monthly}</li>
                        <li><strong>Annual Cost:</strong> {annual}</li>
                        <li><strong>Space Utilization:</strong> {util}%</li>
"#,
                size = format_integer(a.office_size_m2),
                monthly = format_currency(a.monthly_cost),
                annual = format_currency(b.annual_cost),
                util = format_plain(a.occupancy),
            ),
        ),
    };

    html.push_str(&format!(
        r#"        <div class="section">
            <h2>Your Current Situation</h2>
            <h4>{heading}</h4>
            <ul style="list-style: none; padding: 10px 0;">
                        <li><strong>Team Size:</strong> {team}</li>
{items}            </ul>
            <h4>Context</h4>
            <p>Modern workplaces foster collaboration, productivity and talent attraction. Infrastructure that maximises the dynamic use of office space lets organisations adapt quickly while significantly reducing fixed overhead costs.</p>
        </div>
"#,
        team = encode_text(&team_size),
    ));
}

fn write_step(html: &mut String, number: u32, title: &str, formulas: &[String], note: &str) {
    html.push_str("            <div class=\"calculation-step\">\n");
    html.push_str(&format!("                <h4>Step {number}: {title}</h4>\n"));
    for formula in formulas {
        html.push_str(&format!(
            "                <div class=\"formula\">{}</div>\n",
            encode_text(formula)
        ));
    }
    html.push_str(&format!("                <p>{note}</p>\n"));
    html.push_str("            </div>\n");
}

fn write_breakdown(html: &mut String, ctx: &ReportContext) {
    let b = &ctx.breakdown;
    let is_workstations = b.calculation_method.is_workstations();
    let unit = if is_workstations { "workstations" } else { "office space" };
    let mut step = 0u32;
    let mut next = || {
        step += 1;
        step
    };

    html.push_str("        <div class=\"section\">\n");
    html.push_str("            <h2>Calculation breakdown</h2>\n");

    match &ctx.input.basis {
        CostBasis::Workstations(w) => {
            let cost = format_currency(w.cost_per_workstation);
            let source = if w.cost_overridden {
                "your specified cost of"
            } else {
                "an industry-standard cost of"
            };
            write_step(
                html,
                next(),
                "Annual Cost Calculation",
                &[
                    format!("Annual Cost = Number of Workstations × {cost}"),
                    format!(
                        "{} workstations × {cost} = {}",
                        format_integer(w.workstations),
                        format_currency(b.annual_cost)
                    ),
                ],
                &format!("Total annual workstation cost based on {source} {cost} per workstation"),
            );
        }
        CostBasis::FloorArea(a) => {
            let source = if a.cost_overridden {
                "your current monthly spending"
            } else {
                "an estimate of €650 per m² per year"
            };
            write_step(
                html,
                next(),
                "Annual Cost Calculation",
                &[
                    "Annual Cost = Monthly Cost × 12".to_string(),
                    format!(
                        "{} × 12 = {}",
                        format_currency(a.monthly_cost),
                        format_currency(b.annual_cost)
                    ),
                ],
                &format!("Total annual office cost based on {source}"),
            );
        }
    }

    let waste_pct = format_plain(b.waste_factor * 100.0);
    let utilization_label = if is_workstations {
        "Workstation Utilization"
    } else {
        "Space Utilization"
    };
    write_step(
        html,
        next(),
        "Waste Factor Analysis",
        &[
            format!("Waste Factor = 100% - {utilization_label}"),
            format!("100% - {}% = {waste_pct}%", format_plain(b.utilization)),
        ],
        &format!("Percentage of {unit} that remains unused"),
    );

    write_step(
        html,
        next(),
        "Annual Waste Calculation",
        &[
            "Annual Waste = Annual Cost × Waste Factor".to_string(),
            format!(
                "{} × {waste_pct}% = {}",
                format_currency(b.annual_cost),
                format_currency(b.baseline_waste)
            ),
        ],
        &format!("Total annual cost attributed to unused {unit}"),
    );

    if b.work_model.is_distributed() {
        let reduction = format_plain((1.0 - b.work_model_multiplier) * 100.0);
        write_step(
            html,
            next(),
            "Working Arrangement Adjustment",
            &[
                "Adjusted Waste = Annual Waste × Working Arrangement Multiplier".to_string(),
                format!(
                    "{} × {:.2} = {}",
                    format_currency(b.baseline_waste),
                    b.work_model_multiplier,
                    format_currency(b.annual_waste)
                ),
            ],
            &format!(
                "Working arrangement multiplier {:.2} reflects the {reduction}% reduction in waste typical of {} working patterns",
                b.work_model_multiplier,
                b.work_model.as_str()
            ),
        );
    }

    let waste_label = if b.work_model == WorkModel::Office {
        "Annual Waste"
    } else {
        "Adjusted Waste"
    };
    let recovery = format_plain(RECOVERY_RATE * 100.0);
    write_step(
        html,
        next(),
        "Recoverable Savings",
        &[
            format!("Recoverable Savings = {waste_label} × {recovery}%"),
            format!(
                "{} × {recovery}% = {}",
                format_currency(b.annual_waste),
                format_currency(b.recoverable_savings)
            ),
        ],
        "Realistic savings achievable through flexible workspace optimisation",
    );

    write_step(
        html,
        next(),
        "Savings Percentage",
        &[
            "Savings Percent = Annual Savings ÷ Annual Cost × 100".to_string(),
            format!(
                "{} ÷ {} × 100 = {}",
                format_currency(b.recoverable_savings),
                format_currency(b.annual_cost),
                format_percent(b.cost_cut_percentage)
            ),
        ],
        &format!(
            "Percentage of total {} costs saved annually",
            if is_workstations { "workstation" } else { "office" }
        ),
    );

    let pct = format_percent(b.cost_cut_percentage);
    html.push_str(&format!(
        r#"            <div class="calculation-step">
                <h4>Step {n}: Financial Impact Summary</h4>
                <ul style="list-style: none;">
                    <li><strong>Current Annual:</strong> {current}</li>
                    <li><strong>With Flex Solution:</strong> {optimized}</li>
                    <li><strong>Annual Savings:</strong> <span class="savings">{savings}</span></li>
                    <li><strong>Savings Percentage:</strong> <span class="savings">{pct}</span></li>
                </ul>
                <h4>Key Benefits</h4>
                <ul class="benefits-list">
                    <li>✓ {pct} cost reduction</li>
                    <li>✓ Enhanced workforce flexibility</li>
                    <li>✓ Reduced real estate fixed costs</li>
                    <li>✓ Improved employee productivity and satisfaction</li>
                    <li>✓ Scalable workplace infrastructure</li>
                </ul>
            </div>
        </div>
"#,
        n = next(),
        current = format_currency(b.annual_cost),
        optimized = format_currency(b.optimized_cost),
        savings = format_currency(b.recoverable_savings),
    ));
}

fn write_methodology(html: &mut String, ctx: &ReportContext) {
    let approach = match &ctx.input.basis {
        CostBasis::Workstations(w) => format!(
            r#"            <h4>Workstation-Based Calculation Methodology</h4>
            <p>This analysis uses a workstation-centric approach with {source} annual cost of <strong>{cost} per workstation</strong>. The figure covers desk and storage, IT equipment and connectivity, a proportional share of facilities overhead, and shared areas such as meeting rooms.</p>
            <p>The workstation count matches the employee count (1:1) unless specified otherwise.</p>
"#,
            source = if w.cost_overridden { "your specified" } else { "an industry-standard" },
            cost = format_currency(w.cost_per_workstation),
        ),
        CostBasis::FloorArea(_) => r#"            <h4>Office Space (M²) Calculation Methodology</h4>
            <p>This analysis uses a space-centric approach based on monthly office expenditure and occupancy rates, covering rent, utilities, maintenance and services.</p>
"#
        .to_string(),
    };

    html.push_str(&format!(
        r#"        <div class="section">
            <h2>Calculation Assumptions &amp; Methodology</h2>
{approach}            <h4>{recovery}% Recovery Rate Rationale</h4>
            <p>The {recovery}% recovery rate is the realistic share of identified waste that can actually be recaptured. The remaining {rest}% accounts for lease lock-in, transition costs and phased rollout.</p>
        </div>
"#,
        recovery = format_plain(RECOVERY_RATE * 100.0),
        rest = format_plain((1.0 - RECOVERY_RATE) * 100.0),
    ));
}
