use anyhow::{bail, Context, Result};
use clap::Parser;
use models::{CalculationMethod, CalculatorForm, FieldValue, WorkModel};
use savings_engine::{breakdown, build_input};
use std::fs;
use std::path::PathBuf;

/// Computes a workspace savings projection and prints it as JSON.
#[derive(Debug, Parser)]
#[command(name = "savings-calc", author, version, about = "Workspace savings calculator", long_about = None)]
struct Args {
    /// Calculation method: `workstations` or `square-meters` (alias `m2`)
    #[arg(short = 'm', long = "method", default_value = "workstations")]
    method: String,

    /// Read form state from a JSON file instead of the flags below
    #[arg(short = 'f', long = "form")]
    form_path: Option<PathBuf>,

    #[arg(long)]
    workstations: Option<f64>,

    #[arg(long)]
    employees: Option<f64>,

    /// Workstation utilization or floor occupancy, in percent
    #[arg(short = 'u', long)]
    utilization: Option<f64>,

    #[arg(long = "cost-per-workstation")]
    cost_per_workstation: Option<f64>,

    #[arg(long = "office-size")]
    office_size: Option<f64>,

    #[arg(long = "monthly-cost")]
    monthly_cost: Option<f64>,

    /// office, hybrid or remote
    #[arg(short = 'w', long = "work-model", default_value = "office")]
    work_model: String,

    /// Print every intermediate value, not just the result
    #[arg(short = 'b', long)]
    breakdown: bool,
}

fn parse_method(raw: &str) -> Result<CalculationMethod> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "workstations" => Ok(CalculationMethod::Workstations),
        "square-meters" | "m2" => Ok(CalculationMethod::SquareMeters),
        other => bail!("Unknown calculation method '{other}' (use workstations or square-meters)"),
    }
}

fn field(value: Option<f64>) -> FieldValue {
    value.map(FieldValue::Number).unwrap_or_default()
}

fn form_from_args(args: &Args, method: CalculationMethod) -> CalculatorForm {
    let utilization = field(args.utilization);
    let (utilization, workstation_utilization) = match method {
        CalculationMethod::Workstations => (FieldValue::Empty, utilization),
        CalculationMethod::SquareMeters => (utilization, FieldValue::Empty),
    };

    CalculatorForm {
        office_size: field(args.office_size),
        monthly_cost: field(args.monthly_cost),
        utilization,
        work_model: WorkModel::parse(&args.work_model),
        number_of_employees: field(args.employees),
        current_workstations: field(args.workstations),
        workstation_utilization,
        annual_cost_per_workstation: field(args.cost_per_workstation),
        ..Default::default()
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let method = parse_method(&args.method)?;

    let form = match &args.form_path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Reading form file: {}", path.display()))?;
            serde_json::from_str::<CalculatorForm>(&raw)
                .with_context(|| format!("Parsing form JSON in {}", path.display()))?
        }
        None => form_from_args(&args, method),
    };

    let input = build_input(method, &form);
    let steps = breakdown(&input);

    let json = if args.breakdown {
        serde_json::to_string_pretty(&steps)?
    } else {
        serde_json::to_string_pretty(&steps.result())?
    };
    println!("{json}");

    Ok(())
}
