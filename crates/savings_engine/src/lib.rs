use models::{
    CalculationBreakdown, CalculationMethod, CalculationResult, CalculatorForm, CalculatorInput,
    CostBasis, FloorAreaBasis, WorkModel, WorkstationBasis,
};

/// Fully loaded yearly cost of one workstation when the visitor gives none.
pub const DEFAULT_COST_PER_WORKSTATION: f64 = 9000.0;
/// Yearly cost per m² used to derive a monthly cost from the office size.
pub const ANNUAL_COST_PER_SQUARE_METER: f64 = 650.0;
/// Share of identified waste that is realistically recoverable.
pub const RECOVERY_RATE: f64 = 0.75;

/// Multiplier applied to waste for the given working arrangement.
pub fn work_model_multiplier(model: WorkModel) -> f64 {
    match model {
        WorkModel::Office => 1.0,
        WorkModel::Hybrid => 0.90,
        WorkModel::Remote => 0.85,
    }
}

/// Monthly cost implied by an office size, rounded to whole euros.
pub fn default_monthly_cost(office_size_m2: f64) -> f64 {
    (office_size_m2 * ANNUAL_COST_PER_SQUARE_METER / 12.0).round()
}

/// Builds the typed input from raw form state.
///
/// Coercion never fails: junk and blanks read as 0, and zero counts fall back
/// to the next source (employees for workstations, industry cost for the
/// workstation price, office size for the monthly cost).
pub fn build_input(method: CalculationMethod, form: &CalculatorForm) -> CalculatorInput {
    let basis = match method {
        CalculationMethod::Workstations => {
            let mut workstations = form.current_workstations.as_number();
            if workstations == 0.0 {
                workstations = form.number_of_employees.as_number();
            }
            let given_cost = form.annual_cost_per_workstation.as_number();
            let cost_overridden = given_cost != 0.0;

            CostBasis::Workstations(WorkstationBasis {
                workstations,
                utilization: form.workstation_utilization.as_number(),
                cost_per_workstation: if cost_overridden {
                    given_cost
                } else {
                    DEFAULT_COST_PER_WORKSTATION
                },
                cost_overridden,
            })
        }
        CalculationMethod::SquareMeters => {
            let office_size_m2 = form.office_size.as_number();
            let given_cost = form.monthly_cost.as_number();
            let cost_overridden = given_cost != 0.0;

            CostBasis::FloorArea(FloorAreaBasis {
                office_size_m2,
                monthly_cost: if cost_overridden {
                    given_cost
                } else {
                    default_monthly_cost(office_size_m2)
                },
                occupancy: form.utilization.as_number(),
                cost_overridden,
            })
        }
    };

    CalculatorInput {
        basis,
        work_model: form.work_model,
    }
}

fn workstation_annual_cost(basis: &WorkstationBasis) -> f64 {
    basis.workstations * basis.cost_per_workstation
}

fn floor_area_annual_cost(basis: &FloorAreaBasis) -> f64 {
    basis.monthly_cost * 12.0
}

/// Overflowing inputs must not leak infinities into results or reports.
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Runs the five-step savings formula and keeps every intermediate value.
///
/// Utilization is not clamped: values outside [0, 100] produce waste factors
/// outside [0, 1].
pub fn breakdown(input: &CalculatorInput) -> CalculationBreakdown {
    // Step 1: base annual cost
    let annual_cost = finite_or_zero(match &input.basis {
        CostBasis::Workstations(w) => workstation_annual_cost(w),
        CostBasis::FloorArea(a) => floor_area_annual_cost(a),
    });

    // Step 2: waste factor
    let utilization = input.basis.utilization();
    let waste_factor = (100.0 - utilization) / 100.0;
    let baseline_waste = finite_or_zero(annual_cost * waste_factor);

    // Step 3: working arrangement
    let multiplier = work_model_multiplier(input.work_model);
    let annual_waste = finite_or_zero(baseline_waste * multiplier);

    // Step 4: recoverable share
    let recoverable_savings = annual_waste * RECOVERY_RATE;

    // Step 5: percentage of the annual cost
    let cost_cut_percentage = if annual_cost != 0.0 {
        finite_or_zero(recoverable_savings / annual_cost * 100.0)
    } else {
        0.0
    };

    CalculationBreakdown {
        calculation_method: input.basis.method(),
        annual_cost,
        utilization,
        waste_factor,
        baseline_waste,
        work_model: input.work_model,
        work_model_multiplier: multiplier,
        annual_waste,
        recoverable_savings,
        optimized_cost: finite_or_zero(annual_cost - recoverable_savings),
        cost_cut_percentage,
        monthly_waste: annual_waste / 12.0,
    }
}

pub fn calculate(input: &CalculatorInput) -> CalculationResult {
    breakdown(input).result()
}

/// Convenience for callers holding raw form state.
pub fn calculate_form(method: CalculationMethod, form: &CalculatorForm) -> CalculationResult {
    calculate(&build_input(method, form))
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::FieldValue;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn workstations(count: f64, utilization: f64, cost: f64, model: WorkModel) -> CalculatorInput {
        CalculatorInput {
            basis: CostBasis::Workstations(WorkstationBasis {
                workstations: count,
                utilization,
                cost_per_workstation: cost,
                cost_overridden: true,
            }),
            work_model: model,
        }
    }

    #[test]
    fn test_hybrid_workstation_scenario() {
        let b = breakdown(&workstations(1000.0, 50.0, 9000.0, WorkModel::Hybrid));

        assert!(approx(b.annual_cost, 9_000_000.0));
        assert!(approx(b.waste_factor, 0.5));
        assert!(approx(b.baseline_waste, 4_500_000.0));
        assert!(approx(b.annual_waste, 4_050_000.0));
        assert!(approx(b.monthly_waste, 337_500.0));
        assert!(approx(b.recoverable_savings, 3_037_500.0));
        assert!(approx(b.cost_cut_percentage, 33.75));
        assert_eq!(b.calculation_method, CalculationMethod::Workstations);
    }

    #[test]
    fn test_zero_annual_cost_gives_zero_percentage() {
        let result = calculate(&workstations(0.0, 40.0, 9000.0, WorkModel::Office));
        assert_eq!(result.annual_cost, 0.0);
        assert_eq!(result.cost_cut_percentage, 0.0);
        assert!(!result.cost_cut_percentage.is_nan());
    }

    #[test]
    fn test_waste_never_exceeds_cost_in_range() {
        for model in [WorkModel::Office, WorkModel::Hybrid, WorkModel::Remote] {
            for utilization in (0..=100).step_by(5) {
                let r = calculate(&workstations(250.0, utilization as f64, 7500.0, model));
                assert!(r.annual_waste <= r.annual_cost, "{:?} at {}%", model, utilization);
                assert!(r.annual_waste >= 0.0);
            }
        }
    }

    #[test]
    fn test_percentage_grows_as_utilization_drops() {
        let mut previous = f64::MIN;
        for utilization in (0..=100).rev() {
            let r = calculate(&workstations(120.0, utilization as f64, 9000.0, WorkModel::Hybrid));
            assert!(r.cost_cut_percentage >= previous);
            previous = r.cost_cut_percentage;
        }
    }

    #[test]
    fn test_work_model_ordering() {
        let waste = |model| calculate(&workstations(300.0, 35.0, 9000.0, model)).annual_waste;
        let office = waste(WorkModel::Office);
        let hybrid = waste(WorkModel::Hybrid);
        let remote = waste(WorkModel::Remote);
        assert!(office >= hybrid);
        assert!(hybrid >= remote);
    }

    #[test]
    fn test_out_of_range_utilization_propagates() {
        let over = breakdown(&workstations(10.0, 120.0, 9000.0, WorkModel::Office));
        assert!(approx(over.waste_factor, -0.2));
        assert!(over.annual_waste < 0.0);

        let under = breakdown(&workstations(10.0, -50.0, 9000.0, WorkModel::Office));
        assert!(approx(under.waste_factor, 1.5));
        assert!(under.annual_waste > under.annual_cost);
    }

    #[test]
    fn test_area_default_monthly_cost() {
        assert_eq!(default_monthly_cost(8000.0), 433_333.0);

        let form = CalculatorForm {
            office_size: FieldValue::from("8000"),
            utilization: FieldValue::from("60"),
            work_model: WorkModel::Office,
            ..Default::default()
        };
        let input = build_input(CalculationMethod::SquareMeters, &form);
        match input.basis {
            CostBasis::FloorArea(a) => {
                assert_eq!(a.monthly_cost, 433_333.0);
                assert!(!a.cost_overridden);
            }
            other => panic!("unexpected basis {:?}", other),
        }

        let b = breakdown(&input);
        assert!(approx(b.annual_cost, 5_199_996.0));
        assert!(approx(b.annual_waste, 5_199_996.0 * 0.4));
        assert_eq!(b.calculation_method, CalculationMethod::SquareMeters);
    }

    #[test]
    fn test_area_monthly_cost_override() {
        let form = CalculatorForm {
            office_size: FieldValue::from("8000"),
            monthly_cost: FieldValue::Number(100_000.0),
            utilization: FieldValue::Number(75.0),
            work_model: WorkModel::Remote,
            ..Default::default()
        };
        let b = breakdown(&build_input(CalculationMethod::SquareMeters, &form));
        assert!(approx(b.annual_cost, 1_200_000.0));
        assert!(approx(b.annual_waste, 1_200_000.0 * 0.25 * 0.85));
    }

    #[test]
    fn test_workstation_fallbacks() {
        let form = CalculatorForm {
            number_of_employees: FieldValue::from("200"),
            current_workstations: FieldValue::from(""),
            workstation_utilization: FieldValue::from("abc"),
            annual_cost_per_workstation: FieldValue::from("n/a"),
            ..Default::default()
        };
        let input = build_input(CalculationMethod::Workstations, &form);
        match input.basis {
            CostBasis::Workstations(w) => {
                assert_eq!(w.workstations, 200.0);
                assert_eq!(w.utilization, 0.0);
                assert_eq!(w.cost_per_workstation, DEFAULT_COST_PER_WORKSTATION);
                assert!(!w.cost_overridden);
            }
            other => panic!("unexpected basis {:?}", other),
        }
        assert_eq!(input.work_model, WorkModel::Office);

        let r = calculate(&input);
        assert!(approx(r.annual_cost, 1_800_000.0));
        // zero utilization means every euro is waste
        assert!(approx(r.annual_waste, 1_800_000.0));
        assert!(approx(r.cost_cut_percentage, 75.0));
    }

    #[test]
    fn test_explicit_workstations_win_over_employees() {
        let form = CalculatorForm {
            number_of_employees: FieldValue::from("200"),
            current_workstations: FieldValue::Number(150.0),
            workstation_utilization: FieldValue::Number(50.0),
            annual_cost_per_workstation: FieldValue::from("10000"),
            work_model: WorkModel::Hybrid,
            ..Default::default()
        };
        let r = calculate_form(CalculationMethod::Workstations, &form);
        assert!(approx(r.annual_cost, 1_500_000.0));
        assert!(approx(r.annual_waste, 675_000.0));
    }

    #[test]
    fn test_empty_form_is_all_zero() {
        for method in [CalculationMethod::Workstations, CalculationMethod::SquareMeters] {
            let r = calculate_form(method, &CalculatorForm::default());
            assert_eq!(r.annual_cost, 0.0);
            assert_eq!(r.annual_waste, 0.0);
            assert_eq!(r.monthly_waste, 0.0);
            assert_eq!(r.cost_cut_percentage, 0.0);
            assert_eq!(r.calculation_method, method);
        }
    }

    #[test]
    fn test_overflowing_inputs_yield_finite_figures() {
        let form = CalculatorForm {
            number_of_employees: FieldValue::Number(1e305),
            workstation_utilization: FieldValue::from("50"),
            ..Default::default()
        };
        let b = breakdown(&build_input(CalculationMethod::Workstations, &form));
        for value in [
            b.annual_cost,
            b.baseline_waste,
            b.annual_waste,
            b.recoverable_savings,
            b.optimized_cost,
            b.cost_cut_percentage,
            b.monthly_waste,
        ] {
            assert!(value.is_finite());
        }
        assert_eq!(b.annual_cost, 0.0);
        assert_eq!(b.annual_waste, 0.0);

        let json = serde_json::to_value(b.result()).unwrap();
        assert_eq!(json["annualCost"], 0.0);
        assert_eq!(json["monthlyWaste"], 0.0);
    }
}
