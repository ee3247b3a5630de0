use serde::{Deserialize, Serialize};

// Form values

/// A loosely typed form value.
///
/// The calculator form posts whatever the browser had in its inputs: JSON
/// numbers, strings (possibly empty or junk) or `null`. Nothing here ever
/// fails to coerce: booleans, arrays and objects read as `Empty`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged, from = "RawField")]
pub enum FieldValue {
	Number(f64),
	Text(String),
	#[default]
	Empty,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawField {
	Number(f64),
	Text(String),
	Other(serde::de::IgnoredAny),
}

impl From<RawField> for FieldValue {
	fn from(raw: RawField) -> Self {
		match raw {
			RawField::Number(n) => FieldValue::Number(n),
			RawField::Text(s) => FieldValue::Text(s),
			RawField::Other(_) => FieldValue::Empty,
		}
	}
}

impl FieldValue {
	/// Numeric value using leading-prefix parsing (`"12.5m2"` -> 12.5).
	/// Anything unparseable or non-finite is 0.
	pub fn as_number(&self) -> f64 {
		let value = match self {
			FieldValue::Number(n) => *n,
			FieldValue::Text(s) => parse_leading_float(s).unwrap_or(0.0),
			FieldValue::Empty => 0.0,
		};
		if value.is_finite() { value } else { 0.0 }
	}

	/// True when the value carries no usable text at all.
	pub fn is_blank(&self) -> bool {
		match self {
			FieldValue::Number(_) => false,
			FieldValue::Text(s) => s.trim().is_empty(),
			FieldValue::Empty => true,
		}
	}

	/// Text as the visitor typed it, used when echoing inputs back in reports.
	pub fn display(&self) -> String {
		match self {
			FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{:.0}", n),
			FieldValue::Number(n) => n.to_string(),
			FieldValue::Text(s) => s.trim().to_string(),
			FieldValue::Empty => String::new(),
		}
	}

	/// Like [`display`](Self::display) but with a placeholder for blanks.
	pub fn display_or(&self, fallback: &str) -> String {
		if self.is_blank() { fallback.to_string() } else { self.display() }
	}
}

impl From<f64> for FieldValue {
	fn from(n: f64) -> Self {
		FieldValue::Number(n)
	}
}

impl From<&str> for FieldValue {
	fn from(s: &str) -> Self {
		FieldValue::Text(s.to_string())
	}
}

/// Parses the longest numeric prefix of `raw` after leading whitespace.
fn parse_leading_float(raw: &str) -> Option<f64> {
	let s = raw.trim_start();
	let bytes = s.as_bytes();
	let mut end = 0;

	if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
		end += 1;
	}
	let int_start = end;
	while end < bytes.len() && bytes[end].is_ascii_digit() {
		end += 1;
	}
	let mut digits = end - int_start;
	if end < bytes.len() && bytes[end] == b'.' {
		let frac_start = end + 1;
		let mut frac_end = frac_start;
		while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
			frac_end += 1;
		}
		if digits > 0 || frac_end > frac_start {
			digits += frac_end - frac_start;
			end = frac_end;
		}
	}
	if digits == 0 {
		return None;
	}
	// Exponent only counts when digits follow it
	if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
		let mut exp_end = end + 1;
		if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
			exp_end += 1;
		}
		let exp_digits_start = exp_end;
		while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
			exp_end += 1;
		}
		if exp_end > exp_digits_start {
			end = exp_end;
		}
	}

	s[..end].parse::<f64>().ok()
}

// Calculation method & work model

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CalculationMethod {
	#[default]
	#[serde(rename = "workstations")]
	Workstations,
	#[serde(rename = "square-meters", alias = "m2")]
	SquareMeters,
}

impl CalculationMethod {
	pub fn as_str(&self) -> &'static str {
		match self {
			CalculationMethod::Workstations => "workstations",
			CalculationMethod::SquareMeters => "square-meters",
		}
	}

	pub fn is_workstations(&self) -> bool {
		matches!(self, CalculationMethod::Workstations)
	}
}

/// How the organisation works. Unknown values fall back to `Office`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "FieldValue", into = "String")]
pub enum WorkModel {
	#[default]
	Office,
	Hybrid,
	Remote,
}

impl WorkModel {
	pub fn parse(raw: &str) -> Self {
		match raw.trim().to_ascii_lowercase().as_str() {
			"hybrid" => WorkModel::Hybrid,
			"remote" => WorkModel::Remote,
			_ => WorkModel::Office,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			WorkModel::Office => "office",
			WorkModel::Hybrid => "hybrid",
			WorkModel::Remote => "remote",
		}
	}

	/// Hybrid and remote models get their own adjustment step in reports.
	pub fn is_distributed(&self) -> bool {
		!matches!(self, WorkModel::Office)
	}
}

impl From<FieldValue> for WorkModel {
	fn from(value: FieldValue) -> Self {
		match value {
			FieldValue::Text(s) => WorkModel::parse(&s),
			_ => WorkModel::Office,
		}
	}
}

impl From<WorkModel> for String {
	fn from(model: WorkModel) -> Self {
		model.as_str().to_string()
	}
}

// Form state as posted by the calculator page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalculatorForm {
	pub office_size: FieldValue,
	pub monthly_cost: FieldValue,
	pub utilization: FieldValue,
	pub work_model: WorkModel,
	pub company_name: FieldValue,
	pub number_of_employees: FieldValue,
	pub organisation_name: FieldValue,
	pub current_workstations: FieldValue,
	pub workstation_utilization: FieldValue,
	pub annual_cost_per_workstation: FieldValue,
}

// Typed calculator input

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkstationBasis {
	pub workstations: f64,
	pub utilization: f64,
	pub cost_per_workstation: f64,
	/// False when the industry default cost was used.
	pub cost_overridden: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorAreaBasis {
	pub office_size_m2: f64,
	pub monthly_cost: f64,
	pub occupancy: f64,
	/// False when the monthly cost was derived from the office size.
	pub cost_overridden: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum CostBasis {
	Workstations(WorkstationBasis),
	FloorArea(FloorAreaBasis),
}

impl CostBasis {
	pub fn method(&self) -> CalculationMethod {
		match self {
			CostBasis::Workstations(_) => CalculationMethod::Workstations,
			CostBasis::FloorArea(_) => CalculationMethod::SquareMeters,
		}
	}

	pub fn utilization(&self) -> f64 {
		match self {
			CostBasis::Workstations(w) => w.utilization,
			CostBasis::FloorArea(a) => a.occupancy,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorInput {
	pub basis: CostBasis,
	pub work_model: WorkModel,
}

// Calculation output

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
	pub annual_cost: f64,
	pub annual_waste: f64,
	pub monthly_waste: f64,
	pub cost_cut_percentage: f64,
	#[serde(default)]
	pub calculation_method: CalculationMethod,
}

/// Every intermediate value of the savings formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationBreakdown {
	pub calculation_method: CalculationMethod,
	pub annual_cost: f64,
	pub utilization: f64,
	pub waste_factor: f64,
	pub baseline_waste: f64,
	pub work_model: WorkModel,
	pub work_model_multiplier: f64,
	pub annual_waste: f64,
	pub recoverable_savings: f64,
	pub optimized_cost: f64,
	pub cost_cut_percentage: f64,
	pub monthly_waste: f64,
}

impl CalculationBreakdown {
	pub fn result(&self) -> CalculationResult {
		CalculationResult {
			annual_cost: self.annual_cost,
			annual_waste: self.annual_waste,
			monthly_waste: self.monthly_waste,
			cost_cut_percentage: self.cost_cut_percentage,
			calculation_method: self.calculation_method,
		}
	}
}

// Contact & request payloads

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactProfile {
	pub name: String,
	pub email: String,
	pub company: String,
	pub location: String,
}

/// Body of `/api/calculate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalculateRequest {
	pub calculation_method: CalculationMethod,
	pub calculator_data: CalculatorForm,
}

/// Body of `/api/send-report`, and the report payload of a download.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
	pub email_data: Option<ContactProfile>,
	pub calculator_data: Option<CalculatorForm>,
	#[serde(default)]
	pub calculation_method: Option<CalculationMethod>,
	#[serde(default)]
	pub results: Option<CalculationResult>,
}

impl ReportRequest {
	/// Explicit method first, then the one echoed in client results.
	pub fn method(&self) -> CalculationMethod {
		self.calculation_method
			.or_else(|| self.results.map(|r| r.calculation_method))
			.unwrap_or_default()
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRequest {
	#[serde(default)]
	pub download_token: Option<String>,
	#[serde(default)]
	pub report_data: Option<ReportRequest>,
}
