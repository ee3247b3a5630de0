use std::time::Duration;

use models::{CalculationMethod, CalculationResult, CalculatorForm, ContactProfile};
use reqwest::{Client, Url};
use savings_engine::RECOVERY_RATE;
use serde::Serialize;

use crate::{build_http, parse_endpoint, rejection_message, DeliveryError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrmField {
    pub name: String,
    pub value: String,
}

impl CrmField {
    fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
        }
    }
}

/// Form submission body: `{"fields": [{"name", "value"}, ...]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrmSubmission {
    pub fields: Vec<CrmField>,
}

impl CrmSubmission {
    /// Derives the lead's field list from contact details and the calculation.
    pub fn from_lead(contact: &ContactProfile, form: &CalculatorForm, result: &CalculationResult) -> Self {
        let mut words = contact.name.split_whitespace();
        let first_name = words.next().unwrap_or_default().to_string();
        let rest: Vec<&str> = words.collect();
        let last_name = if rest.is_empty() {
            contact.name.trim().to_string()
        } else {
            rest.join(" ")
        };

        let size_field = match result.calculation_method {
            CalculationMethod::SquareMeters => {
                CrmField::new("total_office_size_m2", form.office_size.display_or("0"))
            }
            CalculationMethod::Workstations => {
                let count = if form.current_workstations.is_blank() {
                    form.number_of_employees.display_or("0")
                } else {
                    form.current_workstations.display()
                };
                CrmField::new("current_workstations", count)
            }
        };

        let utilization = if form.workstation_utilization.is_blank() {
            form.utilization.display_or("0")
        } else {
            form.workstation_utilization.display()
        };

        let savings = (result.annual_waste * RECOVERY_RATE).round();

        Self {
            fields: vec![
                CrmField::new("firstname", first_name),
                CrmField::new("lastname", last_name),
                CrmField::new("email", contact.email.trim()),
                CrmField::new("company", contact.company.trim()),
                CrmField::new("city", contact.location.trim()),
                CrmField::new("organisation_name", form.organisation_name.display()),
                CrmField::new("number_of_employees", form.number_of_employees.display()),
                size_field,
                CrmField::new("workstation_utilization_percent", utilization),
                CrmField::new("annual_savings_potential", format!("{:.0}", savings)),
                CrmField::new("calculation_method", result.calculation_method.as_str()),
            ],
        }
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

/// Client for a HubSpot-style form ingestion endpoint. No auth.
#[derive(Debug, Clone)]
pub struct CrmClient {
    http: Client,
    endpoint: Url,
}

impl CrmClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, DeliveryError> {
        Ok(Self {
            http: build_http(timeout)?,
            endpoint: parse_endpoint(endpoint)?,
        })
    }

    /// Posts the submission and returns the response status on success.
    pub async fn submit(&self, submission: &CrmSubmission) -> Result<u16, DeliveryError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(submission)
            .send()
            .await?;

        let status = response.status();
        tracing::info!(status = status.as_u16(), "CRM submission response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected {
                service: "CRM",
                status: status.as_u16(),
                message: rejection_message(status, &body),
            });
        }
        Ok(status.as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::{FieldValue, WorkModel};
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn contact(name: &str) -> ContactProfile {
        ContactProfile {
            name: name.to_string(),
            email: " jo@example.com ".to_string(),
            company: "Acme".to_string(),
            location: "Delft".to_string(),
        }
    }

    fn result(method: CalculationMethod) -> CalculationResult {
        CalculationResult {
            annual_cost: 9_000_000.0,
            annual_waste: 4_050_000.0,
            monthly_waste: 337_500.0,
            cost_cut_percentage: 33.75,
            calculation_method: method,
        }
    }

    #[test]
    fn test_workstation_lead_fields() {
        let form = CalculatorForm {
            number_of_employees: FieldValue::from("1000"),
            workstation_utilization: FieldValue::Number(50.0),
            organisation_name: FieldValue::from("Acme Group"),
            work_model: WorkModel::Hybrid,
            ..Default::default()
        };
        let sub = CrmSubmission::from_lead(
            &contact("Jo van der Berg"),
            &form,
            &result(CalculationMethod::Workstations),
        );

        assert_eq!(sub.value("firstname"), Some("Jo"));
        assert_eq!(sub.value("lastname"), Some("van der Berg"));
        assert_eq!(sub.value("email"), Some("jo@example.com"));
        assert_eq!(sub.value("city"), Some("Delft"));
        assert_eq!(sub.value("organisation_name"), Some("Acme Group"));
        assert_eq!(sub.value("current_workstations"), Some("1000"));
        assert_eq!(sub.value("total_office_size_m2"), None);
        assert_eq!(sub.value("workstation_utilization_percent"), Some("50"));
        assert_eq!(sub.value("annual_savings_potential"), Some("3037500"));
        assert_eq!(sub.value("calculation_method"), Some("workstations"));
        assert_eq!(sub.fields.len(), 11);
    }

    #[test]
    fn test_area_lead_fields_and_single_name() {
        let form = CalculatorForm {
            office_size: FieldValue::from("8000"),
            utilization: FieldValue::from("60"),
            ..Default::default()
        };
        let sub = CrmSubmission::from_lead(&contact("Cher"), &form, &result(CalculationMethod::SquareMeters));

        assert_eq!(sub.value("firstname"), Some("Cher"));
        assert_eq!(sub.value("lastname"), Some("Cher"));
        assert_eq!(sub.value("total_office_size_m2"), Some("8000"));
        assert_eq!(sub.value("current_workstations"), None);
        assert_eq!(sub.value("workstation_utilization_percent"), Some("60"));
        assert_eq!(sub.value("number_of_employees"), Some(""));
        assert_eq!(sub.value("calculation_method"), Some("square-meters"));
    }

    #[tokio::test]
    async fn test_submit_posts_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/submit"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = CrmClient::new(&format!("{}/submit", server.uri()), Duration::from_secs(5)).unwrap();
        let sub = CrmSubmission::from_lead(
            &contact("Jo Jansen"),
            &CalculatorForm::default(),
            &result(CalculationMethod::Workstations),
        );
        assert_eq!(client.submit(&sub).await.unwrap(), 200);

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["fields"][0], json!({ "name": "firstname", "value": "Jo" }));
    }

    #[tokio::test]
    async fn test_submit_surfaces_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad form"))
            .mount(&server)
            .await;

        let client = CrmClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let sub = CrmSubmission { fields: vec![] };
        let err = client.submit(&sub).await.unwrap_err();
        assert!(matches!(err, DeliveryError::Rejected { status: 400, service: "CRM", .. }));
    }
}
