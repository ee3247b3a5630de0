use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use models::{CalculateRequest, DownloadRequest, ReportRequest};
use report_renderer::{render_report, ReportContext, ReportMeta};
use std::sync::Arc;

use crate::{
    error::ApiError,
    submission::{token_is_acceptable, validate, SubmissionService},
    Result,
};

pub type ServiceState = Arc<SubmissionService>;

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "savings-calculator-api"
    }))
}

/// POST /api/calculate
/// Runs the calculator on raw form input, no side effects
pub async fn calculate(payload: std::result::Result<Json<CalculateRequest>, JsonRejection>) -> Result<impl IntoResponse> {
    let Json(request) = payload?;
    let result = savings_engine::calculate_form(request.calculation_method, &request.calculator_data);

    tracing::debug!(
        method = request.calculation_method.as_str(),
        annual_waste = result.annual_waste,
        "Calculated savings"
    );

    Ok(Json(result))
}

/// POST /api/send-report
/// Recalculates, renders, forwards the lead and emails the report
pub async fn send_report(
    State(service): State<ServiceState>,
    payload: std::result::Result<Json<ReportRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(request) = payload?;
    let submission = validate(request)?;
    let outcome = service.submit(submission, ReportMeta::now()).await?;

    Ok(Json(outcome))
}

/// POST /api/download-report
/// Re-renders the report as an HTML attachment
pub async fn download_report(payload: std::result::Result<Json<DownloadRequest>, JsonRejection>) -> Result<impl IntoResponse> {
    let Json(request) = payload?;

    if !token_is_acceptable(request.download_token.as_deref()) {
        return Err(ApiError::InvalidToken);
    }

    let report = request
        .report_data
        .ok_or_else(|| ApiError::BadRequest("Missing required field: reportData".to_string()))?;
    let method = report.method();
    let form = report
        .calculator_data
        .ok_or_else(|| ApiError::BadRequest("Missing required field: reportData.calculatorData".to_string()))?;
    let contact = report.email_data.unwrap_or_default();

    let ctx = ReportContext::build(contact, method, form, ReportMeta::now());
    let html = render_report(&ctx);
    let filename = ctx.filename();

    tracing::info!(report_id = %ctx.meta.report_id, filename = %filename, "Serving report download");

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
        .map_err(|e| ApiError::Internal(format!("invalid report filename: {}", e)))?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

    Ok((StatusCode::OK, headers, html))
}
