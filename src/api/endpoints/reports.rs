//! Report generation endpoints.
//!
//! `POST /api/reports/preview` renders without touching the store.
//! `POST /api/reports` persists the patient and test result first, then
//! renders with the stored registration number.

use axum::extract::State;
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::ReportSubmission;
use crate::report::content_disposition;
use crate::submission::{self, GeneratedReport, PREVIEW_REGISTRATION};

fn header_value(value: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value).map_err(|e| ApiError::Internal(format!("bad header value: {e}")))
}

/// Wrap a rendered report as a PDF download.
pub(crate) fn pdf_response(
    status: StatusCode,
    report: GeneratedReport,
    extra: &[(&'static str, String)],
) -> Result<Response, ApiError> {
    let disposition = header_value(&content_disposition(&report.file_name))?;
    let mut response = (status, report.pdf).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    for (name, value) in extra {
        headers.insert(HeaderName::from_static(*name), header_value(value)?);
    }
    Ok(response)
}

/// `POST /api/reports/preview`
pub async fn preview(
    State(ctx): State<ApiContext>,
    Json(body): Json<ReportSubmission>,
) -> Result<Response, ApiError> {
    let report = submission::generate_report(&body, PREVIEW_REGISTRATION, &ctx.core.lab)?;
    pdf_response(StatusCode::OK, report, &[])
}

/// `POST /api/reports` — store the submission and return its PDF.
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(body): Json<ReportSubmission>,
) -> Result<Response, ApiError> {
    let conn = ctx.core.open_db()?;
    let outcome = submission::submit(&conn, &body, &ctx.core.lab)?;

    let extra = [
        ("x-patient-id", outcome.patient.id.to_string()),
        ("x-registration-number", outcome.patient.registration_number.clone()),
        ("x-test-result-id", outcome.test_result.id.to_string()),
        ("x-new-patient", outcome.is_new_patient.to_string()),
    ];
    pdf_response(StatusCode::CREATED, outcome.report, &extra)
}
