//! Admin listing and historical report download.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::endpoints::reports::pdf_response;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db;
use crate::models::{AdminFilter, AdminRecord};
use crate::submission;

/// Raw query string. Dates arrive as text so a blank form field is
/// "no filter" rather than a rejection.
#[derive(Debug, Default, Deserialize)]
pub struct RecordsQuery {
    pub name: Option<String>,
    pub reg_no: Option<String>,
    pub test_type: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

fn parse_date(field: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("{field} must be YYYY-MM-DD"))),
    }
}

impl TryFrom<RecordsQuery> for AdminFilter {
    type Error = ApiError;

    fn try_from(query: RecordsQuery) -> Result<Self, Self::Error> {
        let date_from = parse_date("date_from", query.date_from.as_deref())?;
        let date_to = parse_date("date_to", query.date_to.as_deref())?;
        if let (Some(from), Some(to)) = (date_from, date_to) {
            if from > to {
                return Err(ApiError::BadRequest("date_from is after date_to".into()));
            }
        }
        Ok(AdminFilter {
            name: query.name,
            reg_no: query.reg_no,
            test_type: query.test_type,
            date_from,
            date_to,
        })
    }
}

/// Listing plus the summary counters shown above the admin table.
#[derive(Serialize)]
pub struct RecordsResponse {
    pub total_patients: i64,
    pub total_tests: i64,
    pub filtered_count: usize,
    pub filters_active: usize,
    pub records: Vec<AdminRecord>,
}

/// `GET /api/admin/records` — newest first.
pub async fn records(
    State(ctx): State<ApiContext>,
    Query(query): Query<RecordsQuery>,
) -> Result<Json<RecordsResponse>, ApiError> {
    let filter = AdminFilter::try_from(query)?;
    let conn = ctx.core.open_db()?;
    let records = db::list_admin_records(&conn, &filter)?;
    Ok(Json(RecordsResponse {
        total_patients: db::count_patients(&conn)?,
        total_tests: db::count_test_results(&conn)?,
        filtered_count: records.len(),
        filters_active: filter.active_count(),
        records,
    }))
}

/// `GET /api/admin/test-results/:id/report` — re-render a stored result.
pub async fn download_report(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = Uuid::parse_str(&id).map_err(|_| ApiError::BadRequest("Invalid test result ID".into()))?;
    let conn = ctx.core.open_db()?;
    let report = submission::regenerate(&conn, &id, &ctx.core.lab)?;
    pdf_response(StatusCode::OK, report, &[])
}
