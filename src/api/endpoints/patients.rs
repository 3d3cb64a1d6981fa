//! Patient lookup for the entry form and per-patient test history.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db;
use crate::models::{PatientRecord, TestResultRecord};

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 50;

#[derive(Deserialize)]
pub struct PatientsQuery {
    pub q: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Serialize)]
pub struct PatientsResponse {
    pub patients: Vec<PatientRecord>,
}

/// `GET /api/patients?q=` — name or registration number, newest first.
pub async fn search(
    State(ctx): State<ApiContext>,
    Query(query): Query<PatientsQuery>,
) -> Result<Json<PatientsResponse>, ApiError> {
    let term = query.q.as_deref().map(str::trim).unwrap_or_default();
    if term.is_empty() {
        return Ok(Json(PatientsResponse { patients: vec![] }));
    }

    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let conn = ctx.core.open_db()?;
    let patients = db::search_patients(&conn, term, limit)?;
    Ok(Json(PatientsResponse { patients }))
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub patient: PatientRecord,
    pub test_results: Vec<TestResultRecord>,
}

/// `GET /api/patients/:id/test-results` — the patient with every stored
/// result, newest first.
pub async fn history(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let id = Uuid::parse_str(&id).map_err(|_| ApiError::BadRequest("Invalid patient ID".into()))?;
    let conn = ctx.core.open_db()?;
    let patient = db::get_patient(&conn, &id)?;
    let test_results = db::list_test_results_for_patient(&conn, &id)?;
    Ok(Json(HistoryResponse { patient, test_results }))
}
