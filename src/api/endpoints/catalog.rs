//! `GET /api/catalog` — test types with their groups and fields, used by
//! the entry form to build inputs.

use axum::Json;
use serde::Serialize;

use crate::catalog::{self, TestPanel, DEFAULT_TEST_TYPE};

#[derive(Serialize)]
pub struct CatalogResponse {
    pub default_test_type: &'static str,
    pub panels: &'static [TestPanel],
}

pub async fn list() -> Json<CatalogResponse> {
    Json(CatalogResponse {
        default_test_type: DEFAULT_TEST_TYPE,
        panels: catalog::PANELS,
    })
}
