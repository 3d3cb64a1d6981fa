//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Middleware stack on protected routes (outermost → innermost):
//! 1. Auth validator → 2. Audit logger
//!
//! Every response carries `Cache-Control: no-store`.

use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);

    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route("/auth/logout", post(endpoints::auth::logout))
        .route("/catalog", get(endpoints::catalog::list))
        .route("/reports", post(endpoints::reports::create))
        .route("/reports/preview", post(endpoints::reports::preview))
        .route("/patients", get(endpoints::patients::search))
        .route("/patients/:id/test-results", get(endpoints::patients::history))
        .route("/admin/records", get(endpoints::admin::records))
        .route(
            "/admin/test-results/:id/report",
            get(endpoints::admin::download_report),
        )
        .with_state(ctx.clone())
        // Innermost first, outermost last
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        // Extension must be outermost so middleware can extract ApiContext
        .layer(axum::Extension(ctx.clone()));

    let unprotected = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/auth/login", post(endpoints::auth::login))
        .with_state(ctx.clone())
        .layer(axum::Extension(ctx));

    // Responses carry tokens and patient data
    Router::new()
        .nest("/api", protected)
        .nest("/api", unprotected)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::auth::create_admin;
    use crate::config::LabProfile;

    const BODY_LIMIT: usize = 4 * 1024 * 1024;

    /// Core backed by a temp database. The tempdir guard must outlive the test.
    fn test_core() -> (Arc<CoreState>, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let core = CoreState::new(tmp.path().join("lab.db"), LabProfile::default(), 24);
        (Arc::new(core), tmp)
    }

    fn test_core_with_admin() -> (Arc<CoreState>, tempfile::TempDir) {
        let (core, tmp) = test_core();
        let conn = core.open_db().unwrap();
        create_admin(&conn, "admin", "correct-horse", 1_000).unwrap();
        (core, tmp)
    }

    fn login_token(core: &CoreState) -> String {
        core.write_sessions().unwrap().issue("admin").token
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: Option<serde_json::Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header("Authorization", format!("Bearer {t}"));
        }
        match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn cbc_submission(hemoglobin: &str) -> serde_json::Value {
        serde_json::json!({
            "test_type": "CBC",
            "patient": { "name": "Asha Rao", "age": 41, "sex": "F" },
            "values": { "hemoglobin": hemoglobin },
        })
    }

    #[tokio::test]
    async fn health_is_public() {
        let (core, _tmp) = test_core();
        let response = api_router(core)
            .oneshot(request("GET", "/api/health", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("Cache-Control").unwrap(), "no-store");
        let json = json_body(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn protected_routes_require_token() {
        let (core, _tmp) = test_core();
        let app = api_router(core);
        for uri in ["/api/catalog", "/api/patients?q=a", "/api/admin/records"] {
            let response = app.clone().oneshot(request("GET", uri, None, None)).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[tokio::test]
    async fn unknown_token_is_rejected() {
        let (core, _tmp) = test_core();
        let response = api_router(core)
            .oneshot(request("GET", "/api/catalog", Some("forged"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error"]["code"], "SESSION_EXPIRED");
    }

    #[tokio::test]
    async fn login_then_use_token() {
        let (core, _tmp) = test_core_with_admin();
        let app = api_router(core);

        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/auth/login",
                None,
                Some(serde_json::json!({ "username": "admin", "password": "correct-horse" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let token = json_body(response).await["token"].as_str().unwrap().to_string();

        let response = app
            .oneshot(request("GET", "/api/catalog", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("Cache-Control").unwrap(), "no-store");
        let json = json_body(response).await;
        assert_eq!(json["default_test_type"], "CBC");
        assert_eq!(json["panels"][0]["code"], "CBC");
    }

    #[tokio::test]
    async fn wrong_password_is_401_then_throttled() {
        let (core, _tmp) = test_core_with_admin();
        let app = api_router(core);
        let bad = serde_json::json!({ "username": "admin", "password": "wrong" });

        for _ in 0..crate::auth::throttle::MAX_FAILURES {
            let response = app
                .clone()
                .oneshot(request("POST", "/api/auth/login", None, Some(bad.clone())))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }

        // Even the right password is refused while throttled
        let good = serde_json::json!({ "username": "admin", "password": "correct-horse" });
        let response = app
            .oneshot(request("POST", "/api/auth/login", None, Some(good)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().get("Retry-After").is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_wrong_passwords_cannot_exceed_limit() {
        let (core, _tmp) = test_core_with_admin();
        let app = api_router(core);
        let bad = serde_json::json!({ "username": "admin", "password": "wrong" });

        let attempts = crate::auth::throttle::MAX_FAILURES * 3;
        let handles: Vec<_> = (0..attempts)
            .map(|_| {
                let app = app.clone();
                let body = bad.clone();
                tokio::spawn(async move {
                    app.oneshot(request("POST", "/api/auth/login", None, Some(body)))
                        .await
                        .unwrap()
                        .status()
                })
            })
            .collect();

        let mut unauthorized = 0;
        let mut limited = 0;
        for handle in handles {
            match handle.await.unwrap() {
                StatusCode::UNAUTHORIZED => unauthorized += 1,
                StatusCode::TOO_MANY_REQUESTS => limited += 1,
                other => panic!("unexpected status {other}"),
            }
        }
        assert_eq!(unauthorized, crate::auth::throttle::MAX_FAILURES);
        assert_eq!(limited, attempts - unauthorized);
    }

    #[tokio::test]
    async fn logout_revokes_token() {
        let (core, _tmp) = test_core();
        let token = login_token(&core);
        let app = api_router(core);

        let response = app
            .clone()
            .oneshot(request("POST", "/api/auth/logout", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(request("GET", "/api/catalog", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn preview_returns_pdf_without_storing() {
        let (core, _tmp) = test_core();
        let token = login_token(&core);
        let app = api_router(core.clone());

        let response = app
            .oneshot(request("POST", "/api/reports/preview", Some(&token), Some(cbc_submission("9.0"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("Content-Type").unwrap(), "application/pdf");
        let bytes = to_bytes(response.into_body(), BODY_LIMIT).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        let conn = core.open_db().unwrap();
        assert!(crate::db::search_patients(&conn, "Asha", 10).unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_report_persists_and_sets_headers() {
        let (core, _tmp) = test_core();
        let token = login_token(&core);
        let app = api_router(core);

        let response = app
            .clone()
            .oneshot(request("POST", "/api/reports", Some(&token), Some(cbc_submission("9.0"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let headers = response.headers();
        assert_eq!(headers.get("X-Registration-Number").unwrap(), "REG000001");
        assert_eq!(
            headers.get("Content-Disposition").unwrap(),
            "attachment; filename=\"sugar_diagnostic_cbc_report_Asha_Rao.pdf\"; \
             filename*=UTF-8''sugar_diagnostic_cbc_report_Asha_Rao.pdf"
        );
        let result_id = headers.get("X-Test-Result-Id").unwrap().to_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(request("GET", "/api/patients?q=asha", Some(&token), None))
            .await
            .unwrap();
        let json = json_body(response).await;
        assert_eq!(json["patients"].as_array().unwrap().len(), 1);

        let response = app
            .clone()
            .oneshot(request("GET", "/api/admin/records?test_type=CBC", Some(&token), None))
            .await
            .unwrap();
        let json = json_body(response).await;
        assert_eq!(json["records"][0]["test_result"]["id"], result_id.as_str());
        assert_eq!(json["filters_active"], 1);
        assert_eq!(json["total_patients"], 1);
        assert_eq!(json["total_tests"], 1);
        assert_eq!(json["filtered_count"], 1);

        let uri = format!("/api/admin/test-results/{result_id}/report");
        let response = app.oneshot(request("GET", &uri, Some(&token), None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), BODY_LIMIT).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn accented_patient_name_gets_ascii_fallback_filename() {
        let (core, _tmp) = test_core();
        let token = login_token(&core);
        let body = serde_json::json!({
            "test_type": "CBC",
            "patient": { "name": "José Müller", "age": 60, "sex": "M" },
            "values": { "hemoglobin": "14" },
        });
        let response = api_router(core)
            .oneshot(request("POST", "/api/reports/preview", Some(&token), Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response.headers().get("Content-Disposition").unwrap().to_str().unwrap();
        assert!(disposition.contains("filename=\"sugar_diagnostic_cbc_report_Jos__M_ller.pdf\""));
        assert!(disposition.contains("filename*=UTF-8''sugar_diagnostic_cbc_report_Jos%C3%A9_M%C3%BCller.pdf"));
    }

    #[tokio::test]
    async fn admin_totals_ignore_filters() {
        let (core, _tmp) = test_core();
        let token = login_token(&core);
        let app = api_router(core);

        let lft = serde_json::json!({
            "test_type": "LFT",
            "patient": { "name": "Ravi Kumar", "age": 52, "sex": "M" },
            "values": { "sgptAlt": "45" },
        });
        for body in [cbc_submission("12"), lft] {
            let response = app
                .clone()
                .oneshot(request("POST", "/api/reports", Some(&token), Some(body)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = app
            .oneshot(request("GET", "/api/admin/records?test_type=lft", Some(&token), None))
            .await
            .unwrap();
        let json = json_body(response).await;
        assert_eq!(json["total_patients"], 2);
        assert_eq!(json["total_tests"], 2);
        assert_eq!(json["filtered_count"], 1);
        assert_eq!(json["records"][0]["patient"]["name"], "Ravi Kumar");
    }

    #[tokio::test]
    async fn patient_history_lists_stored_results() {
        let (core, _tmp) = test_core();
        let token = login_token(&core);
        let app = api_router(core);

        let response = app
            .clone()
            .oneshot(request("POST", "/api/reports", Some(&token), Some(cbc_submission("9.0"))))
            .await
            .unwrap();
        let patient_id = response.headers().get("X-Patient-Id").unwrap().to_str().unwrap().to_string();

        let mut repeat = cbc_submission("11.5");
        repeat["existing_patient_id"] = serde_json::Value::String(patient_id.clone());
        let response = app
            .clone()
            .oneshot(request("POST", "/api/reports", Some(&token), Some(repeat)))
            .await
            .unwrap();
        assert_eq!(response.headers().get("X-New-Patient").unwrap(), "false");

        let uri = format!("/api/patients/{patient_id}/test-results");
        let response = app.oneshot(request("GET", &uri, Some(&token), None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["patient"]["registration_number"], "REG000001");
        let results = json["test_results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r["test_type"] == "CBC"));
    }

    #[tokio::test]
    async fn patient_history_rejects_bad_ids() {
        let (core, _tmp) = test_core();
        let token = login_token(&core);
        let app = api_router(core);

        let uri = format!("/api/patients/{}/test-results", uuid::Uuid::new_v4());
        let response = app.clone().oneshot(request("GET", &uri, Some(&token), None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(request("GET", "/api/patients/abc/test-results", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_submission_is_422() {
        let (core, _tmp) = test_core();
        let token = login_token(&core);
        let body = serde_json::json!({
            "test_type": "CBC",
            "patient": { "name": "Asha Rao", "age": 41, "sex": "F" },
            "values": { "hemoglobin": "  " },
        });
        let response = api_router(core)
            .oneshot(request("POST", "/api/reports", Some(&token), Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json_body(response).await["error"]["code"], "EMPTY_SUBMISSION");
    }

    #[tokio::test]
    async fn unknown_test_result_is_404() {
        let (core, _tmp) = test_core();
        let token = login_token(&core);
        let uri = format!("/api/admin/test-results/{}/report", uuid::Uuid::new_v4());
        let response = api_router(core)
            .oneshot(request("GET", &uri, Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_test_result_id_is_400() {
        let (core, _tmp) = test_core();
        let token = login_token(&core);
        let response = api_router(core)
            .oneshot(request("GET", "/api/admin/test-results/not-a-uuid/report", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn not_found_for_unknown_route() {
        let (core, _tmp) = test_core();
        let response = api_router(core)
            .oneshot(request("GET", "/api/nonexistent", None, None))
            .await
            .unwrap();
        // axum returns 404 for unknown routes before any middleware runs
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
