//! Shared test helpers for the case API tests.

use std::sync::Arc;

use actix_web::{App, dev::ServiceResponse, test, web};
use aligner_cases_lib::api;
use aligner_cases_lib::middleware::RequestLogger;
use aligner_cases_lib::services::CaseService;
use aligner_cases_lib::store::MemoryStore;
use serde_json::{Value, json};

/// Create a test app backed by an empty in-memory store.
pub async fn create_test_app() -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = ServiceResponse,
    Error = actix_web::Error,
> {
    let service = CaseService::new(Arc::new(MemoryStore::new()));

    test::init_service(
        App::new()
            .wrap(RequestLogger)
            .app_data(web::Data::new(service))
            .app_data(api::json_config())
            .app_data(api::query_config())
            .service(web::scope("/api/v1").configure(api::configure_routes)),
    )
    .await
}

/// Send a request and return the status with the parsed JSON body
/// (`Value::Null` for empty bodies).
pub async fn send<S>(app: &S, req: test::TestRequest) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let resp = test::call_service(app, req.to_request()).await;
    let status = resp.status().as_u16();
    let bytes = test::read_body(resp).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Response body is not JSON")
    };
    (status, body)
}

/// Create a case and return its JSON representation.
pub async fn create_case<S>(app: &S, patient: &str, doctor: &str) -> Value
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let (status, body) = send(
        app,
        test::TestRequest::post().uri("/api/v1/cases").set_json(json!({
            "patient": { "name": patient },
            "doctor": doctor,
        })),
    )
    .await;
    assert_eq!(status, 201, "Failed to create case: {}", body);
    body
}

/// Upload a treatment plan as `Admin`.
pub async fn upload_plan<S>(app: &S, case_id: &str, files: &[&str]) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    send(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/cases/{}/treatment-plan", case_id))
            .set_json(json!({ "files": files, "uploadedBy": "Admin" })),
    )
    .await
}

/// `PATCH /cases/{id}/{action}` with a JSON body.
pub async fn patch<S>(app: &S, case_id: &str, action: &str, body: Value) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    send(
        app,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/cases/{}/{}", case_id, action))
            .set_json(body),
    )
    .await
}

/// Read the `caseId` of a case body.
pub fn case_id(case: &Value) -> String {
    case["caseId"]
        .as_str()
        .expect("caseId missing")
        .to_string()
}
