//! Statistics, health and the service index.

use actix_web::test;
use serde_json::json;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_statistics_on_empty_store() {
    let app = create_test_app().await;

    let (status, stats) = send(&app, test::TestRequest::get().uri("/api/v1/statistics")).await;

    assert_eq!(status, 200);
    assert_eq!(stats["total"], 0);
    assert_eq!(stats["byStatus"]["pending_treatment"], 0);
    assert_eq!(stats["fileUploads"]["complete"], 0);
}

#[actix_rt::test]
async fn test_statistics_sum_to_total() {
    let app = create_test_app().await;

    let mut ids = Vec::new();
    for i in 0..5 {
        let case = create_case(&app, &format!("Patient {}", i), "Dr. Smith").await;
        ids.push(case_id(&case));
    }

    upload_plan(&app, &ids[0], &["a.pdf"]).await;
    upload_plan(&app, &ids[1], &["b.pdf"]).await;
    upload_plan(&app, &ids[2], &["c.pdf"]).await;
    patch(&app, &ids[1], "approve", json!({ "approvedBy": "Dr. Smith" })).await;
    patch(
        &app,
        &ids[2],
        "request-revision",
        json!({ "requestedBy": "Dr. Smith", "notes": "Redo" }),
    )
    .await;
    send(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/cases/{}/files", ids[3]))
            .set_json(json!({
                "stlFiles": ["s.stl"],
                "prescription": ["rx.pdf"],
                "photos": ["p.jpg"]
            })),
    )
    .await;

    let (status, stats) = send(&app, test::TestRequest::get().uri("/api/v1/statistics")).await;
    assert_eq!(status, 200, "{}", stats);

    let by_status = &stats["byStatus"];
    assert_eq!(stats["total"], 5);
    assert_eq!(by_status["pending_treatment"], 2);
    assert_eq!(by_status["pending_approval"], 1);
    assert_eq!(by_status["approved"], 1);
    assert_eq!(by_status["rejected"], 0);
    assert_eq!(by_status["revision_requested"], 1);

    let sum: u64 = by_status
        .as_object()
        .unwrap()
        .values()
        .map(|v| v.as_u64().unwrap())
        .sum();
    assert_eq!(sum, 5);

    assert_eq!(stats["fileUploads"]["stlFiles"], 1);
    assert_eq!(stats["fileUploads"]["complete"], 1);
}

#[actix_rt::test]
async fn test_health_reports_memory_store() {
    let app = create_test_app().await;

    let (status, health) = send(&app, test::TestRequest::get().uri("/api/v1/health")).await;

    assert_eq!(status, 200);
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["storage"], "memory");
    assert_eq!(health["database"], "connected");
}

#[actix_rt::test]
async fn test_service_index_lists_endpoints() {
    let app = create_test_app().await;

    let (status, info) = send(&app, test::TestRequest::get().uri("/api/v1/")).await;

    assert_eq!(status, 200);
    assert_eq!(info["storage"], "memory");
    let paths: Vec<&str> = info["endpoints"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["path"].as_str().unwrap())
        .collect();
    assert!(paths.contains(&"/api/v1/cases/{id}/approve"));
    assert!(paths.contains(&"/api/v1/statistics"));
}
