//! Treatment plan workflow over HTTP.

use actix_web::test;
use serde_json::json;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_upload_plan_moves_to_pending_approval() {
    let app = create_test_app().await;
    let case = create_case(&app, "Jane Roe", "Dr. Smith").await;

    let (status, updated) = upload_plan(&app, &case_id(&case), &["plan-v1.pdf"]).await;

    assert_eq!(status, 200, "{}", updated);
    assert_eq!(updated["status"], "pending_approval");
    let plan = &updated["treatmentPlan"];
    assert_eq!(plan["files"], json!(["plan-v1.pdf"]));
    assert_eq!(plan["uploadedBy"], "Admin");
    assert_eq!(plan["version"], 1);
    assert_eq!(plan["approved"], false);
    assert_eq!(plan["rejected"], false);
}

#[actix_rt::test]
async fn test_upload_plan_requires_files_and_uploader() {
    let app = create_test_app().await;
    let case = create_case(&app, "Jane Roe", "Dr. Smith").await;
    let uri = format!("/api/v1/cases/{}/treatment-plan", case_id(&case));

    for body in [
        json!({ "files": [], "uploadedBy": "Admin" }),
        json!({ "files": ["plan.pdf"], "uploadedBy": "" }),
        json!({ "files": ["  "], "uploadedBy": "Admin" }),
    ] {
        let (status, err) = send(
            &app,
            test::TestRequest::put().uri(&uri).set_json(body.clone()),
        )
        .await;
        assert_eq!(status, 400, "Body {} should be rejected", body);
        assert_eq!(err["error"], "VALIDATION_ERROR");
    }

    let (_, fetched) = send(
        &app,
        test::TestRequest::get().uri(&format!("/api/v1/cases/{}", case_id(&case))),
    )
    .await;
    assert_eq!(fetched["status"], "pending_treatment");
}

#[actix_rt::test]
async fn test_approve_plan() {
    let app = create_test_app().await;
    let case = create_case(&app, "Jane Roe", "Dr. Smith").await;
    let id = case_id(&case);
    upload_plan(&app, &id, &["plan.pdf"]).await;

    let (status, approved) = patch(&app, &id, "approve", json!({ "approvedBy": "Dr. Smith" })).await;

    assert_eq!(status, 200, "{}", approved);
    assert_eq!(approved["status"], "approved");
    assert_eq!(approved["treatmentPlan"]["approved"], true);
    assert_eq!(approved["treatmentPlan"]["approvedBy"], "Dr. Smith");
    assert!(approved["treatmentPlan"]["approvedAt"].is_string());

    let (status, err) = patch(&app, &id, "approve", json!({ "approvedBy": "Dr. Smith" })).await;
    assert_eq!(status, 409, "Approving twice should conflict");
    assert_eq!(err["error"], "INVALID_STATE");
}

#[actix_rt::test]
async fn test_reject_then_approve_is_refused() {
    let app = create_test_app().await;
    let case = create_case(&app, "Jane Roe", "Dr. Smith").await;
    let id = case_id(&case);
    upload_plan(&app, &id, &["plan.pdf"]).await;

    let (status, rejected) = patch(
        &app,
        &id,
        "reject",
        json!({ "rejectedBy": "Dr. Smith", "reason": "Wrong arch" }),
    )
    .await;
    assert_eq!(status, 200, "{}", rejected);
    assert_eq!(rejected["status"], "rejected");
    assert_eq!(rejected["treatmentPlan"]["rejected"], true);
    assert_eq!(rejected["treatmentPlan"]["rejectionReason"], "Wrong arch");

    let (status, err) = patch(&app, &id, "approve", json!({ "approvedBy": "Dr. Smith" })).await;
    assert_eq!(status, 409);
    assert_eq!(err["error"], "INVALID_STATE");

    let (status, _) = upload_plan(&app, &id, &["plan-v2.pdf"]).await;
    assert_eq!(status, 409, "A rejected case is closed");

    let (status, _) = send(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/cases/{}/files", id))
            .set_json(json!({ "photos": ["late.jpg"] })),
    )
    .await;
    assert_eq!(status, 409, "Files of a closed case cannot change");

    let (_, fetched) = send(
        &app,
        test::TestRequest::get().uri(&format!("/api/v1/cases/{}", id)),
    )
    .await;
    assert_eq!(fetched["status"], "rejected");
    assert_eq!(fetched["treatmentPlan"]["approved"], false);
}

#[actix_rt::test]
async fn test_reject_requires_reason() {
    let app = create_test_app().await;
    let case = create_case(&app, "Jane Roe", "Dr. Smith").await;
    let id = case_id(&case);
    upload_plan(&app, &id, &["plan.pdf"]).await;

    let (status, err) = patch(
        &app,
        &id,
        "reject",
        json!({ "rejectedBy": "Dr. Smith", "reason": " " }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(err["error"], "VALIDATION_ERROR");
}

#[actix_rt::test]
async fn test_revision_loop_bumps_plan_version() {
    let app = create_test_app().await;
    let case = create_case(&app, "Jane Roe", "Dr. Smith").await;
    let id = case_id(&case);
    upload_plan(&app, &id, &["plan-v1.pdf"]).await;

    let (status, revised) = patch(
        &app,
        &id,
        "request-revision",
        json!({ "requestedBy": "Dr. Smith", "notes": "Add attachments on 13" }),
    )
    .await;
    assert_eq!(status, 200, "{}", revised);
    assert_eq!(revised["status"], "revision_requested");
    assert_eq!(
        revised["treatmentPlan"]["revisionNotes"],
        "Add attachments on 13"
    );

    let (status, _) = patch(&app, &id, "approve", json!({ "approvedBy": "Dr. Smith" })).await;
    assert_eq!(status, 409, "Only a new upload leaves revision_requested");

    let (status, reuploaded) = upload_plan(&app, &id, &["plan-v2.pdf"]).await;
    assert_eq!(status, 200, "{}", reuploaded);
    assert_eq!(reuploaded["status"], "pending_approval");
    assert_eq!(reuploaded["treatmentPlan"]["version"], 2);
    assert_eq!(reuploaded["treatmentPlan"]["files"], json!(["plan-v2.pdf"]));
    assert_eq!(
        reuploaded["treatmentPlan"]["revisionNotes"],
        "Add attachments on 13"
    );

    let (status, approved) = patch(&app, &id, "approve", json!({ "approvedBy": "Dr. Smith" })).await;
    assert_eq!(status, 200);
    assert_eq!(approved["status"], "approved");
    assert_eq!(approved["treatmentPlan"]["version"], 2);
}

#[actix_rt::test]
async fn test_request_revision_requires_notes() {
    let app = create_test_app().await;
    let case = create_case(&app, "Jane Roe", "Dr. Smith").await;
    let id = case_id(&case);
    upload_plan(&app, &id, &["plan.pdf"]).await;

    let (status, err) = patch(
        &app,
        &id,
        "request-revision",
        json!({ "requestedBy": "Dr. Smith" }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(err["error"], "VALIDATION_ERROR");
}

#[actix_rt::test]
async fn test_actions_before_plan_upload_are_refused() {
    let app = create_test_app().await;
    let case = create_case(&app, "Jane Roe", "Dr. Smith").await;
    let id = case_id(&case);

    let attempts = [
        ("approve", json!({ "approvedBy": "Dr. Smith" })),
        ("reject", json!({ "rejectedBy": "Dr. Smith", "reason": "No plan" })),
        (
            "request-revision",
            json!({ "requestedBy": "Dr. Smith", "notes": "No plan" }),
        ),
    ];
    for (action, body) in attempts {
        let (status, err) = patch(&app, &id, action, body).await;
        assert_eq!(status, 409, "{} before upload should conflict", action);
        assert_eq!(err["error"], "INVALID_STATE");
    }
}

#[actix_rt::test]
async fn test_status_endpoint_applies_actions() {
    let app = create_test_app().await;
    let case = create_case(&app, "Jane Roe", "Dr. Smith").await;
    let id = case_id(&case);

    let (status, uploaded) = patch(
        &app,
        &id,
        "status",
        json!({ "action": "upload_treatment_plan", "actor": "Admin", "files": ["plan.pdf"] }),
    )
    .await;
    assert_eq!(status, 200, "{}", uploaded);
    assert_eq!(uploaded["status"], "pending_approval");

    let (status, rejected) = patch(
        &app,
        &id,
        "status",
        json!({ "action": "reject", "actor": "Dr. Smith", "reason": "Too aggressive" }),
    )
    .await;
    assert_eq!(status, 200, "{}", rejected);
    assert_eq!(rejected["status"], "rejected");
    assert_eq!(rejected["treatmentPlan"]["rejectedBy"], "Dr. Smith");
}

#[actix_rt::test]
async fn test_status_endpoint_rejects_raw_status() {
    let app = create_test_app().await;
    let case = create_case(&app, "Jane Roe", "Dr. Smith").await;
    let id = case_id(&case);

    let (status, err) = patch(&app, &id, "status", json!({ "status": "approved" })).await;
    assert_eq!(status, 400);
    assert_eq!(err["error"], "VALIDATION_ERROR");

    let (status, _) = patch(
        &app,
        &id,
        "status",
        json!({ "action": "approved", "actor": "Dr. Smith" }),
    )
    .await;
    assert_eq!(status, 400, "Status names are not actions");

    let (_, fetched) = send(
        &app,
        test::TestRequest::get().uri(&format!("/api/v1/cases/{}", id)),
    )
    .await;
    assert_eq!(fetched["status"], "pending_treatment");
}

#[actix_rt::test]
async fn test_workflow_on_unknown_case_is_not_found() {
    let app = create_test_app().await;

    let (status, err) = upload_plan(&app, "CP-1", &["plan.pdf"]).await;
    assert_eq!(status, 404);
    assert_eq!(err["error"], "NOT_FOUND");

    let (status, _) = patch(&app, "CP-1", "approve", json!({ "approvedBy": "Dr. Smith" })).await;
    assert_eq!(status, 404);
}

#[actix_rt::test]
async fn test_allowed_actions_follow_status() {
    let app = create_test_app().await;
    let case = create_case(&app, "Jane Roe", "Dr. Smith").await;
    let id = case_id(&case);
    let uri = format!("/api/v1/cases/{}/actions", id);

    let (status, actions) = send(&app, test::TestRequest::get().uri(&uri)).await;
    assert_eq!(status, 200, "{}", actions);
    assert_eq!(actions["caseId"], id.as_str());
    assert_eq!(actions["status"], "pending_treatment");
    assert_eq!(actions["allowedActions"], json!(["upload_treatment_plan"]));

    upload_plan(&app, &id, &["plan.pdf"]).await;
    let (_, actions) = send(&app, test::TestRequest::get().uri(&uri)).await;
    assert_eq!(
        actions["allowedActions"],
        json!(["approve", "reject", "request_revision"])
    );

    patch(&app, &id, "approve", json!({ "approvedBy": "Dr. Smith" })).await;
    let (_, actions) = send(&app, test::TestRequest::get().uri(&uri)).await;
    assert_eq!(actions["status"], "approved");
    assert_eq!(actions["allowedActions"], json!([]));

    let (status, _) = send(
        &app,
        test::TestRequest::get().uri("/api/v1/cases/CP-1/actions"),
    )
    .await;
    assert_eq!(status, 404);
}
