mod common;

use actix_web::http::StatusCode;
use actix_web::{test, App};
use serde_json::{json, Value};
use uuid::Uuid;

use common::{bearer, registrar_auth, request_at, test_context};
use registrar_portal_server::configure_api;
use registrar_portal_server::documents::DocumentType;
use registrar_portal_server::requests::{DocumentRequest, RequestEventKind, RequestStatus};
use registrar_portal_server::session::Role;
use registrar_portal_server::ErrorResponse;

#[actix_web::test]
async fn test_requests_need_a_bearer_token() {
    let ctx = test_context(vec![]);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_api)).await;

    let req = test::TestRequest::get().uri("/api/requests").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "Unauthorized");
}

#[actix_web::test]
async fn test_document_types_are_listed() {
    let ctx = test_context(vec![]);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_api)).await;

    let req = test::TestRequest::get().uri("/api/document-types").to_request();
    let body: Vec<Value> = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body.len(), DocumentType::known().len());
    let tor = body.iter().find(|t| t["code"] == "TOR").expect("TOR listed");
    assert_eq!(tor["page_count"], 2);
}

#[actix_web::test]
async fn test_student_submits_and_staff_drive_to_approved() {
    let ctx = test_context(vec![]);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_api)).await;
    let student_id = Uuid::new_v4();

    let req = test::TestRequest::post()
        .uri("/api/requests")
        .insert_header(bearer(Role::Student, student_id, "Ana Cruz"))
        .set_json(json!({ "document_type": "Grade Slip", "purpose": "Scholarship" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: DocumentRequest = test::read_body_json(resp).await;
    assert_eq!(created.status, RequestStatus::Pending);
    assert_eq!(created.student_id, student_id);

    let req = test::TestRequest::post()
        .uri(&format!("/api/requests/{}/forward", created.id))
        .insert_header(registrar_auth())
        .set_json(json!({ "amount": "150.00" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["request"]["status"], "payment_required");
    assert_eq!(body["previous_status"], "pending");

    let req = test::TestRequest::post()
        .uri(&format!("/api/requests/{}/confirm-payment", created.id))
        .insert_header(bearer(Role::Accounting, Uuid::new_v4(), "Cashier Lim"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["request"]["status"], "payment_approved");

    let req = test::TestRequest::post()
        .uri(&format!("/api/requests/{}/approve", created.id))
        .insert_header(registrar_auth())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["request"]["status"], "approved");
    assert_eq!(body["reprint"], false);
    assert_eq!(body["allowed_actions"], json!(["mark_printed"]));

    assert_eq!(
        ctx.notifier.kinds_for(created.id),
        vec![
            RequestEventKind::Submitted,
            RequestEventKind::ForwardedToAccounting,
            RequestEventKind::PaymentConfirmed,
            RequestEventKind::Approved,
        ]
    );
}

#[actix_web::test]
async fn test_forward_without_amount_is_refused() {
    let request = request_at(Uuid::new_v4(), DocumentType::Diploma, RequestStatus::Pending);
    let ctx = test_context(vec![request.clone()]);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_api)).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/requests/{}/forward", request.id))
        .insert_header(registrar_auth())
        .set_json(json!({ "amount": null }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "ValidationError");

    let stored = ctx.state.lifecycle.get(&staff_session(), request.id).await.unwrap();
    assert_eq!(stored.status, RequestStatus::Pending);
    assert!(stored.amount.is_none());
}

#[actix_web::test]
async fn test_approve_from_pending_is_illegal_transition() {
    let request = request_at(Uuid::new_v4(), DocumentType::GradeSlip, RequestStatus::Pending);
    let ctx = test_context(vec![request.clone()]);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_api)).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/requests/{}/approve", request.id))
        .insert_header(registrar_auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "IllegalTransition");

    let stored = ctx.state.lifecycle.get(&staff_session(), request.id).await.unwrap();
    assert_eq!(stored.status, RequestStatus::Pending);
    assert!(ctx.notifier.kinds_for(request.id).is_empty());
}

#[actix_web::test]
async fn test_cancel_after_payment_approved_is_refused() {
    let student_id = Uuid::new_v4();
    let request = request_at(student_id, DocumentType::Diploma, RequestStatus::PaymentApproved);
    let ctx = test_context(vec![request.clone()]);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_api)).await;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/requests/{}", request.id))
        .insert_header(bearer(Role::Student, student_id, "Ana Cruz"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "CancellationRefused");
    assert!(body.message.contains("payment has already been approved"));

    let stored = ctx.state.lifecycle.get(&staff_session(), request.id).await.unwrap();
    assert_eq!(stored.status, RequestStatus::PaymentApproved);
}

#[actix_web::test]
async fn test_cancel_pending_removes_request() {
    let student_id = Uuid::new_v4();
    let request = request_at(student_id, DocumentType::Diploma, RequestStatus::Pending);
    let ctx = test_context(vec![request.clone()]);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_api)).await;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/requests/{}", request.id))
        .insert_header(bearer(Role::Student, student_id, "Ana Cruz"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/requests/{}", request.id))
        .insert_header(registrar_auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_staff_views_partition_by_status() {
    let student_id = Uuid::new_v4();
    let pending = request_at(student_id, DocumentType::GradeSlip, RequestStatus::Pending);
    let approved = request_at(student_id, DocumentType::Diploma, RequestStatus::Approved);
    let ready = request_at(student_id, DocumentType::TranscriptOfRecords, RequestStatus::ReadyForPickup);
    let legacy = request_at(student_id, DocumentType::GoodMoral, RequestStatus::Printed);
    let rejected = request_at(student_id, DocumentType::Form137, RequestStatus::Rejected);
    let ctx = test_context(vec![
        pending.clone(),
        approved.clone(),
        ready.clone(),
        legacy.clone(),
        rejected.clone(),
    ]);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_api)).await;

    let ids = |requests: Vec<DocumentRequest>| {
        let mut ids: Vec<Uuid> = requests.into_iter().map(|r| r.id).collect();
        ids.sort();
        ids
    };
    let sorted = |mut v: Vec<Uuid>| {
        v.sort();
        v
    };

    let req = test::TestRequest::get()
        .uri("/api/requests")
        .insert_header(registrar_auth())
        .to_request();
    let active: Vec<DocumentRequest> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(ids(active), sorted(vec![pending.id, approved.id]));

    let req = test::TestRequest::get()
        .uri("/api/requests?view=archive")
        .insert_header(registrar_auth())
        .to_request();
    let archive: Vec<DocumentRequest> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(ids(archive), sorted(vec![ready.id, legacy.id]));

    let req = test::TestRequest::get()
        .uri(&format!("/api/students/{}/requests", student_id))
        .insert_header(bearer(Role::Student, student_id, "Ana Cruz"))
        .to_request();
    let own: Vec<DocumentRequest> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(own.len(), 5);
    assert!(own.iter().any(|r| r.id == rejected.id));
}

#[actix_web::test]
async fn test_students_cannot_use_staff_views() {
    let ctx = test_context(vec![]);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_api)).await;

    let req = test::TestRequest::get()
        .uri("/api/requests?view=active")
        .insert_header(bearer(Role::Student, Uuid::new_v4(), "Ana Cruz"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_reject_with_remarks_then_claim_is_illegal() {
    let request = request_at(Uuid::new_v4(), DocumentType::Cav, RequestStatus::PaymentRequired);
    let ctx = test_context(vec![request.clone()]);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_api)).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/requests/{}/reject", request.id))
        .insert_header(registrar_auth())
        .set_json(json!({ "remarks": "Blurred ID photo" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["request"]["status"], "rejected");
    assert_eq!(body["request"]["remarks"], "Blurred ID photo");
    assert_eq!(body["allowed_actions"], json!([]));

    let req = test::TestRequest::post()
        .uri(&format!("/api/requests/{}/claim", request.id))
        .insert_header(registrar_auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

fn staff_session() -> registrar_portal_server::session::SessionContext {
    registrar_portal_server::session::SessionContext::new(
        Uuid::new_v4(),
        Role::Registrar,
        "Registrar Reyes",
        "t",
    )
}
