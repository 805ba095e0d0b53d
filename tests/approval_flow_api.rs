mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use common::{
    bearer, registrar_auth, request_at, seed_student, test_config, test_context, RecordingNotifier,
    PUBLIC_BASE_URL,
};
use registrar_portal_server::configure_api;
use registrar_portal_server::documents::DocumentType;
use registrar_portal_server::records::model::{
    BalanceRecord, EnrolledSubjectSet, RegistrationRecord, StudentIdentity,
};
use registrar_portal_server::records::{
    InMemoryStudentRecords, RecordSourceError, StudentRecordSource,
};
use registrar_portal_server::requests::InMemoryRequestRepository;
use registrar_portal_server::AppState;
use registrar_portal_server::requests::{RequestEventKind, RequestStatus};
use registrar_portal_server::session::{Role, SessionContext};
use registrar_portal_server::ErrorResponse;

/// Character offset of `needle` within `text`, as selections count characters.
fn char_offset(text: &str, needle: &str) -> usize {
    let byte = text.find(needle).expect("needle present in page text");
    text[..byte].chars().count()
}

fn selection_of(text: &str, needle: &str) -> Value {
    let start = char_offset(text, needle);
    json!({ "start": start, "end": start + needle.chars().count() })
}

/// Records whose registration service can be switched off.
struct FlakyRegistration {
    inner: InMemoryStudentRecords,
    down: AtomicBool,
}

#[async_trait]
impl StudentRecordSource for FlakyRegistration {
    async fn identity(
        &self,
        session: &SessionContext,
        student_id: Uuid,
    ) -> Result<StudentIdentity, RecordSourceError> {
        self.inner.identity(session, student_id).await
    }

    async fn registration(
        &self,
        session: &SessionContext,
        student_id: Uuid,
    ) -> Result<RegistrationRecord, RecordSourceError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(RecordSourceError::Transport("connection refused".to_string()));
        }
        self.inner.registration(session, student_id).await
    }

    async fn enrolled_subjects(
        &self,
        session: &SessionContext,
        student_id: Uuid,
    ) -> Result<EnrolledSubjectSet, RecordSourceError> {
        self.inner.enrolled_subjects(session, student_id).await
    }

    async fn balance(
        &self,
        session: &SessionContext,
        student_id: Uuid,
    ) -> Result<BalanceRecord, RecordSourceError> {
        self.inner.balance(session, student_id).await
    }
}

fn staff_session() -> SessionContext {
    SessionContext::new(Uuid::new_v4(), Role::Registrar, "Registrar Reyes", "t")
}

#[actix_web::test]
async fn test_grade_slip_shows_merged_record_and_unit_split() {
    let student_id = Uuid::new_v4();
    let request = request_at(student_id, DocumentType::GradeSlip, RequestStatus::PaymentApproved);
    let ctx = test_context(vec![request.clone()]);
    seed_student(&ctx.records, student_id);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_api)).await;
    let auth = registrar_auth();

    let req = test::TestRequest::post()
        .uri(&format!("/api/requests/{}/approve", request.id))
        .insert_header(auth.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri(&format!("/api/approvals/{}", request.id))
        .insert_header(auth)
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(view["page"], 1);
    assert_eq!(view["page_count"], 1);
    assert_eq!(view["source"], "generated");
    let markup = view["markup"].as_str().unwrap();
    assert!(markup.contains("Cruz, Ana Santos"));
    assert!(markup.contains("Bachelor of Science in Information Technology"));
    assert!(markup.contains("2022-01234"));
    assert!(markup.contains(r#"<td class="col-units lec-total">6</td>"#));
    assert!(markup.contains(r#"<td class="col-units lab-total">2</td>"#));
    assert!(markup.contains(r#"<td class="col-units total-units">8</td>"#));
}

#[actix_web::test]
async fn test_pending_request_is_not_printable() {
    let student_id = Uuid::new_v4();
    let request = request_at(student_id, DocumentType::GradeSlip, RequestStatus::Pending);
    let ctx = test_context(vec![request.clone()]);
    seed_student(&ctx.records, student_id);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_api)).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/approvals/{}", request.id))
        .insert_header(registrar_auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "NotPrintable");
    assert!(matches!(
        ctx.state.approvals.check_available(&staff_session(), request.id).await,
        Ok(None)
    ));
}

#[actix_web::test]
async fn test_students_cannot_open_approvals() {
    let student_id = Uuid::new_v4();
    let request = request_at(student_id, DocumentType::GradeSlip, RequestStatus::Approved);
    let ctx = test_context(vec![request.clone()]);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_api)).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/approvals/{}", request.id))
        .insert_header(bearer(Role::Student, student_id, "Ana Cruz"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_second_registrar_gets_session_conflict() {
    let student_id = Uuid::new_v4();
    let request = request_at(student_id, DocumentType::Diploma, RequestStatus::Approved);
    let ctx = test_context(vec![request.clone()]);
    seed_student(&ctx.records, student_id);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_api)).await;
    let first = bearer(Role::Registrar, Uuid::new_v4(), "Registrar Reyes");
    let second = bearer(Role::Registrar, Uuid::new_v4(), "Registrar Santos");

    let req = test::TestRequest::post()
        .uri(&format!("/api/approvals/{}", request.id))
        .insert_header(first.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri(&format!("/api/approvals/{}", request.id))
        .insert_header(second.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "SessionConflict");
    assert!(body.message.contains("Registrar Reyes"));

    let req = test::TestRequest::delete()
        .uri(&format!("/api/approvals/{}", request.id))
        .insert_header(first)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::post()
        .uri(&format!("/api/approvals/{}", request.id))
        .insert_header(second)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_saved_transcript_page_survives_page_switch() {
    let student_id = Uuid::new_v4();
    let request = request_at(
        student_id,
        DocumentType::TranscriptOfRecords,
        RequestStatus::Approved,
    );
    let ctx = test_context(vec![request.clone()]);
    seed_student(&ctx.records, student_id);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_api)).await;
    let auth = registrar_auth();
    let base = format!("/api/approvals/{}", request.id);

    let req = test::TestRequest::post().uri(&base).insert_header(auth.clone()).to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["page_count"], 2);

    let req = test::TestRequest::post()
        .uri(&format!("{}/edit", base))
        .insert_header(auth.clone())
        .to_request();
    let edit: Value = test::call_and_read_body_json(&app, req).await;
    let text = edit["text"].as_str().unwrap();

    let req = test::TestRequest::post()
        .uri(&format!("{}/edit/text", base))
        .insert_header(auth.clone())
        .set_json(json!({
            "selection": selection_of(text, "Cruz, Ana Santos"),
            "text": "CRUZ, ANA S."
        }))
        .to_request();
    let edit: Value = test::call_and_read_body_json(&app, req).await;
    assert!(edit["text"].as_str().unwrap().contains("CRUZ, ANA S."));

    // Leaving the page with unsaved edits is refused.
    let req = test::TestRequest::get()
        .uri(&format!("{}/pages/2", base))
        .insert_header(auth.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri(&format!("{}/edit/save", base))
        .insert_header(auth.clone())
        .to_request();
    let saved: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(saved["source"], "snapshot");

    let req = test::TestRequest::get()
        .uri(&format!("{}/pages/2", base))
        .insert_header(auth.clone())
        .to_request();
    let page_two: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page_two["page"], 2);
    assert_eq!(page_two["source"], "generated");
    assert!(page_two["markup"].as_str().unwrap().contains("Curriculum"));

    let req = test::TestRequest::get()
        .uri(&format!("{}/pages/1", base))
        .insert_header(auth.clone())
        .to_request();
    let page_one: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page_one["source"], "snapshot");
    assert_eq!(page_one["markup"], saved["markup"]);
    assert!(page_one["markup"].as_str().unwrap().contains("CRUZ, ANA S."));

    // Out-of-range pages clamp to the last one.
    let req = test::TestRequest::get()
        .uri(&format!("{}/pages/9", base))
        .insert_header(auth.clone())
        .to_request();
    let clamped: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(clamped["page"], 2);

    let req = test::TestRequest::get()
        .uri(&format!("{}/pages/1", base))
        .insert_header(auth.clone())
        .to_request();
    let _: Value = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri(&format!("{}/regenerate", base))
        .insert_header(auth)
        .to_request();
    let regenerated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(regenerated["source"], "generated");
    assert!(regenerated["markup"].as_str().unwrap().contains("Cruz, Ana Santos"));
}

#[actix_web::test]
async fn test_bold_edit_reaches_print_and_reprint_keeps_status() {
    let student_id = Uuid::new_v4();
    let request = request_at(student_id, DocumentType::GradeSlip, RequestStatus::Approved);
    let ctx = test_context(vec![request.clone()]);
    seed_student(&ctx.records, student_id);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_api)).await;
    let auth = registrar_auth();
    let base = format!("/api/approvals/{}", request.id);

    let req = test::TestRequest::post().uri(&base).insert_header(auth.clone()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri(&format!("{}/edit", base))
        .insert_header(auth.clone())
        .to_request();
    let edit: Value = test::call_and_read_body_json(&app, req).await;
    let text = edit["text"].as_str().unwrap();
    let selection = selection_of(text, "Integrative Programming");

    let req = test::TestRequest::post()
        .uri(&format!("{}/edit/format", base))
        .insert_header(auth.clone())
        .set_json(json!({ "style": "bold", "selection": selection }))
        .to_request();
    let formatted: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(formatted["selection"], selection);
    assert!(formatted["markup"]
        .as_str()
        .unwrap()
        .contains("<strong>Integrative Programming</strong>"));

    let req = test::TestRequest::post()
        .uri(&format!("{}/edit/save", base))
        .insert_header(auth.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri(&format!("{}/print", base))
        .insert_header(auth.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("X-Print-Kind").unwrap(), "first");
    let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<strong>Integrative Programming</strong>"));
    assert!(html.contains(&format!("{}/assets/letterhead.png", PUBLIC_BASE_URL)));
    assert!(!html.contains(r#"src="assets/"#));

    let after_first = ctx.state.lifecycle.get(&staff_session(), request.id).await.unwrap();
    assert_eq!(after_first.status, RequestStatus::ReadyForPickup);
    let printed_at = after_first.printed_at.expect("printed_at set on first print");

    let req = test::TestRequest::post()
        .uri(&format!("{}/print", base))
        .insert_header(auth)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("X-Print-Kind").unwrap(), "reprint");

    let after_second = ctx.state.lifecycle.get(&staff_session(), request.id).await.unwrap();
    assert_eq!(after_second.status, RequestStatus::ReadyForPickup);
    assert_eq!(after_second.printed_at, Some(printed_at));

    let ready_events = ctx
        .notifier
        .kinds_for(request.id)
        .into_iter()
        .filter(|kind| *kind == RequestEventKind::ReadyForPickup)
        .count();
    assert_eq!(ready_events, 1);
}

#[actix_web::test]
async fn test_format_needs_exactly_one_command() {
    let student_id = Uuid::new_v4();
    let request = request_at(student_id, DocumentType::GradeSlip, RequestStatus::Approved);
    let ctx = test_context(vec![request.clone()]);
    seed_student(&ctx.records, student_id);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_api)).await;
    let auth = registrar_auth();
    let base = format!("/api/approvals/{}", request.id);

    let req = test::TestRequest::post().uri(&base).insert_header(auth.clone()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Formatting outside edit mode.
    let req = test::TestRequest::post()
        .uri(&format!("{}/edit/format", base))
        .insert_header(auth.clone())
        .set_json(json!({ "style": "italic", "selection": { "start": 0, "end": 3 } }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri(&format!("{}/edit/format", base))
        .insert_header(auth)
        .set_json(json!({
            "style": "bold",
            "alignment": "center",
            "selection": { "start": 0, "end": 3 }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_unreachable_records_are_reported_and_refetched() {
    let student_id = Uuid::new_v4();
    let request = request_at(student_id, DocumentType::GradeSlip, RequestStatus::Approved);
    let inner = InMemoryStudentRecords::new();
    seed_student(&inner, student_id);
    let records = Arc::new(FlakyRegistration {
        inner,
        down: AtomicBool::new(true),
    });
    let state = AppState::from_parts(
        test_config(),
        Arc::new(InMemoryRequestRepository::with_requests(vec![request.clone()])),
        records.clone(),
        Arc::new(RecordingNotifier::default()),
    )
    .unwrap();
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_api)).await;
    let auth = bearer(Role::Registrar, Uuid::new_v4(), "Registrar Reyes");

    let req = test::TestRequest::post()
        .uri(&format!("/api/approvals/{}", request.id))
        .insert_header(auth.clone())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        body["gaps"],
        json!([{ "record": "registration", "reason": "unavailable" }])
    );
    assert!(body["markup"].as_str().unwrap().contains("N/A"));

    records.down.store(false, Ordering::SeqCst);

    let req = test::TestRequest::post()
        .uri(&format!("/api/approvals/{}", request.id))
        .insert_header(auth)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["gaps"], json!([]));
    assert!(body["markup"].as_str().unwrap().contains("2025-2026"));
}
