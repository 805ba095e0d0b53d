//! Shared fixtures for the integration tests
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use uuid::Uuid;

use registrar_portal_server::config::AppConfig;
use registrar_portal_server::documents::DocumentType;
use registrar_portal_server::records::model::{
    BalanceRecord, EnrolledSubjectSet, RegistrationRecord, StudentIdentity, SubjectRecord,
};
use registrar_portal_server::records::InMemoryStudentRecords;
use registrar_portal_server::requests::{
    DocumentRequest, InMemoryRequestRepository, InitiatedBy, Notifier, RequestEvent,
    RequestEventKind, RequestStatus,
};
use registrar_portal_server::session::{generate_session_token, Role};
use registrar_portal_server::AppState;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const PUBLIC_BASE_URL: &str = "https://registrar.test";

/// Notifier that keeps every event for later assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<RequestEvent>>,
}

impl RecordingNotifier {
    pub fn kinds_for(&self, request_id: Uuid) -> Vec<RequestEventKind> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.request_id == request_id)
            .map(|e| e.kind)
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, event: RequestEvent) {
        self.events.lock().push(event);
    }
}

pub struct TestContext {
    pub state: web::Data<AppState>,
    pub repo: Arc<InMemoryRequestRepository>,
    pub records: Arc<InMemoryStudentRecords>,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn test_config() -> AppConfig {
    AppConfig {
        jwt_secret: TEST_SECRET.to_string(),
        public_base_url: PUBLIC_BASE_URL.to_string(),
        approval_session_idle: Duration::from_secs(300),
        ..AppConfig::default()
    }
}

pub fn test_context(requests: Vec<DocumentRequest>) -> TestContext {
    let repo = Arc::new(InMemoryRequestRepository::with_requests(requests));
    let records = Arc::new(InMemoryStudentRecords::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let state = AppState::from_parts(test_config(), repo.clone(), records.clone(), notifier.clone())
        .expect("Failed to build test AppState");
    TestContext {
        state: web::Data::new(state),
        repo,
        records,
        notifier,
    }
}

pub fn bearer(role: Role, user_id: Uuid, name: &str) -> (&'static str, String) {
    let token = generate_session_token(TEST_SECRET, user_id, role, name)
        .expect("Failed to generate session token");
    ("Authorization", format!("Bearer {}", token))
}

pub fn registrar_auth() -> (&'static str, String) {
    bearer(Role::Registrar, Uuid::new_v4(), "Registrar Reyes")
}

pub fn request_at(
    student_id: Uuid,
    document_type: DocumentType,
    status: RequestStatus,
) -> DocumentRequest {
    let mut request = DocumentRequest::new(
        student_id,
        document_type,
        "Scholarship application".to_string(),
        InitiatedBy::Student,
    );
    request.status = status;
    if status.requires_amount() {
        request.amount = Some(Decimal::new(15000, 2));
    }
    request
}

pub fn subject(code: &str, title: &str, units: u32) -> SubjectRecord {
    SubjectRecord {
        code: code.to_string(),
        title: title.to_string(),
        units,
        ..Default::default()
    }
}

/// A third-year BSIT student with a 3-unit and a 5-unit subject.
pub fn seed_student(records: &InMemoryStudentRecords, student_id: Uuid) {
    records.put_identity(StudentIdentity {
        id: student_id,
        id_number: Some("2022-01234".to_string()),
        first_name: Some("Ana".to_string()),
        middle_name: Some("Santos".to_string()),
        last_name: Some("Cruz".to_string()),
        gender: Some("Female".to_string()),
        email: Some("ana.cruz@student.test".to_string()),
        course: Some("BSIT".to_string()),
        ..Default::default()
    });
    records.put_registration(RegistrationRecord {
        student_id,
        civil_status: Some("single".to_string()),
        course: Some("Bachelor of Science in Information Technology".to_string()),
        year_level: Some("3rd Year".to_string()),
        semester: Some("1st Semester".to_string()),
        school_year: Some("2025-2026".to_string()),
        ..Default::default()
    });
    records.put_subjects(
        student_id,
        EnrolledSubjectSet {
            year_level: Some("3rd Year".to_string()),
            semester: Some("1st Semester".to_string()),
            subjects: vec![
                subject("IT301", "Information Assurance and Security", 3),
                subject("IT302", "Integrative Programming", 5),
            ],
        },
    );
    records.put_balance(BalanceRecord {
        student_id,
        balance: Decimal::new(125000, 2),
    });
}
