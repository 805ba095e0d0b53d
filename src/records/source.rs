//! Contract for the collaborators that own student records.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use thiserror::Error;
use uuid::Uuid;

use super::model::{BalanceRecord, EnrolledSubjectSet, RegistrationRecord, StudentIdentity};
use crate::session::SessionContext;

#[derive(Debug, Error)]
pub enum RecordSourceError {
    #[error("record not found")]
    NotFound,
    #[error("records service unreachable: {0}")]
    Transport(String),
    #[error("records service rejected the session credential")]
    Unauthorized,
    #[error("records service returned malformed data: {0}")]
    Malformed(String),
}

/// Fetches the four record kinds a document is built from.
///
/// Every call carries the caller's session so remote implementations can
/// forward its credential.
#[async_trait]
pub trait StudentRecordSource: Send + Sync {
    async fn identity(
        &self,
        session: &SessionContext,
        student_id: Uuid,
    ) -> Result<StudentIdentity, RecordSourceError>;

    async fn registration(
        &self,
        session: &SessionContext,
        student_id: Uuid,
    ) -> Result<RegistrationRecord, RecordSourceError>;

    async fn enrolled_subjects(
        &self,
        session: &SessionContext,
        student_id: Uuid,
    ) -> Result<EnrolledSubjectSet, RecordSourceError>;

    async fn balance(
        &self,
        session: &SessionContext,
        student_id: Uuid,
    ) -> Result<BalanceRecord, RecordSourceError>;
}

/// In-memory records, used by tests and demos.
#[derive(Default)]
pub struct InMemoryStudentRecords {
    identities: RwLock<HashMap<Uuid, StudentIdentity>>,
    registrations: RwLock<HashMap<Uuid, RegistrationRecord>>,
    subjects: RwLock<HashMap<Uuid, EnrolledSubjectSet>>,
    balances: RwLock<HashMap<Uuid, BalanceRecord>>,
}

impl InMemoryStudentRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_identity(&self, identity: StudentIdentity) {
        self.identities.write().insert(identity.id, identity);
    }

    pub fn put_registration(&self, registration: RegistrationRecord) {
        self.registrations
            .write()
            .insert(registration.student_id, registration);
    }

    pub fn put_subjects(&self, student_id: Uuid, subjects: EnrolledSubjectSet) {
        self.subjects.write().insert(student_id, subjects);
    }

    pub fn put_balance(&self, balance: BalanceRecord) {
        self.balances.write().insert(balance.student_id, balance);
    }
}

#[async_trait]
impl StudentRecordSource for InMemoryStudentRecords {
    async fn identity(
        &self,
        _session: &SessionContext,
        student_id: Uuid,
    ) -> Result<StudentIdentity, RecordSourceError> {
        self.identities
            .read()
            .get(&student_id)
            .cloned()
            .ok_or(RecordSourceError::NotFound)
    }

    async fn registration(
        &self,
        _session: &SessionContext,
        student_id: Uuid,
    ) -> Result<RegistrationRecord, RecordSourceError> {
        self.registrations
            .read()
            .get(&student_id)
            .cloned()
            .ok_or(RecordSourceError::NotFound)
    }

    async fn enrolled_subjects(
        &self,
        _session: &SessionContext,
        student_id: Uuid,
    ) -> Result<EnrolledSubjectSet, RecordSourceError> {
        self.subjects
            .read()
            .get(&student_id)
            .cloned()
            .ok_or(RecordSourceError::NotFound)
    }

    async fn balance(
        &self,
        _session: &SessionContext,
        student_id: Uuid,
    ) -> Result<BalanceRecord, RecordSourceError> {
        self.balances
            .read()
            .get(&student_id)
            .cloned()
            .ok_or(RecordSourceError::NotFound)
    }
}
