//! Student records served by the school's REST backend.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::model::{BalanceRecord, EnrolledSubjectSet, RegistrationRecord, StudentIdentity};
use super::source::{RecordSourceError, StudentRecordSource};
use crate::session::SessionContext;

pub struct HttpStudentRecords {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStudentRecords {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, student_id: Uuid, resource: &str) -> String {
        format!("{}/students/{}/{}", self.base_url, student_id, resource)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        session: &SessionContext,
        student_id: Uuid,
        resource: &str,
    ) -> Result<T, RecordSourceError> {
        let url = self.url(student_id, resource);
        let response = self
            .client
            .get(&url)
            .bearer_auth(session.credential())
            .send()
            .await
            .map_err(|e| {
                log::error!("GET {} failed: {}", url, e);
                RecordSourceError::Transport(e.to_string())
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(RecordSourceError::NotFound),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(RecordSourceError::Unauthorized)
            }
            status if !status.is_success() => {
                log::error!("GET {} returned {}", url, status);
                Err(RecordSourceError::Transport(format!(
                    "upstream responded with {}",
                    status
                )))
            }
            _ => response
                .json::<T>()
                .await
                .map_err(|e| RecordSourceError::Malformed(e.to_string())),
        }
    }
}

#[async_trait]
impl StudentRecordSource for HttpStudentRecords {
    async fn identity(
        &self,
        session: &SessionContext,
        student_id: Uuid,
    ) -> Result<StudentIdentity, RecordSourceError> {
        let mut identity: StudentIdentity = self.fetch(session, student_id, "identity").await?;
        identity.id = student_id;
        Ok(identity)
    }

    async fn registration(
        &self,
        session: &SessionContext,
        student_id: Uuid,
    ) -> Result<RegistrationRecord, RecordSourceError> {
        let mut registration: RegistrationRecord =
            self.fetch(session, student_id, "registration").await?;
        registration.student_id = student_id;
        Ok(registration)
    }

    async fn enrolled_subjects(
        &self,
        session: &SessionContext,
        student_id: Uuid,
    ) -> Result<EnrolledSubjectSet, RecordSourceError> {
        self.fetch(session, student_id, "subjects").await
    }

    async fn balance(
        &self,
        session: &SessionContext,
        student_id: Uuid,
    ) -> Result<BalanceRecord, RecordSourceError> {
        // The balance endpoint usually answers with just `{ "balance": ... }`.
        let mut balance: BalanceRecord = self.fetch(session, student_id, "balance").await?;
        balance.student_id = student_id;
        Ok(balance)
    }
}
