//! Storage contract for document requests.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use thiserror::Error;
use uuid::Uuid;

use super::model::{DocumentRequest, RequestStatus};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("request store unavailable: {0}")]
    Unavailable(String),
    #[error("stored request is malformed: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait RequestRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<DocumentRequest>, RepositoryError>;

    async fn list_all(&self) -> Result<Vec<DocumentRequest>, RepositoryError>;

    async fn list_by_student(&self, student_id: Uuid)
        -> Result<Vec<DocumentRequest>, RepositoryError>;

    async fn insert(&self, request: &DocumentRequest) -> Result<(), RepositoryError>;

    /// Overwrite the stored copy if its status is still `expected`. Returns
    /// false when the request is gone or has moved on.
    async fn update(
        &self,
        request: &DocumentRequest,
        expected: RequestStatus,
    ) -> Result<bool, RepositoryError>;

    /// Delete the request if its status is still `expected`.
    async fn delete(&self, id: Uuid, expected: RequestStatus) -> Result<bool, RepositoryError>;
}

/// In-process repository, used by tests and local demos.
#[derive(Default)]
pub struct InMemoryRequestRepository {
    requests: RwLock<HashMap<Uuid, DocumentRequest>>,
}

impl InMemoryRequestRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_requests(requests: impl IntoIterator<Item = DocumentRequest>) -> Self {
        let repo = Self::new();
        {
            let mut map = repo.requests.write();
            for request in requests {
                map.insert(request.id, request);
            }
        }
        repo
    }
}

fn newest_first(mut requests: Vec<DocumentRequest>) -> Vec<DocumentRequest> {
    requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    requests
}

#[async_trait]
impl RequestRepository for InMemoryRequestRepository {
    async fn get(&self, id: Uuid) -> Result<Option<DocumentRequest>, RepositoryError> {
        Ok(self.requests.read().get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<DocumentRequest>, RepositoryError> {
        let all = self.requests.read().values().cloned().collect();
        Ok(newest_first(all))
    }

    async fn list_by_student(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<DocumentRequest>, RepositoryError> {
        let owned = self
            .requests
            .read()
            .values()
            .filter(|r| r.student_id == student_id)
            .cloned()
            .collect();
        Ok(newest_first(owned))
    }

    async fn insert(&self, request: &DocumentRequest) -> Result<(), RepositoryError> {
        self.requests.write().insert(request.id, request.clone());
        Ok(())
    }

    async fn update(
        &self,
        request: &DocumentRequest,
        expected: RequestStatus,
    ) -> Result<bool, RepositoryError> {
        let mut map = self.requests.write();
        match map.get_mut(&request.id) {
            Some(existing) if existing.status == expected => {
                *existing = request.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid, expected: RequestStatus) -> Result<bool, RepositoryError> {
        let mut map = self.requests.write();
        if map.get(&id).is_some_and(|r| r.status == expected) {
            map.remove(&id);
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::DocumentType;
    use crate::requests::model::InitiatedBy;

    fn sample(student_id: Uuid) -> DocumentRequest {
        DocumentRequest::new(
            student_id,
            DocumentType::GradeSlip,
            "Scholarship".to_string(),
            InitiatedBy::Student,
        )
    }

    #[tokio::test]
    async fn test_insert_get_update_delete() {
        let repo = InMemoryRequestRepository::new();
        let mut request = sample(Uuid::new_v4());

        repo.insert(&request).await.unwrap();
        assert_eq!(repo.get(request.id).await.unwrap(), Some(request.clone()));

        request.purpose = "Employment".to_string();
        assert!(repo.update(&request, RequestStatus::Pending).await.unwrap());
        assert_eq!(repo.get(request.id).await.unwrap().unwrap().purpose, "Employment");

        assert!(repo.delete(request.id, RequestStatus::Pending).await.unwrap());
        assert!(!repo.delete(request.id, RequestStatus::Pending).await.unwrap());
        assert!(repo.get(request.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_returns_false() {
        let repo = InMemoryRequestRepository::new();
        assert!(!repo
            .update(&sample(Uuid::new_v4()), RequestStatus::Pending)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_writes_refused_once_status_moved() {
        let mut request = sample(Uuid::new_v4());
        request.status = RequestStatus::PaymentApproved;
        let repo = InMemoryRequestRepository::with_requests(vec![request.clone()]);

        let mut stale = request.clone();
        stale.status = RequestStatus::Rejected;
        assert!(!repo.update(&stale, RequestStatus::PaymentRequired).await.unwrap());
        assert!(!repo.delete(request.id, RequestStatus::Pending).await.unwrap());

        let stored = repo.get(request.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RequestStatus::PaymentApproved);
    }

    #[tokio::test]
    async fn test_list_by_student_filters() {
        let student = Uuid::new_v4();
        let repo = InMemoryRequestRepository::with_requests(vec![
            sample(student),
            sample(student),
            sample(Uuid::new_v4()),
        ]);

        assert_eq!(repo.list_by_student(student).await.unwrap().len(), 2);
        assert_eq!(repo.list_all().await.unwrap().len(), 3);
    }
}
