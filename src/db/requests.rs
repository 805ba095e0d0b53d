//! Postgres-backed request repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::documents::DocumentType;
use crate::requests::{DocumentRequest, RepositoryError, RequestRepository, RequestStatus};

const REQUEST_COLUMNS: &str = "id, student_id, document_type, purpose, amount, status, \
     initiated_by, remarks, requirements, created_at, updated_at, printed_at";

#[derive(Debug, FromRow)]
struct RequestRow {
    id: Uuid,
    student_id: Uuid,
    document_type: String,
    purpose: String,
    amount: Option<Decimal>,
    status: String,
    initiated_by: String,
    remarks: Option<String>,
    requirements: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    printed_at: Option<DateTime<Utc>>,
}

impl RequestRow {
    fn into_request(self) -> Result<DocumentRequest, RepositoryError> {
        Ok(DocumentRequest {
            id: self.id,
            student_id: self.student_id,
            document_type: DocumentType::parse(&self.document_type),
            purpose: self.purpose,
            amount: self.amount,
            status: self.status.parse().map_err(RepositoryError::Corrupt)?,
            initiated_by: self.initiated_by.parse().map_err(RepositoryError::Corrupt)?,
            remarks: self.remarks,
            requirements: self.requirements,
            created_at: self.created_at,
            updated_at: self.updated_at,
            printed_at: self.printed_at,
        })
    }
}

fn unavailable(e: sqlx::Error) -> RepositoryError {
    log::error!("document_requests query failed: {}", e);
    RepositoryError::Unavailable(e.to_string())
}

fn into_requests(rows: Vec<RequestRow>) -> Result<Vec<DocumentRequest>, RepositoryError> {
    rows.into_iter().map(RequestRow::into_request).collect()
}

#[derive(Clone)]
pub struct PgRequestRepository {
    pool: PgPool,
}

impl PgRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RequestRepository for PgRequestRepository {
    async fn get(&self, id: Uuid) -> Result<Option<DocumentRequest>, RepositoryError> {
        let sql = format!("SELECT {} FROM document_requests WHERE id = $1", REQUEST_COLUMNS);
        let row = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;
        row.map(RequestRow::into_request).transpose()
    }

    async fn list_all(&self) -> Result<Vec<DocumentRequest>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM document_requests ORDER BY created_at DESC",
            REQUEST_COLUMNS
        );
        let rows = sqlx::query_as::<_, RequestRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;
        into_requests(rows)
    }

    async fn list_by_student(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<DocumentRequest>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM document_requests WHERE student_id = $1 ORDER BY created_at DESC",
            REQUEST_COLUMNS
        );
        let rows = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(student_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;
        into_requests(rows)
    }

    async fn insert(&self, request: &DocumentRequest) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO document_requests
                (id, student_id, document_type, purpose, amount, status, initiated_by,
                 remarks, requirements, created_at, updated_at, printed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(request.id)
        .bind(request.student_id)
        .bind(request.document_type.code())
        .bind(&request.purpose)
        .bind(request.amount)
        .bind(request.status.as_str())
        .bind(request.initiated_by.as_str())
        .bind(&request.remarks)
        .bind(&request.requirements)
        .bind(request.created_at)
        .bind(request.updated_at)
        .bind(request.printed_at)
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;
        Ok(())
    }

    async fn update(
        &self,
        request: &DocumentRequest,
        expected: RequestStatus,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE document_requests
            SET document_type = $2, purpose = $3, amount = $4, status = $5, remarks = $6,
                requirements = $7, updated_at = $8, printed_at = $9
            WHERE id = $1 AND status = $10
            "#,
        )
        .bind(request.id)
        .bind(request.document_type.code())
        .bind(&request.purpose)
        .bind(request.amount)
        .bind(request.status.as_str())
        .bind(&request.remarks)
        .bind(&request.requirements)
        .bind(request.updated_at)
        .bind(request.printed_at)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid, expected: RequestStatus) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM document_requests WHERE id = $1 AND status = $2")
            .bind(id)
            .bind(expected.as_str())
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(result.rows_affected() > 0)
    }
}
