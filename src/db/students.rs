//! Student records read straight from Postgres when no records service is configured.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::records::model::{
    BalanceRecord, EnrolledSubjectSet, RegistrationRecord, StudentIdentity, SubjectRecord,
};
use crate::records::{RecordSourceError, StudentRecordSource};
use crate::session::SessionContext;

#[derive(Debug, FromRow)]
struct IdentityRow {
    id: Uuid,
    id_number: Option<String>,
    first_name: Option<String>,
    middle_name: Option<String>,
    last_name: Option<String>,
    suffix: Option<String>,
    gender: Option<String>,
    email: Option<String>,
    course: Option<String>,
}

#[derive(Debug, FromRow)]
struct EnrollmentRow {
    id: Uuid,
    year_level: Option<String>,
    semester: Option<String>,
}

#[derive(Debug, FromRow)]
struct SubjectRow {
    code: String,
    title: String,
    units: i32,
    grade: Option<String>,
    schedule: Option<String>,
    instructor: Option<String>,
}

impl SubjectRow {
    fn into_subject(self) -> Result<SubjectRecord, RecordSourceError> {
        let units = u32::try_from(self.units).map_err(|_| {
            RecordSourceError::Malformed(format!("subject {} has {} units", self.code, self.units))
        })?;
        Ok(SubjectRecord {
            code: self.code,
            title: self.title,
            units,
            grade: self.grade,
            schedule: self.schedule,
            instructor: self.instructor,
        })
    }
}

fn query_failed(e: sqlx::Error) -> RecordSourceError {
    match e {
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            RecordSourceError::Malformed(e.to_string())
        }
        other => {
            log::error!("student records query failed: {}", other);
            RecordSourceError::Transport(other.to_string())
        }
    }
}

pub struct PgStudentRecords {
    pool: PgPool,
}

impl PgStudentRecords {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudentRecordSource for PgStudentRecords {
    async fn identity(
        &self,
        _session: &SessionContext,
        student_id: Uuid,
    ) -> Result<StudentIdentity, RecordSourceError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
            SELECT id, id_number, first_name, middle_name, last_name, suffix, gender, email, course
            FROM students
            WHERE id = $1
            "#,
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed)?
        .ok_or(RecordSourceError::NotFound)?;

        Ok(StudentIdentity {
            id: row.id,
            id_number: row.id_number,
            first_name: row.first_name,
            middle_name: row.middle_name,
            last_name: row.last_name,
            suffix: row.suffix,
            gender: row.gender,
            email: row.email,
            course: row.course,
        })
    }

    async fn registration(
        &self,
        _session: &SessionContext,
        student_id: Uuid,
    ) -> Result<RegistrationRecord, RecordSourceError> {
        let (Json(mut record),) = sqlx::query_as::<_, (Json<RegistrationRecord>,)>(
            "SELECT data FROM student_registrations WHERE student_id = $1",
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed)?
        .ok_or(RecordSourceError::NotFound)?;

        record.student_id = student_id;
        Ok(record)
    }

    /// Subjects of the most recent enrollment.
    async fn enrolled_subjects(
        &self,
        _session: &SessionContext,
        student_id: Uuid,
    ) -> Result<EnrolledSubjectSet, RecordSourceError> {
        let enrollment = sqlx::query_as::<_, EnrollmentRow>(
            r#"
            SELECT id, year_level, semester
            FROM student_enrollments
            WHERE student_id = $1
            ORDER BY enrolled_at DESC
            LIMIT 1
            "#,
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed)?
        .ok_or(RecordSourceError::NotFound)?;

        let rows = sqlx::query_as::<_, SubjectRow>(
            r#"
            SELECT code, title, units, grade, schedule, instructor
            FROM enrolled_subjects
            WHERE enrollment_id = $1
            ORDER BY position
            "#,
        )
        .bind(enrollment.id)
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(EnrolledSubjectSet {
            year_level: enrollment.year_level,
            semester: enrollment.semester,
            subjects: rows
                .into_iter()
                .map(SubjectRow::into_subject)
                .collect::<Result<_, _>>()?,
        })
    }

    async fn balance(
        &self,
        _session: &SessionContext,
        student_id: Uuid,
    ) -> Result<BalanceRecord, RecordSourceError> {
        let balance: Decimal =
            sqlx::query_scalar("SELECT balance FROM student_balances WHERE student_id = $1")
                .bind(student_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(query_failed)?
                .ok_or(RecordSourceError::NotFound)?;

        Ok(BalanceRecord {
            student_id,
            balance,
        })
    }
}
