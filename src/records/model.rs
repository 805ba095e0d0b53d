//! Records as returned by the student-information collaborators.
//!
//! Every field a collaborator may omit is optional; the aggregator decides
//! what to print in its place.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Core identity (account) record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentIdentity {
    #[serde(default, alias = "studentId", alias = "student_id")]
    pub id: Uuid,
    #[serde(alias = "id_number")]
    pub id_number: Option<String>,
    #[serde(alias = "first_name")]
    pub first_name: Option<String>,
    #[serde(alias = "middle_name")]
    pub middle_name: Option<String>,
    #[serde(alias = "last_name")]
    pub last_name: Option<String>,
    pub suffix: Option<String>,
    pub gender: Option<String>,
    pub email: Option<String>,
    pub course: Option<String>,
}

/// Schooling history line (elementary, secondary, previous college).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolHistory {
    pub school: Option<String>,
    pub address: Option<String>,
    #[serde(alias = "year_graduated")]
    pub year_graduated: Option<String>,
}

/// Registration record. Once it exists it is the authoritative source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRecord {
    #[serde(default, alias = "student_id")]
    pub student_id: Uuid,
    #[serde(alias = "first_name")]
    pub first_name: Option<String>,
    #[serde(alias = "middle_name")]
    pub middle_name: Option<String>,
    #[serde(alias = "last_name")]
    pub last_name: Option<String>,
    pub suffix: Option<String>,
    pub gender: Option<String>,
    #[serde(alias = "civil_status")]
    pub civil_status: Option<String>,
    #[serde(alias = "birth_date")]
    pub birth_date: Option<NaiveDate>,
    #[serde(alias = "birth_place")]
    pub birth_place: Option<String>,
    pub nationality: Option<String>,
    pub religion: Option<String>,
    #[serde(alias = "father_name")]
    pub father_name: Option<String>,
    #[serde(alias = "mother_name")]
    pub mother_name: Option<String>,
    #[serde(alias = "guardian_name")]
    pub guardian_name: Option<String>,
    #[serde(alias = "permanent_address")]
    pub permanent_address: Option<String>,
    #[serde(alias = "current_address")]
    pub current_address: Option<String>,
    pub course: Option<String>,
    pub major: Option<String>,
    #[serde(alias = "year_level")]
    pub year_level: Option<String>,
    pub semester: Option<String>,
    #[serde(alias = "school_year")]
    pub school_year: Option<String>,
    #[serde(alias = "admission_date")]
    pub admission_date: Option<NaiveDate>,
    #[serde(alias = "graduation_date")]
    pub graduation_date: Option<NaiveDate>,
    pub honors: Option<String>,
    #[serde(default)]
    pub elementary: SchoolHistory,
    #[serde(default)]
    pub secondary: SchoolHistory,
    #[serde(default, alias = "previous_college")]
    pub previous_college: SchoolHistory,
    pub remarks: Option<String>,
}

/// One enrolled subject. An empty grade is intentional: it is left blank
/// for the registrar to fill in by hand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRecord {
    pub code: String,
    pub title: String,
    pub units: u32,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub instructor: Option<String>,
}

/// Subjects for one (year level, semester) pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrolledSubjectSet {
    #[serde(alias = "year_level")]
    pub year_level: Option<String>,
    pub semester: Option<String>,
    #[serde(default)]
    pub subjects: Vec<SubjectRecord>,
}

impl EnrolledSubjectSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sum of listed unit values; never taken from upstream totals.
    pub fn total_units(&self) -> u32 {
        self.subjects.iter().map(|s| s.units).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

/// Outstanding account balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceRecord {
    #[serde(default, alias = "student_id")]
    pub student_id: Uuid,
    pub balance: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_units_sums_subjects() {
        let set = EnrolledSubjectSet {
            year_level: Some("2nd Year".to_string()),
            semester: Some("1st Semester".to_string()),
            subjects: vec![
                SubjectRecord { code: "IT201".into(), title: "Data Structures".into(), units: 3, ..Default::default() },
                SubjectRecord { code: "IT202".into(), title: "Networking".into(), units: 5, ..Default::default() },
            ],
        };
        assert_eq!(set.total_units(), 8);
        assert_eq!(EnrolledSubjectSet::empty().total_units(), 0);
    }

    #[test]
    fn test_subject_set_accepts_camel_case_year_level() {
        let json = r#"{
            "yearLevel": "1st Year",
            "semester": "2nd Semester",
            "totalUnits": 99,
            "subjects": [{ "code": "GE1", "title": "Purposive Communication", "units": 3 }]
        }"#;
        let set: EnrolledSubjectSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.year_level.as_deref(), Some("1st Year"));
        assert_eq!(set.total_units(), 3);
        assert!(set.subjects[0].grade.is_none());
    }

    #[test]
    fn test_identity_reads_camel_case_payload() {
        let json = r#"{
            "studentId": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
            "idNumber": "2022-01234",
            "firstName": "Ana",
            "middleName": "Santos",
            "lastName": "Cruz",
            "gender": "Female",
            "course": "BSIT"
        }"#;
        let identity: StudentIdentity = serde_json::from_str(json).unwrap();
        assert_eq!(identity.id_number.as_deref(), Some("2022-01234"));
        assert_eq!(identity.first_name.as_deref(), Some("Ana"));
        assert_eq!(identity.last_name.as_deref(), Some("Cruz"));
        assert!(!identity.id.is_nil());
    }

    #[test]
    fn test_registration_reads_camel_case_payload() {
        let json = r#"{
            "firstName": "Ana",
            "civilStatus": "single",
            "birthDate": "2004-03-09",
            "yearLevel": "3rd Year",
            "schoolYear": "2025-2026",
            "permanentAddress": "Quezon City",
            "previousCollege": { "school": "PUP", "yearGraduated": "2021" }
        }"#;
        let record: RegistrationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.first_name.as_deref(), Some("Ana"));
        assert_eq!(record.civil_status.as_deref(), Some("single"));
        assert_eq!(record.birth_date, NaiveDate::from_ymd_opt(2004, 3, 9));
        assert_eq!(record.year_level.as_deref(), Some("3rd Year"));
        assert_eq!(record.school_year.as_deref(), Some("2025-2026"));
        assert_eq!(record.permanent_address.as_deref(), Some("Quezon City"));
        assert_eq!(record.previous_college.year_graduated.as_deref(), Some("2021"));
        assert!(record.student_id.is_nil());
    }

    #[test]
    fn test_registration_still_reads_stored_snake_case() {
        let json = r#"{ "first_name": "Ana", "civil_status": "married", "year_level": "4th Year" }"#;
        let record: RegistrationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.first_name.as_deref(), Some("Ana"));
        assert_eq!(record.civil_status.as_deref(), Some("married"));
        assert_eq!(record.year_level.as_deref(), Some("4th Year"));
    }

    #[test]
    fn test_balance_without_student_id() {
        let balance: BalanceRecord = serde_json::from_str(r#"{ "balance": "1250.00" }"#).unwrap();
        assert_eq!(balance.balance, Decimal::new(125000, 2));
        assert!(balance.student_id.is_nil());
    }
}
