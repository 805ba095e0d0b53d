//! Merges the student's records into one render-ready view.
//!
//! Registration wins over identity for every overlapping field; anything
//! still missing prints as `N/A`. A failed fetch never fails the aggregate.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::model::{
    BalanceRecord, EnrolledSubjectSet, RegistrationRecord, SchoolHistory, StudentIdentity,
    SubjectRecord,
};
use super::source::{RecordSourceError, StudentRecordSource};
use crate::documents::common::format_long_date;
use crate::session::SessionContext;

pub const NOT_AVAILABLE: &str = "N/A";

/// The four records a document is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Identity,
    Registration,
    Subjects,
    Balance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GapReason {
    /// The student has no such record.
    Missing,
    /// The records service failed; retrying may fill the gap.
    Unavailable,
}

/// A record that could not be read and was replaced by `N/A` fallbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct RecordGap {
    pub record: RecordKind,
    pub reason: GapReason,
}

impl RecordGap {
    pub fn is_retriable(&self) -> bool {
        self.reason == GapReason::Unavailable
    }
}

/// Render-ready student data. Built per render and never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentViewModel {
    pub student_id: Uuid,
    pub id_number: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub suffix: String,
    pub full_name: String,
    pub full_name_last_first: String,
    pub gender: String,
    pub civil_status_display: String,
    pub birth_date: String,
    pub birth_place: String,
    pub nationality: String,
    pub religion: String,
    pub father_name: String,
    pub mother_name: String,
    pub guardian_name: String,
    pub permanent_address: String,
    pub current_address: String,
    pub course: String,
    pub major: String,
    pub year_level: String,
    pub semester: String,
    pub school_year: String,
    pub admission_date: String,
    pub graduation_date: String,
    pub honors: String,
    pub elementary_school: String,
    pub elementary_year: String,
    pub secondary_school: String,
    pub secondary_year: String,
    pub previous_school: String,
    pub remarks: String,
    pub subjects: EnrolledSubjectSet,
    pub balance: Option<Decimal>,
    pub gaps: Vec<RecordGap>,
}

impl StudentViewModel {
    /// "he", "she" or "they" depending on the recorded gender.
    pub fn pronoun(&self) -> &'static str {
        match self.gender_key() {
            Some('m') => "he",
            Some('f') => "she",
            _ => "they",
        }
    }

    pub fn possessive(&self) -> &'static str {
        match self.gender_key() {
            Some('m') => "his",
            Some('f') => "her",
            _ => "their",
        }
    }

    /// Pick the verb form that agrees with `pronoun()`.
    pub fn agree(&self, singular: &'static str, plural: &'static str) -> &'static str {
        match self.gender_key() {
            Some('m') | Some('f') => singular,
            _ => plural,
        }
    }

    /// Honorific used in certificate bodies, e.g. "Mr." or "Ms.".
    pub fn title(&self) -> &'static str {
        match self.gender_key() {
            Some('m') => "Mr.",
            Some('f') => "Ms.",
            _ => "",
        }
    }

    /// Title and full name, e.g. "Ms. Ana Reyes Cruz".
    pub fn addressed_name(&self) -> String {
        match self.title() {
            "" => self.full_name.clone(),
            title => format!("{} {}", title, self.full_name),
        }
    }

    pub fn subject_list(&self) -> &[SubjectRecord] {
        &self.subjects.subjects
    }

    pub fn total_units(&self) -> u32 {
        self.subjects.total_units()
    }

    pub fn has_gap(&self, record: RecordKind) -> bool {
        self.gaps.iter().any(|gap| gap.record == record)
    }

    /// Some record came back from an outage rather than being absent.
    pub fn needs_refetch(&self) -> bool {
        self.gaps.iter().any(RecordGap::is_retriable)
    }

    fn gender_key(&self) -> Option<char> {
        self.gender
            .trim()
            .chars()
            .next()
            .map(|c| c.to_ascii_lowercase())
    }
}

fn pick(primary: Option<&String>, fallback: Option<&String>) -> Option<String> {
    primary
        .into_iter()
        .chain(fallback)
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

fn or_na(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn join_name<'a>(parts: impl IntoIterator<Item = &'a Option<String>>) -> Option<String> {
    let joined = parts
        .into_iter()
        .flatten()
        .map(|part| part.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

fn title_case(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn history_fields(history: Option<&SchoolHistory>) -> (String, String) {
    let school = history.and_then(|h| pick(h.school.as_ref(), None));
    let year = history.and_then(|h| pick(h.year_graduated.as_ref(), None));
    (or_na(school), or_na(year))
}

/// Merge the four records. Pure; the fetching happens in the aggregator.
pub fn merge(
    student_id: Uuid,
    identity: Option<&StudentIdentity>,
    registration: Option<&RegistrationRecord>,
    subjects: Option<EnrolledSubjectSet>,
    balance: Option<&BalanceRecord>,
    gaps: Vec<RecordGap>,
) -> StudentViewModel {
    let reg = |f: fn(&RegistrationRecord) -> Option<&String>| registration.and_then(f);
    let idn = |f: fn(&StudentIdentity) -> Option<&String>| identity.and_then(f);

    let first = pick(reg(|r| r.first_name.as_ref()), idn(|i| i.first_name.as_ref()));
    let middle = pick(reg(|r| r.middle_name.as_ref()), idn(|i| i.middle_name.as_ref()));
    let last = pick(reg(|r| r.last_name.as_ref()), idn(|i| i.last_name.as_ref()));
    let suffix = pick(reg(|r| r.suffix.as_ref()), idn(|i| i.suffix.as_ref()));

    let full_name = join_name([&first, &middle, &last, &suffix]);
    let given = join_name([&first, &middle, &suffix]);
    let full_name_last_first = match (&last, given) {
        (Some(last), Some(given)) => Some(format!("{}, {}", last, given)),
        (Some(last), None) => Some(last.clone()),
        (None, given) => given,
    };

    let civil_status_display = reg(|r| r.civil_status.as_ref())
        .map(|status| title_case(status))
        .filter(|status| !status.is_empty());

    let date = |value: Option<chrono::NaiveDate>| value.map(format_long_date);
    let (elementary_school, elementary_year) =
        history_fields(registration.map(|r| &r.elementary));
    let (secondary_school, secondary_year) = history_fields(registration.map(|r| &r.secondary));
    let previous_school = registration.and_then(|r| pick(r.previous_college.school.as_ref(), None));

    StudentViewModel {
        student_id,
        id_number: or_na(idn(|i| i.id_number.as_ref()).cloned()),
        first_name: or_na(first),
        middle_name: middle.unwrap_or_default(),
        last_name: or_na(last),
        suffix: suffix.unwrap_or_default(),
        full_name: or_na(full_name),
        full_name_last_first: or_na(full_name_last_first),
        gender: or_na(pick(reg(|r| r.gender.as_ref()), idn(|i| i.gender.as_ref()))),
        civil_status_display: or_na(civil_status_display),
        birth_date: or_na(date(registration.and_then(|r| r.birth_date))),
        birth_place: or_na(pick(reg(|r| r.birth_place.as_ref()), None)),
        nationality: or_na(pick(reg(|r| r.nationality.as_ref()), None)),
        religion: or_na(pick(reg(|r| r.religion.as_ref()), None)),
        father_name: or_na(pick(reg(|r| r.father_name.as_ref()), None)),
        mother_name: or_na(pick(reg(|r| r.mother_name.as_ref()), None)),
        guardian_name: or_na(pick(reg(|r| r.guardian_name.as_ref()), None)),
        permanent_address: or_na(pick(reg(|r| r.permanent_address.as_ref()), None)),
        current_address: or_na(pick(
            reg(|r| r.current_address.as_ref()),
            reg(|r| r.permanent_address.as_ref()),
        )),
        course: or_na(pick(reg(|r| r.course.as_ref()), idn(|i| i.course.as_ref()))),
        major: or_na(pick(reg(|r| r.major.as_ref()), None)),
        year_level: or_na(pick(
            reg(|r| r.year_level.as_ref()),
            subjects.as_ref().and_then(|s| s.year_level.as_ref()),
        )),
        semester: or_na(pick(
            reg(|r| r.semester.as_ref()),
            subjects.as_ref().and_then(|s| s.semester.as_ref()),
        )),
        school_year: or_na(pick(reg(|r| r.school_year.as_ref()), None)),
        admission_date: or_na(date(registration.and_then(|r| r.admission_date))),
        graduation_date: or_na(date(registration.and_then(|r| r.graduation_date))),
        honors: or_na(pick(reg(|r| r.honors.as_ref()), None)),
        elementary_school,
        elementary_year,
        secondary_school,
        secondary_year,
        previous_school: or_na(previous_school),
        remarks: or_na(pick(reg(|r| r.remarks.as_ref()), None)),
        subjects: subjects.unwrap_or_default(),
        balance: balance.map(|b| b.balance),
        gaps,
    }
}

pub struct StudentRecordAggregator {
    source: Arc<dyn StudentRecordSource>,
}

impl StudentRecordAggregator {
    pub fn new(source: Arc<dyn StudentRecordSource>) -> Self {
        Self { source }
    }

    /// Fetch all four records concurrently and merge them. Never fails.
    pub async fn aggregate(&self, session: &SessionContext, student_id: Uuid) -> StudentViewModel {
        let (identity, registration, subjects, balance) = futures::join!(
            self.source.identity(session, student_id),
            self.source.registration(session, student_id),
            self.source.enrolled_subjects(session, student_id),
            self.source.balance(session, student_id),
        );

        let mut gaps = Vec::new();
        let identity = absorb(identity, student_id, RecordKind::Identity, &mut gaps);
        let registration = absorb(registration, student_id, RecordKind::Registration, &mut gaps);
        let subjects = absorb(subjects, student_id, RecordKind::Subjects, &mut gaps);
        let balance = absorb(balance, student_id, RecordKind::Balance, &mut gaps);

        merge(
            student_id,
            identity.as_ref(),
            registration.as_ref(),
            subjects,
            balance.as_ref(),
            gaps,
        )
    }
}

fn absorb<T>(
    result: Result<T, RecordSourceError>,
    student_id: Uuid,
    record: RecordKind,
    gaps: &mut Vec<RecordGap>,
) -> Option<T> {
    let reason = match result {
        Ok(value) => return Some(value),
        Err(RecordSourceError::NotFound) => {
            log::warn!("no {:?} record for student {}; using fallbacks", record, student_id);
            GapReason::Missing
        }
        Err(e) => {
            log::error!("{:?} fetch for student {} failed: {}", record, student_id, e);
            GapReason::Unavailable
        }
    };
    gaps.push(RecordGap { record, reason });
    None
}
