//! Document type identifiers.
//!
//! The wire value is an open-ended string ("TOR", "GRADE SLIP", ...). It is
//! parsed once into [`DocumentType`]; anything unrecognised is kept verbatim
//! in [`DocumentType::Other`] so it can still be stored and shown.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocumentType {
    TranscriptOfRecords,
    GradeSlip,
    Diploma,
    CertificateOfEnrollment,
    CertificateOfGrades,
    GoodMoral,
    CertificateOfGraduation,
    UnitsEarned,
    CertificateOfRegistration,
    MediumOfInstruction,
    HonorableDismissal,
    TransferCredential,
    Form137,
    Cav,
    Other(String),
}

/// Physical sheet used when printing, in inches (width x height).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width_in: f32,
    pub height_in: f32,
}

impl PageSize {
    pub const LETTER: PageSize = PageSize { width_in: 8.5, height_in: 11.0 };
    pub const LONG_BOND: PageSize = PageSize { width_in: 8.5, height_in: 13.0 };
    pub const LETTER_LANDSCAPE: PageSize = PageSize { width_in: 11.0, height_in: 8.5 };
    pub const HALF_LETTER: PageSize = PageSize { width_in: 8.5, height_in: 5.5 };

    pub fn css(&self) -> String {
        format!("{}in {}in", self.width_in, self.height_in)
    }
}

impl DocumentType {
    /// Every document type with a dedicated layout.
    pub fn known() -> [DocumentType; 14] {
        [
            DocumentType::TranscriptOfRecords,
            DocumentType::GradeSlip,
            DocumentType::Diploma,
            DocumentType::CertificateOfEnrollment,
            DocumentType::CertificateOfGrades,
            DocumentType::GoodMoral,
            DocumentType::CertificateOfGraduation,
            DocumentType::UnitsEarned,
            DocumentType::CertificateOfRegistration,
            DocumentType::MediumOfInstruction,
            DocumentType::HonorableDismissal,
            DocumentType::TransferCredential,
            DocumentType::Form137,
            DocumentType::Cav,
        ]
    }

    /// Case-insensitive, whitespace-tolerant match against codes and aliases.
    pub fn parse(raw: &str) -> Self {
        let normalized = raw
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase();

        match normalized.as_str() {
            "TOR" | "TRANSCRIPT OF RECORDS" | "TRANSCRIPT" => DocumentType::TranscriptOfRecords,
            "GRADE SLIP" | "GRADESLIP" => DocumentType::GradeSlip,
            "DIPLOMA" => DocumentType::Diploma,
            "CERTIFICATE OF ENROLLMENT" | "COE" => DocumentType::CertificateOfEnrollment,
            "CERTIFICATE OF GRADES" | "COG" => DocumentType::CertificateOfGrades,
            "CERTIFICATE OF GOOD MORAL CHARACTER" | "GOOD MORAL" | "GOOD MORAL CERTIFICATE" => {
                DocumentType::GoodMoral
            }
            "CERTIFICATE OF GRADUATION" => DocumentType::CertificateOfGraduation,
            "CERTIFICATE OF UNITS EARNED" | "UNITS EARNED" => DocumentType::UnitsEarned,
            "CERTIFICATE OF REGISTRATION" | "COR" => DocumentType::CertificateOfRegistration,
            "CERTIFICATE OF ENGLISH AS MEDIUM OF INSTRUCTION" | "MEDIUM OF INSTRUCTION" => {
                DocumentType::MediumOfInstruction
            }
            "HONORABLE DISMISSAL" => DocumentType::HonorableDismissal,
            "CERTIFICATE OF TRANSFER CREDENTIAL" | "TRANSFER CREDENTIAL" => {
                DocumentType::TransferCredential
            }
            "FORM 137" | "FORM137" | "SF10" => DocumentType::Form137,
            "CAV" | "CERTIFICATION, AUTHENTICATION AND VERIFICATION" => DocumentType::Cav,
            _ => DocumentType::Other(raw.trim().to_string()),
        }
    }

    /// Canonical wire code.
    pub fn code(&self) -> &str {
        match self {
            DocumentType::TranscriptOfRecords => "TOR",
            DocumentType::GradeSlip => "GRADE SLIP",
            DocumentType::Diploma => "DIPLOMA",
            DocumentType::CertificateOfEnrollment => "CERTIFICATE OF ENROLLMENT",
            DocumentType::CertificateOfGrades => "CERTIFICATE OF GRADES",
            DocumentType::GoodMoral => "CERTIFICATE OF GOOD MORAL CHARACTER",
            DocumentType::CertificateOfGraduation => "CERTIFICATE OF GRADUATION",
            DocumentType::UnitsEarned => "CERTIFICATE OF UNITS EARNED",
            DocumentType::CertificateOfRegistration => "CERTIFICATE OF REGISTRATION",
            DocumentType::MediumOfInstruction => "CERTIFICATE OF ENGLISH AS MEDIUM OF INSTRUCTION",
            DocumentType::HonorableDismissal => "HONORABLE DISMISSAL",
            DocumentType::TransferCredential => "CERTIFICATE OF TRANSFER CREDENTIAL",
            DocumentType::Form137 => "FORM 137",
            DocumentType::Cav => "CAV",
            DocumentType::Other(raw) => raw,
        }
    }

    /// Heading printed on the document.
    pub fn title(&self) -> &str {
        match self {
            DocumentType::TranscriptOfRecords => "Official Transcript of Records",
            DocumentType::GradeSlip => "Grade Slip",
            DocumentType::Diploma => "Diploma",
            DocumentType::CertificateOfEnrollment => "Certificate of Enrollment",
            DocumentType::CertificateOfGrades => "Certificate of Grades",
            DocumentType::GoodMoral => "Certificate of Good Moral Character",
            DocumentType::CertificateOfGraduation => "Certificate of Graduation",
            DocumentType::UnitsEarned => "Certificate of Units Earned",
            DocumentType::CertificateOfRegistration => "Certificate of Registration",
            DocumentType::MediumOfInstruction => "Certificate of English as Medium of Instruction",
            DocumentType::HonorableDismissal => "Honorable Dismissal",
            DocumentType::TransferCredential => "Certificate of Transfer Credential",
            DocumentType::Form137 => "Permanent Record (Form 137)",
            DocumentType::Cav => "Certification, Authentication and Verification",
            DocumentType::Other(raw) => raw,
        }
    }

    /// CSS root class that scopes every style rule of this layout.
    pub fn scope_class(&self) -> String {
        let slug = match self {
            DocumentType::TranscriptOfRecords => "tor",
            DocumentType::GradeSlip => "grade-slip",
            DocumentType::Diploma => "diploma",
            DocumentType::CertificateOfEnrollment => "coe",
            DocumentType::CertificateOfGrades => "cog",
            DocumentType::GoodMoral => "good-moral",
            DocumentType::CertificateOfGraduation => "graduation",
            DocumentType::UnitsEarned => "units-earned",
            DocumentType::CertificateOfRegistration => "cor",
            DocumentType::MediumOfInstruction => "moi",
            DocumentType::HonorableDismissal => "honorable-dismissal",
            DocumentType::TransferCredential => "transfer-credential",
            DocumentType::Form137 => "form137",
            DocumentType::Cav => "cav",
            DocumentType::Other(_) => "unavailable",
        };
        format!("doc-{}", slug)
    }

    /// Number of physical pages. Only the transcript spans two.
    pub fn page_count(&self) -> u8 {
        match self {
            DocumentType::TranscriptOfRecords => 2,
            _ => 1,
        }
    }

    pub fn page_size(&self) -> PageSize {
        match self {
            DocumentType::TranscriptOfRecords | DocumentType::Form137 => PageSize::LONG_BOND,
            DocumentType::Diploma => PageSize::LETTER_LANDSCAPE,
            DocumentType::GradeSlip => PageSize::HALF_LETTER,
            _ => PageSize::LETTER,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, DocumentType::Other(_))
    }
}

impl From<String> for DocumentType {
    fn from(value: String) -> Self {
        DocumentType::parse(&value)
    }
}

impl From<&str> for DocumentType {
    fn from(value: &str) -> Self {
        DocumentType::parse(value)
    }
}

impl From<DocumentType> for String {
    fn from(value: DocumentType) -> Self {
        value.code().to_string()
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Composite key of one physical page of one document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentKey {
    pub document_type: DocumentType,
    pub page: u8,
}

impl DocumentKey {
    pub fn new(document_type: DocumentType, page: u8) -> Self {
        Self { document_type, page }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(DocumentType::parse("tor"), DocumentType::TranscriptOfRecords);
        assert_eq!(DocumentType::parse("  Grade   slip "), DocumentType::GradeSlip);
        assert_eq!(DocumentType::parse("good moral"), DocumentType::GoodMoral);
    }

    #[test]
    fn test_unknown_type_is_preserved() {
        let doc = DocumentType::parse("Certificate of Awesomeness");
        assert_eq!(doc, DocumentType::Other("Certificate of Awesomeness".to_string()));
        assert!(!doc.is_known());
        assert_eq!(doc.code(), "Certificate of Awesomeness");
    }

    #[test]
    fn test_codes_round_trip_through_parse() {
        for doc in DocumentType::known() {
            assert_eq!(DocumentType::parse(doc.code()), doc);
        }
    }

    #[test]
    fn test_only_transcript_has_two_pages() {
        for doc in DocumentType::known() {
            let expected = if doc == DocumentType::TranscriptOfRecords { 2 } else { 1 };
            assert_eq!(doc.page_count(), expected, "{}", doc);
        }
    }

    #[test]
    fn test_serde_uses_code_string() {
        let json = serde_json::to_string(&DocumentType::GradeSlip).unwrap();
        assert_eq!(json, "\"GRADE SLIP\"");
        let back: DocumentType = serde_json::from_str("\"diploma\"").unwrap();
        assert_eq!(back, DocumentType::Diploma);
    }

    #[test]
    fn test_scope_classes_are_unique() {
        let mut classes: Vec<String> = DocumentType::known().iter().map(|d| d.scope_class()).collect();
        classes.sort();
        classes.dedup();
        assert_eq!(classes.len(), DocumentType::known().len());
    }
}
