//! Maps a document type to its layout and renders pages.

use chrono::NaiveDate;

use super::kind::DocumentType;
use super::layouts;
use super::pagination::clamp_page;
use crate::config::SchoolProfile;
use crate::metrics;
use crate::records::StudentViewModel;
use crate::requests::DocumentRequest;

/// Everything a layout may read. Layouts are pure functions of this.
pub struct RenderContext<'a> {
    pub student: &'a StudentViewModel,
    pub request: &'a DocumentRequest,
    pub page: u8,
    pub issue_date: NaiveDate,
    pub school: &'a SchoolProfile,
}

pub type LayoutFn = fn(&RenderContext<'_>) -> String;

pub struct TemplateResolver {
    school: SchoolProfile,
}

impl TemplateResolver {
    pub fn new(school: SchoolProfile) -> Self {
        Self { school }
    }

    /// Layout registered for a document type; `None` for unrecognised types.
    pub fn layout_for(document_type: &DocumentType) -> Option<LayoutFn> {
        let layout: LayoutFn = match document_type {
            DocumentType::TranscriptOfRecords => layouts::transcript::render,
            DocumentType::GradeSlip => layouts::grade_slip::render,
            DocumentType::Diploma => layouts::diploma::render,
            DocumentType::CertificateOfEnrollment => layouts::certificates::enrollment,
            DocumentType::CertificateOfGrades => layouts::certificates::grades,
            DocumentType::GoodMoral => layouts::certificates::good_moral,
            DocumentType::CertificateOfGraduation => layouts::certificates::graduation,
            DocumentType::UnitsEarned => layouts::certificates::units_earned,
            DocumentType::CertificateOfRegistration => layouts::certificates::registration,
            DocumentType::MediumOfInstruction => layouts::certificates::medium_of_instruction,
            DocumentType::Cav => layouts::certificates::cav,
            DocumentType::HonorableDismissal => layouts::credentials::honorable_dismissal,
            DocumentType::TransferCredential => layouts::credentials::transfer_credential,
            DocumentType::Form137 => layouts::credentials::form137,
            DocumentType::Other(_) => return None,
        };
        Some(layout)
    }

    /// Render one page of the request's document. Out-of-range pages are
    /// clamped; unknown document types render a placeholder.
    pub fn render(
        &self,
        student: &StudentViewModel,
        request: &DocumentRequest,
        page: u8,
        issue_date: NaiveDate,
    ) -> String {
        let document_type = &request.document_type;
        let ctx = RenderContext {
            student,
            request,
            page: clamp_page(document_type, page),
            issue_date,
            school: &self.school,
        };

        match Self::layout_for(document_type) {
            Some(layout) => {
                metrics::record_render(document_type.code());
                layout(&ctx)
            }
            None => {
                log::warn!(
                    "no layout for document type '{}' on request {}",
                    document_type,
                    request.id
                );
                metrics::record_render("unavailable");
                layouts::placeholder::render(&ctx)
            }
        }
    }
}
