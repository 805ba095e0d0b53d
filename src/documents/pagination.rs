//! Page selection: an edited snapshot wins over a fresh render.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use super::kind::{DocumentKey, DocumentType};
use super::resolver::TemplateResolver;
use crate::overlay::EditedContentSnapshot;
use crate::records::{RecordGap, StudentViewModel};
use crate::requests::DocumentRequest;

/// Keep a page number within the document's page range.
pub fn clamp_page(document_type: &DocumentType, page: u8) -> u8 {
    page.clamp(1, document_type.page_count())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PageSource {
    Snapshot,
    Generated,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PageView {
    #[schema(value_type = String)]
    pub document_type: DocumentType,
    pub page: u8,
    pub page_count: u8,
    pub source: PageSource,
    pub markup: String,
    /// Records that printed as `N/A` because they could not be read.
    pub gaps: Vec<RecordGap>,
}

pub struct PaginationController {
    resolver: Arc<TemplateResolver>,
}

impl PaginationController {
    pub fn new(resolver: Arc<TemplateResolver>) -> Self {
        Self { resolver }
    }

    /// Show a page, returning the snapshot verbatim when one exists.
    pub fn show(
        &self,
        student: &StudentViewModel,
        request: &DocumentRequest,
        snapshots: &EditedContentSnapshot,
        page: u8,
        issue_date: NaiveDate,
    ) -> PageView {
        let document_type = &request.document_type;
        let page = clamp_page(document_type, page);
        let key = DocumentKey::new(document_type.clone(), page);

        let (source, markup) = match snapshots.get(&key) {
            Some(markup) => {
                log::debug!("page {} of request {} served from snapshot", page, request.id);
                (PageSource::Snapshot, markup.to_string())
            }
            None => (
                PageSource::Generated,
                self.resolver.render(student, request, page, issue_date),
            ),
        };

        PageView {
            document_type: document_type.clone(),
            page,
            page_count: document_type.page_count(),
            source,
            markup,
            gaps: student.gaps.clone(),
        }
    }

    /// Every page in order, each from its snapshot when present.
    pub fn all_pages(
        &self,
        student: &StudentViewModel,
        request: &DocumentRequest,
        snapshots: &EditedContentSnapshot,
        issue_date: NaiveDate,
    ) -> Vec<PageView> {
        (1..=request.document_type.page_count())
            .map(|page| self.show(student, request, snapshots, page, issue_date))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchoolProfile;
    use crate::records::aggregator::merge;
    use crate::records::{GapReason, RecordKind};
    use crate::requests::InitiatedBy;
    use uuid::Uuid;

    fn fixture(document_type: DocumentType) -> (PaginationController, StudentViewModel, DocumentRequest) {
        let controller =
            PaginationController::new(Arc::new(TemplateResolver::new(SchoolProfile::default())));
        let student = merge(Uuid::new_v4(), None, None, None, None, vec![]);
        let request = DocumentRequest::new(
            student.student_id,
            document_type,
            "Board exam".to_string(),
            InitiatedBy::Student,
        );
        (controller, student, request)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    #[test]
    fn test_clamp_page() {
        assert_eq!(clamp_page(&DocumentType::TranscriptOfRecords, 0), 1);
        assert_eq!(clamp_page(&DocumentType::TranscriptOfRecords, 2), 2);
        assert_eq!(clamp_page(&DocumentType::TranscriptOfRecords, 7), 2);
        assert_eq!(clamp_page(&DocumentType::Diploma, 2), 1);
    }

    #[test]
    fn test_snapshot_survives_page_switch() {
        let (controller, student, request) = fixture(DocumentType::TranscriptOfRecords);
        let mut snapshots = EditedContentSnapshot::new();
        let edited = "<div class=\"doc doc-tor\"><p><strong>edited</strong></p></div>".to_string();
        snapshots.save(
            DocumentKey::new(DocumentType::TranscriptOfRecords, 1),
            edited.clone(),
        );

        let first = controller.show(&student, &request, &snapshots, 1, today());
        assert_eq!(first.source, PageSource::Snapshot);
        assert_eq!(first.markup, edited);

        let second = controller.show(&student, &request, &snapshots, 2, today());
        assert_eq!(second.source, PageSource::Generated);
        assert!(second.markup.contains("Curriculum"));

        let back = controller.show(&student, &request, &snapshots, 1, today());
        assert_eq!(back.markup, edited);
    }

    #[test]
    fn test_all_pages_in_order() {
        let (controller, student, request) = fixture(DocumentType::TranscriptOfRecords);
        let pages = controller.all_pages(&student, &request, &EditedContentSnapshot::new(), today());
        assert_eq!(pages.iter().map(|p| p.page).collect::<Vec<_>>(), vec![1, 2]);
        assert!(pages.iter().all(|p| p.page_count == 2));
    }

    #[test]
    fn test_page_reports_record_gaps() {
        let (controller, mut student, request) = fixture(DocumentType::GradeSlip);
        student.gaps = vec![RecordGap {
            record: RecordKind::Registration,
            reason: GapReason::Unavailable,
        }];

        let view = controller.show(&student, &request, &EditedContentSnapshot::new(), 1, today());
        assert_eq!(view.gaps, student.gaps);

        let body = serde_json::to_value(&view).unwrap();
        assert_eq!(body["gaps"][0]["record"], "registration");
        assert_eq!(body["gaps"][0]["reason"], "unavailable");
    }
}
