//! One staff member's approval session for one request.
//!
//! Holds the merged student view, the current page, the edit overlay and
//! the snapshots. All methods are synchronous; callers fetch data first and
//! take the session lock only around these calls.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::documents::{DocumentKey, PageView, PaginationController, PrintCompiler, PrintDocument};
use crate::overlay::{EditedContentSnapshot, FormatCommand, RichText, Selection};
use crate::records::StudentViewModel;
use crate::requests::DocumentRequest;
use crate::session::SessionContext;

#[derive(Debug, Error, PartialEq)]
pub enum ApprovalError {
    #[error("no approval session is open for request {0}")]
    NotFound(Uuid),
    #[error("request {request_id} is being reviewed by {holder}")]
    Conflict { request_id: Uuid, holder: String },
    #[error("the page is not in edit mode")]
    NotEditing,
    #[error("save the current edits before leaving the page")]
    EditInProgress,
}

/// Edit-mode state returned to the client after every edit command.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EditView {
    pub page: u8,
    pub markup: String,
    /// Visible text; selection offsets index into this.
    pub text: String,
    pub selection: Selection,
}

pub struct ApprovalSession {
    owner_id: Uuid,
    owner_name: String,
    request: DocumentRequest,
    student: StudentViewModel,
    issue_date: NaiveDate,
    current_page: u8,
    snapshots: EditedContentSnapshot,
    editing: Option<RichText>,
}

impl fmt::Debug for ApprovalSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApprovalSession")
            .field("owner_name", &self.owner_name)
            .field("request_id", &self.request.id)
            .field("current_page", &self.current_page)
            .field("editing", &self.is_editing())
            .finish_non_exhaustive()
    }
}

impl ApprovalSession {
    pub fn new(
        owner: &SessionContext,
        request: DocumentRequest,
        student: StudentViewModel,
        issue_date: NaiveDate,
    ) -> Self {
        Self {
            owner_id: owner.user_id(),
            owner_name: owner.display_name().to_string(),
            request,
            student,
            issue_date,
            current_page: 1,
            snapshots: EditedContentSnapshot::new(),
            editing: None,
        }
    }

    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    pub fn request(&self) -> &DocumentRequest {
        &self.request
    }

    pub fn current_page(&self) -> u8 {
        self.current_page
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn snapshots(&self) -> &EditedContentSnapshot {
        &self.snapshots
    }

    pub fn student(&self) -> &StudentViewModel {
        &self.student
    }

    /// Swap in a freshly aggregated view. Snapshots are kept.
    pub fn set_student(&mut self, student: StudentViewModel) {
        self.student = student;
    }

    /// Keep the stored request in step after a lifecycle transition.
    pub fn set_request(&mut self, request: DocumentRequest) {
        self.request = request;
    }

    fn key(&self) -> DocumentKey {
        DocumentKey::new(self.request.document_type.clone(), self.current_page)
    }

    pub fn view(&self, pagination: &PaginationController) -> PageView {
        pagination.show(
            &self.student,
            &self.request,
            &self.snapshots,
            self.current_page,
            self.issue_date,
        )
    }

    pub fn switch_page(
        &mut self,
        pagination: &PaginationController,
        page: u8,
    ) -> Result<PageView, ApprovalError> {
        if self.is_editing() {
            return Err(ApprovalError::EditInProgress);
        }
        let view = pagination.show(
            &self.student,
            &self.request,
            &self.snapshots,
            page,
            self.issue_date,
        );
        self.current_page = view.page;
        Ok(view)
    }

    /// Enter edit mode on the current page's markup.
    pub fn begin_edit(&mut self, pagination: &PaginationController) -> EditView {
        let doc = match self.editing.take() {
            Some(doc) => doc,
            None => RichText::parse(&self.view(pagination).markup),
        };
        let view = self.edit_view(&doc, Selection::default());
        self.editing = Some(doc);
        view
    }

    pub fn format(
        &mut self,
        command: FormatCommand,
        selection: Selection,
    ) -> Result<EditView, ApprovalError> {
        let page = self.current_page;
        let doc = self.editing.as_mut().ok_or(ApprovalError::NotEditing)?;
        let restored = doc.apply(command, selection);
        Ok(EditView {
            page,
            markup: doc.to_markup(),
            text: doc.plain_text(),
            selection: restored,
        })
    }

    pub fn replace_text(
        &mut self,
        selection: Selection,
        text: &str,
    ) -> Result<EditView, ApprovalError> {
        let page = self.current_page;
        let doc = self.editing.as_mut().ok_or(ApprovalError::NotEditing)?;
        let selection = doc.replace_text(selection, text);
        Ok(EditView {
            page,
            markup: doc.to_markup(),
            text: doc.plain_text(),
            selection,
        })
    }

    /// Leave edit mode, keeping the edited page as the snapshot for its key.
    pub fn save_edit(&mut self, pagination: &PaginationController) -> Result<PageView, ApprovalError> {
        let doc = self.editing.take().ok_or(ApprovalError::NotEditing)?;
        let key = self.key();
        self.snapshots.save(key, doc.to_markup());
        Ok(self.view(pagination))
    }

    /// Drop the snapshot (and any pending edit) for the current page and
    /// render it again from the records.
    pub fn regenerate(&mut self, pagination: &PaginationController) -> PageView {
        self.editing = None;
        let key = self.key();
        if self.snapshots.clear(&key) {
            log::debug!(
                "snapshot for page {} of request {} cleared",
                self.current_page,
                self.request.id
            );
        }
        self.view(pagination)
    }

    /// Compile every page, snapshots first.
    pub fn compile(
        &self,
        pagination: &PaginationController,
        compiler: &PrintCompiler,
    ) -> Result<PrintDocument, ApprovalError> {
        if self.is_editing() {
            return Err(ApprovalError::EditInProgress);
        }
        let pages: Vec<String> = pagination
            .all_pages(&self.student, &self.request, &self.snapshots, self.issue_date)
            .into_iter()
            .map(|page| page.markup)
            .collect();
        Ok(compiler.compile(&self.request.document_type, &self.student.full_name, &pages))
    }

    fn edit_view(&self, doc: &RichText, selection: Selection) -> EditView {
        EditView {
            page: self.current_page,
            markup: doc.to_markup(),
            text: doc.plain_text(),
            selection,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::SchoolProfile;
    use crate::documents::{DocumentType, PageSource, TemplateResolver};
    use crate::records::aggregator::merge;
    use crate::records::model::StudentIdentity;
    use crate::requests::InitiatedBy;
    use crate::session::Role;

    fn setup(document_type: DocumentType) -> (ApprovalSession, PaginationController) {
        let staff = SessionContext::new(Uuid::new_v4(), Role::Registrar, "Registrar Reyes", "t");
        let id = Uuid::new_v4();
        let identity = StudentIdentity {
            id,
            first_name: Some("Ana".to_string()),
            last_name: Some("Cruz".to_string()),
            course: Some("BSIT".to_string()),
            ..Default::default()
        };
        let student = merge(id, Some(&identity), None, None, None, vec![]);
        let request = DocumentRequest::new(id, document_type, "Employment".into(), InitiatedBy::Student);
        let session = ApprovalSession::new(
            &staff,
            request,
            student,
            NaiveDate::from_ymd_opt(2025, 5, 20).unwrap(),
        );
        let pagination =
            PaginationController::new(Arc::new(TemplateResolver::new(SchoolProfile::default())));
        (session, pagination)
    }

    #[test]
    fn test_edit_save_and_print_keep_formatting() {
        let (mut session, pagination) = setup(DocumentType::GoodMoral);
        let edit = session.begin_edit(&pagination);
        let at = edit.text.find("Ana Cruz").unwrap();
        let start = edit.text[..at].chars().count();

        session
            .format(FormatCommand::Italic, Selection::new(start, start + 3))
            .unwrap();
        let saved = session.save_edit(&pagination).unwrap();
        assert_eq!(saved.source, PageSource::Snapshot);
        assert!(saved.markup.contains("<em>Ana</em>"));

        let printed = session.compile(&pagination, &PrintCompiler::new("http://localhost:8080")).unwrap();
        assert!(printed.html.contains("<em>Ana</em>"));
    }

    #[test]
    fn test_switch_page_refused_while_editing() {
        let (mut session, pagination) = setup(DocumentType::TranscriptOfRecords);
        session.begin_edit(&pagination);
        assert_eq!(
            session.switch_page(&pagination, 2).unwrap_err(),
            ApprovalError::EditInProgress
        );
    }

    #[test]
    fn test_regenerate_clears_only_current_page() {
        let (mut session, pagination) = setup(DocumentType::TranscriptOfRecords);
        session.begin_edit(&pagination);
        session.replace_text(Selection::new(0, 0), "X").unwrap();
        session.save_edit(&pagination).unwrap();

        session.switch_page(&pagination, 2).unwrap();
        session.begin_edit(&pagination);
        session.save_edit(&pagination).unwrap();
        assert_eq!(session.snapshots().len(), 2);

        let fresh = session.regenerate(&pagination);
        assert_eq!(fresh.source, PageSource::Generated);
        assert_eq!(session.snapshots().len(), 1);

        let first = session.switch_page(&pagination, 1).unwrap();
        assert_eq!(first.source, PageSource::Snapshot);
    }

    #[test]
    fn test_commands_need_edit_mode() {
        let (mut session, _) = setup(DocumentType::GradeSlip);
        assert_eq!(
            session.format(FormatCommand::Bold, Selection::new(0, 1)).unwrap_err(),
            ApprovalError::NotEditing
        );
    }
}
