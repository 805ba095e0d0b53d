//! Request lifecycle: the status state machine and the operations that drive it.
//!
//! ```text
//! pending ──forward──▶ payment_required ──confirm──▶ payment_approved ──approve──▶ approved
//!    │                      │                                                         │
//!    └──reject──▶ rejected ◀┘                                                  mark_printed
//!                                                                                     ▼
//!                           completed ◀──claim── ready_for_pickup ◀──reprint (no change)
//! ```
//!
//! Refused transitions are returned as values; nothing is mutated and no
//! notification is sent.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use super::model::{CreateRequestPayload, DocumentRequest, InitiatedBy, RequestStatus, RequestView};
use super::notify::{Notifier, RequestEvent, RequestEventKind};
use super::repository::{RepositoryError, RequestRepository};
use crate::documents::DocumentType;
use crate::metrics;
use crate::session::{Role, SessionContext};
use crate::validation::{
    validate_amount, validate_max_len, validate_required, ValidationError, ValidationErrors,
};

const MAX_PURPOSE_LEN: usize = 500;
const MAX_REMARKS_LEN: usize = 1000;
const MAX_WRITE_ATTEMPTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Submit,
    ForwardToAccounting,
    ConfirmPayment,
    Approve,
    MarkPrinted,
    MarkClaimed,
    Reject,
    Cancel,
}

impl LifecycleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleAction::Submit => "submit",
            LifecycleAction::ForwardToAccounting => "forward_to_accounting",
            LifecycleAction::ConfirmPayment => "confirm_payment",
            LifecycleAction::Approve => "approve",
            LifecycleAction::MarkPrinted => "mark_printed",
            LifecycleAction::MarkClaimed => "mark_claimed",
            LifecycleAction::Reject => "reject",
            LifecycleAction::Cancel => "cancel",
        }
    }

    fn event_kind(&self) -> RequestEventKind {
        match self {
            LifecycleAction::Submit => RequestEventKind::Submitted,
            LifecycleAction::ForwardToAccounting => RequestEventKind::ForwardedToAccounting,
            LifecycleAction::ConfirmPayment => RequestEventKind::PaymentConfirmed,
            LifecycleAction::Approve => RequestEventKind::Approved,
            LifecycleAction::MarkPrinted => RequestEventKind::ReadyForPickup,
            LifecycleAction::MarkClaimed => RequestEventKind::Claimed,
            LifecycleAction::Reject => RequestEventKind::Rejected,
            LifecycleAction::Cancel => RequestEventKind::Cancelled,
        }
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LifecycleAction::Submit => "submit",
            LifecycleAction::ForwardToAccounting => "forward to accounting",
            LifecycleAction::ConfirmPayment => "confirm payment for",
            LifecycleAction::Approve => "approve",
            LifecycleAction::MarkPrinted => "mark as printed",
            LifecycleAction::MarkClaimed => "mark as claimed",
            LifecycleAction::Reject => "reject",
            LifecycleAction::Cancel => "cancel",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("cannot {action} a request that is {from}")]
    IllegalTransition {
        action: LifecycleAction,
        from: RequestStatus,
    },
    #[error("request cannot be cancelled: {reason}")]
    CancellationRefused {
        status: RequestStatus,
        reason: String,
    },
    #[error("{role} is not allowed to {action} this request")]
    Forbidden { action: LifecycleAction, role: Role },
    #[error("staff views are not available to {role}")]
    StaffOnly { role: Role },
    #[error("{0}")]
    Validation(ValidationErrors),
    #[error("request {0} not found")]
    NotFound(Uuid),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// What an action does to a request in a given status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Move(RequestStatus),
    /// Already printed: regenerate output only.
    Reprint,
    Delete,
}

/// The transition table.
pub fn next_step(from: RequestStatus, action: LifecycleAction) -> Result<Step, LifecycleError> {
    use LifecycleAction::*;
    use RequestStatus::*;

    match (action, from) {
        (ForwardToAccounting, Pending) => Ok(Step::Move(PaymentRequired)),
        (ConfirmPayment, PaymentRequired) => Ok(Step::Move(PaymentApproved)),
        (Approve, PaymentApproved) => Ok(Step::Move(Approved)),
        (Approve, ReadyForPickup | Printed) => Ok(Step::Reprint),
        (MarkPrinted, Approved) => Ok(Step::Move(ReadyForPickup)),
        (MarkPrinted, ReadyForPickup | Printed) => Ok(Step::Reprint),
        (MarkClaimed, ReadyForPickup | Printed) => Ok(Step::Move(Completed)),
        (Reject, Pending | PaymentRequired) => Ok(Step::Move(Rejected)),
        (Cancel, Pending | PaymentRequired) => Ok(Step::Delete),
        (Cancel, status) => Err(LifecycleError::CancellationRefused {
            status,
            reason: cancellation_refusal(status).to_string(),
        }),
        (action, from) => Err(LifecycleError::IllegalTransition { action, from }),
    }
}

fn cancellation_refusal(status: RequestStatus) -> &'static str {
    match status {
        RequestStatus::PaymentApproved => {
            "payment has already been approved; please contact the registrar's office"
        }
        RequestStatus::Approved => "the request has already been approved by the registrar",
        RequestStatus::ReadyForPickup | RequestStatus::Printed | RequestStatus::Completed => {
            "the document has already been printed"
        }
        RequestStatus::Rejected => "the request has already been rejected",
        RequestStatus::Pending | RequestStatus::PaymentRequired => "cancellation is allowed",
    }
}

/// Actions that are legal from `from`, reprints included.
pub fn allowed_actions(from: RequestStatus) -> Vec<LifecycleAction> {
    use LifecycleAction::*;
    [
        ForwardToAccounting,
        ConfirmPayment,
        Approve,
        MarkPrinted,
        MarkClaimed,
        Reject,
        Cancel,
    ]
    .into_iter()
    .filter(|action| next_step(from, *action).is_ok())
    .collect()
}

fn permits(action: LifecycleAction, session: &SessionContext, request: &DocumentRequest) -> bool {
    let role = session.role();
    match action {
        LifecycleAction::ConfirmPayment => matches!(role, Role::Accounting | Role::Admin),
        LifecycleAction::Cancel => {
            role.is_registrar() || (role == Role::Student && session.user_id() == request.student_id)
        }
        _ => role.is_registrar(),
    }
}

/// Outcome of an accepted lifecycle operation.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    Applied {
        request: DocumentRequest,
        from: RequestStatus,
    },
    /// The request was already printed; status and timestamps untouched.
    Reprint { request: DocumentRequest },
    Cancelled { request_id: Uuid },
}

impl TransitionOutcome {
    pub fn request(&self) -> Option<&DocumentRequest> {
        match self {
            TransitionOutcome::Applied { request, .. } | TransitionOutcome::Reprint { request } => {
                Some(request)
            }
            TransitionOutcome::Cancelled { .. } => None,
        }
    }

    pub fn is_reprint(&self) -> bool {
        matches!(self, TransitionOutcome::Reprint { .. })
    }
}

/// Keep only the requests that belong to a staff view.
pub fn partition(requests: Vec<DocumentRequest>, view: RequestView) -> Vec<DocumentRequest> {
    requests
        .into_iter()
        .filter(|r| r.status.view() == Some(view))
        .collect()
}

pub struct LifecycleController {
    repository: Arc<dyn RequestRepository>,
    notifier: Arc<dyn Notifier>,
}

impl LifecycleController {
    pub fn new(repository: Arc<dyn RequestRepository>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    pub async fn get(
        &self,
        session: &SessionContext,
        id: Uuid,
    ) -> Result<DocumentRequest, LifecycleError> {
        let request = self.load(id).await?;
        // Students get a not-found rather than learning the id exists.
        if !session.can_access_student(request.student_id) {
            return Err(LifecycleError::NotFound(id));
        }
        Ok(request)
    }

    pub async fn list_for_student(
        &self,
        session: &SessionContext,
        student_id: Uuid,
    ) -> Result<Vec<DocumentRequest>, LifecycleError> {
        if !session.can_access_student(student_id) {
            return Err(LifecycleError::NotFound(student_id));
        }
        Ok(self.repository.list_by_student(student_id).await?)
    }

    /// Staff active/archive view. Rejected requests never appear.
    pub async fn list_view(
        &self,
        session: &SessionContext,
        view: RequestView,
    ) -> Result<Vec<DocumentRequest>, LifecycleError> {
        if !session.role().is_staff() {
            return Err(LifecycleError::StaffOnly {
                role: session.role(),
            });
        }
        let all = self.repository.list_all().await?;
        Ok(partition(all, view))
    }

    pub async fn submit(
        &self,
        session: &SessionContext,
        payload: CreateRequestPayload,
    ) -> Result<DocumentRequest, LifecycleError> {
        let mut errors = ValidationErrors::new();
        validate_required(&payload.document_type, "document_type", "Document type", &mut errors);
        validate_required(&payload.purpose, "purpose", "Purpose", &mut errors);
        validate_max_len(&payload.purpose, "purpose", "Purpose", MAX_PURPOSE_LEN, &mut errors);

        let (student_id, initiated_by) = match session.role() {
            Role::Student => {
                if payload.student_id.is_some_and(|id| id != session.user_id()) {
                    return Err(LifecycleError::Forbidden {
                        action: LifecycleAction::Submit,
                        role: Role::Student,
                    });
                }
                (session.user_id(), InitiatedBy::Student)
            }
            Role::Registrar | Role::Admin => match payload.student_id {
                Some(id) => (id, InitiatedBy::Registrar),
                None => {
                    errors.add(ValidationError::empty_field("student_id", "Student"));
                    (Uuid::nil(), InitiatedBy::Registrar)
                }
            },
            Role::Accounting => {
                return Err(LifecycleError::Forbidden {
                    action: LifecycleAction::Submit,
                    role: Role::Accounting,
                })
            }
        };
        errors.into_result().map_err(LifecycleError::Validation)?;

        let document_type = DocumentType::parse(&payload.document_type);
        if !document_type.is_known() {
            log::warn!(
                "request filed for unrecognised document type '{}'",
                document_type
            );
        }

        let mut request = DocumentRequest::new(
            student_id,
            document_type,
            payload.purpose.trim().to_string(),
            initiated_by,
        );
        request.requirements = payload.requirements.unwrap_or_default();

        self.repository.insert(&request).await?;
        log::info!(
            "request {} for '{}' submitted by {} ({})",
            request.id,
            request.document_type,
            session.display_name(),
            session.role()
        );
        self.notifier
            .notify(RequestEvent {
                request_id: request.id,
                student_id: request.student_id,
                kind: RequestEventKind::Submitted,
                status: Some(request.status),
            })
            .await;

        Ok(request)
    }

    /// Registrar quotes the fee and hands the request to accounting.
    pub async fn forward_to_accounting(
        &self,
        session: &SessionContext,
        id: Uuid,
        amount: Option<Decimal>,
    ) -> Result<TransitionOutcome, LifecycleError> {
        self.apply(session, id, LifecycleAction::ForwardToAccounting, |request| {
            let mut errors = ValidationErrors::new();
            validate_amount(amount.as_ref(), "amount", &mut errors);
            errors.into_result().map_err(LifecycleError::Validation)?;
            request.amount = amount;
            Ok(())
        })
        .await
    }

    /// Accounting confirms the payment was received.
    pub async fn confirm_payment(
        &self,
        session: &SessionContext,
        id: Uuid,
    ) -> Result<TransitionOutcome, LifecycleError> {
        self.apply(session, id, LifecycleAction::ConfirmPayment, |request| {
            // Older rows may predate the amount column being mandatory.
            if request.amount.is_none() {
                let mut errors = ValidationErrors::new();
                validate_amount(None, "amount", &mut errors);
                return Err(LifecycleError::Validation(errors));
            }
            Ok(())
        })
        .await
    }

    pub async fn approve(
        &self,
        session: &SessionContext,
        id: Uuid,
    ) -> Result<TransitionOutcome, LifecycleError> {
        self.apply(session, id, LifecycleAction::Approve, |_| Ok(())).await
    }

    /// Completes the print workflow. A second call is a reprint: `printed_at`
    /// keeps its first value and no notification goes out.
    pub async fn mark_printed(
        &self,
        session: &SessionContext,
        id: Uuid,
    ) -> Result<TransitionOutcome, LifecycleError> {
        self.apply(session, id, LifecycleAction::MarkPrinted, |request| {
            request.printed_at = Some(Utc::now());
            Ok(())
        })
        .await
    }

    pub async fn mark_claimed(
        &self,
        session: &SessionContext,
        id: Uuid,
    ) -> Result<TransitionOutcome, LifecycleError> {
        self.apply(session, id, LifecycleAction::MarkClaimed, |_| Ok(())).await
    }

    pub async fn reject(
        &self,
        session: &SessionContext,
        id: Uuid,
        remarks: Option<String>,
    ) -> Result<TransitionOutcome, LifecycleError> {
        self.apply(session, id, LifecycleAction::Reject, |request| {
            if let Some(text) = remarks.as_deref() {
                let mut errors = ValidationErrors::new();
                validate_max_len(text, "remarks", "Remarks", MAX_REMARKS_LEN, &mut errors);
                errors.into_result().map_err(LifecycleError::Validation)?;
            }
            request.remarks = remarks
                .as_deref()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_string);
            Ok(())
        })
        .await
    }

    pub async fn cancel(
        &self,
        session: &SessionContext,
        id: Uuid,
    ) -> Result<TransitionOutcome, LifecycleError> {
        self.apply(session, id, LifecycleAction::Cancel, |_| Ok(())).await
    }

    async fn load(&self, id: Uuid) -> Result<DocumentRequest, LifecycleError> {
        self.repository
            .get(id)
            .await?
            .ok_or(LifecycleError::NotFound(id))
    }

    async fn apply<F>(
        &self,
        session: &SessionContext,
        id: Uuid,
        action: LifecycleAction,
        prepare: F,
    ) -> Result<TransitionOutcome, LifecycleError>
    where
        F: FnMut(&mut DocumentRequest) -> Result<(), LifecycleError>,
    {
        let result = self.apply_inner(session, id, action, prepare).await;
        match &result {
            Ok(TransitionOutcome::Reprint { .. }) => {
                metrics::record_transition(action.as_str(), "reprint")
            }
            Ok(_) => metrics::record_transition(action.as_str(), "applied"),
            Err(err) => {
                log::warn!(
                    "{} on request {} refused for {}: {}",
                    action.as_str(),
                    id,
                    session.display_name(),
                    err
                );
                metrics::record_transition(action.as_str(), "refused");
            }
        }
        result
    }

    /// Decide against the stored status and write only if it is still that
    /// status. A lost race re-decides against the newer copy.
    async fn apply_inner<F>(
        &self,
        session: &SessionContext,
        id: Uuid,
        action: LifecycleAction,
        mut prepare: F,
    ) -> Result<TransitionOutcome, LifecycleError>
    where
        F: FnMut(&mut DocumentRequest) -> Result<(), LifecycleError>,
    {
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let request = self.load(id).await?;
            if !session.can_access_student(request.student_id) {
                return Err(LifecycleError::NotFound(id));
            }
            if !permits(action, session, &request) {
                return Err(LifecycleError::Forbidden {
                    action,
                    role: session.role(),
                });
            }

            let from = request.status;
            match next_step(from, action)? {
                Step::Move(to) => {
                    let mut updated = request;
                    prepare(&mut updated)?;
                    updated.status = to;
                    updated.updated_at = Utc::now();

                    if !self.repository.update(&updated, from).await? {
                        log::debug!(
                            "request {} changed under {} (attempt {}); re-reading",
                            id,
                            action.as_str(),
                            attempt
                        );
                        continue;
                    }
                    log::info!(
                        "request {} moved {} -> {} by {}",
                        id,
                        from,
                        to,
                        session.display_name()
                    );
                    self.notifier
                        .notify(RequestEvent {
                            request_id: updated.id,
                            student_id: updated.student_id,
                            kind: action.event_kind(),
                            status: Some(to),
                        })
                        .await;
                    return Ok(TransitionOutcome::Applied {
                        request: updated,
                        from,
                    });
                }
                Step::Reprint => {
                    log::info!(
                        "request {} already printed; treating {} as reprint",
                        id,
                        action.as_str()
                    );
                    return Ok(TransitionOutcome::Reprint { request });
                }
                Step::Delete => {
                    if !self.repository.delete(id, from).await? {
                        continue;
                    }
                    log::info!("request {} cancelled by {}", id, session.display_name());
                    self.notifier
                        .notify(RequestEvent {
                            request_id: id,
                            student_id: request.student_id,
                            kind: RequestEventKind::Cancelled,
                            status: None,
                        })
                        .await;
                    return Ok(TransitionOutcome::Cancelled { request_id: id });
                }
            }
        }
        Err(LifecycleError::Repository(RepositoryError::Unavailable(format!(
            "request {} kept changing during {}",
            id,
            action.as_str()
        ))))
    }
}
