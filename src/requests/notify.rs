//! Notification hand-off. Delivery (mail, SMS, push) is someone else's job;
//! the lifecycle only announces what happened.

use async_trait::async_trait;
use uuid::Uuid;

use super::model::RequestStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestEventKind {
    Submitted,
    ForwardedToAccounting,
    PaymentConfirmed,
    Approved,
    ReadyForPickup,
    Claimed,
    Rejected,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestEvent {
    pub request_id: Uuid,
    pub student_id: Uuid,
    pub kind: RequestEventKind,
    pub status: Option<RequestStatus>,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: RequestEvent);
}

/// Writes events to the log. Stand-in until a delivery service is wired.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, event: RequestEvent) {
        log::info!(
            "notify student {} about request {}: {:?}",
            event.student_id,
            event.request_id,
            event.kind
        );
    }
}
