//! Document requests and the lifecycle that moves them from submission to pickup.

pub mod handlers;
pub mod lifecycle;
pub mod model;
pub mod notify;
pub mod repository;


pub use lifecycle::{
    allowed_actions, next_step, partition, LifecycleAction, LifecycleController, LifecycleError,
    Step, TransitionOutcome,
};
pub use model::{
    CreateRequestPayload, DocumentRequest, ForwardPayload, InitiatedBy, RejectPayload,
    RequestStatus, RequestView,
};
pub use notify::{LogNotifier, Notifier, RequestEvent, RequestEventKind};
pub use repository::{InMemoryRequestRepository, RequestRepository, RepositoryError};
