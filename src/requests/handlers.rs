use actix_web::{web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::lifecycle::{allowed_actions, TransitionOutcome};
use super::model::{
    CreateRequestPayload, DocumentRequest, ForwardPayload, RejectPayload, RequestStatus,
    RequestView, ViewQuery,
};
use crate::documents::DocumentType;
use crate::error::PortalError;
use crate::session::SessionContext;
use crate::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentTypeInfo {
    #[schema(example = "GRADE SLIP")]
    pub code: String,
    #[schema(example = "Grade Slip")]
    pub title: String,
    pub page_count: u8,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransitionResponse {
    pub request: DocumentRequest,
    /// Status before the operation; absent for reprints.
    pub previous_status: Option<RequestStatus>,
    /// True when the request was already printed and nothing changed.
    pub reprint: bool,
    /// Operations legal from the new status.
    pub allowed_actions: Vec<String>,
}

impl TransitionResponse {
    fn from_outcome(outcome: TransitionOutcome) -> Option<Self> {
        let (request, previous_status, reprint) = match outcome {
            TransitionOutcome::Applied { request, from } => (request, Some(from), false),
            TransitionOutcome::Reprint { request } => (request, None, true),
            TransitionOutcome::Cancelled { .. } => return None,
        };
        let allowed_actions = allowed_actions(request.status)
            .into_iter()
            .map(|action| action.as_str().to_string())
            .collect();
        Some(Self {
            request,
            previous_status,
            reprint,
            allowed_actions,
        })
    }
}

fn transition_response(outcome: TransitionOutcome) -> HttpResponse {
    match TransitionResponse::from_outcome(outcome) {
        Some(body) => HttpResponse::Ok().json(body),
        None => HttpResponse::NoContent().finish(),
    }
}

/// List the document types with a dedicated layout
#[utoipa::path(
    get,
    path = "/api/document-types",
    tag = "Requests",
    responses(
        (status = 200, description = "Supported document types", body = Vec<DocumentTypeInfo>)
    )
)]
pub async fn list_document_types() -> HttpResponse {
    let types: Vec<DocumentTypeInfo> = DocumentType::known()
        .iter()
        .map(|doc| DocumentTypeInfo {
            code: doc.code().to_string(),
            title: doc.title().to_string(),
            page_count: doc.page_count(),
        })
        .collect();
    HttpResponse::Ok().json(types)
}

/// Staff view of requests: active or archive
#[utoipa::path(
    get,
    path = "/api/requests",
    tag = "Requests",
    params(("view" = Option<RequestView>, Query, description = "active (default) or archive")),
    responses(
        (status = 200, description = "Requests in the view, newest first", body = Vec<DocumentRequest>),
        (status = 403, description = "Students cannot use staff views", body = crate::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_requests(
    state: web::Data<AppState>,
    session: SessionContext,
    query: web::Query<ViewQuery>,
) -> Result<HttpResponse, PortalError> {
    let view = query.view.unwrap_or(RequestView::Active);
    let requests = state.lifecycle.list_view(&session, view).await?;
    Ok(HttpResponse::Ok().json(requests))
}

/// All requests of one student, any status
#[utoipa::path(
    get,
    path = "/api/students/{id}/requests",
    tag = "Requests",
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "The student's requests, newest first", body = Vec<DocumentRequest>),
        (status = 404, description = "Unknown or inaccessible student", body = crate::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_student_requests(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, PortalError> {
    let requests = state
        .lifecycle
        .list_for_student(&session, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(requests))
}

/// File a new document request
#[utoipa::path(
    post,
    path = "/api/requests",
    tag = "Requests",
    request_body = CreateRequestPayload,
    responses(
        (status = 201, description = "Request created as pending", body = DocumentRequest),
        (status = 400, description = "Invalid payload", body = crate::ErrorResponse),
        (status = 403, description = "Role may not file requests", body = crate::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_request(
    state: web::Data<AppState>,
    session: SessionContext,
    body: web::Json<CreateRequestPayload>,
) -> Result<HttpResponse, PortalError> {
    let request = state.lifecycle.submit(&session, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(request))
}

/// Fetch one request
#[utoipa::path(
    get,
    path = "/api/requests/{id}",
    tag = "Requests",
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request found", body = DocumentRequest),
        (status = 404, description = "Request not found", body = crate::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_request(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, PortalError> {
    let request = state.lifecycle.get(&session, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(request))
}

/// Quote the fee and forward to accounting
#[utoipa::path(
    post,
    path = "/api/requests/{id}/forward",
    tag = "Requests",
    params(("id" = Uuid, Path, description = "Request ID")),
    request_body = ForwardPayload,
    responses(
        (status = 200, description = "Request is now payment_required", body = TransitionResponse),
        (status = 400, description = "Missing or non-positive amount", body = crate::ErrorResponse),
        (status = 409, description = "Illegal transition", body = crate::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn forward_request(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    body: web::Json<ForwardPayload>,
) -> Result<HttpResponse, PortalError> {
    let outcome = state
        .lifecycle
        .forward_to_accounting(&session, path.into_inner(), body.amount)
        .await?;
    Ok(transition_response(outcome))
}

/// Accounting confirms payment
#[utoipa::path(
    post,
    path = "/api/requests/{id}/confirm-payment",
    tag = "Requests",
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request is now payment_approved", body = TransitionResponse),
        (status = 403, description = "Only accounting may confirm payment", body = crate::ErrorResponse),
        (status = 409, description = "Illegal transition", body = crate::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn confirm_payment(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, PortalError> {
    let outcome = state
        .lifecycle
        .confirm_payment(&session, path.into_inner())
        .await?;
    Ok(transition_response(outcome))
}

/// Registrar approves a paid request
#[utoipa::path(
    post,
    path = "/api/requests/{id}/approve",
    tag = "Requests",
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Approved, or reprint of an already printed request", body = TransitionResponse),
        (status = 409, description = "Illegal transition", body = crate::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn approve_request(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, PortalError> {
    let outcome = state.lifecycle.approve(&session, path.into_inner()).await?;
    Ok(transition_response(outcome))
}

/// Reject a request, optionally with remarks
#[utoipa::path(
    post,
    path = "/api/requests/{id}/reject",
    tag = "Requests",
    params(("id" = Uuid, Path, description = "Request ID")),
    request_body(content = RejectPayload, description = "Optional remarks"),
    responses(
        (status = 200, description = "Request rejected", body = TransitionResponse),
        (status = 409, description = "Illegal transition", body = crate::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn reject_request(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    body: Option<web::Json<RejectPayload>>,
) -> Result<HttpResponse, PortalError> {
    let remarks = body.and_then(|payload| payload.into_inner().remarks);
    let outcome = state
        .lifecycle
        .reject(&session, path.into_inner(), remarks)
        .await?;
    Ok(transition_response(outcome))
}

/// Record that the student picked the document up
#[utoipa::path(
    post,
    path = "/api/requests/{id}/claim",
    tag = "Requests",
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request completed", body = TransitionResponse),
        (status = 409, description = "Illegal transition", body = crate::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn claim_request(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, PortalError> {
    let outcome = state
        .lifecycle
        .mark_claimed(&session, path.into_inner())
        .await?;
    Ok(transition_response(outcome))
}

/// Cancel (delete) a request that has not been paid for
#[utoipa::path(
    delete,
    path = "/api/requests/{id}",
    tag = "Requests",
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 204, description = "Request cancelled"),
        (status = 409, description = "Cancellation refused", body = crate::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn cancel_request(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, PortalError> {
    let outcome = state.lifecycle.cancel(&session, path.into_inner()).await?;
    Ok(transition_response(outcome))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/document-types").route(web::get().to(list_document_types)))
        .service(
            web::resource("/requests")
                .route(web::get().to(list_requests))
                .route(web::post().to(create_request)),
        )
        .service(
            web::resource("/requests/{id}")
                .route(web::get().to(get_request))
                .route(web::delete().to(cancel_request)),
        )
        .service(web::resource("/requests/{id}/forward").route(web::post().to(forward_request)))
        .service(
            web::resource("/requests/{id}/confirm-payment").route(web::post().to(confirm_payment)),
        )
        .service(web::resource("/requests/{id}/approve").route(web::post().to(approve_request)))
        .service(web::resource("/requests/{id}/reject").route(web::post().to(reject_request)))
        .service(web::resource("/requests/{id}/claim").route(web::post().to(claim_request)))
        .service(
            web::resource("/students/{id}/requests").route(web::get().to(list_student_requests)),
        );
}
