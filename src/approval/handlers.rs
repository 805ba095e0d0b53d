use actix_web::http::header;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::session::{ApprovalSession, EditView};
use super::store::SharedApprovalSession;
use crate::documents::PageView;
use crate::error::PortalError;
use crate::metrics;
use crate::overlay::{Alignment, FormatCommand, InlineStyle, Selection};
use crate::requests::DocumentRequest;
use crate::session::SessionContext;
use crate::AppState;

/// Header telling the client whether the print was the first one.
pub const PRINT_KIND_HEADER: &str = "X-Print-Kind";

#[derive(Debug, Deserialize, ToSchema)]
pub struct FormatRequest {
    pub style: Option<InlineStyle>,
    pub alignment: Option<Alignment>,
    pub selection: Selection,
}

impl FormatRequest {
    fn command(&self) -> Result<FormatCommand, PortalError> {
        match (self.style, self.alignment) {
            (Some(style), None) => Ok(style.into()),
            (None, Some(alignment)) => Ok(FormatCommand::Align { alignment }),
            _ => Err(PortalError::BadRequest(
                "Provide either a style or an alignment".to_string(),
            )),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TextRequest {
    pub selection: Selection,
    pub text: String,
}

fn require_registrar(session: &SessionContext) -> Result<(), PortalError> {
    if session.role().is_registrar() {
        Ok(())
    } else {
        Err(PortalError::Forbidden(format!(
            "{} cannot open documents for approval",
            session.role()
        )))
    }
}

fn ensure_printable(request: &DocumentRequest) -> Result<(), PortalError> {
    if request.status.is_printable() {
        Ok(())
    } else {
        Err(PortalError::NotPrintable(format!(
            "request {} is {}; documents are available once it is approved",
            request.id, request.status
        )))
    }
}

async fn session_for(
    state: &AppState,
    session: &SessionContext,
    request_id: Uuid,
) -> Result<SharedApprovalSession, PortalError> {
    require_registrar(session)?;
    Ok(state.approvals.get(session, request_id).await?)
}

/// Open an approval session and show page 1
#[utoipa::path(
    post,
    path = "/api/approvals/{id}",
    tag = "Approval",
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "First page of the document", body = PageView),
        (status = 404, description = "Request not found", body = crate::ErrorResponse),
        (status = 409, description = "Not approved yet, or held by another staff member", body = crate::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn open_session(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, PortalError> {
    require_registrar(&session)?;
    let request_id = path.into_inner();

    if let Some(existing) = state.approvals.check_available(&session, request_id).await? {
        let refetch = {
            let open = existing.lock();
            open.student()
                .needs_refetch()
                .then(|| open.request().student_id)
        };
        if let Some(student_id) = refetch {
            let student = state.aggregator.aggregate(&session, student_id).await;
            existing.lock().set_student(student);
        }
        let view = existing.lock().view(&state.pagination);
        return Ok(HttpResponse::Ok().json(view));
    }

    let request = state.lifecycle.get(&session, request_id).await?;
    ensure_printable(&request)?;

    let student = state.aggregator.aggregate(&session, request.student_id).await;
    if student.needs_refetch() {
        log::warn!(
            "request {} opened with unreadable records: {:?}",
            request_id,
            student.gaps
        );
    }
    let fresh = ApprovalSession::new(&session, request, student, Utc::now().date_naive());
    let shared = state.approvals.open(&session, request_id, fresh).await?;

    let view = shared.lock().view(&state.pagination);
    Ok(HttpResponse::Ok().json(view))
}

/// Switch to another page of the document
#[utoipa::path(
    get,
    path = "/api/approvals/{id}/pages/{page}",
    tag = "Approval",
    params(
        ("id" = Uuid, Path, description = "Request ID"),
        ("page" = u16, Path, description = "Page number; clamped to the document's range")
    ),
    responses(
        (status = 200, description = "Requested page", body = PageView),
        (status = 400, description = "Unsaved edits on the current page", body = crate::ErrorResponse),
        (status = 404, description = "No open session", body = crate::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn switch_page(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<(Uuid, u16)>,
) -> Result<HttpResponse, PortalError> {
    let (request_id, page) = path.into_inner();
    let shared = session_for(&state, &session, request_id).await?;
    let page = u8::try_from(page).unwrap_or(u8::MAX);
    let view = shared.lock().switch_page(&state.pagination, page)?;
    Ok(HttpResponse::Ok().json(view))
}

/// Enter edit mode on the current page
#[utoipa::path(
    post,
    path = "/api/approvals/{id}/edit",
    tag = "Approval",
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Editable page", body = EditView),
        (status = 404, description = "No open session", body = crate::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn begin_edit(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, PortalError> {
    let shared = session_for(&state, &session, path.into_inner()).await?;
    let view = shared.lock().begin_edit(&state.pagination);
    Ok(HttpResponse::Ok().json(view))
}

/// Apply a formatting command to a selection
#[utoipa::path(
    post,
    path = "/api/approvals/{id}/edit/format",
    tag = "Approval",
    params(("id" = Uuid, Path, description = "Request ID")),
    request_body = FormatRequest,
    responses(
        (status = 200, description = "Page after formatting, with the selection restored", body = EditView),
        (status = 400, description = "Not in edit mode or invalid command", body = crate::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn format_selection(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    body: web::Json<FormatRequest>,
) -> Result<HttpResponse, PortalError> {
    let command = body.command()?;
    let shared = session_for(&state, &session, path.into_inner()).await?;
    let view = shared.lock().format(command, body.selection)?;
    Ok(HttpResponse::Ok().json(view))
}

/// Replace the selected text
#[utoipa::path(
    post,
    path = "/api/approvals/{id}/edit/text",
    tag = "Approval",
    params(("id" = Uuid, Path, description = "Request ID")),
    request_body = TextRequest,
    responses(
        (status = 200, description = "Page after the edit", body = EditView),
        (status = 400, description = "Not in edit mode", body = crate::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn replace_text(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    body: web::Json<TextRequest>,
) -> Result<HttpResponse, PortalError> {
    let shared = session_for(&state, &session, path.into_inner()).await?;
    let view = shared.lock().replace_text(body.selection, &body.text)?;
    Ok(HttpResponse::Ok().json(view))
}

/// Leave edit mode and keep the edited page
#[utoipa::path(
    post,
    path = "/api/approvals/{id}/edit/save",
    tag = "Approval",
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Saved page, served from its snapshot", body = PageView),
        (status = 400, description = "Not in edit mode", body = crate::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn save_edit(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, PortalError> {
    let request_id = path.into_inner();
    let shared = session_for(&state, &session, request_id).await?;
    let view = shared.lock().save_edit(&state.pagination)?;
    log::info!(
        "page {} of request {} saved by {}",
        view.page,
        request_id,
        session.display_name()
    );
    Ok(HttpResponse::Ok().json(view))
}

/// Discard the current page's edits and render it again
#[utoipa::path(
    post,
    path = "/api/approvals/{id}/regenerate",
    tag = "Approval",
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Freshly generated page", body = PageView),
        (status = 404, description = "No open session", body = crate::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn regenerate(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, PortalError> {
    let shared = session_for(&state, &session, path.into_inner()).await?;
    let view = shared.lock().regenerate(&state.pagination);
    Ok(HttpResponse::Ok().json(view))
}

/// Compile the print document. The first print marks the request ready for pickup.
#[utoipa::path(
    post,
    path = "/api/approvals/{id}/print",
    tag = "Approval",
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Self-contained HTML print document", body = String, content_type = "text/html"),
        (status = 400, description = "Unsaved edits", body = crate::ErrorResponse),
        (status = 409, description = "Request is not printable", body = crate::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn print_document(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, PortalError> {
    let request_id = path.into_inner();
    let shared = session_for(&state, &session, request_id).await?;

    let request = state.lifecycle.get(&session, request_id).await?;
    ensure_printable(&request)?;

    let document = {
        let mut guard = shared.lock();
        guard.set_request(request);
        guard.compile(&state.pagination, &state.print)?
    };

    let outcome = state.lifecycle.mark_printed(&session, request_id).await?;
    let reprint = outcome.is_reprint();
    metrics::record_print(reprint);
    if let Some(updated) = outcome.request() {
        shared.lock().set_request(updated.clone());
    }
    log::info!(
        "{} of request {} compiled by {} ({} pages)",
        if reprint { "reprint" } else { "print" },
        request_id,
        session.display_name(),
        document.page_count
    );

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .insert_header((PRINT_KIND_HEADER, if reprint { "reprint" } else { "first" }))
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", document.filename),
        ))
        .body(document.html))
}

/// End the session and discard its snapshots
#[utoipa::path(
    delete,
    path = "/api/approvals/{id}",
    tag = "Approval",
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 204, description = "Session closed"),
        (status = 404, description = "No open session", body = crate::ErrorResponse),
        (status = 409, description = "Held by another staff member", body = crate::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn close_session(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, PortalError> {
    require_registrar(&session)?;
    state.approvals.close(&session, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/approvals/{id}")
            .route(web::post().to(open_session))
            .route(web::delete().to(close_session)),
    )
    .service(web::resource("/approvals/{id}/pages/{page}").route(web::get().to(switch_page)))
    .service(web::resource("/approvals/{id}/edit").route(web::post().to(begin_edit)))
    .service(web::resource("/approvals/{id}/edit/format").route(web::post().to(format_selection)))
    .service(web::resource("/approvals/{id}/edit/text").route(web::post().to(replace_text)))
    .service(web::resource("/approvals/{id}/edit/save").route(web::post().to(save_edit)))
    .service(web::resource("/approvals/{id}/regenerate").route(web::post().to(regenerate)))
    .service(web::resource("/approvals/{id}/print").route(web::post().to(print_document)));
}
