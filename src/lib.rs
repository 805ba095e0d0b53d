use actix_cors::Cors;
use actix_files::Files;
use actix_web::middleware::{Compress, Logger};
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod approval;
pub mod config;
pub mod db;
pub mod documents;
pub mod error;
pub mod metrics;
pub mod overlay;
pub mod records;
pub mod requests;
pub mod session;
pub mod validation;

pub use crate::db::AppState;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::requests::handlers::list_document_types,
        crate::requests::handlers::list_requests,
        crate::requests::handlers::list_student_requests,
        crate::requests::handlers::create_request,
        crate::requests::handlers::get_request,
        crate::requests::handlers::forward_request,
        crate::requests::handlers::confirm_payment,
        crate::requests::handlers::approve_request,
        crate::requests::handlers::reject_request,
        crate::requests::handlers::claim_request,
        crate::requests::handlers::cancel_request,
        crate::approval::handlers::open_session,
        crate::approval::handlers::switch_page,
        crate::approval::handlers::begin_edit,
        crate::approval::handlers::format_selection,
        crate::approval::handlers::replace_text,
        crate::approval::handlers::save_edit,
        crate::approval::handlers::regenerate,
        crate::approval::handlers::print_document,
        crate::approval::handlers::close_session
    ),
    components(
        schemas(
            requests::DocumentRequest,
            requests::RequestStatus,
            requests::RequestView,
            requests::InitiatedBy,
            requests::CreateRequestPayload,
            requests::ForwardPayload,
            requests::RejectPayload,
            requests::handlers::DocumentTypeInfo,
            requests::handlers::TransitionResponse,
            documents::PageView,
            documents::PageSource,
            records::RecordGap,
            records::RecordKind,
            records::GapReason,
            approval::EditView,
            approval::handlers::FormatRequest,
            approval::handlers::TextRequest,
            overlay::InlineStyle,
            overlay::Alignment,
            overlay::Selection,
            session::Role,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Requests", description = "Document request lifecycle endpoints."),
        (name = "Approval", description = "Document review, editing and printing.")
    ),
    servers(
        (url = "http://127.0.0.1:8080", description = "Local server")
    )
)]
pub struct ApiDoc;

/// Mount every `/api` route. Shared by the server and the integration tests.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(requests::handlers::config)
            .configure(approval::handlers::config),
    );
}

pub async fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = config::AppConfig::from_env()?;
    let bind_address = config.bind_address.clone();
    let assets_dir = config.assets_dir.clone();
    let allowed_origins = config.cors_allowed_origins.clone();

    let app_state = match AppState::new(config).await {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            log::error!(
                "Failed to start. Please check DATABASE_URL in .env and ensure the database is running. Error: {}",
                e
            );
            return Err(e);
        }
    };

    let prometheus = PrometheusMetricsBuilder::new("registrar_portal_server")
        .endpoint("/metrics")
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create Prometheus metrics middleware: {}", e))?;

    log::info!("Starting server at http://{}", bind_address);

    HttpServer::new(move || {
        let cors = allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
            ])
            .expose_headers(vec![
                header::HeaderName::from_static("x-print-kind"),
                header::CONTENT_DISPOSITION,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(app_state.clone())
            .configure(configure_api)
            .route("/metrics/lifecycle", web::get().to(metrics::lifecycle_metrics))
            .service(Files::new("/assets", assets_dir.clone()))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind(bind_address.as_str())?
    .run()
    .await?;

    Ok(())
}
