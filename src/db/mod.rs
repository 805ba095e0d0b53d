//! Database module - AppState and the Postgres-backed collaborators
//!
//! - `requests` - document request repository
//! - `students` - student records read from the local tables

mod requests;
mod students;

pub use requests::PgRequestRepository;
pub use students::PgStudentRecords;

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::approval::ApprovalSessionStore;
use crate::config::AppConfig;
use crate::documents::{PaginationController, PrintCompiler, TemplateResolver};
use crate::records::{HttpStudentRecords, StudentRecordAggregator, StudentRecordSource};
use crate::requests::{LifecycleController, LogNotifier, Notifier, RequestRepository};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pool: Option<PgPool>,
    pub http_client: reqwest::Client,
    pub lifecycle: Arc<LifecycleController>,
    pub aggregator: Arc<StudentRecordAggregator>,
    pub pagination: Arc<PaginationController>,
    pub print: Arc<PrintCompiler>,
    pub approvals: ApprovalSessionStore,
}

fn build_http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .pool_idle_timeout(Duration::from_secs(900))
        .timeout(Duration::from_secs(30))
        .user_agent("registrar-portal-server/1.0")
        .build()
}

impl AppState {
    /// Connect to Postgres, run migrations and wire the collaborators.
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let database_url = config.require_database_url()?.to_string();

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(20)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(900))
            .max_lifetime(Duration::from_secs(1800))
            .connect(&database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        log::info!("Database migrations applied");

        let http_client = build_http_client()?;

        let records: Arc<dyn StudentRecordSource> = match &config.student_records_url {
            Some(url) => {
                log::info!("Using student records service at {}", url);
                Arc::new(HttpStudentRecords::new(http_client.clone(), url.clone()))
            }
            None => {
                log::info!("STUDENT_RECORDS_URL not set, reading student records from Postgres");
                Arc::new(PgStudentRecords::new(pool.clone()))
            }
        };
        let repository = Arc::new(PgRequestRepository::new(pool.clone()));

        let mut state = Self::from_parts(config, repository, records, Arc::new(LogNotifier))?;
        state.pool = Some(pool);
        state.http_client = http_client;
        Ok(state)
    }

    /// Assemble state around supplied collaborators. Used by tests and by [`AppState::new`].
    pub fn from_parts(
        config: AppConfig,
        repository: Arc<dyn RequestRepository>,
        records: Arc<dyn StudentRecordSource>,
        notifier: Arc<dyn Notifier>,
    ) -> anyhow::Result<Self> {
        let resolver = Arc::new(TemplateResolver::new(config.school.clone()));
        let approvals = ApprovalSessionStore::new(config.approval_session_idle);
        let print = Arc::new(PrintCompiler::new(config.public_base_url.clone()));

        Ok(AppState {
            config: Arc::new(config),
            pool: None,
            http_client: build_http_client()?,
            lifecycle: Arc::new(LifecycleController::new(repository, notifier)),
            aggregator: Arc::new(StudentRecordAggregator::new(records)),
            pagination: Arc::new(PaginationController::new(resolver)),
            print,
            approvals,
        })
    }
}
