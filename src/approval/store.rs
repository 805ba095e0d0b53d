//! Open approval sessions, one per request.
//!
//! A session belongs to the staff member who opened it; anyone else gets a
//! conflict until it is closed or idles out of the cache.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use parking_lot::Mutex;
use uuid::Uuid;

use super::session::{ApprovalError, ApprovalSession};
use crate::session::SessionContext;

pub type SharedApprovalSession = Arc<Mutex<ApprovalSession>>;

const MAX_OPEN_SESSIONS: u64 = 1_000;

#[derive(Clone)]
pub struct ApprovalSessionStore {
    sessions: Cache<Uuid, SharedApprovalSession>,
}

fn check_owner(
    shared: &SharedApprovalSession,
    ctx: &SessionContext,
    request_id: Uuid,
) -> Result<(), ApprovalError> {
    let session = shared.lock();
    if session.owner_id() == ctx.user_id() {
        Ok(())
    } else {
        Err(ApprovalError::Conflict {
            request_id,
            holder: session.owner_name().to_string(),
        })
    }
}

impl ApprovalSessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        let sessions = Cache::builder()
            .time_to_idle(idle_timeout)
            .max_capacity(MAX_OPEN_SESSIONS)
            .eviction_listener(|request_id, _, cause| {
                log::info!("approval session for request {} ended ({:?})", request_id, cause);
            })
            .build();
        Self { sessions }
    }

    /// Fails with a conflict when someone else holds the request. Returns
    /// the caller's own session if one is already open.
    pub async fn check_available(
        &self,
        ctx: &SessionContext,
        request_id: Uuid,
    ) -> Result<Option<SharedApprovalSession>, ApprovalError> {
        match self.sessions.get(&request_id).await {
            Some(existing) => {
                check_owner(&existing, ctx, request_id)?;
                Ok(Some(existing))
            }
            None => Ok(None),
        }
    }

    /// Store a newly built session unless another one won the race.
    pub async fn open(
        &self,
        ctx: &SessionContext,
        request_id: Uuid,
        session: ApprovalSession,
    ) -> Result<SharedApprovalSession, ApprovalError> {
        let entry = self
            .sessions
            .entry(request_id)
            .or_insert_with(async move { Arc::new(Mutex::new(session)) })
            .await;
        let fresh = entry.is_fresh();
        let shared = entry.into_value();
        if fresh {
            log::info!(
                "approval session for request {} opened by {}",
                request_id,
                ctx.display_name()
            );
        } else {
            check_owner(&shared, ctx, request_id)?;
        }
        Ok(shared)
    }

    pub async fn get(
        &self,
        ctx: &SessionContext,
        request_id: Uuid,
    ) -> Result<SharedApprovalSession, ApprovalError> {
        self.check_available(ctx, request_id)
            .await?
            .ok_or(ApprovalError::NotFound(request_id))
    }

    /// End the caller's session; its snapshots are discarded with it.
    pub async fn close(&self, ctx: &SessionContext, request_id: Uuid) -> Result<(), ApprovalError> {
        self.get(ctx, request_id).await?;
        self.sessions.invalidate(&request_id).await;
        Ok(())
    }
}
