//! Audit recording and audit-trail listing.
//!
//! Recording is best-effort: a failed append is counted and logged but never
//! surfaces to the caller, so an audit outage cannot block login or secret
//! access.

use crate::db::AuditStore;
use crate::error::Result;
use crate::metrics::AUDIT_WRITE_FAILURES;
use crate::models::{AuditAction, AuditDetail, AuditEvent, NewAuditEvent, RequestOrigin};
use crate::services::access::{AccessGate, Capability};
use std::sync::Arc;
use uuid::Uuid;

const DEFAULT_LIST_LIMIT: i64 = 100;

/// Appends audit events on behalf of the other services.
#[derive(Clone)]
pub struct AuditRecorder {
    store: Arc<dyn AuditStore>,
}

impl AuditRecorder {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Record one event. Infallible from the caller's point of view; append
    /// failures increment a counter and emit a warning.
    pub async fn record(
        &self,
        actor_id: Option<Uuid>,
        action: AuditAction,
        resource_id: Option<Uuid>,
        detail: AuditDetail,
        origin: &RequestOrigin,
    ) {
        if action.exempt_from_recording() {
            return;
        }

        let event = NewAuditEvent {
            actor_id,
            action,
            resource_id,
            detail,
            origin: origin.clone(),
        };

        if let Err(err) = self.store.append(event).await {
            AUDIT_WRITE_FAILURES.inc();
            tracing::warn!(
                action = action.as_str(),
                error = %err,
                "failed to append audit event"
            );
        }
    }
}

/// Read side of the audit trail.
#[derive(Clone)]
pub struct AuditService {
    store: Arc<dyn AuditStore>,
    gate: AccessGate,
}

impl AuditService {
    pub fn new(store: Arc<dyn AuditStore>, gate: AccessGate) -> Self {
        Self { store, gate }
    }

    /// List audit events visible to the actor: admins see the full trail,
    /// everyone else sees only their own. Listing is not itself recorded.
    pub async fn list(
        &self,
        actor: Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<AuditEvent>> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, 1000);
        let offset = offset.unwrap_or(0).max(0);

        if self.gate.resolve(actor).await.contains(Capability::ViewAllAudit) {
            self.store.list_all(limit, offset).await
        } else {
            self.store.list_for_actor(actor, limit, offset).await
        }
    }
}
