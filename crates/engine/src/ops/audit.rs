use sea_orm::{QueryOrder, QuerySelect, prelude::*};

use crate::{AuditEvent, ResultEngine, audit_logs};

use super::Engine;

impl Engine {
    /// Persisted audit events, newest first.
    ///
    /// Only events written by [`DbAuditSink`](crate::DbAuditSink) are
    /// stored; with the log sink this is always empty.
    pub async fn recent_audit_events(&self, limit: u64) -> ResultEngine<Vec<AuditEvent>> {
        audit_logs::Entity::find()
            .order_by_desc(audit_logs::Column::CreatedAt)
            .order_by_desc(audit_logs::Column::Id)
            .limit(limit)
            .all(&self.database)
            .await?
            .into_iter()
            .map(AuditEvent::try_from)
            .collect()
    }
}
