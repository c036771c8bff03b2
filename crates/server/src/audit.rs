//! Audit trail endpoint

use api_types::audit::{AuditQuery, AuditView};
use axum::{
    Json,
    extract::{Query, State},
};

use crate::{ServerError, server::ServerState};

const DEFAULT_LIMIT: u64 = 50;
const MAX_LIMIT: u64 = 500;

pub async fn recent(
    State(state): State<ServerState>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<Vec<AuditView>>, ServerError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let events = state.engine.recent_audit_events(limit).await?;

    Ok(Json(
        events
            .into_iter()
            .map(|event| AuditView {
                action: event.action.as_str().to_string(),
                entity: event.entity.as_str().to_string(),
                entity_id: event.entity_id,
                actor_id: event.actor_id,
                details: event.details,
                timestamp: event.timestamp,
            })
            .collect(),
    ))
}
