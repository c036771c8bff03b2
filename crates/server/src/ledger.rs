//! Ledger entry endpoints

use api_types::ledger::{EntryList, EntryUpdate, EntryView};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use axum_extra::TypedHeader;
use engine::Scope;

use crate::{
    ServerError,
    server::{ActorHeader, ServerState},
};

fn entry_view(entry: engine::LedgerEntry) -> EntryView {
    EntryView {
        id: entry.id,
        group_id: entry.group_id,
        expense_id: entry.expense_id,
        settlement_id: entry.settlement_id,
        debtor_id: entry.debtor_id,
        creditor_id: entry.creditor_id,
        amount_minor: entry.amount.cents(),
        settled: entry.settled,
        created_at: entry.created_at,
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<EntryList>,
) -> Result<Json<Vec<EntryView>>, ServerError> {
    let entries = state
        .engine
        .ledger_entries(
            Scope::from_group(query.group_id),
            query.include_settled.unwrap_or(false),
        )
        .await?;
    Ok(Json(entries.into_iter().map(entry_view).collect()))
}

pub async fn update(
    actor: Option<TypedHeader<ActorHeader>>,
    State(state): State<ServerState>,
    Path(entry_id): Path<i64>,
    Json(payload): Json<EntryUpdate>,
) -> Result<Json<EntryView>, ServerError> {
    let actor_id = actor.map(|TypedHeader(ActorHeader(id))| id);
    let entry = state
        .engine
        .set_entry_settled(entry_id, payload.settled, actor_id)
        .await?;
    Ok(Json(entry_view(entry)))
}
