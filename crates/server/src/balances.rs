//! Balance endpoint

use api_types::balance::{BalanceView, BalancesResponse, ScopeQuery};
use axum::{
    Json,
    extract::{Query, State},
};
use engine::Scope;

use crate::{ServerError, server::ServerState};

pub async fn get(
    State(state): State<ServerState>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<BalancesResponse>, ServerError> {
    let balances = state
        .engine
        .compute_balances(Scope::from_group(query.group_id))
        .await?;
    let names = state.engine.name_directory(balances.keys().copied()).await?;

    Ok(Json(BalancesResponse {
        group_id: query.group_id,
        balances: balances
            .into_iter()
            .map(|(user_id, balance)| BalanceView {
                user_id,
                name: names.name(user_id),
                balance_minor: balance.cents(),
            })
            .collect(),
    }))
}
