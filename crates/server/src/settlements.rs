//! Settlement endpoints: planning, graph and recording

use api_types::{
    balance::ScopeQuery,
    settlement::{
        GraphLinkView, GraphNodeView, GraphView, SettlementNew, SettlementView, SuggestionView,
    },
};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use axum_extra::TypedHeader;
use engine::{MoneyCents, Scope, SettlementCmd};

use crate::{
    ServerError,
    server::{ActorHeader, ServerState},
};

fn settlement_view(settlement: engine::Settlement) -> SettlementView {
    SettlementView {
        id: settlement.id,
        payer_id: settlement.payer_id,
        payee_id: settlement.payee_id,
        amount_minor: settlement.amount.cents(),
        group_id: settlement.group_id,
        created_at: settlement.created_at,
    }
}

pub async fn simplify(
    State(state): State<ServerState>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<Vec<SuggestionView>>, ServerError> {
    let scope = Scope::from_group(query.group_id);
    let plan = state.engine.plan_settlements(scope).await?;
    let names = state
        .engine
        .name_directory(plan.iter().flat_map(|s| [s.payer_id, s.payee_id]))
        .await?;

    Ok(Json(
        plan.into_iter()
            .map(|suggestion| SuggestionView {
                group_id: scope.group_id(),
                payer_id: suggestion.payer_id,
                payer_name: names.name(suggestion.payer_id),
                payee_id: suggestion.payee_id,
                payee_name: names.name(suggestion.payee_id),
                amount_minor: suggestion.amount.cents(),
            })
            .collect(),
    ))
}

pub async fn graph(
    State(state): State<ServerState>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<GraphView>, ServerError> {
    let graph = state
        .engine
        .debt_graph(Scope::from_group(query.group_id))
        .await?;

    Ok(Json(GraphView {
        nodes: graph
            .nodes
            .into_iter()
            .map(|node| GraphNodeView {
                id: node.id,
                name: node.name,
            })
            .collect(),
        links: graph
            .links
            .into_iter()
            .map(|link| GraphLinkView {
                source: link.source,
                target: link.target,
                amount_minor: link.amount.cents(),
            })
            .collect(),
    }))
}

pub async fn settlement_new(
    actor: Option<TypedHeader<ActorHeader>>,
    State(state): State<ServerState>,
    Json(payload): Json<SettlementNew>,
) -> Result<(StatusCode, Json<SettlementView>), ServerError> {
    let payer_id = payload
        .payer_id
        .or(actor.map(|TypedHeader(ActorHeader(id))| id))
        .ok_or_else(|| ServerError::Generic("payer_id or x-actor-id is required".to_string()))?;

    let mut cmd = SettlementCmd::new(payer_id, payload.payee_id, MoneyCents::new(payload.amount_minor));
    if let Some(group_id) = payload.group_id {
        cmd = cmd.group_id(group_id);
    }

    let settlement = state.engine.record_settlement(cmd).await?;
    Ok((StatusCode::CREATED, Json(settlement_view(settlement))))
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<Vec<SettlementView>>, ServerError> {
    let settlements = state.engine.settlements(query.group_id).await?;
    Ok(Json(settlements.into_iter().map(settlement_view).collect()))
}
