//! Expense endpoints

use api_types::expense::{ExpenseList, ExpenseNew, ExpenseView, ShareView};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use axum_extra::TypedHeader;
use engine::{ExpenseCmd, MoneyCents, ShareCmd};

use crate::{
    ServerError,
    server::{ActorHeader, ServerState},
};

fn expense_view(detail: engine::ExpenseDetail) -> ExpenseView {
    ExpenseView {
        id: detail.expense.id,
        group_id: detail.expense.group_id,
        payer_id: detail.payer.id,
        payer_name: detail.payer.name,
        description: detail.expense.description,
        amount_minor: detail.expense.amount.cents(),
        created_at: detail.expense.created_at,
        shares: detail
            .shares
            .into_iter()
            .map(|share| ShareView {
                participant_id: share.participant.id,
                participant_name: share.participant.name,
                amount_minor: share.amount.cents(),
            })
            .collect(),
    }
}

pub async fn expense_new(
    actor: Option<TypedHeader<ActorHeader>>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let payer_id = payload
        .payer_id
        .or(actor.map(|TypedHeader(ActorHeader(id))| id))
        .ok_or_else(|| ServerError::Generic("payer_id or x-actor-id is required".to_string()))?;
    if !payload.shares.is_empty() && !payload.split_between.is_empty() {
        return Err(ServerError::Generic(
            "shares and split_between are mutually exclusive".to_string(),
        ));
    }

    let cmd = ExpenseCmd::new(
        payload.group_id,
        payer_id,
        payload.description,
        MoneyCents::new(payload.amount_minor),
    );
    let cmd = if payload.split_between.is_empty() {
        cmd.shares(
            payload
                .shares
                .into_iter()
                .map(|share| ShareCmd::new(share.participant_id, MoneyCents::new(share.amount_minor))),
        )
    } else {
        cmd.split_evenly(&payload.split_between)
    };

    let detail = state.engine.record_expense(cmd).await?;
    Ok((StatusCode::CREATED, Json(expense_view(detail))))
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ExpenseList>,
) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let expenses = state.engine.group_expenses(query.group_id).await?;
    Ok(Json(expenses.into_iter().map(expense_view).collect()))
}
