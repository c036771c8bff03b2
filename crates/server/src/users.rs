//! User endpoints

use api_types::user::{UserNew, UserStats, UserView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};

pub(crate) fn user_view(user: engine::User) -> UserView {
    UserView {
        id: user.id,
        name: user.name,
        email: user.email,
        created_at: user.created_at,
    }
}

pub async fn user_new(
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let user = state
        .engine
        .register_user(&payload.name, &payload.email)
        .await?;
    Ok((StatusCode::CREATED, Json(user_view(user))))
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<UserView>>, ServerError> {
    let users = state.engine.users().await?;
    Ok(Json(users.into_iter().map(user_view).collect()))
}

pub async fn stats(
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserStats>, ServerError> {
    let stats = state.engine.user_stats(user_id).await?;
    Ok(Json(UserStats {
        total_you_owe_minor: stats.total_you_owe.cents(),
        total_owed_to_you_minor: stats.total_owed_to_you.cents(),
        active_groups: stats.active_groups,
    }))
}
