//! Group and membership endpoints

use api_types::{
    group::{GroupList, GroupNew, GroupView, MemberAdd, MemberRole, MemberView},
    user::UserView,
};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use axum_extra::TypedHeader;

use crate::{
    ServerError,
    server::{ActorHeader, ServerState},
    users::user_view,
};

fn map_role(role: engine::MemberRole) -> MemberRole {
    match role {
        engine::MemberRole::Admin => MemberRole::Admin,
        engine::MemberRole::Member => MemberRole::Member,
    }
}

fn group_view(detail: engine::GroupDetail) -> GroupView {
    GroupView {
        id: detail.group.id,
        name: detail.group.name,
        created_by: detail.group.created_by,
        created_at: detail.group.created_at,
        members: detail
            .members
            .into_iter()
            .map(|member| MemberView {
                user_id: member.user_id,
                name: member.name,
                email: member.email,
                role: map_role(member.role),
            })
            .collect(),
    }
}

pub async fn group_new(
    actor: Option<TypedHeader<ActorHeader>>,
    State(state): State<ServerState>,
    Json(payload): Json<GroupNew>,
) -> Result<(StatusCode, Json<GroupView>), ServerError> {
    let creator_id = payload
        .created_by
        .or(actor.map(|TypedHeader(ActorHeader(id))| id))
        .ok_or_else(|| ServerError::Generic("created_by or x-actor-id is required".to_string()))?;

    let group = state.engine.create_group(&payload.name, creator_id).await?;
    let detail = state.engine.group(group.id).await?;
    Ok((StatusCode::CREATED, Json(group_view(detail))))
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<GroupList>,
) -> Result<Json<Vec<GroupView>>, ServerError> {
    let groups = state.engine.user_groups(query.user_id).await?;
    Ok(Json(groups.into_iter().map(group_view).collect()))
}

pub async fn add_member(
    actor: Option<TypedHeader<ActorHeader>>,
    State(state): State<ServerState>,
    Json(payload): Json<MemberAdd>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let actor_id = actor.map(|TypedHeader(ActorHeader(id))| id);
    let user = state
        .engine
        .add_member(payload.group_id, &payload.email, actor_id)
        .await?;
    Ok((StatusCode::CREATED, Json(user_view(user))))
}
