use sea_orm::{ConnectionTrait, QueryFilter, prelude::*};

use crate::{EngineError, ResultEngine, group_members, groups, users};

use super::Engine;

impl Engine {
    pub(super) async fn require_user<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: i64,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("user {user_id}")))
    }

    pub(super) async fn require_group<C: ConnectionTrait>(
        &self,
        db: &C,
        group_id: i64,
    ) -> ResultEngine<groups::Model> {
        groups::Entity::find_by_id(group_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("group {group_id}")))
    }

    pub(super) async fn is_member<C: ConnectionTrait>(
        &self,
        db: &C,
        group_id: i64,
        user_id: i64,
    ) -> ResultEngine<bool> {
        group_members::Entity::find()
            .filter(group_members::Column::GroupId.eq(group_id))
            .filter(group_members::Column::UserId.eq(user_id))
            .one(db)
            .await
            .map(|model| model.is_some())
            .map_err(Into::into)
    }

    /// Fails with `KeyNotFound` unless every id in `user_ids` belongs to the group.
    pub(super) async fn require_members<C: ConnectionTrait>(
        &self,
        db: &C,
        group_id: i64,
        user_ids: impl IntoIterator<Item = i64>,
    ) -> ResultEngine<()> {
        for user_id in user_ids {
            if !self.is_member(db, group_id, user_id).await? {
                return Err(EngineError::KeyNotFound(format!(
                    "user {user_id} in group {group_id}"
                )));
            }
        }
        Ok(())
    }
}
