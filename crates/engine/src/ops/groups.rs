use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use serde_json::json;

use crate::{
    AuditAction, AuditEvent, EngineError, EntityKind, Group, GroupDetail, GroupMember, MemberRole,
    ResultEngine, User, group_members, groups, users,
};

use super::{Engine, normalize_email, normalize_required_name, with_tx};

impl Engine {
    /// Creates a group; the creator joins it as `admin`.
    pub async fn create_group(&self, name: &str, creator_id: i64) -> ResultEngine<Group> {
        let name = normalize_required_name(name, "group")?;

        let group: Group = with_tx!(self, |db_tx| {
            self.require_user(&db_tx, creator_id).await?;
            let now = Utc::now();
            let group = groups::ActiveModel {
                id: ActiveValue::NotSet,
                name: ActiveValue::Set(name),
                created_by: ActiveValue::Set(creator_id),
                created_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            group_members::ActiveModel {
                group_id: ActiveValue::Set(group.id),
                user_id: ActiveValue::Set(creator_id),
                role: ActiveValue::Set(MemberRole::Admin.as_str().to_string()),
                joined_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            Ok::<_, EngineError>(Group::from(group))
        })?;

        tracing::info!(group_id = group.id, creator_id, "group created");
        self.audit(AuditEvent::new(
            AuditAction::GroupCreated,
            EntityKind::Group,
            group.id,
            Some(creator_id),
            json!({ "name": group.name }),
        ));
        Ok(group)
    }

    /// Adds the user registered under `email` to the group as `member`.
    pub async fn add_member(
        &self,
        group_id: i64,
        email: &str,
        actor_id: Option<i64>,
    ) -> ResultEngine<User> {
        let email = normalize_email(email)?;

        let user: User = with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id).await?;
            let user = users::Entity::find()
                .filter(users::Column::Email.eq(email.clone()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(email.clone()))?;
            if self.is_member(&db_tx, group_id, user.id).await? {
                return Err(EngineError::ExistingKey(format!(
                    "user {} in group {group_id}",
                    user.id
                )));
            }
            group_members::ActiveModel {
                group_id: ActiveValue::Set(group_id),
                user_id: ActiveValue::Set(user.id),
                role: ActiveValue::Set(MemberRole::Member.as_str().to_string()),
                joined_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            Ok::<_, EngineError>(User::from(user))
        })?;

        tracing::info!(group_id, user_id = user.id, "member added");
        self.audit(AuditEvent::new(
            AuditAction::MemberAdded,
            EntityKind::Group,
            group_id,
            actor_id,
            json!({ "user_id": user.id, "email": user.email }),
        ));
        Ok(user)
    }

    pub async fn group(&self, group_id: i64) -> ResultEngine<GroupDetail> {
        let group = self.require_group(&self.database, group_id).await?;
        let members = self.group_members(&self.database, group_id).await?;
        Ok(GroupDetail {
            group: group.into(),
            members,
        })
    }

    /// Groups the user belongs to, oldest first, with their members.
    pub async fn user_groups(&self, user_id: i64) -> ResultEngine<Vec<GroupDetail>> {
        self.require_user(&self.database, user_id).await?;

        let group_ids: Vec<i64> = group_members::Entity::find()
            .filter(group_members::Column::UserId.eq(user_id))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|m| m.group_id)
            .collect();
        if group_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = groups::Entity::find()
            .filter(groups::Column::Id.is_in(group_ids))
            .order_by_asc(groups::Column::Id)
            .all(&self.database)
            .await?;

        let mut details = Vec::with_capacity(models.len());
        for model in models {
            let members = self.group_members(&self.database, model.id).await?;
            details.push(GroupDetail {
                group: model.into(),
                members,
            });
        }
        Ok(details)
    }

    async fn group_members<C: ConnectionTrait>(
        &self,
        db: &C,
        group_id: i64,
    ) -> ResultEngine<Vec<GroupMember>> {
        let memberships = group_members::Entity::find()
            .filter(group_members::Column::GroupId.eq(group_id))
            .order_by_asc(group_members::Column::JoinedAt)
            .order_by_asc(group_members::Column::UserId)
            .all(db)
            .await?;

        let user_ids: Vec<i64> = memberships.iter().map(|m| m.user_id).collect();
        let mut users_by_id: HashMap<i64, users::Model> = users::Entity::find()
            .filter(users::Column::Id.is_in(user_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        memberships
            .into_iter()
            .map(|membership| {
                let user = users_by_id.remove(&membership.user_id).ok_or_else(|| {
                    EngineError::KeyNotFound(format!("user {}", membership.user_id))
                })?;
                Ok(GroupMember {
                    user_id: user.id,
                    name: user.name,
                    email: user.email,
                    role: MemberRole::try_from(membership.role.as_str())?,
                    joined_at: membership.joined_at,
                })
            })
            .collect()
    }
}
