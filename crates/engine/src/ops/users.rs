use std::collections::{BTreeSet, HashSet};

use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, prelude::*};
use serde_json::json;

use crate::{
    AuditAction, AuditEvent, EngineError, EntityKind, MoneyCents, NameDirectory, ResultEngine,
    User, UserStats, group_members, ledger_entries, users,
};

use super::{Engine, normalize_email, normalize_required_name};

impl Engine {
    /// Registers a new user. E-mails are unique (case-insensitive).
    pub async fn register_user(&self, name: &str, email: &str) -> ResultEngine<User> {
        let name = normalize_required_name(name, "user")?;
        let email = normalize_email(email)?;

        let exists = users::Entity::find()
            .filter(users::Column::Email.eq(email.clone()))
            .one(&self.database)
            .await?
            .is_some();
        if exists {
            return Err(EngineError::ExistingKey(email));
        }

        let user: User = users::ActiveModel {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(name),
            email: ActiveValue::Set(email),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(&self.database)
        .await?
        .into();

        tracing::info!(user_id = user.id, "user registered");
        self.audit(AuditEvent::new(
            AuditAction::UserRegistered,
            EntityKind::User,
            user.id,
            Some(user.id),
            json!({ "name": user.name, "email": user.email }),
        ));
        Ok(user)
    }

    pub async fn users(&self) -> ResultEngine<Vec<User>> {
        let models = users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(User::from).collect())
    }

    pub async fn user(&self, user_id: i64) -> ResultEngine<User> {
        self.require_user(&self.database, user_id)
            .await
            .map(User::from)
    }

    pub async fn user_by_email(&self, email: &str) -> ResultEngine<User> {
        let email = normalize_email(email)?;
        users::Entity::find()
            .filter(users::Column::Email.eq(email.clone()))
            .one(&self.database)
            .await?
            .map(User::from)
            .ok_or(EngineError::KeyNotFound(email))
    }

    /// Loads display names for `ids`. Unknown ids fall back to `User {id}`.
    pub async fn name_directory(
        &self,
        ids: impl IntoIterator<Item = i64>,
    ) -> ResultEngine<NameDirectory> {
        let ids: BTreeSet<i64> = ids.into_iter().collect();
        if ids.is_empty() {
            return Ok(NameDirectory::default());
        }
        let models = users::Entity::find()
            .filter(users::Column::Id.is_in(ids))
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(|m| (m.id, m.name)).collect())
    }

    /// Totals of the user's unsettled debts and credits across all groups.
    pub async fn user_stats(&self, user_id: i64) -> ResultEngine<UserStats> {
        self.require_user(&self.database, user_id).await?;

        let open = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::Settled.eq(false))
            .filter(
                ledger_entries::Column::DebtorId
                    .eq(user_id)
                    .or(ledger_entries::Column::CreditorId.eq(user_id)),
            )
            .all(&self.database)
            .await?;

        let (owe, owed): (Vec<_>, Vec<_>) = open
            .iter()
            .partition(|entry| entry.debtor_id == user_id);
        let total = |entries: Vec<&ledger_entries::Model>| {
            MoneyCents::checked_sum(entries.iter().map(|e| MoneyCents::new(e.amount_minor)))
                .ok_or_else(|| {
                    EngineError::InvalidAmount(format!("totals of user {user_id} overflow"))
                })
        };
        let total_you_owe = total(owe)?;
        let total_owed_to_you = total(owed)?;

        let groups: HashSet<i64> = group_members::Entity::find()
            .filter(group_members::Column::UserId.eq(user_id))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|m| m.group_id)
            .collect();

        Ok(UserStats {
            total_you_owe,
            total_owed_to_you,
            active_groups: groups.len() as u64,
        })
    }
}
