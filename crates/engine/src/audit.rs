//! Audit trail of mutating operations.
//!
//! Every write the engine commits is reported to an [`AuditSink`] after the
//! storage transaction succeeded. Emission is fire-and-forget: a sink must
//! never block the caller and its failures are only logged.

use std::fmt;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection};
use serde::{Deserialize, Serialize};

use crate::{EngineError, audit_logs};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    UserRegistered,
    GroupCreated,
    MemberAdded,
    ExpenseAdded,
    SettlementRecorded,
    LedgerEntryUpdated,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UserRegistered => "USER_REGISTERED",
            Self::GroupCreated => "GROUP_CREATED",
            Self::MemberAdded => "MEMBER_ADDED",
            Self::ExpenseAdded => "EXPENSE_ADDED",
            Self::SettlementRecorded => "SETTLEMENT_RECORDED",
            Self::LedgerEntryUpdated => "LEDGER_ENTRY_UPDATED",
        }
    }
}

impl TryFrom<&str> for AuditAction {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "USER_REGISTERED" => Ok(Self::UserRegistered),
            "GROUP_CREATED" => Ok(Self::GroupCreated),
            "MEMBER_ADDED" => Ok(Self::MemberAdded),
            "EXPENSE_ADDED" => Ok(Self::ExpenseAdded),
            "SETTLEMENT_RECORDED" => Ok(Self::SettlementRecorded),
            "LEDGER_ENTRY_UPDATED" => Ok(Self::LedgerEntryUpdated),
            other => Err(EngineError::InvalidInput(format!(
                "invalid audit action: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    User,
    Group,
    Expense,
    Settlement,
    LedgerEntry,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Group => "GROUP",
            Self::Expense => "EXPENSE",
            Self::Settlement => "SETTLEMENT",
            Self::LedgerEntry => "LEDGER_ENTRY",
        }
    }
}

impl TryFrom<&str> for EntityKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "USER" => Ok(Self::User),
            "GROUP" => Ok(Self::Group),
            "EXPENSE" => Ok(Self::Expense),
            "SETTLEMENT" => Ok(Self::Settlement),
            "LEDGER_ENTRY" => Ok(Self::LedgerEntry),
            other => Err(EngineError::InvalidInput(format!(
                "invalid audit entity: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub action: AuditAction,
    pub entity: EntityKind,
    pub entity_id: i64,
    pub actor_id: Option<i64>,
    pub details: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(
        action: AuditAction,
        entity: EntityKind,
        entity_id: i64,
        actor_id: Option<i64>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            action,
            entity,
            entity_id,
            actor_id,
            details,
            timestamp: Utc::now(),
        }
    }
}

impl TryFrom<audit_logs::Model> for AuditEvent {
    type Error = EngineError;

    fn try_from(model: audit_logs::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            action: AuditAction::try_from(model.action.as_str())?,
            entity: EntityKind::try_from(model.entity.as_str())?,
            entity_id: model.entity_id,
            actor_id: model.actor_id,
            details: model.details,
            timestamp: model.created_at,
        })
    }
}

/// Receives audit events after the operation that produced them committed.
///
/// Implementations must return quickly and must not panic: anything slow
/// (I/O) belongs in a spawned task.
pub trait AuditSink: Send + Sync + fmt::Debug {
    fn emit(&self, event: AuditEvent);
}

/// Writes audit events as structured log lines. The default sink.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogAuditSink;

impl AuditSink for LogAuditSink {
    fn emit(&self, event: AuditEvent) {
        tracing::info!(
            action = event.action.as_str(),
            entity = event.entity.as_str(),
            entity_id = event.entity_id,
            actor_id = ?event.actor_id,
            details = %event.details,
            "audit event"
        );
    }
}

/// Persists audit events to the `audit_logs` table from a background task.
#[derive(Clone, Debug)]
pub struct DbAuditSink {
    database: DatabaseConnection,
}

impl DbAuditSink {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }
}

impl AuditSink for DbAuditSink {
    fn emit(&self, event: AuditEvent) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(
                action = event.action.as_str(),
                "no async runtime available, dropping audit event"
            );
            return;
        };

        let database = self.database.clone();
        handle.spawn(async move {
            let model = audit_logs::ActiveModel {
                id: ActiveValue::NotSet,
                action: ActiveValue::Set(event.action.as_str().to_string()),
                entity: ActiveValue::Set(event.entity.as_str().to_string()),
                entity_id: ActiveValue::Set(event.entity_id),
                actor_id: ActiveValue::Set(event.actor_id),
                details: ActiveValue::Set(event.details),
                created_at: ActiveValue::Set(event.timestamp),
            };
            if let Err(err) = model.insert(&database).await {
                tracing::warn!("failed to write audit event: {err}");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_round_trips_through_storage_names() {
        for action in [
            AuditAction::UserRegistered,
            AuditAction::GroupCreated,
            AuditAction::MemberAdded,
            AuditAction::ExpenseAdded,
            AuditAction::SettlementRecorded,
            AuditAction::LedgerEntryUpdated,
        ] {
            assert_eq!(AuditAction::try_from(action.as_str()).unwrap(), action);
        }
        assert!(AuditAction::try_from("DELETED_EVERYTHING").is_err());
    }

    #[test]
    fn serde_names_match_storage_names() {
        let json = serde_json::to_value(EntityKind::LedgerEntry).unwrap();
        assert_eq!(json, serde_json::json!("LEDGER_ENTRY"));
        let json = serde_json::to_value(AuditAction::ExpenseAdded).unwrap();
        assert_eq!(json, serde_json::json!("EXPENSE_ADDED"));
    }
}
