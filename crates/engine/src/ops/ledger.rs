use sea_orm::{ActiveValue, QueryFilter, QueryOrder, prelude::*};
use serde_json::json;

use crate::{
    AuditAction, AuditEvent, Balances, DebtGraph, EngineError, EntityKind, LedgerEntry,
    ResultEngine, Scope, SettlementSuggestion, ledger_entries, net_balances, plan_from_balances,
    project_graph,
};

use super::Engine;

impl Engine {
    /// Ledger entries in scope, oldest first.
    ///
    /// A group scope fails with `KeyNotFound` when the group does not exist.
    pub async fn ledger_entries(
        &self,
        scope: Scope,
        include_settled: bool,
    ) -> ResultEngine<Vec<LedgerEntry>> {
        let mut query = ledger_entries::Entity::find();
        if let Scope::Group(group_id) = scope {
            self.require_group(&self.database, group_id).await?;
            query = query.filter(ledger_entries::Column::GroupId.eq(group_id));
        }
        if !include_settled {
            query = query.filter(ledger_entries::Column::Settled.eq(false));
        }
        let models = query
            .order_by_asc(ledger_entries::Column::CreatedAt)
            .order_by_asc(ledger_entries::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(LedgerEntry::from).collect())
    }

    /// Flips the `settled` flag of one entry. Amount and parties never change.
    pub async fn set_entry_settled(
        &self,
        entry_id: i64,
        settled: bool,
        actor_id: Option<i64>,
    ) -> ResultEngine<LedgerEntry> {
        let model = ledger_entries::Entity::find_by_id(entry_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("ledger entry {entry_id}")))?;
        if model.settled == settled {
            return Ok(model.into());
        }

        let mut active: ledger_entries::ActiveModel = model.into();
        active.settled = ActiveValue::Set(settled);
        let entry: LedgerEntry = active.update(&self.database).await?.into();

        tracing::info!(entry_id, settled, "ledger entry updated");
        self.audit(AuditEvent::new(
            AuditAction::LedgerEntryUpdated,
            EntityKind::LedgerEntry,
            entry_id,
            actor_id,
            json!({ "settled": settled }),
        ));
        Ok(entry)
    }

    /// Net balance per participant over the unsettled entries in scope.
    pub async fn compute_balances(&self, scope: Scope) -> ResultEngine<Balances> {
        let entries = self.ledger_entries(scope, false).await?;
        net_balances(&entries)
    }

    /// Transfers that clear the balances in scope.
    ///
    /// Suggestions are advisory: re-plan before recording them when the
    /// ledger may have changed in between.
    pub async fn plan_settlements(&self, scope: Scope) -> ResultEngine<Vec<SettlementSuggestion>> {
        let balances = self.compute_balances(scope).await?;
        Ok(plan_from_balances(&balances))
    }

    /// Node/link view of the unsettled entries in scope.
    pub async fn debt_graph(&self, scope: Scope) -> ResultEngine<DebtGraph> {
        let entries = self.ledger_entries(scope, false).await?;
        let names = self
            .name_directory(
                entries
                    .iter()
                    .flat_map(|entry| [entry.debtor_id, entry.creditor_id]),
            )
            .await?;
        Ok(project_graph(&entries, &names))
    }
}
