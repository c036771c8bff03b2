use chrono::Utc;
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use serde_json::json;

use crate::{
    AuditAction, AuditEvent, EngineError, EntityKind, MoneyCents, ResultEngine, Settlement,
    SettlementCmd,
    ledger_entries::{EntrySource, NewLedgerEntry},
    settlements,
};

use super::{Engine, with_tx};

impl Engine {
    /// Records a payment from `cmd.payer_id` to `cmd.payee_id`.
    ///
    /// With a group both users must be members of it.
    ///
    /// With reconciliation enabled the payment is also booked as a ledger
    /// entry in the opposite direction (the payee now owes the payer the
    /// amount), so the paid debt nets out of later balances and plans.
    pub async fn record_settlement(&self, cmd: SettlementCmd) -> ResultEngine<Settlement> {
        if !cmd.amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "settlement amount must be > 0".to_string(),
            ));
        }
        if !cmd.amount.is_storable() {
            return Err(EngineError::InvalidAmount(format!(
                "settlement amount must be <= {}",
                MoneyCents::MAX_AMOUNT
            )));
        }
        if cmd.payer_id == cmd.payee_id {
            return Err(EngineError::InvalidInput(
                "payer and payee must differ".to_string(),
            ));
        }

        let (settlement, payer_name, payee_name) = with_tx!(self, |db_tx| {
            let payer = self.require_user(&db_tx, cmd.payer_id).await?;
            let payee = self.require_user(&db_tx, cmd.payee_id).await?;
            if let Some(group_id) = cmd.group_id {
                self.require_group(&db_tx, group_id).await?;
                self.require_members(&db_tx, group_id, [cmd.payer_id, cmd.payee_id])
                    .await?;
            }

            let now = Utc::now();
            let settlement: Settlement = settlements::ActiveModel::new_settlement(
                cmd.payer_id,
                cmd.payee_id,
                cmd.amount,
                cmd.group_id,
                now,
            )
            .insert(&db_tx)
            .await?
            .into();

            if self.reconcile_settlements {
                NewLedgerEntry::new(
                    settlement.group_id,
                    EntrySource::Settlement(settlement.id),
                    settlement.payee_id,
                    settlement.payer_id,
                    settlement.amount,
                )?
                .into_active_model(now)
                .insert(&db_tx)
                .await?;
            }
            Ok::<_, EngineError>((settlement, payer.name, payee.name))
        })?;

        tracing::info!(
            settlement_id = settlement.id,
            payer_id = settlement.payer_id,
            payee_id = settlement.payee_id,
            amount = %settlement.amount,
            reconciled = self.reconcile_settlements,
            "settlement recorded"
        );
        self.audit(AuditEvent::new(
            AuditAction::SettlementRecorded,
            EntityKind::Settlement,
            settlement.id,
            Some(settlement.payer_id),
            json!({
                "payee_id": settlement.payee_id,
                "amount_minor": settlement.amount.cents(),
                "group_id": settlement.group_id,
                "payer_name": payer_name,
                "payee_name": payee_name,
            }),
        ));
        Ok(settlement)
    }

    /// Recorded settlements, newest first. `None` lists every settlement.
    pub async fn settlements(&self, group_id: Option<i64>) -> ResultEngine<Vec<Settlement>> {
        let mut query = settlements::Entity::find();
        if let Some(group_id) = group_id {
            self.require_group(&self.database, group_id).await?;
            query = query.filter(settlements::Column::GroupId.eq(group_id));
        }
        let models = query
            .order_by_desc(settlements::Column::CreatedAt)
            .order_by_desc(settlements::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Settlement::from).collect())
    }
}
