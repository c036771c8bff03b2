use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use serde_json::json;

use crate::{
    AuditAction, AuditEvent, EngineError, EntityKind, Expense, ExpenseCmd, ExpenseDetail,
    ExpenseShare, LedgerEntry, MoneyCents, NameDirectory, ResultEngine, ShareDetail,
    expense_shares, expenses,
    ledger_entries::{self, EntrySource, NewLedgerEntry},
};

use super::{Engine, with_tx};

/// Rejects a command before anything touches storage.
fn validate_expense(cmd: &ExpenseCmd) -> ResultEngine<String> {
    let description = cmd.description.trim();
    if description.is_empty() {
        return Err(EngineError::InvalidInput(
            "expense description must not be empty".to_string(),
        ));
    }
    if cmd.amount.is_negative() {
        return Err(EngineError::InvalidAmount(
            "expense amount must be >= 0".to_string(),
        ));
    }
    if !cmd.amount.is_storable() {
        return Err(EngineError::InvalidAmount(format!(
            "expense amount must be <= {}",
            MoneyCents::MAX_AMOUNT
        )));
    }
    if cmd.shares.is_empty() {
        return Err(EngineError::InvalidShares(
            "at least one share is required".to_string(),
        ));
    }

    let mut seen = HashSet::with_capacity(cmd.shares.len());
    for share in &cmd.shares {
        if share.amount.is_negative() {
            return Err(EngineError::InvalidShares(format!(
                "share of user {} must be >= 0",
                share.participant_id
            )));
        }
        if !share.amount.is_storable() {
            return Err(EngineError::InvalidAmount(format!(
                "share of user {} must be <= {}",
                share.participant_id,
                MoneyCents::MAX_AMOUNT
            )));
        }
        if !seen.insert(share.participant_id) {
            return Err(EngineError::InvalidShares(format!(
                "user {} appears more than once",
                share.participant_id
            )));
        }
    }

    let total = MoneyCents::checked_sum(cmd.shares.iter().map(|share| share.amount))
        .ok_or_else(|| EngineError::InvalidAmount("shares overflow".to_string()))?;
    if total != cmd.amount {
        return Err(EngineError::InvalidShares(format!(
            "shares add up to {total}, expected {}",
            cmd.amount
        )));
    }
    Ok(description.to_string())
}

fn expense_detail(
    expense: Expense,
    shares: Vec<ExpenseShare>,
    names: &NameDirectory,
) -> ExpenseDetail {
    ExpenseDetail {
        payer: names.participant(expense.payer_id),
        shares: shares
            .into_iter()
            .map(|share| ShareDetail {
                participant: names.participant(share.participant_id),
                amount: share.amount,
            })
            .collect(),
        expense,
    }
}

impl Engine {
    /// Records an expense, its shares and the debts they imply in one
    /// transaction.
    ///
    /// Every participant other than the payer owes the payer their share.
    /// The payer's own share and zero shares produce no ledger entry.
    pub async fn record_expense(&self, cmd: ExpenseCmd) -> ResultEngine<ExpenseDetail> {
        let description = validate_expense(&cmd)?;
        let group_id = cmd.group_id;
        let payer_id = cmd.payer_id;

        let (expense, shares) = with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id).await?;
            self.require_members(
                &db_tx,
                group_id,
                std::iter::once(payer_id).chain(cmd.shares.iter().map(|s| s.participant_id)).collect::<Vec<i64>>(),
            )
            .await?;

            let now = Utc::now();
            let expense: Expense =
                expenses::ActiveModel::new_expense(group_id, payer_id, cmd.amount, description, now)
                    .insert(&db_tx)
                    .await?
                    .into();

            let mut shares = Vec::with_capacity(cmd.shares.len());
            for share_cmd in &cmd.shares {
                let share = ExpenseShare {
                    expense_id: expense.id,
                    participant_id: share_cmd.participant_id,
                    amount: share_cmd.amount,
                };
                expense_shares::ActiveModel::from(&share)
                    .insert(&db_tx)
                    .await?;

                if share.participant_id != payer_id && share.amount.is_positive() {
                    NewLedgerEntry::new(
                        Some(group_id),
                        EntrySource::Expense(expense.id),
                        share.participant_id,
                        payer_id,
                        share.amount,
                    )?
                    .into_active_model(now)
                    .insert(&db_tx)
                    .await?;
                }
                shares.push(share);
            }
            Ok::<_, EngineError>((expense, shares))
        })?;

        tracing::info!(
            expense_id = expense.id,
            group_id,
            payer_id,
            amount = %expense.amount,
            "expense recorded"
        );
        self.audit(AuditEvent::new(
            AuditAction::ExpenseAdded,
            EntityKind::Expense,
            expense.id,
            Some(payer_id),
            json!({
                "group_id": group_id,
                "amount_minor": expense.amount.cents(),
                "description": expense.description,
                "participants": shares.len(),
            }),
        ));

        let names = self
            .name_directory(std::iter::once(payer_id).chain(shares.iter().map(|s| s.participant_id)))
            .await?;
        Ok(expense_detail(expense, shares, &names))
    }

    /// Expenses of a group, newest first.
    pub async fn group_expenses(&self, group_id: i64) -> ResultEngine<Vec<ExpenseDetail>> {
        self.require_group(&self.database, group_id).await?;

        let models = expenses::Entity::find()
            .filter(expenses::Column::GroupId.eq(group_id))
            .order_by_desc(expenses::Column::CreatedAt)
            .order_by_desc(expenses::Column::Id)
            .all(&self.database)
            .await?;
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let expense_ids: Vec<i64> = models.iter().map(|m| m.id).collect();
        let mut shares_by_expense: HashMap<i64, Vec<ExpenseShare>> = HashMap::new();
        for model in expense_shares::Entity::find()
            .filter(expense_shares::Column::ExpenseId.is_in(expense_ids))
            .order_by_asc(expense_shares::Column::UserId)
            .all(&self.database)
            .await?
        {
            shares_by_expense
                .entry(model.expense_id)
                .or_default()
                .push(model.into());
        }

        let mut ids: HashSet<i64> = models.iter().map(|m| m.payer_id).collect();
        ids.extend(
            shares_by_expense
                .values()
                .flatten()
                .map(|share| share.participant_id),
        );
        let names = self.name_directory(ids).await?;

        Ok(models
            .into_iter()
            .map(|model| {
                let shares = shares_by_expense.remove(&model.id).unwrap_or_default();
                expense_detail(model.into(), shares, &names)
            })
            .collect())
    }

    /// Ledger entries written for one expense.
    pub async fn expense_entries(&self, expense_id: i64) -> ResultEngine<Vec<LedgerEntry>> {
        let models = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::ExpenseId.eq(expense_id))
            .order_by_asc(ledger_entries::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd() -> ExpenseCmd {
        ExpenseCmd::new(1, 1, "Dinner", MoneyCents::new(300_00))
    }

    #[test]
    fn rejects_shares_that_do_not_add_up() {
        let err = validate_expense(
            &cmd()
                .share(1, MoneyCents::new(100_00))
                .share(2, MoneyCents::new(100_00)),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidShares(_)));
    }

    #[test]
    fn rejects_repeated_participant() {
        let err = validate_expense(
            &cmd()
                .share(2, MoneyCents::new(150_00))
                .share(2, MoneyCents::new(150_00)),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidShares(_)));
    }

    #[test]
    fn rejects_negative_amounts_and_empty_shares() {
        let negative = ExpenseCmd::new(1, 1, "Refund", MoneyCents::new(-1)).share(1, MoneyCents::new(-1));
        assert!(matches!(
            validate_expense(&negative).unwrap_err(),
            EngineError::InvalidAmount(_)
        ));
        assert!(matches!(
            validate_expense(&cmd()).unwrap_err(),
            EngineError::InvalidShares(_)
        ));
        let negative_share = ExpenseCmd::new(1, 1, "Dinner", MoneyCents::ZERO)
            .share(1, MoneyCents::new(5))
            .share(2, MoneyCents::new(-5));
        assert!(matches!(
            validate_expense(&negative_share).unwrap_err(),
            EngineError::InvalidShares(_)
        ));
    }

    #[test]
    fn huge_shares_are_rejected_instead_of_wrapping() {
        let wrapping = ExpenseCmd::new(1, 1, "x", MoneyCents::ZERO)
            .share(1, MoneyCents::new(2))
            .share(2, MoneyCents::new(i64::MAX))
            .share(3, MoneyCents::new(i64::MAX));
        assert!(matches!(
            validate_expense(&wrapping).unwrap_err(),
            EngineError::InvalidAmount(_)
        ));

        let over_cap = MoneyCents::new(MoneyCents::MAX_AMOUNT.cents() + 1);
        let too_big = ExpenseCmd::new(1, 1, "Yacht", over_cap).share(2, over_cap);
        assert!(matches!(
            validate_expense(&too_big).unwrap_err(),
            EngineError::InvalidAmount(_)
        ));

        let at_cap = ExpenseCmd::new(1, 1, "Yacht", MoneyCents::MAX_AMOUNT)
            .share(2, MoneyCents::MAX_AMOUNT);
        assert!(validate_expense(&at_cap).is_ok());
    }

    #[test]
    fn zero_total_with_zero_shares_is_valid() {
        let free = ExpenseCmd::new(1, 1, "  Free sample ", MoneyCents::ZERO).split_evenly(&[1, 2]);
        assert_eq!(validate_expense(&free).unwrap(), "Free sample");
    }
}
