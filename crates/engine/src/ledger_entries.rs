//! Debt ledger rows.
//!
//! A [`LedgerEntry`] is one directed obligation: `debtor` owes `creditor`
//! `amount`. Entries are appended and never deleted; amount and parties never
//! change after insert, only the `settled` flag can be toggled.
//!
//! Entries come from two sources:
//! - an expense share of a participant other than the payer
//!   (`expense_id` is set),
//! - a recorded settlement, booked in the opposite direction of the payment
//!   so that it nets the paid debt out of the balances (`settlement_id` is
//!   set).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, MoneyCents, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub group_id: Option<i64>,
    pub expense_id: Option<i64>,
    pub settlement_id: Option<i64>,
    pub debtor_id: i64,
    pub creditor_id: i64,
    pub amount: MoneyCents,
    pub settled: bool,
    pub created_at: DateTime<Utc>,
}

/// Where a ledger entry comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EntrySource {
    Expense(i64),
    Settlement(i64),
}

/// A validated entry that has not been stored yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct NewLedgerEntry {
    pub group_id: Option<i64>,
    pub source: EntrySource,
    pub debtor_id: i64,
    pub creditor_id: i64,
    pub amount: MoneyCents,
}

impl NewLedgerEntry {
    pub(crate) fn new(
        group_id: Option<i64>,
        source: EntrySource,
        debtor_id: i64,
        creditor_id: i64,
        amount: MoneyCents,
    ) -> ResultEngine<Self> {
        if debtor_id == creditor_id {
            return Err(EngineError::InvalidInput(
                "debtor and creditor must differ".to_string(),
            ));
        }
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "ledger amount must be > 0".to_string(),
            ));
        }
        if !amount.is_storable() {
            return Err(EngineError::InvalidAmount(format!(
                "ledger amount must be <= {}",
                MoneyCents::MAX_AMOUNT
            )));
        }
        Ok(Self {
            group_id,
            source,
            debtor_id,
            creditor_id,
            amount,
        })
    }

    pub(crate) fn into_active_model(self, created_at: DateTime<Utc>) -> ActiveModel {
        let (expense_id, settlement_id) = match self.source {
            EntrySource::Expense(id) => (Some(id), None),
            EntrySource::Settlement(id) => (None, Some(id)),
        };
        ActiveModel {
            id: ActiveValue::NotSet,
            group_id: ActiveValue::Set(self.group_id),
            expense_id: ActiveValue::Set(expense_id),
            settlement_id: ActiveValue::Set(settlement_id),
            debtor_id: ActiveValue::Set(self.debtor_id),
            creditor_id: ActiveValue::Set(self.creditor_id),
            amount_minor: ActiveValue::Set(self.amount.cents()),
            settled: ActiveValue::Set(false),
            created_at: ActiveValue::Set(created_at),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub group_id: Option<i64>,
    pub expense_id: Option<i64>,
    pub settlement_id: Option<i64>,
    pub debtor_id: i64,
    pub creditor_id: i64,
    pub amount_minor: i64,
    pub settled: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Expenses,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for LedgerEntry {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            group_id: model.group_id,
            expense_id: model.expense_id,
            settlement_id: model.settlement_id,
            debtor_id: model.debtor_id,
            creditor_id: model.creditor_id,
            amount: MoneyCents::new(model.amount_minor),
            settled: model.settled,
            created_at: model.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entry_rejects_self_debt() {
        let err = NewLedgerEntry::new(
            Some(1),
            EntrySource::Expense(1),
            7,
            7,
            MoneyCents::new(100),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn new_entry_rejects_non_positive_amounts() {
        for cents in [0, -1] {
            let err = NewLedgerEntry::new(
                Some(1),
                EntrySource::Expense(1),
                1,
                2,
                MoneyCents::new(cents),
            )
            .unwrap_err();
            assert!(matches!(err, EngineError::InvalidAmount(_)));
        }
    }

    #[test]
    fn settlement_source_sets_only_settlement_id() {
        let entry = NewLedgerEntry::new(None, EntrySource::Settlement(9), 2, 1, MoneyCents::new(5))
            .unwrap()
            .into_active_model(Utc::now());
        assert!(matches!(entry.expense_id, ActiveValue::Set(None)));
        assert!(matches!(entry.settlement_id, ActiveValue::Set(Some(9))));
        assert!(matches!(entry.settled, ActiveValue::Set(false)));
    }
}
