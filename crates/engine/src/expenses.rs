//! Expense primitives.
//!
//! An [`Expense`] is one purchase paid by a single member of a group. The
//! amount owed by each participant is an [`ExpenseShare`]; the debts the
//! shares imply are written to the ledger as
//! [`LedgerEntry`](crate::LedgerEntry) rows.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::MoneyCents;

use super::expense_shares;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub group_id: i64,
    pub payer_id: i64,
    pub amount: MoneyCents,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseShare {
    pub expense_id: i64,
    pub participant_id: i64,
    pub amount: MoneyCents,
}

/// A user id paired with the display name resolved for the current request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareDetail {
    pub participant: Participant,
    pub amount: MoneyCents,
}

/// An expense enriched for display: payer and participants carry names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseDetail {
    pub expense: Expense,
    pub payer: Participant,
    pub shares: Vec<ShareDetail>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub group_id: i64,
    pub payer_id: i64,
    pub amount_minor: i64,
    pub description: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::expense_shares::Entity")]
    Shares,
}

impl Related<expense_shares::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shares.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn new_expense(
        group_id: i64,
        payer_id: i64,
        amount: MoneyCents,
        description: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ActiveValue::NotSet,
            group_id: ActiveValue::Set(group_id),
            payer_id: ActiveValue::Set(payer_id),
            amount_minor: ActiveValue::Set(amount.cents()),
            description: ActiveValue::Set(description),
            created_at: ActiveValue::Set(created_at),
        }
    }
}

impl From<Model> for Expense {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            group_id: model.group_id,
            payer_id: model.payer_id,
            amount: MoneyCents::new(model.amount_minor),
            description: model.description,
            created_at: model.created_at,
        }
    }
}
