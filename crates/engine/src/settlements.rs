//! Recorded payments between two users.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::MoneyCents;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: i64,
    pub payer_id: i64,
    pub payee_id: i64,
    pub amount: MoneyCents,
    pub group_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "settlements")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub payer_id: i64,
    pub payee_id: i64,
    pub amount_minor: i64,
    pub group_id: Option<i64>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn new_settlement(
        payer_id: i64,
        payee_id: i64,
        amount: MoneyCents,
        group_id: Option<i64>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ActiveValue::NotSet,
            payer_id: ActiveValue::Set(payer_id),
            payee_id: ActiveValue::Set(payee_id),
            amount_minor: ActiveValue::Set(amount.cents()),
            group_id: ActiveValue::Set(group_id),
            created_at: ActiveValue::Set(created_at),
        }
    }
}

impl From<Model> for Settlement {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            payer_id: model.payer_id,
            payee_id: model.payee_id,
            amount: MoneyCents::new(model.amount_minor),
            group_id: model.group_id,
            created_at: model.created_at,
        }
    }
}
