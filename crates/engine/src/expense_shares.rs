//! Per-participant portions of an expense.

use sea_orm::{ActiveValue, entity::prelude::*};

use crate::{ExpenseShare, MoneyCents};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "expense_shares")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub expense_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,
    pub amount_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Expenses,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ExpenseShare> for ActiveModel {
    fn from(share: &ExpenseShare) -> Self {
        Self {
            expense_id: ActiveValue::Set(share.expense_id),
            user_id: ActiveValue::Set(share.participant_id),
            amount_minor: ActiveValue::Set(share.amount.cents()),
        }
    }
}

impl From<Model> for ExpenseShare {
    fn from(model: Model) -> Self {
        Self {
            expense_id: model.expense_id,
            participant_id: model.user_id,
            amount: MoneyCents::new(model.amount_minor),
        }
    }
}
