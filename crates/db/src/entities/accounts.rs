//! `SeaORM` Entity for accounts table.

use super::sea_orm_active_enums::AccountType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    pub sub_type: Option<String>,
    pub parent_account_id: Option<Uuid>,
    pub is_bank_account: bool,
    pub is_control_account: bool,
    pub is_system: bool,
    pub is_active: bool,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub current_balance: Decimal,
    pub currency: String,
    pub tax_category: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::companies::Entity",
        from = "Column::CompanyId",
        to = "super::companies::Column::Id"
    )]
    Companies,
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentAccountId",
        to = "Column::Id"
    )]
    SelfRef,
    #[sea_orm(has_many = "super::transaction_lines::Entity")]
    TransactionLines,
}

impl Related<super::companies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Companies.def()
    }
}

impl Related<super::transaction_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
