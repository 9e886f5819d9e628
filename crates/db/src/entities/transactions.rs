//! `SeaORM` Entity for transactions table.

use super::sea_orm_active_enums::TransactionStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub transaction_date: Date,
    pub description: String,
    pub reference: Option<String>,
    pub status: TransactionStatus,
    pub posted_at: Option<DateTimeWithTimeZone>,
    pub voided_at: Option<DateTimeWithTimeZone>,
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
