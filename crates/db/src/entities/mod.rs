//! `SeaORM` entity definitions.

pub mod accounts;
pub mod companies;
pub mod sea_orm_active_enums;
pub mod transaction_lines;
pub mod transactions;
