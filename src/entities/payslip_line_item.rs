use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Whether a line item adds to or subtracts from the payslip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Payment,
    Deduction,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Payment => "payment",
            ItemType::Deduction => "deduction",
        }
    }
}

/// Itemized payment/deduction detail attached to a payslip. Append-only;
/// ordered by (sort_order, created_at). Supplementary to the four fixed
/// deduction fields, not summed into net salary.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payslip_line_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub payslip_id: Uuid,

    /// `payment` | `deduction`
    pub item_type: String,

    /// Category name (e.g. "Overtime", "Loan Repayment"); free text, the
    /// dynamic category tables of the legacy system are external config.
    pub category: Option<String>,

    /// Nature/description of the line
    pub nature: String,

    /// Hours worked or original amount the rate applies to
    pub hours_or_amount: Decimal,

    /// Rate percentage applied
    pub rate_percent: Decimal,

    /// Resulting signed amount
    pub balance: Decimal,

    /// Explicit display order; ties broken by creation order
    pub sort_order: i32,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::payslip::Entity",
        from = "Column::PayslipId",
        to = "super::payslip::Column::Id"
    )]
    Payslip,
}

impl Related<super::payslip::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payslip.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn item_type(&self) -> ItemType {
        self.item_type.parse().unwrap_or(ItemType::Payment)
    }
}
