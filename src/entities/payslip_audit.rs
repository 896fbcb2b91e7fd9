use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// What kind of change an audit row records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Edit,
    Revert,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Edit => "edit",
            AuditAction::Revert => "revert",
        }
    }
}

/// Append-only audit trail row, one per edit or revert. Never mutated or
/// deleted (except by cascade when the payslip itself is hard-deleted);
/// listed reverse-chronologically.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payslip_audits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub payslip_id: Uuid,

    /// `edit` | `revert`
    pub action: String,

    pub old_status: String,
    pub new_status: String,

    /// Mandatory, user-supplied; may be composed from a reason code plus
    /// free-text detail
    pub reason: String,

    pub performed_by: Uuid,
    pub performed_at: DateTime<Utc>,
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
    pub fn action(&self) -> AuditAction {
        self.action.parse().unwrap_or(AuditAction::Edit)
    }
}
