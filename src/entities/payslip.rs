use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Payslip approval workflow states. Stored as text in the `status`
/// column; `pending` is initial, `approved`/`rejected` are terminal unless
/// reverted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

/// One payslip per (employee, period). The organizational columns are a
/// snapshot taken at generation time; later employee edits do not reach
/// historical payslips. Uniqueness of (employee_id, month_year) is
/// enforced by the database, see the migrator.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payslips")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub employee_id: Uuid,

    /// Period label, e.g. `Jan-2026`
    pub month_year: String,

    // Organizational snapshot
    pub agency: String,
    pub district: String,
    pub department: Option<String>,
    pub unit: Option<String>,
    pub grade: Option<String>,
    pub level: Option<String>,

    // Salary components
    pub basic_salary: Decimal,
    pub allowances: Decimal,
    pub gross_salary: Decimal,

    // Statutory and other deductions
    pub ssnit_deduction: Decimal,
    pub tier2_deduction: Decimal,
    pub income_tax: Decimal,
    pub other_deductions: Decimal,

    pub net_salary: Decimal,

    pub payment_mode: String,

    /// `pending` | `approved` | `rejected`
    pub status: String,

    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,

    pub generated_by: Uuid,
    pub generated_at: DateTime<Utc>,

    pub last_modified_by: Option<Uuid>,
    pub last_modified_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id"
    )]
    Employee,
    #[sea_orm(has_many = "super::payslip_line_item::Entity")]
    LineItems,
    #[sea_orm(has_many = "super::payslip_audit::Entity")]
    AuditEntries,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl Related<super::payslip_line_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineItems.def()
    }
}

impl Related<super::payslip_audit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuditEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn approval_status(&self) -> ApprovalStatus {
        self.status.parse().unwrap_or(ApprovalStatus::Pending)
    }

    pub fn is_approved(&self) -> bool {
        self.approval_status() == ApprovalStatus::Approved
    }

    /// Sum of the four fixed deduction fields. Line items are
    /// supplementary detail and are not included here.
    pub fn total_deductions(&self) -> Decimal {
        self.ssnit_deduction + self.tier2_deduction + self.income_tax + self.other_deductions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn status_round_trips_through_text() {
        for status in [
            ApprovalStatus::Pending,
            ApprovalStatus::Approved,
            ApprovalStatus::Rejected,
        ] {
            assert_eq!(ApprovalStatus::from_str(status.as_str()).unwrap(), status);
        }
        assert!(ApprovalStatus::from_str("cancelled").is_err());
    }

    #[test]
    fn total_deductions_sums_the_fixed_fields() {
        let now = Utc::now();
        let slip = Model {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            month_year: "Jan-2026".to_string(),
            agency: "National Ambulance Service".to_string(),
            district: "Accra Metropolitan Assembly".to_string(),
            department: None,
            unit: None,
            grade: None,
            level: None,
            basic_salary: dec!(920.00),
            allowances: Decimal::ZERO,
            gross_salary: dec!(920.00),
            ssnit_deduction: dec!(50.60),
            tier2_deduction: dec!(32.20),
            income_tax: dec!(75.13),
            other_deductions: Decimal::ZERO,
            net_salary: dec!(762.07),
            payment_mode: String::new(),
            status: "pending".to_string(),
            approved_by: None,
            approved_at: None,
            generated_by: Uuid::new_v4(),
            generated_at: now,
            last_modified_by: None,
            last_modified_at: now,
        };

        assert_eq!(slip.total_deductions(), dec!(157.93));
        assert_eq!(slip.gross_salary - slip.total_deductions(), slip.net_salary);
        assert!(!slip.is_approved());
    }
}
