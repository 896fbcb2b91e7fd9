use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Employee master record. Read-only input to the payroll core: the
/// services snapshot fields from it at generation time and never write it
/// back. CRUD and import tooling live in a separate system.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    #[validate(length(min = 1, max = 50, message = "Staff ID is required"))]
    pub staff_id: String,

    #[validate(length(min = 1, max = 200, message = "Employee name is required"))]
    pub name: String,

    pub department: Option<String>,
    pub unit: Option<String>,
    pub grade: Option<String>,
    pub level: Option<String>,

    pub monthly_salary: Decimal,

    pub bank_name: Option<String>,
    pub bank_branch: Option<String>,
    pub ssnit_number: Option<String>,
    pub ghana_card: Option<String>,
    pub date_of_birth: Option<NaiveDate>,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::payslip::Entity")]
    Payslips,
}

impl Related<super::payslip::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payslips.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Casual employees are identified by a staff-ID prefix convention.
    pub fn is_casual(&self, casual_prefix: &str) -> bool {
        self.staff_id.starts_with(casual_prefix)
    }

    /// Payment mode description derived from bank details, empty when no
    /// bank is on file.
    pub fn payment_mode(&self) -> String {
        match (&self.bank_name, &self.bank_branch) {
            (Some(bank), Some(branch)) if !bank.is_empty() => format!("{}, {}", bank, branch),
            (Some(bank), None) if !bank.is_empty() => bank.clone(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn employee(staff_id: &str, bank: Option<&str>, branch: Option<&str>) -> Model {
        Model {
            id: Uuid::new_v4(),
            staff_id: staff_id.to_string(),
            name: "Ama Mensah".to_string(),
            department: Some("Operations".to_string()),
            unit: None,
            grade: None,
            level: None,
            monthly_salary: dec!(920.00),
            bank_name: bank.map(str::to_string),
            bank_branch: branch.map(str::to_string),
            ssnit_number: None,
            ghana_card: None,
            date_of_birth: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn casual_prefix_convention() {
        assert!(employee("CA0042", None, None).is_casual("CA"));
        assert!(!employee("NAS0042", None, None).is_casual("CA"));
    }

    #[test]
    fn payment_mode_from_bank_details() {
        assert_eq!(
            employee("CA1", Some("GCB Bank"), Some("Accra Main")).payment_mode(),
            "GCB Bank, Accra Main"
        );
        assert_eq!(employee("CA1", Some("GCB Bank"), None).payment_mode(), "GCB Bank");
        assert_eq!(employee("CA1", None, None).payment_mode(), "");
    }
}
