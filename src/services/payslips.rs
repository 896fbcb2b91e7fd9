use crate::{
    auth::{require_capability, Actor, Capability},
    config::PayrollConfig,
    db::DbPool,
    entities::employee::{self, Entity as EmployeeEntity, Model as EmployeeModel},
    entities::payslip::{
        self, ActiveModel as PayslipActiveModel, ApprovalStatus, Entity as PayslipEntity,
        Model as PayslipModel,
    },
    entities::payslip_audit::{ActiveModel as AuditActiveModel, AuditAction},
    errors::ServiceError,
    events::{Event, EventSender},
    period::PayPeriod,
    services::tax,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Request to generate a single payslip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratePayslipRequest {
    pub employee_id: Uuid,
    pub period: PayPeriod,
    /// Overrides the configured default district when present
    pub district: Option<String>,
    /// Overrides the configured default SSNIT rate (%) when present
    pub ssnit_rate: Option<Decimal>,
    /// Overrides the configured default Tier 2 rate (%) when present
    pub tier2_rate: Option<Decimal>,
}

/// Which employees a bulk generation pass covers.
///
/// The single-generate flow only ever offers active casual employees; the
/// bulk flow covers every active employee. Both conventions are kept as
/// distinct, explicit filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeFilter {
    ActiveCasual,
    AllActive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkGenerateRequest {
    pub period: PayPeriod,
    pub district: Option<String>,
    pub ssnit_rate: Option<Decimal>,
    pub tier2_rate: Option<Decimal>,
    pub filter: EmployeeFilter,
}

/// Outcome of a bulk generation pass. The batch is not atomic: rows
/// created before a failing employee stay created. Skipped counts only
/// employees that already hold a payslip for the period; build or insert
/// errors land in `failed`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BulkGenerateSummary {
    pub created: u64,
    pub skipped: u64,
    pub failed: u64,
}

/// Financial edit to an existing payslip. Absent fields keep their current
/// value; gross and net are always recomputed from the resulting fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct EditPayslipRequest {
    pub department: Option<String>,
    pub unit: Option<String>,
    pub basic_salary: Option<Decimal>,
    pub allowances: Option<Decimal>,
    pub ssnit_deduction: Option<Decimal>,
    pub tier2_deduction: Option<Decimal>,
    pub income_tax: Option<Decimal>,
    pub other_deductions: Option<Decimal>,
    /// Mandatory reason code or summary
    #[validate(length(min = 1, message = "Edit reason is required"))]
    pub reason: String,
    /// Optional free-text detail appended to the reason
    pub reason_details: Option<String>,
}

/// List filtering for payslip queries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayslipListFilter {
    pub status: Option<ApprovalStatus>,
    pub employee_id: Option<Uuid>,
    /// Month abbreviation, e.g. `Jan`
    pub month: Option<String>,
    /// Four-digit year, e.g. `2026`
    pub year: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PayslipResponse {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub month_year: String,
    pub agency: String,
    pub district: String,
    pub department: Option<String>,
    pub unit: Option<String>,
    pub grade: Option<String>,
    pub level: Option<String>,
    pub basic_salary: Decimal,
    pub allowances: Decimal,
    pub gross_salary: Decimal,
    pub ssnit_deduction: Decimal,
    pub tier2_deduction: Decimal,
    pub income_tax: Decimal,
    pub other_deductions: Decimal,
    pub total_deductions: Decimal,
    pub net_salary: Decimal,
    pub payment_mode: String,
    pub status: ApprovalStatus,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub generated_by: Uuid,
    pub generated_at: DateTime<Utc>,
    pub last_modified_by: Option<Uuid>,
    pub last_modified_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PayslipListResponse {
    pub payslips: Vec<PayslipResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Snapshot values resolved for display, falling back to the current
/// employee record where the payslip snapshot column is empty.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResolvedSnapshot {
    pub department: String,
    pub unit: String,
    pub grade: String,
    pub level: String,
    /// SSNIT number unless the employee is above SSNIT age, then Ghana card
    pub staff_identifier: String,
}

/// Converts a payslip model to its response form.
pub fn payslip_to_response(model: PayslipModel) -> PayslipResponse {
    let total_deductions = model.total_deductions();
    let status = model.approval_status();
    PayslipResponse {
        id: model.id,
        employee_id: model.employee_id,
        month_year: model.month_year,
        agency: model.agency,
        district: model.district,
        department: model.department,
        unit: model.unit,
        grade: model.grade,
        level: model.level,
        basic_salary: model.basic_salary,
        allowances: model.allowances,
        gross_salary: model.gross_salary,
        ssnit_deduction: model.ssnit_deduction,
        tier2_deduction: model.tier2_deduction,
        income_tax: model.income_tax,
        other_deductions: model.other_deductions,
        total_deductions,
        net_salary: model.net_salary,
        payment_mode: model.payment_mode,
        status,
        approved_by: model.approved_by,
        approved_at: model.approved_at,
        generated_by: model.generated_by,
        generated_at: model.generated_at,
        last_modified_by: model.last_modified_by,
        last_modified_at: model.last_modified_at,
    }
}

/// Service for payslip generation, editing and deletion.
#[derive(Clone)]
pub struct PayslipService {
    db: Arc<DbPool>,
    payroll: PayrollConfig,
    event_sender: Option<Arc<EventSender>>,
}

impl PayslipService {
    pub fn new(
        db: Arc<DbPool>,
        payroll: PayrollConfig,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        Self {
            db,
            payroll,
            event_sender,
        }
    }

    /// Generates a payslip for one employee and period.
    ///
    /// The single-generate flow is restricted to active casual employees.
    /// An existing payslip for the pair is a precondition failure
    /// (`Conflict`), backed by the unique index for the racing case.
    #[instrument(skip(self, request), fields(employee_id = %request.employee_id, period = %request.period))]
    pub async fn generate(
        &self,
        actor: &Actor,
        request: GeneratePayslipRequest,
    ) -> Result<PayslipResponse, ServiceError> {
        require_capability(actor, Capability::GeneratePayslips)?;

        let db = &*self.db;
        let employee = EmployeeEntity::find_by_id(request.employee_id)
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch employee");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Employee {} not found", request.employee_id))
            })?;

        if !employee.is_active {
            return Err(ServiceError::InvalidOperation(format!(
                "Employee {} is not active",
                employee.staff_id
            )));
        }
        if !employee.is_casual(&self.payroll.casual_staff_prefix) {
            return Err(ServiceError::InvalidOperation(format!(
                "Employee {} is not a casual employee; use bulk generation",
                employee.staff_id
            )));
        }

        let period_label = request.period.label();
        if self
            .payslip_exists(db, employee.id, &period_label)
            .await?
        {
            return Err(ServiceError::Conflict(format!(
                "Payslip already exists for {} in {}",
                employee.staff_id, period_label
            )));
        }

        let model = self.build_snapshot(
            &employee,
            &period_label,
            request.district.as_deref(),
            request.ssnit_rate,
            request.tier2_rate,
            actor.id,
        )?;

        let inserted = model.insert(db).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                // Lost the race with a concurrent generation request.
                warn!(employee_id = %employee.id, period = %period_label, "duplicate payslip insert");
                ServiceError::Conflict(format!(
                    "Payslip already exists for {} in {}",
                    employee.staff_id, period_label
                ))
            } else {
                error!(error = %e, "Failed to insert payslip");
                ServiceError::DatabaseError(e)
            }
        })?;

        info!(payslip_id = %inserted.id, staff_id = %employee.staff_id, "Payslip generated");

        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender
                .send(Event::PayslipGenerated {
                    payslip_id: inserted.id,
                    employee_id: employee.id,
                    period: period_label,
                })
                .await
            {
                warn!(error = %e, "Failed to send payslip generated event");
            }
        }

        Ok(payslip_to_response(inserted))
    }

    /// Generates payslips for every eligible employee in one period.
    ///
    /// Employees that already hold a payslip for the period are counted as
    /// skipped; a failure on one employee is logged and does not roll back
    /// the others.
    #[instrument(skip(self, request), fields(period = %request.period, filter = ?request.filter))]
    pub async fn bulk_generate(
        &self,
        actor: &Actor,
        request: BulkGenerateRequest,
    ) -> Result<BulkGenerateSummary, ServiceError> {
        require_capability(actor, Capability::GeneratePayslips)?;

        let db = &*self.db;
        let mut query = EmployeeEntity::find().filter(employee::Column::IsActive.eq(true));
        if request.filter == EmployeeFilter::ActiveCasual {
            query = query.filter(
                employee::Column::StaffId.starts_with(self.payroll.casual_staff_prefix.as_str()),
            );
        }

        let employees = query.all(db).await.map_err(|e| {
            error!(error = %e, "Failed to list eligible employees");
            ServiceError::DatabaseError(e)
        })?;

        let period_label = request.period.label();
        let mut summary = BulkGenerateSummary::default();

        for emp in employees {
            if self.payslip_exists(db, emp.id, &period_label).await? {
                summary.skipped += 1;
                continue;
            }

            let model = match self.build_snapshot(
                &emp,
                &period_label,
                request.district.as_deref(),
                request.ssnit_rate,
                request.tier2_rate,
                actor.id,
            ) {
                Ok(model) => model,
                Err(e) => {
                    error!(staff_id = %emp.staff_id, error = %e, "Snapshot build failed, continuing with the rest");
                    summary.failed += 1;
                    continue;
                }
            };

            match model.insert(db).await {
                Ok(_) => summary.created += 1,
                Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                    // Concurrent generation for the same period; expected skip.
                    summary.skipped += 1;
                }
                Err(e) => {
                    error!(staff_id = %emp.staff_id, error = %e, "Insert failed, continuing with the rest");
                    summary.failed += 1;
                }
            }
        }

        info!(
            created = summary.created,
            skipped = summary.skipped,
            failed = summary.failed,
            "Bulk generation finished"
        );

        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender
                .send(Event::PayslipsBulkGenerated {
                    period: period_label,
                    created: summary.created,
                    skipped: summary.skipped,
                    failed: summary.failed,
                })
                .await
            {
                warn!(error = %e, "Failed to send bulk generation event");
            }
        }

        Ok(summary)
    }

    /// Retrieves a payslip by ID.
    #[instrument(skip(self), fields(payslip_id = %payslip_id))]
    pub async fn get_payslip(
        &self,
        actor: &Actor,
        payslip_id: Uuid,
    ) -> Result<Option<PayslipResponse>, ServiceError> {
        require_capability(actor, Capability::ViewAllPayslips)?;

        let db = &*self.db;
        let payslip = PayslipEntity::find_by_id(payslip_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(payslip.map(payslip_to_response))
    }

    /// Lists payslips newest-first with optional status/period filtering.
    #[instrument(skip(self, filter))]
    pub async fn list_payslips(
        &self,
        actor: &Actor,
        filter: PayslipListFilter,
        page: u64,
        per_page: u64,
    ) -> Result<PayslipListResponse, ServiceError> {
        require_capability(actor, Capability::ViewAllPayslips)?;

        let db = &*self.db;

        let mut query = PayslipEntity::find().order_by_desc(payslip::Column::GeneratedAt);
        if let Some(status) = filter.status {
            query = query.filter(payslip::Column::Status.eq(status.as_str()));
        }
        if let Some(employee_id) = filter.employee_id {
            query = query.filter(payslip::Column::EmployeeId.eq(employee_id));
        }
        if let Some(month) = &filter.month {
            query = query.filter(payslip::Column::MonthYear.starts_with(month.as_str()));
        }
        if let Some(year) = &filter.year {
            query = query.filter(payslip::Column::MonthYear.ends_with(year.as_str()));
        }

        let paginator = query.paginate(db, per_page.max(1));
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let payslips = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(PayslipListResponse {
            payslips: payslips.into_iter().map(payslip_to_response).collect(),
            total,
            page,
            per_page,
        })
    }

    /// Applies a financial edit.
    ///
    /// Gross and net are recomputed from the resulting fields. Any
    /// substantive change invalidates prior approval: an approved or
    /// rejected payslip silently reverts to pending as part of the same
    /// save. Every edit submission writes one `edit` audit row in the same
    /// transaction.
    #[instrument(skip(self, request), fields(payslip_id = %payslip_id))]
    pub async fn edit_payslip(
        &self,
        actor: &Actor,
        payslip_id: Uuid,
        request: EditPayslipRequest,
    ) -> Result<PayslipResponse, ServiceError> {
        require_capability(actor, Capability::EditPayslips)?;
        request.validate()?;
        let reason = compose_reason(&request.reason, request.reason_details.as_deref())?;

        for (name, value) in [
            ("basic_salary", request.basic_salary),
            ("allowances", request.allowances),
            ("ssnit_deduction", request.ssnit_deduction),
            ("tier2_deduction", request.tier2_deduction),
            ("income_tax", request.income_tax),
            ("other_deductions", request.other_deductions),
        ] {
            if let Some(v) = value {
                if v.is_sign_negative() {
                    return Err(ServiceError::ValidationError(format!(
                        "{} must not be negative",
                        name
                    )));
                }
            }
        }

        let db = &*self.db;
        let now = Utc::now();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start edit transaction");
            ServiceError::DatabaseError(e)
        })?;

        let payslip = PayslipEntity::find_by_id(payslip_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Payslip {} not found", payslip_id)))?;

        let old_status = payslip.approval_status();

        let basic_salary = request.basic_salary.unwrap_or(payslip.basic_salary);
        let allowances = request.allowances.unwrap_or(payslip.allowances);
        let ssnit = request.ssnit_deduction.unwrap_or(payslip.ssnit_deduction);
        let tier2 = request.tier2_deduction.unwrap_or(payslip.tier2_deduction);
        let income_tax = request.income_tax.unwrap_or(payslip.income_tax);
        let other = request.other_deductions.unwrap_or(payslip.other_deductions);

        let gross_salary = basic_salary + allowances;
        let net_salary = gross_salary - (ssnit + tier2 + income_tax + other);

        let mut active: PayslipActiveModel = payslip.into();
        if let Some(department) = request.department {
            active.department = Set(Some(department));
        }
        if let Some(unit) = request.unit {
            active.unit = Set(Some(unit));
        }
        active.basic_salary = Set(basic_salary);
        active.allowances = Set(allowances);
        active.gross_salary = Set(gross_salary);
        active.ssnit_deduction = Set(ssnit);
        active.tier2_deduction = Set(tier2);
        active.income_tax = Set(income_tax);
        active.other_deductions = Set(other);
        active.net_salary = Set(net_salary);

        // Business rule: a substantive change invalidates prior approval.
        let new_status = if old_status != ApprovalStatus::Pending {
            active.status = Set(ApprovalStatus::Pending.as_str().to_string());
            active.approved_by = Set(None);
            active.approved_at = Set(None);
            ApprovalStatus::Pending
        } else {
            old_status
        };

        active.last_modified_by = Set(Some(actor.id));
        active.last_modified_at = Set(now);

        let updated = active.update(&txn).await.map_err(|e| {
            error!(error = %e, "Failed to update payslip");
            ServiceError::DatabaseError(e)
        })?;

        write_audit(
            &txn,
            payslip_id,
            AuditAction::Edit,
            old_status,
            new_status,
            &reason,
            actor.id,
            now,
        )
        .await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, "Failed to commit edit transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(
            payslip_id = %payslip_id,
            old_status = %old_status,
            new_status = %new_status,
            "Payslip edited"
        );

        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender
                .send(Event::PayslipEdited {
                    payslip_id,
                    old_status: old_status.as_str().to_string(),
                    new_status: new_status.as_str().to_string(),
                    edited_by: actor.id,
                })
                .await
            {
                warn!(error = %e, "Failed to send payslip edited event");
            }
        }

        Ok(payslip_to_response(updated))
    }

    /// Hard-deletes a payslip. Line items and audit entries cascade.
    #[instrument(skip(self), fields(payslip_id = %payslip_id))]
    pub async fn delete_payslip(
        &self,
        actor: &Actor,
        payslip_id: Uuid,
    ) -> Result<(), ServiceError> {
        require_capability(actor, Capability::DeletePayslips)?;

        let db = &*self.db;
        let result = PayslipEntity::delete_by_id(payslip_id)
            .exec(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to delete payslip");
                ServiceError::DatabaseError(e)
            })?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Payslip {} not found",
                payslip_id
            )));
        }

        info!(payslip_id = %payslip_id, "Payslip deleted");

        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender
                .send(Event::PayslipDeleted {
                    payslip_id,
                    deleted_by: actor.id,
                })
                .await
            {
                warn!(error = %e, "Failed to send payslip deleted event");
            }
        }

        Ok(())
    }

    /// Resolves display snapshot values, falling back to the live employee
    /// record where a snapshot column is empty. The staff identifier
    /// prefers the SSNIT number unless the employee is above SSNIT age
    /// (60), then the Ghana card.
    #[instrument(skip(self), fields(payslip_id = %payslip_id))]
    pub async fn resolved_snapshot(
        &self,
        actor: &Actor,
        payslip_id: Uuid,
    ) -> Result<ResolvedSnapshot, ServiceError> {
        require_capability(actor, Capability::ViewAllPayslips)?;

        let db = &*self.db;
        let (payslip, employee) = PayslipEntity::find_by_id(payslip_id)
            .find_also_related(EmployeeEntity)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Payslip {} not found", payslip_id)))?;

        let employee = employee.ok_or_else(|| {
            ServiceError::InternalError(format!(
                "Payslip {} references a missing employee",
                payslip_id
            ))
        })?;

        let pick = |snapshot: &Option<String>, live: &Option<String>| -> String {
            snapshot
                .clone()
                .filter(|s| !s.is_empty())
                .or_else(|| live.clone())
                .unwrap_or_default()
        };

        let is_above_ssnit_age = employee
            .date_of_birth
            .and_then(|dob| Utc::now().date_naive().years_since(dob))
            .map(|age| age >= 60)
            .unwrap_or(false);

        let staff_identifier = if !is_above_ssnit_age && employee.ssnit_number.is_some() {
            employee.ssnit_number.clone().unwrap_or_default()
        } else if let Some(card) = &employee.ghana_card {
            card.clone()
        } else {
            employee.ssnit_number.clone().unwrap_or_default()
        };

        Ok(ResolvedSnapshot {
            department: pick(&payslip.department, &employee.department),
            unit: pick(&payslip.unit, &employee.unit),
            grade: pick(&payslip.grade, &employee.grade),
            level: pick(&payslip.level, &employee.level),
            staff_identifier,
        })
    }

    /// Distinct period filter options over all stored payslips.
    #[instrument(skip(self))]
    pub async fn period_filters(
        &self,
        actor: &Actor,
    ) -> Result<crate::period::PeriodFilters, ServiceError> {
        use sea_orm::QuerySelect;

        require_capability(actor, Capability::ViewAllPayslips)?;

        let db = &*self.db;
        let labels: Vec<String> = PayslipEntity::find()
            .select_only()
            .column(payslip::Column::MonthYear)
            .distinct()
            .into_tuple()
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(crate::period::build_period_filters(labels))
    }

    async fn payslip_exists<C: ConnectionTrait>(
        &self,
        conn: &C,
        employee_id: Uuid,
        period_label: &str,
    ) -> Result<bool, ServiceError> {
        let count = PayslipEntity::find()
            .filter(payslip::Column::EmployeeId.eq(employee_id))
            .filter(payslip::Column::MonthYear.eq(period_label))
            .count(conn)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(count > 0)
    }

    /// Assembles the immutable-at-creation snapshot: organizational fields
    /// copied from the employee now, financials computed from the monthly
    /// salary and effective rates.
    fn build_snapshot(
        &self,
        employee: &EmployeeModel,
        period_label: &str,
        district: Option<&str>,
        ssnit_rate: Option<Decimal>,
        tier2_rate: Option<Decimal>,
        generated_by: Uuid,
    ) -> Result<PayslipActiveModel, ServiceError> {
        let ssnit_rate = ssnit_rate.unwrap_or(self.payroll.ssnit_rate);
        let tier2_rate = tier2_rate.unwrap_or(self.payroll.tier2_rate);
        let district = district
            .filter(|d| !d.is_empty())
            .unwrap_or(&self.payroll.default_district);

        let basic_salary = employee.monthly_salary;
        let allowances = Decimal::ZERO;
        let other_deductions = Decimal::ZERO;
        let gross_salary = basic_salary + allowances;

        let ssnit = tax::calculate_ssnit(gross_salary, ssnit_rate)?;
        let tier2 = tax::calculate_tier2(gross_salary, tier2_rate)?;
        let income_tax = tax::calculate_income_tax(gross_salary)?;
        let net_salary = gross_salary - ssnit - tier2 - income_tax - other_deductions;

        let now = Utc::now();
        Ok(PayslipActiveModel {
            id: Set(Uuid::new_v4()),
            employee_id: Set(employee.id),
            month_year: Set(period_label.to_string()),
            agency: Set(self.payroll.agency_name.clone()),
            district: Set(district.to_string()),
            department: Set(employee.department.clone()),
            unit: Set(employee.unit.clone()),
            grade: Set(employee.grade.clone()),
            level: Set(employee.level.clone()),
            basic_salary: Set(basic_salary),
            allowances: Set(allowances),
            gross_salary: Set(gross_salary),
            ssnit_deduction: Set(ssnit),
            tier2_deduction: Set(tier2),
            income_tax: Set(income_tax),
            other_deductions: Set(other_deductions),
            net_salary: Set(net_salary),
            payment_mode: Set(employee.payment_mode()),
            status: Set(ApprovalStatus::Pending.as_str().to_string()),
            approved_by: Set(None),
            approved_at: Set(None),
            generated_by: Set(generated_by),
            generated_at: Set(now),
            last_modified_by: Set(None),
            last_modified_at: Set(now),
        })
    }
}

/// Composes the audit reason from a mandatory code/summary and optional
/// free-text detail. An all-whitespace reason is a validation failure.
pub(crate) fn compose_reason(
    reason: &str,
    details: Option<&str>,
) -> Result<String, ServiceError> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(ServiceError::ValidationError(
            "A reason is required".to_string(),
        ));
    }
    Ok(match details.map(str::trim).filter(|d| !d.is_empty()) {
        Some(details) => format!("{} - {}", reason, details),
        None => reason.to_string(),
    })
}

/// Appends one audit row inside the caller's transaction.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn write_audit<C: ConnectionTrait>(
    conn: &C,
    payslip_id: Uuid,
    action: AuditAction,
    old_status: ApprovalStatus,
    new_status: ApprovalStatus,
    reason: &str,
    performed_by: Uuid,
    performed_at: DateTime<Utc>,
) -> Result<(), ServiceError> {
    let audit = AuditActiveModel {
        id: Set(Uuid::new_v4()),
        payslip_id: Set(payslip_id),
        action: Set(action.as_str().to_string()),
        old_status: Set(old_status.as_str().to_string()),
        new_status: Set(new_status.as_str().to_string()),
        reason: Set(reason.to_string()),
        performed_by: Set(performed_by),
        performed_at: Set(performed_at),
    };
    audit.insert(conn).await.map_err(|e| {
        error!(error = %e, "Failed to write audit entry");
        ServiceError::DatabaseError(e)
    })?;
    Ok(())
}
