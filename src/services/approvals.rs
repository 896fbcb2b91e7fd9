//! Payslip approval state machine.
//!
//! States: `pending` (initial), `approved`, `rejected`. Approve and reject
//! move a pending slip to a terminal state; revert moves a terminal slip
//! back to pending with a mandatory reason and an audit row. Approval
//! fields (`approved_by`, `approved_at`) are set together on approve and
//! cleared together on revert; rejection never touches them.

use crate::{
    auth::{require_capability, Actor, Capability},
    db::DbPool,
    entities::payslip::{
        ActiveModel as PayslipActiveModel, ApprovalStatus, Entity as PayslipEntity,
    },
    entities::payslip_audit::{self, AuditAction, Entity as AuditEntity, Model as AuditModel},
    errors::ServiceError,
    events::{Event, EventSender},
    services::payslips::{compose_reason, payslip_to_response, write_audit, PayslipResponse},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Result of a revert request. Reverting an already-pending payslip is
/// informational, not an error, and writes no audit row.
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RevertOutcome {
    Reverted(PayslipResponse),
    AlreadyPending(PayslipResponse),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuditEntryResponse {
    pub id: Uuid,
    pub payslip_id: Uuid,
    pub action: AuditAction,
    pub old_status: String,
    pub new_status: String,
    pub reason: String,
    pub performed_by: Uuid,
    pub performed_at: DateTime<Utc>,
}

fn audit_to_response(model: AuditModel) -> AuditEntryResponse {
    let action = model.action();
    AuditEntryResponse {
        id: model.id,
        payslip_id: model.payslip_id,
        action,
        old_status: model.old_status,
        new_status: model.new_status,
        reason: model.reason,
        performed_by: model.performed_by,
        performed_at: model.performed_at,
    }
}

/// Service governing payslip status transitions.
#[derive(Clone)]
pub struct ApprovalService {
    db: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl ApprovalService {
    pub fn new(db: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self { db, event_sender }
    }

    /// `pending -> approved`. Sets approver and timestamp together.
    #[instrument(skip(self), fields(payslip_id = %payslip_id))]
    pub async fn approve(
        &self,
        actor: &Actor,
        payslip_id: Uuid,
    ) -> Result<PayslipResponse, ServiceError> {
        require_capability(actor, Capability::ApprovePayslips)?;

        let db = &*self.db;
        let now = Utc::now();

        let payslip = PayslipEntity::find_by_id(payslip_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Payslip {} not found", payslip_id)))?;

        let old_status = payslip.approval_status();
        if old_status != ApprovalStatus::Pending {
            return Err(ServiceError::InvalidStatus(format!(
                "Cannot approve a payslip in status '{}'",
                old_status
            )));
        }

        let mut active: PayslipActiveModel = payslip.into();
        active.status = Set(ApprovalStatus::Approved.as_str().to_string());
        active.approved_by = Set(Some(actor.id));
        active.approved_at = Set(Some(now));
        active.last_modified_by = Set(Some(actor.id));
        active.last_modified_at = Set(now);

        let updated = active.update(db).await.map_err(|e| {
            error!(error = %e, "Failed to approve payslip");
            ServiceError::DatabaseError(e)
        })?;

        info!(payslip_id = %payslip_id, approved_by = %actor.id, "Payslip approved");

        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender
                .send(Event::PayslipApproved {
                    payslip_id,
                    approved_by: actor.id,
                })
                .await
            {
                warn!(error = %e, "Failed to send payslip approved event");
            }
        }

        Ok(payslip_to_response(updated))
    }

    /// `pending -> rejected`. Rejection is a statement, not an approval
    /// record: `approved_by`/`approved_at` are left untouched.
    #[instrument(skip(self), fields(payslip_id = %payslip_id))]
    pub async fn reject(
        &self,
        actor: &Actor,
        payslip_id: Uuid,
    ) -> Result<PayslipResponse, ServiceError> {
        require_capability(actor, Capability::ApprovePayslips)?;

        let db = &*self.db;
        let now = Utc::now();

        let payslip = PayslipEntity::find_by_id(payslip_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Payslip {} not found", payslip_id)))?;

        let old_status = payslip.approval_status();
        if old_status != ApprovalStatus::Pending {
            return Err(ServiceError::InvalidStatus(format!(
                "Cannot reject a payslip in status '{}'",
                old_status
            )));
        }

        let mut active: PayslipActiveModel = payslip.into();
        active.status = Set(ApprovalStatus::Rejected.as_str().to_string());
        active.last_modified_by = Set(Some(actor.id));
        active.last_modified_at = Set(now);

        let updated = active.update(db).await.map_err(|e| {
            error!(error = %e, "Failed to reject payslip");
            ServiceError::DatabaseError(e)
        })?;

        info!(payslip_id = %payslip_id, rejected_by = %actor.id, "Payslip rejected");

        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender
                .send(Event::PayslipRejected {
                    payslip_id,
                    rejected_by: actor.id,
                })
                .await
            {
                warn!(error = %e, "Failed to send payslip rejected event");
            }
        }

        Ok(payslip_to_response(updated))
    }

    /// `{approved, rejected} -> pending`. Requires a non-empty reason,
    /// clears the approval pair, and writes a `revert` audit row in the
    /// same transaction. Reverting a pending slip is a no-op.
    #[instrument(skip(self, reason, reason_details), fields(payslip_id = %payslip_id))]
    pub async fn revert(
        &self,
        actor: &Actor,
        payslip_id: Uuid,
        reason: &str,
        reason_details: Option<&str>,
    ) -> Result<RevertOutcome, ServiceError> {
        require_capability(actor, Capability::ApprovePayslips)?;
        let reason = compose_reason(reason, reason_details)?;

        let db = &*self.db;
        let now = Utc::now();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start revert transaction");
            ServiceError::DatabaseError(e)
        })?;

        let payslip = PayslipEntity::find_by_id(payslip_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Payslip {} not found", payslip_id)))?;

        let old_status = payslip.approval_status();
        if old_status == ApprovalStatus::Pending {
            info!(payslip_id = %payslip_id, "Revert requested on a pending payslip, nothing to do");
            return Ok(RevertOutcome::AlreadyPending(payslip_to_response(payslip)));
        }

        let mut active: PayslipActiveModel = payslip.into();
        active.status = Set(ApprovalStatus::Pending.as_str().to_string());
        active.approved_by = Set(None);
        active.approved_at = Set(None);
        active.last_modified_by = Set(Some(actor.id));
        active.last_modified_at = Set(now);

        let updated = active.update(&txn).await.map_err(|e| {
            error!(error = %e, "Failed to revert payslip");
            ServiceError::DatabaseError(e)
        })?;

        write_audit(
            &txn,
            payslip_id,
            AuditAction::Revert,
            old_status,
            ApprovalStatus::Pending,
            &reason,
            actor.id,
            now,
        )
        .await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, "Failed to commit revert transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(
            payslip_id = %payslip_id,
            old_status = %old_status,
            "Payslip reverted to pending"
        );

        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender
                .send(Event::PayslipReverted {
                    payslip_id,
                    old_status: old_status.as_str().to_string(),
                    reverted_by: actor.id,
                })
                .await
            {
                warn!(error = %e, "Failed to send payslip reverted event");
            }
        }

        Ok(RevertOutcome::Reverted(payslip_to_response(updated)))
    }

    /// Approves a batch of payslips in one transaction.
    ///
    /// Deliberately does not filter by current status (an already-rejected
    /// slip moves to approved); see DESIGN.md. Returns the number of rows
    /// updated.
    #[instrument(skip(self, payslip_ids), fields(count = payslip_ids.len()))]
    pub async fn bulk_approve(
        &self,
        actor: &Actor,
        payslip_ids: Vec<Uuid>,
    ) -> Result<u64, ServiceError> {
        require_capability(actor, Capability::ApprovePayslips)?;

        if payslip_ids.is_empty() {
            return Ok(0);
        }

        let db = &*self.db;
        let now = Utc::now();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start bulk approve transaction");
            ServiceError::DatabaseError(e)
        })?;

        let result = PayslipEntity::update_many()
            .col_expr(
                crate::entities::payslip::Column::Status,
                sea_orm::sea_query::Expr::value(ApprovalStatus::Approved.as_str()),
            )
            .col_expr(
                crate::entities::payslip::Column::ApprovedBy,
                sea_orm::sea_query::Expr::value(actor.id),
            )
            .col_expr(
                crate::entities::payslip::Column::ApprovedAt,
                sea_orm::sea_query::Expr::value(now),
            )
            .col_expr(
                crate::entities::payslip::Column::LastModifiedBy,
                sea_orm::sea_query::Expr::value(actor.id),
            )
            .col_expr(
                crate::entities::payslip::Column::LastModifiedAt,
                sea_orm::sea_query::Expr::value(now),
            )
            .filter(crate::entities::payslip::Column::Id.is_in(payslip_ids))
            .exec(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to bulk approve payslips");
                ServiceError::DatabaseError(e)
            })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, "Failed to commit bulk approve transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(
            approved = result.rows_affected,
            approved_by = %actor.id,
            "Bulk approval finished"
        );

        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender
                .send(Event::PayslipsBulkApproved {
                    count: result.rows_affected,
                    approved_by: actor.id,
                })
                .await
            {
                warn!(error = %e, "Failed to send bulk approved event");
            }
        }

        Ok(result.rows_affected)
    }

    /// Audit trail for one payslip, newest first.
    #[instrument(skip(self), fields(payslip_id = %payslip_id))]
    pub async fn audit_trail(
        &self,
        actor: &Actor,
        payslip_id: Uuid,
    ) -> Result<Vec<AuditEntryResponse>, ServiceError> {
        require_capability(actor, Capability::ViewAllPayslips)?;

        let db = &*self.db;
        let entries = AuditEntity::find()
            .filter(payslip_audit::Column::PayslipId.eq(payslip_id))
            .order_by_desc(payslip_audit::Column::PerformedAt)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(entries.into_iter().map(audit_to_response).collect())
    }
}
