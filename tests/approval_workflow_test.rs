mod common;

use common::*;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use payroll_api::auth::Actor;
use payroll_api::entities::payslip::ApprovalStatus;
use payroll_api::entities::payslip_audit::{self, AuditAction};
use payroll_api::entities::payslip_line_item;
use payroll_api::errors::ServiceError;
use payroll_api::services::approvals::RevertOutcome;
use payroll_api::services::line_items::AddLineItemRequest;
use payroll_api::services::payslips::{EditPayslipRequest, GeneratePayslipRequest, PayslipResponse};

async fn generate_payslip(app: &TestApp, actor: &Actor, staff_id: &str) -> PayslipResponse {
    let emp = seed_employee(&app.db, staff_id, dec!(920.00), true).await;
    app.services
        .payslips
        .generate(
            actor,
            GeneratePayslipRequest {
                employee_id: emp.id,
                period: "Jan-2026".parse().unwrap(),
                district: None,
                ssnit_rate: None,
                tier2_rate: None,
            },
        )
        .await
        .expect("generation failed")
}

#[tokio::test]
async fn approve_sets_approver_and_timestamp_together() {
    let app = setup().await;
    let actor = finance_actor();
    let payslip = generate_payslip(&app, &actor, "CA1000").await;

    let approved = app
        .services
        .approvals
        .approve(&actor, payslip.id)
        .await
        .expect("approval failed");

    assert_eq!(approved.status, ApprovalStatus::Approved);
    assert_eq!(approved.approved_by, Some(actor.id));
    assert!(approved.approved_at.is_some());
}

#[tokio::test]
async fn approve_is_only_valid_from_pending() {
    let app = setup().await;
    let actor = finance_actor();
    let payslip = generate_payslip(&app, &actor, "CA1001").await;

    app.services
        .approvals
        .approve(&actor, payslip.id)
        .await
        .unwrap();
    let err = app
        .services
        .approvals
        .approve(&actor, payslip.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidStatus(_)));

    let err = app
        .services
        .approvals
        .reject(&actor, payslip.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidStatus(_)));
}

#[tokio::test]
async fn reject_never_touches_the_approval_fields() {
    let app = setup().await;
    let actor = finance_actor();
    let payslip = generate_payslip(&app, &actor, "CA1002").await;

    let rejected = app
        .services
        .approvals
        .reject(&actor, payslip.id)
        .await
        .expect("rejection failed");

    assert_eq!(rejected.status, ApprovalStatus::Rejected);
    assert!(rejected.approved_by.is_none());
    assert!(rejected.approved_at.is_none());
}

#[tokio::test]
async fn approval_actions_require_capability() {
    let app = setup().await;
    let finance = finance_actor();
    let staff = staff_actor();
    let payslip = generate_payslip(&app, &finance, "CA1003").await;

    let err = app
        .services
        .approvals
        .approve(&staff, payslip.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let err = app
        .services
        .approvals
        .revert(&staff, payslip.id, "mistake", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    // The read side is gated too: staff cannot inspect the trail or ledger.
    let err = app
        .services
        .approvals
        .audit_trail(&staff, payslip.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let err = app
        .services
        .line_items
        .list_line_items(&staff, payslip.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let err = app
        .services
        .line_items
        .itemized_totals(&staff, payslip.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
}

#[tokio::test]
async fn revert_clears_approval_and_writes_an_audit_row() {
    let app = setup().await;
    let actor = finance_actor();
    let payslip = generate_payslip(&app, &actor, "CA1004").await;

    app.services
        .approvals
        .approve(&actor, payslip.id)
        .await
        .unwrap();

    let outcome = app
        .services
        .approvals
        .revert(&actor, payslip.id, "Wrong rate", Some("SSNIT should be 6%"))
        .await
        .expect("revert failed");

    let reverted = match outcome {
        RevertOutcome::Reverted(p) => p,
        RevertOutcome::AlreadyPending(_) => panic!("expected a real revert"),
    };
    assert_eq!(reverted.status, ApprovalStatus::Pending);
    assert!(reverted.approved_by.is_none());
    assert!(reverted.approved_at.is_none());

    let trail = app
        .services
        .approvals
        .audit_trail(&actor, payslip.id)
        .await
        .expect("audit trail failed");
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].action, AuditAction::Revert);
    assert_eq!(trail[0].old_status, "approved");
    assert_eq!(trail[0].new_status, "pending");
    assert_eq!(trail[0].reason, "Wrong rate - SSNIT should be 6%");
    assert_eq!(trail[0].performed_by, actor.id);
}

#[tokio::test]
async fn revert_requires_a_reason() {
    let app = setup().await;
    let actor = finance_actor();
    let payslip = generate_payslip(&app, &actor, "CA1005").await;

    app.services
        .approvals
        .approve(&actor, payslip.id)
        .await
        .unwrap();

    let err = app
        .services
        .approvals
        .revert(&actor, payslip.id, "   ", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));

    // The payslip is untouched by the failed revert.
    let current = app
        .services
        .payslips
        .get_payslip(&actor, payslip.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(current.status, ApprovalStatus::Approved);
    assert!(current.approved_by.is_some());
}

#[tokio::test]
async fn revert_of_a_pending_payslip_is_a_noop_without_audit() {
    let app = setup().await;
    let actor = finance_actor();
    let payslip = generate_payslip(&app, &actor, "CA1006").await;

    let outcome = app
        .services
        .approvals
        .revert(&actor, payslip.id, "no-op", None)
        .await
        .expect("revert failed");
    assert!(matches!(outcome, RevertOutcome::AlreadyPending(_)));

    let trail = app.services.approvals.audit_trail(&actor, payslip.id).await.unwrap();
    assert!(trail.is_empty());
}

#[tokio::test]
async fn edit_reverts_approved_payslip_and_audits_the_change() {
    let app = setup().await;
    let actor = finance_actor();
    let payslip = generate_payslip(&app, &actor, "CA1007").await;

    app.services
        .approvals
        .approve(&actor, payslip.id)
        .await
        .unwrap();

    let edited = app
        .services
        .payslips
        .edit_payslip(
            &actor,
            payslip.id,
            EditPayslipRequest {
                basic_salary: Some(dec!(1000.00)),
                allowances: Some(dec!(50.00)),
                reason: "Salary adjustment".to_string(),
                ..Default::default()
            },
        )
        .await
        .expect("edit failed");

    // Gross and net recomputed; approval invalidated.
    assert_eq!(edited.gross_salary.round_dp(2), dec!(1050.00));
    assert_eq!(
        (edited.gross_salary - edited.total_deductions).round_dp(2),
        edited.net_salary.round_dp(2)
    );
    assert_eq!(edited.status, ApprovalStatus::Pending);
    assert!(edited.approved_by.is_none());
    assert!(edited.approved_at.is_none());
    assert_eq!(edited.last_modified_by, Some(actor.id));

    let trail = app.services.approvals.audit_trail(&actor, payslip.id).await.unwrap();
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].action, AuditAction::Edit);
    assert_eq!(trail[0].old_status, "approved");
    assert_eq!(trail[0].new_status, "pending");
}

#[tokio::test]
async fn edit_of_a_pending_payslip_keeps_it_pending() {
    let app = setup().await;
    let actor = finance_actor();
    let payslip = generate_payslip(&app, &actor, "CA1008").await;

    let edited = app
        .services
        .payslips
        .edit_payslip(
            &actor,
            payslip.id,
            EditPayslipRequest {
                other_deductions: Some(dec!(25.00)),
                reason: "Canteen levy".to_string(),
                ..Default::default()
            },
        )
        .await
        .expect("edit failed");

    assert_eq!(edited.status, ApprovalStatus::Pending);

    // Still exactly one audit row per edit submission.
    let trail = app.services.approvals.audit_trail(&actor, payslip.id).await.unwrap();
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].action, AuditAction::Edit);
    assert_eq!(trail[0].old_status, "pending");
    assert_eq!(trail[0].new_status, "pending");
}

#[tokio::test]
async fn edit_rejects_negative_amounts() {
    let app = setup().await;
    let actor = finance_actor();
    let payslip = generate_payslip(&app, &actor, "CA1009").await;

    let err = app
        .services
        .payslips
        .edit_payslip(
            &actor,
            payslip.id,
            EditPayslipRequest {
                income_tax: Some(dec!(-1.00)),
                reason: "bad".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn bulk_approve_updates_every_listed_payslip() {
    let app = setup().await;
    let actor = finance_actor();
    let a = generate_payslip(&app, &actor, "CA1100").await;
    let b = generate_payslip(&app, &actor, "CA1101").await;
    let c = generate_payslip(&app, &actor, "CA1102").await;

    // Batch approval does not check current status: a rejected slip in the
    // batch moves to approved as well.
    app.services.approvals.reject(&actor, c.id).await.unwrap();

    let count = app
        .services
        .approvals
        .bulk_approve(&actor, vec![a.id, b.id, c.id, Uuid::new_v4()])
        .await
        .expect("bulk approve failed");
    assert_eq!(count, 3);

    for id in [a.id, b.id, c.id] {
        let slip = app.services.payslips.get_payslip(&actor, id).await.unwrap().unwrap();
        assert_eq!(slip.status, ApprovalStatus::Approved);
        assert_eq!(slip.approved_by, Some(actor.id));
        assert!(slip.approved_at.is_some());
    }
}

#[tokio::test]
async fn bulk_approve_of_nothing_is_zero() {
    let app = setup().await;
    let count = app
        .services
        .approvals
        .bulk_approve(&finance_actor(), vec![])
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn delete_cascades_line_items_and_audit_entries() {
    let app = setup().await;
    let finance = finance_actor();
    let admin = admin_actor();
    let payslip = generate_payslip(&app, &finance, "CA1200").await;

    app.services
        .line_items
        .add_line_item(
            &finance,
            payslip.id,
            AddLineItemRequest {
                item_type: payslip_line_item::ItemType::Deduction,
                category: Some("Welfare".to_string()),
                nature: "Union dues".to_string(),
                hours_or_amount: dec!(1),
                rate_percent: dec!(0),
                balance: dec!(10.00),
                sort_order: 0,
            },
        )
        .await
        .expect("line item failed");

    app.services
        .approvals
        .approve(&finance, payslip.id)
        .await
        .unwrap();
    app.services
        .approvals
        .revert(&finance, payslip.id, "rework", None)
        .await
        .unwrap();

    // Finance cannot delete; admin can.
    let err = app
        .services
        .payslips
        .delete_payslip(&finance, payslip.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    app.services
        .payslips
        .delete_payslip(&admin, payslip.id)
        .await
        .expect("delete failed");

    assert!(app
        .services
        .payslips
        .get_payslip(&admin, payslip.id)
        .await
        .unwrap()
        .is_none());

    let db = &*app.db;
    let line_items = payslip_line_item::Entity::find()
        .filter(payslip_line_item::Column::PayslipId.eq(payslip.id))
        .count(db)
        .await
        .unwrap();
    assert_eq!(line_items, 0);

    let audits = payslip_audit::Entity::find()
        .filter(payslip_audit::Column::PayslipId.eq(payslip.id))
        .count(db)
        .await
        .unwrap();
    assert_eq!(audits, 0);

    let err = app
        .services
        .payslips
        .delete_payslip(&admin, payslip.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn line_item_totals_split_payments_and_deductions() {
    let app = setup().await;
    let actor = finance_actor();
    let payslip = generate_payslip(&app, &actor, "CA1300").await;

    for (item_type, nature, balance) in [
        (payslip_line_item::ItemType::Payment, "Overtime", dec!(120.00)),
        (payslip_line_item::ItemType::Payment, "Night allowance", dec!(45.50)),
        (payslip_line_item::ItemType::Deduction, "Union dues", dec!(10.00)),
    ] {
        app.services
            .line_items
            .add_line_item(
                &actor,
                payslip.id,
                AddLineItemRequest {
                    item_type,
                    category: None,
                    nature: nature.to_string(),
                    hours_or_amount: dec!(1),
                    rate_percent: dec!(0),
                    balance,
                    sort_order: 0,
                },
            )
            .await
            .expect("line item failed");
    }

    let totals = app
        .services
        .line_items
        .itemized_totals(&actor, payslip.id)
        .await
        .expect("totals failed");
    assert_eq!(totals.payments.round_dp(2), dec!(165.50));
    assert_eq!(totals.deductions.round_dp(2), dec!(10.00));

    let items = app
        .services
        .line_items
        .list_line_items(&actor, payslip.id)
        .await
        .unwrap();
    assert_eq!(items.len(), 3);
}
