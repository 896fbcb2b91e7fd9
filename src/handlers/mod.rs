pub mod payslips;

use std::sync::Arc;

use crate::config::PayrollConfig;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    approvals::ApprovalService, line_items::LineItemService, payslips::PayslipService,
};

/// Aggregated services used by the HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub payslips: Arc<PayslipService>,
    pub approvals: Arc<ApprovalService>,
    pub line_items: Arc<LineItemService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, payroll: PayrollConfig, event_sender: Arc<EventSender>) -> Self {
        Self {
            payslips: Arc::new(PayslipService::new(
                db.clone(),
                payroll,
                Some(event_sender.clone()),
            )),
            approvals: Arc::new(ApprovalService::new(db.clone(), Some(event_sender))),
            line_items: Arc::new(LineItemService::new(db)),
        }
    }
}
