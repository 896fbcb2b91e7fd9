use crate::{
    auth::{require_capability, Actor, Capability},
    db::DbPool,
    entities::payslip::Entity as PayslipEntity,
    entities::payslip_line_item::{
        self, ActiveModel as LineItemActiveModel, Entity as LineItemEntity, ItemType,
        Model as LineItemModel,
    },
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddLineItemRequest {
    pub item_type: ItemType,
    pub category: Option<String>,
    #[validate(length(min = 1, message = "Nature/description is required"))]
    pub nature: String,
    pub hours_or_amount: Decimal,
    pub rate_percent: Decimal,
    pub balance: Decimal,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LineItemResponse {
    pub id: Uuid,
    pub payslip_id: Uuid,
    pub item_type: ItemType,
    pub category: Option<String>,
    pub nature: String,
    pub hours_or_amount: Decimal,
    pub rate_percent: Decimal,
    pub balance: Decimal,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

/// Itemized totals over the ledger. Supplementary detail only: net salary
/// derives from the payslip's four fixed deduction fields.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LineItemTotals {
    pub payments: Decimal,
    pub deductions: Decimal,
}

fn line_item_to_response(model: LineItemModel) -> LineItemResponse {
    let item_type = model.item_type();
    LineItemResponse {
        id: model.id,
        payslip_id: model.payslip_id,
        item_type,
        category: model.category,
        nature: model.nature,
        hours_or_amount: model.hours_or_amount,
        rate_percent: model.rate_percent,
        balance: model.balance,
        sort_order: model.sort_order,
        created_at: model.created_at,
    }
}

/// Append-only ledger of itemized payments and deductions per payslip.
#[derive(Clone)]
pub struct LineItemService {
    db: Arc<DbPool>,
}

impl LineItemService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Appends a line item to a payslip.
    #[instrument(skip(self, request), fields(payslip_id = %payslip_id))]
    pub async fn add_line_item(
        &self,
        actor: &Actor,
        payslip_id: Uuid,
        request: AddLineItemRequest,
    ) -> Result<LineItemResponse, ServiceError> {
        require_capability(actor, Capability::EditPayslips)?;
        request.validate()?;

        if request.hours_or_amount.is_sign_negative() || request.rate_percent.is_sign_negative() {
            return Err(ServiceError::ValidationError(
                "Hours/amount and rate must not be negative".to_string(),
            ));
        }

        let db = &*self.db;
        let payslip = PayslipEntity::find_by_id(payslip_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if payslip.is_none() {
            return Err(ServiceError::NotFound(format!(
                "Payslip {} not found",
                payslip_id
            )));
        }

        let item = LineItemActiveModel {
            id: Set(Uuid::new_v4()),
            payslip_id: Set(payslip_id),
            item_type: Set(request.item_type.as_str().to_string()),
            category: Set(request.category),
            nature: Set(request.nature),
            hours_or_amount: Set(request.hours_or_amount),
            rate_percent: Set(request.rate_percent),
            balance: Set(request.balance),
            sort_order: Set(request.sort_order),
            created_at: Set(Utc::now()),
        };

        let inserted = item.insert(db).await.map_err(|e| {
            error!(error = %e, "Failed to insert line item");
            ServiceError::DatabaseError(e)
        })?;

        info!(line_item_id = %inserted.id, "Line item added");
        Ok(line_item_to_response(inserted))
    }

    /// Line items for one payslip, ordered by explicit sort key then
    /// creation order.
    #[instrument(skip(self), fields(payslip_id = %payslip_id))]
    pub async fn list_line_items(
        &self,
        actor: &Actor,
        payslip_id: Uuid,
    ) -> Result<Vec<LineItemResponse>, ServiceError> {
        require_capability(actor, Capability::ViewAllPayslips)?;

        let db = &*self.db;
        let items = LineItemEntity::find()
            .filter(payslip_line_item::Column::PayslipId.eq(payslip_id))
            .order_by_asc(payslip_line_item::Column::SortOrder)
            .order_by_asc(payslip_line_item::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(items.into_iter().map(line_item_to_response).collect())
    }

    /// Sums line item balances per kind.
    #[instrument(skip(self), fields(payslip_id = %payslip_id))]
    pub async fn itemized_totals(
        &self,
        actor: &Actor,
        payslip_id: Uuid,
    ) -> Result<LineItemTotals, ServiceError> {
        require_capability(actor, Capability::ViewAllPayslips)?;

        let db = &*self.db;
        let items = LineItemEntity::find()
            .filter(payslip_line_item::Column::PayslipId.eq(payslip_id))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let mut totals = LineItemTotals::default();
        for item in items {
            match item.item_type() {
                ItemType::Payment => totals.payments += item.balance,
                ItemType::Deduction => totals.deductions += item.balance,
            }
        }
        Ok(totals)
    }
}
