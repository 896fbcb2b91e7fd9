use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::Actor,
    errors::ServiceError,
    services::line_items::AddLineItemRequest,
    services::payslips::{
        BulkGenerateRequest, EditPayslipRequest, GeneratePayslipRequest, PayslipListFilter,
    },
    ApiResponse, AppState, ListQuery,
};

/// Routes for payslip generation, approval workflow, line items and audit.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(generate).get(list))
        .route("/bulk-generate", post(bulk_generate))
        .route("/bulk-approve", post(bulk_approve))
        .route("/periods", get(period_filters))
        .route(
            "/:id",
            get(get_payslip).put(edit_payslip).delete(delete_payslip),
        )
        .route("/:id/approve", post(approve))
        .route("/:id/reject", post(reject))
        .route("/:id/revert", post(revert))
        .route("/:id/audit", get(audit_trail))
        .route(
            "/:id/line-items",
            post(add_line_item).get(list_line_items),
        )
        .route("/:id/line-items/totals", get(line_item_totals))
        .route("/:id/snapshot", get(resolved_snapshot))
}

async fn generate(
    State(state): State<AppState>,
    actor: Actor,
    Json(request): Json<GeneratePayslipRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let payslip = state.services.payslips.generate(&actor, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            payslip,
            "Payslip generated successfully",
        )),
    ))
}

async fn bulk_generate(
    State(state): State<AppState>,
    actor: Actor,
    Json(request): Json<BulkGenerateRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let summary = state
        .services
        .payslips
        .bulk_generate(&actor, request)
        .await?;
    let message = format!(
        "Generated {} payslips, skipped {}, failed {}",
        summary.created, summary.skipped, summary.failed
    );
    Ok(Json(ApiResponse::success_with_message(summary, &message)))
}

#[derive(Debug, Deserialize)]
struct PayslipListQuery {
    #[serde(default = "ListQuery::default_page")]
    page: u64,
    #[serde(default = "ListQuery::default_limit")]
    limit: u64,
    status: Option<crate::entities::payslip::ApprovalStatus>,
    employee_id: Option<Uuid>,
    month: Option<String>,
    year: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<PayslipListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let filter = PayslipListFilter {
        status: query.status,
        employee_id: query.employee_id,
        month: query.month,
        year: query.year,
    };
    let list = state
        .services
        .payslips
        .list_payslips(&actor, filter, query.page, query.limit)
        .await?;
    Ok(Json(ApiResponse::success(list)))
}

async fn get_payslip(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let payslip = state
        .services
        .payslips
        .get_payslip(&actor, id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Payslip {} not found", id)))?;
    Ok(Json(ApiResponse::success(payslip)))
}

async fn edit_payslip(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(request): Json<EditPayslipRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let payslip = state
        .services
        .payslips
        .edit_payslip(&actor, id, request)
        .await?;
    Ok(Json(ApiResponse::success_with_message(
        payslip,
        "Payslip updated",
    )))
}

async fn delete_payslip(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.payslips.delete_payslip(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn approve(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let payslip = state.services.approvals.approve(&actor, id).await?;
    Ok(Json(ApiResponse::success_with_message(
        payslip,
        "Payslip approved",
    )))
}

async fn reject(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let payslip = state.services.approvals.reject(&actor, id).await?;
    Ok(Json(ApiResponse::success_with_message(
        payslip,
        "Payslip rejected",
    )))
}

#[derive(Debug, Deserialize)]
struct RevertRequest {
    reason: String,
    reason_details: Option<String>,
}

async fn revert(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(request): Json<RevertRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let outcome = state
        .services
        .approvals
        .revert(&actor, id, &request.reason, request.reason_details.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(outcome)))
}

#[derive(Debug, Deserialize)]
struct BulkApproveRequest {
    payslip_ids: Vec<Uuid>,
}

async fn bulk_approve(
    State(state): State<AppState>,
    actor: Actor,
    Json(request): Json<BulkApproveRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let count = state
        .services
        .approvals
        .bulk_approve(&actor, request.payslip_ids)
        .await?;
    let message = format!("{} payslips approved", count);
    Ok(Json(ApiResponse::success_with_message(count, &message)))
}

async fn audit_trail(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let trail = state.services.approvals.audit_trail(&actor, id).await?;
    Ok(Json(ApiResponse::success(trail)))
}

async fn add_line_item(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(request): Json<AddLineItemRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state
        .services
        .line_items
        .add_line_item(&actor, id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(item))))
}

async fn list_line_items(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let items = state
        .services
        .line_items
        .list_line_items(&actor, id)
        .await?;
    Ok(Json(ApiResponse::success(items)))
}

async fn line_item_totals(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let totals = state
        .services
        .line_items
        .itemized_totals(&actor, id)
        .await?;
    Ok(Json(ApiResponse::success(totals)))
}

async fn period_filters(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<impl IntoResponse, ServiceError> {
    let filters = state.services.payslips.period_filters(&actor).await?;
    Ok(Json(ApiResponse::success(filters)))
}

async fn resolved_snapshot(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let snapshot = state
        .services
        .payslips
        .resolved_snapshot(&actor, id)
        .await?;
    Ok(Json(ApiResponse::success(snapshot)))
}
