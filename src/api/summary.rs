//! Monthly ledger, settlement, and invoice endpoints. All admin-only.

use super::AppState;
use super::auth::CurrentMember;
use crate::core::{member, summary};
use crate::errors::Result;
use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

/// GET /api/summary/:month
///
/// Materializes any missing settlement rows for the month, then returns the
/// full per-member ledger. The ensure step is the only write; viewing the
/// same month again returns identical totals.
pub async fn get_month_summary(
    State(state): State<AppState>,
    caller: CurrentMember,
    Path(month): Path<String>,
) -> Result<Json<summary::MonthLedger>> {
    caller.require_admin()?;

    let members = member::list_current_members(&state.db).await?;
    let member_ids: Vec<i64> = members.iter().map(|m| m.id).collect();
    summary::ensure_settlement_rows(&state.db, &month, &member_ids).await?;

    let ledger = summary::compute_ledger(&state.db, &month).await?;
    Ok(Json(ledger))
}

/// Body for PUT /api/summary/:month/payment.
#[derive(Debug, Deserialize)]
pub struct PaymentBody {
    /// Internal id of the member being settled
    pub member_id: i64,
    /// Settlement fields; omitted fields reset to zero/empty
    #[serde(flatten)]
    pub settlement: summary::SettlementInput,
}

/// PUT /api/summary/:month/payment
///
/// Full-replacement upsert of one member's settlement row.
pub async fn put_payment(
    State(state): State<AppState>,
    caller: CurrentMember,
    Path(month): Path<String>,
    Json(body): Json<PaymentBody>,
) -> Result<Json<crate::entities::monthly_summary::Model>> {
    caller.require_admin()?;

    let saved =
        summary::upsert_settlement(&state.db, &month, body.member_id, body.settlement).await?;
    Ok(Json(saved))
}

/// GET /api/summary/:month/admin-expenses
pub async fn get_admin_expenses(
    State(state): State<AppState>,
    caller: CurrentMember,
    Path(month): Path<String>,
) -> Result<Json<summary::AdminExpenses>> {
    caller.require_admin()?;

    let view = summary::admin_expenses(&state.db, &month).await?;
    Ok(Json(view))
}

/// GET /api/summary/:month/invoice/:member_id
pub async fn get_invoice(
    State(state): State<AppState>,
    caller: CurrentMember,
    Path((month, member_id)): Path<(String, i64)>,
) -> Result<Json<summary::MemberInvoice>> {
    caller.require_admin()?;

    let invoice = summary::member_invoice(&state.db, &month, member_id).await?;
    Ok(Json(invoice))
}
