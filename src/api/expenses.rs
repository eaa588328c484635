//! Expense endpoints: CRUD plus the admin-only status transition.

use super::AppState;
use super::auth::CurrentMember;
use crate::core::{expense, member};
use crate::entities::expense::Model as ExpenseModel;
use crate::errors::{Error, Result};
use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

/// GET /api/expenses
///
/// Audit view: every expense including pending and rejected rows. Members
/// see it too; only the money totals elsewhere are restricted to approved.
pub async fn list_expenses(
    State(state): State<AppState>,
    _caller: CurrentMember,
) -> Result<Json<Vec<ExpenseModel>>> {
    let expenses = expense::list_expenses(&state.db).await?;
    Ok(Json(expenses))
}

/// Body for POST /api/expenses.
#[derive(Debug, Deserialize)]
pub struct CreateExpenseBody {
    /// Human-readable description
    pub description: String,
    /// Positive amount
    pub amount: f64,
    /// One of the closed category strings
    pub category: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// Admin only: attribute to another member (id) or `"admin"`
    pub paid_by: Option<String>,
}

/// POST /api/expenses
///
/// Members create self-attributed pending expenses with their canonical id.
/// Admin-created expenses are pre-approved and may name any payer.
pub async fn create_expense(
    State(state): State<AppState>,
    caller: CurrentMember,
    Json(body): Json<CreateExpenseBody>,
) -> Result<Json<ExpenseModel>> {
    let (paid_by, status) = if caller.is_admin() {
        let paid_by = body
            .paid_by
            .unwrap_or_else(|| expense::PAID_BY_ADMIN.to_string());
        (paid_by, expense::STATUS_APPROVED)
    } else {
        if body.paid_by.is_some() {
            return Err(Error::Forbidden {
                message: "Only admins can attribute expenses to others".to_string(),
            });
        }
        (member::canonical_key(&caller.0), expense::STATUS_PENDING)
    };

    let created = expense::create_expense(
        &state.db,
        body.description,
        body.amount,
        &body.category,
        paid_by,
        body.date,
        status,
    )
    .await?;
    Ok(Json(created))
}

/// Body for PUT /api/expenses/:id.
#[derive(Debug, Deserialize)]
pub struct UpdateExpenseBody {
    /// New description
    pub description: Option<String>,
    /// New amount
    pub amount: Option<f64>,
    /// New category
    pub category: Option<String>,
    /// New date
    pub date: Option<String>,
    /// Admin only: `"approved"` or `"rejected"`
    pub status: Option<String>,
}

/// PUT /api/expenses/:id
///
/// A status in the body is an admin-only transition; field edits are allowed
/// for the owner or an admin.
pub async fn update_expense(
    State(state): State<AppState>,
    caller: CurrentMember,
    Path(expense_id): Path<i64>,
    Json(body): Json<UpdateExpenseBody>,
) -> Result<Json<ExpenseModel>> {
    if let Some(status) = body.status {
        caller.require_admin()?;
        let updated = expense::set_expense_status(&state.db, expense_id, &status).await?;
        return Ok(Json(updated));
    }

    let existing = expense::get_expense_by_id(&state.db, expense_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            what: format!("Expense {expense_id}"),
        })?;
    if !caller.is_admin() && !member::member_matches(&caller.0, &existing.paid_by) {
        return Err(Error::Forbidden {
            message: "Not your expense".to_string(),
        });
    }

    let updated = expense::update_expense(
        &state.db,
        expense_id,
        body.description,
        body.amount,
        body.category,
        body.date,
    )
    .await?;
    Ok(Json(updated))
}

/// DELETE /api/expenses/:id (owner or admin)
pub async fn delete_expense(
    State(state): State<AppState>,
    caller: CurrentMember,
    Path(expense_id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let existing = expense::get_expense_by_id(&state.db, expense_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            what: format!("Expense {expense_id}"),
        })?;
    if !caller.is_admin() && !member::member_matches(&caller.0, &existing.paid_by) {
        return Err(Error::Forbidden {
            message: "Not your expense".to_string(),
        });
    }

    expense::delete_expense(&state.db, expense_id).await?;
    Ok(Json(serde_json::json!({ "deleted": expense_id })))
}
