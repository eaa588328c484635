//! Market duty endpoints: self-request, manual assignment, approve/reject.

use super::AppState;
use super::auth::CurrentMember;
use crate::core::{market, member};
use crate::entities::market_duty::Model as MarketDutyModel;
use crate::errors::{Error, Result};
use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

/// Query parameters for GET /api/market.
#[derive(Debug, Deserialize)]
pub struct DutiesQuery {
    /// Month key, `YYYY-MM`
    pub month: String,
}

/// GET /api/market?month=YYYY-MM
pub async fn list_duties(
    State(state): State<AppState>,
    _caller: CurrentMember,
    Query(query): Query<DutiesQuery>,
) -> Result<Json<Vec<MarketDutyModel>>> {
    let duties = market::list_month_duties(&state.db, &query.month).await?;
    Ok(Json(duties))
}

/// Body for POST /api/market.
#[derive(Debug, Deserialize)]
pub struct CreateDutyBody {
    /// Duty date, `YYYY-MM-DD`
    pub date: String,
    /// Admin only: assign this member directly (approved, no pending stage)
    pub member_id: Option<i64>,
}

/// POST /api/market
///
/// Without `member_id` this is a self-request and lands pending. With
/// `member_id` it is an admin manual assignment, approved immediately.
pub async fn create_duty(
    State(state): State<AppState>,
    caller: CurrentMember,
    Json(body): Json<CreateDutyBody>,
) -> Result<Json<MarketDutyModel>> {
    match body.member_id {
        None => {
            let duty = market::request_duty(
                &state.db,
                body.date,
                caller.0.id,
                caller.0.name.clone(),
            )
            .await?;
            Ok(Json(duty))
        }
        Some(id) => {
            caller.require_admin()?;
            let target = member::get_member_by_id(&state.db, id)
                .await?
                .ok_or_else(|| Error::NotFound {
                    what: format!("Member {id}"),
                })?;
            let duty =
                market::assign_duty(&state.db, body.date, target.id, target.name).await?;
            Ok(Json(duty))
        }
    }
}

/// Body for PUT /api/market/id/:id.
#[derive(Debug, Deserialize)]
pub struct DecideDutyBody {
    /// `"approve"` or `"reject"`
    pub action: String,
}

/// PUT /api/market/id/:id
///
/// Approval is admin-only and settles the whole date. Rejection is allowed
/// for an admin or the original requester.
pub async fn decide_duty(
    State(state): State<AppState>,
    caller: CurrentMember,
    Path(duty_id): Path<i64>,
    Json(body): Json<DecideDutyBody>,
) -> Result<Json<serde_json::Value>> {
    match body.action.as_str() {
        "approve" => {
            caller.require_admin()?;
            let approved = market::approve_duty(&state.db, duty_id).await?;
            Ok(Json(serde_json::json!({ "approved": approved })))
        }
        "reject" => {
            let duty = market::get_duty_by_id(&state.db, duty_id)
                .await?
                .ok_or_else(|| Error::NotFound {
                    what: format!("Market duty {duty_id}"),
                })?;
            let by_admin = caller.is_admin() && duty.member_id != caller.0.id;
            if !caller.is_admin() && duty.member_id != caller.0.id {
                return Err(Error::Forbidden {
                    message: "Not your duty request".to_string(),
                });
            }
            market::reject_duty(&state.db, duty_id, by_admin).await?;
            Ok(Json(serde_json::json!({ "rejected": duty_id })))
        }
        other => Err(Error::Validation {
            message: format!("Unknown action: {other}"),
        }),
    }
}

/// DELETE /api/market/id/:id
///
/// A member withdrawing their own pending request; equivalent to reject.
pub async fn withdraw_duty(
    State(state): State<AppState>,
    caller: CurrentMember,
    Path(duty_id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let duty = market::get_duty_by_id(&state.db, duty_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            what: format!("Market duty {duty_id}"),
        })?;
    if !caller.is_admin() && duty.member_id != caller.0.id {
        return Err(Error::Forbidden {
            message: "Not your duty request".to_string(),
        });
    }

    let by_admin = caller.is_admin() && duty.member_id != caller.0.id;
    market::reject_duty(&state.db, duty_id, by_admin).await?;
    Ok(Json(serde_json::json!({ "rejected": duty_id })))
}
