//! Meal endpoints. Self-scoped: members manage their own meals; admins may
//! act on anyone's behalf.

use super::AppState;
use super::auth::CurrentMember;
use crate::core::{meal, member};
use crate::entities::meal::Model as MealModel;
use crate::errors::{Error, Result};
use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

/// Query parameters for GET /api/meals.
#[derive(Debug, Deserialize)]
pub struct MealsQuery {
    /// Month key, `YYYY-MM`
    pub month: String,
}

/// GET /api/meals?month=YYYY-MM
///
/// Admins see every meal in the month; members see their own.
pub async fn list_meals(
    State(state): State<AppState>,
    caller: CurrentMember,
    Query(query): Query<MealsQuery>,
) -> Result<Json<Vec<MealModel>>> {
    let mut meals = meal::list_month_meals(&state.db, &query.month).await?;
    if !caller.is_admin() {
        meals.retain(|m| member::member_matches(&caller.0, &m.member_key));
    }
    Ok(Json(meals))
}

/// Body for POST /api/meals.
#[derive(Debug, Deserialize)]
pub struct CreateMealBody {
    /// `YYYY-MM-DD`
    pub date: String,
    /// `"lunch"` or `"dinner"`
    pub meal_type: String,
    /// Admin only: record on behalf of this member
    pub member_id: Option<i64>,
}

/// POST /api/meals
pub async fn create_meal(
    State(state): State<AppState>,
    caller: CurrentMember,
    Json(body): Json<CreateMealBody>,
) -> Result<Json<MealModel>> {
    let member_key = resolve_target_key(&state, &caller, body.member_id).await?;
    let created = meal::create_meal(&state.db, member_key, body.date, &body.meal_type).await?;
    Ok(Json(created))
}

/// Body for POST /api/meals/guest.
#[derive(Debug, Deserialize)]
pub struct CreateGuestMealBody {
    /// `YYYY-MM-DD`
    pub date: String,
    /// What the guest will be served
    pub food_type: String,
    /// `"lunch"` or `"dinner"`
    pub meal_slot: String,
    /// Admin only: record on behalf of this member
    pub member_id: Option<i64>,
}

/// POST /api/meals/guest
pub async fn create_guest_meal(
    State(state): State<AppState>,
    caller: CurrentMember,
    Json(body): Json<CreateGuestMealBody>,
) -> Result<Json<crate::entities::guest_meal::Model>> {
    let member_key = resolve_target_key(&state, &caller, body.member_id).await?;
    let created = meal::create_guest_meal(
        &state.db,
        member_key,
        body.date,
        body.food_type,
        &body.meal_slot,
    )
    .await?;
    Ok(Json(created))
}

/// DELETE /api/meals/:id (owner or admin)
pub async fn delete_meal(
    State(state): State<AppState>,
    caller: CurrentMember,
    Path(meal_id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let existing = meal::get_meal_by_id(&state.db, meal_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            what: format!("Meal {meal_id}"),
        })?;
    if !caller.is_admin() && !member::member_matches(&caller.0, &existing.member_key) {
        return Err(Error::Forbidden {
            message: "Not your meal".to_string(),
        });
    }

    meal::delete_meal(&state.db, meal_id).await?;
    Ok(Json(serde_json::json!({ "deleted": meal_id })))
}

/// Resolves whose canonical key a meal write targets: the caller's own, or -
/// for admins - any member's.
async fn resolve_target_key(
    state: &AppState,
    caller: &CurrentMember,
    member_id: Option<i64>,
) -> Result<String> {
    match member_id {
        None => Ok(member::canonical_key(&caller.0)),
        Some(id) if id == caller.0.id => Ok(member::canonical_key(&caller.0)),
        Some(id) => {
            caller.require_admin()?;
            let target = member::get_member_by_id(&state.db, id)
                .await?
                .ok_or_else(|| Error::NotFound {
                    what: format!("Member {id}"),
                })?;
            Ok(member::canonical_key(&target))
        }
    }
}
