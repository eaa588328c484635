//! Member administration endpoints. Every write invalidates the member
//! cache synchronously before the response is returned.

use super::AppState;
use super::auth::CurrentMember;
use crate::core::member;
use crate::entities::member::Model as MemberModel;
use crate::errors::Result;
use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

/// GET /api/members (any authenticated caller; tokens are never serialized)
pub async fn list_members(
    State(state): State<AppState>,
    _caller: CurrentMember,
) -> Result<Json<Vec<MemberModel>>> {
    let members = state.members.get(&state.db).await?;
    Ok(Json(members))
}

/// Body for POST /api/members.
#[derive(Debug, Deserialize)]
pub struct CreateMemberBody {
    /// External member code, unique
    pub member_code: String,
    /// Display name
    pub name: String,
    /// `"member"` or `"admin"`; defaults to member
    pub role: Option<String>,
    /// Initial deposit reference value
    #[serde(default)]
    pub deposit: f64,
    /// Contact phone
    pub phone: Option<String>,
    /// Contact email
    pub email: Option<String>,
    /// Opaque bearer credential for the new member
    pub api_token: String,
}

/// POST /api/members (admin only)
pub async fn create_member(
    State(state): State<AppState>,
    caller: CurrentMember,
    Json(body): Json<CreateMemberBody>,
) -> Result<Json<MemberModel>> {
    caller.require_admin()?;

    let created = member::create_member(
        &state.db,
        body.member_code,
        body.name,
        body.role.or_else(|| Some(member::ROLE_MEMBER.to_string())),
        body.deposit,
        body.phone,
        body.email,
        body.api_token,
    )
    .await?;
    state.members.invalidate().await;
    Ok(Json(created))
}

/// Body for PUT /api/members/:id.
#[derive(Debug, Deserialize)]
pub struct UpdateMemberBody {
    /// New display name
    pub name: Option<String>,
    /// New role
    pub role: Option<String>,
    /// New deposit value
    pub deposit: Option<f64>,
    /// New phone
    pub phone: Option<String>,
    /// New email
    pub email: Option<String>,
}

/// PUT /api/members/:id (admin only)
pub async fn update_member(
    State(state): State<AppState>,
    caller: CurrentMember,
    Path(member_id): Path<i64>,
    Json(body): Json<UpdateMemberBody>,
) -> Result<Json<MemberModel>> {
    caller.require_admin()?;

    let updated = member::update_member(
        &state.db,
        member_id,
        body.name,
        body.role,
        body.deposit,
        body.phone,
        body.email,
    )
    .await?;
    state.members.invalidate().await;
    Ok(Json(updated))
}
