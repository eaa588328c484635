//! Member entity - Represents a mess member or administrator.
//!
//! Each member has an internal `id`, an external user-facing `member_code`,
//! a display `name`, an optional `role`, and a `deposit` reference value.
//! Historical expense and meal rows may reference a member by any of the
//! first three, so none of them may be repurposed.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Member database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "members")]
pub struct Model {
    /// Internal unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// External user-facing identifier (e.g. "M-07")
    #[sea_orm(unique)]
    pub member_code: String,
    /// Display name
    pub name: String,
    /// `"member"`, `"admin"`, or `None` for legacy rows (treated as member)
    pub role: Option<String>,
    /// Reference deposit amount held for this member
    pub deposit: f64,
    /// Contact phone number
    pub phone: Option<String>,
    /// Contact email address
    pub email: Option<String>,
    /// Opaque bearer credential for API access
    #[sea_orm(unique)]
    #[serde(skip_serializing)]
    pub api_token: String,
    /// When the member was created
    pub created_at: DateTimeUtc,
}

/// Members are referenced by string keys, not foreign keys
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
