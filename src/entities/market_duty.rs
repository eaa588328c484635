//! Market duty entity - An assignment of a member to buy groceries on a date.
//!
//! Status is `"pending"` or `"approved"` only: rejection deletes the row
//! outright to keep the calendar view uncluttered. At most one approved row
//! per date is the intended invariant, maintained by the approval path.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Market duty database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "market_duties")]
pub struct Model {
    /// Unique identifier for the duty record
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Duty date, `YYYY-MM-DD`
    pub date: String,
    /// Internal id of the assigned member
    pub member_id: i64,
    /// Display name of the assigned member at assignment time
    pub member_name: String,
    /// `"pending"` or `"approved"`
    pub status: String,
    /// `"manual"` (admin assignment) or `"self"` (member request)
    pub request_type: String,
    /// When the duty row was created
    pub created_at: DateTimeUtc,
}

/// Duty rows snapshot the member name rather than joining live
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
