//! Meal entity - One row per meal consumed.
//!
//! `meal_type` is `"lunch"`, `"dinner"`, or `"guest"`. Guest rows carry the
//! guest sub-fields; a historical migration left guest meals split between
//! this table and the dedicated `guest_meals` table, so guest counts are the
//! union of both. Meal rows are created and deleted, never updated.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Meal database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "meals")]
pub struct Model {
    /// Unique identifier for the meal
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Day of consumption, `YYYY-MM-DD`
    pub date: String,
    /// Member key: internal id or member code (historical rows vary)
    pub member_key: String,
    /// `"lunch"`, `"dinner"`, or `"guest"`
    pub meal_type: String,
    /// Guest food type, when `meal_type` is `"guest"`
    pub guest_food_type: Option<String>,
    /// Which slot the guest meal was taken in (`"lunch"`/`"dinner"`)
    pub guest_meal_slot: Option<String>,
    /// When the meal row was created
    pub created_at: DateTimeUtc,
}

/// Meals reference members by string key, not foreign key
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
