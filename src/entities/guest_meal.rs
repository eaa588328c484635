//! Guest meal entity - The legacy dedicated guest-meal store.
//!
//! Newer guest meals are written here; older ones live as guest-flagged rows
//! in `meals`. Any guest count must union both sources.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Guest meal database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "guest_meals")]
pub struct Model {
    /// Unique identifier for the guest meal
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Hosting member key: internal id or member code
    pub member_key: String,
    /// Day of consumption, `YYYY-MM-DD`
    pub date: String,
    /// What the guest was served
    pub food_type: String,
    /// Which slot the guest meal was taken in (`"lunch"`/`"dinner"`)
    pub meal_slot: String,
    /// When the guest meal row was created
    pub created_at: DateTimeUtc,
}

/// Guest meals reference members by string key, not foreign key
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
