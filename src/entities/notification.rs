//! Notification entity - A message targeted at one member or broadcast.
//!
//! `target` is a member id string or the sentinel `"all"`. Content is never
//! edited after creation; only the `read` and `paid` flags flip.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sentinel target meaning "every member".
pub const TARGET_ALL: &str = "all";

/// Notification database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    /// Unique identifier for the notification
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Member id string, or `"all"` for broadcast
    pub target: String,
    /// Message text
    pub message: String,
    /// Free-form type tag (e.g. `"market_request"`, `"payment_due"`)
    pub kind: String,
    /// Payment amount, for payment-related notifications
    pub amount: Option<f64>,
    /// Whether the referenced payment has been made
    pub paid: bool,
    /// Whether the target has read the notification
    pub read: bool,
    /// When the notification was created
    pub created_at: DateTimeUtc,
}

/// Notifications reference members by string target
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
