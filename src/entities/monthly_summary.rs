//! Monthly summary entity - The admin-maintained settlement ledger row.
//!
//! One row per (month, member), enforced by a unique compound index created
//! in [`crate::config::database::create_tables`]. Rows are lazily
//! materialized with zero defaults the first time a month is viewed and are
//! thereafter mutated only by explicit admin upsert; they are never
//! recomputed from the underlying expense/meal data.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Monthly settlement ledger model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "monthly_summaries")]
pub struct Model {
    /// Unique identifier for the ledger row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Month key, `YYYY-MM`
    pub month: String,
    /// Internal id of the member this row settles
    pub member_id: i64,
    /// `"pending"`, `"partial"`, or `"clear"`
    pub payment_status: String,
    /// Amount the admin records as paid
    pub amount_paid: f64,
    /// Amount the member claims to have submitted
    pub submitted_amount: f64,
    /// Amount the admin confirms receiving
    pub received_amount: f64,
    /// Deposit balance snapshot for this month
    pub deposit_balance: f64,
    /// Date of the deposit movement, `YYYY-MM-DD`, if any
    pub deposit_date: Option<String>,
    /// Free-text admin note
    pub note: String,
    /// Last explicit admin mutation
    pub updated_at: DateTimeUtc,
}

/// Settlement rows reference members by id without a live join
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
