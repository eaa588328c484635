//! Expense entity - Represents a shared mess expense.
//!
//! `paid_by` is a string key: the payer's internal id, member code, display
//! name, or the literal `"admin"`. Historical rows used all four forms, so
//! aggregation matches on every form rather than a single canonical key.
//! `date` is a `YYYY-MM-DD` string matched by lexical prefix.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expense database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    /// Unique identifier for the expense
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable description
    pub description: String,
    /// Expense amount (always positive)
    pub amount: f64,
    /// Category: one of the closed set in [`crate::core::expense::Category`]
    pub category: String,
    /// Who paid: member id, member code, member name, or `"admin"`
    pub paid_by: String,
    /// Day the expense occurred, `YYYY-MM-DD`
    pub date: String,
    /// `"pending"`, `"approved"`, or `"rejected"` (admin-controlled)
    pub status: String,
    /// When the expense row was created
    pub created_at: DateTimeUtc,
}

/// Expenses reference members by string key, not foreign key
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
