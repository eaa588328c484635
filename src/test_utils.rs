//! Shared test utilities for the mess manager.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{expense, member},
    entities,
    errors::Result,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test member with the member role.
///
/// # Arguments
/// * `db` - Database connection
/// * `member_code` - External member code (also used to derive the token)
/// * `name` - Display name
pub async fn create_test_member(
    db: &DatabaseConnection,
    member_code: &str,
    name: &str,
) -> Result<entities::member::Model> {
    member::create_member(
        db,
        member_code.to_string(),
        name.to_string(),
        Some(member::ROLE_MEMBER.to_string()),
        0.0,
        None,
        None,
        format!("token-{member_code}"),
    )
    .await
}

/// Creates a test member with the admin role.
pub async fn create_admin_member(
    db: &DatabaseConnection,
    member_code: &str,
    name: &str,
) -> Result<entities::member::Model> {
    member::create_member(
        db,
        member_code.to_string(),
        name.to_string(),
        Some(member::ROLE_ADMIN.to_string()),
        0.0,
        None,
        None,
        format!("token-{member_code}"),
    )
    .await
}

/// Creates a test expense.
///
/// # Arguments
/// * `paid_by` - Member key in any historical form, or `"admin"`
/// * `category` - One of the closed category strings
/// * `amount` - Positive expense amount
/// * `date` - `YYYY-MM-DD`
/// * `status` - `"pending"`, `"approved"`, or `"rejected"`
pub async fn create_test_expense(
    db: &DatabaseConnection,
    paid_by: &str,
    category: &str,
    amount: f64,
    date: &str,
    status: &str,
) -> Result<entities::expense::Model> {
    if status == expense::STATUS_REJECTED {
        // Rejected rows cannot be created through the normal path; write the
        // row directly the way historical data holds it
        let row = entities::expense::ActiveModel {
            description: Set(format!("Test {category} expense")),
            amount: Set(amount),
            category: Set(category.to_string()),
            paid_by: Set(paid_by.to_string()),
            date: Set(date.to_string()),
            status: Set(status.to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        return row.insert(db).await.map_err(Into::into);
    }

    expense::create_expense(
        db,
        format!("Test {category} expense"),
        amount,
        category,
        paid_by.to_string(),
        date.to_string(),
        status,
    )
    .await
}

/// Inserts a guest meal the old way: a guest-flagged row in the `meals`
/// table, as the pre-migration data layout stored them.
pub async fn insert_legacy_guest_meal_row(
    db: &DatabaseConnection,
    member_key: &str,
    date: &str,
    food_type: &str,
    meal_slot: &str,
) -> Result<entities::meal::Model> {
    let row = entities::meal::ActiveModel {
        member_key: Set(member_key.to_string()),
        date: Set(date.to_string()),
        meal_type: Set("guest".to_string()),
        guest_food_type: Set(Some(food_type.to_string())),
        guest_meal_slot: Set(Some(meal_slot.to_string())),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    row.insert(db).await.map_err(Into::into)
}
