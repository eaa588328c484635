//! Database configuration module for the mess manager.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! It provides functions for establishing database connections and creating all necessary
//! tables based on the entity definitions. The schema is generated with
//! `Schema::create_table_from_entity` so the database always matches the Rust struct
//! definitions, plus one hand-built unique compound index on
//! `monthly_summaries (month, member_id)` which cannot be expressed as a single-column
//! entity attribute.

use crate::entities::{
    Expense, GuestMeal, MarketDuty, Meal, Member, MonthlySummary, Notification, monthly_summary,
};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from environment variable or returns default `SQLite` path.
///
/// This function looks for `DATABASE_URL` in the environment and falls back to
/// a default local `SQLite` file if not found.
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/mess_manager.sqlite".to_string())
}

/// Establishes a connection to the `SQLite` database using the `DATABASE_URL`
/// environment variable, falling back to a default local file.
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(get_database_url()).await.map_err(Into::into)
}

/// Creates all necessary database tables using `SeaORM`'s schema generation from
/// entity definitions, then the unique `(month, member_id)` index that backs the
/// one-settlement-row-per-member-per-month invariant.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let member_table = schema.create_table_from_entity(Member).if_not_exists().to_owned();
    let expense_table = schema.create_table_from_entity(Expense).if_not_exists().to_owned();
    let meal_table = schema.create_table_from_entity(Meal).if_not_exists().to_owned();
    let guest_meal_table = schema
        .create_table_from_entity(GuestMeal)
        .if_not_exists()
        .to_owned();
    let market_duty_table = schema
        .create_table_from_entity(MarketDuty)
        .if_not_exists()
        .to_owned();
    let monthly_summary_table = schema
        .create_table_from_entity(MonthlySummary)
        .if_not_exists()
        .to_owned();
    let notification_table = schema
        .create_table_from_entity(Notification)
        .if_not_exists()
        .to_owned();

    db.execute(builder.build(&member_table)).await?;
    db.execute(builder.build(&expense_table)).await?;
    db.execute(builder.build(&meal_table)).await?;
    db.execute(builder.build(&guest_meal_table)).await?;
    db.execute(builder.build(&market_duty_table)).await?;
    db.execute(builder.build(&monthly_summary_table)).await?;
    db.execute(builder.build(&notification_table)).await?;

    // Compound unique key: at most one settlement row per (month, member).
    let summary_index = Index::create()
        .name("idx_monthly_summaries_month_member")
        .table(monthly_summary::Entity)
        .col(monthly_summary::Column::Month)
        .col(monthly_summary::Column::MemberId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&summary_index)).await?;

    Ok(())
}
