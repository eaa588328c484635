//! Meal business logic - Daily meal and guest-meal tracking.
//!
//! Regular meals are loosely unique per (member, date, type): creation runs a
//! best-effort duplicate check rather than holding a lock, matching the
//! single-request concurrency model. Guest meals are unlimited and live in
//! two places for historical reasons - the dedicated `guest_meals` table and
//! guest-flagged rows in `meals` - so every guest read unions both.

use crate::{
    entities::{GuestMeal, Meal, guest_meal, meal},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Serialize;

/// Meal type for the midday meal.
pub const TYPE_LUNCH: &str = "lunch";
/// Meal type for the evening meal.
pub const TYPE_DINNER: &str = "dinner";
/// Meal type marking a guest meal stored in the `meals` table.
pub const TYPE_GUEST: &str = "guest";

/// Creates a regular (lunch/dinner) meal row for a member.
///
/// Duplicate (member, date, type) rows are refused by a read-then-write
/// check; this is deliberately loose, not a uniqueness constraint.
pub async fn create_meal(
    db: &DatabaseConnection,
    member_key: String,
    date: String,
    meal_type: &str,
) -> Result<meal::Model> {
    if meal_type != TYPE_LUNCH && meal_type != TYPE_DINNER {
        return Err(Error::Validation {
            message: format!("Unknown meal type: {meal_type}"),
        });
    }

    let duplicate = Meal::find()
        .filter(meal::Column::MemberKey.eq(&member_key))
        .filter(meal::Column::Date.eq(&date))
        .filter(meal::Column::MealType.eq(meal_type))
        .one(db)
        .await?;
    if duplicate.is_some() {
        return Err(Error::Conflict {
            message: format!("{meal_type} already recorded for {date}"),
        });
    }

    let new_meal = meal::ActiveModel {
        member_key: Set(member_key),
        date: Set(date),
        meal_type: Set(meal_type.to_string()),
        guest_food_type: Set(None),
        guest_meal_slot: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let result = new_meal.insert(db).await?;
    Ok(result)
}

/// Creates a guest meal in the dedicated store. Unlimited per member per day.
pub async fn create_guest_meal(
    db: &DatabaseConnection,
    member_key: String,
    date: String,
    food_type: String,
    meal_slot: &str,
) -> Result<guest_meal::Model> {
    if meal_slot != TYPE_LUNCH && meal_slot != TYPE_DINNER {
        return Err(Error::Validation {
            message: format!("Unknown guest meal slot: {meal_slot}"),
        });
    }

    let new_guest_meal = guest_meal::ActiveModel {
        member_key: Set(member_key),
        date: Set(date),
        food_type: Set(food_type),
        meal_slot: Set(meal_slot.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let result = new_guest_meal.insert(db).await?;
    Ok(result)
}

/// Retrieves a meal by id.
pub async fn get_meal_by_id(db: &DatabaseConnection, meal_id: i64) -> Result<Option<meal::Model>> {
    Meal::find_by_id(meal_id).one(db).await.map_err(Into::into)
}

/// Retrieves all non-guest meals whose date falls in `month`
/// (lexical prefix match).
pub async fn list_month_meals(db: &DatabaseConnection, month: &str) -> Result<Vec<meal::Model>> {
    Meal::find()
        .filter(meal::Column::Date.starts_with(month))
        .filter(meal::Column::MealType.ne(TYPE_GUEST))
        .order_by_asc(meal::Column::Date)
        .all(db)
        .await
        .map_err(Into::into)
}

/// A guest meal from either of the two historical stores, reduced to the
/// fields the aggregator and invoices need.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuestMealRecord {
    /// Hosting member key as stored
    pub member_key: String,
    /// Day of consumption, `YYYY-MM-DD`
    pub date: String,
    /// What the guest was served
    pub food_type: Option<String>,
    /// Which slot the guest meal was taken in
    pub meal_slot: Option<String>,
}

/// Retrieves all guest meals in `month`, unioning the dedicated guest store
/// with guest-flagged rows left in the `meals` table by the old data layout.
pub async fn list_month_guest_meals(
    db: &DatabaseConnection,
    month: &str,
) -> Result<Vec<GuestMealRecord>> {
    let dedicated = GuestMeal::find()
        .filter(guest_meal::Column::Date.starts_with(month))
        .all(db)
        .await?;

    let flagged = Meal::find()
        .filter(meal::Column::Date.starts_with(month))
        .filter(meal::Column::MealType.eq(TYPE_GUEST))
        .all(db)
        .await?;

    let mut records: Vec<GuestMealRecord> = dedicated
        .into_iter()
        .map(|g| GuestMealRecord {
            member_key: g.member_key,
            date: g.date,
            food_type: Some(g.food_type),
            meal_slot: Some(g.meal_slot),
        })
        .collect();
    records.extend(flagged.into_iter().map(|m| GuestMealRecord {
        member_key: m.member_key,
        date: m.date,
        food_type: m.guest_food_type,
        meal_slot: m.guest_meal_slot,
    }));
    records.sort_by(|a, b| a.date.cmp(&b.date));

    Ok(records)
}

/// Deletes a meal row. The api layer restricts this to the owning member or
/// an admin; meals are never updated in place.
pub async fn delete_meal(db: &DatabaseConnection, meal_id: i64) -> Result<()> {
    let existing = get_meal_by_id(db, meal_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            what: format!("Meal {meal_id}"),
        })?;
    existing.delete(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_meal_rejects_unknown_type() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_meal(&db, "1".to_string(), "2026-02-10".to_string(), "brunch").await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_meal_duplicate_check() -> Result<()> {
        let db = setup_test_db().await?;

        create_meal(&db, "1".to_string(), "2026-02-10".to_string(), TYPE_LUNCH).await?;

        // Same member, date, and type is refused
        let result = create_meal(&db, "1".to_string(), "2026-02-10".to_string(), TYPE_LUNCH).await;
        assert!(matches!(result.unwrap_err(), Error::Conflict { .. }));

        // Different type on the same day is fine
        create_meal(&db, "1".to_string(), "2026-02-10".to_string(), TYPE_DINNER).await?;
        // Same type on another day is fine
        create_meal(&db, "1".to_string(), "2026-02-11".to_string(), TYPE_LUNCH).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_guest_meals_unlimited_per_day() -> Result<()> {
        let db = setup_test_db().await?;

        for _ in 0..3 {
            create_guest_meal(
                &db,
                "1".to_string(),
                "2026-02-10".to_string(),
                "veg".to_string(),
                TYPE_LUNCH,
            )
            .await?;
        }

        let guests = list_month_guest_meals(&db, "2026-02").await?;
        assert_eq!(guests.len(), 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_month_guest_meals_unions_both_stores() -> Result<()> {
        let db = setup_test_db().await?;

        // New layout: dedicated guest store
        create_guest_meal(
            &db,
            "1".to_string(),
            "2026-02-10".to_string(),
            "fish".to_string(),
            TYPE_DINNER,
        )
        .await?;

        // Old layout: guest-flagged row in the meals table
        insert_legacy_guest_meal_row(&db, "1", "2026-02-12", "veg", TYPE_LUNCH).await?;

        // Out of month, must not appear
        create_guest_meal(
            &db,
            "1".to_string(),
            "2026-03-01".to_string(),
            "veg".to_string(),
            TYPE_LUNCH,
        )
        .await?;

        let guests = list_month_guest_meals(&db, "2026-02").await?;
        assert_eq!(guests.len(), 2);
        assert_eq!(guests[0].date, "2026-02-10");
        assert_eq!(guests[0].food_type.as_deref(), Some("fish"));
        assert_eq!(guests[1].date, "2026-02-12");
        assert_eq!(guests[1].meal_slot.as_deref(), Some(TYPE_LUNCH));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_month_meals_excludes_guest_rows() -> Result<()> {
        let db = setup_test_db().await?;

        create_meal(&db, "1".to_string(), "2026-02-10".to_string(), TYPE_LUNCH).await?;
        insert_legacy_guest_meal_row(&db, "1", "2026-02-10", "veg", TYPE_DINNER).await?;

        let meals = list_month_meals(&db, "2026-02").await?;
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].meal_type, TYPE_LUNCH);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_meal() -> Result<()> {
        let db = setup_test_db().await?;

        let meal = create_meal(&db, "1".to_string(), "2026-02-10".to_string(), TYPE_LUNCH).await?;
        delete_meal(&db, meal.id).await?;
        assert!(get_meal_by_id(&db, meal.id).await?.is_none());

        // Deleting again reports not-found
        assert!(matches!(
            delete_meal(&db, meal.id).await.unwrap_err(),
            Error::NotFound { .. }
        ));

        Ok(())
    }
}
