//! Expense business logic - Handles shared expense tracking and approval.
//!
//! Member-created expenses start `pending` and become visible in financial
//! totals only after an admin approves them. Admin-created expenses are
//! pre-approved. Rejected expenses stay in the store for audit views but are
//! excluded from every aggregate.

use crate::{
    entities::{Expense, expense},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};

/// `paid_by` sentinel for expenses paid from the admin's own pocket.
pub const PAID_BY_ADMIN: &str = "admin";

/// Expense status: newly submitted, not yet counted in approved totals.
pub const STATUS_PENDING: &str = "pending";
/// Expense status: confirmed by an admin, counted everywhere.
pub const STATUS_APPROVED: &str = "approved";
/// Expense status: refused by an admin, excluded from all aggregates.
pub const STATUS_REJECTED: &str = "rejected";

/// The closed set of expense categories.
///
/// Every aggregation breakdown carries all of these, zero-filled, so the
/// shape of the ledger never depends on which categories happen to have
/// records in a given month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Daily market / grocery runs
    Market,
    /// Spices and condiments
    Spices,
    /// Rice purchases
    Rice,
    /// Anything that fits nowhere else
    Others,
    /// Cooking gas refills
    Gas,
    /// Paper and cleaning supplies
    Paper,
    /// Shared internet bill
    Wifi,
    /// Electricity bill
    Electric,
    /// Kitchen helper's wage
    HelperWage,
    /// House rent share
    HouseRent,
    /// Deposit movements recorded as expenses
    Deposit,
}

impl Category {
    /// All categories, in the fixed order breakdowns are reported in.
    pub const ALL: [Self; 11] = [
        Self::Market,
        Self::Spices,
        Self::Rice,
        Self::Others,
        Self::Gas,
        Self::Paper,
        Self::Wifi,
        Self::Electric,
        Self::HelperWage,
        Self::HouseRent,
        Self::Deposit,
    ];

    /// The stored string form of this category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Spices => "spices",
            Self::Rice => "rice",
            Self::Others => "others",
            Self::Gas => "gas",
            Self::Paper => "paper",
            Self::Wifi => "wifi",
            Self::Electric => "electric",
            Self::HelperWage => "helper_wage",
            Self::HouseRent => "house_rent",
            Self::Deposit => "deposit",
        }
    }

    /// Parses a stored category string, returning `None` for unknown values.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == value)
    }
}

/// Creates a new expense after validating amount, category, and description.
///
/// `paid_by` should be a canonical member id (or [`PAID_BY_ADMIN`]); the
/// multi-form matcher in the aggregator covers historical rows that stored
/// codes or names instead. `status` distinguishes member submissions
/// (pending) from admin entries (pre-approved).
pub async fn create_expense(
    db: &DatabaseConnection,
    description: String,
    amount: f64,
    category: &str,
    paid_by: String,
    date: String,
    status: &str,
) -> Result<expense::Model> {
    if description.trim().is_empty() {
        return Err(Error::Validation {
            message: "Expense description cannot be empty".to_string(),
        });
    }
    if amount <= 0.0 || !amount.is_finite() {
        return Err(Error::InvalidAmount { amount });
    }
    if Category::parse(category).is_none() {
        return Err(Error::Validation {
            message: format!("Unknown expense category: {category}"),
        });
    }
    if status != STATUS_PENDING && status != STATUS_APPROVED {
        return Err(Error::Validation {
            message: format!("New expenses must be pending or approved, got: {status}"),
        });
    }

    let new_expense = expense::ActiveModel {
        description: Set(description.trim().to_string()),
        amount: Set(amount),
        category: Set(category.to_string()),
        paid_by: Set(paid_by),
        date: Set(date),
        status: Set(status.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let result = new_expense.insert(db).await?;
    Ok(result)
}

/// Retrieves an expense by id.
pub async fn get_expense_by_id(
    db: &DatabaseConnection,
    expense_id: i64,
) -> Result<Option<expense::Model>> {
    Expense::find_by_id(expense_id).one(db).await.map_err(Into::into)
}

/// Retrieves every expense, newest date first. Audit view: includes pending
/// and rejected rows.
pub async fn list_expenses(db: &DatabaseConnection) -> Result<Vec<expense::Model>> {
    Expense::find()
        .order_by_desc(expense::Column::Date)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all non-rejected expenses whose date falls in `month`
/// (`YYYY-MM`, lexical prefix match).
pub async fn list_month_expenses(
    db: &DatabaseConnection,
    month: &str,
) -> Result<Vec<expense::Model>> {
    Expense::find()
        .filter(expense::Column::Date.starts_with(month))
        .filter(expense::Column::Status.ne(STATUS_REJECTED))
        .order_by_asc(expense::Column::Date)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Transitions an expense's status. Only `pending -> approved` and
/// `pending -> rejected` are legal; everything else is a validation error.
pub async fn set_expense_status(
    db: &DatabaseConnection,
    expense_id: i64,
    new_status: &str,
) -> Result<expense::Model> {
    if new_status != STATUS_APPROVED && new_status != STATUS_REJECTED {
        return Err(Error::Validation {
            message: format!("Unknown expense status: {new_status}"),
        });
    }

    let existing = get_expense_by_id(db, expense_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            what: format!("Expense {expense_id}"),
        })?;

    if existing.status != STATUS_PENDING {
        return Err(Error::Validation {
            message: format!("Only pending expenses can transition, this one is {}", existing.status),
        });
    }

    let mut active_model: expense::ActiveModel = existing.into();
    active_model.status = Set(new_status.to_string());
    active_model.update(db).await.map_err(Into::into)
}

/// Updates the editable fields of an expense. Status transitions go through
/// [`set_expense_status`] instead.
pub async fn update_expense(
    db: &DatabaseConnection,
    expense_id: i64,
    description: Option<String>,
    amount: Option<f64>,
    category: Option<String>,
    date: Option<String>,
) -> Result<expense::Model> {
    let existing = get_expense_by_id(db, expense_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            what: format!("Expense {expense_id}"),
        })?;

    let mut active_model: expense::ActiveModel = existing.into();
    if let Some(description) = description {
        if description.trim().is_empty() {
            return Err(Error::Validation {
                message: "Expense description cannot be empty".to_string(),
            });
        }
        active_model.description = Set(description.trim().to_string());
    }
    if let Some(amount) = amount {
        if amount <= 0.0 || !amount.is_finite() {
            return Err(Error::InvalidAmount { amount });
        }
        active_model.amount = Set(amount);
    }
    if let Some(category) = category {
        if Category::parse(&category).is_none() {
            return Err(Error::Validation {
                message: format!("Unknown expense category: {category}"),
            });
        }
        active_model.category = Set(category);
    }
    if let Some(date) = date {
        active_model.date = Set(date);
    }

    active_model.update(db).await.map_err(Into::into)
}

/// Deletes an expense outright.
pub async fn delete_expense(db: &DatabaseConnection, expense_id: i64) -> Result<()> {
    let existing = get_expense_by_id(db, expense_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            what: format!("Expense {expense_id}"),
        })?;
    existing.delete(db).await?;
    Ok(())
}

/// Sums approved expenses for one member in one month, matching on all three
/// member key forms. This is the member-facing "confirmed money movement"
/// total; the admin ledger additionally includes pending rows.
pub async fn approved_total_for_member(
    db: &DatabaseConnection,
    month: &str,
    member: &crate::entities::member::Model,
) -> Result<f64> {
    let expenses = list_month_expenses(db, month).await?;
    Ok(expenses
        .iter()
        .filter(|e| e.status == STATUS_APPROVED)
        .filter(|e| crate::core::member::member_matches(member, &e.paid_by))
        .map(|e| e.amount)
        .sum())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_expense_validation() -> Result<()> {
        let db = setup_test_db().await?;

        // Zero amount
        let result = create_expense(
            &db,
            "rice".to_string(),
            0.0,
            "rice",
            "1".to_string(),
            "2026-02-10".to_string(),
            STATUS_PENDING,
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));

        // Negative amount
        let result = create_expense(
            &db,
            "rice".to_string(),
            -5.0,
            "rice",
            "1".to_string(),
            "2026-02-10".to_string(),
            STATUS_PENDING,
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));

        // NaN amount
        let result = create_expense(
            &db,
            "rice".to_string(),
            f64::NAN,
            "rice",
            "1".to_string(),
            "2026-02-10".to_string(),
            STATUS_PENDING,
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));

        // Unknown category
        let result = create_expense(
            &db,
            "mystery".to_string(),
            10.0,
            "entertainment",
            "1".to_string(),
            "2026-02-10".to_string(),
            STATUS_PENDING,
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        // Empty description
        let result = create_expense(
            &db,
            "   ".to_string(),
            10.0,
            "market",
            "1".to_string(),
            "2026-02-10".to_string(),
            STATUS_PENDING,
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        // New expenses cannot be born rejected
        let result = create_expense(
            &db,
            "weird".to_string(),
            10.0,
            "market",
            "1".to_string(),
            "2026-02-10".to_string(),
            STATUS_REJECTED,
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[test]
    fn test_category_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::parse(category.as_str()), Some(category));
        }
        assert_eq!(Category::parse("entertainment"), None);
        assert_eq!(Category::parse(""), None);
    }

    #[tokio::test]
    async fn test_list_month_expenses_prefix_and_status() -> Result<()> {
        let db = setup_test_db().await?;
        let member = create_test_member(&db, "M-01", "Arindam").await?;
        let key = member.id.to_string();

        create_test_expense(&db, &key, "market", 120.0, "2026-02-03", STATUS_APPROVED).await?;
        create_test_expense(&db, &key, "market", 80.0, "2026-02-20", STATUS_PENDING).await?;
        create_test_expense(&db, &key, "market", 999.0, "2026-02-11", STATUS_REJECTED).await?;
        create_test_expense(&db, &key, "market", 70.0, "2026-03-01", STATUS_APPROVED).await?;

        let in_month = list_month_expenses(&db, "2026-02").await?;
        assert_eq!(in_month.len(), 2);
        assert!(in_month.iter().all(|e| e.date.starts_with("2026-02")));
        assert!(in_month.iter().all(|e| e.status != STATUS_REJECTED));

        // Malformed month keys match nothing rather than erroring
        let none = list_month_expenses(&db, "garbage").await?;
        assert!(none.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_set_expense_status_transitions() -> Result<()> {
        let db = setup_test_db().await?;
        let member = create_test_member(&db, "M-01", "Arindam").await?;
        let key = member.id.to_string();

        let pending =
            create_test_expense(&db, &key, "gas", 50.0, "2026-02-10", STATUS_PENDING).await?;
        let approved = set_expense_status(&db, pending.id, STATUS_APPROVED).await?;
        assert_eq!(approved.status, STATUS_APPROVED);

        // Approved expenses cannot transition again
        let result = set_expense_status(&db, approved.id, STATUS_REJECTED).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        // Unknown target status
        let other =
            create_test_expense(&db, &key, "gas", 10.0, "2026-02-11", STATUS_PENDING).await?;
        let result = set_expense_status(&db, other.id, "frozen").await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_set_expense_status_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let result = set_expense_status(&db, 12345, STATUS_APPROVED).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_approved_total_excludes_pending_and_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let member = create_test_member(&db, "M-01", "Arindam").await?;
        let key = member.id.to_string();

        create_test_expense(&db, &key, "market", 120.0, "2026-02-03", STATUS_APPROVED).await?;
        create_test_expense(&db, &key, "market", 80.0, "2026-02-14", STATUS_APPROVED).await?;
        create_test_expense(&db, &key, "market", 50.0, "2026-02-20", STATUS_PENDING).await?;
        create_test_expense(&db, &key, "market", 1000.0, "2026-02-21", STATUS_REJECTED).await?;

        let total = approved_total_for_member(&db, "2026-02", &member).await?;
        assert_eq!(total, 200.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_approved_total_matches_historical_key_forms() -> Result<()> {
        let db = setup_test_db().await?;
        let member = create_test_member(&db, "M-01", "Arindam").await?;

        // One row per historical key form
        create_test_expense(&db, &member.id.to_string(), "rice", 10.0, "2026-02-01", STATUS_APPROVED)
            .await?;
        create_test_expense(&db, "M-01", "rice", 20.0, "2026-02-02", STATUS_APPROVED).await?;
        create_test_expense(&db, "Arindam", "rice", 30.0, "2026-02-03", STATUS_APPROVED).await?;
        // Someone else's row must not leak in
        create_test_expense(&db, "M-99", "rice", 500.0, "2026-02-04", STATUS_APPROVED).await?;

        let total = approved_total_for_member(&db, "2026-02", &member).await?;
        assert_eq!(total, 60.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_delete_expense() -> Result<()> {
        let db = setup_test_db().await?;
        let member = create_test_member(&db, "M-01", "Arindam").await?;
        let key = member.id.to_string();

        let expense =
            create_test_expense(&db, &key, "market", 40.0, "2026-02-10", STATUS_PENDING).await?;

        let updated = update_expense(
            &db,
            expense.id,
            Some("weekly bazar".to_string()),
            Some(45.0),
            None,
            None,
        )
        .await?;
        assert_eq!(updated.description, "weekly bazar");
        assert_eq!(updated.amount, 45.0);
        assert_eq!(updated.category, "market");

        delete_expense(&db, expense.id).await?;
        assert!(get_expense_by_id(&db, expense.id).await?.is_none());
        assert!(matches!(
            delete_expense(&db, expense.id).await.unwrap_err(),
            Error::NotFound { .. }
        ));

        Ok(())
    }
}
