//! Market duty business logic - Grocery duty rotation and approval.
//!
//! Duty records move through a small state machine: a self-request is
//! `pending`, a manual admin assignment is `approved` directly, and approving
//! a pending request settles the whole date - the winner becomes `approved`,
//! every other pending request for that date is deleted (rejection is row
//! deletion, a deliberate retention trade-off to keep the calendar view
//! uncluttered), the date's market-request notifications are purged, and the
//! assignee gets an approval notification. The approval sequence runs inside
//! one store transaction so two concurrent approvals cannot both land an
//! approved row for the same date.

use crate::{
    core::notification,
    entities::{MarketDuty, market_duty},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

/// Duty status: requested, awaiting admin decision.
pub const STATUS_PENDING: &str = "pending";
/// Duty status: confirmed assignment for the date.
pub const STATUS_APPROVED: &str = "approved";

/// Request type for direct admin assignment.
pub const REQUEST_MANUAL: &str = "manual";
/// Request type for a member's own request.
pub const REQUEST_SELF: &str = "self";

/// A member requests market duty for a date. Lands `pending` and notifies
/// nobody; admins see pending requests in the duty list.
pub async fn request_duty(
    db: &DatabaseConnection,
    date: String,
    member_id: i64,
    member_name: String,
) -> Result<market_duty::Model> {
    insert_duty(db, date, member_id, member_name, STATUS_PENDING, REQUEST_SELF).await
}

/// An admin assigns market duty directly. No pending stage: the row is born
/// `approved` and the assignee is notified.
pub async fn assign_duty(
    db: &DatabaseConnection,
    date: String,
    member_id: i64,
    member_name: String,
) -> Result<market_duty::Model> {
    let duty = insert_duty(
        db,
        date.clone(),
        member_id,
        member_name,
        STATUS_APPROVED,
        REQUEST_MANUAL,
    )
    .await?;

    notification::create_notification(
        db,
        member_id.to_string(),
        format!("You are assigned market duty for {date}"),
        notification::KIND_MARKET_APPROVED.to_string(),
        None,
    )
    .await?;

    Ok(duty)
}

async fn insert_duty(
    db: &DatabaseConnection,
    date: String,
    member_id: i64,
    member_name: String,
    status: &str,
    request_type: &str,
) -> Result<market_duty::Model> {
    if date.trim().is_empty() {
        return Err(Error::Validation {
            message: "Duty date cannot be empty".to_string(),
        });
    }

    let new_duty = market_duty::ActiveModel {
        date: Set(date),
        member_id: Set(member_id),
        member_name: Set(member_name),
        status: Set(status.to_string()),
        request_type: Set(request_type.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let result = new_duty.insert(db).await?;
    Ok(result)
}

/// Retrieves a duty record by id.
pub async fn get_duty_by_id(
    db: &DatabaseConnection,
    duty_id: i64,
) -> Result<Option<market_duty::Model>> {
    MarketDuty::find_by_id(duty_id).one(db).await.map_err(Into::into)
}

/// Retrieves all duty records in `month` (lexical prefix match), ordered by
/// date. Includes pending requests.
pub async fn list_month_duties(
    db: &DatabaseConnection,
    month: &str,
) -> Result<Vec<market_duty::Model>> {
    MarketDuty::find()
        .filter(market_duty::Column::Date.starts_with(month))
        .order_by_asc(market_duty::Column::Date)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Approves a pending duty record. Inside one transaction:
/// the target row becomes `approved`, every other pending row for the same
/// date is deleted, the date's market-request notifications are purged, and
/// an approval notification is created for the assignee. Each cleanup step
/// is idempotent, so a re-run after a partial failure converges.
pub async fn approve_duty(db: &DatabaseConnection, duty_id: i64) -> Result<market_duty::Model> {
    let txn = db.begin().await?;

    let duty = MarketDuty::find_by_id(duty_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::NotFound {
            what: format!("Market duty {duty_id}"),
        })?;

    if duty.status != STATUS_PENDING {
        return Err(Error::Validation {
            message: format!("Only pending duty records can be approved, this one is {}", duty.status),
        });
    }

    let date = duty.date.clone();
    let member_id = duty.member_id;

    let mut active_model: market_duty::ActiveModel = duty.into();
    active_model.status = Set(STATUS_APPROVED.to_string());
    let approved = active_model.update(&txn).await?;

    // First-approved-wins: the losers are deleted, not retained as rejected
    MarketDuty::delete_many()
        .filter(market_duty::Column::Date.eq(&date))
        .filter(market_duty::Column::Status.eq(STATUS_PENDING))
        .filter(market_duty::Column::Id.ne(approved.id))
        .exec(&txn)
        .await?;

    notification::purge_by_kind_and_fragment(&txn, notification::KIND_MARKET_REQUEST, &date)
        .await?;

    notification::create_notification(
        &txn,
        member_id.to_string(),
        format!("Your market duty request for {date} was approved"),
        notification::KIND_MARKET_APPROVED.to_string(),
        None,
    )
    .await?;

    txn.commit().await?;
    Ok(approved)
}

/// Rejects a pending duty record by deleting the row. When an admin rejects
/// someone else's request, the requester is notified; a member withdrawing
/// their own request is not.
pub async fn reject_duty(
    db: &DatabaseConnection,
    duty_id: i64,
    rejected_by_admin: bool,
) -> Result<()> {
    let duty = get_duty_by_id(db, duty_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            what: format!("Market duty {duty_id}"),
        })?;

    if duty.status != STATUS_PENDING {
        return Err(Error::Validation {
            message: format!("Only pending duty records can be rejected, this one is {}", duty.status),
        });
    }

    let date = duty.date.clone();
    let member_id = duty.member_id;
    duty.delete(db).await?;

    if rejected_by_admin {
        notification::create_notification(
            db,
            member_id.to_string(),
            format!("Your market duty request for {date} was rejected"),
            notification::KIND_MARKET_REJECTED.to_string(),
            None,
        )
        .await?;
    }

    Ok(())
}
