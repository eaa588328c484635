//! Notification business logic.
//!
//! Notifications are created by actions that should alert another party
//! (duty assignment, broadcast, payment due). Content is immutable; only the
//! read/paid flags flip. The market approval path purges stale
//! market-request notifications by kind and date fragment.

use crate::{
    entities::{Notification, notification},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};

/// Kind tag for pending market-duty requests.
pub const KIND_MARKET_REQUEST: &str = "market_request";
/// Kind tag for approved market-duty assignments.
pub const KIND_MARKET_APPROVED: &str = "market_approved";
/// Kind tag for rejected market-duty requests.
pub const KIND_MARKET_REJECTED: &str = "market_rejected";
/// Kind tag for payment-due reminders.
pub const KIND_PAYMENT_DUE: &str = "payment_due";

/// Creates a notification for one member (`target` = member id string) or
/// everyone (`target` = [`crate::entities::notification::TARGET_ALL`]).
pub async fn create_notification<C>(
    db: &C,
    target: String,
    message: String,
    kind: String,
    amount: Option<f64>,
) -> Result<notification::Model>
where
    C: ConnectionTrait,
{
    if message.trim().is_empty() {
        return Err(Error::Validation {
            message: "Notification message cannot be empty".to_string(),
        });
    }

    let new_notification = notification::ActiveModel {
        target: Set(target),
        message: Set(message),
        kind: Set(kind),
        amount: Set(amount),
        paid: Set(false),
        read: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let result = new_notification.insert(db).await?;
    Ok(result)
}

/// Retrieves the notifications visible to one member: those targeted at the
/// member's id plus broadcasts. Newest first.
pub async fn list_for_member(
    db: &DatabaseConnection,
    member_id: i64,
) -> Result<Vec<notification::Model>> {
    Notification::find()
        .filter(
            notification::Column::Target
                .eq(member_id.to_string())
                .or(notification::Column::Target.eq(crate::entities::notification::TARGET_ALL)),
        )
        .order_by_desc(notification::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Flips the read flag on a notification.
pub async fn mark_read(db: &DatabaseConnection, notification_id: i64) -> Result<notification::Model> {
    let existing = Notification::find_by_id(notification_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            what: format!("Notification {notification_id}"),
        })?;

    let mut active_model: notification::ActiveModel = existing.into();
    active_model.read = Set(true);
    active_model.update(db).await.map_err(Into::into)
}

/// Flips the paid flag on a payment notification.
pub async fn mark_paid(db: &DatabaseConnection, notification_id: i64) -> Result<notification::Model> {
    let existing = Notification::find_by_id(notification_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            what: format!("Notification {notification_id}"),
        })?;

    let mut active_model: notification::ActiveModel = existing.into();
    active_model.paid = Set(true);
    active_model.update(db).await.map_err(Into::into)
}

/// Deletes every notification of `kind` whose message mentions `fragment`.
/// Used by duty approval to purge the market-request notifications for a
/// date once the request is settled. Safe to re-run.
pub async fn purge_by_kind_and_fragment<C>(db: &C, kind: &str, fragment: &str) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = Notification::delete_many()
        .filter(notification::Column::Kind.eq(kind))
        .filter(notification::Column::Message.contains(fragment))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::notification::TARGET_ALL;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_notification_rejects_empty_message() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_notification(
            &db,
            "1".to_string(),
            "  ".to_string(),
            KIND_PAYMENT_DUE.to_string(),
            None,
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_for_member_includes_broadcasts() -> Result<()> {
        let db = setup_test_db().await?;

        create_notification(
            &db,
            "7".to_string(),
            "Your market duty is tomorrow".to_string(),
            KIND_MARKET_APPROVED.to_string(),
            None,
        )
        .await?;
        create_notification(
            &db,
            TARGET_ALL.to_string(),
            "Mess meeting on Friday".to_string(),
            "broadcast".to_string(),
            None,
        )
        .await?;
        create_notification(
            &db,
            "8".to_string(),
            "Not for member 7".to_string(),
            KIND_PAYMENT_DUE.to_string(),
            Some(350.0),
        )
        .await?;

        let visible = list_for_member(&db, 7).await?;
        assert_eq!(visible.len(), 2);
        assert!(visible.iter().all(|n| n.target == "7" || n.target == TARGET_ALL));

        Ok(())
    }

    #[tokio::test]
    async fn test_mark_read_and_paid() -> Result<()> {
        let db = setup_test_db().await?;

        let n = create_notification(
            &db,
            "1".to_string(),
            "Pay 350 for February".to_string(),
            KIND_PAYMENT_DUE.to_string(),
            Some(350.0),
        )
        .await?;
        assert!(!n.read);
        assert!(!n.paid);

        let read = mark_read(&db, n.id).await?;
        assert!(read.read);
        assert!(!read.paid);

        let paid = mark_paid(&db, n.id).await?;
        assert!(paid.paid);
        // Message content never changes
        assert_eq!(paid.message, "Pay 350 for February");

        Ok(())
    }

    #[tokio::test]
    async fn test_mark_read_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(matches!(
            mark_read(&db, 404).await.unwrap_err(),
            Error::NotFound { .. }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_purge_by_kind_and_fragment() -> Result<()> {
        let db = setup_test_db().await?;

        create_notification(
            &db,
            "1".to_string(),
            "Market duty request for 2026-02-10".to_string(),
            KIND_MARKET_REQUEST.to_string(),
            None,
        )
        .await?;
        create_notification(
            &db,
            "2".to_string(),
            "Market duty request for 2026-02-10".to_string(),
            KIND_MARKET_REQUEST.to_string(),
            None,
        )
        .await?;
        // Different date survives
        create_notification(
            &db,
            "3".to_string(),
            "Market duty request for 2026-02-11".to_string(),
            KIND_MARKET_REQUEST.to_string(),
            None,
        )
        .await?;

        let purged = purge_by_kind_and_fragment(&db, KIND_MARKET_REQUEST, "2026-02-10").await?;
        assert_eq!(purged, 2);

        // Re-running is harmless
        let purged_again =
            purge_by_kind_and_fragment(&db, KIND_MARKET_REQUEST, "2026-02-10").await?;
        assert_eq!(purged_again, 0);

        let remaining = list_for_member(&db, 3).await?;
        assert_eq!(remaining.len(), 1);

        Ok(())
    }
}
