//! Member business logic - Handles member management and key resolution.
//!
//! Historical records reference members inconsistently: by internal id, by
//! external member code, or by display name. [`member_matches`] and
//! [`resolve_member_key`] implement the three-form compatibility matcher used
//! uniformly by the aggregator; new records persist only canonical ids (see
//! [`canonical_key`]).

use crate::{
    entities::{Member, member},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};

/// Role string for administrators.
pub const ROLE_ADMIN: &str = "admin";
/// Role string for ordinary members.
pub const ROLE_MEMBER: &str = "member";

/// Returns true when the member carries the admin role.
#[must_use]
pub fn is_admin(member: &member::Model) -> bool {
    member.role.as_deref() == Some(ROLE_ADMIN)
}

/// Returns true when `key` identifies `member` under any of its three
/// historical forms: internal id, member code, or display name.
#[must_use]
pub fn member_matches(member: &member::Model, key: &str) -> bool {
    key == member.id.to_string() || key == member.member_code || key == member.name
}

/// Resolves a historical member key to the member it identifies, if any.
/// Matching follows the same three forms as [`member_matches`].
#[must_use]
pub fn resolve_member_key<'a>(
    members: &'a [member::Model],
    key: &str,
) -> Option<&'a member::Model> {
    members.iter().find(|m| member_matches(m, key))
}

/// The canonical key persisted on new records: the internal id as a string.
#[must_use]
pub fn canonical_key(member: &member::Model) -> String {
    member.id.to_string()
}

/// Retrieves all current (non-admin) members, ordered by member code.
///
/// Legacy rows created before the role column existed have no role and are
/// treated as members.
pub async fn list_current_members(db: &DatabaseConnection) -> Result<Vec<member::Model>> {
    Member::find()
        .filter(
            member::Column::Role
                .eq(ROLE_MEMBER)
                .or(member::Column::Role.is_null()),
        )
        .order_by_asc(member::Column::MemberCode)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves every member regardless of role, ordered by member code.
pub async fn list_all_members(db: &DatabaseConnection) -> Result<Vec<member::Model>> {
    Member::find()
        .order_by_asc(member::Column::MemberCode)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a member by internal id.
pub async fn get_member_by_id(
    db: &DatabaseConnection,
    member_id: i64,
) -> Result<Option<member::Model>> {
    Member::find_by_id(member_id).one(db).await.map_err(Into::into)
}

/// Finds a member by external member code.
pub async fn get_member_by_code(
    db: &DatabaseConnection,
    member_code: &str,
) -> Result<Option<member::Model>> {
    Member::find()
        .filter(member::Column::MemberCode.eq(member_code))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a member by api token. Used by the auth layer to attach a caller
/// identity to each request.
pub async fn get_member_by_token(
    db: &DatabaseConnection,
    api_token: &str,
) -> Result<Option<member::Model>> {
    Member::find()
        .filter(member::Column::ApiToken.eq(api_token))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new member, performing input validation and a duplicate-code
/// check so the caller sees a conflict rather than a raw store error.
pub async fn create_member(
    db: &DatabaseConnection,
    member_code: String,
    name: String,
    role: Option<String>,
    deposit: f64,
    phone: Option<String>,
    email: Option<String>,
    api_token: String,
) -> Result<member::Model> {
    if member_code.trim().is_empty() {
        return Err(Error::Validation {
            message: "Member code cannot be empty".to_string(),
        });
    }
    if name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Member name cannot be empty".to_string(),
        });
    }
    if let Some(role) = role.as_deref() {
        if role != ROLE_MEMBER && role != ROLE_ADMIN {
            return Err(Error::Validation {
                message: format!("Unknown role: {role}"),
            });
        }
    }
    if api_token.trim().is_empty() {
        return Err(Error::Validation {
            message: "API token cannot be empty".to_string(),
        });
    }

    if get_member_by_code(db, member_code.trim()).await?.is_some() {
        return Err(Error::Conflict {
            message: format!("Member code already exists: {}", member_code.trim()),
        });
    }

    let new_member = member::ActiveModel {
        member_code: Set(member_code.trim().to_string()),
        name: Set(name.trim().to_string()),
        role: Set(role),
        deposit: Set(deposit),
        phone: Set(phone),
        email: Set(email),
        api_token: Set(api_token),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let result = new_member.insert(db).await?;
    Ok(result)
}

/// Admin edit of an existing member. Only the provided fields change; the
/// member code and api token are immutable through this path.
pub async fn update_member(
    db: &DatabaseConnection,
    member_id: i64,
    name: Option<String>,
    role: Option<String>,
    deposit: Option<f64>,
    phone: Option<String>,
    email: Option<String>,
) -> Result<member::Model> {
    let existing = get_member_by_id(db, member_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            what: format!("Member {member_id}"),
        })?;

    let mut active_model: member::ActiveModel = existing.into();
    if let Some(name) = name {
        if name.trim().is_empty() {
            return Err(Error::Validation {
                message: "Member name cannot be empty".to_string(),
            });
        }
        active_model.name = Set(name.trim().to_string());
    }
    if let Some(role) = role {
        if role != ROLE_MEMBER && role != ROLE_ADMIN {
            return Err(Error::Validation {
                message: format!("Unknown role: {role}"),
            });
        }
        active_model.role = Set(Some(role));
    }
    if let Some(deposit) = deposit {
        active_model.deposit = Set(deposit);
    }
    if let Some(phone) = phone {
        active_model.phone = Set(Some(phone));
    }
    if let Some(email) = email {
        active_model.email = Set(Some(email));
    }

    active_model.update(db).await.map_err(Into::into)
}

/// Seeds members from the config.toml definitions. Members whose code
/// already exists are skipped, so re-running at every startup is safe.
pub async fn seed_initial_members(
    db: &DatabaseConnection,
    config: &crate::config::members::Config,
) -> Result<usize> {
    let mut seeded = 0;
    for seed in &config.members {
        if get_member_by_code(db, &seed.member_code).await?.is_some() {
            continue;
        }
        create_member(
            db,
            seed.member_code.clone(),
            seed.name.clone(),
            seed.role.clone().or_else(|| Some(ROLE_MEMBER.to_string())),
            seed.deposit,
            None,
            None,
            seed.api_token.clone(),
        )
        .await?;
        seeded += 1;
    }
    Ok(seeded)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_member_validation() -> Result<()> {
        let db = setup_test_db().await?;

        // Empty code
        let result = create_member(
            &db,
            String::new(),
            "Name".to_string(),
            None,
            0.0,
            None,
            None,
            "tok".to_string(),
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        // Empty name
        let result = create_member(
            &db,
            "M-01".to_string(),
            "   ".to_string(),
            None,
            0.0,
            None,
            None,
            "tok".to_string(),
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        // Bogus role
        let result = create_member(
            &db,
            "M-01".to_string(),
            "Name".to_string(),
            Some("superuser".to_string()),
            0.0,
            None,
            None,
            "tok".to_string(),
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_member_duplicate_code_conflicts() -> Result<()> {
        let db = setup_test_db().await?;

        create_test_member(&db, "M-01", "Arindam").await?;
        let result = create_member(
            &db,
            "M-01".to_string(),
            "Someone Else".to_string(),
            None,
            0.0,
            None,
            None,
            "other-token".to_string(),
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Conflict { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_member_matches_three_forms() -> Result<()> {
        let db = setup_test_db().await?;
        let member = create_test_member(&db, "M-07", "Sourav").await?;

        assert!(member_matches(&member, &member.id.to_string()));
        assert!(member_matches(&member, "M-07"));
        assert!(member_matches(&member, "Sourav"));
        assert!(!member_matches(&member, "M-08"));
        assert!(!member_matches(&member, "sourav"));

        Ok(())
    }

    #[tokio::test]
    async fn test_resolve_member_key() -> Result<()> {
        let db = setup_test_db().await?;
        let m1 = create_test_member(&db, "M-01", "Arindam").await?;
        let m2 = create_test_member(&db, "M-02", "Sourav").await?;

        let members = list_current_members(&db).await?;
        assert_eq!(resolve_member_key(&members, "M-02").unwrap().id, m2.id);
        assert_eq!(resolve_member_key(&members, "Arindam").unwrap().id, m1.id);
        assert_eq!(
            resolve_member_key(&members, &m1.id.to_string()).unwrap().id,
            m1.id
        );
        assert!(resolve_member_key(&members, "nobody").is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_list_current_members_includes_unset_role() -> Result<()> {
        let db = setup_test_db().await?;

        create_test_member(&db, "M-01", "Member Role").await?;
        create_member(
            &db,
            "M-02".to_string(),
            "Legacy Row".to_string(),
            None, // legacy: no role recorded
            0.0,
            None,
            None,
            "tok-legacy".to_string(),
        )
        .await?;
        create_admin_member(&db, "A-01", "The Admin").await?;

        let members = list_current_members(&db).await?;
        assert_eq!(members.len(), 2);
        assert!(members.iter().all(|m| m.name != "The Admin"));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_member_partial_fields() -> Result<()> {
        let db = setup_test_db().await?;
        let member = create_test_member(&db, "M-01", "Before").await?;

        let updated = update_member(
            &db,
            member.id,
            Some("After".to_string()),
            None,
            Some(750.0),
            None,
            None,
        )
        .await?;

        assert_eq!(updated.name, "After");
        assert_eq!(updated.deposit, 750.0);
        assert_eq!(updated.member_code, "M-01");
        assert_eq!(updated.role.as_deref(), Some(ROLE_MEMBER));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_member_not_found() -> Result<()> {
        let db = setup_test_db().await?;

        let result = update_member(&db, 999, Some("X".to_string()), None, None, None, None).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_member_by_token() -> Result<()> {
        let db = setup_test_db().await?;
        let member = create_test_member(&db, "M-01", "Arindam").await?;

        let found = get_member_by_token(&db, &member.api_token).await?;
        assert_eq!(found.unwrap().id, member.id);

        let missing = get_member_by_token(&db, "no-such-token").await?;
        assert!(missing.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_initial_members_idempotent() -> Result<()> {
        let db = setup_test_db().await?;

        let config: crate::config::members::Config = toml::from_str(
            r#"
            [[members]]
            member_code = "M-01"
            name = "Arindam"
            role = "admin"
            api_token = "tok-a"

            [[members]]
            member_code = "M-02"
            name = "Sourav"
            api_token = "tok-b"
        "#,
        )
        .unwrap();

        assert_eq!(seed_initial_members(&db, &config).await?, 2);
        // Second run skips everything
        assert_eq!(seed_initial_members(&db, &config).await?, 0);
        assert_eq!(list_all_members(&db).await?.len(), 2);

        Ok(())
    }
}
