//! Bearer-token authentication for the API.
//!
//! Every route requires `Authorization: Bearer <token>`, where the token is
//! the opaque `api_token` issued on the member record. Token issuance and
//! rotation are out of scope; the extractor only resolves a token to a
//! member. Lookup goes through the member cache with a direct store lookup
//! on a miss, so a member created moments ago can authenticate inside the
//! staleness window; a revoked token can stay valid for up to the cache TTL.

use super::AppState;
use crate::core::member;
use crate::entities::member::Model as MemberModel;
use crate::errors::{Error, Result};
use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

/// The authenticated caller, resolved from the bearer token.
#[derive(Debug, Clone)]
pub struct CurrentMember(pub MemberModel);

impl CurrentMember {
    /// Returns an error unless the caller is an admin.
    pub fn require_admin(&self) -> Result<()> {
        if member::is_admin(&self.0) {
            Ok(())
        } else {
            Err(Error::Forbidden {
                message: "Admin role required".to_string(),
            })
        }
    }

    /// True when the caller is an admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        member::is_admin(&self.0)
    }
}

/// Resolves a bearer token to a member: cached list first, then a direct
/// store lookup for tokens the stale cache does not know about yet.
pub async fn resolve_token(state: &AppState, token: &str) -> Result<MemberModel> {
    let members = state.members.get(&state.db).await?;
    if let Some(cached) = members.into_iter().find(|m| m.api_token == token) {
        return Ok(cached);
    }

    member::get_member_by_token(&state.db, token)
        .await?
        .ok_or_else(|| Error::Unauthorized {
            message: "Unknown or expired token".to_string(),
        })
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentMember {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| Error::Unauthorized {
                message: "Missing Authorization header".to_string(),
            })?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or_else(|| Error::Unauthorized {
                message: "Invalid Authorization scheme".to_string(),
            })?;

        let caller = resolve_token(state, token).await?;
        Ok(Self(caller))
    }
}
